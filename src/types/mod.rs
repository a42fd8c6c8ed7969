//! Dynamic value types carried by BinaryPack.

mod value;

pub use value::{Extension, ToBinaryPack, Value, ValueMap};
