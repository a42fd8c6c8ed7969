//! BinaryPack — a pure-Rust codec for a compact, MessagePack-style binary format.
//!
//! Dynamic values (null, booleans, integers, doubles, strings, raw bytes,
//! arrays and maps) are written as a self-describing byte stream in which
//! every value starts with a one-byte type tag, and read back from it.
//!
//! # Architecture
//!
//! - **`types`** — the dynamic [`Value`] model
//! - **`binpack`** — type tags, byte accumulator, encoder and decoder
//! - **`codec`** — the [`pack`]/[`unpack`] entry points and [`BinaryPack`] configuration
//! - **`error`** — [`BinaryPackError`]
//!
//! # Example
//!
//! ```
//! use binarypack::{pack, unpack, Value};
//!
//! let value = Value::array([Value::from(1), Value::from("ab"), Value::from(true), Value::Null]);
//! let bytes = pack(&value)?;
//! assert_eq!(&bytes[..], &[0x94, 0x01, 0xB2, 0x61, 0x62, 0xC3, 0xC0]);
//! assert_eq!(unpack(&bytes)?, value);
//! # Ok::<(), binarypack::BinaryPackError>(())
//! ```

pub mod binpack;
pub mod codec;
pub mod error;
pub mod types;

pub use codec::{BinaryPack, DEFAULT_MAX_DEPTH, pack, unpack};
pub use error::BinaryPackError;
pub use types::{Extension, ToBinaryPack, Value, ValueMap};
