//! BinaryPack binary encoding format.
//!
//! Every value starts with a one-byte type tag. Small integers and short
//! containers fit entirely in the tag; everything else is followed by a
//! big-endian value or size field and then the payload.

pub mod builder;
pub mod decode;
pub mod encode;
pub mod tag;

pub use builder::BufferBuilder;
pub use decode::Decoder;
pub use encode::Encoder;
