//! `pack`/`unpack` entry points and their configuration.

use bytes::Bytes;

use crate::binpack::{Decoder, Encoder};
use crate::error::BinaryPackError;
use crate::types::Value;

/// Default limit on container nesting, for both encoding and decoding.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Configured BinaryPack codec.
///
/// Holds no buffers: every call builds its own encoder or decoder, so one
/// codec can be shared freely between threads.
#[derive(Debug, Clone, Copy)]
pub struct BinaryPack {
    max_depth: usize,
}

impl Default for BinaryPack {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryPack {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum container nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Encodes `value` into a finalized byte stream.
    pub fn pack(&self, value: &Value) -> Result<Bytes, BinaryPackError> {
        let mut encoder = Encoder::new().max_depth(self.max_depth);
        if let Err(e) = encoder.encode(value) {
            tracing::debug!(error = %e, "pack failed");
            return Err(e);
        }
        let bytes = encoder.finalize();
        tracing::trace!(len = bytes.len(), "packed value");
        Ok(bytes)
    }

    /// Decodes the first value in `data`. Bytes after it are ignored.
    pub fn unpack(&self, data: &[u8]) -> Result<Value, BinaryPackError> {
        let mut decoder = Decoder::new(data).max_depth(self.max_depth);
        let value = match decoder.decode() {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, position = decoder.position(), "unpack failed");
                return Err(e);
            }
        };
        if !decoder.is_finished() {
            tracing::trace!(
                consumed = decoder.position(),
                trailing = decoder.remaining(),
                "ignoring trailing bytes"
            );
        }
        tracing::trace!(len = data.len(), "unpacked value");
        Ok(value)
    }
}

/// Encodes `value` with the default configuration.
pub fn pack(value: &Value) -> Result<Bytes, BinaryPackError> {
    BinaryPack::new().pack(value)
}

/// Decodes the first value in `data` with the default configuration.
pub fn unpack(data: &[u8]) -> Result<Value, BinaryPackError> {
    BinaryPack::new().unpack(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_example_array() {
        let value = Value::array([
            Value::from(1),
            Value::from("ab"),
            Value::from(true),
            Value::Null,
        ]);
        let bytes = pack(&value).unwrap();
        assert_eq!(&bytes[..], &[0x94, 0x01, 0xB2, 0x61, 0x62, 0xC3, 0xC0]);
        assert_eq!(unpack(&bytes).unwrap(), value);
    }

    #[test]
    fn unpack_ignores_trailing_bytes() {
        assert_eq!(unpack(&[0x05, 0xC0, 0xFF]).unwrap(), Value::Integer(5));
    }

    #[test]
    fn unpack_never_returns_truncated_values() {
        let bytes = pack(&Value::array(["first", "second", "third"])).unwrap();
        for cut in 0..bytes.len() {
            let err = unpack(&bytes[..cut]).unwrap_err();
            assert!(
                matches!(
                    err,
                    BinaryPackError::BufferUnderrun { .. } | BinaryPackError::InvalidText(_)
                ),
                "cut at {cut}: {err}"
            );
        }
    }

    #[test]
    fn configured_depth_applies_both_ways() {
        let nested = Value::array([Value::array([Value::array([1])])]);
        let shallow = BinaryPack::new().max_depth(2);
        assert_eq!(
            shallow.pack(&nested),
            Err(BinaryPackError::DepthLimitExceeded(2))
        );

        let bytes = pack(&nested).unwrap();
        assert_eq!(
            shallow.unpack(&bytes),
            Err(BinaryPackError::DepthLimitExceeded(2))
        );
        assert_eq!(BinaryPack::default().unpack(&bytes).unwrap(), nested);
    }

    #[test]
    fn codec_is_shareable_across_threads() {
        let codec = BinaryPack::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let value = Value::map([("worker", i)]);
                    let bytes = codec.pack(&value).unwrap();
                    codec.unpack(&bytes).unwrap() == value
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
