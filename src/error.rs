//! Error types for BinaryPack encoding and decoding.

/// Errors that can occur while packing or unpacking a value.
///
/// Every variant is fatal to the call that raised it: no partial value or
/// partial buffer is ever handed back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BinaryPackError {
    #[error("unsupported value kind: {0}")]
    UnsupportedValueKind(String),

    #[error("{kind} length {len} exceeds the 32-bit size field")]
    LengthOverflow { kind: &'static str, len: usize },

    #[error("integer {0} is outside the 64-bit range")]
    IntegerOutOfRange(i128),

    #[error("unknown type tag: 0x{0:02X}")]
    UnknownTag(u8),

    #[error("buffer underrun: need {needed} bytes but only {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },

    #[error("invalid text: {0}")]
    InvalidText(String),

    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),
}

impl BinaryPackError {
    /// Returns `true` if the error was caused by running out of input.
    pub fn is_underrun(&self) -> bool {
        matches!(self, Self::BufferUnderrun { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            BinaryPackError::UnknownTag(0xC4).to_string(),
            "unknown type tag: 0xC4"
        );
        assert_eq!(
            BinaryPackError::BufferUnderrun {
                needed: 4,
                remaining: 1
            }
            .to_string(),
            "buffer underrun: need 4 bytes but only 1 remaining"
        );
        assert_eq!(
            BinaryPackError::LengthOverflow {
                kind: "string",
                len: 5_000_000_000
            }
            .to_string(),
            "string length 5000000000 exceeds the 32-bit size field"
        );
    }

    #[test]
    fn underrun_predicate() {
        let err = BinaryPackError::BufferUnderrun {
            needed: 1,
            remaining: 0,
        };
        assert!(err.is_underrun());
        assert!(!BinaryPackError::UnknownTag(0xD4).is_underrun());
    }
}
