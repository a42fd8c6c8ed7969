//! BinaryPack decoding: bytes → `Value`.

use bytes::{Buf, Bytes};

use super::encode::pow2;
use super::tag;
use crate::codec::DEFAULT_MAX_DEPTH;
use crate::error::BinaryPackError;
use crate::types::{Value, ValueMap};

/// Decodes values from an in-memory buffer.
///
/// The decoder owns its cursor. Each call to [`Decoder::decode`] reads one
/// complete value and leaves the cursor just past it, so concatenated values
/// can be read back one after another.
#[derive(Debug)]
pub struct Decoder<'a> {
    data: &'a [u8],
    index: usize,
    max_depth: usize,
    depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            index: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    /// Sets the maximum container nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// Decodes the value starting at the cursor.
    pub fn decode(&mut self) -> Result<Value, BinaryPackError> {
        let depth = self.depth;
        let result = self.decode_value();
        if result.is_err() {
            self.depth = depth;
        }
        result
    }

    fn decode_value(&mut self) -> Result<Value, BinaryPackError> {
        let t = self.read_u8()?;

        // Fixed positive: 0x00..=0x7F
        if t < tag::MAX_POSITIVE_FIXED {
            return Ok(Value::Integer(i128::from(t)));
        }

        // Fixed negative: 0xE0..=0xFF
        let neg = t ^ tag::NEGATIVE_FIXED_BASE;
        if neg < tag::MAX_NEGATIVE_FIXED {
            return Ok(Value::Integer(
                i128::from(neg) - i128::from(tag::MAX_NEGATIVE_FIXED),
            ));
        }

        // Fixed raw, string, array and map
        if let Some(len) = small_size(t, tag::RAW_BASE) {
            return self.decode_raw(len);
        }
        if let Some(len) = small_size(t, tag::STRING_BASE) {
            return self.decode_string(len);
        }
        if let Some(len) = small_size(t, tag::ARRAY_BASE) {
            return self.decode_array(len);
        }
        if let Some(len) = small_size(t, tag::MAP_BASE) {
            return self.decode_map(len);
        }

        match t {
            tag::NULL => Ok(Value::Null),
            tag::UNDEFINED => Ok(Value::Undefined),
            tag::FALSE => Ok(Value::Boolean(false)),
            tag::TRUE => Ok(Value::Boolean(true)),

            tag::FLOAT => {
                let word = self.take(4)?.get_u32();
                Ok(Value::Float(float_from_word(word)))
            }
            tag::DOUBLE => {
                let mut field = self.take(8)?;
                let hi = field.get_u32();
                let lo = field.get_u32();
                Ok(Value::Float(double_from_words(hi, lo)))
            }

            tag::U8 => Ok(Value::Integer(i128::from(self.read_u8()?))),
            tag::U16 => Ok(Value::Integer(i128::from(self.take(2)?.get_u16()))),
            tag::U32 => Ok(Value::Integer(i128::from(self.take(4)?.get_u32()))),
            tag::U64 => Ok(Value::Integer(i128::from(self.take(8)?.get_u64()))),

            tag::I8 => Ok(Value::Integer(i128::from(self.take(1)?.get_i8()))),
            tag::I16 => Ok(Value::Integer(i128::from(self.take(2)?.get_i16()))),
            tag::I32 => Ok(Value::Integer(i128::from(self.take(4)?.get_i32()))),
            tag::I64 => Ok(Value::Integer(i128::from(self.take(8)?.get_i64()))),

            tag::STRING_16 => {
                let len = self.read_len16()?;
                self.decode_string(len)
            }
            tag::STRING_32 => {
                let len = self.read_len32()?;
                self.decode_string(len)
            }
            tag::RAW_16 => {
                let len = self.read_len16()?;
                self.decode_raw(len)
            }
            tag::RAW_32 => {
                let len = self.read_len32()?;
                self.decode_raw(len)
            }
            tag::ARRAY_16 => {
                let len = self.read_len16()?;
                self.decode_array(len)
            }
            tag::ARRAY_32 => {
                let len = self.read_len32()?;
                self.decode_array(len)
            }
            tag::MAP_16 => {
                let len = self.read_len16()?;
                self.decode_map(len)
            }
            tag::MAP_32 => {
                let len = self.read_len32()?;
                self.decode_map(len)
            }

            _ => Err(BinaryPackError::UnknownTag(t)),
        }
    }

    /// Consumes `len` bytes, failing without moving the cursor if they are not all there.
    fn take(&mut self, len: usize) -> Result<&'a [u8], BinaryPackError> {
        self.ensure_remaining(len)?;
        let data: &'a [u8] = self.data;
        let start = self.index;
        self.index += len;
        Ok(&data[start..self.index])
    }

    fn ensure_remaining(&self, needed: usize) -> Result<(), BinaryPackError> {
        let remaining = self.remaining();
        if needed > remaining {
            Err(BinaryPackError::BufferUnderrun { needed, remaining })
        } else {
            Ok(())
        }
    }

    fn read_u8(&mut self) -> Result<u8, BinaryPackError> {
        Ok(self.take(1)?[0])
    }

    fn read_len16(&mut self) -> Result<usize, BinaryPackError> {
        Ok(usize::from(self.take(2)?.get_u16()))
    }

    fn read_len32(&mut self) -> Result<usize, BinaryPackError> {
        Ok(self.take(4)?.get_u32() as usize)
    }

    fn decode_raw(&mut self, len: usize) -> Result<Value, BinaryPackError> {
        let data = self.take(len)?;
        Ok(Value::Raw(Bytes::copy_from_slice(data)))
    }

    fn decode_string(&mut self, len: usize) -> Result<Value, BinaryPackError> {
        let data = self.take(len)?;
        decode_text(data).map(Value::String)
    }

    fn decode_array(&mut self, len: usize) -> Result<Value, BinaryPackError> {
        // Every element takes at least one byte.
        self.ensure_remaining(len)?;
        self.enter()?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(self.decode_value()?);
        }
        self.depth -= 1;
        Ok(Value::Array(items))
    }

    /// Reads exactly `len` key/value pairs.
    fn decode_map(&mut self, len: usize) -> Result<Value, BinaryPackError> {
        self.ensure_remaining(len.saturating_mul(2))?;
        self.enter()?;
        let mut entries = ValueMap::with_capacity(len);
        for _ in 0..len {
            let key = self.decode_value()?;
            let value = self.decode_value()?;
            entries.push((key, value));
        }
        self.depth -= 1;
        Ok(Value::Map(entries))
    }

    fn enter(&mut self) -> Result<(), BinaryPackError> {
        if self.depth >= self.max_depth {
            return Err(BinaryPackError::DepthLimitExceeded(self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }
}

/// Returns the embedded size if `t` belongs to the fixed family at `base`.
fn small_size(t: u8, base: u8) -> Option<usize> {
    let size = usize::from(t ^ base);
    (size <= tag::SMALL_SIZE).then_some(size)
}

/// Rebuilds a double from its IEEE-754 words as `fraction * 2^(exponent - 52)`.
pub(crate) fn double_from_words(hi: u32, lo: u32) -> f64 {
    let exponent = (hi >> 20) & tag::DOUBLE_EXP_MASK;
    let fraction = (u64::from(hi & tag::DOUBLE_HI_FRAC_MASK) << 32) | u64::from(lo);

    let magnitude = if exponent == 0 {
        // Zero or subnormal
        fraction as f64 * pow2(1 - tag::DOUBLE_EXP_BIAS - tag::DOUBLE_FRAC_BITS)
    } else if exponent == tag::DOUBLE_EXP_MASK {
        if fraction != 0 {
            return f64::NAN;
        }
        f64::INFINITY
    } else {
        let mantissa = fraction | (1 << tag::DOUBLE_FRAC_BITS);
        mantissa as f64 * pow2(exponent as i32 - tag::DOUBLE_EXP_BIAS - tag::DOUBLE_FRAC_BITS)
    };

    if hi & tag::SIGN_BIT != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Rebuilds a single-precision value, widened to a double.
pub(crate) fn float_from_word(word: u32) -> f64 {
    let exponent = (word >> 23) & tag::FLOAT_EXP_MASK;
    let fraction = word & tag::FLOAT_FRAC_MASK;

    let magnitude = if exponent == 0 {
        f64::from(fraction) * pow2(1 - tag::FLOAT_EXP_BIAS - tag::FLOAT_FRAC_BITS)
    } else if exponent == tag::FLOAT_EXP_MASK {
        if fraction != 0 {
            return f64::NAN;
        }
        f64::INFINITY
    } else {
        let mantissa = fraction | (1 << tag::FLOAT_FRAC_BITS);
        f64::from(mantissa) * pow2(exponent as i32 - tag::FLOAT_EXP_BIAS - tag::FLOAT_FRAC_BITS)
    };

    if word & tag::SIGN_BIT != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Decodes 1/2/3-byte text sequences into UTF-16 units and joins them.
pub(crate) fn decode_text(data: &[u8]) -> Result<String, BinaryPackError> {
    if data.is_ascii() {
        return Ok(data.iter().copied().map(char::from).collect());
    }

    let mut units = Vec::with_capacity(data.len());
    let mut bytes = data.iter().copied();
    while let Some(b0) = bytes.next() {
        let unit = match b0 {
            0x00..=0x7F => u16::from(b0),
            0xC0..=0xDF => {
                let b1 = next_continuation(&mut bytes)?;
                (u16::from(b0 & 0x1F) << 6) | u16::from(b1 & 0x3F)
            }
            0xE0..=0xEF => {
                let b1 = next_continuation(&mut bytes)?;
                let b2 = next_continuation(&mut bytes)?;
                (u16::from(b0 & 0x0F) << 12) | (u16::from(b1 & 0x3F) << 6) | u16::from(b2 & 0x3F)
            }
            _ => {
                return Err(BinaryPackError::InvalidText(format!(
                    "unexpected lead byte 0x{b0:02X}"
                )));
            }
        };
        units.push(unit);
    }

    String::from_utf16(&units).map_err(|e| BinaryPackError::InvalidText(e.to_string()))
}

fn next_continuation(bytes: &mut impl Iterator<Item = u8>) -> Result<u8, BinaryPackError> {
    bytes
        .next()
        .ok_or_else(|| BinaryPackError::InvalidText("truncated multi-byte sequence".into()))
}
