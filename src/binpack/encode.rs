//! BinaryPack encoding: `Value` → bytes.

use bytes::{BufMut, Bytes, BytesMut};

use super::builder::BufferBuilder;
use super::tag::{self, Family};
use crate::codec::DEFAULT_MAX_DEPTH;
use crate::error::BinaryPackError;
use crate::types::{Extension, Value};

const TWO_POW_52: f64 = 4_503_599_627_370_496.0;
const MAX_FRACTION: u64 = (1 << 52) - 1;
const QUIET_NAN_FRACTION: u64 = 1 << 51;

/// Encodes values into a single BinaryPack buffer.
///
/// One encoder owns one [`BufferBuilder`]; call [`Encoder::finalize`] to take
/// the bytes out.
#[derive(Debug)]
pub struct Encoder {
    builder: BufferBuilder,
    max_depth: usize,
    depth: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            builder: BufferBuilder::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    /// Sets the maximum container nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Number of bytes encoded so far.
    pub fn len(&self) -> usize {
        self.builder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builder.is_empty()
    }

    /// Consumes the encoder and returns the encoded stream.
    pub fn finalize(self) -> Bytes {
        self.builder.finalize()
    }

    /// Appends one value to the stream.
    ///
    /// On error nothing from this value stays in the stream, so the encoder
    /// can keep going with the next value.
    pub fn encode(&mut self, value: &Value) -> Result<(), BinaryPackError> {
        let start = self.builder.len();
        let depth = self.depth;
        let result = self.encode_value(value);
        if result.is_err() {
            self.builder.truncate(start);
            self.depth = depth;
        }
        result
    }

    fn encode_value(&mut self, value: &Value) -> Result<(), BinaryPackError> {
        match value {
            Value::Null => self.builder.push(tag::NULL),
            Value::Undefined => self.builder.push(tag::UNDEFINED),
            Value::Boolean(b) => self.encode_bool(*b),
            Value::Integer(i) => self.encode_int(*i)?,
            Value::Float(f) => self.encode_double(*f),
            Value::String(s) => self.encode_string(s)?,
            Value::Raw(b) => self.encode_raw(b)?,
            Value::Array(items) => self.encode_array(items)?,
            Value::Map(entries) => self.encode_map(entries)?,
            Value::Extension(ext) => self.encode_extension(ext)?,
        }
        Ok(())
    }

    fn encode_bool(&mut self, value: bool) {
        self.builder.push(if value { tag::TRUE } else { tag::FALSE });
    }

    /// Encodes an integer using the first representation that holds it.
    ///
    /// Ranges overlap and unsigned widths are tried before signed ones of the
    /// same size, so 200 is `U8` and -100 is `I8`.
    fn encode_int(&mut self, value: i128) -> Result<(), BinaryPackError> {
        let b = &mut self.builder;
        if (-i128::from(tag::MAX_NEGATIVE_FIXED)..i128::from(tag::MAX_POSITIVE_FIXED))
            .contains(&value)
        {
            // Fixed positive or fixed negative: the tag is the value itself.
            b.push(value as u8);
        } else if (0..=i128::from(u8::MAX)).contains(&value) {
            b.push(tag::U8);
            b.push(value as u8);
        } else if (i128::from(i8::MIN)..=i128::from(i8::MAX)).contains(&value) {
            b.push(tag::I8);
            b.push(value as i8 as u8);
        } else if (0..=i128::from(u16::MAX)).contains(&value) {
            b.push(tag::U16);
            b.push_u16(value as u16);
        } else if (i128::from(i16::MIN)..=i128::from(i16::MAX)).contains(&value) {
            b.push(tag::I16);
            b.push_slice(&(value as i16).to_be_bytes());
        } else if (0..=i128::from(u32::MAX)).contains(&value) {
            b.push(tag::U32);
            b.push_u32(value as u32);
        } else if (i128::from(i32::MIN)..=i128::from(i32::MAX)).contains(&value) {
            b.push(tag::I32);
            b.push_slice(&(value as i32).to_be_bytes());
        } else if (i128::from(i64::MIN)..=i128::from(i64::MAX)).contains(&value) {
            b.push(tag::I64);
            b.push_slice(&(value as i64).to_be_bytes());
        } else if (0..=i128::from(u64::MAX)).contains(&value) {
            b.push(tag::U64);
            b.push_u64(value as u64);
        } else {
            return Err(BinaryPackError::IntegerOutOfRange(value));
        }
        Ok(())
    }

    fn encode_double(&mut self, value: f64) {
        let (hi, lo) = double_words(value);
        self.builder.push(tag::DOUBLE);
        self.builder.push_u32(hi);
        self.builder.push_u32(lo);
    }

    fn encode_string(&mut self, value: &str) -> Result<(), BinaryPackError> {
        let text = encode_text(value);
        self.encode_header(tag::STRING, text.len())?;
        self.builder.append(text);
        Ok(())
    }

    fn encode_raw(&mut self, value: &Bytes) -> Result<(), BinaryPackError> {
        self.encode_header(tag::RAW, value.len())?;
        self.builder.append(value.clone());
        Ok(())
    }

    fn encode_array(&mut self, items: &[Value]) -> Result<(), BinaryPackError> {
        self.encode_header(tag::ARRAY, items.len())?;
        self.enter()?;
        for item in items {
            self.encode_value(item)?;
        }
        self.depth -= 1;
        Ok(())
    }

    fn encode_map(&mut self, entries: &[(Value, Value)]) -> Result<(), BinaryPackError> {
        self.encode_header(tag::MAP, entries.len())?;
        self.enter()?;
        for (key, value) in entries {
            self.encode_value(key)?;
            self.encode_value(value)?;
        }
        self.depth -= 1;
        Ok(())
    }

    fn encode_extension(&mut self, ext: &Extension) -> Result<(), BinaryPackError> {
        let bytes = ext
            .to_binary_pack()
            .ok_or_else(|| BinaryPackError::UnsupportedValueKind(ext.type_name().to_owned()))?;
        self.builder.append(bytes);
        Ok(())
    }

    /// Writes the tag (and size field, if any) for a sized family.
    fn encode_header(&mut self, family: Family, len: usize) -> Result<(), BinaryPackError> {
        if len <= tag::SMALL_SIZE {
            self.builder.push(family.base | len as u8);
        } else if len <= tag::U16_SIZE {
            self.builder.push(family.tag16);
            self.builder.push_u16(len as u16);
        } else if len <= tag::U32_SIZE {
            self.builder.push(family.tag32);
            self.builder.push_u32(len as u32);
        } else {
            return Err(BinaryPackError::LengthOverflow {
                kind: family.name,
                len,
            });
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<(), BinaryPackError> {
        if self.depth >= self.max_depth {
            return Err(BinaryPackError::DepthLimitExceeded(self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }
}

/// Splits a double into its high and low IEEE-754 words.
///
/// The exponent and fraction are computed arithmetically from the magnitude
/// (`floor(log2 |v|)` and `floor((|v| / 2^exp - 1) * 2^52)`), not by
/// reinterpreting the float's bits.
pub(crate) fn double_words(value: f64) -> (u32, u32) {
    let sign = if value.is_sign_negative() && !value.is_nan() {
        tag::SIGN_BIT
    } else {
        0
    };
    let magnitude = value.abs();

    let (exponent, fraction) = if value.is_nan() {
        (tag::DOUBLE_EXP_MASK, QUIET_NAN_FRACTION)
    } else if value.is_infinite() {
        (tag::DOUBLE_EXP_MASK, 0)
    } else if magnitude == 0.0 {
        (0, 0)
    } else {
        let mut exp = magnitude.log2().floor() as i32;
        // log2 can round across a power of two; settle on 2^exp <= |v| < 2^(exp+1).
        if exp >= -tag::DOUBLE_EXP_BIAS + 1 {
            if pow2(exp) > magnitude {
                exp -= 1;
            } else if exp < tag::DOUBLE_EXP_BIAS && pow2(exp + 1) <= magnitude {
                exp += 1;
            }
        }

        if exp < -tag::DOUBLE_EXP_BIAS + 1 {
            // Subnormal: no implicit leading one, fixed scale of 2^-1074.
            let scaled = magnitude * pow2(tag::DOUBLE_EXP_BIAS - 1) * TWO_POW_52;
            (0, (scaled.floor() as u64).min(MAX_FRACTION))
        } else {
            let scaled = (magnitude / pow2(exp) - 1.0) * TWO_POW_52;
            (
                (exp + tag::DOUBLE_EXP_BIAS) as u32,
                (scaled.floor() as u64).min(MAX_FRACTION),
            )
        }
    };

    let hi = sign
        | (exponent << 20)
        | ((fraction >> 32) as u32 & tag::DOUBLE_HI_FRAC_MASK);
    let lo = (fraction & 0xFFFF_FFFF) as u32;
    (hi, lo)
}

/// Exact power of two for any exponent in the double range.
pub(crate) fn pow2(exp: i32) -> f64 {
    if exp < -(tag::DOUBLE_EXP_BIAS - 1) {
        2f64.powi(exp + tag::DOUBLE_FRAC_BITS) * 2f64.powi(-tag::DOUBLE_FRAC_BITS)
    } else {
        2f64.powi(exp)
    }
}

/// Encodes text one UTF-16 unit at a time as 1, 2 or 3 bytes.
///
/// Text made only of code points up to U+FFFF comes out identical to UTF-8;
/// anything above is written as a surrogate pair of two 3-byte sequences.
pub(crate) fn encode_text(value: &str) -> Bytes {
    if value.chars().all(|c| u32::from(c) <= 0xFFFF) {
        return Bytes::copy_from_slice(value.as_bytes());
    }

    let mut out = BytesMut::with_capacity(text_len(value));
    for unit in value.encode_utf16() {
        match unit {
            0..=0x7F => out.put_u8(unit as u8),
            0x80..=0x7FF => {
                out.put_u8(0xC0 | (unit >> 6) as u8);
                out.put_u8(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.put_u8(0xE0 | (unit >> 12) as u8);
                out.put_u8(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.put_u8(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out.freeze()
}

/// Encoded byte length of `value` under the 1/2/3-byte text scheme.
pub(crate) fn text_len(value: &str) -> usize {
    value
        .chars()
        .map(|c| if u32::from(c) > 0xFFFF { 6 } else { c.len_utf8() })
        .sum()
}
