//! BinaryPack type tag constants.

// Fixed integers
// Positive: 0x00..=0x7F (value = tag)
// Negative: 0xE0..=0xFF (value = tag - 0x100, -32..=-1)
pub const MAX_POSITIVE_FIXED: u8 = 0x80;
pub const MAX_NEGATIVE_FIXED: u8 = 0x20;
pub const NEGATIVE_FIXED_BASE: u8 = 0xE0;

// Fixed containers: family base | size (0..=15)
pub const RAW_BASE: u8 = 0xA0;
pub const STRING_BASE: u8 = 0xB0;
pub const ARRAY_BASE: u8 = 0x90;
pub const MAP_BASE: u8 = 0x80;

// Size tiers
pub const SMALL_SIZE: usize = 0x0F;
pub const U16_SIZE: usize = 0xFFFF;
pub const U32_SIZE: usize = 0xFFFF_FFFF;

// Literals
pub const NULL: u8 = 0xC0;
pub const UNDEFINED: u8 = 0xC1;
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

// Floating point
pub const FLOAT: u8 = 0xCA;
pub const DOUBLE: u8 = 0xCB;

// Unsigned integers
pub const U8: u8 = 0xCC;
pub const U16: u8 = 0xCD;
pub const U32: u8 = 0xCE;
pub const U64: u8 = 0xCF;

// Signed integers
pub const I8: u8 = 0xD0;
pub const I16: u8 = 0xD1;
pub const I32: u8 = 0xD2;
pub const I64: u8 = 0xD3;

// Sized payloads
pub const STRING_16: u8 = 0xD8;
pub const STRING_32: u8 = 0xD9;
pub const RAW_16: u8 = 0xDA;
pub const RAW_32: u8 = 0xDB;
pub const ARRAY_16: u8 = 0xDC;
pub const ARRAY_32: u8 = 0xDD;
pub const MAP_16: u8 = 0xDE;
pub const MAP_32: u8 = 0xDF;

/// Tag bytes for one length-prefixed family.
#[derive(Debug, Clone, Copy)]
pub struct Family {
    pub name: &'static str,
    pub base: u8,
    pub tag16: u8,
    pub tag32: u8,
}

pub const RAW: Family = Family {
    name: "raw",
    base: RAW_BASE,
    tag16: RAW_16,
    tag32: RAW_32,
};

pub const STRING: Family = Family {
    name: "string",
    base: STRING_BASE,
    tag16: STRING_16,
    tag32: STRING_32,
};

pub const ARRAY: Family = Family {
    name: "array",
    base: ARRAY_BASE,
    tag16: ARRAY_16,
    tag32: ARRAY_32,
};

pub const MAP: Family = Family {
    name: "map",
    base: MAP_BASE,
    tag16: MAP_16,
    tag32: MAP_32,
};

// IEEE-754 layout, used by the arithmetic float codec.
pub const SIGN_BIT: u32 = 0x8000_0000;

pub const DOUBLE_EXP_MASK: u32 = 0x7FF;
pub const DOUBLE_EXP_BIAS: i32 = 1023;
pub const DOUBLE_FRAC_BITS: i32 = 52;
pub const DOUBLE_HI_FRAC_MASK: u32 = 0x000F_FFFF;

pub const FLOAT_EXP_MASK: u32 = 0xFF;
pub const FLOAT_EXP_BIAS: i32 = 127;
pub const FLOAT_FRAC_BITS: i32 = 23;
pub const FLOAT_FRAC_MASK: u32 = 0x007F_FFFF;
