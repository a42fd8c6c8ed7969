//! Dynamic value model.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

/// Ordered key/value pairs of a map, kept in insertion order.
///
/// Keys are not required to be unique by the wire format.
pub type ValueMap = Vec<(Value, Value)>;

/// A dynamic value that can be packed into, or unpacked from, BinaryPack bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Boolean(bool),
    /// Integers between `i64::MIN` and `u64::MAX` inclusive are encodable.
    Integer(i128),
    Float(f64),
    String(String),
    Raw(Bytes),
    Array(Vec<Value>),
    Map(ValueMap),
    /// An opaque value that supplies its own encoded bytes. Never produced by decoding.
    Extension(Extension),
}

/// A type that knows its own BinaryPack byte representation.
///
/// The returned bytes are written verbatim, without a tag, so they must
/// already form a complete self-describing value.
pub trait ToBinaryPack: fmt::Debug + Send + Sync {
    /// Name reported when the value cannot be represented.
    fn type_name(&self) -> &str;

    /// Returns the encoded bytes, or `None` if this value has no encoding.
    fn to_binary_pack(&self) -> Option<Bytes>;
}

/// Shared handle to a [`ToBinaryPack`] implementation.
#[derive(Debug, Clone)]
pub struct Extension(Arc<dyn ToBinaryPack>);

impl Extension {
    pub fn new(inner: impl ToBinaryPack + 'static) -> Self {
        Self(Arc::new(inner))
    }

    pub fn type_name(&self) -> &str {
        self.0.type_name()
    }

    pub fn to_binary_pack(&self) -> Option<Bytes> {
        self.0.to_binary_pack()
    }
}

impl PartialEq for Extension {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.type_name() == other.type_name()
                && self.to_binary_pack() == other.to_binary_pack())
    }
}

impl Value {
    /// Builds an array from anything convertible into values.
    pub fn array<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Builds a map, preserving the iteration order of `entries`.
    pub fn map<K: Into<Value>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Wraps a self-encoding value.
    pub fn extension(inner: impl ToBinaryPack + 'static) -> Self {
        Self::Extension(Extension::new(inner))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as a string reference, if it is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an `Integer` that fits.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => i64::try_from(*i).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Raw(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up the first entry whose key is the string `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }
}

// -- Convenience conversions --

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Self::Integer(i128::from(i))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, i128);

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Self::Raw(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Raw(Bytes::from(b))
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Raw(Bytes::copy_from_slice(b))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<ValueMap> for Value {
    fn from(m: ValueMap) -> Self {
        Self::Map(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Undefined => write!(f, "undefined"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Raw(b) => write!(f, "<{} bytes>", b.len()),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Self::Extension(ext) => write!(f, "<{}>", ext.type_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(&'static [u8]);

    impl ToBinaryPack for Fixed {
        fn type_name(&self) -> &str {
            "Fixed"
        }

        fn to_binary_pack(&self) -> Option<Bytes> {
            Some(Bytes::from_static(self.0))
        }
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from(7u8), Value::Integer(7));
        assert_eq!(Value::from(u64::MAX), Value::Integer(i128::from(u64::MAX)));
        assert_eq!(Value::from("x"), Value::String("x".into()));
        assert_eq!(Value::from(vec![1u8, 2]), Value::Raw(Bytes::from_static(&[1, 2])));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(true)), Value::Boolean(true));
    }

    #[test]
    fn map_keeps_insertion_order() {
        let m = Value::map([("b", 1), ("a", 2)]);
        let keys: Vec<_> = m.as_map().unwrap().iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![Value::from("b"), Value::from("a")]);
        assert_eq!(m.get("a"), Some(&Value::Integer(2)));
        assert_eq!(m.get("missing"), None);
    }

    #[test]
    fn as_int_rejects_wide_values() {
        assert_eq!(Value::Integer(-5).as_int(), Some(-5));
        assert_eq!(Value::from(u64::MAX).as_int(), None);
    }

    #[test]
    fn accessors_match_their_variant() {
        assert!(Value::Null.is_null());
        assert!(!Value::Undefined.is_null());
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(1).as_bool(), None);
        assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::from(&b"ab"[..]).as_bytes(), Some(&b"ab"[..]));
        assert_eq!(Value::from("ab").as_bytes(), None);
        assert_eq!(
            Value::array([1, 2]).as_array(),
            Some(&[Value::Integer(1), Value::Integer(2)][..])
        );
        assert_eq!(Value::map([("k", 1)]).as_array(), None);
        assert_eq!(Value::from("ab").as_str(), Some("ab"));
    }

    #[test]
    fn extension_equality_compares_bytes() {
        let a = Value::extension(Fixed(&[0xC0]));
        let b = Value::extension(Fixed(&[0xC0]));
        let c = Value::extension(Fixed(&[0xC3]));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display() {
        let v = Value::array([Value::from(1), Value::from("ab"), Value::Null]);
        assert_eq!(v.to_string(), "[1, \"ab\", null]");
        let m = Value::map([("k", Value::Raw(Bytes::from_static(b"xyz")))]);
        assert_eq!(m.to_string(), "{\"k\": <3 bytes>}");
    }
}
