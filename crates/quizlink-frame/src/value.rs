use bytes::{Bytes, BytesMut};

use crate::codec::encode_value;
use crate::error::Result;
use crate::tag;

/// One encodable/decodable unit of the wire format.
///
/// Sequence order is significant: requests use it for positional
/// command arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 32-bit signed integer.
    Int(i32),
    /// 32-bit unsigned status code.
    ResultCode(u32),
    /// UTF-8 text.
    String(String),
    /// Opaque bytes.
    Bytes(Bytes),
    /// 64-bit float.
    Double(f64),
    /// No value.
    Null,
    /// Ordered children.
    Sequence(Vec<Value>),
    /// A tag this decoder does not know, with its raw content.
    Unknown { tag: u8, content: Bytes },
}

impl Value {
    /// Create a result code value.
    pub fn result_code(code: u32) -> Self {
        Self::ResultCode(code)
    }

    /// Create a string value.
    pub fn string(text: impl Into<String>) -> Self {
        Self::String(text.into())
    }

    /// Create a byte blob value.
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self::Bytes(data.into())
    }

    /// Create a sequence from anything yielding values.
    pub fn sequence(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Sequence(items.into_iter().collect())
    }

    /// The wire tag of this value.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Int(_) => tag::INT32,
            Self::ResultCode(_) => tag::RESULT_CODE,
            Self::String(_) => tag::STRING,
            Self::Bytes(_) => tag::BYTE_BLOB,
            Self::Double(_) => tag::DOUBLE,
            Self::Null => tag::NULL,
            Self::Sequence(_) => tag::SEQUENCE,
            Self::Unknown { tag, .. } => *tag,
        }
    }

    /// Human-readable kind, for logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        tag::tag_name(self.tag())
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_result_code(&self) -> Option<u32> {
        match self {
            Self::ResultCode(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Append the wire encoding of this value to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        encode_value(self, dst)
    }

    /// The wire encoding of this value.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        encode_value(self, &mut buf)?;
        Ok(buf.freeze())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Sequence(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
