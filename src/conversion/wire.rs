//! Flat scalar values stored in the key-value backend

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::errors::{CodecError, CodecResult};

/// A single scalar as the store sees it.
///
/// `Null` is the sentinel for an absent value and never collides with the
/// encoding of any present value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum WireValue {
    Null,
    Integer(i64),
    Double(f64),
    Bool(bool),
    Text(String),
    Bytes(Vec<u8>),
}

impl WireValue {
    /// Returns the variant name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            WireValue::Null => "null",
            WireValue::Integer(_) => "integer",
            WireValue::Double(_) => "double",
            WireValue::Bool(_) => "bool",
            WireValue::Text(_) => "text",
            WireValue::Bytes(_) => "bytes",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, WireValue::Null)
    }

    /// Returns the bytes the store keeps for this value, `None` for the null sentinel.
    pub fn to_raw(&self) -> Option<Vec<u8>> {
        match self {
            WireValue::Null => None,
            WireValue::Integer(v) => Some(v.to_string().into_bytes()),
            WireValue::Double(v) => Some(v.to_string().into_bytes()),
            WireValue::Bool(v) => Some(if *v { b"1".to_vec() } else { b"0".to_vec() }),
            WireValue::Text(v) => Some(v.as_bytes().to_vec()),
            WireValue::Bytes(v) => Some(v.clone()),
        }
    }

    /// Wraps bytes read back from the store.
    pub fn from_raw(raw: Option<&[u8]>) -> Self {
        match raw {
            None => WireValue::Null,
            Some(bytes) => WireValue::Bytes(bytes.to_vec()),
        }
    }

    /// Returns the textual form of a `Text` or UTF-8 `Bytes` value.
    pub(crate) fn as_text(&self, expected: &'static str) -> CodecResult<Cow<'_, str>> {
        match self {
            WireValue::Text(s) => Ok(Cow::Borrowed(s.as_str())),
            WireValue::Bytes(b) => std::str::from_utf8(b)
                .map(Cow::Borrowed)
                .map_err(|_| CodecError::Malformed {
                    expected,
                    text: String::from_utf8_lossy(b).into_owned(),
                }),
            WireValue::Null => Err(CodecError::UnexpectedNull),
            other => Err(CodecError::UnexpectedWireKind {
                expected,
                found: other.kind_name(),
            }),
        }
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        WireValue::Text(value.to_string())
    }
}

impl From<i64> for WireValue {
    fn from(value: i64) -> Self {
        WireValue::Integer(value)
    }
}
