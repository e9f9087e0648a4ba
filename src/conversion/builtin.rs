//! Built-in codecs
//!
//! Seeded once per process into an immutable table shared by every registry.
//! Each entry is stored with its derived `Option<_>` companion.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::Lazy;
use uuid::Uuid;

use super::codec::{Erased, ErasedCodec, StoreType, TypeKey, ValueCodec, ValueType};
use super::errors::{CodecError, CodecResult};
use super::format::FormatContext;
use super::timestamp::{Timestamp, TimestampCodec};
use super::wire::WireValue;
use crate::observability::{log_event_with_fields, Event, Severity};

pub(crate) type CodecMap = HashMap<TypeKey, Arc<dyn ErasedCodec>>;

/// Inserts `codec` under `key`, plus its nullable companion when it has one.
pub(crate) fn insert_with_companion(
    map: &mut CodecMap,
    key: TypeKey,
    codec: Arc<dyn ErasedCodec>,
) -> Option<TypeKey> {
    let companion = codec.nullable_companion().map(|(companion_key, companion)| {
        map.insert(companion_key, companion);
        companion_key
    });
    map.insert(key, codec);
    companion
}

pub(crate) static BUILTIN_CODECS: Lazy<Arc<CodecMap>> = Lazy::new(|| {
    let mut map = CodecMap::new();

    seed::<String, _>(&mut map, NativeCodec::new());
    seed::<i32, _>(&mut map, NativeCodec::new());
    seed::<i64, _>(&mut map, NativeCodec::new());
    seed::<u64, _>(&mut map, NativeCodec::new());
    seed::<f64, _>(&mut map, NativeCodec::new());
    seed::<bool, _>(&mut map, NativeCodec::new());
    seed::<Vec<u8>, _>(&mut map, NativeCodec::new());
    seed::<Uuid, _>(&mut map, UuidCodec);
    seed::<Timestamp, _>(&mut map, TimestampCodec);

    let count = map.len().to_string();
    log_event_with_fields(Severity::Trace, Event::BuiltinCodecsSeeded, &[("count", count.as_str())]);
    Arc::new(map)
});

fn seed<T, C>(map: &mut CodecMap, codec: C)
where
    T: StoreType,
    C: ValueCodec<T> + 'static,
{
    insert_with_companion(map, TypeKey::of::<T>(), Erased::<T, C>::value(codec));
}

/// Value types with a built-in codec, without their nullable forms
pub fn builtin_types() -> Vec<ValueType> {
    vec![
        ValueType::of::<String>(),
        ValueType::of::<i32>(),
        ValueType::of::<i64>(),
        ValueType::of::<u64>(),
        ValueType::of::<f64>(),
        ValueType::of::<bool>(),
        ValueType::of::<Vec<u8>>(),
        ValueType::of::<Uuid>(),
        ValueType::of::<Timestamp>(),
    ]
}

macro_rules! plain_store_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StoreType for $ty {
                fn value_type() -> ValueType {
                    ValueType::plain::<$ty>()
                }
            }
        )*
    };
}

plain_store_type!(String, i32, i64, u64, f64, bool, Vec<u8>, Uuid, Timestamp);

/// Scalars the store understands natively
pub trait NativeScalar: Sized + Send + Sync + 'static {
    fn to_native(&self) -> WireValue;

    fn from_native(wire: &WireValue) -> CodecResult<Self>;
}

/// Pass-through codec for [`NativeScalar`] types
pub struct NativeCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> NativeCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for NativeCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NativeScalar> ValueCodec<T> for NativeCodec<T> {
    fn convert_to(&self, value: &T, _ctx: &FormatContext) -> CodecResult<WireValue> {
        Ok(value.to_native())
    }

    fn convert_from(&self, wire: &WireValue, _ctx: &FormatContext) -> CodecResult<T> {
        T::from_native(wire)
    }
}

fn malformed(expected: &'static str, text: &str) -> CodecError {
    CodecError::Malformed {
        expected,
        text: text.to_string(),
    }
}

fn wire_integer(wire: &WireValue) -> CodecResult<i64> {
    match wire {
        WireValue::Integer(v) => Ok(*v),
        WireValue::Bool(v) => Ok(i64::from(*v)),
        WireValue::Double(v) if v.fract() == 0.0 && v.abs() < 9.0e18 => Ok(*v as i64),
        WireValue::Double(v) => Err(malformed("integer", &v.to_string())),
        other => {
            let text = other.as_text("integer")?;
            text.trim().parse().map_err(|_| malformed("integer", &text))
        }
    }
}

impl NativeScalar for i64 {
    fn to_native(&self) -> WireValue {
        WireValue::Integer(*self)
    }

    fn from_native(wire: &WireValue) -> CodecResult<Self> {
        wire_integer(wire)
    }
}

impl NativeScalar for i32 {
    fn to_native(&self) -> WireValue {
        WireValue::Integer(i64::from(*self))
    }

    fn from_native(wire: &WireValue) -> CodecResult<Self> {
        let value = wire_integer(wire)?;
        i32::try_from(value).map_err(|_| CodecError::OutOfRange {
            value: value.to_string(),
            target: "i32",
        })
    }
}

impl NativeScalar for u64 {
    fn to_native(&self) -> WireValue {
        match i64::try_from(*self) {
            Ok(v) => WireValue::Integer(v),
            Err(_) => WireValue::Text(self.to_string()),
        }
    }

    fn from_native(wire: &WireValue) -> CodecResult<Self> {
        match wire {
            WireValue::Integer(v) => u64::try_from(*v).map_err(|_| CodecError::OutOfRange {
                value: v.to_string(),
                target: "u64",
            }),
            WireValue::Text(_) | WireValue::Bytes(_) => {
                let text = wire.as_text("integer")?;
                text.trim().parse().map_err(|_| malformed("integer", &text))
            }
            other => {
                let value = wire_integer(other)?;
                u64::try_from(value).map_err(|_| CodecError::OutOfRange {
                    value: value.to_string(),
                    target: "u64",
                })
            }
        }
    }
}

impl NativeScalar for f64 {
    fn to_native(&self) -> WireValue {
        WireValue::Double(*self)
    }

    fn from_native(wire: &WireValue) -> CodecResult<Self> {
        match wire {
            WireValue::Double(v) => Ok(*v),
            WireValue::Integer(v) => Ok(*v as f64),
            other => {
                let text = other.as_text("double")?;
                text.trim().parse().map_err(|_| malformed("double", &text))
            }
        }
    }
}

impl NativeScalar for bool {
    fn to_native(&self) -> WireValue {
        WireValue::Bool(*self)
    }

    fn from_native(wire: &WireValue) -> CodecResult<Self> {
        match wire {
            WireValue::Bool(v) => Ok(*v),
            WireValue::Integer(0) => Ok(false),
            WireValue::Integer(1) => Ok(true),
            WireValue::Integer(v) => Err(CodecError::OutOfRange {
                value: v.to_string(),
                target: "bool",
            }),
            other => {
                let text = other.as_text("bool")?;
                match text.trim() {
                    "1" => Ok(true),
                    "0" => Ok(false),
                    t if t.eq_ignore_ascii_case("true") => Ok(true),
                    t if t.eq_ignore_ascii_case("false") => Ok(false),
                    _ => Err(malformed("bool", &text)),
                }
            }
        }
    }
}

impl NativeScalar for String {
    fn to_native(&self) -> WireValue {
        WireValue::Text(self.clone())
    }

    fn from_native(wire: &WireValue) -> CodecResult<Self> {
        match wire {
            WireValue::Null => Err(CodecError::UnexpectedNull),
            WireValue::Text(v) => Ok(v.clone()),
            other => {
                let raw = other.to_raw().unwrap_or_default();
                String::from_utf8(raw)
                    .map_err(|e| malformed("text", &String::from_utf8_lossy(e.as_bytes())))
            }
        }
    }
}

impl NativeScalar for Vec<u8> {
    fn to_native(&self) -> WireValue {
        WireValue::Bytes(self.clone())
    }

    fn from_native(wire: &WireValue) -> CodecResult<Self> {
        wire.to_raw().ok_or(CodecError::UnexpectedNull)
    }
}

/// Codec for [`Uuid`]: the 16 raw bytes, with the first three fields
/// little-endian (`Uuid::to_bytes_le`).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidCodec;

impl ValueCodec<Uuid> for UuidCodec {
    fn convert_to(&self, value: &Uuid, _ctx: &FormatContext) -> CodecResult<WireValue> {
        Ok(WireValue::Bytes(value.to_bytes_le().to_vec()))
    }

    fn convert_from(&self, wire: &WireValue, _ctx: &FormatContext) -> CodecResult<Uuid> {
        let bytes: &[u8] = match wire {
            WireValue::Bytes(b) => b,
            WireValue::Text(t) => t.as_bytes(),
            WireValue::Null => return Err(CodecError::UnexpectedNull),
            other => {
                return Err(CodecError::UnexpectedWireKind {
                    expected: "bytes",
                    found: other.kind_name(),
                })
            }
        };
        let raw: [u8; 16] = bytes
            .try_into()
            .map_err(|_| malformed("uuid", &format!("{} bytes", bytes.len())))?;
        Ok(Uuid::from_bytes_le(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FormatContext {
        FormatContext::empty()
    }

    #[test]
    fn test_every_builtin_has_nullable_companion() {
        for ty in builtin_types() {
            assert!(BUILTIN_CODECS.contains_key(&ty.key()), "{}", ty.name());
        }
        assert!(BUILTIN_CODECS.contains_key(&TypeKey::of::<Option<Uuid>>()));
        assert!(BUILTIN_CODECS.contains_key(&TypeKey::of::<Option<Timestamp>>()));
        assert_eq!(BUILTIN_CODECS.len(), builtin_types().len() * 2);
    }

    #[test]
    fn test_integers_accept_raw_text() {
        assert_eq!(i64::from_native(&WireValue::Bytes(b"-17".to_vec())).unwrap(), -17);
        assert_eq!(i32::from_native(&WireValue::Text("42".into())).unwrap(), 42);
        assert!(matches!(
            i32::from_native(&WireValue::Integer(i64::MAX)),
            Err(CodecError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_large_u64_round_trips_as_text() {
        let wire = u64::MAX.to_native();
        assert_eq!(wire, WireValue::Text(u64::MAX.to_string()));
        assert_eq!(u64::from_native(&wire).unwrap(), u64::MAX);
    }

    #[test]
    fn test_bool_raw_forms() {
        let raw = WireValue::from_raw(true.to_native().to_raw().as_deref());
        assert!(bool::from_native(&raw).unwrap());
        assert!(!bool::from_native(&WireValue::Text("False".into())).unwrap());
        assert!(bool::from_native(&WireValue::Text("yes".into())).is_err());
    }

    #[test]
    fn test_null_is_not_a_string() {
        assert!(matches!(
            String::from_native(&WireValue::Null),
            Err(CodecError::UnexpectedNull)
        ));
    }

    #[test]
    fn test_uuid_uses_little_endian_layout() {
        let id = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        let wire = UuidCodec.convert_to(&id, &ctx()).unwrap();
        assert_eq!(
            wire,
            WireValue::Bytes(vec![
                0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
                0xee, 0xff
            ])
        );
        assert_eq!(UuidCodec.convert_from(&wire, &ctx()).unwrap(), id);
    }

    #[test]
    fn test_uuid_rejects_wrong_length() {
        let err = UuidCodec
            .convert_from(&WireValue::Bytes(vec![1, 2, 3]), &ctx())
            .unwrap_err();
        assert!(err.to_string().contains("3 bytes"));
    }
}
