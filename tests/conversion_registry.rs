//! Converter Registry Tests
//!
//! - Codec precedence: custom > built-in > enum > nullable-enum
//! - Unregistering restores built-in behavior
//! - Unsupported types are reported, never guessed
//! - Lookups are safe from many threads once registration is done

use std::sync::Arc;
use std::thread;

use ohmstore::conversion::{
    CodecError, CodecResult, ConversionCause, ConversionDirection, ConverterRegistry,
    EnumRepresentation, FormatContext, StoreEnum, StoreType, ToWire, ValueCodec, ValueType,
    WireValue, WireValueExt,
};
use std::error::Error;
use uuid::Uuid;

// =============================================================================
// Fixtures
// =============================================================================

struct UuidAsText;

impl ValueCodec<Uuid> for UuidAsText {
    fn convert_to(&self, value: &Uuid, _ctx: &FormatContext) -> CodecResult<WireValue> {
        Ok(WireValue::Text(value.to_string()))
    }

    fn convert_from(&self, wire: &WireValue, _ctx: &FormatContext) -> CodecResult<Uuid> {
        match wire {
            WireValue::Text(text) => Uuid::parse_str(text).map_err(CodecError::custom),
            other => Err(CodecError::UnexpectedWireKind {
                expected: "text",
                found: other.kind_name(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Access(i64);

impl Access {
    const READ: Access = Access(0x1);
    const WRITE: Access = Access(0x2);
    const ADMIN: Access = Access(0x8);
}

impl StoreType for Access {
    fn value_type() -> ValueType {
        ValueType::enumeration::<Self>()
    }
}

impl StoreEnum for Access {
    const FLAGS: bool = true;
    const VARIANTS: &'static [(&'static str, i64)] = &[("Read", 0x1), ("Write", 0x2), ("Admin", 0x8)];

    fn to_bits(&self) -> i64 {
        self.0
    }

    fn from_bits(bits: i64) -> Option<Self> {
        (bits & !0xb == 0).then_some(Access(bits))
    }
}

#[derive(Debug)]
struct Opaque;

impl StoreType for Opaque {
    fn value_type() -> ValueType {
        ValueType::plain::<Self>()
    }
}

fn sample_uuid() -> Uuid {
    Uuid::parse_str("6f9619ff-8b86-d011-b42d-00cf4fc964ff").unwrap()
}

// =============================================================================
// Precedence Tests
// =============================================================================

/// A custom codec overrides the built-in one for the same type.
#[test]
fn test_custom_codec_overrides_builtin() {
    let mut registry = ConverterRegistry::new();
    let id = sample_uuid();

    let builtin = registry.to_wire(&id, None).unwrap();
    assert!(matches!(builtin, WireValue::Bytes(ref b) if b.len() == 16));

    registry.register::<Uuid, _>(UuidAsText).unwrap();
    let custom = registry.to_wire(&id, None).unwrap();
    assert_eq!(custom, WireValue::Text(id.to_string()));
    assert_eq!(registry.from_wire::<Uuid>(&custom, None).unwrap(), id);
}

/// The derived nullable codec follows the custom registration.
#[test]
fn test_custom_codec_covers_nullable_form() {
    let mut registry = ConverterRegistry::new();
    registry.register::<Uuid, _>(UuidAsText).unwrap();

    let id = sample_uuid();
    assert_eq!(
        registry.to_wire(&Some(id), None).unwrap(),
        WireValue::Text(id.to_string())
    );
    assert_eq!(registry.to_wire(&None::<Uuid>, None).unwrap(), WireValue::Null);
}

/// Unregistering falls back to the built-in codec, for both forms.
#[test]
fn test_unregister_restores_builtin() {
    let mut registry = ConverterRegistry::new();
    registry.register::<Uuid, _>(UuidAsText).unwrap();
    assert!(registry.unregister::<Uuid>());

    let id = sample_uuid();
    let wire = registry.to_wire(&id, None).unwrap();
    assert_eq!(wire, WireValue::Bytes(id.to_bytes_le().to_vec()));

    let nullable = registry.to_wire(&Some(id), None).unwrap();
    assert_eq!(nullable, wire);
}

/// Built-ins are never removable.
#[test]
fn test_builtin_cannot_be_unregistered() {
    let mut registry = ConverterRegistry::new();
    assert!(!registry.unregister::<i64>());
    assert!(registry.is_convertible_type::<i64>());
}

/// A type with no codec of any kind is not convertible, and converting it fails.
#[test]
fn test_unsupported_type_reported() {
    let registry = ConverterRegistry::new();
    assert!(!registry.is_convertible(&ValueType::of::<Opaque>()));
    assert!(!registry.is_convertible_type::<Option<Opaque>>());

    let err = registry.to_wire(&Opaque, None).unwrap_err();
    assert!(err.is_no_codec());
    assert_eq!(err.direction(), ConversionDirection::ToWire);
    assert!(err.to_string().contains("Opaque"));

    let err = registry.from_wire::<Opaque>(&WireValue::Null, None).unwrap_err();
    assert!(matches!(err.cause(), ConversionCause::NoCodec));
}

// =============================================================================
// Enum Tests
// =============================================================================

/// Enums and their nullable forms need no registration.
#[test]
fn test_enums_convertible_without_registration() {
    let registry = ConverterRegistry::new();
    assert!(registry.is_convertible_type::<Access>());
    assert!(registry.is_convertible_type::<Option<Access>>());
}

/// Flag combinations write a composite name and read back the same bits.
#[test]
fn test_flag_combination_round_trip() {
    let registry = ConverterRegistry::new();
    let value = Access(Access::READ.0 | Access::ADMIN.0);

    let wire = value.to_wire(&registry).unwrap();
    assert_eq!(wire, WireValue::Text("Read, Admin".into()));
    assert_eq!(wire.to::<Access>(&registry).unwrap(), value);
}

/// Reading accepts either representation whatever the reader's context.
#[test]
fn test_enum_read_is_representation_agnostic() {
    let registry = ConverterRegistry::new();
    let numeric = FormatContext::enums(EnumRepresentation::AsNumeric);
    let value = Access::WRITE;

    let as_text = value.to_wire(&registry).unwrap();
    let as_number = value.to_wire_with(&registry, &numeric).unwrap();
    assert_ne!(as_text, as_number);

    for wire in [&as_text, &as_number] {
        assert_eq!(wire.to::<Access>(&registry).unwrap(), value);
        assert_eq!(wire.to_with::<Access>(&registry, &numeric).unwrap(), value);
    }
}

/// Bits outside the declared flags fail with the type named.
#[test]
fn test_invalid_enum_bits_fail() {
    let registry = ConverterRegistry::new();
    let err = WireValue::Integer(0x40).to::<Access>(&registry).unwrap_err();
    assert!(err.type_name().contains("Access"));
    assert!(err.source().unwrap().to_string().contains("64"));
}

// =============================================================================
// Error Wrapping Tests
// =============================================================================

/// Codec failures surface as ConversionError with the codec error as source.
#[test]
fn test_codec_failure_is_wrapped() {
    let registry = ConverterRegistry::new();
    let err = WireValue::Text("twelve".into()).to::<i32>(&registry).unwrap_err();

    assert_eq!(err.direction(), ConversionDirection::FromWire);
    assert!(!err.is_no_codec());
    assert!(err.source().unwrap().to_string().contains("twelve"));
}

/// The null sentinel is not a value of a non-nullable type.
#[test]
fn test_null_into_non_nullable_fails() {
    let registry = ConverterRegistry::new();
    assert!(WireValue::Null.to::<String>(&registry).is_err());
    assert_eq!(WireValue::Null.to::<Option<String>>(&registry).unwrap(), None);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

/// A registry shared after setup serves lookups from many threads.
#[test]
fn test_concurrent_lookups_after_setup() {
    let mut registry = ConverterRegistry::new();
    registry.register::<Uuid, _>(UuidAsText).unwrap();
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for n in 0..100i64 {
                    let value = i * 1000 + n;
                    let wire = registry.to_wire(&value, None).unwrap();
                    assert_eq!(registry.from_wire::<i64>(&wire, None).unwrap(), value);
                }
                let id = Uuid::new_v4();
                let wire = registry.to_wire(&id, None).unwrap();
                assert!(matches!(wire, WireValue::Text(_)));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
