//! Enum and nullable-enum codecs
//!
//! These work over any enum through [`EnumInfo`], a copyable erased view of a
//! [`StoreEnum`] implementation, rather than over a fixed set of types.
//!
//! Writing honours the enum facet of the [`FormatContext`]. Reading accepts
//! both representations regardless of the facet, since the context used to
//! read may differ from the one used to write.

use std::any::Any;
use std::cmp::Reverse;
use std::fmt;

use super::codec::{StoreType, ValueType};
use super::errors::{CodecError, CodecResult};
use super::format::{EnumRepresentation, FormatContext};
use super::wire::WireValue;

/// An enumerated type that can be stored.
///
/// Plain enums list one entry per variant. Flag enums (`FLAGS = true`) list
/// their single bits; any combination of listed bits must round-trip through
/// `to_bits`/`from_bits`.
pub trait StoreEnum: StoreType + Copy {
    /// Whether values are bit combinations of the listed variants
    const FLAGS: bool = false;

    /// Declared names and their integral values
    const VARIANTS: &'static [(&'static str, i64)];

    fn to_bits(&self) -> i64;

    fn from_bits(bits: i64) -> Option<Self>;
}

/// Erased view of a [`StoreEnum`]
#[derive(Clone, Copy)]
pub struct EnumInfo {
    name: &'static str,
    flags: bool,
    variants: &'static [(&'static str, i64)],
    to_bits: fn(&dyn Any) -> Option<i64>,
    from_bits: fn(i64) -> Option<Box<dyn Any + Send>>,
    nullable_to_bits: fn(&dyn Any) -> Option<Option<i64>>,
    nullable_from_bits: fn(Option<i64>) -> Option<Box<dyn Any + Send>>,
}

impl EnumInfo {
    pub fn of<E: StoreEnum>() -> Self {
        Self {
            name: std::any::type_name::<E>(),
            flags: E::FLAGS,
            variants: E::VARIANTS,
            to_bits: erased_to_bits::<E>,
            from_bits: erased_from_bits::<E>,
            nullable_to_bits: erased_nullable_to_bits::<E>,
            nullable_from_bits: erased_nullable_from_bits::<E>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_flags(&self) -> bool {
        self.flags
    }

    pub fn variants(&self) -> &'static [(&'static str, i64)] {
        self.variants
    }

    /// Symbolic form of `bits`, or `None` when no name or combination covers it.
    pub fn format_name(&self, bits: i64) -> Option<String> {
        if let Some((name, _)) = self.variants.iter().find(|(_, value)| *value == bits) {
            return Some((*name).to_string());
        }
        if !self.flags {
            return None;
        }

        let mut by_value: Vec<_> = self.variants.iter().filter(|(_, value)| *value != 0).collect();
        by_value.sort_by_key(|(_, value)| Reverse(*value));

        let mut remaining = bits;
        let mut names = Vec::new();
        for (name, value) in by_value {
            if remaining & value == *value {
                remaining &= !value;
                names.push(*name);
            }
        }
        if remaining != 0 || names.is_empty() {
            return None;
        }
        names.reverse();
        Some(names.join(", "))
    }

    /// Parses a name, a number, or a comma-separated mix of both (OR-ed).
    pub fn parse_text(&self, text: &str) -> CodecResult<i64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CodecError::Malformed {
                expected: "enum",
                text: text.to_string(),
            });
        }

        let mut bits = 0i64;
        for part in trimmed.split(',') {
            let part = part.trim();
            let numeric = part
                .chars()
                .next()
                .map_or(false, |c| c.is_ascii_digit() || c == '-' || c == '+');
            let value = if numeric {
                part.parse::<i64>().map_err(|_| CodecError::Malformed {
                    expected: "enum",
                    text: text.to_string(),
                })?
            } else {
                self.variants
                    .iter()
                    .find(|(name, _)| *name == part)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| CodecError::UnknownVariant {
                        enum_name: self.name,
                        name: part.to_string(),
                    })?
            };
            bits |= value;
        }
        Ok(bits)
    }

    fn encode(&self, bits: i64, ctx: &FormatContext) -> WireValue {
        match ctx.enum_representation() {
            EnumRepresentation::AsNumeric => WireValue::Integer(bits),
            EnumRepresentation::AsString => {
                WireValue::Text(self.format_name(bits).unwrap_or_else(|| bits.to_string()))
            }
        }
    }

    fn decode(&self, wire: &WireValue) -> CodecResult<i64> {
        match wire {
            WireValue::Integer(bits) => Ok(*bits),
            other => self.parse_text(&other.as_text("enum")?),
        }
    }

    fn invalid(&self, bits: i64) -> CodecError {
        CodecError::InvalidEnumValue {
            enum_name: self.name,
            bits,
        }
    }
}

impl fmt::Debug for EnumInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumInfo")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("variants", &self.variants)
            .finish()
    }
}

fn erased_to_bits<E: StoreEnum>(value: &dyn Any) -> Option<i64> {
    value.downcast_ref::<E>().map(E::to_bits)
}

fn erased_from_bits<E: StoreEnum>(bits: i64) -> Option<Box<dyn Any + Send>> {
    E::from_bits(bits).map(|value| Box::new(value) as Box<dyn Any + Send>)
}

fn erased_nullable_to_bits<E: StoreEnum>(value: &dyn Any) -> Option<Option<i64>> {
    value
        .downcast_ref::<Option<E>>()
        .map(|value| value.as_ref().map(E::to_bits))
}

fn erased_nullable_from_bits<E: StoreEnum>(bits: Option<i64>) -> Option<Box<dyn Any + Send>> {
    match bits {
        None => Some(Box::new(None::<E>)),
        Some(bits) => E::from_bits(bits).map(|value| Box::new(Some(value)) as Box<dyn Any + Send>),
    }
}

/// Codec for any enumerated type
pub struct EnumCodec;

impl EnumCodec {
    pub fn is_enum(ty: &ValueType) -> bool {
        ty.is_enum()
    }

    pub fn convert_to(value: &dyn Any, info: &EnumInfo, ctx: &FormatContext) -> CodecResult<WireValue> {
        let bits = (info.to_bits)(value).ok_or(CodecError::ValueTypeMismatch { expected: info.name })?;
        Ok(info.encode(bits, ctx))
    }

    pub fn convert_from(
        wire: &WireValue,
        info: &EnumInfo,
        _ctx: &FormatContext,
    ) -> CodecResult<Box<dyn Any + Send>> {
        let bits = info.decode(wire)?;
        (info.from_bits)(bits).ok_or_else(|| info.invalid(bits))
    }
}

/// Codec for `Option<E>` of any enumerated type `E`
pub struct NullableEnumCodec;

impl NullableEnumCodec {
    pub fn is_nullable_enum(ty: &ValueType) -> bool {
        ty.is_nullable_enum()
    }

    pub fn convert_to(value: &dyn Any, info: &EnumInfo, ctx: &FormatContext) -> CodecResult<WireValue> {
        match (info.nullable_to_bits)(value) {
            None => Err(CodecError::ValueTypeMismatch { expected: info.name }),
            Some(None) => Ok(WireValue::Null),
            Some(Some(bits)) => Ok(info.encode(bits, ctx)),
        }
    }

    pub fn convert_from(
        wire: &WireValue,
        info: &EnumInfo,
        _ctx: &FormatContext,
    ) -> CodecResult<Box<dyn Any + Send>> {
        if wire.is_null() {
            return (info.nullable_from_bits)(None).ok_or(CodecError::UnexpectedNull);
        }
        let bits = info.decode(wire)?;
        (info.nullable_from_bits)(Some(bits)).ok_or_else(|| info.invalid(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Color {
        Red,
        Green,
    }

    impl StoreType for Color {
        fn value_type() -> ValueType {
            ValueType::enumeration::<Self>()
        }
    }

    impl StoreEnum for Color {
        const VARIANTS: &'static [(&'static str, i64)] = &[("Red", 0), ("Green", 1)];

        fn to_bits(&self) -> i64 {
            *self as i64
        }

        fn from_bits(bits: i64) -> Option<Self> {
            match bits {
                0 => Some(Color::Red),
                1 => Some(Color::Green),
                _ => None,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Perm(i64);

    impl StoreType for Perm {
        fn value_type() -> ValueType {
            ValueType::enumeration::<Self>()
        }
    }

    impl StoreEnum for Perm {
        const FLAGS: bool = true;
        const VARIANTS: &'static [(&'static str, i64)] = &[("Read", 0x1), ("Write", 0x10)];

        fn to_bits(&self) -> i64 {
            self.0
        }

        fn from_bits(bits: i64) -> Option<Self> {
            (bits & !0x11 == 0).then_some(Perm(bits))
        }
    }

    #[test]
    fn test_string_and_numeric_forms_differ_but_both_parse() {
        let info = EnumInfo::of::<Color>();
        let as_string = EnumCodec::convert_to(&Color::Green, &info, &FormatContext::empty()).unwrap();
        let as_numeric = EnumCodec::convert_to(
            &Color::Green,
            &info,
            &FormatContext::enums(EnumRepresentation::AsNumeric),
        )
        .unwrap();

        assert_eq!(as_string, WireValue::Text("Green".into()));
        assert_eq!(as_numeric, WireValue::Integer(1));

        for wire in [as_string, as_numeric] {
            let back = EnumCodec::convert_from(&wire, &info, &FormatContext::empty()).unwrap();
            assert_eq!(*back.downcast::<Color>().unwrap(), Color::Green);
        }
    }

    #[test]
    fn test_flags_composite_name() {
        let info = EnumInfo::of::<Perm>();
        assert_eq!(info.format_name(0x11).as_deref(), Some("Read, Write"));
        assert_eq!(info.format_name(0x10).as_deref(), Some("Write"));
        assert_eq!(info.format_name(0x100), None);
        assert_eq!(info.parse_text("Read, Write").unwrap(), 0x11);
        assert_eq!(info.parse_text("Write,1").unwrap(), 0x11);
    }

    #[test]
    fn test_unknown_name_rejected() {
        let info = EnumInfo::of::<Color>();
        let err = info.parse_text("Blue").unwrap_err();
        assert!(matches!(err, CodecError::UnknownVariant { .. }));
    }

    #[test]
    fn test_undefined_value_rejected() {
        let info = EnumInfo::of::<Color>();
        let err = EnumCodec::convert_from(&WireValue::Integer(7), &info, &FormatContext::empty()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidEnumValue { bits: 7, .. }));
    }

    #[test]
    fn test_nullable_enum_none() {
        let info = EnumInfo::of::<Color>();
        let wire = NullableEnumCodec::convert_to(&None::<Color>, &info, &FormatContext::empty()).unwrap();
        assert!(wire.is_null());

        let back = NullableEnumCodec::convert_from(&wire, &info, &FormatContext::empty()).unwrap();
        assert_eq!(*back.downcast::<Option<Color>>().unwrap(), None);
    }

    #[test]
    fn test_nullable_enum_rejects_plain_value() {
        let info = EnumInfo::of::<Color>();
        let err = NullableEnumCodec::convert_to(&Color::Red, &info, &FormatContext::empty()).unwrap_err();
        assert!(matches!(err, CodecError::ValueTypeMismatch { .. }));
    }
}
