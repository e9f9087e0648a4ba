//! Converter registry
//!
//! Resolves a codec for a [`ValueType`] in fixed precedence:
//!
//! 1. custom codecs registered on this registry
//! 2. built-in codecs (shared, seeded once per process)
//! 3. the enum codec, for enumerated types
//! 4. the nullable-enum codec, for `Option<E>` of an enumerated type
//!
//! Registration takes `&mut self`, so it can only happen while the registry is
//! exclusively owned. Once shared (typically behind an `Arc`) the registry is
//! read-only and lookups are safe from any number of threads.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use super::builtin::{insert_with_companion, CodecMap, BUILTIN_CODECS};
use super::codec::{Erased, ErasedCodec, Shape, StoreType, TypeKey, ValueCodec, ValueType};
use super::enums::{EnumCodec, EnumInfo, NullableEnumCodec};
use super::errors::{
    CodecError, ConversionCause, ConversionDirection, ConversionError, ConversionResult, RegistrationError,
};
use super::format::FormatContext;
use super::wire::WireValue;
use crate::config::MapperConfig;
use crate::observability::{log_event_with_fields, Event, Severity};

enum Resolved<'a> {
    Codec(&'a dyn ErasedCodec),
    Enum(EnumInfo),
    NullableEnum(EnumInfo),
}

/// Dispatches conversions between typed values and [`WireValue`]s
pub struct ConverterRegistry {
    builtins: Arc<CodecMap>,
    custom: CodecMap,
    /// Registered key -> key of its derived `Option<_>` companion
    companions: HashMap<TypeKey, TypeKey>,
    default_format: FormatContext,
}

impl ConverterRegistry {
    /// Creates a registry with only the built-in codecs.
    pub fn new() -> Self {
        Self::with_default_format(FormatContext::empty())
    }

    /// Creates a registry whose conversions fall back to `format` when the
    /// caller supplies no context, or for facets the caller leaves unset.
    pub fn with_default_format(format: FormatContext) -> Self {
        Self {
            builtins: Arc::clone(&BUILTIN_CODECS),
            custom: CodecMap::new(),
            companions: HashMap::new(),
            default_format: format,
        }
    }

    /// Creates a registry using the configured default representations.
    pub fn with_config(config: &MapperConfig) -> Self {
        Self::with_default_format(config.default_format())
    }

    pub fn default_format(&self) -> FormatContext {
        self.default_format
    }

    /// Returns true if a codec resolves for `ty`.
    pub fn is_convertible(&self, ty: &ValueType) -> bool {
        self.resolve(ty).is_some()
    }

    pub fn is_convertible_type<T: StoreType>(&self) -> bool {
        self.is_convertible(&T::value_type())
    }

    /// Returns true if a custom codec is registered for `T` (or derived for it).
    pub fn has_custom<T: 'static>(&self) -> bool {
        self.custom.contains_key(&TypeKey::of::<T>())
    }

    /// Converts a value of type `ty` to its wire form.
    ///
    /// `value` must be a `ty`; any other runtime type fails with a
    /// [`ConversionError`].
    pub fn convert_to(
        &self,
        value: &dyn Any,
        ty: &ValueType,
        ctx: Option<&FormatContext>,
    ) -> ConversionResult<WireValue> {
        let ctx = self.effective_format(ctx);
        let result = match self.resolve(ty) {
            None => Err(ConversionCause::NoCodec),
            Some(Resolved::Codec(codec)) => codec.convert_to(value, &ctx).map_err(Into::into),
            Some(Resolved::Enum(info)) => EnumCodec::convert_to(value, &info, &ctx).map_err(Into::into),
            Some(Resolved::NullableEnum(info)) => {
                NullableEnumCodec::convert_to(value, &info, &ctx).map_err(Into::into)
            }
        };
        result.map_err(|cause| self.failure(ty, ConversionDirection::ToWire, cause))
    }

    /// Converts a wire value back to a boxed value of type `ty`.
    pub fn convert_from(
        &self,
        wire: &WireValue,
        ty: &ValueType,
        ctx: Option<&FormatContext>,
    ) -> ConversionResult<Box<dyn Any + Send>> {
        let ctx = self.effective_format(ctx);
        let result = match self.resolve(ty) {
            None => Err(ConversionCause::NoCodec),
            Some(Resolved::Codec(codec)) => codec.convert_from(wire, &ctx).map_err(Into::into),
            Some(Resolved::Enum(info)) => EnumCodec::convert_from(wire, &info, &ctx).map_err(Into::into),
            Some(Resolved::NullableEnum(info)) => {
                NullableEnumCodec::convert_from(wire, &info, &ctx).map_err(Into::into)
            }
        };
        result.map_err(|cause| self.failure(ty, ConversionDirection::FromWire, cause))
    }

    /// Typed form of [`convert_to`](Self::convert_to).
    pub fn to_wire<T: StoreType>(
        &self,
        value: &T,
        ctx: Option<&FormatContext>,
    ) -> ConversionResult<WireValue> {
        self.convert_to(value, &T::value_type(), ctx)
    }

    /// Typed form of [`convert_from`](Self::convert_from).
    pub fn from_wire<T: StoreType>(
        &self,
        wire: &WireValue,
        ctx: Option<&FormatContext>,
    ) -> ConversionResult<T> {
        let ty = T::value_type();
        self.convert_from(wire, &ty, ctx)?.downcast::<T>().map(|value| *value).map_err(|_| {
            self.failure(
                &ty,
                ConversionDirection::FromWire,
                CodecError::ValueTypeMismatch {
                    expected: ty.name(),
                }
                .into(),
            )
        })
    }

    /// Registers a custom codec for `T`, replacing any previous one.
    ///
    /// The `Option<T>` codec is derived and registered alongside it.
    /// Registering an `Option<_>` type directly is rejected.
    pub fn register<T, C>(&mut self, codec: C) -> Result<(), RegistrationError>
    where
        T: StoreType,
        C: ValueCodec<T> + 'static,
    {
        let ty = T::value_type();
        if ty.is_nullable() {
            return Err(RegistrationError::NullableForm(ty.name()));
        }

        self.unregister_key(ty.key());
        let codec = Erased::<T, C>::value(codec);
        if let Some(companion) = insert_with_companion(&mut self.custom, ty.key(), codec) {
            self.companions.insert(ty.key(), companion);
        }

        log_event_with_fields(Severity::Info, Event::CodecRegistered, &[("type", ty.name())]);
        Ok(())
    }

    /// Removes the custom codec for `T` and its derived `Option<T>` codec.
    ///
    /// Built-in codecs are never removed; a type that had one falls back to it.
    pub fn unregister<T: StoreType>(&mut self) -> bool {
        self.unregister_key(T::value_type().key())
    }

    /// Removes the custom codec registered under `key`. Returns false if there was none.
    pub fn unregister_key(&mut self, key: TypeKey) -> bool {
        let removed = self.custom.remove(&key).is_some();
        if let Some(companion) = self.companions.remove(&key) {
            self.custom.remove(&companion);
        }
        if removed {
            log_event_with_fields(Severity::Info, Event::CodecUnregistered, &[("type", key.name())]);
        }
        removed
    }

    fn resolve(&self, ty: &ValueType) -> Option<Resolved<'_>> {
        let key = ty.key();
        if let Some(codec) = self.custom.get(&key) {
            return Some(Resolved::Codec(codec.as_ref()));
        }
        if let Some(codec) = self.builtins.get(&key) {
            return Some(Resolved::Codec(codec.as_ref()));
        }
        match ty.shape() {
            Shape::Enum(info) => Some(Resolved::Enum(info)),
            Shape::NullableEnum(info) => Some(Resolved::NullableEnum(info)),
            Shape::Plain | Shape::Nullable(_) => None,
        }
    }

    fn effective_format(&self, ctx: Option<&FormatContext>) -> FormatContext {
        ctx.map_or(self.default_format, |ctx| ctx.or(&self.default_format))
    }

    fn failure(
        &self,
        ty: &ValueType,
        direction: ConversionDirection,
        cause: ConversionCause,
    ) -> ConversionError {
        let cause_text = cause.to_string();
        let direction_text = direction.to_string();
        log_event_with_fields(
            Severity::Trace,
            Event::ConversionFailed,
            &[
                ("cause", cause_text.as_str()),
                ("direction", direction_text.as_str()),
                ("type", ty.name()),
            ],
        );
        ConversionError::new(ty.name(), direction, cause)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
