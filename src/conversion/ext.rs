//! Method-call sugar over [`ConverterRegistry`]

use super::codec::StoreType;
use super::errors::ConversionResult;
use super::format::FormatContext;
use super::registry::ConverterRegistry;
use super::wire::WireValue;

/// `value.to_wire(&registry)` for any storable value
pub trait ToWire: StoreType + Sized {
    fn to_wire(&self, registry: &ConverterRegistry) -> ConversionResult<WireValue> {
        registry.to_wire(self, None)
    }

    fn to_wire_with(
        &self,
        registry: &ConverterRegistry,
        ctx: &FormatContext,
    ) -> ConversionResult<WireValue> {
        registry.to_wire(self, Some(ctx))
    }
}

impl<T: StoreType> ToWire for T {}

/// `wire.to::<T>(&registry)`
pub trait WireValueExt {
    fn to<T: StoreType>(&self, registry: &ConverterRegistry) -> ConversionResult<T>;

    fn to_with<T: StoreType>(
        &self,
        registry: &ConverterRegistry,
        ctx: &FormatContext,
    ) -> ConversionResult<T>;
}

impl WireValueExt for WireValue {
    fn to<T: StoreType>(&self, registry: &ConverterRegistry) -> ConversionResult<T> {
        registry.from_wire(self, None)
    }

    fn to_with<T: StoreType>(
        &self,
        registry: &ConverterRegistry,
        ctx: &FormatContext,
    ) -> ConversionResult<T> {
        registry.from_wire(self, Some(ctx))
    }
}
