//! Lifts a value-type codec to its `Option` form

use std::marker::PhantomData;

use super::codec::ValueCodec;
use super::errors::CodecResult;
use super::format::FormatContext;
use super::wire::WireValue;

/// `ValueCodec<Option<T>>` built from any `ValueCodec<T>`.
///
/// `None` maps to [`WireValue::Null`] and back; everything else delegates.
pub struct NullableAdapter<T, C> {
    inner: C,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C: ValueCodec<T>> NullableAdapter<T, C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<T, C: ValueCodec<T>> ValueCodec<Option<T>> for NullableAdapter<T, C> {
    fn convert_to(&self, value: &Option<T>, ctx: &FormatContext) -> CodecResult<WireValue> {
        match value {
            Some(inner) => self.inner.convert_to(inner, ctx),
            None => Ok(WireValue::Null),
        }
    }

    fn convert_from(&self, wire: &WireValue, ctx: &FormatContext) -> CodecResult<Option<T>> {
        if wire.is_null() {
            return Ok(None);
        }
        self.inner.convert_from(wire, ctx).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::errors::CodecError;

    struct Celsius;

    impl ValueCodec<f64> for Celsius {
        fn convert_to(&self, value: &f64, _ctx: &FormatContext) -> CodecResult<WireValue> {
            Ok(WireValue::Text(format!("{value}C")))
        }

        fn convert_from(&self, wire: &WireValue, _ctx: &FormatContext) -> CodecResult<f64> {
            let text = wire.as_text("celsius")?;
            text.trim_end_matches('C').parse().map_err(CodecError::custom)
        }
    }

    #[test]
    fn test_none_is_null_sentinel() {
        let codec = NullableAdapter::new(Celsius);
        let ctx = FormatContext::empty();

        assert_eq!(codec.convert_to(&None, &ctx).unwrap(), WireValue::Null);
        assert_eq!(codec.convert_from(&WireValue::Null, &ctx).unwrap(), None);
    }

    #[test]
    fn test_some_delegates() {
        let codec = NullableAdapter::new(Celsius);
        let ctx = FormatContext::empty();

        let wire = codec.convert_to(&Some(21.5), &ctx).unwrap();
        assert_eq!(wire, WireValue::Text("21.5C".into()));
        assert_eq!(codec.convert_from(&wire, &ctx).unwrap(), Some(21.5));
    }
}
