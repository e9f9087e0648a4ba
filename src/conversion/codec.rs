//! Codec traits and type identity
//!
//! Types are identified by [`TypeKey`]. A [`ValueType`] adds the structural
//! shape the dispatcher needs to pick a codec: plain, enum, nullable wrapper
//! or nullable enum.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use super::enums::EnumInfo;
use super::errors::{CodecError, CodecResult};
use super::format::FormatContext;
use super::nullable::NullableAdapter;
use super::wire::WireValue;

/// Stable identifier of a Rust type
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully-qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Structural kind of a value type
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// Any non-enum, non-nullable type (built-in or opaque)
    Plain,
    /// An enumerated type
    Enum(EnumInfo),
    /// `Option<T>` of a non-enum type `T`
    Nullable(TypeKey),
    /// `Option<E>` of an enumerated type `E`
    NullableEnum(EnumInfo),
}

/// A type identity together with its structural shape
#[derive(Debug, Clone, Copy)]
pub struct ValueType {
    key: TypeKey,
    shape: Shape,
}

impl ValueType {
    /// A non-enum, non-nullable type.
    pub fn plain<T: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            shape: Shape::Plain,
        }
    }

    /// An enumerated type.
    pub fn enumeration<E: super::enums::StoreEnum>() -> Self {
        Self {
            key: TypeKey::of::<E>(),
            shape: Shape::Enum(EnumInfo::of::<E>()),
        }
    }

    /// `Option<T>`, shaped after `T`.
    pub fn nullable_of<T: StoreType>() -> Self {
        let inner = T::value_type();
        let shape = match inner.shape {
            Shape::Enum(info) => Shape::NullableEnum(info),
            _ => Shape::Nullable(inner.key),
        };
        Self {
            key: TypeKey::of::<Option<T>>(),
            shape,
        }
    }

    pub fn of<T: StoreType>() -> Self {
        T::value_type()
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.key.name
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.key == TypeKey::of::<T>()
    }

    /// True for `T` itself or for `Option<T>`.
    pub fn is_or_nullable_of<T: 'static>(&self) -> bool {
        self.is::<T>() || matches!(self.shape, Shape::Nullable(inner) if inner == TypeKey::of::<T>())
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.shape, Shape::Enum(_))
    }

    pub fn is_nullable_enum(&self) -> bool {
        matches!(self.shape, Shape::NullableEnum(_))
    }

    /// True for any `Option<_>` shape.
    pub fn is_nullable(&self) -> bool {
        matches!(self.shape, Shape::Nullable(_) | Shape::NullableEnum(_))
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ValueType {}

/// Types that can describe their own [`ValueType`].
///
/// Implemented for every built-in, for `Option<T>`, and by enums through
/// [`ValueType::enumeration`]. Custom types return [`ValueType::plain`].
pub trait StoreType: Any + Send + Sync {
    fn value_type() -> ValueType;
}

impl<T: StoreType> StoreType for Option<T> {
    fn value_type() -> ValueType {
        ValueType::nullable_of::<T>()
    }
}

/// Bidirectional conversion between `T` and a [`WireValue`]
pub trait ValueCodec<T>: Send + Sync {
    fn convert_to(&self, value: &T, ctx: &FormatContext) -> CodecResult<WireValue>;

    fn convert_from(&self, wire: &WireValue, ctx: &FormatContext) -> CodecResult<T>;
}

impl<T, C: ValueCodec<T> + ?Sized> ValueCodec<T> for Arc<C> {
    fn convert_to(&self, value: &T, ctx: &FormatContext) -> CodecResult<WireValue> {
        (**self).convert_to(value, ctx)
    }

    fn convert_from(&self, wire: &WireValue, ctx: &FormatContext) -> CodecResult<T> {
        (**self).convert_from(wire, ctx)
    }
}

/// Type-erased codec stored in the registry
pub(crate) trait ErasedCodec: Send + Sync {
    fn convert_to(&self, value: &dyn Any, ctx: &FormatContext) -> CodecResult<WireValue>;

    fn convert_from(&self, wire: &WireValue, ctx: &FormatContext) -> CodecResult<Box<dyn Any + Send>>;

    /// The `Option<T>` codec derived from this one, if this is a value-type codec.
    fn nullable_companion(&self) -> Option<(TypeKey, Arc<dyn ErasedCodec>)>;
}

/// A value-type codec behind [`ErasedCodec`]; derives its `Option<T>` companion.
pub(crate) struct Erased<T, C> {
    codec: Arc<C>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C> Erased<T, C>
where
    T: Any + Send + Sync,
    C: ValueCodec<T> + 'static,
{
    pub(crate) fn value(codec: C) -> Arc<dyn ErasedCodec> {
        Arc::new(Self {
            codec: Arc::new(codec),
            _marker: PhantomData,
        })
    }
}

impl<T, C> ErasedCodec for Erased<T, C>
where
    T: Any + Send + Sync,
    C: ValueCodec<T> + 'static,
{
    fn convert_to(&self, value: &dyn Any, ctx: &FormatContext) -> CodecResult<WireValue> {
        self.codec.convert_to(downcast::<T>(value)?, ctx)
    }

    fn convert_from(&self, wire: &WireValue, ctx: &FormatContext) -> CodecResult<Box<dyn Any + Send>> {
        Ok(Box::new(self.codec.convert_from(wire, ctx)?))
    }

    fn nullable_companion(&self) -> Option<(TypeKey, Arc<dyn ErasedCodec>)> {
        let companion: Arc<dyn ErasedCodec> = Arc::new(Companion {
            adapter: NullableAdapter::new(Arc::clone(&self.codec)),
        });
        Some((TypeKey::of::<Option<T>>(), companion))
    }
}

/// The derived `Option<T>` codec. Has no companion of its own.
struct Companion<T, C> {
    adapter: NullableAdapter<T, Arc<C>>,
}

impl<T, C> ErasedCodec for Companion<T, C>
where
    T: Any + Send + Sync,
    C: ValueCodec<T> + 'static,
{
    fn convert_to(&self, value: &dyn Any, ctx: &FormatContext) -> CodecResult<WireValue> {
        self.adapter.convert_to(downcast::<Option<T>>(value)?, ctx)
    }

    fn convert_from(&self, wire: &WireValue, ctx: &FormatContext) -> CodecResult<Box<dyn Any + Send>> {
        Ok(Box::new(self.adapter.convert_from(wire, ctx)?))
    }

    fn nullable_companion(&self) -> Option<(TypeKey, Arc<dyn ErasedCodec>)> {
        None
    }
}

fn downcast<T: Any>(value: &dyn Any) -> CodecResult<&T> {
    value.downcast_ref::<T>().ok_or(CodecError::ValueTypeMismatch {
        expected: std::any::type_name::<T>(),
    })
}
