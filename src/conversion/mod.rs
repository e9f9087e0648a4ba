//! Value conversion
//!
//! Maps typed values onto the flat [`WireValue`]s a key-value store keeps.
//!
//! ```ignore
//! use ohmstore::conversion::{ConverterRegistry, ToWire, WireValueExt};
//!
//! let registry = ConverterRegistry::new();
//! let wire = 42i64.to_wire(&registry)?;
//! let back: i64 = wire.to(&registry)?;
//! ```
//!
//! Custom codecs implement [`ValueCodec`] and are registered per registry.
//! Enums implement [`StoreEnum`] and need no codec of their own.

mod builtin;
mod codec;
mod enums;
mod errors;
mod ext;
mod format;
mod nullable;
mod registry;
mod timestamp;
mod wire;

pub use builtin::{builtin_types, NativeCodec, NativeScalar, UuidCodec};
pub use codec::{Shape, StoreType, TypeKey, ValueCodec, ValueType};
pub use enums::{EnumCodec, EnumInfo, NullableEnumCodec, StoreEnum};
pub use errors::{
    CodecError, CodecResult, ConversionCause, ConversionDirection, ConversionError, ConversionResult,
    RegistrationError,
};
pub use ext::{ToWire, WireValueExt};
pub use format::{EnumRepresentation, FormatContext, TimestampRepresentation};
pub use nullable::NullableAdapter;
pub use registry::ConverterRegistry;
pub use timestamp::{Timestamp, TimestampCodec, TimestampKind};
pub use wire::WireValue;
