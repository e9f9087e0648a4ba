//! Conversion error types
//!
//! Codecs fail with [`CodecError`]. The registry never lets a `CodecError`
//! escape on its own: every failure crossing the registry boundary is wrapped
//! in a [`ConversionError`] naming the type and the direction.

use std::fmt;

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Result type for registry conversions
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Failure raised inside a single codec
#[derive(Debug, Error)]
pub enum CodecError {
    /// Null sentinel handed to a codec for a non-nullable type
    #[error("null wire value cannot be converted to a non-nullable type")]
    UnexpectedNull,

    /// Wire variant the codec does not understand
    #[error("expected {expected} wire value, found {found}")]
    UnexpectedWireKind {
        expected: &'static str,
        found: &'static str,
    },

    /// Text that does not parse as the expected form
    #[error("malformed {expected} value '{text}'")]
    Malformed { expected: &'static str, text: String },

    /// Value that does not fit the target type
    #[error("value {value} out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    /// Runtime value whose type does not match the declared type
    #[error("value is not of type {expected}")]
    ValueTypeMismatch { expected: &'static str },

    /// Enum text naming no declared variant
    #[error("'{name}' is not a variant of {enum_name}")]
    UnknownVariant {
        enum_name: &'static str,
        name: String,
    },

    /// Enum bits that no value of the enum represents
    #[error("{bits} is not a valid value of {enum_name}")]
    InvalidEnumValue { enum_name: &'static str, bits: i64 },

    /// Local time that does not exist in the current time zone
    #[error("local time {0} does not exist in the current time zone")]
    NonexistentLocalTime(String),

    /// Failure reported by a caller-registered codec
    #[error("{0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl CodecError {
    /// Wraps an arbitrary error raised by a custom codec.
    pub fn custom<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        CodecError::Custom(error.into())
    }
}

/// Direction of a failed conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionDirection {
    /// Typed value to wire value
    ToWire,
    /// Wire value to typed value
    FromWire,
}

impl fmt::Display for ConversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionDirection::ToWire => write!(f, "to wire value"),
            ConversionDirection::FromWire => write!(f, "from wire value"),
        }
    }
}

/// Cause attached to a [`ConversionError`]
#[derive(Debug, Error)]
pub enum ConversionCause {
    /// No custom, built-in, enum or nullable-enum codec matched the type
    #[error("no supported codec found")]
    NoCodec,

    /// The resolved codec failed
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Failure raised at the registry boundary
#[derive(Debug, Error)]
#[error("failed to convert type '{type_name}' {direction}")]
pub struct ConversionError {
    type_name: &'static str,
    direction: ConversionDirection,
    #[source]
    cause: ConversionCause,
}

impl ConversionError {
    pub(crate) fn new(
        type_name: &'static str,
        direction: ConversionDirection,
        cause: ConversionCause,
    ) -> Self {
        Self {
            type_name,
            direction,
            cause,
        }
    }

    /// Returns the name of the type that failed to convert
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the conversion direction
    pub fn direction(&self) -> ConversionDirection {
        self.direction
    }

    /// Returns the underlying cause
    pub fn cause(&self) -> &ConversionCause {
        &self.cause
    }

    /// Returns true when no codec resolved for the type
    pub fn is_no_codec(&self) -> bool {
        matches!(self.cause, ConversionCause::NoCodec)
    }
}

/// Failure registering a custom codec
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// `Option<_>` forms are derived from the value-type codec, never registered directly
    #[error("cannot register a codec for nullable type '{0}'; register the inner type instead")]
    NullableForm(&'static str),
}
