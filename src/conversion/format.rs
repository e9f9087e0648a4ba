//! Format contexts select among valid wire representations of a type
//!
//! A [`FormatContext`] is threaded through every conversion. Each codec reads
//! only the facet it owns and ignores the rest, so adding a facet never widens
//! the codec interface.

use serde::{Deserialize, Serialize};

/// How an enum value is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumRepresentation {
    /// Declared variant name (composite for flag combinations)
    #[default]
    AsString,
    /// Underlying integral value
    AsNumeric,
}

/// How a timestamp is written and reinterpreted when read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampRepresentation {
    /// Date only; time of day and zone are dropped
    AsDate,
    /// Full timestamp, read back as UTC
    AsUtcTime,
    /// Full timestamp, read back as local time
    #[default]
    AsLocalTime,
}

impl TimestampRepresentation {
    pub fn is_date_only(&self) -> bool {
        matches!(self, TimestampRepresentation::AsDate)
    }
}

/// Immutable formatting options passed to codecs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enum_representation: Option<EnumRepresentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp_representation: Option<TimestampRepresentation>,
}

impl FormatContext {
    /// A context with no facet set; every codec uses its default.
    pub const fn empty() -> Self {
        Self {
            enum_representation: None,
            timestamp_representation: None,
        }
    }

    /// A context that only controls enum representation.
    pub const fn enums(representation: EnumRepresentation) -> Self {
        Self {
            enum_representation: Some(representation),
            timestamp_representation: None,
        }
    }

    /// A context that only controls timestamp representation.
    pub const fn timestamps(representation: TimestampRepresentation) -> Self {
        Self {
            enum_representation: None,
            timestamp_representation: Some(representation),
        }
    }

    pub const fn with_enum(mut self, representation: EnumRepresentation) -> Self {
        self.enum_representation = Some(representation);
        self
    }

    pub const fn with_timestamp(mut self, representation: TimestampRepresentation) -> Self {
        self.timestamp_representation = Some(representation);
        self
    }

    /// Explicitly requested enum representation, if any
    pub fn enum_facet(&self) -> Option<EnumRepresentation> {
        self.enum_representation
    }

    /// Explicitly requested timestamp representation, if any
    pub fn timestamp_facet(&self) -> Option<TimestampRepresentation> {
        self.timestamp_representation
    }

    /// Enum representation in effect
    pub fn enum_representation(&self) -> EnumRepresentation {
        self.enum_representation.unwrap_or_default()
    }

    /// Timestamp representation in effect
    pub fn timestamp_representation(&self) -> TimestampRepresentation {
        self.timestamp_representation.unwrap_or_default()
    }

    /// Fills facets unset in `self` from `fallback`.
    pub fn or(self, fallback: &FormatContext) -> Self {
        Self {
            enum_representation: self.enum_representation.or(fallback.enum_representation),
            timestamp_representation: self
                .timestamp_representation
                .or(fallback.timestamp_representation),
        }
    }
}
