//! Observable events for ohmstore
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded from disk
    ConfigLoaded,

    // Conversion
    /// Built-in codecs seeded
    BuiltinCodecsSeeded,
    /// Custom codec registered (with derived nullable companion, if any)
    CodecRegistered,
    /// Custom codec removed
    CodecUnregistered,
    /// Conversion failed at the registry boundary
    ConversionFailed,

    // Schema
    /// Type metadata built and validated
    SchemaBuilt,
    /// Declared type rejected
    SchemaRejected,
    /// Type metadata served from the schema cache
    SchemaCacheHit,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::BuiltinCodecsSeeded => "BUILTIN_CODECS_SEEDED",
            Event::CodecRegistered => "CODEC_REGISTERED",
            Event::CodecUnregistered => "CODEC_UNREGISTERED",
            Event::ConversionFailed => "CONVERSION_FAILED",

            Event::SchemaBuilt => "SCHEMA_BUILT",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::SchemaCacheHit => "SCHEMA_CACHE_HIT",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
