//! Observability for ohmstore
//!
//! Structured JSON logging of lifecycle events. Observability is read-only:
//! logging never changes the outcome of a conversion or a schema build.
//!
//! ```ignore
//! use ohmstore::observability::{log_event_with_fields, Event, Severity};
//!
//! log_event_with_fields(Severity::Info, Event::SchemaBuilt, &[("type", "shop::Order")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(severity: Severity, event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity, event.as_str(), fields);
}
