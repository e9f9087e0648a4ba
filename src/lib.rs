//! ohmstore - typed object mapping for key-value stores
//!
//! Two cooperating pieces:
//!
//! - [`conversion`]: a registry of bidirectional codecs between typed values
//!   and the flat scalar values a key-value store keeps
//! - [`mapping`]: a schema builder that validates which members of a declared
//!   type are mapped, and how, before any record of it is stored
//!
//! [`config`] loads process settings, [`identity`] handles record identities,
//! and [`observability`] emits structured log events.

pub mod config;
pub mod conversion;
pub mod identity;
pub mod mapping;
pub mod observability;
