//! Schema mapping
//!
//! Validates which members of a declared type take part in the mapping, and
//! under which rules, before any record of that type is read or written.
//!
//! ```ignore
//! use ohmstore::mapping::{FieldDescriptor, Mapped, Marking, SchemaBuilder, TypeDescriptor};
//!
//! struct Order;
//!
//! impl Mapped for Order {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::class::<Order>()
//!             .field(FieldDescriptor::new::<String>("number").marked(Marking::Key))
//!     }
//! }
//!
//! let metadata = SchemaBuilder::parse::<Order>()?;
//! ```

mod builder;
mod cache;
mod descriptor;
mod errors;
mod metadata;
mod schema;
mod validators;

pub use builder::SchemaBuilder;
pub use cache::SchemaCache;
pub use descriptor::{
    Accessor, Constructor, FieldDescriptor, Mapped, Marking, MarkingKind, MemberDescriptor,
    ObjectMarking, PropertyDescriptor, TypeDescriptor, TypeKind, Visibility,
};
pub use errors::{InvalidSchemaError, SchemaErrorCode, SchemaResult};
pub use metadata::{AccessorFlags, MemberFlags, MemberMetadata, TypeMetadata};
pub use schema::ObjectSchema;
