//! Public schema view handed to the storage layer

use serde::Serialize;

use super::metadata::TypeMetadata;

/// Read-only summary of a [`TypeMetadata`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSchema {
    type_name: String,
    key_name: String,
    is_concurrency_enabled: bool,
    identity: Option<String>,
    concurrency_member: Option<String>,
    indexed: Vec<String>,
    mapped: Vec<String>,
}

impl ObjectSchema {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// True when the type-level marking enables concurrency or a member is marked Concurrency.
    pub fn is_concurrency_enabled(&self) -> bool {
        self.is_concurrency_enabled
    }

    /// Storage name of the identity member
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Storage name of the concurrency member
    pub fn concurrency_member(&self) -> Option<&str> {
        self.concurrency_member.as_deref()
    }

    /// Storage names of indexed members
    pub fn indexed(&self) -> &[String] {
        &self.indexed
    }

    /// Storage names of members marked for mapping
    pub fn mapped(&self) -> &[String] {
        &self.mapped
    }
}

impl From<&TypeMetadata> for ObjectSchema {
    fn from(metadata: &TypeMetadata) -> Self {
        Self {
            type_name: metadata.type_name().to_string(),
            key_name: metadata.key_name().to_string(),
            is_concurrency_enabled: metadata.concurrency() || metadata.concurrency_member().is_some(),
            identity: metadata.identity_member().map(|m| m.storage_name().to_string()),
            concurrency_member: metadata
                .concurrency_member()
                .map(|m| m.storage_name().to_string()),
            indexed: metadata
                .indexed_members()
                .map(|m| m.storage_name().to_string())
                .collect(),
            mapped: metadata
                .mapped_members()
                .map(|m| m.storage_name().to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::Timestamp;
    use crate::mapping::descriptor::{FieldDescriptor, Marking, ObjectMarking, TypeDescriptor};
    use crate::mapping::SchemaBuilder;

    struct Ticket;

    #[test]
    fn test_concurrency_from_member() {
        let descriptor = TypeDescriptor::class::<Ticket>()
            .field(FieldDescriptor::new::<Timestamp>("stamp").marked(Marking::Concurrency));
        let metadata = SchemaBuilder::parse_descriptor(&descriptor).unwrap();
        let schema = ObjectSchema::from(&metadata);

        assert!(schema.is_concurrency_enabled());
        assert_eq!(schema.concurrency_member(), Some("stamp"));
    }

    #[test]
    fn test_concurrency_from_type_marking() {
        let descriptor = TypeDescriptor::class::<Ticket>()
            .marking(ObjectMarking::default().with_concurrency(true));
        let schema = ObjectSchema::from(&SchemaBuilder::parse_descriptor(&descriptor).unwrap());
        assert!(schema.is_concurrency_enabled());
        assert_eq!(schema.concurrency_member(), None);
    }

    #[test]
    fn test_serializes_to_json() {
        let descriptor = TypeDescriptor::class::<Ticket>()
            .marking(ObjectMarking::named("ticket"))
            .field(FieldDescriptor::new::<i64>("id").marked(Marking::Key))
            .field(FieldDescriptor::new::<String>("queue").marked(Marking::Index));
        let schema = ObjectSchema::from(&SchemaBuilder::parse_descriptor(&descriptor).unwrap());

        let json: serde_json::Value = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["key_name"], "ticket");
        assert_eq!(json["is_concurrency_enabled"], false);
        assert_eq!(json["identity"], "id");
        assert_eq!(json["indexed"], serde_json::json!(["queue"]));
    }
}
