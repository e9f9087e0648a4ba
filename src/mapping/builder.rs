//! Schema builder
//!
//! Builds [`TypeMetadata`] for a declared type in two phases: the type itself,
//! then each member in walker order. The build is atomic; the first violation
//! is returned and no partial metadata escapes.

use crate::observability::{log_event_with_fields, Event, Severity};

use super::descriptor::{Mapped, TypeDescriptor};
use super::errors::SchemaResult;
use super::metadata::TypeMetadata;
use super::validators::{self, MEMBER_RULES};

/// Entry point for schema building
///
/// Stateless: every call walks the descriptor again. See
/// [`SchemaCache`](super::SchemaCache) for memoization.
pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Builds the metadata for `T`.
    pub fn parse<T: Mapped>() -> SchemaResult<TypeMetadata> {
        Self::parse_descriptor(&T::descriptor())
    }

    /// Builds the metadata for a hand-assembled descriptor.
    pub fn parse_descriptor(descriptor: &TypeDescriptor) -> SchemaResult<TypeMetadata> {
        let result = build(descriptor);

        match &result {
            Ok(metadata) => {
                let members = metadata.members().len().to_string();
                log_event_with_fields(
                    Severity::Info,
                    Event::SchemaBuilt,
                    &[
                        ("key_name", metadata.key_name()),
                        ("members", members.as_str()),
                        ("type", metadata.type_name()),
                    ],
                );
            }
            Err(err) => {
                log_event_with_fields(
                    Severity::Warn,
                    Event::SchemaRejected,
                    &[
                        ("code", err.code().code()),
                        ("member", err.member().unwrap_or("")),
                        ("type", err.type_name()),
                    ],
                );
            }
        }

        result
    }
}

fn build(descriptor: &TypeDescriptor) -> SchemaResult<TypeMetadata> {
    validators::validate_type(descriptor)?;

    let mut metadata = TypeMetadata::new(descriptor.key, &descriptor.name);
    validators::apply_object_marking(descriptor.object_marking.as_ref(), &mut metadata)?;

    for member in descriptor.members() {
        validators::check_repeated(&descriptor.name, &member)?;
        let index = metadata.push_member(validators::classify(&member));

        for (kind, rule) in MEMBER_RULES.iter() {
            if let Some(marking) = member.marking(*kind) {
                rule(marking, &mut metadata, index)?;
            }
        }
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{EnumRepresentation, Timestamp};
    use crate::mapping::descriptor::{FieldDescriptor, Marking, ObjectMarking, Visibility};
    use crate::mapping::errors::SchemaErrorCode;

    struct Invoice;

    impl Mapped for Invoice {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::class::<Invoice>()
                .marking(ObjectMarking::named("invoice").with_concurrency(true))
                .field(FieldDescriptor::new::<String>("number").marked(Marking::Key))
                .field(FieldDescriptor::new::<Timestamp>("updated").marked(Marking::Concurrency))
                .field(FieldDescriptor::new::<i64>("total").marked(Marking::renamed("amount")))
                .field(FieldDescriptor::new::<String>("notes").marked(Marking::Ignore))
        }
    }

    #[test]
    fn test_parse_marked_type() {
        let metadata = SchemaBuilder::parse::<Invoice>().unwrap();

        assert_eq!(metadata.key_name(), "invoice");
        assert!(metadata.concurrency());
        assert_eq!(metadata.identity_member().map(|m| m.name()), Some("number"));
        assert_eq!(metadata.concurrency_member().map(|m| m.name()), Some("updated"));
        assert_eq!(metadata.member("total").unwrap().storage_name(), "amount");
        assert!(metadata.member("notes").unwrap().is_ignored());
        assert_eq!(metadata.mapped_members().count(), 3);
    }

    #[test]
    fn test_first_violation_wins() {
        let descriptor = TypeDescriptor::class::<Invoice>()
            .field(
                FieldDescriptor::new::<i64>("hidden")
                    .visibility(Visibility::Private)
                    .marked(Marking::member()),
            )
            .field(FieldDescriptor::new::<i64>("a").marked(Marking::Key))
            .field(FieldDescriptor::new::<i64>("b").marked(Marking::Key));

        let err = SchemaBuilder::parse_descriptor(&descriptor).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnmappableMember);
        assert_eq!(err.member(), Some("hidden"));
    }

    #[test]
    fn test_enum_format_on_non_enum_rejected() {
        let descriptor = TypeDescriptor::class::<Invoice>().field(
            FieldDescriptor::new::<i64>("total")
                .marked(Marking::EnumFormat(EnumRepresentation::AsNumeric)),
        );

        let err = SchemaBuilder::parse_descriptor(&descriptor).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MemberTypeMismatch);
    }

    #[test]
    fn test_empty_key_name_rejected() {
        let descriptor = TypeDescriptor::class::<Invoice>().marking(ObjectMarking::named(" "));
        let err = SchemaBuilder::parse_descriptor(&descriptor).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::InvalidStorageName);
        assert_eq!(err.member(), None);
    }
}
