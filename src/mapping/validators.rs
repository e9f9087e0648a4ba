//! Schema rules
//!
//! Type-level checks run first, then every member is classified and passed
//! through [`MEMBER_RULES`] in table order. Each rule looks only at its own
//! marking and either updates the metadata or returns the first violation.

use std::collections::HashSet;

use crate::conversion::{FormatContext, Timestamp, ValueType};
use crate::identity::IdentityKind;

use super::descriptor::{
    Accessor, Marking, MarkingKind, MemberDescriptor, ObjectMarking, TypeDescriptor,
};
use super::errors::{InvalidSchemaError, SchemaResult};
use super::metadata::{AccessorFlags, MemberFlags, MemberMetadata, TypeMetadata};

/// Applies one marking to the member at `index`.
pub(crate) type MemberRule = fn(&Marking, &mut TypeMetadata, usize) -> SchemaResult<()>;

/// Member rules, in evaluation order
pub(crate) const MEMBER_RULES: [(MarkingKind, MemberRule); 7] = [
    (MarkingKind::Ignore, apply_ignore),
    (MarkingKind::Member, apply_member),
    (MarkingKind::Key, apply_key),
    (MarkingKind::Concurrency, apply_concurrency),
    (MarkingKind::Index, apply_index),
    (MarkingKind::EnumFormat, apply_enum_format),
    (MarkingKind::TimestampFormat, apply_timestamp_format),
];

/// Checks the declared type itself.
pub(crate) fn validate_type(descriptor: &TypeDescriptor) -> SchemaResult<()> {
    let name = descriptor.name.as_str();

    if !descriptor.kind.is_mappable() {
        return Err(InvalidSchemaError::invalid_type_kind(name, descriptor.kind));
    }
    if !descriptor.is_public {
        return Err(InvalidSchemaError::type_not_public(name));
    }
    if descriptor.is_sealed {
        return Err(InvalidSchemaError::type_sealed(name));
    }
    if !descriptor.has_usable_parameterless_constructor() {
        return Err(InvalidSchemaError::no_parameterless_constructor(name));
    }
    Ok(())
}

pub(crate) fn apply_object_marking(
    marking: Option<&ObjectMarking>,
    metadata: &mut TypeMetadata,
) -> SchemaResult<()> {
    let Some(marking) = marking else {
        return Ok(());
    };

    if let Some(name) = &marking.name {
        if name.trim().is_empty() {
            return Err(InvalidSchemaError::invalid_storage_name(&metadata.type_name, None));
        }
        metadata.key_name = name.clone();
    }
    metadata.concurrency = marking.concurrency;
    Ok(())
}

/// Markings are single-use per member.
pub(crate) fn check_repeated(type_name: &str, member: &MemberDescriptor<'_>) -> SchemaResult<()> {
    let mut seen = HashSet::new();
    for marking in member.markings() {
        if !seen.insert(marking.kind()) {
            return Err(InvalidSchemaError::repeated_marking(
                type_name,
                member.name(),
                marking.kind(),
            ));
        }
    }
    Ok(())
}

/// Base eligibility of a member, before any marking is applied.
pub(crate) fn classify(member: &MemberDescriptor<'_>) -> MemberMetadata {
    match member {
        MemberDescriptor::Field(field) => {
            let unmappable = !field.visibility.is_accessible()
                || field.is_static
                || field.is_special_name
                || field.is_constant
                || field.is_read_only;

            let mut flags = MemberFlags::FIELD;
            if unmappable {
                flags.insert(MemberFlags::UNMAPPABLE);
            }

            let mut metadata = MemberMetadata::new(&field.name, field.value_type, flags);
            metadata.getter = AccessorFlags::DEFINED;
            metadata.setter = AccessorFlags::DEFINED;
            metadata
        }
        MemberDescriptor::Property(property) => {
            let unmappable = match &property.getter {
                None => true,
                Some(getter) => !getter.visibility.is_accessible() || getter.is_static,
            } || property.index_parameters > 0;

            let mut flags = MemberFlags::PROPERTY;
            if unmappable {
                flags.insert(MemberFlags::UNMAPPABLE);
            }

            let mut metadata = MemberMetadata::new(&property.name, property.value_type, flags);
            if let Some(getter) = &property.getter {
                metadata.getter = accessor_flags(getter);
            }
            if let Some(setter) = &property.setter {
                metadata.setter = accessor_flags(setter);
            }
            metadata
        }
    }
}

fn accessor_flags(accessor: &Accessor) -> AccessorFlags {
    let mut flags = AccessorFlags::NONE;
    if accessor.is_defined() {
        flags.insert(AccessorFlags::DEFINED);
    }
    if accessor.is_overridable() {
        flags.insert(AccessorFlags::VIRTUAL);
    }
    flags
}

/// Shared preconditions: the member is mappable and not ignored.
fn require_mappable(metadata: &TypeMetadata, index: usize, kind: MarkingKind) -> SchemaResult<()> {
    let member = &metadata.members[index];
    if member.is_unmappable() {
        return Err(InvalidSchemaError::unmappable_member(
            &metadata.type_name,
            &member.name,
            kind,
        ));
    }
    if member.is_ignored() {
        return Err(InvalidSchemaError::conflicting_markings(
            &metadata.type_name,
            &member.name,
            kind,
        ));
    }
    Ok(())
}

fn type_mismatch(
    metadata: &TypeMetadata,
    index: usize,
    kind: MarkingKind,
    expected: &str,
) -> InvalidSchemaError {
    let member = &metadata.members[index];
    InvalidSchemaError::member_type_mismatch(
        &metadata.type_name,
        &member.name,
        kind,
        expected,
        member.value_type.name(),
    )
}

fn mark_mapped(metadata: &mut TypeMetadata, index: usize) {
    metadata.members[index].flags.insert(MemberFlags::MAPPED);
}

/// Ignore on a static or otherwise unmappable member is rejected, not recorded as ignored.
fn apply_ignore(_marking: &Marking, metadata: &mut TypeMetadata, index: usize) -> SchemaResult<()> {
    let member = &metadata.members[index];
    if member.is_unmappable() {
        return Err(InvalidSchemaError::unmappable_member(
            &metadata.type_name,
            &member.name,
            MarkingKind::Ignore,
        ));
    }
    if member.is_mapped() {
        return Err(InvalidSchemaError::conflicting_markings(
            &metadata.type_name,
            &member.name,
            MarkingKind::Member,
        ));
    }
    metadata.members[index].flags.insert(MemberFlags::IGNORED);
    Ok(())
}

fn apply_member(marking: &Marking, metadata: &mut TypeMetadata, index: usize) -> SchemaResult<()> {
    require_mappable(metadata, index, MarkingKind::Member)?;

    if let Marking::Member { name: Some(name) } = marking {
        if name.trim().is_empty() {
            return Err(InvalidSchemaError::invalid_storage_name(
                &metadata.type_name,
                Some(metadata.members[index].name.as_str()),
            ));
        }
        metadata.members[index].storage_name = name.clone();
    }
    mark_mapped(metadata, index);
    Ok(())
}

fn apply_key(_marking: &Marking, metadata: &mut TypeMetadata, index: usize) -> SchemaResult<()> {
    require_mappable(metadata, index, MarkingKind::Key)?;

    if IdentityKind::for_type(&metadata.members[index].value_type).is_none() {
        return Err(type_mismatch(metadata, index, MarkingKind::Key, "String, Uuid or i64"));
    }
    if metadata.identity.is_some() {
        return Err(InvalidSchemaError::duplicate_identity(
            &metadata.type_name,
            &metadata.members[index].name,
        ));
    }

    mark_mapped(metadata, index);
    metadata.identity = Some(index);
    Ok(())
}

fn apply_concurrency(_marking: &Marking, metadata: &mut TypeMetadata, index: usize) -> SchemaResult<()> {
    require_mappable(metadata, index, MarkingKind::Concurrency)?;

    if !metadata.members[index].value_type.is::<Timestamp>() {
        return Err(type_mismatch(metadata, index, MarkingKind::Concurrency, "Timestamp"));
    }
    if metadata.concurrency_member.is_some() {
        return Err(InvalidSchemaError::duplicate_concurrency(
            &metadata.type_name,
            &metadata.members[index].name,
        ));
    }
    if is_date_only(metadata.members[index].format) {
        return Err(InvalidSchemaError::date_only_concurrency(
            &metadata.type_name,
            &metadata.members[index].name,
        ));
    }

    mark_mapped(metadata, index);
    metadata.concurrency_member = Some(index);
    Ok(())
}

fn apply_index(_marking: &Marking, metadata: &mut TypeMetadata, index: usize) -> SchemaResult<()> {
    require_mappable(metadata, index, MarkingKind::Index)?;

    mark_mapped(metadata, index);
    metadata.indexed.push(index);
    Ok(())
}

fn apply_enum_format(marking: &Marking, metadata: &mut TypeMetadata, index: usize) -> SchemaResult<()> {
    require_mappable(metadata, index, MarkingKind::EnumFormat)?;

    let value_type: ValueType = metadata.members[index].value_type;
    if !value_type.is_enum() && !value_type.is_nullable_enum() {
        return Err(type_mismatch(metadata, index, MarkingKind::EnumFormat, "an enum"));
    }

    if let Marking::EnumFormat(representation) = marking {
        let member = &mut metadata.members[index];
        member.set_format(FormatContext::enums(*representation));
    }
    mark_mapped(metadata, index);
    Ok(())
}

fn apply_timestamp_format(
    marking: &Marking,
    metadata: &mut TypeMetadata,
    index: usize,
) -> SchemaResult<()> {
    require_mappable(metadata, index, MarkingKind::TimestampFormat)?;

    if !metadata.members[index].value_type.is_or_nullable_of::<Timestamp>() {
        return Err(type_mismatch(
            metadata,
            index,
            MarkingKind::TimestampFormat,
            "Timestamp or Option<Timestamp>",
        ));
    }

    if let Marking::TimestampFormat(representation) = marking {
        if representation.is_date_only() && metadata.concurrency_member == Some(index) {
            return Err(InvalidSchemaError::date_only_concurrency(
                &metadata.type_name,
                &metadata.members[index].name,
            ));
        }
        metadata.members[index].set_format(FormatContext::timestamps(*representation));
    }
    mark_mapped(metadata, index);
    Ok(())
}

fn is_date_only(format: Option<FormatContext>) -> bool {
    format
        .and_then(|format| format.timestamp_facet())
        .map_or(false, |representation| representation.is_date_only())
}
