//! Validated mapping metadata
//!
//! Produced only by the schema builder, and only once every rule has passed.
//! Consumers read it; nothing outside the builder mutates it.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::conversion::{FormatContext, TypeKey, ValueType};
use crate::identity::IdentityKind;

/// Member classification bits
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MemberFlags(u32);

impl MemberFlags {
    pub const NONE: Self = Self(0);
    /// Marked for mapping
    pub const MAPPED: Self = Self(0x1);
    /// Marked as ignored
    pub const IGNORED: Self = Self(0x2);
    /// Cannot be mapped (static, private, constant, ...)
    pub const UNMAPPABLE: Self = Self(0x4);
    pub const PROPERTY: Self = Self(0x10);
    pub const FIELD: Self = Self(0x20);

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for MemberFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for MemberFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for MemberFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(MemberFlags, &str); 5] = [
            (MemberFlags::MAPPED, "MAPPED"),
            (MemberFlags::IGNORED, "IGNORED"),
            (MemberFlags::UNMAPPABLE, "UNMAPPABLE"),
            (MemberFlags::PROPERTY, "PROPERTY"),
            (MemberFlags::FIELD, "FIELD"),
        ];
        let names: Vec<_> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "MemberFlags({})", names.join(" | "))
    }
}

/// Getter/setter bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AccessorFlags(u32);

impl AccessorFlags {
    pub const NONE: Self = Self(0);
    /// Public or protected, non-static
    pub const DEFINED: Self = Self(0x1);
    /// Overridable
    pub const VIRTUAL: Self = Self(0x2);

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for AccessorFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One field or property of a mapped type
#[derive(Debug, Clone)]
pub struct MemberMetadata {
    pub(crate) name: String,
    pub(crate) storage_name: String,
    pub(crate) value_type: ValueType,
    pub(crate) flags: MemberFlags,
    pub(crate) getter: AccessorFlags,
    pub(crate) setter: AccessorFlags,
    pub(crate) format: Option<FormatContext>,
}

impl MemberMetadata {
    pub(crate) fn new(name: &str, value_type: ValueType, flags: MemberFlags) -> Self {
        Self {
            name: name.to_string(),
            storage_name: name.to_string(),
            value_type,
            flags,
            getter: AccessorFlags::NONE,
            setter: AccessorFlags::NONE,
            format: None,
        }
    }

    /// Declared member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name the member is stored under
    pub fn storage_name(&self) -> &str {
        &self.storage_name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    pub fn getter(&self) -> AccessorFlags {
        self.getter
    }

    pub fn setter(&self) -> AccessorFlags {
        self.setter
    }

    pub fn is_mapped(&self) -> bool {
        self.flags.contains(MemberFlags::MAPPED)
    }

    pub fn is_ignored(&self) -> bool {
        self.flags.contains(MemberFlags::IGNORED)
    }

    pub fn is_unmappable(&self) -> bool {
        self.flags.contains(MemberFlags::UNMAPPABLE)
    }

    pub fn is_field(&self) -> bool {
        self.flags.contains(MemberFlags::FIELD)
    }

    pub fn is_property(&self) -> bool {
        self.flags.contains(MemberFlags::PROPERTY)
    }

    /// Neither unmappable nor ignored
    pub fn is_storable(&self) -> bool {
        !self.is_unmappable() && !self.is_ignored()
    }

    /// Representation requested by the member's format markings
    pub fn format(&self) -> FormatContext {
        self.format.unwrap_or_default()
    }

    pub(crate) fn set_format(&mut self, format: FormatContext) {
        self.format = Some(format.or(&self.format()));
    }
}

/// Validated mapping of one declared type
#[derive(Debug, Clone)]
pub struct TypeMetadata {
    pub(crate) type_key: TypeKey,
    pub(crate) type_name: String,
    pub(crate) key_name: String,
    pub(crate) concurrency: bool,
    pub(crate) members: Vec<MemberMetadata>,
    pub(crate) identity: Option<usize>,
    pub(crate) concurrency_member: Option<usize>,
    pub(crate) indexed: Vec<usize>,
}

impl TypeMetadata {
    pub(crate) fn new(type_key: TypeKey, type_name: &str) -> Self {
        Self {
            type_key,
            type_name: type_name.to_string(),
            key_name: type_name.to_string(),
            concurrency: false,
            members: Vec::new(),
            identity: None,
            concurrency_member: None,
            indexed: Vec::new(),
        }
    }

    pub(crate) fn push_member(&mut self, member: MemberMetadata) -> usize {
        self.members.push(member);
        self.members.len() - 1
    }

    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Storage key name
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Concurrency flag from the type-level marking
    pub fn concurrency(&self) -> bool {
        self.concurrency
    }

    /// All fields then all properties, in declaration order
    pub fn members(&self) -> &[MemberMetadata] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&MemberMetadata> {
        self.members.iter().find(|member| member.name == name)
    }

    pub fn identity_member(&self) -> Option<&MemberMetadata> {
        self.identity.map(|index| &self.members[index])
    }

    pub fn identity_kind(&self) -> Option<IdentityKind> {
        self.identity_member()
            .and_then(|member| IdentityKind::for_type(&member.value_type))
    }

    pub fn concurrency_member(&self) -> Option<&MemberMetadata> {
        self.concurrency_member.map(|index| &self.members[index])
    }

    pub fn indexed_members(&self) -> impl Iterator<Item = &MemberMetadata> + '_ {
        self.indexed.iter().map(|index| &self.members[*index])
    }

    pub fn mapped_members(&self) -> impl Iterator<Item = &MemberMetadata> + '_ {
        self.members.iter().filter(|member| member.is_mapped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{EnumRepresentation, TimestampRepresentation};

    #[test]
    fn test_member_flags() {
        let mut flags = MemberFlags::FIELD | MemberFlags::UNMAPPABLE;
        assert!(flags.contains(MemberFlags::FIELD));
        assert!(!flags.contains(MemberFlags::MAPPED));
        flags.insert(MemberFlags::IGNORED);
        assert_eq!(flags.bits(), 0x26);
        assert_eq!(format!("{:?}", flags), "MemberFlags(IGNORED | UNMAPPABLE | FIELD)");
    }

    #[test]
    fn test_member_format_merges_facets() {
        let mut member = MemberMetadata::new("at", ValueType::of::<i64>(), MemberFlags::FIELD);
        assert_eq!(member.format(), FormatContext::empty());

        member.set_format(FormatContext::enums(EnumRepresentation::AsNumeric));
        member.set_format(FormatContext::timestamps(TimestampRepresentation::AsUtcTime));
        assert_eq!(member.format().enum_facet(), Some(EnumRepresentation::AsNumeric));
        assert_eq!(
            member.format().timestamp_facet(),
            Some(TimestampRepresentation::AsUtcTime)
        );
    }

    #[test]
    fn test_indexed_lookup() {
        let mut metadata = TypeMetadata::new(TypeKey::of::<u8>(), "demo::Thing");
        let a = metadata.push_member(MemberMetadata::new("a", ValueType::of::<i64>(), MemberFlags::FIELD));
        let b = metadata.push_member(MemberMetadata::new("b", ValueType::of::<String>(), MemberFlags::FIELD));
        metadata.indexed.push(b);
        metadata.identity = Some(a);

        assert_eq!(metadata.identity_member().map(|m| m.name()), Some("a"));
        assert_eq!(metadata.identity_kind(), Some(IdentityKind::Integer));
        let indexed: Vec<_> = metadata.indexed_members().map(|m| m.name()).collect();
        assert_eq!(indexed, vec!["b"]);
        assert_eq!(metadata.key_name(), "demo::Thing");
    }
}
