//! Schema error types
//!
//! Error codes:
//! - OHM_SCHEMA_INVALID_TYPE_KIND
//! - OHM_SCHEMA_TYPE_NOT_PUBLIC
//! - OHM_SCHEMA_TYPE_SEALED
//! - OHM_SCHEMA_NO_PARAMETERLESS_CONSTRUCTOR
//! - OHM_SCHEMA_UNMAPPABLE_MEMBER
//! - OHM_SCHEMA_CONFLICTING_MARKINGS
//! - OHM_SCHEMA_MEMBER_TYPE_MISMATCH
//! - OHM_SCHEMA_DUPLICATE_IDENTITY
//! - OHM_SCHEMA_DUPLICATE_CONCURRENCY
//! - OHM_SCHEMA_DATE_ONLY_CONCURRENCY
//! - OHM_SCHEMA_REPEATED_MARKING
//! - OHM_SCHEMA_INVALID_STORAGE_NAME

use std::fmt;

use super::descriptor::{MarkingKind, TypeKind};

/// Result type for schema building
pub type SchemaResult<T> = Result<T, InvalidSchemaError>;

/// Schema error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaErrorCode {
    /// Arrays, enums, interfaces, pointers and primitives cannot be mapped
    InvalidTypeKind,
    /// Type is not publicly visible
    TypeNotPublic,
    /// Type cannot be derived from
    TypeSealed,
    /// No public or protected constructor without parameters
    NoParameterlessConstructor,
    /// Marking placed on a member that cannot be mapped
    UnmappableMember,
    /// Marking combined with Ignore on the same member
    ConflictingMarkings,
    /// Marking placed on a member of the wrong type
    MemberTypeMismatch,
    /// Second member marked Key
    DuplicateIdentity,
    /// Second member marked Concurrency
    DuplicateConcurrency,
    /// Concurrency member stored as a date only
    DateOnlyConcurrency,
    /// Same marking applied twice to one member
    RepeatedMarking,
    /// Empty storage key name or member name
    InvalidStorageName,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::InvalidTypeKind => "OHM_SCHEMA_INVALID_TYPE_KIND",
            SchemaErrorCode::TypeNotPublic => "OHM_SCHEMA_TYPE_NOT_PUBLIC",
            SchemaErrorCode::TypeSealed => "OHM_SCHEMA_TYPE_SEALED",
            SchemaErrorCode::NoParameterlessConstructor => "OHM_SCHEMA_NO_PARAMETERLESS_CONSTRUCTOR",
            SchemaErrorCode::UnmappableMember => "OHM_SCHEMA_UNMAPPABLE_MEMBER",
            SchemaErrorCode::ConflictingMarkings => "OHM_SCHEMA_CONFLICTING_MARKINGS",
            SchemaErrorCode::MemberTypeMismatch => "OHM_SCHEMA_MEMBER_TYPE_MISMATCH",
            SchemaErrorCode::DuplicateIdentity => "OHM_SCHEMA_DUPLICATE_IDENTITY",
            SchemaErrorCode::DuplicateConcurrency => "OHM_SCHEMA_DUPLICATE_CONCURRENCY",
            SchemaErrorCode::DateOnlyConcurrency => "OHM_SCHEMA_DATE_ONLY_CONCURRENCY",
            SchemaErrorCode::RepeatedMarking => "OHM_SCHEMA_REPEATED_MARKING",
            SchemaErrorCode::InvalidStorageName => "OHM_SCHEMA_INVALID_STORAGE_NAME",
        }
    }

    /// Returns whether the error concerns the type as a whole
    pub fn is_type_level(&self) -> bool {
        matches!(
            self,
            SchemaErrorCode::InvalidTypeKind
                | SchemaErrorCode::TypeNotPublic
                | SchemaErrorCode::TypeSealed
                | SchemaErrorCode::NoParameterlessConstructor
        )
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A declared type, or one of its members, that cannot be mapped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSchemaError {
    code: SchemaErrorCode,
    message: String,
    type_name: String,
    member: Option<String>,
}

impl InvalidSchemaError {
    fn for_type(code: SchemaErrorCode, type_name: &str, message: String) -> Self {
        Self {
            code,
            message,
            type_name: type_name.to_string(),
            member: None,
        }
    }

    fn for_member(code: SchemaErrorCode, type_name: &str, member: &str, message: String) -> Self {
        Self {
            code,
            message,
            type_name: type_name.to_string(),
            member: Some(member.to_string()),
        }
    }

    pub fn invalid_type_kind(type_name: &str, kind: TypeKind) -> Self {
        Self::for_type(
            SchemaErrorCode::InvalidTypeKind,
            type_name,
            format!("Type {} of kind {} cannot be a mapping object", type_name, kind),
        )
    }

    pub fn type_not_public(type_name: &str) -> Self {
        Self::for_type(
            SchemaErrorCode::TypeNotPublic,
            type_name,
            format!("Type {} is not public", type_name),
        )
    }

    pub fn type_sealed(type_name: &str) -> Self {
        Self::for_type(
            SchemaErrorCode::TypeSealed,
            type_name,
            format!("Type {} is sealed", type_name),
        )
    }

    pub fn no_parameterless_constructor(type_name: &str) -> Self {
        Self::for_type(
            SchemaErrorCode::NoParameterlessConstructor,
            type_name,
            format!("Type {} has no public or protected parameterless constructor", type_name),
        )
    }

    pub fn unmappable_member(type_name: &str, member: &str, marking: MarkingKind) -> Self {
        Self::for_member(
            SchemaErrorCode::UnmappableMember,
            type_name,
            member,
            format!("Member {} of {} cannot be marked with {}", member, type_name, marking),
        )
    }

    pub fn conflicting_markings(type_name: &str, member: &str, marking: MarkingKind) -> Self {
        Self::for_member(
            SchemaErrorCode::ConflictingMarkings,
            type_name,
            member,
            format!(
                "Member {} of {} cannot be marked with both {} and {}",
                member,
                type_name,
                marking,
                MarkingKind::Ignore
            ),
        )
    }

    pub fn member_type_mismatch(
        type_name: &str,
        member: &str,
        marking: MarkingKind,
        expected: &str,
        actual: &str,
    ) -> Self {
        Self::for_member(
            SchemaErrorCode::MemberTypeMismatch,
            type_name,
            member,
            format!(
                "Member {} of {} marked with {} must be {}, found {}",
                member, type_name, marking, expected, actual
            ),
        )
    }

    pub fn duplicate_identity(type_name: &str, member: &str) -> Self {
        Self::for_member(
            SchemaErrorCode::DuplicateIdentity,
            type_name,
            member,
            format!("Type {} cannot contain more than one member marked with Key", type_name),
        )
    }

    pub fn duplicate_concurrency(type_name: &str, member: &str) -> Self {
        Self::for_member(
            SchemaErrorCode::DuplicateConcurrency,
            type_name,
            member,
            format!(
                "Type {} cannot contain more than one member marked with Concurrency",
                type_name
            ),
        )
    }

    pub fn date_only_concurrency(type_name: &str, member: &str) -> Self {
        Self::for_member(
            SchemaErrorCode::DateOnlyConcurrency,
            type_name,
            member,
            format!(
                "Member {} of {} marked with Concurrency cannot use a date-only timestamp format",
                member, type_name
            ),
        )
    }

    pub fn repeated_marking(type_name: &str, member: &str, marking: MarkingKind) -> Self {
        Self::for_member(
            SchemaErrorCode::RepeatedMarking,
            type_name,
            member,
            format!("Member {} of {} is marked with {} more than once", member, type_name, marking),
        )
    }

    /// Empty storage name. `member` is `None` for the type's key name.
    pub fn invalid_storage_name(type_name: &str, member: Option<&str>) -> Self {
        match member {
            Some(member) => Self::for_member(
                SchemaErrorCode::InvalidStorageName,
                type_name,
                member,
                format!("Member {} of {} cannot be stored under an empty name", member, type_name),
            ),
            None => Self::for_type(
                SchemaErrorCode::InvalidStorageName,
                type_name,
                format!("Type {} cannot be stored under an empty key name", type_name),
            ),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the name of the offending type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the offending member, if the error is member-specific
    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }
}

impl fmt::Display for InvalidSchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REJECT] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for InvalidSchemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::TypeSealed.code(), "OHM_SCHEMA_TYPE_SEALED");
        assert_eq!(
            SchemaErrorCode::DateOnlyConcurrency.code(),
            "OHM_SCHEMA_DATE_ONLY_CONCURRENCY"
        );
        assert!(SchemaErrorCode::TypeNotPublic.is_type_level());
        assert!(!SchemaErrorCode::DuplicateIdentity.is_type_level());
    }

    #[test]
    fn test_member_error_carries_context() {
        let err = InvalidSchemaError::conflicting_markings("shop::Order", "total", MarkingKind::Key);
        assert_eq!(err.code(), SchemaErrorCode::ConflictingMarkings);
        assert_eq!(err.type_name(), "shop::Order");
        assert_eq!(err.member(), Some("total"));
        assert!(err.message().contains("Key"));
        assert!(err.message().contains("Ignore"));
    }

    #[test]
    fn test_error_display() {
        let err = InvalidSchemaError::type_sealed("shop::Order");
        let display = format!("{}", err);
        assert!(display.contains("[REJECT]"));
        assert!(display.contains("OHM_SCHEMA_TYPE_SEALED"));
        assert!(display.contains("shop::Order"));
        assert_eq!(err.member(), None);
    }
}
