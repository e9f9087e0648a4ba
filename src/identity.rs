//! Identity providers
//!
//! The identity member of a mapped type supplies the per-record key component.
//! Only a few value types can serve as identities; each has a provider that
//! moves it to and from the text used in keys.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::conversion::{TypeKey, ValueType};

pub type IdentityResult<T> = Result<T, IdentityError>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("'{text}' is not a valid {kind} identity")]
    Malformed { kind: IdentityKind, text: String },

    #[error("{0} identities cannot be generated")]
    GenerationUnsupported(IdentityKind),
}

/// Converts identities to and from their key text
pub trait ObjectIdentity {
    type Id;

    fn parse(&self, text: &str) -> IdentityResult<Self::Id>;

    fn format(&self, id: &Self::Id) -> String;

    /// True for the value that cannot identify a record
    fn is_empty(&self, id: &Self::Id) -> bool;

    fn can_generate(&self) -> bool;

    /// Generates a new unique identity, when supported.
    fn generate(&self) -> IdentityResult<Self::Id>;
}

/// Value types that can serve as identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityKind {
    String,
    Uuid,
    Integer,
}

impl IdentityKind {
    /// Returns the identity kind for `ty`, or `None` if `ty` cannot be an identity.
    pub fn for_type(ty: &ValueType) -> Option<Self> {
        Self::for_key(ty.key())
    }

    pub fn for_key(key: TypeKey) -> Option<Self> {
        if key == TypeKey::of::<String>() {
            Some(IdentityKind::String)
        } else if key == TypeKey::of::<Uuid>() {
            Some(IdentityKind::Uuid)
        } else if key == TypeKey::of::<i64>() {
            Some(IdentityKind::Integer)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityKind::String => "string",
            IdentityKind::Uuid => "uuid",
            IdentityKind::Integer => "integer",
        }
    }

    pub fn can_generate(&self) -> bool {
        match self {
            IdentityKind::String => StringIdentity.can_generate(),
            IdentityKind::Uuid => UuidIdentity.can_generate(),
            IdentityKind::Integer => IntegerIdentity.can_generate(),
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text identities; blank text is empty
#[derive(Debug, Default, Clone, Copy)]
pub struct StringIdentity;

impl ObjectIdentity for StringIdentity {
    type Id = String;

    fn parse(&self, text: &str) -> IdentityResult<String> {
        Ok(text.to_string())
    }

    fn format(&self, id: &String) -> String {
        id.clone()
    }

    fn is_empty(&self, id: &String) -> bool {
        id.trim().is_empty()
    }

    fn can_generate(&self) -> bool {
        false
    }

    fn generate(&self) -> IdentityResult<String> {
        Err(IdentityError::GenerationUnsupported(IdentityKind::String))
    }
}

/// UUID identities; the nil UUID is empty, new ones are random (v4)
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdentity;

impl ObjectIdentity for UuidIdentity {
    type Id = Uuid;

    fn parse(&self, text: &str) -> IdentityResult<Uuid> {
        Uuid::parse_str(text.trim()).map_err(|_| IdentityError::Malformed {
            kind: IdentityKind::Uuid,
            text: text.to_string(),
        })
    }

    fn format(&self, id: &Uuid) -> String {
        id.hyphenated().to_string()
    }

    fn is_empty(&self, id: &Uuid) -> bool {
        id.is_nil()
    }

    fn can_generate(&self) -> bool {
        true
    }

    fn generate(&self) -> IdentityResult<Uuid> {
        Ok(Uuid::new_v4())
    }
}

/// Integer identities; zero is empty
#[derive(Debug, Default, Clone, Copy)]
pub struct IntegerIdentity;

impl ObjectIdentity for IntegerIdentity {
    type Id = i64;

    fn parse(&self, text: &str) -> IdentityResult<i64> {
        text.trim().parse().map_err(|_| IdentityError::Malformed {
            kind: IdentityKind::Integer,
            text: text.to_string(),
        })
    }

    fn format(&self, id: &i64) -> String {
        id.to_string()
    }

    fn is_empty(&self, id: &i64) -> bool {
        *id == 0
    }

    fn can_generate(&self) -> bool {
        false
    }

    fn generate(&self) -> IdentityResult<i64> {
        Err(IdentityError::GenerationUnsupported(IdentityKind::Integer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_designated_types_only() {
        assert_eq!(
            IdentityKind::for_type(&ValueType::of::<String>()),
            Some(IdentityKind::String)
        );
        assert_eq!(IdentityKind::for_type(&ValueType::of::<Uuid>()), Some(IdentityKind::Uuid));
        assert_eq!(IdentityKind::for_type(&ValueType::of::<i64>()), Some(IdentityKind::Integer));
        assert_eq!(IdentityKind::for_type(&ValueType::of::<i32>()), None);
        assert_eq!(IdentityKind::for_type(&ValueType::of::<Option<Uuid>>()), None);
    }

    #[test]
    fn test_string_identity() {
        let provider = StringIdentity;
        assert!(provider.is_empty(&"  ".to_string()));
        assert_eq!(provider.parse("order-7").unwrap(), "order-7");
        assert!(matches!(
            provider.generate(),
            Err(IdentityError::GenerationUnsupported(IdentityKind::String))
        ));
    }

    #[test]
    fn test_uuid_identity() {
        let provider = UuidIdentity;
        let id = provider.generate().unwrap();
        assert!(!provider.is_empty(&id));
        assert_eq!(provider.parse(&provider.format(&id)).unwrap(), id);
        assert!(provider.is_empty(&Uuid::nil()));
        assert!(provider.parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_integer_identity() {
        let provider = IntegerIdentity;
        assert_eq!(provider.parse(" 42 ").unwrap(), 42);
        assert!(provider.is_empty(&0));
        assert!(!IdentityKind::Integer.can_generate());
        assert!(IdentityKind::Uuid.can_generate());
    }
}
