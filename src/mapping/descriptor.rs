//! Type descriptors
//!
//! A [`TypeDescriptor`] states what a runtime would otherwise discover by
//! reflection: the kind and visibility of a declared type, its constructors,
//! its fields and properties, and the markings placed on each.
//!
//! Declared types describe themselves through [`Mapped`]. Descriptors can also
//! be assembled by hand, for instance from an external schema definition.

use std::fmt;

use crate::conversion::{EnumRepresentation, StoreType, TimestampRepresentation, TypeKey, ValueType};

/// A declared type that can be stored as a record
pub trait Mapped: 'static {
    fn descriptor() -> TypeDescriptor;
}

/// Structural kind of a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Array,
    Enum,
    Interface,
    Pointer,
    Primitive,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Array => "array",
            TypeKind::Enum => "enum",
            TypeKind::Interface => "interface",
            TypeKind::Pointer => "pointer",
            TypeKind::Primitive => "primitive",
        }
    }

    /// Whether records of this kind can be mapped at all
    pub fn is_mappable(&self) -> bool {
        matches!(self, TypeKind::Class | TypeKind::Struct)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    Private,
}

impl Visibility {
    /// Public or protected
    pub fn is_accessible(&self) -> bool {
        matches!(self, Visibility::Public | Visibility::Protected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constructor {
    pub visibility: Visibility,
    pub parameter_count: usize,
}

impl Constructor {
    pub fn new(visibility: Visibility, parameter_count: usize) -> Self {
        Self {
            visibility,
            parameter_count,
        }
    }

    /// A public constructor without parameters
    pub fn default_public() -> Self {
        Self::new(Visibility::Public, 0)
    }

    pub fn is_usable_parameterless(&self) -> bool {
        self.visibility.is_accessible() && self.parameter_count == 0
    }
}

/// Type-level marking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMarking {
    /// Storage key name; the type's full name when `None`
    pub name: Option<String>,
    pub concurrency: bool,
}

impl ObjectMarking {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            concurrency: false,
        }
    }

    pub fn with_concurrency(mut self, concurrency: bool) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Member-level marking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marking {
    /// Exclude the member from the mapping
    Ignore,
    /// Map the member, optionally under another name
    Member { name: Option<String> },
    /// The member is the record identity
    Key,
    /// The member is the optimistic-concurrency token
    Concurrency,
    /// The member is indexed
    Index,
    EnumFormat(EnumRepresentation),
    TimestampFormat(TimestampRepresentation),
}

impl Marking {
    /// `Member` without a rename
    pub fn member() -> Self {
        Marking::Member { name: None }
    }

    pub fn renamed(name: impl Into<String>) -> Self {
        Marking::Member {
            name: Some(name.into()),
        }
    }

    pub fn kind(&self) -> MarkingKind {
        match self {
            Marking::Ignore => MarkingKind::Ignore,
            Marking::Member { .. } => MarkingKind::Member,
            Marking::Key => MarkingKind::Key,
            Marking::Concurrency => MarkingKind::Concurrency,
            Marking::Index => MarkingKind::Index,
            Marking::EnumFormat(_) => MarkingKind::EnumFormat,
            Marking::TimestampFormat(_) => MarkingKind::TimestampFormat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkingKind {
    Ignore,
    Member,
    Key,
    Concurrency,
    Index,
    EnumFormat,
    TimestampFormat,
}

impl MarkingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkingKind::Ignore => "Ignore",
            MarkingKind::Member => "Member",
            MarkingKind::Key => "Key",
            MarkingKind::Concurrency => "Concurrency",
            MarkingKind::Index => "Index",
            MarkingKind::EnumFormat => "EnumFormat",
            MarkingKind::TimestampFormat => "TimestampFormat",
        }
    }
}

impl fmt::Display for MarkingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field of a declared type
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub value_type: ValueType,
    pub visibility: Visibility,
    pub is_static: bool,
    /// Compiler-generated
    pub is_special_name: bool,
    pub is_constant: bool,
    pub is_read_only: bool,
    pub markings: Vec<Marking>,
}

impl FieldDescriptor {
    /// A public, writable instance field.
    pub fn new<T: StoreType>(name: impl Into<String>) -> Self {
        Self::of_type(name, T::value_type())
    }

    pub fn of_type(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            visibility: Visibility::Public,
            is_static: false,
            is_special_name: false,
            is_constant: false,
            is_read_only: false,
            markings: Vec::new(),
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn special_name(mut self) -> Self {
        self.is_special_name = true;
        self
    }

    pub fn constant(mut self) -> Self {
        self.is_constant = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.is_read_only = true;
        self
    }

    pub fn marked(mut self, marking: Marking) -> Self {
        self.markings.push(marking);
        self
    }
}

/// A property getter or setter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accessor {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_final: bool,
}

impl Accessor {
    pub fn new(visibility: Visibility) -> Self {
        Self {
            visibility,
            is_static: false,
            is_virtual: false,
            is_final: false,
        }
    }

    pub fn public() -> Self {
        Self::new(Visibility::Public)
    }

    pub fn static_accessor(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn virtual_accessor(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn final_accessor(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Public or protected, and not static
    pub fn is_defined(&self) -> bool {
        self.visibility.is_accessible() && !self.is_static
    }

    /// Virtual and not sealed
    pub fn is_overridable(&self) -> bool {
        self.is_virtual && !self.is_final
    }
}

/// A property of a declared type
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub value_type: ValueType,
    pub getter: Option<Accessor>,
    pub setter: Option<Accessor>,
    pub index_parameters: usize,
    pub markings: Vec<Marking>,
}

impl PropertyDescriptor {
    /// A property with public getter and setter.
    pub fn new<T: StoreType>(name: impl Into<String>) -> Self {
        Self::of_type(name, T::value_type())
    }

    pub fn of_type(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            getter: Some(Accessor::public()),
            setter: Some(Accessor::public()),
            index_parameters: 0,
            markings: Vec::new(),
        }
    }

    pub fn getter(mut self, getter: Option<Accessor>) -> Self {
        self.getter = getter;
        self
    }

    pub fn setter(mut self, setter: Option<Accessor>) -> Self {
        self.setter = setter;
        self
    }

    pub fn indexer(mut self, parameters: usize) -> Self {
        self.index_parameters = parameters;
        self
    }

    pub fn marked(mut self, marking: Marking) -> Self {
        self.markings.push(marking);
        self
    }
}

/// Borrowed view of one member, as yielded by [`TypeDescriptor::members`]
#[derive(Debug, Clone, Copy)]
pub enum MemberDescriptor<'a> {
    Field(&'a FieldDescriptor),
    Property(&'a PropertyDescriptor),
}

impl<'a> MemberDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            MemberDescriptor::Field(field) => &field.name,
            MemberDescriptor::Property(property) => &property.name,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            MemberDescriptor::Field(field) => field.value_type,
            MemberDescriptor::Property(property) => property.value_type,
        }
    }

    pub fn markings(&self) -> &'a [Marking] {
        match self {
            MemberDescriptor::Field(field) => &field.markings,
            MemberDescriptor::Property(property) => &property.markings,
        }
    }

    /// First marking of the given kind
    pub fn marking(&self, kind: MarkingKind) -> Option<&'a Marking> {
        self.markings().iter().find(|marking| marking.kind() == kind)
    }
}

/// Everything the schema builder needs to know about a declared type
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub key: TypeKey,
    /// Full name; the default storage key name
    pub name: String,
    pub kind: TypeKind,
    pub is_public: bool,
    pub is_sealed: bool,
    pub constructors: Vec<Constructor>,
    pub object_marking: Option<ObjectMarking>,
    pub fields: Vec<FieldDescriptor>,
    pub properties: Vec<PropertyDescriptor>,
}

impl TypeDescriptor {
    /// A public, non-sealed class named after `T` with a public parameterless constructor.
    pub fn class<T: 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            name: TypeKey::of::<T>().name().to_string(),
            kind: TypeKind::Class,
            is_public: true,
            is_sealed: false,
            constructors: vec![Constructor::default_public()],
            object_marking: None,
            fields: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the kind. A struct cannot be derived from, so it starts out
    /// sealed; call [`sealed`](Self::sealed) afterwards to override.
    pub fn kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        if kind == TypeKind::Struct {
            self.is_sealed = true;
        }
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn sealed(mut self, is_sealed: bool) -> Self {
        self.is_sealed = is_sealed;
        self
    }

    /// Replaces the constructor list.
    pub fn constructors(mut self, constructors: Vec<Constructor>) -> Self {
        self.constructors = constructors;
        self
    }

    pub fn marking(mut self, marking: ObjectMarking) -> Self {
        self.object_marking = Some(marking);
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Fields, then properties, each in declaration order.
    pub fn members(&self) -> impl Iterator<Item = MemberDescriptor<'_>> + '_ {
        self.fields
            .iter()
            .map(MemberDescriptor::Field)
            .chain(self.properties.iter().map(MemberDescriptor::Property))
    }

    pub fn has_usable_parameterless_constructor(&self) -> bool {
        self.constructors.iter().any(Constructor::is_usable_parameterless)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order;

    #[test]
    fn test_members_yield_fields_then_properties() {
        let descriptor = TypeDescriptor::class::<Order>()
            .property(PropertyDescriptor::new::<String>("Name"))
            .field(FieldDescriptor::new::<i64>("id"))
            .field(FieldDescriptor::new::<i64>("count"));

        let names: Vec<_> = descriptor.members().map(|m| m.name()).collect();
        assert_eq!(names, vec!["id", "count", "Name"]);
    }

    #[test]
    fn test_class_defaults() {
        let descriptor = TypeDescriptor::class::<Order>();
        assert!(descriptor.name.ends_with("Order"));
        assert!(descriptor.kind.is_mappable());
        assert!(descriptor.has_usable_parameterless_constructor());

        let private_only = descriptor.constructors(vec![Constructor::new(Visibility::Private, 0)]);
        assert!(!private_only.has_usable_parameterless_constructor());
    }

    #[test]
    fn test_accessor_flags() {
        let accessor = Accessor::new(Visibility::Protected).virtual_accessor();
        assert!(accessor.is_defined());
        assert!(accessor.is_overridable());
        assert!(!accessor.final_accessor().is_overridable());
        assert!(!Accessor::public().static_accessor().is_defined());
    }

    #[test]
    fn test_marking_lookup() {
        let field = FieldDescriptor::new::<String>("sku")
            .marked(Marking::Key)
            .marked(Marking::renamed("SKU"));
        let member = MemberDescriptor::Field(&field);
        assert_eq!(member.marking(MarkingKind::Member), Some(&Marking::renamed("SKU")));
        assert_eq!(member.marking(MarkingKind::Index), None);
    }
}
