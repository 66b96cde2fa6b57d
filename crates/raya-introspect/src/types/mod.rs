//! Type and member descriptors
//!
//! Descriptors are read-only views handed out by a
//! [`TypeRegistry`](crate::registry::TypeRegistry). They are created once by
//! the [`RegistryBuilder`](crate::registry::RegistryBuilder) and never mutated
//! afterwards.

mod member;
mod tag;

use std::any::TypeId;
use std::fmt;

pub use member::{
    Arguments, ConstructorDescriptor, ConstructorFn, FieldDescriptor, Instance, Member,
    MethodDescriptor, ParameterSignature,
};
pub use tag::{Tag, TagSet, TagType};

/// Index of a type inside one registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle(usize);

impl TypeHandle {
    /// Create a handle from a raw registry index
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Raw registry index
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Member visibility level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Accessible from anywhere
    #[default]
    Public,
    /// Accessible from the declaring type and its subtypes
    Protected,
    /// Accessible from the declaring module
    Package,
    /// Accessible from the declaring type only
    Private,
}

impl Visibility {
    /// Whether a reflective caller may use the member without access bypass
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Package => "package",
            Visibility::Private => "private",
        };
        f.write_str(s)
    }
}

/// Runtime description of a registered type
#[derive(Debug)]
pub struct TypeDescriptor {
    pub(crate) handle: TypeHandle,
    pub(crate) name: String,
    pub(crate) rust_type: Option<(TypeId, &'static str)>,
    pub(crate) parent: Option<TypeHandle>,
    pub(crate) is_abstract: bool,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) methods: Vec<MethodDescriptor>,
    pub(crate) constructors: Vec<ConstructorDescriptor>,
}

impl TypeDescriptor {
    /// Handle of this type
    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent type, `None` for a root type
    pub fn parent(&self) -> Option<TypeHandle> {
        self.parent
    }

    /// Whether this type is a root of its hierarchy
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether instances of this type may not be constructed
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// The Rust type bound to this descriptor, if any
    pub fn rust_type_id(&self) -> Option<TypeId> {
        self.rust_type.map(|(id, _)| id)
    }

    /// Name of the bound Rust type, if any
    pub fn rust_type_name(&self) -> Option<&'static str> {
        self.rust_type.map(|(_, name)| name)
    }

    /// Fields declared directly on this type, in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Methods declared directly on this type, in declaration order
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Constructors declared directly on this type, in declaration order
    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }
}
