//! Raya Type Introspection
//!
//! This crate locates and enumerates the members of registered types and
//! constructs instances through located constructors:
//! - **Registry**: immutable store of type descriptors (`registry` module)
//! - **Introspector**: member enumeration, hierarchy lookup, tag filtering,
//!   and access-bypassing construction (`introspect` module)
//! - **Access**: reflection permissions loaded from TOML (`access` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use raya_introspect::{
//!     ConstructorDefinition, FieldDefinition, RegistryBuilder, TypeDefinition,
//! };
//!
//! let mut builder = RegistryBuilder::standard();
//! let int = builder.handle_of::<i32>().unwrap();
//!
//! let base = builder.register(
//!     TypeDefinition::of::<Base>("Base").field(FieldDefinition::new("id", int)),
//! )?;
//! let derived = builder.register(
//!     TypeDefinition::of::<Derived>("Derived")
//!         .extends(base)
//!         .field(FieldDefinition::new("id", int))
//!         .constructor(ConstructorDefinition::nullary(Derived::new).private()),
//! )?;
//! let registry = builder.build();
//! let introspector = registry.introspector();
//!
//! // [Derived.id, Base.id]
//! let fields = introspector.list_fields(derived, true)?;
//!
//! // Private constructor, invoked with access bypass
//! let value = introspector.construct_as::<Derived>(Some(derived), true);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Reflection permissions and configuration
pub mod access;

/// Error types
pub mod error;

/// Type Introspector queries
pub mod introspect;

/// Tracing subscriber setup
pub mod logging;

/// Type registry and builder
pub mod registry;

/// Type and member descriptors
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use access::{AccessPolicy, IntrospectConfig, ReflectionPermission, TypePermissionRule};
pub use error::{
    ConfigError, ConstructError, IntrospectError, IntrospectResult, InvocationError, LookupError,
    RegistryError,
};
pub use introspect::Introspector;
pub use registry::{
    Ancestry, ConstructorDefinition, FieldDefinition, MethodDefinition, RegistryBuilder,
    TypeDefinition, TypeRegistry,
};
pub use types::{
    Arguments, ConstructorDescriptor, FieldDescriptor, Instance, Member, MethodDescriptor,
    ParameterSignature, Tag, TagSet, TagType, TypeDescriptor, TypeHandle, Visibility,
};
