//! Type Introspector
//!
//! Stateless queries over a [`TypeRegistry`]:
//!
//! | Operation                                   | Result                         |
//! |---------------------------------------------|--------------------------------|
//! | `list_fields/methods/constructors`          | declared members, optionally with every ancestor's |
//! | `find_field/method/constructor`             | first match walking up the chain, or `None` |
//! | `list_*_with_tag`                           | enumeration filtered by tag type |
//! | `construct`, `construct_with`               | new instance, or `None` on any failure |
//!
//! Recursive enumeration lists the most-derived type's members first and
//! performs no de-duplication: a field shadowed in a subtype shows up once
//! per declaring type.
//!
//! Only an unresolved type handle passed to an enumeration or lookup is
//! reported as an error. Access denials and construction failures are logged
//! through `tracing` and surface as an empty or absent result.

mod construct;
mod enumerate;
mod lookup;
mod tagged;

use crate::error::{IntrospectError, IntrospectResult};
use crate::registry::TypeRegistry;
use crate::types::{TypeDescriptor, TypeHandle};

/// Read-only introspection view over a registry
#[derive(Debug, Clone, Copy)]
pub struct Introspector<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Introspector<'r> {
    /// Create an introspector over `registry`
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// The registry being queried
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    fn require(&self, ty: TypeHandle) -> IntrospectResult<&'r TypeDescriptor> {
        self.registry
            .get(ty)
            .ok_or_else(|| IntrospectError::unresolved(ty))
    }
}
