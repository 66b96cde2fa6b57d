//! Member enumeration

use super::Introspector;
use crate::error::{IntrospectResult, LookupError};
use crate::registry::TypeRegistry;
use crate::types::{ConstructorDescriptor, FieldDescriptor, MethodDescriptor, TypeHandle};

impl<'r> Introspector<'r> {
    /// Fields declared on `ty`, followed by those of every ancestor if
    /// `recursive`
    pub fn list_fields(
        &self,
        ty: TypeHandle,
        recursive: bool,
    ) -> IntrospectResult<Vec<&'r FieldDescriptor>> {
        self.collect_declared(ty, recursive, "fields", TypeRegistry::declared_fields)
    }

    /// Methods declared on `ty`, followed by those of every ancestor if
    /// `recursive`
    pub fn list_methods(
        &self,
        ty: TypeHandle,
        recursive: bool,
    ) -> IntrospectResult<Vec<&'r MethodDescriptor>> {
        self.collect_declared(ty, recursive, "methods", TypeRegistry::declared_methods)
    }

    /// Constructors declared on `ty`, followed by those of every ancestor if
    /// `recursive`
    pub fn list_constructors(
        &self,
        ty: TypeHandle,
        recursive: bool,
    ) -> IntrospectResult<Vec<&'r ConstructorDescriptor>> {
        self.collect_declared(
            ty,
            recursive,
            "constructors",
            TypeRegistry::declared_constructors,
        )
    }

    fn collect_declared<M>(
        &self,
        ty: TypeHandle,
        recursive: bool,
        kind: &'static str,
        declared: impl Fn(&'r TypeRegistry, TypeHandle) -> Result<&'r [M], LookupError>,
    ) -> IntrospectResult<Vec<&'r M>> {
        self.require(ty)?;

        let mut members = Vec::new();
        for current in self.registry.ancestry(ty) {
            match declared(self.registry, current.handle()) {
                Ok(level) => members.extend(level),
                Err(err) => {
                    // A denied level ends the walk; ancestors stay hidden.
                    tracing::error!(
                        type_name = current.name(),
                        kind,
                        error = %err,
                        "member enumeration stopped"
                    );
                    break;
                }
            }
            if !recursive {
                break;
            }
        }

        tracing::trace!(%ty, kind, recursive, count = members.len(), "enumerated members");
        Ok(members)
    }
}
