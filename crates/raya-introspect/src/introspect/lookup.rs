//! Single member lookup
//!
//! A miss on one type retries on its parent when `recursive` is set. An
//! access denial is logged and ends the search with `None`; it is not
//! retried on ancestors.

use super::Introspector;
use crate::error::{IntrospectResult, LookupError};
use crate::types::{ConstructorDescriptor, FieldDescriptor, MethodDescriptor, TypeHandle};

impl<'r> Introspector<'r> {
    /// Find a field by name on `ty`, or on its ancestors if `recursive`
    pub fn find_field(
        &self,
        ty: TypeHandle,
        recursive: bool,
        name: &str,
    ) -> IntrospectResult<Option<&'r FieldDescriptor>> {
        let registry = self.registry;
        self.find_declared(ty, recursive, |handle| {
            registry.get_declared_field(handle, name)
        })
    }

    /// Find a method by name and exact parameter types on `ty`, or on its
    /// ancestors if `recursive`
    pub fn find_method(
        &self,
        ty: TypeHandle,
        recursive: bool,
        name: &str,
        params: &[TypeHandle],
    ) -> IntrospectResult<Option<&'r MethodDescriptor>> {
        let registry = self.registry;
        self.find_declared(ty, recursive, |handle| {
            registry.get_declared_method(handle, name, params)
        })
    }

    /// Find a constructor by exact parameter types on `ty`, or on its
    /// ancestors if `recursive`
    pub fn find_constructor(
        &self,
        ty: TypeHandle,
        recursive: bool,
        params: &[TypeHandle],
    ) -> IntrospectResult<Option<&'r ConstructorDescriptor>> {
        let registry = self.registry;
        self.find_declared(ty, recursive, |handle| {
            registry.get_declared_constructor(handle, params)
        })
    }

    fn find_declared<M>(
        &self,
        ty: TypeHandle,
        recursive: bool,
        lookup: impl Fn(TypeHandle) -> Result<&'r M, LookupError>,
    ) -> IntrospectResult<Option<&'r M>> {
        self.require(ty)?;

        let mut current = Some(ty);
        while let Some(handle) = current {
            match lookup(handle) {
                Ok(member) => return Ok(Some(member)),
                Err(err) if err.is_not_found() => {
                    tracing::trace!(%handle, error = %err, "lookup missed");
                    current = if recursive {
                        self.registry.get(handle).and_then(|t| t.parent())
                    } else {
                        None
                    };
                }
                Err(err) => {
                    tracing::error!(
                        type_name = %self.registry.type_name(handle),
                        error = %err,
                        "member lookup failed"
                    );
                    return Ok(None);
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::access::{AccessPolicy, ReflectionPermission};
    use crate::error::IntrospectError;
    use crate::registry::{
        ConstructorDefinition, FieldDefinition, MethodDefinition, RegistryBuilder, TypeDefinition,
        TypeRegistry,
    };
    use crate::types::{Member, TypeHandle};

    struct Fixture {
        registry: TypeRegistry,
        int: TypeHandle,
        base: TypeHandle,
        derived: TypeHandle,
    }

    fn fixture(policy: AccessPolicy) -> Fixture {
        let mut builder = RegistryBuilder::standard().with_policy(policy);
        let int = builder.handle_of::<i32>().unwrap();
        let string = builder.handle_of::<String>().unwrap();

        let base = builder
            .register(
                TypeDefinition::new("Base")
                    .field(FieldDefinition::new("id", int))
                    .field(FieldDefinition::new("created", int).private())
                    .method(MethodDefinition::new("describe").returns(string))
                    .method(MethodDefinition::new("resize").param(int))
                    .constructor(ConstructorDefinition::nullary(|| 0u8)),
            )
            .unwrap();
        let derived = builder
            .register(
                TypeDefinition::new("Derived")
                    .extends(base)
                    .field(FieldDefinition::new("id", string))
                    .method(MethodDefinition::new("describe").returns(string))
                    .method(MethodDefinition::new("resize").param(string)),
            )
            .unwrap();

        Fixture {
            registry: builder.build(),
            int,
            base,
            derived,
        }
    }

    #[test]
    fn test_find_prefers_most_derived() {
        let f = fixture(AccessPolicy::new());
        let introspector = f.registry.introspector();

        let id = introspector.find_field(f.derived, true, "id").unwrap().unwrap();
        assert_eq!(id.declaring_type(), f.derived);

        let describe = introspector
            .find_method(f.derived, true, "describe", &[])
            .unwrap()
            .unwrap();
        assert_eq!(describe.declaring_type(), f.derived);
    }

    #[test]
    fn test_find_recursive_reaches_ancestor() {
        let f = fixture(AccessPolicy::new());
        let introspector = f.registry.introspector();

        let created = introspector
            .find_field(f.derived, true, "created")
            .unwrap()
            .unwrap();
        assert_eq!(created.declaring_type(), f.base);

        // Overload with the inherited signature resolves on the parent
        let resize = introspector
            .find_method(f.derived, true, "resize", &[f.int])
            .unwrap()
            .unwrap();
        assert_eq!(resize.declaring_type(), f.base);

        let ctor = introspector.find_constructor(f.derived, true, &[]).unwrap().unwrap();
        assert_eq!(ctor.declaring_type(), f.base);
    }

    #[test]
    fn test_find_non_recursive_stays_on_type() {
        let f = fixture(AccessPolicy::new());
        let introspector = f.registry.introspector();

        assert!(introspector.find_field(f.derived, false, "created").unwrap().is_none());
        assert!(introspector
            .find_method(f.derived, false, "resize", &[f.int])
            .unwrap()
            .is_none());
        assert!(introspector.find_constructor(f.derived, false, &[]).unwrap().is_none());
    }

    #[test]
    fn test_missing_member_is_absent() {
        let f = fixture(AccessPolicy::new());
        let introspector = f.registry.introspector();

        assert!(introspector.find_field(f.derived, true, "missing").unwrap().is_none());
        assert!(introspector
            .find_method(f.derived, true, "missing", &[])
            .unwrap()
            .is_none());
        assert!(introspector
            .find_constructor(f.derived, true, &[f.int, f.int])
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_access_denied_does_not_continue() {
        let mut policy = AccessPolicy::new();
        policy.set_type("Derived", ReflectionPermission::NONE);
        let f = fixture(policy);
        let introspector = f.registry.introspector();

        // "created" exists on Base, but the denial on Derived ends the search.
        assert!(introspector.find_field(f.derived, true, "created").unwrap().is_none());
        assert!(introspector.find_field(f.base, true, "created").unwrap().is_some());
    }

    #[test]
    fn test_denial_on_ancestor_ends_search() {
        let mut policy = AccessPolicy::new();
        policy.set_type("Base", ReflectionPermission::NONE);
        let f = fixture(policy);
        let introspector = f.registry.introspector();

        assert!(introspector.find_field(f.derived, true, "id").unwrap().is_some());
        assert!(introspector.find_field(f.derived, true, "created").unwrap().is_none());
    }

    #[test]
    fn test_unresolved_type_is_invalid_argument() {
        let f = fixture(AccessPolicy::new());
        let bogus = TypeHandle::from_index(10_000);
        let err = f
            .registry
            .introspector()
            .find_field(bogus, true, "id")
            .unwrap_err();
        assert!(matches!(err, IntrospectError::InvalidArgument(_)));
    }
}
