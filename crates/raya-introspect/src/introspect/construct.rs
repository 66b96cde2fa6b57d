//! Instantiation through a located constructor
//!
//! Every failure on this path (missing constructor, wrong arguments, access
//! denial, abstract type, failing constructor body) is logged at `error` level
//! and reported to the caller as `None`. The access bypass applies to the one
//! invocation only; descriptors are never modified.

use std::any::Any;

use super::Introspector;
use crate::error::{ConstructError, LookupError};
use crate::types::{Instance, TypeHandle};

impl<'r> Introspector<'r> {
    /// Create an instance through the zero-argument constructor of `ty`
    ///
    /// With `bypass_access`, a non-public constructor may be invoked.
    /// Returns `None` when `ty` is `None` or on any failure.
    pub fn construct(&self, ty: Option<TypeHandle>, bypass_access: bool) -> Option<Instance> {
        self.construct_with(ty, bypass_access, Some(&[]), Some(Vec::new()))
    }

    /// Create an instance through the public zero-argument constructor
    pub fn construct_default(&self, ty: Option<TypeHandle>) -> Option<Instance> {
        self.construct(ty, false)
    }

    /// Create an instance through the constructor whose signature is exactly
    /// `parameter_types`
    ///
    /// Nothing is invoked unless both `parameter_types` and `values` are
    /// given. Values beyond the signature length are ignored.
    #[tracing::instrument(level = "debug", skip(self, values))]
    pub fn construct_with(
        &self,
        ty: Option<TypeHandle>,
        bypass_access: bool,
        parameter_types: Option<&[TypeHandle]>,
        values: Option<Vec<Box<dyn Any + Send>>>,
    ) -> Option<Instance> {
        let ty = ty?;
        let descriptor = match self.registry.get(ty) {
            Some(descriptor) => descriptor,
            None => {
                tracing::debug!(%ty, "construct on unregistered type");
                return None;
            }
        };

        let (Some(parameter_types), Some(mut values)) = (parameter_types, values) else {
            tracing::debug!(type_name = descriptor.name(), "no constructor arguments given");
            return None;
        };
        values.truncate(parameter_types.len());

        match self.instantiate(ty, bypass_access, parameter_types, values) {
            Ok(instance) => Some(instance),
            Err(err) => {
                tracing::error!(
                    type_name = descriptor.name(),
                    signature = %self.registry.render_signature(parameter_types),
                    bypass_access,
                    error = %err,
                    "construction failed"
                );
                None
            }
        }
    }

    /// [`construct`](Self::construct), downcast to `T`
    pub fn construct_as<T: Any>(&self, ty: Option<TypeHandle>, bypass_access: bool) -> Option<T> {
        self.construct(ty, bypass_access).and_then(downcast_instance)
    }

    /// [`construct_with`](Self::construct_with), downcast to `T`
    pub fn construct_with_as<T: Any>(
        &self,
        ty: Option<TypeHandle>,
        bypass_access: bool,
        parameter_types: Option<&[TypeHandle]>,
        values: Option<Vec<Box<dyn Any + Send>>>,
    ) -> Option<T> {
        self.construct_with(ty, bypass_access, parameter_types, values)
            .and_then(downcast_instance)
    }

    fn instantiate(
        &self,
        ty: TypeHandle,
        bypass_access: bool,
        parameter_types: &[TypeHandle],
        values: Vec<Box<dyn Any + Send>>,
    ) -> Result<Instance, ConstructError> {
        let ctor = self
            .registry
            .get_declared_constructor(ty, parameter_types)
            .map_err(|err| match err {
                LookupError::AccessDenied { .. } => ConstructError::Security(err.to_string()),
                other => ConstructError::NoSuchConstructor(other),
            })?;
        self.registry.new_instance(ctor, values, bypass_access)
    }
}

fn downcast_instance<T: Any>(instance: Instance) -> Option<T> {
    match instance.downcast::<T>() {
        Ok(value) => Some(*value),
        Err(_) => {
            tracing::error!(
                expected = std::any::type_name::<T>(),
                "constructed instance has a different type"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use crate::access::{AccessPolicy, ReflectionPermission};
    use crate::error::InvocationError;
    use crate::registry::{ConstructorDefinition, RegistryBuilder, TypeDefinition, TypeRegistry};
    use crate::types::TypeHandle;

    #[derive(Debug, PartialEq)]
    struct Secret(u32);

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    struct Fixture {
        registry: TypeRegistry,
        int: TypeHandle,
        secret: TypeHandle,
        point: TypeHandle,
        shape: TypeHandle,
        fragile: TypeHandle,
    }

    fn fixture(policy: AccessPolicy) -> Fixture {
        let mut builder = RegistryBuilder::standard().with_policy(policy);
        let int = builder.handle_of::<i32>().unwrap();

        let secret = builder
            .register(
                TypeDefinition::of::<Secret>("Secret")
                    .constructor(ConstructorDefinition::nullary(|| Secret(7)).private()),
            )
            .unwrap();
        let point = builder
            .register(
                TypeDefinition::of::<Point>("Point")
                    .constructor(ConstructorDefinition::nullary(|| Point { x: 0, y: 0 }))
                    .constructor(ConstructorDefinition::typed(vec![int, int], |mut args| {
                        Ok(Point {
                            x: args.take(0)?,
                            y: args.take(1)?,
                        })
                    })),
            )
            .unwrap();
        let shape = builder
            .register(
                TypeDefinition::new("Shape")
                    .as_abstract()
                    .constructor(ConstructorDefinition::nullary(|| ())),
            )
            .unwrap();
        let fragile = builder
            .register(
                TypeDefinition::new("Fragile")
                    .constructor(ConstructorDefinition::new(Vec::new(), |_| {
                        Err(InvocationError::from("refusing to build"))
                    }))
                    .constructor(ConstructorDefinition::new(vec![int], |_| {
                        panic!("constructor blew up")
                    })),
            )
            .unwrap();

        Fixture {
            registry: builder.build(),
            int,
            secret,
            point,
            shape,
            fragile,
        }
    }

    fn values(items: Vec<Box<dyn Any + Send>>) -> Option<Vec<Box<dyn Any + Send>>> {
        Some(items)
    }

    #[test]
    fn test_private_constructor_with_bypass() {
        let f = fixture(AccessPolicy::new());
        let introspector = f.registry.introspector();

        assert_eq!(introspector.construct_as::<Secret>(Some(f.secret), true), Some(Secret(7)));
        assert!(introspector.construct(Some(f.secret), false).is_none());
        assert!(introspector.construct_default(Some(f.secret)).is_none());
    }

    #[test]
    fn test_absent_type_returns_none() {
        let f = fixture(AccessPolicy::new());
        let introspector = f.registry.introspector();

        assert!(introspector.construct(None, true).is_none());
        assert!(introspector.construct(None, false).is_none());
        assert!(introspector
            .construct_with(None, true, Some(&[f.int]), values(vec![Box::new(1i32)]))
            .is_none());
        assert!(introspector
            .construct(Some(TypeHandle::from_index(4242)), true)
            .is_none());
    }

    #[test]
    fn test_parameterized_constructor() {
        let f = fixture(AccessPolicy::new());
        let introspector = f.registry.introspector();

        let point = introspector.construct_with_as::<Point>(
            Some(f.point),
            false,
            Some(&[f.int, f.int]),
            values(vec![Box::new(3i32), Box::new(4i32)]),
        );
        assert_eq!(point, Some(Point { x: 3, y: 4 }));
    }

    #[test]
    fn test_surplus_values_are_ignored() {
        let f = fixture(AccessPolicy::new());
        let point = f.registry.introspector().construct_with_as::<Point>(
            Some(f.point),
            false,
            Some(&[f.int, f.int]),
            values(vec![Box::new(1i32), Box::new(2i32), Box::new("extra")]),
        );
        assert_eq!(point, Some(Point { x: 1, y: 2 }));
    }

    #[test]
    fn test_argument_mismatch_returns_none() {
        let f = fixture(AccessPolicy::new());
        let introspector = f.registry.introspector();

        // Too few values
        assert!(introspector
            .construct_with(Some(f.point), false, Some(&[f.int, f.int]), values(vec![Box::new(1i32)]))
            .is_none());
        // Wrong value type
        assert!(introspector
            .construct_with(
                Some(f.point),
                false,
                Some(&[f.int, f.int]),
                values(vec![Box::new(1i32), Box::new(2.0f64)]),
            )
            .is_none());
        // No such signature
        assert!(introspector
            .construct_with(Some(f.point), false, Some(&[f.int]), values(vec![Box::new(1i32)]))
            .is_none());
    }

    #[test]
    fn test_missing_types_or_values_invokes_nothing() {
        let f = fixture(AccessPolicy::new());
        let introspector = f.registry.introspector();

        assert!(introspector
            .construct_with(Some(f.point), false, None, values(Vec::new()))
            .is_none());
        assert!(introspector
            .construct_with(Some(f.point), false, Some(&[]), None)
            .is_none());
    }

    #[test]
    fn test_abstract_type_returns_none() {
        let f = fixture(AccessPolicy::new());
        assert!(f.registry.introspector().construct(Some(f.shape), true).is_none());
    }

    #[test]
    fn test_failing_constructor_body_returns_none() {
        let f = fixture(AccessPolicy::new());
        let introspector = f.registry.introspector();

        assert!(introspector.construct(Some(f.fragile), true).is_none());
        assert!(introspector
            .construct_with(Some(f.fragile), true, Some(&[f.int]), values(vec![Box::new(1i32)]))
            .is_none());
    }

    #[test]
    fn test_policy_denials_return_none() {
        let mut policy = AccessPolicy::new();
        policy.set_type("Secret", ReflectionPermission::PUBLIC_ONLY);
        policy.set_type("Point", ReflectionPermission::NONE);
        let f = fixture(policy);
        let introspector = f.registry.introspector();

        // Bypass requested but not permitted
        assert!(introspector.construct(Some(f.secret), true).is_none());
        // Declared members hidden entirely
        assert!(introspector.construct(Some(f.point), false).is_none());
    }

    #[test]
    fn test_wrong_downcast_returns_none() {
        let f = fixture(AccessPolicy::new());
        assert!(f
            .registry
            .introspector()
            .construct_as::<Secret>(Some(f.point), false)
            .is_none());
    }

    #[test]
    fn test_constructor_not_inherited() {
        let mut builder = RegistryBuilder::new();
        let base = builder
            .register(TypeDefinition::new("Base").constructor(ConstructorDefinition::nullary(|| 1u8)))
            .unwrap();
        let derived = builder
            .register(TypeDefinition::new("Derived").extends(base))
            .unwrap();
        let registry = builder.build();

        assert!(registry.introspector().construct(Some(base), false).is_some());
        assert!(registry.introspector().construct(Some(derived), false).is_none());
    }
}
