//! Type registry
//!
//! The registry is the runtime type-reflection facility the introspector
//! queries. It stores every registered [`TypeDescriptor`] indexed by
//! [`TypeHandle`], resolves declared members on a single type, walks parent
//! links, and invokes constructors under the configured [`AccessPolicy`].
//!
//! A registry is immutable once built, so it can be shared across threads
//! and queried concurrently without locking.

mod builder;
mod standard;

use std::any::{Any, TypeId};
use std::panic::{self, AssertUnwindSafe};

use rustc_hash::FxHashMap;

use crate::access::{AccessPolicy, ReflectionPermission};
use crate::error::{ConstructError, InvocationError, LookupError};
use crate::introspect::Introspector;
use crate::types::{
    Arguments, ConstructorDescriptor, FieldDescriptor, Instance, Member, MethodDescriptor,
    TypeDescriptor, TypeHandle,
};

pub use builder::{
    ConstructorDefinition, FieldDefinition, MethodDefinition, RegistryBuilder, TypeDefinition,
};

/// Immutable registry of type descriptors
#[derive(Debug)]
pub struct TypeRegistry {
    /// Types indexed by handle
    types: Vec<TypeDescriptor>,
    /// Type name to handle mapping
    name_to_handle: FxHashMap<String, TypeHandle>,
    /// Bound Rust type to handle mapping
    rust_to_handle: FxHashMap<TypeId, TypeHandle>,
    /// Reflection permissions
    policy: AccessPolicy,
}

impl TypeRegistry {
    /// Introspector over this registry
    pub fn introspector(&self) -> Introspector<'_> {
        Introspector::new(self)
    }

    /// Get type by handle
    pub fn get(&self, handle: TypeHandle) -> Option<&TypeDescriptor> {
        self.types.get(handle.index())
    }

    /// Get type by name
    pub fn get_by_name(&self, name: &str) -> Option<&TypeDescriptor> {
        self.name_to_handle
            .get(name)
            .and_then(|handle| self.get(*handle))
    }

    /// Handle of the descriptor bound to Rust type `T`
    pub fn handle_of<T: Any>(&self) -> Option<TypeHandle> {
        self.rust_to_handle.get(&TypeId::of::<T>()).copied()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all types in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }

    /// Access policy in force
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Type name for diagnostics, falling back to the handle
    pub fn type_name(&self, handle: TypeHandle) -> String {
        self.get(handle)
            .map(|ty| ty.name.clone())
            .unwrap_or_else(|| handle.to_string())
    }

    /// Render a parameter list as `(a, b)`
    pub fn render_signature(&self, params: &[TypeHandle]) -> String {
        let names: Vec<String> = params.iter().map(|h| self.type_name(*h)).collect();
        format!("({})", names.join(", "))
    }

    // ===== Hierarchy =====

    /// Parent type of `handle`
    pub fn parent(&self, handle: TypeHandle) -> Option<&TypeDescriptor> {
        self.get(handle)
            .and_then(|ty| ty.parent)
            .and_then(|parent| self.get(parent))
    }

    /// Walk from `handle` up to its root, starting with the type itself
    pub fn ancestry(&self, handle: TypeHandle) -> Ancestry<'_> {
        Ancestry {
            registry: self,
            next: Some(handle),
        }
    }

    /// The inheritance chain from `handle` to its root
    ///
    /// The first element is the type itself, the last is the root ancestor.
    pub fn hierarchy(&self, handle: TypeHandle) -> Vec<&TypeDescriptor> {
        self.ancestry(handle).collect()
    }

    /// Check if `sub` is `sup` or one of its descendants
    pub fn is_subclass_of(&self, sub: TypeHandle, sup: TypeHandle) -> bool {
        self.ancestry(sub).any(|ty| ty.handle == sup)
    }

    // ===== Declared members =====

    fn resolve(&self, handle: TypeHandle) -> Result<&TypeDescriptor, LookupError> {
        self.get(handle).ok_or(LookupError::UnknownType(handle))
    }

    fn check_declared_access(&self, ty: &TypeDescriptor) -> Result<(), LookupError> {
        if self
            .policy
            .allows(&ty.name, ReflectionPermission::LIST_DECLARED)
        {
            Ok(())
        } else {
            Err(LookupError::AccessDenied {
                type_name: ty.name.clone(),
            })
        }
    }

    /// Fields declared directly on a type
    pub fn declared_fields(&self, handle: TypeHandle) -> Result<&[FieldDescriptor], LookupError> {
        let ty = self.resolve(handle)?;
        self.check_declared_access(ty)?;
        Ok(&ty.fields)
    }

    /// Methods declared directly on a type
    pub fn declared_methods(&self, handle: TypeHandle) -> Result<&[MethodDescriptor], LookupError> {
        let ty = self.resolve(handle)?;
        self.check_declared_access(ty)?;
        Ok(&ty.methods)
    }

    /// Constructors declared directly on a type
    pub fn declared_constructors(
        &self,
        handle: TypeHandle,
    ) -> Result<&[ConstructorDescriptor], LookupError> {
        let ty = self.resolve(handle)?;
        self.check_declared_access(ty)?;
        Ok(&ty.constructors)
    }

    /// Field declared directly on a type, by name
    pub fn get_declared_field(
        &self,
        handle: TypeHandle,
        name: &str,
    ) -> Result<&FieldDescriptor, LookupError> {
        let ty = self.resolve(handle)?;
        self.check_declared_access(ty)?;
        ty.fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| LookupError::NoSuchField {
                type_name: ty.name.clone(),
                name: name.to_string(),
            })
    }

    /// Method declared directly on a type, by name and exact signature
    pub fn get_declared_method(
        &self,
        handle: TypeHandle,
        name: &str,
        params: &[TypeHandle],
    ) -> Result<&MethodDescriptor, LookupError> {
        let ty = self.resolve(handle)?;
        self.check_declared_access(ty)?;
        ty.methods
            .iter()
            .find(|method| method.name == name && method.parameters.matches(params))
            .ok_or_else(|| LookupError::NoSuchMethod {
                type_name: ty.name.clone(),
                name: name.to_string(),
                signature: self.render_signature(params),
            })
    }

    /// Constructor declared directly on a type, by exact signature
    pub fn get_declared_constructor(
        &self,
        handle: TypeHandle,
        params: &[TypeHandle],
    ) -> Result<&ConstructorDescriptor, LookupError> {
        let ty = self.resolve(handle)?;
        self.check_declared_access(ty)?;
        ty.constructors
            .iter()
            .find(|ctor| ctor.parameters.matches(params))
            .ok_or_else(|| LookupError::NoSuchConstructor {
                type_name: ty.name.clone(),
                signature: self.render_signature(params),
            })
    }

    // ===== Invocation =====

    /// Invoke a constructor with the given argument values
    ///
    /// `bypass_access` lifts visibility enforcement for this call only. The
    /// number of values must equal the signature length, and each value must
    /// be of the Rust type bound to the corresponding parameter type.
    ///
    /// A panicking constructor body is reported as
    /// [`ConstructError::InvocationTarget`] only when panics unwind. The
    /// workspace release profile sets `panic = "abort"`, so there a panicking
    /// body aborts the process.
    pub fn new_instance(
        &self,
        ctor: &ConstructorDescriptor,
        values: Vec<Box<dyn Any + Send>>,
        bypass_access: bool,
    ) -> Result<Instance, ConstructError> {
        let owner = self.get(ctor.declaring_type()).ok_or_else(|| {
            ConstructError::IllegalArgument(format!(
                "constructor belongs to unknown type {}",
                ctor.declaring_type()
            ))
        })?;

        self.check_invoke_access(owner, ctor, bypass_access)?;

        if owner.is_abstract {
            return Err(ConstructError::Instantiation(owner.name.clone()));
        }

        let params = ctor.parameters().types();
        if values.len() != params.len() {
            return Err(ConstructError::IllegalArgument(format!(
                "wrong number of arguments for {}{}: expected {}, got {}",
                owner.name,
                self.render_signature(params),
                params.len(),
                values.len()
            )));
        }

        let args = Arguments::new(values);
        for (index, param) in params.iter().enumerate() {
            let expected = self.get(*param).and_then(|ty| ty.rust_type);
            if let Some((expected_id, expected_name)) = expected {
                if args.value_type_id(index) != Some(expected_id) {
                    return Err(ConstructError::IllegalArgument(format!(
                        "argument {} of {}{}: expected {}",
                        index,
                        owner.name,
                        self.render_signature(params),
                        expected_name
                    )));
                }
            }
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| ctor.call(args)));
        let instance = match outcome {
            Ok(Ok(instance)) => instance,
            Ok(Err(source)) => {
                return Err(ConstructError::InvocationTarget {
                    type_name: owner.name.clone(),
                    source,
                })
            }
            Err(payload) => {
                return Err(ConstructError::InvocationTarget {
                    type_name: owner.name.clone(),
                    source: InvocationError::Failed(format!(
                        "panicked: {}",
                        panic_message(payload.as_ref())
                    )),
                })
            }
        };

        if let Some((expected_id, expected_name)) = owner.rust_type {
            let produced: &dyn Any = &*instance;
            if produced.type_id() != expected_id {
                return Err(ConstructError::InvocationTarget {
                    type_name: owner.name.clone(),
                    source: InvocationError::Failed(format!(
                        "constructor did not produce a {}",
                        expected_name
                    )),
                });
            }
        }

        Ok(instance)
    }

    fn check_invoke_access(
        &self,
        owner: &TypeDescriptor,
        ctor: &ConstructorDescriptor,
        bypass_access: bool,
    ) -> Result<(), ConstructError> {
        let perms = self.policy.resolve(&owner.name);

        if ctor.visibility().is_public() {
            if perms.contains(ReflectionPermission::INVOKE_PUBLIC) {
                return Ok(());
            }
            return Err(ConstructError::IllegalAccess(format!(
                "invoking constructors of {} is not permitted",
                owner.name
            )));
        }

        if !bypass_access {
            return Err(ConstructError::IllegalAccess(format!(
                "{} constructor {}{} is not accessible",
                ctor.visibility(),
                owner.name,
                self.render_signature(ctor.parameters().types())
            )));
        }

        if !perms.contains(ReflectionPermission::INVOKE_PRIVATE) {
            return Err(ConstructError::Security(format!(
                "access bypass is not permitted for {}",
                owner.name
            )));
        }

        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Iterator over a type and its ancestors, most-derived first
#[derive(Debug, Clone)]
pub struct Ancestry<'r> {
    registry: &'r TypeRegistry,
    next: Option<TypeHandle>,
}

impl<'r> Iterator for Ancestry<'r> {
    type Item = &'r TypeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let ty = self.registry.get(self.next?)?;
        self.next = ty.parent;
        Some(ty)
    }
}
