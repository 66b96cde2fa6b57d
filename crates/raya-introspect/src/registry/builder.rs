//! Registry builder and type definitions
//!
//! Types are described with chained definitions and registered parent-first:
//!
//! ```rust,ignore
//! let mut builder = RegistryBuilder::standard();
//! let int = builder.handle_of::<i32>().unwrap();
//!
//! let base = builder.register(
//!     TypeDefinition::of::<Base>("Base")
//!         .field(FieldDefinition::new("id", int))
//!         .constructor(ConstructorDefinition::nullary(Base::default)),
//! )?;
//! let derived = builder.register(
//!     TypeDefinition::of::<Derived>("Derived")
//!         .extends(base)
//!         .field(FieldDefinition::new("id", int)),
//! )?;
//! let registry = builder.build();
//! ```
//!
//! Because a parent must already be registered, every ancestry chain is
//! finite and ends at a root.

use std::any::{Any, TypeId};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use super::{standard, TypeRegistry};
use crate::access::AccessPolicy;
use crate::error::{InvocationError, RegistryError};
use crate::types::{
    Arguments, ConstructorDescriptor, ConstructorFn, FieldDescriptor, Instance, MethodDescriptor,
    ParameterSignature, Tag, TagSet, TypeDescriptor, TypeHandle, Visibility,
};

/// Definition for a field
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,
    /// Field type (if described)
    pub field_type: Option<TypeHandle>,
    /// Visibility
    pub visibility: Visibility,
    /// Whether this is a static field
    pub is_static: bool,
    /// Whether this field is readonly
    pub is_readonly: bool,
    /// Attached tags
    pub tags: TagSet,
}

impl FieldDefinition {
    /// Create a public field of the given type
    pub fn new(name: impl Into<String>, field_type: TypeHandle) -> Self {
        Self {
            name: name.into(),
            field_type: Some(field_type),
            visibility: Visibility::Public,
            is_static: false,
            is_readonly: false,
            tags: TagSet::new(),
        }
    }

    /// Create a public field without type information
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
            visibility: Visibility::Public,
            is_static: false,
            is_readonly: false,
            tags: TagSet::new(),
        }
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as private
    pub fn private(self) -> Self {
        self.visibility(Visibility::Private)
    }

    /// Mark as static field
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as readonly
    pub fn as_readonly(mut self) -> Self {
        self.is_readonly = true;
        self
    }

    /// Attach a tag
    pub fn tag<T: Tag>(mut self, tag: T) -> Self {
        self.tags.insert(tag);
        self
    }
}

/// Definition for a method
#[derive(Debug, Clone)]
pub struct MethodDefinition {
    /// Method name
    pub name: String,
    /// Parameter types
    pub parameters: Vec<TypeHandle>,
    /// Return type (None for no value)
    pub return_type: Option<TypeHandle>,
    /// Visibility
    pub visibility: Visibility,
    /// Whether this is a static method
    pub is_static: bool,
    /// Attached tags
    pub tags: TagSet,
}

impl MethodDefinition {
    /// Create a public method without parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            visibility: Visibility::Public,
            is_static: false,
            tags: TagSet::new(),
        }
    }

    /// Add a parameter
    pub fn param(mut self, param: TypeHandle) -> Self {
        self.parameters.push(param);
        self
    }

    /// Set return type
    pub fn returns(mut self, return_type: TypeHandle) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as private
    pub fn private(self) -> Self {
        self.visibility(Visibility::Private)
    }

    /// Mark as static method
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Attach a tag
    pub fn tag<T: Tag>(mut self, tag: T) -> Self {
        self.tags.insert(tag);
        self
    }
}

/// Definition for a constructor
#[derive(Clone)]
pub struct ConstructorDefinition {
    /// Parameter types
    pub parameters: Vec<TypeHandle>,
    /// Visibility
    pub visibility: Visibility,
    /// Attached tags
    pub tags: TagSet,
    body: ConstructorFn,
}

impl ConstructorDefinition {
    /// Create a public constructor from a type-erased body
    pub fn new<F>(parameters: Vec<TypeHandle>, body: F) -> Self
    where
        F: Fn(Arguments) -> Result<Instance, InvocationError> + Send + Sync + 'static,
    {
        Self {
            parameters,
            visibility: Visibility::Public,
            tags: TagSet::new(),
            body: Arc::new(body),
        }
    }

    /// Create a public constructor whose body produces a concrete `T`
    pub fn typed<T, F>(parameters: Vec<TypeHandle>, body: F) -> Self
    where
        T: Any + Send,
        F: Fn(Arguments) -> Result<T, InvocationError> + Send + Sync + 'static,
    {
        Self::new(parameters, move |args| {
            body(args).map(|value| Box::new(value) as Instance)
        })
    }

    /// Create a public zero-argument constructor
    pub fn nullary<T, F>(body: F) -> Self
    where
        T: Any + Send,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::typed(Vec::new(), move |_| Ok(body()))
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as private
    pub fn private(self) -> Self {
        self.visibility(Visibility::Private)
    }

    /// Mark as protected
    pub fn protected(self) -> Self {
        self.visibility(Visibility::Protected)
    }

    /// Attach a tag
    pub fn tag<T: Tag>(mut self, tag: T) -> Self {
        self.tags.insert(tag);
        self
    }
}

impl std::fmt::Debug for ConstructorDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorDefinition")
            .field("parameters", &self.parameters)
            .field("visibility", &self.visibility)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// Complete definition of a type to register
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    /// Type name (unique within a registry)
    pub name: String,
    /// Bound Rust type
    pub rust_type: Option<(TypeId, &'static str)>,
    /// Parent type
    pub parent: Option<TypeHandle>,
    /// Whether the type cannot be instantiated
    pub is_abstract: bool,
    /// Fields in declaration order
    pub fields: Vec<FieldDefinition>,
    /// Methods in declaration order
    pub methods: Vec<MethodDefinition>,
    /// Constructors in declaration order
    pub constructors: Vec<ConstructorDefinition>,
}

impl TypeDefinition {
    /// Create a definition not bound to a Rust type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rust_type: None,
            parent: None,
            is_abstract: false,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Create a definition bound to Rust type `T`
    ///
    /// Constructors of a bound type must produce a `T`, and arguments passed
    /// for a parameter of this type must be a `T`.
    pub fn of<T: Any>(name: impl Into<String>) -> Self {
        let mut def = Self::new(name);
        def.rust_type = Some((TypeId::of::<T>(), std::any::type_name::<T>()));
        def
    }

    /// Set the parent type
    pub fn extends(mut self, parent: TypeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Mark as abstract
    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Add a field
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a method
    pub fn method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a constructor
    pub fn constructor(mut self, constructor: ConstructorDefinition) -> Self {
        self.constructors.push(constructor);
        self
    }
}

/// Builder for an immutable [`TypeRegistry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: Vec<TypeDescriptor>,
    name_to_handle: FxHashMap<String, TypeHandle>,
    rust_to_handle: FxHashMap<TypeId, TypeHandle>,
    policy: AccessPolicy,
}

impl RegistryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with the standard primitive types registered
    pub fn standard() -> Self {
        let mut builder = Self::new();
        standard::register_primitives(&mut builder);
        builder
    }

    /// Install an access policy
    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the access policy
    pub fn set_policy(&mut self, policy: AccessPolicy) {
        self.policy = policy;
    }

    /// Handle of the descriptor bound to Rust type `T`
    pub fn handle_of<T: Any>(&self) -> Option<TypeHandle> {
        self.rust_to_handle.get(&TypeId::of::<T>()).copied()
    }

    /// Handle of a registered type name
    pub fn handle_by_name(&self, name: &str) -> Option<TypeHandle> {
        self.name_to_handle.get(name).copied()
    }

    /// Get next available handle
    pub fn next_handle(&self) -> TypeHandle {
        TypeHandle::from_index(self.types.len())
    }

    /// Register a type
    pub fn register(&mut self, def: TypeDefinition) -> Result<TypeHandle, RegistryError> {
        self.validate(&def)?;

        let handle = self.next_handle();
        let TypeDefinition {
            name,
            rust_type,
            parent,
            is_abstract,
            fields,
            methods,
            constructors,
        } = def;

        let fields = fields
            .into_iter()
            .map(|f| FieldDescriptor {
                name: f.name,
                declaring_type: handle,
                field_type: f.field_type,
                visibility: f.visibility,
                is_static: f.is_static,
                is_readonly: f.is_readonly,
                tags: f.tags,
            })
            .collect();

        let methods = methods
            .into_iter()
            .map(|m| MethodDescriptor {
                name: m.name,
                parameters: ParameterSignature::new(m.parameters),
                return_type: m.return_type,
                declaring_type: handle,
                visibility: m.visibility,
                is_static: m.is_static,
                tags: m.tags,
            })
            .collect();

        let constructors = constructors
            .into_iter()
            .map(|c| ConstructorDescriptor {
                parameters: ParameterSignature::new(c.parameters),
                declaring_type: handle,
                visibility: c.visibility,
                tags: c.tags,
                body: c.body,
            })
            .collect();

        tracing::trace!(%handle, name = %name, ?parent, "registering type");

        self.name_to_handle.insert(name.clone(), handle);
        if let Some((id, _)) = rust_type {
            self.rust_to_handle.insert(id, handle);
        }
        self.types.push(TypeDescriptor {
            handle,
            name,
            rust_type,
            parent,
            is_abstract,
            fields,
            methods,
            constructors,
        });

        Ok(handle)
    }

    /// Finish building
    pub fn build(self) -> TypeRegistry {
        TypeRegistry {
            types: self.types,
            name_to_handle: self.name_to_handle,
            rust_to_handle: self.rust_to_handle,
            policy: self.policy,
        }
    }

    fn validate(&self, def: &TypeDefinition) -> Result<(), RegistryError> {
        if self.name_to_handle.contains_key(&def.name) {
            return Err(RegistryError::DuplicateType(def.name.clone()));
        }

        if let Some((id, rust_name)) = def.rust_type {
            if let Some(existing) = self.rust_to_handle.get(&id) {
                return Err(RegistryError::DuplicateBinding {
                    rust_type: rust_name,
                    existing: self.types[existing.index()].name.clone(),
                });
            }
        }

        let known = |handle: TypeHandle| -> Result<(), RegistryError> {
            if handle.index() < self.types.len() {
                Ok(())
            } else {
                Err(RegistryError::UnknownType {
                    owner: def.name.clone(),
                    handle,
                })
            }
        };

        if let Some(parent) = def.parent {
            known(parent)?;
        }

        let mut field_names = FxHashSet::default();
        for field in &def.fields {
            if let Some(ty) = field.field_type {
                known(ty)?;
            }
            if !field_names.insert(field.name.as_str()) {
                return Err(self.duplicate(def, "field", field.name.clone()));
            }
        }

        let mut method_keys = FxHashSet::default();
        for method in &def.methods {
            for param in &method.parameters {
                known(*param)?;
            }
            if let Some(ty) = method.return_type {
                known(ty)?;
            }
            if !method_keys.insert((method.name.as_str(), method.parameters.as_slice())) {
                let key = format!("{}{}", method.name, self.render(&method.parameters));
                return Err(self.duplicate(def, "method", key));
            }
        }

        let mut ctor_keys = FxHashSet::default();
        for ctor in &def.constructors {
            for param in &ctor.parameters {
                known(*param)?;
            }
            if !ctor_keys.insert(ctor.parameters.as_slice()) {
                return Err(self.duplicate(def, "constructor", self.render(&ctor.parameters)));
            }
        }

        Ok(())
    }

    fn duplicate(&self, def: &TypeDefinition, kind: &'static str, key: String) -> RegistryError {
        RegistryError::DuplicateMember {
            owner: def.name.clone(),
            kind,
            key,
        }
    }

    fn render(&self, params: &[TypeHandle]) -> String {
        let names: Vec<&str> = params
            .iter()
            .map(|h| {
                self.types
                    .get(h.index())
                    .map(|ty| ty.name.as_str())
                    .unwrap_or("?")
            })
            .collect();
        format!("({})", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Member;

    #[derive(Debug)]
    struct Column(&'static str);
    impl Tag for Column {}

    #[test]
    fn test_register_assigns_sequential_handles() {
        let mut builder = RegistryBuilder::new();
        assert_eq!(builder.next_handle(), TypeHandle::from_index(0));

        let a = builder.register(TypeDefinition::new("A")).unwrap();
        let b = builder.register(TypeDefinition::new("B").extends(a)).unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(builder.handle_by_name("B"), Some(b));

        let registry = builder.build();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(b).unwrap().parent(), Some(a));
        assert!(registry.get(a).unwrap().is_root());
    }

    #[test]
    fn test_members_carry_declaring_type() {
        let mut builder = RegistryBuilder::standard();
        let int = builder.handle_of::<i32>().unwrap();
        let ty = builder
            .register(
                TypeDefinition::new("Row")
                    .field(FieldDefinition::new("id", int).tag(Column("row_id")).as_readonly())
                    .method(MethodDefinition::new("get").param(int).returns(int).private()),
            )
            .unwrap();
        let registry = builder.build();
        let row = registry.get(ty).unwrap();

        let id = &row.fields()[0];
        assert_eq!(id.declaring_type(), ty);
        assert_eq!(id.field_type(), Some(int));
        assert!(id.is_readonly());
        assert_eq!(id.tags().get::<Column>().map(|c| c.0), Some("row_id"));

        let get = &row.methods()[0];
        assert_eq!(get.parameters().types(), &[int]);
        assert_eq!(get.return_type(), Some(int));
        assert_eq!(get.visibility(), Visibility::Private);
    }

    #[test]
    fn test_duplicate_type_name() {
        let mut builder = RegistryBuilder::new();
        builder.register(TypeDefinition::new("Point")).unwrap();
        assert_eq!(
            builder.register(TypeDefinition::new("Point")),
            Err(RegistryError::DuplicateType("Point".to_string()))
        );
    }

    #[test]
    fn test_duplicate_rust_binding() {
        let mut builder = RegistryBuilder::standard();
        let err = builder
            .register(TypeDefinition::of::<i32>("Int32"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateBinding { ref existing, .. } if existing == "i32"));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut builder = RegistryBuilder::new();
        let err = builder
            .register(TypeDefinition::new("Orphan").extends(TypeHandle::from_index(3)))
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownType { .. }));
        // Nothing was registered
        assert_eq!(builder.next_handle(), TypeHandle::from_index(0));
    }

    #[test]
    fn test_duplicate_members_rejected() {
        let mut builder = RegistryBuilder::standard();
        let int = builder.handle_of::<i32>().unwrap();

        let err = builder
            .register(
                TypeDefinition::new("A")
                    .field(FieldDefinition::new("x", int))
                    .field(FieldDefinition::untyped("x")),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateMember { kind: "field", .. }));

        // Overloads with distinct signatures are fine
        builder
            .register(
                TypeDefinition::new("B")
                    .method(MethodDefinition::new("m"))
                    .method(MethodDefinition::new("m").param(int)),
            )
            .unwrap();

        let err = builder
            .register(
                TypeDefinition::new("C")
                    .method(MethodDefinition::new("m").param(int))
                    .method(MethodDefinition::new("m").param(int).private()),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateMember {
                owner: "C".to_string(),
                kind: "method",
                key: "m(i32)".to_string(),
            }
        );

        let err = builder
            .register(
                TypeDefinition::new("D")
                    .constructor(ConstructorDefinition::nullary(|| 1u8))
                    .constructor(ConstructorDefinition::nullary(|| 2u8).private()),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateMember { kind: "constructor", .. }));
    }
}
