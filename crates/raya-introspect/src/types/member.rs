//! Field, method, and constructor descriptors

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::{TagSet, TypeHandle, Visibility};
use crate::error::InvocationError;

/// A constructed instance, type-erased
pub type Instance = Box<dyn Any + Send>;

/// Constructor body registered for a type
pub type ConstructorFn = Arc<dyn Fn(Arguments) -> Result<Instance, InvocationError> + Send + Sync>;

/// Common view over every member kind
pub trait Member {
    /// Type that declares this member
    fn declaring_type(&self) -> TypeHandle;
    /// Visibility level
    fn visibility(&self) -> Visibility;
    /// Attached metadata tags
    fn tags(&self) -> &TagSet;
}

/// Ordered parameter types of a method or constructor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ParameterSignature(Vec<TypeHandle>);

impl ParameterSignature {
    /// Create a signature from parameter types
    pub fn new(types: Vec<TypeHandle>) -> Self {
        Self(types)
    }

    /// The zero-parameter signature
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Parameter types in order
    pub fn types(&self) -> &[TypeHandle] {
        &self.0
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the signature takes no parameters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact match against requested parameter types
    pub fn matches(&self, types: &[TypeHandle]) -> bool {
        self.0 == types
    }
}

impl From<Vec<TypeHandle>> for ParameterSignature {
    fn from(types: Vec<TypeHandle>) -> Self {
        Self(types)
    }
}

impl From<&[TypeHandle]> for ParameterSignature {
    fn from(types: &[TypeHandle]) -> Self {
        Self(types.to_vec())
    }
}

/// Field declared on a type
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) declaring_type: TypeHandle,
    pub(crate) field_type: Option<TypeHandle>,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) is_readonly: bool,
    pub(crate) tags: TagSet,
}

impl FieldDescriptor {
    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared field type, if described
    pub fn field_type(&self) -> Option<TypeHandle> {
        self.field_type
    }

    /// Whether the field is static
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether the field is readonly
    pub fn is_readonly(&self) -> bool {
        self.is_readonly
    }
}

impl Member for FieldDescriptor {
    fn declaring_type(&self) -> TypeHandle {
        self.declaring_type
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn tags(&self) -> &TagSet {
        &self.tags
    }
}

/// Method declared on a type
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub(crate) name: String,
    pub(crate) parameters: ParameterSignature,
    pub(crate) return_type: Option<TypeHandle>,
    pub(crate) declaring_type: TypeHandle,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) tags: TagSet,
}

impl MethodDescriptor {
    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter signature
    pub fn parameters(&self) -> &ParameterSignature {
        &self.parameters
    }

    /// Return type, `None` for no value
    pub fn return_type(&self) -> Option<TypeHandle> {
        self.return_type
    }

    /// Whether the method is static
    pub fn is_static(&self) -> bool {
        self.is_static
    }
}

impl Member for MethodDescriptor {
    fn declaring_type(&self) -> TypeHandle {
        self.declaring_type
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn tags(&self) -> &TagSet {
        &self.tags
    }
}

/// Constructor declared on a type
#[derive(Clone)]
pub struct ConstructorDescriptor {
    pub(crate) parameters: ParameterSignature,
    pub(crate) declaring_type: TypeHandle,
    pub(crate) visibility: Visibility,
    pub(crate) tags: TagSet,
    pub(crate) body: ConstructorFn,
}

impl ConstructorDescriptor {
    /// Parameter signature
    pub fn parameters(&self) -> &ParameterSignature {
        &self.parameters
    }

    pub(crate) fn call(&self, args: Arguments) -> Result<Instance, InvocationError> {
        (self.body)(args)
    }
}

impl Member for ConstructorDescriptor {
    fn declaring_type(&self) -> TypeHandle {
        self.declaring_type
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn tags(&self) -> &TagSet {
        &self.tags
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("parameters", &self.parameters)
            .field("declaring_type", &self.declaring_type)
            .field("visibility", &self.visibility)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// Argument values passed to a constructor body
///
/// Each value may be taken once, by position and concrete type.
pub struct Arguments {
    values: Vec<Option<Box<dyn Any + Send>>>,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Box<dyn Any + Send>>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
        }
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no arguments
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take ownership of argument `index` as `T`
    pub fn take<T: Any>(&mut self, index: usize) -> Result<T, InvocationError> {
        let slot = self
            .values
            .get_mut(index)
            .ok_or(InvocationError::MissingArgument(index))?;
        let value = slot.take().ok_or(InvocationError::MissingArgument(index))?;
        match value.downcast::<T>() {
            Ok(v) => Ok(*v),
            Err(original) => {
                // Leave the slot usable for a retry with the right type.
                *slot = Some(original);
                Err(InvocationError::ArgumentType {
                    index,
                    expected: std::any::type_name::<T>(),
                })
            }
        }
    }

    /// Borrow argument `index` as `T`
    pub fn get<T: Any>(&self, index: usize) -> Result<&T, InvocationError> {
        let value = self
            .values
            .get(index)
            .and_then(|slot| slot.as_ref())
            .ok_or(InvocationError::MissingArgument(index))?;
        value
            .downcast_ref::<T>()
            .ok_or(InvocationError::ArgumentType {
                index,
                expected: std::any::type_name::<T>(),
            })
    }

    pub(crate) fn value_type_id(&self, index: usize) -> Option<std::any::TypeId> {
        self.values
            .get(index)
            .and_then(|slot| slot.as_ref())
            .map(|value| {
                let value: &dyn Any = &**value;
                value.type_id()
            })
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments").field("len", &self.values.len()).finish()
    }
}
