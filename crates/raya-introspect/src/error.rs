//! Error types for type introspection
//!
//! Only [`IntrospectError`] ever reaches a caller of the
//! [`Introspector`](crate::Introspector). The remaining types are produced by
//! the registry (the host runtime) and are logged and absorbed by the
//! introspector.

use crate::types::TypeHandle;

/// Result type for introspector entry points
pub type IntrospectResult<T> = Result<T, IntrospectError>;

/// Caller-visible introspection failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntrospectError {
    /// A required type descriptor was absent or does not resolve
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl IntrospectError {
    pub(crate) fn unresolved(handle: TypeHandle) -> Self {
        IntrospectError::InvalidArgument(format!("type {} is not registered", handle))
    }
}

/// Failure of a declared-member lookup on a single type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// No field with this name is declared on the type
    #[error("No such field: {type_name}.{name}")]
    NoSuchField {
        /// Name of the searched type
        type_name: String,
        /// Requested field name
        name: String,
    },

    /// No method with this name and signature is declared on the type
    #[error("No such method: {type_name}.{name}{signature}")]
    NoSuchMethod {
        /// Name of the searched type
        type_name: String,
        /// Requested method name
        name: String,
        /// Requested parameter signature, rendered
        signature: String,
    },

    /// No constructor with this signature is declared on the type
    #[error("No such constructor: {type_name}{signature}")]
    NoSuchConstructor {
        /// Name of the searched type
        type_name: String,
        /// Requested parameter signature, rendered
        signature: String,
    },

    /// The access policy forbids reflecting on declared members of the type
    #[error("Access denied: declared members of {type_name} may not be reflected")]
    AccessDenied {
        /// Name of the protected type
        type_name: String,
    },

    /// The type handle does not belong to this registry
    #[error("Unknown type handle {0}")]
    UnknownType(TypeHandle),
}

impl LookupError {
    /// Whether this is a plain miss that permits retrying on the parent type
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LookupError::NoSuchField { .. }
                | LookupError::NoSuchMethod { .. }
                | LookupError::NoSuchConstructor { .. }
        )
    }
}

/// Error returned by a constructor body
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    /// An argument could not be taken as the requested type
    #[error("Argument {index}: expected {expected}")]
    ArgumentType {
        /// Argument position
        index: usize,
        /// Expected Rust type name
        expected: &'static str,
    },

    /// An argument was already consumed or never supplied
    #[error("Argument {0} is missing")]
    MissingArgument(usize),

    /// The constructor body reported a failure
    #[error("{0}")]
    Failed(String),
}

impl From<String> for InvocationError {
    fn from(s: String) -> Self {
        InvocationError::Failed(s)
    }
}

impl From<&str> for InvocationError {
    fn from(s: &str) -> Self {
        InvocationError::Failed(s.to_string())
    }
}

/// Failure while resolving or invoking a constructor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructError {
    /// No constructor matches the requested signature
    #[error(transparent)]
    NoSuchConstructor(LookupError),

    /// Reflection on the type is forbidden by the access policy
    #[error("Security: {0}")]
    Security(String),

    /// Argument count or argument types do not match the signature
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    /// The type cannot be instantiated (abstract)
    #[error("Cannot instantiate {0}")]
    Instantiation(String),

    /// The constructor is not accessible and access bypass was not granted
    #[error("Illegal access: {0}")]
    IllegalAccess(String),

    /// The constructor body failed or panicked
    #[error("Constructor of {type_name} failed: {source}")]
    InvocationTarget {
        /// Name of the constructed type
        type_name: String,
        /// Underlying failure
        #[source]
        source: InvocationError,
    },
}

/// Registration failure while building a registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A type with this name is already registered
    #[error("Type '{0}' is already registered")]
    DuplicateType(String),

    /// The Rust type is already bound to another descriptor
    #[error("Rust type {rust_type} is already bound to '{existing}'")]
    DuplicateBinding {
        /// Rust type name
        rust_type: &'static str,
        /// Descriptor already bound to it
        existing: String,
    },

    /// A referenced type handle is not registered
    #[error("Type '{owner}' references unknown type handle {handle}")]
    UnknownType {
        /// Type being registered
        owner: String,
        /// Offending handle
        handle: TypeHandle,
    },

    /// Two members of the same kind share a name or signature
    #[error("Duplicate {kind} '{key}' declared on '{owner}'")]
    DuplicateMember {
        /// Type being registered
        owner: String,
        /// Member kind ("field", "method", "constructor")
        kind: &'static str,
        /// Member name or signature
        key: String,
    },
}

/// Failure while loading introspection configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or shape error
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A permission string could not be parsed
    #[error("Invalid permission value for '{key}': {value}")]
    InvalidPermission {
        /// Config key the value was attached to
        key: String,
        /// Offending value
        value: String,
    },

    /// A type key uses a wildcard form the policy cannot match
    #[error("Unsupported type pattern '{pattern}': use an exact name, '*', or 'prefix::*'")]
    UnsupportedPattern {
        /// Offending key
        pattern: String,
    },
}
