//! Reflection access control
//!
//! The [`AccessPolicy`] plays the role of a security manager: the registry
//! consults it before exposing declared members or honouring an access-bypass
//! request. Policies are usually loaded from TOML via [`IntrospectConfig`].

mod config;
mod permissions;

pub use config::{IntrospectConfig, PermissionsSection, ReflectSection};
pub use permissions::{AccessPolicy, ReflectionPermission, TypePermissionRule};
