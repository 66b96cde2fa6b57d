//! TOML configuration for reflection permissions
//!
//! Permissions can be configured in `raya.toml`:
//!
//! ```toml
//! [reflect.permissions]
//! global = "ALL"  # Default for all types
//!
//! [reflect.permissions.types]
//! "app::Vault" = "PUBLIC_ONLY"
//! "plugins::*" = "LIST_DECLARED"
//! "untrusted::*" = "NONE"
//! ```
//!
//! Wildcard entries become rules and are checked in file order. Only `*`,
//! `**` and `prefix::*` are accepted; any other key containing `*` is
//! rejected with [`ConfigError::UnsupportedPattern`].

use std::path::Path;

use serde::Deserialize;

use super::{AccessPolicy, ReflectionPermission, TypePermissionRule};
use crate::error::ConfigError;

/// Root of the introspection configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IntrospectConfig {
    /// `[reflect]` section
    pub reflect: ReflectSection,
}

/// `[reflect]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReflectSection {
    /// `[reflect.permissions]` section
    pub permissions: PermissionsSection,
}

/// `[reflect.permissions]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PermissionsSection {
    /// Global default, as a permission string
    pub global: String,
    /// Per-type permission strings, keyed by exact name or wildcard pattern
    pub types: toml::Table,
}

impl Default for PermissionsSection {
    fn default() -> Self {
        Self {
            global: "ALL".to_string(),
            types: toml::Table::new(),
        }
    }
}

impl IntrospectConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Build the access policy described by this configuration
    pub fn into_policy(self) -> Result<AccessPolicy, ConfigError> {
        let section = self.reflect.permissions;
        let mut policy = AccessPolicy::new();

        let global = ReflectionPermission::parse_combined(&section.global).ok_or_else(|| {
            ConfigError::InvalidPermission {
                key: "global".to_string(),
                value: section.global.clone(),
            }
        })?;
        policy.set_global(global);

        for (pattern, value) in section.types {
            let perms = value
                .as_str()
                .and_then(ReflectionPermission::parse_combined)
                .ok_or_else(|| ConfigError::InvalidPermission {
                    key: pattern.clone(),
                    value: value.to_string(),
                })?;

            if pattern.contains('*') {
                if !TypePermissionRule::is_supported_pattern(&pattern) {
                    return Err(ConfigError::UnsupportedPattern { pattern });
                }
                policy.add_rule(TypePermissionRule {
                    pattern,
                    permissions: perms,
                });
            } else {
                policy.set_type(&pattern, perms);
            }
        }

        tracing::debug!(
            global = %policy.global(),
            restricted = policy.has_any_restrictions(),
            "loaded reflection permissions"
        );
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_allows_everything() {
        let policy = IntrospectConfig::from_toml_str("")
            .unwrap()
            .into_policy()
            .unwrap();
        assert!(!policy.has_any_restrictions());
        assert_eq!(policy.resolve("Anything"), ReflectionPermission::ALL);
    }

    #[test]
    fn test_types_and_rules() {
        let toml = r#"
            [reflect.permissions]
            global = "PUBLIC_ONLY"

            [reflect.permissions.types]
            "app::Vault" = "NONE"
            "plugins::*" = "LIST_DECLARED | INVOKE_PRIVATE"
        "#;
        let policy = IntrospectConfig::from_toml_str(toml)
            .unwrap()
            .into_policy()
            .unwrap();

        assert_eq!(policy.resolve("app::Vault"), ReflectionPermission::NONE);
        assert_eq!(
            policy.resolve("plugins::Loader"),
            ReflectionPermission::from_bits(0x05)
        );
        assert_eq!(policy.resolve("app::Point"), ReflectionPermission::PUBLIC_ONLY);
    }

    #[test]
    fn test_invalid_permission() {
        let toml = r#"
            [reflect.permissions.types]
            "app::Vault" = "SOMETIMES"
        "#;
        let err = IntrospectConfig::from_toml_str(toml)
            .unwrap()
            .into_policy()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPermission { ref key, .. } if key == "app::Vault"));

        let toml = r#"
            [reflect.permissions]
            global = "EVERYTHING"
        "#;
        let err = IntrospectConfig::from_toml_str(toml)
            .unwrap()
            .into_policy()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPermission { ref key, .. } if key == "global"));
    }

    #[test]
    fn test_unsupported_wildcard_rejected() {
        for key in ["plugins*", "*::Secret", "app::*::Vault"] {
            let toml = format!("[reflect.permissions.types]\n\"{key}\" = \"NONE\"\n");
            let err = IntrospectConfig::from_toml_str(&toml)
                .unwrap()
                .into_policy()
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::UnsupportedPattern { ref pattern } if pattern == key),
                "{key}: {err}"
            );
        }
    }

    #[test]
    fn test_non_string_value_rejected() {
        let toml = r#"
            [reflect.permissions.types]
            "app::Vault" = 3
        "#;
        let err = IntrospectConfig::from_toml_str(toml)
            .unwrap()
            .into_policy()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPermission { .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let err = IntrospectConfig::from_toml_str("[reflect.permissions").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
