//! Reflection Security & Permissions
//!
//! Controls which types may be reflected on and whether access bypass is
//! honoured. Resolution order for a type name:
//!
//! 1. exact per-type entry
//! 2. wildcard rules, first match wins
//! 3. global default

use std::fmt;

use rustc_hash::FxHashMap;

/// Reflection permission flags (bitflags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReflectionPermission(u8);

impl ReflectionPermission {
    /// No reflection allowed
    pub const NONE: Self = Self(0x00);
    /// Enumerate and look up declared members
    pub const LIST_DECLARED: Self = Self(0x01);
    /// Invoke public constructors
    pub const INVOKE_PUBLIC: Self = Self(0x02);
    /// Invoke non-public constructors through access bypass
    pub const INVOKE_PRIVATE: Self = Self(0x04);

    // Common combinations
    /// INVOKE_PUBLIC | INVOKE_PRIVATE
    pub const INVOKE_ALL: Self = Self(0x06);
    /// LIST_DECLARED | INVOKE_PUBLIC
    pub const PUBLIC_ONLY: Self = Self(0x03);
    /// Everything
    pub const ALL: Self = Self(0x07);

    /// Create from raw bits
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if permission contains a flag
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of permissions
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Difference (remove flags)
    pub const fn difference(&self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Parse a single flag name, hex (`0x..`) or decimal value
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::NONE),
            "LIST_DECLARED" => Some(Self::LIST_DECLARED),
            "INVOKE_PUBLIC" => Some(Self::INVOKE_PUBLIC),
            "INVOKE_PRIVATE" => Some(Self::INVOKE_PRIVATE),
            "INVOKE_ALL" => Some(Self::INVOKE_ALL),
            "PUBLIC_ONLY" => Some(Self::PUBLIC_ONLY),
            "ALL" => Some(Self::ALL),
            _ => {
                if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                    u8::from_str_radix(hex, 16).ok().map(Self::from_bits)
                } else {
                    s.parse::<u8>().ok().map(Self::from_bits)
                }
            }
        }
    }

    /// Parse combined flags from pipe-separated string (e.g., "LIST_DECLARED|INVOKE_PUBLIC")
    pub fn parse_combined(s: &str) -> Option<Self> {
        let mut result = Self::NONE;
        for part in s.split('|') {
            result = result.union(Self::parse(part.trim())?);
        }
        Some(result)
    }
}

impl Default for ReflectionPermission {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for ReflectionPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => f.write_str("NONE"),
            Self::LIST_DECLARED => f.write_str("LIST_DECLARED"),
            Self::INVOKE_PUBLIC => f.write_str("INVOKE_PUBLIC"),
            Self::INVOKE_PRIVATE => f.write_str("INVOKE_PRIVATE"),
            Self::INVOKE_ALL => f.write_str("INVOKE_ALL"),
            Self::PUBLIC_ONLY => f.write_str("PUBLIC_ONLY"),
            Self::ALL => f.write_str("ALL"),
            _ => write!(f, "0x{:02X}", self.0),
        }
    }
}

/// Type permission pattern (supports wildcards)
#[derive(Debug, Clone)]
pub struct TypePermissionRule {
    /// Pattern (e.g., "app::Vault", "plugins::*", "*")
    pub pattern: String,
    /// Permissions for matching types
    pub permissions: ReflectionPermission,
}

impl TypePermissionRule {
    /// Check if `pattern` is a form [`matches`](Self::matches) understands
    ///
    /// Accepted: an exact name, `*`, `**`, or `prefix::*` where the prefix
    /// itself contains no wildcard.
    pub fn is_supported_pattern(pattern: &str) -> bool {
        if pattern == "*" || pattern == "**" {
            return true;
        }
        match pattern.strip_suffix("::*") {
            Some(prefix) => !prefix.is_empty() && !prefix.contains('*'),
            None => !pattern.contains('*'),
        }
    }

    /// Check if a type name matches this pattern
    pub fn matches(&self, type_name: &str) -> bool {
        if self.pattern == "*" || self.pattern == "**" {
            return true;
        }

        if let Some(prefix) = self.pattern.strip_suffix("::*") {
            type_name
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with("::") && rest.len() > 2)
        } else {
            self.pattern == type_name
        }
    }
}

/// Access policy consulted by the registry on every reflective operation
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    /// Global default permissions
    global_default: ReflectionPermission,
    /// Exact type name -> permissions
    types: FxHashMap<String, ReflectionPermission>,
    /// Wildcard rules, checked in order
    rules: Vec<TypePermissionRule>,
}

impl AccessPolicy {
    /// Create a policy that allows everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any restriction is configured (for fast-path optimization)
    pub fn has_any_restrictions(&self) -> bool {
        self.global_default != ReflectionPermission::ALL
            || !self.types.is_empty()
            || !self.rules.is_empty()
    }

    /// Set global default permissions
    pub fn set_global(&mut self, permissions: ReflectionPermission) {
        self.global_default = permissions;
    }

    /// Get global default permissions
    pub fn global(&self) -> ReflectionPermission {
        self.global_default
    }

    /// Set permissions for an exact type name
    pub fn set_type(&mut self, type_name: &str, permissions: ReflectionPermission) {
        self.types.insert(type_name.to_string(), permissions);
    }

    /// Add a wildcard rule
    pub fn add_rule(&mut self, rule: TypePermissionRule) {
        self.rules.push(rule);
    }

    /// Resolve permissions for a type
    pub fn resolve(&self, type_name: &str) -> ReflectionPermission {
        if !self.has_any_restrictions() {
            return ReflectionPermission::ALL;
        }

        if let Some(perms) = self.types.get(type_name) {
            return *perms;
        }

        self.rules
            .iter()
            .find(|rule| rule.matches(type_name))
            .map(|rule| rule.permissions)
            .unwrap_or(self.global_default)
    }

    /// Check if a specific permission is allowed for a type
    pub fn allows(&self, type_name: &str, required: ReflectionPermission) -> bool {
        self.resolve(type_name).contains(required)
    }
}
