/*!
 * Permission Types
 * Directives, change outcomes and resolved permission maps
 */

use crate::core::errors::PermissionError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flattened effective permissions, key to granted/denied
pub type PermissionMap = AHashMap<String, bool>;

/// Prefix marking a denying directive
const DENY_PREFIX: char = '-';

/// Whether `key` can be stored without its textual form becoming ambiguous
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.starts_with(DENY_PREFIX) && !key.chars().any(char::is_whitespace)
}

/// Explicit permission assignment on a single record
///
/// Textual form is `"<key>"` for a grant and `"-<key>"` for a deny.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Directive {
    key: String,
    value: bool,
}

impl Directive {
    /// Create a directive for `key`
    pub fn new(key: impl Into<String>, value: bool) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Granting directive
    pub fn grant(key: impl Into<String>) -> Self {
        Self::new(key, true)
    }

    /// Denying directive
    pub fn deny(key: impl Into<String>) -> Self {
        Self::new(key, false)
    }

    /// Permission key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the directive grants (`true`) or denies (`false`)
    pub fn value(&self) -> bool {
        self.value
    }

    pub(crate) fn set_value(&mut self, value: bool) {
        self.value = value;
    }
}

impl FromStr for Directive {
    type Err = PermissionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (key, value) = match raw.strip_prefix(DENY_PREFIX) {
            Some(rest) => (rest, false),
            None => (raw, true),
        };

        if !is_valid_key(key) {
            return Err(PermissionError::InvalidDirective(raw.to_string()));
        }

        Ok(Self::new(key, value))
    }
}

impl TryFrom<String> for Directive {
    type Error = PermissionError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Directive> for String {
    fn from(directive: Directive) -> Self {
        directive.to_string()
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value {
            f.write_str(&self.key)
        } else {
            write!(f, "{}{}", DENY_PREFIX, self.key)
        }
    }
}

/// Outcome of setting a local permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionChange {
    /// Key was not set before
    Added,
    /// Key was set with the opposite value
    Updated,
    /// Key already had this value
    Unchanged,
}

/// Where an effective permission value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSource {
    /// Own directive on the record
    Local,
    /// Resolved through the parent graph
    Inherited,
}

/// Principal variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    Group,
    User,
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalKind::Group => f.write_str("group"),
            PrincipalKind::User => f.write_str("user"),
        }
    }
}
