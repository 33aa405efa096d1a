/*!
 * Backend Types
 * Persisted rows and the loaded group table
 */

use crate::core::errors::PermissionResult;
use crate::permissions::record::{Group, PermissionRecord, User};
use crate::permissions::types::{Directive, Principal};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Groups keyed by lower-cased name
pub type GroupTable = AHashMap<String, Arc<Group>>;

/// Persisted group row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredGroup {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Directive>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl StoredGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: Vec::new(),
            parents: Vec::new(),
        }
    }

    pub fn grant(mut self, key: &str) -> Self {
        self.permissions.push(Directive::grant(key));
        self
    }

    pub fn deny(mut self, key: &str) -> Self {
        self.permissions.push(Directive::deny(key));
        self
    }

    pub fn parent(mut self, name: &str) -> Self {
        self.parents.push(name.to_string());
        self
    }

    /// Row for an existing record, parents taken from its live edges
    pub fn from_record(record: &PermissionRecord) -> Self {
        Self {
            name: record.name().to_string(),
            permissions: record.directives(),
            parents: record
                .parents()
                .iter()
                .map(|parent| parent.name().to_string())
                .collect(),
        }
    }
}

/// Persisted user row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Directive>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl StoredUser {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            permissions: Vec::new(),
            parents: Vec::new(),
        }
    }

    pub fn grant(mut self, key: &str) -> Self {
        self.permissions.push(Directive::grant(key));
        self
    }

    pub fn deny(mut self, key: &str) -> Self {
        self.permissions.push(Directive::deny(key));
        self
    }

    pub fn parent(mut self, name: &str) -> Self {
        self.parents.push(name.to_string());
        self
    }

    /// Unlinked user record
    pub fn to_user(&self) -> User {
        User::new(self.id, self.name.clone(), self.permissions.clone())
    }
}

/// Serialized seed: every group and user row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub groups: Vec<StoredGroup>,
    #[serde(default)]
    pub users: Vec<StoredUser>,
}

/// Build groups from rows and link their parent edges
///
/// Rows are processed in name order so the outcome does not depend on
/// storage order. Unknown parent names and edges that would close a cycle
/// are skipped with a warning.
pub fn link_groups(mut rows: Vec<StoredGroup>) -> PermissionResult<GroupTable> {
    rows.sort_by_key(|row| row.name.to_lowercase());

    let mut table = GroupTable::with_capacity(rows.len());
    for row in &rows {
        let group = Arc::new(Group::new(row.name.clone(), row.permissions.clone()));
        table.insert(group.key().to_string(), group);
    }

    for row in &rows {
        let Some(group) = table.get(&row.name.to_lowercase()) else {
            continue;
        };
        // Stored edges may repeat an indirect ancestor, so only cycles are rejected
        let mut linked: Vec<Arc<Group>> = Vec::with_capacity(row.parents.len());
        for parent_name in &row.parents {
            let Some(parent) = table.get(&parent_name.to_lowercase()) else {
                warn!(group = %row.name, parent = %parent_name, "Skipping unknown parent group");
                continue;
            };
            linked.push(Arc::clone(parent));
            if let Err(e) = group.set_parents(&linked) {
                warn!(group = %row.name, parent = %parent_name, error = %e, "Skipping parent edge");
                linked.pop();
            }
        }
    }

    Ok(table)
}
