/*!
 * Group Registry
 * In-memory table of every group, the source of truth once loaded
 */

use crate::backend::{Backend, GroupTable};
use crate::core::errors::{PermissionError, PermissionResult};
use crate::permissions::record::Group;
use crate::permissions::types::Principal;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Case-insensitive table of groups keyed by lower-cased name
pub struct GroupRegistry {
    groups: RwLock<GroupTable>,
    backend: Option<Arc<dyn Backend>>,
}

impl GroupRegistry {
    /// Create an empty registry persisting through `backend`
    pub fn new(backend: Option<Arc<dyn Backend>>) -> Self {
        Self {
            groups: RwLock::new(AHashMap::new()),
            backend,
        }
    }

    /// Replace the registry contents with every group the backend holds
    ///
    /// Each group is rebuilt before the new table becomes visible. Returns
    /// the number of groups loaded; without a backend this is a no-op.
    pub fn load_all(&self) -> PermissionResult<usize> {
        let Some(backend) = &self.backend else {
            debug!("No backend, skipping group load");
            return Ok(0);
        };

        let loaded = backend.load_all_groups()?;
        let mut table = GroupTable::with_capacity(loaded.len());
        for group in loaded.into_values() {
            group.rebuild_permissions()?;
            table.insert(group.key().to_string(), group);
        }

        let count = table.len();
        *self.groups.write() = table;

        info!(groups = count, "Loaded permission groups");
        Ok(count)
    }

    /// Look up a group by name, ignoring case
    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(&name.to_lowercase()).cloned()
    }

    /// Return the named group, creating and persisting an empty one if needed
    ///
    /// Creation happens under the registry write lock, so concurrent calls for
    /// the same name yield one group and one backend write. A failed write
    /// leaves the registry unchanged.
    pub fn get_or_create(&self, name: &str) -> PermissionResult<Arc<Group>> {
        let key = name.to_lowercase();
        if let Some(group) = self.groups.read().get(&key) {
            return Ok(Arc::clone(group));
        }

        let backend = self
            .backend
            .as_ref()
            .ok_or(PermissionError::BackendUnavailable)?;

        let mut groups = self.groups.write();
        if let Some(group) = groups.get(&key) {
            return Ok(Arc::clone(group));
        }

        let group = Arc::new(Group::new(name, Vec::new()));
        group.rebuild_permissions()?;
        backend.add_object(&*group)?;
        groups.insert(key, Arc::clone(&group));

        info!(group = %group.name(), "Created permission group");
        Ok(group)
    }

    /// Every registered group
    pub fn groups(&self) -> Vec<Arc<Group>> {
        self.groups.read().values().cloned().collect()
    }

    /// Display names of every group, sorted case-insensitively
    pub fn names(&self) -> Vec<String> {
        let groups = self.groups.read();
        let mut keys: Vec<&String> = groups.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| groups[key].name().to_string())
            .collect()
    }

    /// Rebuild the computed snapshot of every group
    pub fn rebuild_all(&self) -> PermissionResult<()> {
        for group in self.groups() {
            group.rebuild_permissions()?;
        }
        Ok(())
    }

    /// Number of registered groups
    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    /// Whether no groups are registered
    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}
