/*!
 * In-Memory Backend
 * Volatile store for tests, demos and seeded deployments
 */

use super::traits::Backend;
use super::types::{link_groups, GroupTable, Snapshot, StoredGroup, StoredUser};
use crate::core::errors::{PermissionError, PermissionResult};
use crate::permissions::record::User;
use crate::permissions::types::{Principal, PrincipalKind};
use ahash::RandomState;
use dashmap::DashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};
use uuid::Uuid;

/// DashMap-backed store of group and user rows
#[derive(Debug)]
pub struct MemoryBackend {
    groups: DashMap<String, StoredGroup, RandomState>,
    users: DashMap<Uuid, StoredUser, RandomState>,
    valid: bool,
    shut_down: AtomicBool,
    user_loads: AtomicU64,
}

impl MemoryBackend {
    /// Create an empty, valid store
    pub fn new() -> Self {
        Self {
            groups: DashMap::with_hasher(RandomState::new()),
            users: DashMap::with_hasher(RandomState::new()),
            valid: true,
            shut_down: AtomicBool::new(false),
            user_loads: AtomicU64::new(0),
        }
    }

    /// Store that reports itself unusable
    pub fn invalid() -> Self {
        Self {
            valid: false,
            ..Self::new()
        }
    }

    /// Seed from a JSON snapshot
    pub fn from_json(raw: &str) -> PermissionResult<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(raw).map_err(|e| PermissionError::Backend(e.to_string()))?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Seed from a JSON snapshot file
    pub fn from_path(path: impl AsRef<Path>) -> PermissionResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PermissionError::Backend(format!("{}: {}", path.display(), e)))?;
        let backend = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            groups = backend.group_count(),
            users = backend.users.len(),
            "Seeded memory backend"
        );
        Ok(backend)
    }

    /// Seed from already-parsed rows
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let backend = Self::new();
        for group in snapshot.groups {
            backend.insert_group(group);
        }
        for user in snapshot.users {
            backend.insert_user(user);
        }
        backend
    }

    /// Current rows as a snapshot, groups and users sorted for stable output
    pub fn snapshot(&self) -> Snapshot {
        let mut groups: Vec<StoredGroup> =
            self.groups.iter().map(|entry| entry.value().clone()).collect();
        groups.sort_by_key(|row| row.name.to_lowercase());

        let mut users: Vec<StoredUser> =
            self.users.iter().map(|entry| entry.value().clone()).collect();
        users.sort_by_key(|row| row.id);

        Snapshot { groups, users }
    }

    /// Insert or replace a group row
    pub fn insert_group(&self, group: StoredGroup) {
        self.groups.insert(group.name.to_lowercase(), group);
    }

    /// Insert or replace a user row
    pub fn insert_user(&self, user: StoredUser) {
        self.users.insert(user.id, user);
    }

    /// Stored group row by name, ignoring case
    pub fn group(&self, name: &str) -> Option<StoredGroup> {
        self.groups
            .get(&name.to_lowercase())
            .map(|entry| entry.value().clone())
    }

    /// Stored user row
    pub fn user(&self, id: Uuid) -> Option<StoredUser> {
        self.users.get(&id).map(|entry| entry.value().clone())
    }

    /// Number of stored groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of `load_user` calls served
    pub fn user_loads(&self) -> u64 {
        self.user_loads.load(Ordering::Relaxed)
    }

    /// Whether `shutdown` has run
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> PermissionResult<()> {
        if self.is_shut_down() {
            return Err(PermissionError::Backend("memory backend is shut down".into()));
        }
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn load_all_groups(&self) -> PermissionResult<GroupTable> {
        self.ensure_open()?;
        let rows: Vec<StoredGroup> =
            self.groups.iter().map(|entry| entry.value().clone()).collect();
        link_groups(rows)
    }

    fn load_user(&self, id: Uuid) -> PermissionResult<User> {
        self.ensure_open()?;
        self.user_loads.fetch_add(1, Ordering::Relaxed);
        self.users
            .get(&id)
            .map(|row| row.to_user())
            .ok_or(PermissionError::UserNotFound(id))
    }

    fn load_parents(&self, id: Uuid) -> PermissionResult<Vec<String>> {
        self.ensure_open()?;
        self.users
            .get(&id)
            .map(|row| row.parents.clone())
            .ok_or(PermissionError::UserNotFound(id))
    }

    fn add_object(&self, principal: &dyn Principal) -> PermissionResult<()> {
        self.ensure_open()?;
        let row = StoredGroup::from_record(principal.record());

        match (principal.kind(), principal.user_id()) {
            (PrincipalKind::User, Some(id)) => {
                self.insert_user(StoredUser {
                    id,
                    name: row.name,
                    permissions: row.permissions,
                    parents: row.parents,
                });
            }
            _ => self.insert_group(row),
        }

        debug!(kind = %principal.kind(), name = %principal.name(), "Stored object");
        Ok(())
    }

    fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::AcqRel) {
            info!("Memory backend shut down");
        }
    }
}
