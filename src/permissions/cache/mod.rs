/*!
 * User Cache
 * Idle-expiring cache of resolved users with load-on-miss
 *
 * Entries expire after a window without access, checked lazily around later
 * reads. Concurrent misses for one id share a single backend load. A reload
 * waits for in-flight loads so no user keeps edges to a replaced group.
 */

use crate::backend::Backend;
use crate::core::errors::{PermissionError, PermissionResult};
use crate::permissions::record::User;
use crate::permissions::registry::GroupRegistry;
use moka::sync::Cache;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Cache of users keyed by identity
pub struct UserCache {
    users: Cache<Uuid, Arc<User>>,
    registry: Arc<GroupRegistry>,
    backend: Option<Arc<dyn Backend>>,
    /// Shared by loads, exclusive during a reload
    loading: RwLock<()>,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
}

impl UserCache {
    /// Create a cache that expires users idle for `idle_timeout`
    pub fn new(
        registry: Arc<GroupRegistry>,
        backend: Option<Arc<dyn Backend>>,
        idle_timeout: Duration,
        max_size: u64,
    ) -> Self {
        Self {
            users: Cache::builder()
                .max_capacity(max_size)
                .time_to_idle(idle_timeout)
                .build(),
            registry,
            backend,
            loading: RwLock::new(()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            loads: AtomicU64::new(0),
        }
    }

    /// Cached user, loading it from the backend on a miss
    ///
    /// A hit returns the cached instance as is, without re-resolving.
    pub fn get_user(&self, id: Uuid) -> PermissionResult<Arc<User>> {
        if let Some(user) = self.users.get(&id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(user);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let backend = self
            .backend
            .as_ref()
            .ok_or(PermissionError::BackendUnavailable)?;

        // Held until the loaded user is inserted
        let _loading = self.loading.read();
        self.users
            .try_get_with(id, || self.load(backend.as_ref(), id))
            .map_err(|err| PermissionError::clone(&err))
    }

    /// Build a user from its backend record and persisted parent names
    fn load(&self, backend: &dyn Backend, id: Uuid) -> PermissionResult<Arc<User>> {
        self.loads.fetch_add(1, Ordering::Relaxed);

        let user = backend.load_user(id)?;
        let parent_names = backend.load_parents(id)?;

        let mut parents = Vec::with_capacity(parent_names.len());
        for name in &parent_names {
            match self.registry.get(name) {
                Some(group) => parents.push(group),
                None => warn!(user = %id, parent = %name, "Skipping unknown parent group"),
            }
        }

        user.set_parents(&parents)?;
        user.rebuild_permissions()?;

        info!(user = %id, parents = parents.len(), "Loaded user");
        Ok(Arc::new(user))
    }

    /// Drop one cached user
    pub fn invalidate(&self, id: Uuid) {
        self.users.invalidate(&id);
    }

    /// Drop every cached user
    pub fn invalidate_all(&self) {
        self.users.invalidate_all();
    }

    /// Run `swap` with no user load in flight, then drop every cached user
    pub fn reload<T>(&self, swap: impl FnOnce() -> T) -> T {
        let _loads = self.loading.write();
        let out = swap();
        self.users.invalidate_all();
        out
    }

    /// Users currently resident
    pub fn cached_users(&self) -> Vec<Arc<User>> {
        self.users.iter().map(|(_, user)| user).collect()
    }

    /// Rebuild the computed snapshot of every resident user
    pub fn rebuild_all(&self) -> PermissionResult<()> {
        for user in self.cached_users() {
            user.rebuild_permissions()?;
        }
        Ok(())
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.users.run_pending_tasks();

        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            size: self.users.entry_count(),
            hits,
            misses,
            loads: self.loads.load(Ordering::Relaxed),
            hit_rate,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub size: u64,
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub hit_rate: f64,
}
