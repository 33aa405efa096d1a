/*!
 * Permission Manager
 * Central entry point owning the backend, group registry and user cache
 */

use crate::backend::Backend;
use crate::core::config::ManagerConfig;
use crate::core::errors::PermissionResult;
use crate::permissions::cache::{CacheStats, UserCache};
use crate::permissions::record::{Group, User};
use crate::permissions::registry::GroupRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Central permission manager
#[derive(Clone)]
pub struct PermissionManager {
    /// Store, absent when it failed validation
    backend: Option<Arc<dyn Backend>>,
    /// Every group, loaded eagerly
    registry: Arc<GroupRegistry>,
    /// Users, loaded on demand
    users: Arc<UserCache>,
    config: ManagerConfig,
}

impl PermissionManager {
    /// Create a manager with default configuration
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_config(backend, ManagerConfig::default())
    }

    /// Create with custom configuration
    ///
    /// A backend that reports itself invalid is discarded and the manager
    /// runs without one: loads are no-ops and anything needing the store fails
    /// with `BackendUnavailable`.
    pub fn with_config(backend: Arc<dyn Backend>, config: ManagerConfig) -> Self {
        let backend = if backend.is_valid() {
            Some(backend)
        } else {
            warn!("Permission backend is invalid, running without persistence");
            None
        };

        debug!(
            idle_secs = config.user_idle_timeout.as_secs(),
            max_users = config.max_cached_users,
            "Initializing permission manager"
        );

        let registry = Arc::new(GroupRegistry::new(backend.clone()));
        let users = Arc::new(UserCache::new(
            Arc::clone(&registry),
            backend.clone(),
            config.user_idle_timeout,
            config.max_cached_users,
        ));

        Self {
            backend,
            registry,
            users,
            config,
        }
    }

    /// Load every group from the backend and drop cached users
    ///
    /// Waits for in-flight user loads, then swaps the registry table. Users
    /// are reloaded on next access against the new groups.
    pub fn load(&self) -> PermissionResult<()> {
        if self.backend.is_none() {
            debug!("No backend, skipping load");
            return Ok(());
        }

        self.users.reload(|| self.registry.load_all())?;
        Ok(())
    }

    /// Release the backend
    pub fn shutdown(&self) {
        if let Some(backend) = &self.backend {
            backend.shutdown();
        }
        info!("Permission manager shut down");
    }

    /// User by id, loaded and resolved on a cache miss
    pub fn get_user(&self, id: Uuid) -> PermissionResult<Arc<User>> {
        self.users.get_user(id)
    }

    /// Group by name, ignoring case
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.registry.get(name)
    }

    /// Group by name, created and persisted if missing
    pub fn get_or_create_group(&self, name: &str) -> PermissionResult<Arc<Group>> {
        self.registry.get_or_create(name)
    }

    /// Rebuild every group, then every cached user
    pub fn rebuild_all(&self) -> PermissionResult<()> {
        self.registry.rebuild_all()?;
        self.users.rebuild_all()
    }

    /// Whether a usable backend is attached
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Get user cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.users.stats()
    }

    /// Group registry
    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    /// User cache
    pub fn users(&self) -> &UserCache {
        &self.users
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }
}
