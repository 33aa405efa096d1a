/*!
 * Manager Configuration
 *
 * Cache lifetimes, listing page size and backend seeding.
 */

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Idle window after which a cached user becomes evictable
pub const DEFAULT_USER_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Upper bound on resident cached users
pub const DEFAULT_MAX_CACHED_USERS: u64 = 10_000;

/// Directives shown per page when listing
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Configuration for [`PermissionManager`](crate::permissions::PermissionManager)
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Time since last access before a cached user expires (default: 5 min)
    pub user_idle_timeout: Duration,

    /// Maximum number of cached users (default: 10K)
    pub max_cached_users: u64,

    /// Page size for permission listings, `None` for unbounded (default: 15)
    pub page_size: Option<usize>,

    /// JSON snapshot used to seed the in-memory backend
    pub seed_path: Option<PathBuf>,
}

impl ManagerConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            user_idle_timeout: DEFAULT_USER_IDLE_TIMEOUT,
            max_cached_users: DEFAULT_MAX_CACHED_USERS,
            page_size: Some(DEFAULT_PAGE_SIZE),
            seed_path: None,
        }
    }

    /// Build configuration from environment variables
    ///
    /// Environment variables:
    /// - PERMS_USER_IDLE_SECS: cached user idle timeout in seconds
    /// - PERMS_MAX_CACHED_USERS: cache capacity
    /// - PERMS_PAGE_SIZE: listing page size, 0 for unbounded
    /// - PERMS_SEED_PATH: JSON snapshot for the memory backend
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Some(secs) = env_parse::<u64>("PERMS_USER_IDLE_SECS") {
            config.user_idle_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = env_parse::<u64>("PERMS_MAX_CACHED_USERS") {
            config.max_cached_users = max;
        }
        if let Some(size) = env_parse::<usize>("PERMS_PAGE_SIZE") {
            config.page_size = (size > 0).then_some(size);
        }
        if let Ok(path) = std::env::var("PERMS_SEED_PATH") {
            config.seed_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Set the cached user idle timeout
    pub fn with_user_idle_timeout(mut self, timeout: Duration) -> Self {
        self.user_idle_timeout = timeout;
        self
    }

    /// Set the cache capacity
    pub fn with_max_cached_users(mut self, max: u64) -> Self {
        self.max_cached_users = max;
        self
    }

    /// Set the listing page size
    pub fn with_page_size(mut self, page_size: Option<usize>) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the backend seed file
    pub fn with_seed_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_path = Some(path.into());
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring malformed configuration value");
            None
        }
    }
}
