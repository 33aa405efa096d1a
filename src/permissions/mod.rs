/*!
 * Permissions Module
 * Hierarchical permission resolution for groups and users
 *
 * Every principal carries its own directives and an ordered list of parent
 * groups. Effective permissions are the principal's own directives overlaid on
 * whatever its ancestors grant or deny, walked depth-first in parent order.
 *
 * ## Features
 * - Local override and first-parent-wins inheritance
 * - Diamond-safe resolution, each ancestor merged once
 * - Parent mutation that can never form a cycle
 * - Case-insensitive group registry persisted through a backend
 * - Idle-expiring user cache with single-flight loading
 *
 * ## Usage
 * ```ignore
 * use perms_core::backend::MemoryBackend;
 * use perms_core::permissions::PermissionManager;
 *
 * let manager = PermissionManager::new(Arc::new(MemoryBackend::new()));
 * manager.load()?;
 *
 * let admin = manager.get_or_create_group("Admin")?;
 * admin.set_local_permission("server.stop", true)?;
 * admin.rebuild_permissions()?;
 * ```
 */

pub mod cache;
pub mod manager;
pub mod record;
pub mod registry;
pub mod resolve;
pub mod types;

// Re-export commonly used items
pub use cache::{CacheStats, UserCache};
pub use manager::PermissionManager;
pub use record::{Group, PermissionRecord, User};
pub use registry::GroupRegistry;
pub use resolve::{closure, resolve, Resolution};
pub use types::{
    is_valid_key, Directive, PermissionChange, PermissionMap, PermissionSource, Principal,
    PrincipalKind,
};
