/*!
 * Perms Core Library
 * Hierarchical group and user permissions exposed as a library
 */

pub mod backend;
pub mod commands;
pub mod core;
pub mod monitoring;
pub mod permissions;

// Re-exports
pub use backend::{Backend, MemoryBackend, Snapshot, StoredGroup, StoredUser};
pub use commands::{Command, CommandOutcome, Dispatcher};
pub use self::core::{ManagerConfig, PermissionError, PermissionResult};
pub use monitoring::{init_tracing, CommandSpan};
pub use permissions::{
    CacheStats, Directive, Group, GroupRegistry, PermissionManager, PermissionRecord, Principal,
    PrincipalKind, User,
};
