/*!
 * Backend Traits
 * Storage abstraction behind the permission manager
 */

use super::types::GroupTable;
use crate::core::errors::PermissionResult;
use crate::permissions::record::User;
use crate::permissions::types::Principal;
use uuid::Uuid;

/// Persistent store for groups and users
///
/// Calls are synchronous and may block. Implementations report store
/// failures as `PermissionError::Backend`.
pub trait Backend: Send + Sync {
    /// Whether the store is usable; checked once when a manager is built
    fn is_valid(&self) -> bool;

    /// Every group, keyed by lower-cased name, with parents already linked
    fn load_all_groups(&self) -> PermissionResult<GroupTable>;

    /// User record with own directives only; parents are attached by the caller
    fn load_user(&self, id: Uuid) -> PermissionResult<User>;

    /// Persisted parent names of a user in declared order
    fn load_parents(&self, id: Uuid) -> PermissionResult<Vec<String>>;

    /// Persist a newly created principal
    fn add_object(&self, principal: &dyn Principal) -> PermissionResult<()>;

    /// Release any resources held by the store
    fn shutdown(&self);
}
