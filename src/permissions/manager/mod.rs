/*!
 * Permission Manager Module
 */

#[allow(clippy::module_inception)]
mod manager;

pub use manager::PermissionManager;
