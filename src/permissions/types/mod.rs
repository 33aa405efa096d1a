/*!
 * Permission Types Module
 * Core types and traits for the permission graph
 */

mod core;
mod traits;

pub use self::core::{
    is_valid_key, Directive, PermissionChange, PermissionMap, PermissionSource, PrincipalKind,
};
pub use self::traits::Principal;
