/*!
 * Permission Traits
 * Interfaces shared by every principal
 */

use super::core::PrincipalKind;
use crate::permissions::record::PermissionRecord;
use uuid::Uuid;

/// A group or user subject to permission resolution
pub trait Principal: Send + Sync {
    /// Underlying record holding directives and parents
    fn record(&self) -> &PermissionRecord;

    /// Principal variant
    fn kind(&self) -> PrincipalKind;

    /// Stable identity, only users carry one
    fn user_id(&self) -> Option<Uuid> {
        None
    }

    /// Display name with original casing
    fn name(&self) -> &str {
        self.record().name()
    }
}
