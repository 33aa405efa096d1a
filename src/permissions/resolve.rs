/*!
 * Resolution Engine
 * Flattens own and inherited directives into effective permissions
 *
 * Precedence:
 * - own directives beat anything inherited, last directive per key wins
 * - parents are walked depth-first in declared order, first definition wins
 * - each ancestor is merged at most once per walk (diamond inheritance)
 *
 * Parents are resolved from their raw directives rather than their computed
 * snapshots, so the result never depends on the order groups were rebuilt in.
 */

use crate::core::errors::{PermissionError, PermissionResult};
use crate::permissions::record::{Group, PermissionRecord};
use crate::permissions::types::{Directive, PermissionMap, Principal};
use ahash::AHashSet;
use std::sync::Arc;
use tracing::error;

type RecordId = *const PermissionRecord;

fn id_of(record: &PermissionRecord) -> RecordId {
    record as RecordId
}

/// Outcome of a full walk over a record's ancestors
#[derive(Debug, Default)]
pub struct Resolution {
    /// Effective permissions
    pub permissions: PermissionMap,
    /// Distinct ancestors in visit order
    pub ancestors: Vec<Arc<Group>>,
    /// First ancestor found on its own inheritance path, if any
    pub cycle: Option<String>,
}

#[derive(Default)]
struct Walk {
    resolution: Resolution,
    visited: AHashSet<RecordId>,
    path: AHashSet<RecordId>,
}

impl Walk {
    /// Merge one record's own directives; keys already resolved are kept
    fn merge(&mut self, own: &[Directive]) {
        // Reverse so the last raw directive for a key is the one that lands
        for directive in own.iter().rev() {
            if !self.resolution.permissions.contains_key(directive.key()) {
                self.resolution
                    .permissions
                    .insert(directive.key().to_string(), directive.value());
            }
        }
    }

    fn visit_parents(&mut self, parents: Vec<Arc<Group>>) {
        for parent in parents {
            let id = id_of(parent.record());

            if self.path.contains(&id) {
                if self.resolution.cycle.is_none() {
                    self.resolution.cycle = Some(parent.name().to_string());
                }
                continue;
            }
            if !self.visited.insert(id) {
                continue;
            }

            let (own, grandparents) = parent.snapshot();
            self.merge(&own);
            self.resolution.ancestors.push(parent);

            self.path.insert(id);
            self.visit_parents(grandparents);
            self.path.remove(&id);
        }
    }
}

/// Walk `record` and every ancestor once
pub fn walk(record: &PermissionRecord) -> Resolution {
    let mut walk = Walk::default();
    let root = id_of(record);
    walk.visited.insert(root);
    walk.path.insert(root);

    let (own, parents) = record.snapshot();
    walk.merge(&own);
    walk.visit_parents(parents);

    walk.resolution
}

/// Effective permissions of `record`
///
/// Fails with `CycleDetected` if the parent graph is cyclic, which the
/// mutation layer never allows.
pub fn resolve(record: &PermissionRecord) -> PermissionResult<PermissionMap> {
    let resolution = walk(record);
    match resolution.cycle {
        Some(at) => {
            error!(record = %record.name(), at = %at, "Inheritance cycle detected");
            Err(PermissionError::CycleDetected(at))
        }
        None => Ok(resolution.permissions),
    }
}

/// Distinct ancestors of `record` in visit order
pub fn closure(record: &PermissionRecord) -> Vec<Arc<Group>> {
    walk(record).ancestors
}
