/*!
 * Permission Records
 * Groups and users holding own directives and ordered parent references
 *
 * Parent edges are weak: a group is never kept alive only because another
 * record inherits from it. Every parent mutation runs under a single topology
 * lock so the acyclicity check and the commit cannot interleave with another
 * edge change. Record locks are only ever held one at a time.
 */

use crate::core::errors::{PermissionError, PermissionResult};
use crate::permissions::resolve;
use crate::permissions::types::{
    is_valid_key, Directive, PermissionChange, PermissionMap, PermissionSource, Principal,
    PrincipalKind,
};
use parking_lot::{const_mutex, Mutex, RwLock};
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};
use tracing::error;
use uuid::Uuid;

/// Serializes parent-edge mutation across all records
static TOPOLOGY: Mutex<()> = const_mutex(());

#[derive(Default)]
struct RecordState {
    own: Vec<Directive>,
    parents: Vec<Weak<Group>>,
    computed: PermissionMap,
    dirty: bool,
    generation: u64,
}

impl RecordState {
    fn touch(&mut self) {
        self.dirty = true;
        self.generation = self.generation.wrapping_add(1);
    }

    fn live_parents(&self) -> Vec<Arc<Group>> {
        self.parents.iter().filter_map(Weak::upgrade).collect()
    }
}

/// Named principal with own directives, parents and a computed snapshot
pub struct PermissionRecord {
    name: String,
    key: String,
    state: RwLock<RecordState>,
}

impl PermissionRecord {
    /// Create a record with raw directives and no parents
    ///
    /// The computed snapshot starts dirty; call [`rebuild_permissions`](Self::rebuild_permissions)
    /// or rely on [`get_permission`](Self::get_permission) rebuilding lazily.
    pub fn new(name: impl Into<String>, permissions: Vec<Directive>) -> Self {
        let name = name.into();
        Self {
            key: name.to_lowercase(),
            name,
            state: RwLock::new(RecordState {
                own: permissions,
                dirty: true,
                ..RecordState::default()
            }),
        }
    }

    /// Display name with original casing
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased lookup key
    pub fn key(&self) -> &str {
        &self.key
    }

    // ------------------------------------------------------------------
    // Own directives
    // ------------------------------------------------------------------

    /// Own directives in storage order
    pub fn directives(&self) -> Vec<Directive> {
        self.state.read().own.clone()
    }

    /// Own directives in textual form, storage order
    pub fn raw_permissions(&self) -> Vec<String> {
        self.state.read().own.iter().map(Directive::to_string).collect()
    }

    /// Insert or overwrite the directive for `key`
    ///
    /// An existing directive is updated in place and any later duplicates of
    /// the same key are dropped, so repeated calls never grow the list.
    pub fn set_local_permission(&self, key: &str, value: bool) -> PermissionResult<PermissionChange> {
        if !is_valid_key(key) {
            return Err(PermissionError::InvalidDirective(key.to_string()));
        }

        let mut state = self.state.write();
        let previous = state
            .own
            .iter()
            .rev()
            .find(|d| d.key() == key)
            .map(Directive::value);

        let change = match previous {
            None => {
                state.own.push(Directive::new(key, value));
                PermissionChange::Added
            }
            Some(previous) => {
                let mut seen = false;
                state.own.retain_mut(|d| {
                    if d.key() != key {
                        return true;
                    }
                    if seen {
                        return false;
                    }
                    seen = true;
                    d.set_value(value);
                    true
                });
                if previous == value {
                    PermissionChange::Unchanged
                } else {
                    PermissionChange::Updated
                }
            }
        };

        state.touch();
        Ok(change)
    }

    /// Remove every directive for `key` so resolution falls through to parents
    pub fn unset_local_permission(&self, key: &str) -> PermissionResult<()> {
        let mut state = self.state.write();
        let before = state.own.len();
        state.own.retain(|d| d.key() != key);

        if state.own.len() == before {
            return Err(PermissionError::NotPresent {
                record: self.name.clone(),
                item: key.to_string(),
            });
        }

        state.touch();
        Ok(())
    }

    /// Own directive for `key`, never consulting parents
    pub fn get_local_permission(&self, key: &str) -> Option<bool> {
        self.state
            .read()
            .own
            .iter()
            .rev()
            .find(|d| d.key() == key)
            .map(Directive::value)
    }

    /// Effective value for `key`: own directive first, then inherited
    pub fn get_permission(&self, key: &str) -> Option<bool> {
        self.effective_permission(key).map(|(value, _)| value)
    }

    /// Effective value for `key` along with where it came from
    ///
    /// Rebuilds the computed snapshot first if this record was mutated since
    /// the last rebuild.
    pub fn effective_permission(&self, key: &str) -> Option<(bool, PermissionSource)> {
        if let Some(value) = self.get_local_permission(key) {
            return Some((value, PermissionSource::Local));
        }

        if self.is_dirty() {
            if let Err(e) = self.rebuild_permissions() {
                error!(record = %self.name, error = %e, "Failed to rebuild permissions");
            }
        }

        self.state
            .read()
            .computed
            .get(key)
            .map(|value| (*value, PermissionSource::Inherited))
    }

    // ------------------------------------------------------------------
    // Parents
    // ------------------------------------------------------------------

    /// Live direct parents in declared order
    pub fn parents(&self) -> Vec<Arc<Group>> {
        self.state.read().live_parents()
    }

    /// Whether `group` is a direct parent
    pub fn is_direct_parent(&self, group: &Group) -> bool {
        self.parents()
            .iter()
            .any(|parent| std::ptr::eq(parent.as_ref(), group))
    }

    /// Whether `group` is reachable through the parent relation
    pub fn has_parent(&self, group: &Group) -> bool {
        resolve::closure(self)
            .iter()
            .any(|ancestor| std::ptr::eq(ancestor.as_ref(), group))
    }

    /// Append `group` to the parent list
    ///
    /// Fails with `AlreadyPresent` if this record already inherits from it,
    /// directly or through another parent, and with `CycleWouldForm` if the
    /// edge would make this record its own ancestor.
    pub fn add_parent(&self, group: &Arc<Group>) -> PermissionResult<()> {
        let _topology = TOPOLOGY.lock();

        if self.has_parent(group) {
            return Err(PermissionError::AlreadyPresent {
                record: self.name.clone(),
                parent: group.name().to_string(),
            });
        }
        self.check_acyclic(group)?;

        let mut state = self.state.write();
        state.parents.retain(|parent| parent.strong_count() > 0);
        state.parents.push(Arc::downgrade(group));
        state.touch();
        Ok(())
    }

    /// Drop `group` from the direct parents
    pub fn remove_parent(&self, group: &Group) -> PermissionResult<()> {
        let _topology = TOPOLOGY.lock();

        let mut state = self.state.write();
        let position = state.parents.iter().position(|parent| {
            parent
                .upgrade()
                .is_some_and(|parent| std::ptr::eq(parent.as_ref(), group))
        });

        match position {
            Some(index) => {
                state.parents.remove(index);
                state.parents.retain(|parent| parent.strong_count() > 0);
                state.touch();
                Ok(())
            }
            None => Err(PermissionError::NotPresent {
                record: self.name.clone(),
                item: group.name().to_string(),
            }),
        }
    }

    /// Replace the whole parent list
    ///
    /// Every new parent is cycle-checked before anything is committed, so a
    /// rejected call leaves the previous list untouched. Repeated entries keep
    /// their first position.
    pub fn set_parents(&self, groups: &[Arc<Group>]) -> PermissionResult<()> {
        let _topology = TOPOLOGY.lock();

        let mut unique: Vec<&Arc<Group>> = Vec::with_capacity(groups.len());
        for group in groups {
            if !unique.iter().any(|kept| Arc::ptr_eq(kept, group)) {
                unique.push(group);
            }
        }

        for group in &unique {
            self.check_acyclic(group)?;
        }

        let mut state = self.state.write();
        state.parents = unique.into_iter().map(Arc::downgrade).collect();
        state.touch();
        Ok(())
    }

    /// Reject `group` if this record is the group itself or one of its ancestors
    fn check_acyclic(&self, group: &Group) -> PermissionResult<()> {
        let reaches_self = std::ptr::eq(group.record(), self)
            || resolve::closure(group.record())
                .iter()
                .any(|ancestor| std::ptr::eq(ancestor.record(), self));

        if reaches_self {
            return Err(PermissionError::CycleWouldForm {
                record: self.name.clone(),
                parent: group.name().to_string(),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Computed snapshot
    // ------------------------------------------------------------------

    /// Recompute the effective permission snapshot
    pub fn rebuild_permissions(&self) -> PermissionResult<()> {
        let generation = self.state.read().generation;
        let computed = resolve::resolve(self)?;

        let mut state = self.state.write();
        state.computed = computed;
        // A mutation that raced the resolve keeps the record dirty
        state.dirty = state.generation != generation;
        Ok(())
    }

    /// Copy of the last computed snapshot
    pub fn computed_permissions(&self) -> PermissionMap {
        self.state.read().computed.clone()
    }

    /// Whether a mutation happened since the last rebuild
    pub fn is_dirty(&self) -> bool {
        self.state.read().dirty
    }

    /// Own directives and live parents, taken under one read lock
    pub(crate) fn snapshot(&self) -> (Vec<Directive>, Vec<Arc<Group>>) {
        let state = self.state.read();
        (state.own.clone(), state.live_parents())
    }
}

impl fmt::Debug for PermissionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        let parents: Vec<String> = state
            .live_parents()
            .iter()
            .map(|parent| parent.name().to_string())
            .collect();
        f.debug_struct("PermissionRecord")
            .field("name", &self.name)
            .field("own", &state.own)
            .field("parents", &parents)
            .field("dirty", &state.dirty)
            .finish()
    }
}

/// Globally registered, persistent principal
#[derive(Debug)]
pub struct Group {
    record: PermissionRecord,
}

impl Group {
    /// Create a group with raw directives and no parents
    pub fn new(name: impl Into<String>, permissions: Vec<Directive>) -> Self {
        Self {
            record: PermissionRecord::new(name, permissions),
        }
    }
}

impl Deref for Group {
    type Target = PermissionRecord;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

impl Principal for Group {
    fn record(&self) -> &PermissionRecord {
        &self.record
    }

    fn kind(&self) -> PrincipalKind {
        PrincipalKind::Group
    }
}

/// Principal identified by a stable id, living only in the user cache
#[derive(Debug)]
pub struct User {
    id: Uuid,
    record: PermissionRecord,
}

impl User {
    /// Create a user with raw directives and no parents
    pub fn new(id: Uuid, name: impl Into<String>, permissions: Vec<Directive>) -> Self {
        Self {
            id,
            record: PermissionRecord::new(name, permissions),
        }
    }

    /// Stable identity
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Deref for User {
    type Target = PermissionRecord;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

impl Principal for User {
    fn record(&self) -> &PermissionRecord {
        &self.record
    }

    fn kind(&self) -> PrincipalKind {
        PrincipalKind::User
    }

    fn user_id(&self) -> Option<Uuid> {
        Some(self.id)
    }
}
