/*!
 * Command Dispatcher
 * Applies parsed commands to a group or user through the manager
 */

use super::types::{CheckResult, Command, CommandOutcome, Page};
use crate::core::errors::{PermissionError, PermissionResult};
use crate::permissions::record::Group;
use crate::permissions::types::{Principal, PrincipalKind};
use crate::permissions::PermissionManager;
use std::sync::Arc;
use tracing::{debug, info};

/// Executes object commands against principals owned by one manager
#[derive(Clone)]
pub struct Dispatcher {
    manager: PermissionManager,
    per_page: Option<usize>,
}

impl Dispatcher {
    /// Dispatcher paging listings by the manager's configured page size
    pub fn new(manager: PermissionManager) -> Self {
        let per_page = manager.config().page_size;
        Self { manager, per_page }
    }

    /// Override the listing page size, `None` lists everything on one page
    pub fn with_page_size(mut self, per_page: Option<usize>) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn manager(&self) -> &PermissionManager {
        &self.manager
    }

    /// Parse `args` and execute the result against `target`
    pub fn run(&self, target: &dyn Principal, args: &[&str]) -> PermissionResult<CommandOutcome> {
        let command = Command::parse(args)?;
        self.execute(target, command)
    }

    /// Execute one command
    ///
    /// Mutations rebuild the target before returning. A changed group also
    /// rebuilds every other group and cached user, since any of them may
    /// inherit from it.
    pub fn execute(
        &self,
        target: &dyn Principal,
        command: Command,
    ) -> PermissionResult<CommandOutcome> {
        debug!(kind = %target.kind(), target = %target.name(), ?command, "Executing command");
        let record = target.record();

        let outcome = match command {
            Command::Check { permission } => {
                let resolved = record.effective_permission(&permission);
                return Ok(CommandOutcome::Checked(CheckResult {
                    permission,
                    value: resolved.map(|(value, _)| value),
                    source: resolved.map(|(_, source)| source),
                }));
            }
            Command::List { page } => {
                let items = record.raw_permissions();
                return paginate(items, page.unwrap_or(1), self.per_page).map(CommandOutcome::Listed);
            }
            Command::ParentList => {
                return Ok(CommandOutcome::Parents {
                    parents: parent_names(record.parents()),
                });
            }
            Command::Delete => {
                return Err(PermissionError::Unsupported(format!(
                    "Deleting a {}",
                    target.kind()
                )));
            }
            Command::Add { directive } => {
                let change = record.set_local_permission(directive.key(), directive.value())?;
                CommandOutcome::PermissionSet { directive, change }
            }
            Command::Remove { key } => {
                record.unset_local_permission(&key)?;
                CommandOutcome::PermissionRemoved { key }
            }
            Command::ParentAdd { group } => {
                let parent = self.group(&group)?;
                record.add_parent(&parent)?;
                CommandOutcome::ParentAdded {
                    parent: parent.name().to_string(),
                }
            }
            Command::ParentRemove { group } => {
                let parent = self.group(&group)?;
                record.remove_parent(&parent)?;
                CommandOutcome::ParentRemoved {
                    parent: parent.name().to_string(),
                }
            }
            Command::ParentSet { groups } => {
                let parents = groups
                    .iter()
                    .map(|name| self.group(name))
                    .collect::<PermissionResult<Vec<_>>>()?;
                record.set_parents(&parents)?;
                CommandOutcome::ParentsReplaced {
                    parents: parent_names(record.parents()),
                }
            }
        };

        self.rebuild_after_change(target)?;
        info!(kind = %target.kind(), target = %target.name(), "Applied permission change");
        Ok(outcome)
    }

    fn group(&self, name: &str) -> PermissionResult<Arc<Group>> {
        self.manager
            .get_group(name)
            .ok_or_else(|| PermissionError::UnknownGroup(name.to_string()))
    }

    fn rebuild_after_change(&self, target: &dyn Principal) -> PermissionResult<()> {
        match target.kind() {
            PrincipalKind::Group => self.manager.rebuild_all(),
            PrincipalKind::User => target.record().rebuild_permissions(),
        }
    }
}

fn parent_names(parents: Vec<Arc<Group>>) -> Vec<String> {
    parents
        .iter()
        .map(|parent| parent.name().to_string())
        .collect()
}

/// Slice `items` into 1-based pages of `per_page`
///
/// The first page always succeeds, even when empty.
pub fn paginate(items: Vec<String>, page: usize, per_page: Option<usize>) -> PermissionResult<Page> {
    if page == 0 {
        return Err(PermissionError::InvalidPage);
    }

    let per_page = per_page.filter(|n| *n > 0).unwrap_or(usize::MAX);
    let total = items.len();
    let start = (page - 1).saturating_mul(per_page);
    if start >= total && start != 0 {
        return Err(PermissionError::PageOutOfRange(page));
    }

    let end = start.saturating_add(per_page).min(total);
    Ok(Page {
        number: page,
        start,
        items: items[start..end].to_vec(),
        total,
        has_more: total > end,
    })
}
