/*!
 * Command Types
 * Parsed object commands and their structured outcomes
 */

use crate::permissions::types::{Directive, PermissionChange, PermissionSource};
use serde::{Deserialize, Serialize};

/// Sub command applied to one group or user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Effective value of a permission and where it came from
    Check { permission: String },
    /// Own directives, optionally a 1-based page
    List { page: Option<usize> },
    /// Set an own directive
    Add { directive: Directive },
    /// Drop every own directive for a key
    Remove { key: String },
    /// Delete the principal
    Delete,
    ParentList,
    ParentAdd { group: String },
    ParentRemove { group: String },
    /// Replace the parent list in the given order
    ParentSet { groups: Vec<String> },
}

/// One page of own directives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub number: usize,
    /// 0-based index of the first item within the full list
    pub start: usize,
    pub items: Vec<String>,
    pub total: usize,
    /// Whether more items follow this page
    pub has_more: bool,
}

/// Result of a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub permission: String,
    /// `None` when neither the record nor any ancestor defines the key
    pub value: Option<bool>,
    pub source: Option<PermissionSource>,
}

/// Structured result of an executed command, rendered by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Checked(CheckResult),
    Listed(Page),
    PermissionSet {
        directive: Directive,
        change: PermissionChange,
    },
    PermissionRemoved {
        key: String,
    },
    Parents {
        parents: Vec<String>,
    },
    ParentAdded {
        parent: String,
    },
    ParentRemoved {
        parent: String,
    },
    ParentsReplaced {
        parents: Vec<String>,
    },
}
