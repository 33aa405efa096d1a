/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Result type for permission operations
pub type PermissionResult<T> = Result<T, PermissionError>;

/// Permission graph, cache and backend errors
///
/// Every variant except `CycleDetected` is caller-recoverable: the operation
/// that produced it left all state unchanged.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum PermissionError {
    #[error("Unknown group {0}")]
    #[diagnostic(
        code(permissions::unknown_group),
        help("Create the group first or check the spelling of its name.")
    )]
    UnknownGroup(String),

    #[error("Making {parent} a parent of {record} would create a cycle")]
    #[diagnostic(
        code(permissions::cycle_would_form),
        help("The parent already inherits from this record. Remove that edge first.")
    )]
    CycleWouldForm { record: String, parent: String },

    #[error("{record} already inherits from {parent}")]
    #[diagnostic(code(permissions::already_present))]
    AlreadyPresent { record: String, parent: String },

    #[error("{item} is not set on {record}")]
    #[diagnostic(code(permissions::not_present))]
    NotPresent { record: String, item: String },

    #[error("Invalid permission directive {0:?}")]
    #[diagnostic(
        code(permissions::invalid_directive),
        help("Use \"<key>\" to grant or \"-<key>\" to deny.")
    )]
    InvalidDirective(String),

    #[error("Inheritance cycle detected at {0}")]
    #[diagnostic(
        code(permissions::cycle_detected),
        help("The parent graph must stay acyclic. This indicates corrupted parent data.")
    )]
    CycleDetected(String),

    #[error("No permission backend is available")]
    #[diagnostic(
        code(backend::unavailable),
        help("The backend failed to initialise. Check its configuration and restart.")
    )]
    BackendUnavailable,

    #[error("User {0} not found")]
    #[diagnostic(code(backend::user_not_found))]
    UserNotFound(Uuid),

    #[error("Backend failure: {0}")]
    #[diagnostic(code(backend::failure), help("View logs for details."))]
    Backend(String),

    #[error("Page number must be 1 or higher")]
    #[diagnostic(code(commands::invalid_page))]
    InvalidPage,

    #[error("Page number {0} is too high")]
    #[diagnostic(code(commands::page_out_of_range))]
    PageOutOfRange(usize),

    #[error("Usage: {0}")]
    #[diagnostic(code(commands::usage))]
    Usage(String),

    #[error("Unknown sub command {0}")]
    #[diagnostic(code(commands::unknown_command))]
    UnknownCommand(String),

    #[error("{0} is not supported")]
    #[diagnostic(code(commands::unsupported))]
    Unsupported(String),
}

impl PermissionError {
    /// Whether the error came from the parent graph invariants
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            PermissionError::CycleWouldForm { .. } | PermissionError::CycleDetected(_)
        )
    }
}
