/*!
 * Object Commands
 * Text front end for inspecting and editing groups and users
 *
 * Commands are parsed into [`Command`] values and executed by a
 * [`Dispatcher`], which returns structured [`CommandOutcome`] data. Turning
 * outcomes into text is left to the caller.
 */

mod dispatcher;
mod parser;
mod types;

pub use dispatcher::{paginate, Dispatcher};
pub use types::{CheckResult, Command, CommandOutcome, Page};
