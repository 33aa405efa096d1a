/*!
 * Command Parser
 * Whitespace-split arguments to typed commands
 */

use super::types::Command;
use crate::core::errors::{PermissionError, PermissionResult};
use crate::permissions::types::Directive;

const DENY_PREFIX: char = '-';

fn usage(text: &str) -> PermissionError {
    PermissionError::Usage(text.to_string())
}

impl Command {
    /// Parse the arguments following the target name
    ///
    /// Sub command names are case-insensitive. `group` and `parent` are
    /// interchangeable and the one used is echoed in usage errors.
    pub fn parse(args: &[&str]) -> PermissionResult<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Err(usage("<command> [<params>...]"));
        };

        match name.to_lowercase().as_str() {
            "check" => match rest {
                [permission] => Ok(Command::Check {
                    permission: permission.to_string(),
                }),
                _ => Err(usage("check <permission>")),
            },
            "delete" => match rest {
                [] => Ok(Command::Delete),
                _ => Err(usage("delete")),
            },
            "list" => match rest {
                [] => Ok(Command::List { page: None }),
                [page] => parse_page(page).map(|page| Command::List { page: Some(page) }),
                _ => Err(usage("list [<page>]")),
            },
            "add" => match rest {
                [raw] => Ok(Command::Add {
                    directive: raw.parse::<Directive>()?,
                }),
                _ => Err(usage("add <permission>")),
            },
            "remove" => match rest {
                [raw] => {
                    let key = raw.strip_prefix(DENY_PREFIX).unwrap_or(*raw);
                    Ok(Command::Remove {
                        key: key.to_string(),
                    })
                }
                _ => Err(usage("remove <permission>")),
            },
            label @ ("group" | "parent") => parse_parent(label, rest),
            _ => Err(PermissionError::UnknownCommand(name.to_string())),
        }
    }
}

fn parse_page(raw: &str) -> PermissionResult<usize> {
    let page: i64 = raw.parse().map_err(|_| usage("list [<page>]"))?;
    if page <= 0 {
        return Err(PermissionError::InvalidPage);
    }
    usize::try_from(page).map_err(|_| usage("list [<page>]"))
}

fn parse_parent(label: &str, args: &[&str]) -> PermissionResult<Command> {
    let parent_usage = |tail: &str| PermissionError::Usage(format!("{label} {tail}"));

    let Some((name, rest)) = args.split_first() else {
        return Err(parent_usage("<command> [<params>...]"));
    };

    match name.to_lowercase().as_str() {
        "list" => match rest {
            [] => Ok(Command::ParentList),
            _ => Err(parent_usage("list")),
        },
        "add" => match rest {
            [group] => Ok(Command::ParentAdd {
                group: group.to_string(),
            }),
            _ => Err(parent_usage("add <parent>")),
        },
        "remove" => match rest {
            [group] => Ok(Command::ParentRemove {
                group: group.to_string(),
            }),
            _ => Err(parent_usage("remove <parent>")),
        },
        "set" => match rest {
            [] => Err(parent_usage("set <parent> [<parent>...]")),
            groups => Ok(Command::ParentSet {
                groups: groups.iter().map(|g| g.to_string()).collect(),
            }),
        },
        _ => Err(PermissionError::UnknownCommand(name.to_string())),
    }
}
