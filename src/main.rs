/*!
 * Perms - Interactive Entry Point
 *
 * Seeds an in-memory backend, loads every group and reads object commands
 * from stdin, one per line:
 * - group <name> <command...>
 * - user <uuid> <command...>
 * - creategroup <name>
 * - groups | stats | quit
 */

use anyhow::{bail, Context, Result};
use perms_core::commands::{CheckResult, CommandOutcome, Dispatcher, Page};
use perms_core::permissions::PermissionSource;
use perms_core::{
    init_tracing, CommandSpan, ManagerConfig, MemoryBackend, PermissionError, PermissionManager,
    Principal,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> Result<()> {
    init_tracing();

    let config = ManagerConfig::from_env();
    let backend = match &config.seed_path {
        Some(path) => MemoryBackend::from_path(path)
            .with_context(|| format!("failed to seed backend from {}", path.display()))?,
        None => MemoryBackend::new(),
    };

    let manager = PermissionManager::with_config(Arc::new(backend), config);
    manager.load().context("failed to load permission groups")?;
    info!(groups = manager.registry().len(), "Permission manager ready");

    let dispatcher = Dispatcher::new(manager.clone());
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let args: Vec<&str> = line.split_whitespace().collect();
        if args.is_empty() {
            continue;
        }

        match run_line(&dispatcher, &args) {
            Ok(Flow::Continue(lines)) => {
                for text in lines {
                    writeln!(stdout, "{text}")?;
                }
            }
            Ok(Flow::Quit) => break,
            Err(e) => writeln!(stdout, "{e}")?,
        }
        stdout.flush()?;
    }

    manager.shutdown();
    Ok(())
}

enum Flow {
    Continue(Vec<String>),
    Quit,
}

fn run_line(dispatcher: &Dispatcher, args: &[&str]) -> Result<Flow> {
    let manager = dispatcher.manager();

    let lines = match args {
        ["quit" | "exit"] => return Ok(Flow::Quit),
        ["groups"] => manager.registry().names(),
        ["stats"] => {
            let stats = manager.cache_stats();
            vec![format!(
                "users cached: {}, hits: {}, misses: {}, loads: {}, hit rate: {:.1}%",
                stats.size, stats.hits, stats.misses, stats.loads, stats.hit_rate
            )]
        }
        ["creategroup", name] => {
            let group = manager.get_or_create_group(name)?;
            vec![format!("Group {} is ready", group.name())]
        }
        ["group", name, rest @ ..] => {
            let group = manager
                .get_group(name)
                .ok_or_else(|| PermissionError::UnknownGroup(name.to_string()))?;
            execute(dispatcher, &*group, "group", rest)?
        }
        ["user", id, rest @ ..] => {
            let id = Uuid::parse_str(id).with_context(|| format!("{id} is not a valid uuid"))?;
            let user = manager.get_user(id)?;
            execute(dispatcher, &*user, "user", rest)?
        }
        [other, ..] => bail!("Unknown command {other}"),
        [] => Vec::new(),
    };

    Ok(Flow::Continue(lines))
}

fn execute(
    dispatcher: &Dispatcher,
    target: &dyn Principal,
    label: &str,
    args: &[&str],
) -> Result<Vec<String>> {
    let span = CommandSpan::new(target.name(), &args.join(" "));
    let _entered = span.enter();

    let result = dispatcher.run(target, args);
    span.record_result(result.is_ok());

    match result {
        Ok(outcome) => Ok(render(target.name(), outcome)),
        Err(PermissionError::Usage(usage)) => Ok(vec![format!("{label} {} {usage}", target.name())]),
        Err(e) => {
            error!(trace_id = %span.trace_id(), error = %e, "Command failed");
            Err(e.into())
        }
    }
}

fn render(name: &str, outcome: CommandOutcome) -> Vec<String> {
    match outcome {
        CommandOutcome::Checked(CheckResult {
            permission,
            value,
            source,
        }) => {
            let line = match (value, source) {
                (Some(value), Some(PermissionSource::Local)) => {
                    format!("{name} has \"{permission}\" = {} (self)", upper(value))
                }
                (Some(value), _) => {
                    format!("{name} has \"{permission}\" = {} (inherited)", upper(value))
                }
                (None, _) => {
                    format!("{name} doesnt have permission \"{permission}\" defined (inherited)")
                }
            };
            vec![line]
        }
        CommandOutcome::Listed(page) => render_page(page),
        CommandOutcome::PermissionSet { directive, .. } => {
            vec![format!("{directive} was added to {name}")]
        }
        CommandOutcome::PermissionRemoved { key } => vec![format!("{key} was removed from {name}")],
        CommandOutcome::Parents { parents } => numbered(0, &parents),
        CommandOutcome::ParentAdded { parent } => vec![format!("{name} now inherits from {parent}")],
        CommandOutcome::ParentRemoved { parent } => {
            vec![format!("{parent} is no longer a parent of {name}")]
        }
        CommandOutcome::ParentsReplaced { parents } => {
            vec![format!("{name} now inherits from [{}]", parents.join(", "))]
        }
    }
}

fn render_page(page: Page) -> Vec<String> {
    let mut lines = numbered(page.start, &page.items);
    if page.has_more {
        lines.push("...".to_string());
    }
    lines
}

fn numbered(start: usize, items: &[String]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}) {}", start + i + 1, item))
        .collect()
}

fn upper(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}
