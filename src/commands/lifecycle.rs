use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use crate::cli;
use crate::domain::models::{InstanceState, InstanceStatus};
use crate::services::dispatch::{dispatch, Feedback};
use crate::services::endpoint::ConnectConfig;
use crate::services::repository::fetch_status;
use crate::services::selector::select_by_patterns;

fn names_of(targets: &[InstanceStatus]) -> Vec<String> {
    targets.iter().map(|db| db.name.clone()).collect()
}

/// Narrow the live snapshot to the given patterns; `None` when nothing
/// matched (warnings already printed by the selector).
fn select_targets(
    cfg: &ConnectConfig,
    cmd: &str,
    patterns: &[String],
) -> anyhow::Result<Option<Vec<InstanceStatus>>> {
    let snapshot = fetch_status(cfg, None)?;
    let (matched, _) = select_by_patterns(patterns, snapshot, cmd);
    if matched.is_empty() {
        return Ok(None);
    }
    Ok(Some(matched))
}

/// Databases to create need not exist yet, so the arguments are the target
/// list verbatim.
pub fn create(cfg: &ConnectConfig, databases: &[String]) -> anyhow::Result<ExitCode> {
    let outcome = dispatch(
        cfg,
        "create",
        databases,
        "create",
        &Feedback::success("created database in maintenance mode"),
    )?;
    Ok(outcome.exit_code())
}

pub fn destroy(cfg: &ConnectConfig, force: bool, patterns: &[String]) -> anyhow::Result<ExitCode> {
    let Some(targets) = select_targets(cfg, "destroy", patterns)? else {
        return Ok(ExitCode::from(1));
    };

    if !force && !confirm_destroy(&targets)? {
        println!("aborted");
        return Ok(ExitCode::from(1));
    }

    let outcome = dispatch(
        cfg,
        "destroy",
        &names_of(&targets),
        "destroy",
        &Feedback::success("destroyed database"),
    )?;
    Ok(outcome.exit_code())
}

fn confirm_destroy(targets: &[InstanceStatus]) -> io::Result<bool> {
    let plural = targets.len() > 1;
    print!("you are about to remove database{} ", if plural { "s" } else { "" });
    for (i, db) in targets.iter().enumerate() {
        print!("{}'{}'", if i > 0 { ", " } else { "" }, db.name);
    }
    print!(
        "\nALL data in {} will be lost, are you sure? [y/N] ",
        if plural { "these databases" } else { "this database" }
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y"))
}

pub fn lock(cfg: &ConnectConfig, patterns: &[String]) -> anyhow::Result<ExitCode> {
    let Some(targets) = select_targets(cfg, "lock", patterns)? else {
        return Ok(ExitCode::from(1));
    };
    let outcome = dispatch(
        cfg,
        "lock",
        &names_of(&targets),
        "lock",
        &Feedback::success("put database under maintenance"),
    )?;
    Ok(outcome.exit_code())
}

pub fn release(cfg: &ConnectConfig, patterns: &[String]) -> anyhow::Result<ExitCode> {
    let Some(targets) = select_targets(cfg, "release", patterns)? else {
        return Ok(ExitCode::from(1));
    };
    let outcome = dispatch(
        cfg,
        "release",
        &names_of(&targets),
        "release",
        &Feedback::success("taken database out of maintenance mode"),
    )?;
    Ok(outcome.exit_code())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Start,
    Stop,
    Kill,
}

impl PowerAction {
    fn verb(self) -> &'static str {
        match self {
            PowerAction::Start => "start",
            PowerAction::Stop => "stop",
            PowerAction::Kill => "kill",
        }
    }

    fn action(self) -> &'static str {
        match self {
            PowerAction::Start => "starting database",
            PowerAction::Stop => "stopping database",
            PowerAction::Kill => "killing database",
        }
    }

    /// Whether `state` already satisfies the command's goal.
    fn satisfied_by(self, state: InstanceState) -> bool {
        match self {
            PowerAction::Start => state == InstanceState::Running,
            PowerAction::Stop | PowerAction::Kill => state != InstanceState::Running,
        }
    }
}

/// start/stop/kill. With `-a` the whole farm is the target list, minus the
/// databases whose state already satisfies the goal; pruning everything
/// away means there is nothing left to do and that is success.
pub fn power(
    cfg: &ConnectConfig,
    action: PowerAction,
    all: bool,
    patterns: &[String],
) -> anyhow::Result<ExitCode> {
    let cmd = action.verb();

    if !all && patterns.is_empty() {
        cli::print_usage(cmd);
        return Ok(ExitCode::from(1));
    }

    let snapshot = fetch_status(cfg, None)?;
    let targets: Vec<InstanceStatus> = if all {
        snapshot
            .into_iter()
            .filter(|db| !action.satisfied_by(db.state))
            .collect()
    } else {
        let (matched, _) = select_by_patterns(patterns, snapshot, cmd);
        if matched.is_empty() {
            return Ok(ExitCode::from(1));
        }
        matched
    };

    if targets.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = dispatch(
        cfg,
        cmd,
        &names_of(&targets),
        cmd,
        &Feedback::progress(action.action()),
    )?;
    Ok(outcome.exit_code())
}
