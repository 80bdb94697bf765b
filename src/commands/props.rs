use std::process::ExitCode;

use crate::cli;
use crate::domain::models::{ConfigProperty, PropertySource};
use crate::services::control::{self, SUCCESS_MARKER};
use crate::services::dispatch::{dispatch, Feedback};
use crate::services::endpoint::ConnectConfig;
use crate::services::properties::{parse_props_buf, resolve};
use crate::services::render::abbreviate;
use crate::services::repository::{fetch_status, DEFAULTS_TARGET};
use crate::services::selector::select_by_patterns;

/// The reserved identity key; handled without a property round trip and
/// special-cased as a rename by `set`.
const IDENTITY_KEY: &str = "name";

// fixed columns of the get table: name, prop, source, and their separators
const GET_RESERVED: usize = 15 + 2 + 8 + 2 + 7 + 2;

pub fn set(cfg: &ConnectConfig, property: &str, patterns: &[String]) -> anyhow::Result<ExitCode> {
    let Some((key, _)) = property.split_once('=') else {
        eprintln!("set: need property=value");
        cli::print_usage("set");
        return Ok(ExitCode::from(1));
    };
    // the wire verb is the whole key=value assignment
    apply(cfg, "set", key, property, patterns)
}

pub fn inherit(cfg: &ConnectConfig, property: &str, patterns: &[String]) -> anyhow::Result<ExitCode> {
    // an empty assignment reverts the key to its inherited default
    let verb = format!("{property}=");
    apply(cfg, "inherit", property, &verb, patterns)
}

fn apply(
    cfg: &ConnectConfig,
    cmd: &str,
    key: &str,
    verb: &str,
    patterns: &[String],
) -> anyhow::Result<ExitCode> {
    if key == IDENTITY_KEY && cmd == "inherit" {
        eprintln!("inherit: cannot default to a database name");
        return Ok(ExitCode::from(1));
    }

    let snapshot = fetch_status(cfg, None)?;
    let (targets, _) = select_by_patterns(patterns, snapshot, cmd);
    if targets.is_empty() {
        return Ok(ExitCode::from(1));
    }

    if key == IDENTITY_KEY && targets.len() > 1 {
        eprintln!("{cmd}: cannot rename multiple databases to the same name");
        return Ok(ExitCode::from(1));
    }

    let names: Vec<String> = targets.iter().map(|db| db.name.clone()).collect();
    let outcome = dispatch(cfg, cmd, &names, verb, &Feedback::silent())?;
    Ok(outcome.exit_code())
}

pub fn get(
    cfg: &ConnectConfig,
    properties: &str,
    patterns: &[String],
    term_width: usize,
) -> anyhow::Result<ExitCode> {
    let defaults = match fetch_properties(cfg, DEFAULTS_TARGET)? {
        Ok(table) => table,
        Err(message) => {
            eprintln!("get: {message}");
            return Ok(ExitCode::from(1));
        }
    };

    let keys: Vec<String> = if properties == "all" {
        std::iter::once(IDENTITY_KEY.to_string())
            .chain(defaults.iter().map(|p| p.key.clone()))
            .collect()
    } else {
        properties.split(',').map(str::to_string).collect()
    };

    let snapshot = fetch_status(cfg, None)?;
    let shown = if patterns.is_empty() {
        snapshot
    } else {
        let (matched, _) = select_by_patterns(patterns, snapshot, "get");
        matched
    };

    // suppress the header when there are no results
    if shown.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    let value_width = term_width.saturating_sub(GET_RESERVED).max(6);
    println!("     name          prop     source           value");
    for key in &keys {
        'targets: for db in &shown {
            let (source, value) = if key == IDENTITY_KEY {
                (PropertySource::Direct, abbreviate(&db.name, value_width))
            } else {
                let table = match fetch_properties(cfg, &db.name)? {
                    Ok(table) => table,
                    Err(message) => {
                        eprintln!("get: {message}");
                        return Ok(ExitCode::from(1));
                    }
                };
                match resolve(&table, &defaults, key) {
                    Some((source, value)) => (source, abbreviate(value, value_width)),
                    None => {
                        eprintln!("get: no such property: {key}");
                        break 'targets;
                    }
                }
            };
            println!(
                "{:<15}  {:<8}  {:<7}  {}",
                db.name,
                key,
                source.label(),
                value
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Fetch a property table; `Err` carries the daemon's refusal verbatim.
fn fetch_properties(
    cfg: &ConnectConfig,
    target: &str,
) -> anyhow::Result<Result<Vec<ConfigProperty>, String>> {
    let body = control::send_command(cfg, target, "get", true)?;
    let mut lines = body.lines();
    match lines.next() {
        Some(SUCCESS_MARKER) => {}
        Some(err) => return Ok(Err(err.to_string())),
        None => return Ok(Err("empty reply".to_string())),
    }
    let rest: String = lines.collect::<Vec<_>>().join("\n");
    Ok(Ok(parse_props_buf(&rest)))
}
