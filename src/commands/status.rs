use std::process::ExitCode;

use crate::cli;
use crate::services::control::{self, SUCCESS_MARKER};
use crate::services::endpoint::ConnectConfig;
use crate::services::render::{
    abbreviate, in_state_pass, print_short_header, print_status, short_name_width, StatusMode,
};
use crate::services::repository::fetch_status;
use crate::services::selector::{glob_match, select_by_patterns};

/// Default state selector: every pass, in this order.
const ALL_STATES: &str = "rscl";

/// Discovery is gated behind a fixed passphrase pair rather than a verb.
const DISCOVER_TARGET: &str = "anelosimus";
const DISCOVER_VERB: &str = "eximius";

const URI_SCHEME: &str = "mapi:monetdb://";

pub fn status(
    cfg: &ConnectConfig,
    long: bool,
    crash: bool,
    states: Option<&str>,
    patterns: &[String],
    term_width: usize,
) -> anyhow::Result<ExitCode> {
    let mode = if long {
        StatusMode::Long
    } else if crash {
        StatusMode::Narrative
    } else {
        StatusMode::Short
    };

    let states = states.unwrap_or(ALL_STATES);
    for flag in states.chars() {
        if !"rscl".contains(flag) {
            eprintln!("status: unknown flag for -s: -{flag}");
            cli::print_usage("status");
            return Ok(ExitCode::from(1));
        }
    }

    let snapshot = fetch_status(cfg, None)?;
    let shown = if patterns.is_empty() {
        snapshot
    } else {
        let (matched, _) = select_by_patterns(patterns, snapshot, "status");
        matched
    };

    let longest = shown
        .iter()
        .map(|db| db.name.chars().count())
        .max()
        .unwrap_or(0);
    let name_width = short_name_width(term_width, longest);

    if mode == StatusMode::Short && !shown.is_empty() {
        print_short_header(name_width);
    }

    // output is grouped by state-selector pass, name order within a pass
    for selector in states.chars() {
        for db in shown.iter().filter(|db| in_state_pass(db, selector)) {
            print_status(db, mode, name_width);
        }
    }

    Ok(ExitCode::SUCCESS)
}

pub fn discover(
    cfg: &ConnectConfig,
    expression: Option<&str>,
    term_width: usize,
) -> anyhow::Result<ExitCode> {
    let body = control::send_command(cfg, DISCOVER_TARGET, DISCOVER_VERB, true)?;

    let mut lines = body.lines();
    match lines.next() {
        Some(SUCCESS_MARKER) => {}
        Some(err) => {
            eprintln!("discover: {err}");
            return Ok(ExitCode::from(1));
        }
        None => {
            eprintln!("discover: empty reply");
            return Ok(ExitCode::from(1));
        }
    }

    // body lines are "<remote suffix>\t<local prefix>" pairs
    let mut locations = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let Some((suffix, prefix)) = line.split_once('\t') else {
            println!("discover: WARNING: discarding incorrect line: {line}");
            continue;
        };
        let location = format!("{prefix}{suffix}");
        if expression.map_or(true, |pattern| glob_match(pattern, &location)) {
            locations.push(abbreviate(&location, term_width));
        }
    }

    if !locations.is_empty() {
        locations.sort_by(|a, b| strip_scheme(a).cmp(strip_scheme(b)));

        let loclen = locations
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        let pad = loclen.saturating_sub(8) - loclen.saturating_sub(8) / 2;
        println!("{:pad$}location", "");
        for location in &locations {
            println!("{location}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn strip_scheme(location: &str) -> &str {
    location.strip_prefix(URI_SCHEME).unwrap_or(location)
}
