use chrono::{Local, LocalResult, TimeZone, Utc};

use crate::domain::models::{InstanceState, InstanceStatus};

/// Classic terminal width, used when the real width cannot be determined.
pub const DEFAULT_WIDTH: usize = 80;

/// Columns the short listing spends on everything but the name
/// (state, uptime, health, last crash).
const SHORT_MODE_RESERVED: usize = 54;

const TRUNCATION_MARKER: &str = "...";

/// How a status snapshot is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMode {
    Short,
    Long,
    Narrative,
}

/// Query the terminal width once at startup.
pub fn terminal_width() -> usize {
    console::Term::stdout()
        .size_checked()
        .map(|(_, cols)| cols as usize)
        .filter(|cols| *cols > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

fn now() -> i64 {
    Utc::now().timestamp()
}

/// Render a duration as at most `precision` non-zero units, coarsest first
/// (days, hours, minutes, seconds).
pub fn seconds_to_string(secs: u64, precision: usize) -> String {
    const UNITS: [(u64, char); 4] = [(86_400, 'd'), (3_600, 'h'), (60, 'm'), (1, 's')];

    let mut rest = secs;
    let mut parts = Vec::new();
    for (span, tag) in UNITS {
        let n = rest / span;
        rest %= span;
        if n > 0 {
            parts.push(format!("{n}{tag}"));
        }
        if parts.len() == precision {
            break;
        }
    }
    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// Cut a name down to exactly `width` characters, ending in the truncation
/// marker; names that already fit are returned unchanged.
pub fn abbreviate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    if width <= TRUNCATION_MARKER.len() {
        return TRUNCATION_MARKER.chars().take(width).collect();
    }
    let head: String = name.chars().take(width - TRUNCATION_MARKER.len()).collect();
    format!("{head}{TRUNCATION_MARKER}")
}

pub fn format_timestamp(secs: i64) -> String {
    match Local.timestamp_opt(secs, 0) {
        LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => "(unknown)".to_string(),
    }
}

/// Name-column budget for the short listing: the terminal width minus the
/// reserved columns, floored at 6, narrowed to the longest name (floor 14).
pub fn short_name_width(term_width: usize, longest_name: usize) -> usize {
    let budget = term_width.saturating_sub(SHORT_MODE_RESERVED).max(6);
    let name_width = longest_name.max(14);
    name_width.min(budget)
}

pub fn print_short_header(name_width: usize) {
    let left = name_width - 4 - (name_width - 4) / 2;
    let right = (name_width - 4) / 2;
    print!("{:left$}name{:right$}  ", "", "");
    println!(" state     uptime       health       last crash");
}

/// True when `db` belongs to the given state-selector pass: `r`unning,
/// `s`topped and `c`rashed select unlocked databases by state, `l` selects
/// locked databases regardless of state.
pub fn in_state_pass(db: &InstanceStatus, selector: char) -> bool {
    match selector {
        'l' => db.locked,
        'r' => !db.locked && db.state == InstanceState::Running,
        's' => !db.locked && db.state == InstanceState::Inactive,
        'c' => !db.locked && db.state == InstanceState::Crashed,
        _ => false,
    }
}

pub fn print_status(db: &InstanceStatus, mode: StatusMode, name_width: usize) {
    match mode {
        StatusMode::Short => print_short(db, name_width),
        StatusMode::Long => print_long(db),
        StatusMode::Narrative => print_narrative(db),
    }
}

fn print_short(db: &InstanceStatus, name_width: usize) {
    let state = if db.locked { "locked " } else { db.state.label() };

    let uptime = match (db.state, db.uplog.last_start) {
        (InstanceState::Running, Some(start)) => {
            seconds_to_string((now() - start).max(0) as u64, 3)
        }
        _ => String::new(),
    };
    let crash = db
        .uplog
        .last_crash
        .map(format_timestamp)
        .unwrap_or_else(|| "-".to_string());
    let name = abbreviate(&db.name, name_width);

    print!("{name:<name_width$}  {state} {uptime:>12}");
    if db.uplog.start_count > 0 {
        let health = 100u32.saturating_sub(db.uplog.crash_count * 100 / db.uplog.start_count);
        let avg = seconds_to_string(db.uplog.avg_uptime, 1);
        print!("  {health:>3}%, {avg:>3}  {crash}");
    }
    println!();
}

fn print_long(db: &InstanceStatus) {
    let log = &db.uplog;

    println!("{}:", db.name);
    println!("  location: {}", db.path);
    println!("  database name: {}", db.name);
    println!("  state: {}", db.state.label());
    println!("  locked: {}", if db.locked { "yes" } else { "no" });
    print!("  scenarios:");
    if db.scenarios.is_empty() {
        print!(" (none)");
    }
    for scenario in &db.scenarios {
        print!(" {scenario}");
    }
    println!();
    print!("  connections:");
    if db.connections.is_empty() {
        print!(" (none)");
    }
    for conn in &db.connections {
        print!(" {conn}");
    }
    println!();
    println!("  start count: {}", log.start_count);
    println!("  stop count: {}", log.stop_count);
    println!("  crash count: {}", log.crash_count);
    if db.state == InstanceState::Running {
        if let Some(start) = log.last_start {
            println!(
                "  current uptime: {}",
                seconds_to_string((now() - start).max(0) as u64, 999)
            );
        }
    }
    println!("  average uptime: {}", seconds_to_string(log.avg_uptime, 999));
    println!("  maximum uptime: {}", seconds_to_string(log.max_uptime, 999));
    println!("  minimum uptime: {}", seconds_to_string(log.min_uptime, 999));
    println!(
        "  last start with crash: {}",
        log.last_crash
            .map(format_timestamp)
            .unwrap_or_else(|| "(unknown)".to_string())
    );
    println!(
        "  last start: {}",
        log.last_start
            .map(format_timestamp)
            .unwrap_or_else(|| "(unknown)".to_string())
    );
    println!(
        "  average of crashes in the last start attempt: {}",
        log.crash_avg1
    );
    println!(
        "  average of crashes in the last 10 start attempts: {:.2}",
        log.crash_avg10
    );
    println!(
        "  average of crashes in the last 30 start attempts: {:.2}",
        log.crash_avg30
    );
}

fn print_narrative(db: &InstanceStatus) {
    let log = &db.uplog;

    let mut summary = match (db.state, log.last_start, log.last_crash) {
        (InstanceState::Running, Some(start), _) => format!(
            "up since {}, {}",
            format_timestamp(start),
            seconds_to_string((now() - start).max(0) as u64, 999)
        ),
        (InstanceState::Running, None, _) => "running".to_string(),
        (InstanceState::Crashed, _, Some(crash)) => {
            format!("crashed on {}", format_timestamp(crash))
        }
        (InstanceState::Crashed, _, None) => "crashed".to_string(),
        (InstanceState::Inactive, _, _) => "not running".to_string(),
        (InstanceState::Unknown, _, _) => "unknown".to_string(),
    };
    if db.locked {
        summary.push_str(", locked");
    }
    println!("database {}, {}", db.name, summary);
    println!(
        "  crash average: {}.00 {:.2} {:.2} (over 1, 10, 30 starts) in total {} crashes",
        log.crash_avg1, log.crash_avg10, log.crash_avg30, log.crash_count
    );
    println!(
        "  uptime stats (min/avg/max): {}/{}/{} over {} runs",
        seconds_to_string(log.min_uptime, 1),
        seconds_to_string(log.avg_uptime, 1),
        seconds_to_string(log.max_uptime, 1),
        log.stop_count
    );
}
