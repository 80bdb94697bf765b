use crate::domain::models::{InstanceState, InstanceStatus, UptimeLog};
use crate::error::{ClientError, RecordError};
use crate::services::control::{self, SUCCESS_MARKER};
use crate::services::endpoint::ConnectConfig;

/// Reserved target: every database known to the daemon.
pub const ALL_TARGETS: &str = "#all";

/// Reserved target: the farm-wide default property table.
pub const DEFAULTS_TARGET: &str = "#defaults";

/// Fetch the status snapshot for `filter` (or the whole farm), sorted by
/// database name.
///
/// The reply body carries one encoded record per line after the marker
/// line. A record that fails to decode is reported as a warning and
/// skipped; the rest of the snapshot is still returned.
pub fn fetch_status(
    cfg: &ConnectConfig,
    filter: Option<&str>,
) -> Result<Vec<InstanceStatus>, ClientError> {
    let body = control::send_command(cfg, filter.unwrap_or(ALL_TARGETS), "status", true)?;

    let mut lines = body.lines();
    match lines.next() {
        Some(SUCCESS_MARKER) => {}
        Some(err) => return Err(ClientError::Daemon(err.to_string())),
        None => return Err(ClientError::Transport("empty status reply".to_string())),
    }

    let mut snapshot = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        match parse_record(line) {
            Ok(status) => snapshot.push(status),
            Err(err) => eprintln!("WARNING: failed to parse status record: {err}"),
        }
    }
    tracing::debug!(databases = snapshot.len(), "status snapshot fetched");

    snapshot.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(snapshot)
}

/// Decode one status record line:
/// `name \t path \t state \t locked \t scenarios \t connections \t uplog`.
fn parse_record(line: &str) -> Result<InstanceStatus, RecordError> {
    let mut fields = line.split('\t');
    let name = fields.next().ok_or(RecordError::MissingField("name"))?;
    let path = fields.next().ok_or(RecordError::MissingField("path"))?;
    let state = fields.next().ok_or(RecordError::MissingField("state"))?;
    let locked = fields.next().ok_or(RecordError::MissingField("locked"))?;
    let scenarios = fields.next().ok_or(RecordError::MissingField("scenarios"))?;
    let connections = fields.next().ok_or(RecordError::MissingField("connections"))?;
    let uplog = fields.next().ok_or(RecordError::MissingField("uplog"))?;

    let state = match state {
        "running" => InstanceState::Running,
        "inactive" => InstanceState::Inactive,
        "crashed" => InstanceState::Crashed,
        "unknown" => InstanceState::Unknown,
        other => return Err(RecordError::UnknownState(other.to_string())),
    };
    let locked = match locked {
        "0" => false,
        "1" => true,
        other => return Err(RecordError::BadLockFlag(other.to_string())),
    };

    Ok(InstanceStatus {
        name: name.to_string(),
        path: path.to_string(),
        state,
        locked,
        scenarios: parse_list(scenarios),
        connections: parse_list(connections),
        uplog: parse_uplog(uplog)?,
    })
}

fn parse_list(field: &str) -> Vec<String> {
    if field.is_empty() {
        Vec::new()
    } else {
        field.split(',').map(str::to_string).collect()
    }
}

fn parse_uplog(field: &str) -> Result<UptimeLog, RecordError> {
    let parts: Vec<&str> = field.split(',').collect();
    if parts.len() != 11 {
        return Err(RecordError::UplogArity(parts.len()));
    }

    let int = |s: &str| {
        s.parse::<u32>()
            .map_err(|_| RecordError::BadNumber(s.to_string()))
    };
    let secs = |s: &str| {
        s.parse::<u64>()
            .map_err(|_| RecordError::BadNumber(s.to_string()))
    };
    let stamp = |s: &str| -> Result<Option<i64>, RecordError> {
        let t = s
            .parse::<i64>()
            .map_err(|_| RecordError::BadNumber(s.to_string()))?;
        Ok(if t < 0 { None } else { Some(t) })
    };
    let avg = |s: &str| {
        s.parse::<f64>()
            .map_err(|_| RecordError::BadNumber(s.to_string()))
    };

    Ok(UptimeLog {
        start_count: int(parts[0])?,
        stop_count: int(parts[1])?,
        crash_count: int(parts[2])?,
        last_start: stamp(parts[3])?,
        last_crash: stamp(parts[4])?,
        min_uptime: secs(parts[5])?,
        avg_uptime: secs(parts[6])?,
        max_uptime: secs(parts[7])?,
        crash_avg1: int(parts[8])?,
        crash_avg10: avg(parts[9])?,
        crash_avg30: avg(parts[10])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, state: &str) -> String {
        format!(
            "{name}\tmapi:monetdb://localhost:50000/{name}\t{state}\t0\tsql\t\t5,4,1,1700000000,-1,60,3600,7200,0,0.10,0.03"
        )
    }

    #[test]
    fn record_roundtrip() {
        let status = parse_record(&record("db1", "running")).expect("record parses");
        assert_eq!(status.name, "db1");
        assert_eq!(status.state, InstanceState::Running);
        assert!(!status.locked);
        assert_eq!(status.scenarios, vec!["sql".to_string()]);
        assert!(status.connections.is_empty());
        assert_eq!(status.uplog.start_count, 5);
        assert_eq!(status.uplog.last_start, Some(1_700_000_000));
        assert_eq!(status.uplog.last_crash, None);
        assert_eq!(status.uplog.avg_uptime, 3600);
    }

    #[test]
    fn bad_state_is_rejected() {
        let err = parse_record(&record("db1", "levitating")).unwrap_err();
        assert!(matches!(err, RecordError::UnknownState(_)));
    }

    #[test]
    fn truncated_record_is_rejected() {
        let err = parse_record("db1\t/path\trunning").unwrap_err();
        assert!(matches!(err, RecordError::MissingField(_)));
    }

    #[test]
    fn snapshot_sort_is_by_name_and_idempotent() {
        let mut snapshot: Vec<InstanceStatus> = ["b", "a", "c"]
            .iter()
            .map(|n| parse_record(&record(n, "inactive")).expect("record parses"))
            .collect();
        snapshot.sort_by(|a, b| a.name.cmp(&b.name));
        let order: Vec<&str> = snapshot.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);

        snapshot.sort_by(|a, b| a.name.cmp(&b.name));
        let again: Vec<&str> = snapshot.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(again, vec!["a", "b", "c"]);
    }
}
