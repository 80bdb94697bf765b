use std::fmt;

/// Lifecycle state of one managed database as reported by monetdbd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    Running,
    Inactive,
    Crashed,
    Unknown,
}

impl InstanceState {
    /// Seven-column label used by the status listings.
    pub fn label(self) -> &'static str {
        match self {
            InstanceState::Running => "running",
            InstanceState::Inactive => "stopped",
            InstanceState::Crashed => "crashed",
            InstanceState::Unknown => "unknown",
        }
    }
}

/// Start/stop/crash bookkeeping the daemon maintains per database. Timestamps
/// are epoch seconds; `None` means the event never happened.
#[derive(Debug, Clone, Default)]
pub struct UptimeLog {
    pub start_count: u32,
    pub stop_count: u32,
    pub crash_count: u32,
    pub last_start: Option<i64>,
    pub last_crash: Option<i64>,
    pub min_uptime: u64,
    pub avg_uptime: u64,
    pub max_uptime: u64,
    pub crash_avg1: u32,
    pub crash_avg10: f64,
    pub crash_avg30: f64,
}

/// One database in a status snapshot. Snapshots are plain vectors; list
/// membership operations hand ownership between vectors instead of relinking.
#[derive(Debug, Clone)]
pub struct InstanceStatus {
    pub name: String,
    pub path: String,
    pub state: InstanceState,
    pub locked: bool,
    pub scenarios: Vec<String>,
    pub connections: Vec<String>,
    pub uplog: UptimeLog,
}

/// A configuration key with an optional value; `None` inherits the farm
/// default.
#[derive(Debug, Clone)]
pub struct ConfigProperty {
    pub key: String,
    pub value: Option<String>,
}

/// Which tier supplied a property value in `get` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySource {
    Direct,
    Local,
    Default,
}

impl PropertySource {
    pub fn label(self) -> &'static str {
        match self {
            PropertySource::Direct => "direct",
            PropertySource::Local => "local",
            PropertySource::Default => "default",
        }
    }
}

/// Control-connection passphrase. Never reveals its contents through Debug;
/// the value only leaves through `as_str` at the wire.
#[derive(Clone)]
pub struct Passphrase(String);

impl Passphrase {
    pub fn new(secret: String) -> Self {
        Passphrase(secret)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(..)")
    }
}
