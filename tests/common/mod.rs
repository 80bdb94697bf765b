use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use tempfile::TempDir;

/// One scripted database in the mock daemon's farm.
#[derive(Debug, Clone)]
pub struct FixtureDb {
    pub name: String,
    pub state: &'static str,
    pub locked: bool,
    pub starts: u32,
    pub stops: u32,
    pub crashes: u32,
    pub last_start: i64,
    pub last_crash: i64,
    pub props: Vec<(String, String)>,
}

fn now() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl FixtureDb {
    pub fn running(name: &str) -> Self {
        FixtureDb {
            name: name.to_string(),
            state: "running",
            locked: false,
            starts: 5,
            stops: 4,
            crashes: 0,
            last_start: now() - 3_600,
            last_crash: -1,
            props: Vec::new(),
        }
    }

    pub fn stopped(name: &str) -> Self {
        FixtureDb {
            name: name.to_string(),
            state: "inactive",
            locked: false,
            starts: 3,
            stops: 3,
            crashes: 1,
            last_start: now() - 86_400,
            last_crash: -1,
            props: Vec::new(),
        }
    }

    pub fn crashed(name: &str) -> Self {
        FixtureDb {
            name: name.to_string(),
            state: "crashed",
            locked: false,
            starts: 4,
            stops: 2,
            crashes: 2,
            last_start: now() - 7_200,
            last_crash: now() - 1_800,
            props: Vec::new(),
        }
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn with_prop(mut self, key: &str, value: &str) -> Self {
        self.props.push((key.to_string(), value.to_string()));
        self
    }
}

/// The mock daemon's whole scripted behavior.
#[derive(Debug, Default, Clone)]
pub struct Fleet {
    pub dbs: Vec<FixtureDb>,
    /// Targets whose action requests are answered with an error body.
    pub fail: HashSet<String>,
    /// Targets whose action requests get the connection dropped instead of
    /// any reply.
    pub drop_conn: HashSet<String>,
    pub defaults: Vec<(String, String)>,
    /// Discovery body as (remote suffix, local prefix) pairs.
    pub discoveries: Vec<(String, String)>,
    /// Raw lines appended to every status reply, for parse-warning tests.
    pub garbage_records: Vec<String>,
}

impl Fleet {
    pub fn new(dbs: Vec<FixtureDb>) -> Self {
        Fleet {
            dbs,
            defaults: vec![
                ("type".to_string(), "database".to_string()),
                ("shared".to_string(), "yes".to_string()),
                ("nthreads".to_string(), "8".to_string()),
                ("optpipe".to_string(), "default_pipe".to_string()),
                ("readonly".to_string(), "no".to_string()),
                ("nclients".to_string(), "64".to_string()),
            ],
            ..Fleet::default()
        }
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.fail.insert(name.to_string());
        self
    }

    pub fn dropping(mut self, name: &str) -> Self {
        self.drop_conn.insert(name.to_string());
        self
    }
}

/// Isolated home for one test: a temp dir holding the mock daemon's control
/// socket and a journal of every action request it received.
pub struct TestEnv {
    _tmp: TempDir,
    pub sock_dir: PathBuf,
    journal: PathBuf,
}

impl TestEnv {
    pub fn new(fleet: Fleet) -> Self {
        Self::with_port(fleet, 50001)
    }

    /// Bind the mock daemon on a non-default port; exercises the socket
    /// directory scan in endpoint discovery.
    pub fn with_port(fleet: Fleet, port: u16) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let sock_dir = tmp.path().join("run");
        fs::create_dir_all(&sock_dir).expect("create socket dir");
        let journal = tmp.path().join("requests.log");
        fs::write(&journal, "").expect("seed journal");

        let socket = sock_dir.join(format!(".s.monetdbd.{port}"));
        let listener = UnixListener::bind(&socket).expect("bind control socket");
        let fleet = Arc::new(fleet);
        let journal_path = journal.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                serve_one(stream, &fleet, &journal_path);
            }
        });

        Self {
            _tmp: tmp,
            sock_dir,
            journal,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("monetdb");
        cmd.env_remove("MONETDB_PASSPHRASE")
            .arg("-h")
            .arg(self.sock_dir.to_str().expect("socket dir utf8"));
        cmd
    }

    /// Action requests the mock daemon received, in arrival order, one
    /// `<target> <verb>` entry per line.
    pub fn requests(&self) -> Vec<String> {
        fs::read_to_string(&self.journal)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn serve_one(stream: UnixStream, fleet: &Fleet, journal: &Path) {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    if reader.read_line(&mut line).unwrap_or(0) == 0 {
        return;
    }
    let line = line.trim_end();
    let Some((target, verb)) = line.split_once(' ') else {
        return;
    };
    let mut stream = reader.into_inner();

    match verb {
        "status" => {
            let mut reply = String::from("OK\n");
            for db in &fleet.dbs {
                if target == "#all" || db.name == target {
                    reply.push_str(&record(db));
                    reply.push('\n');
                }
            }
            for junk in &fleet.garbage_records {
                reply.push_str(junk);
                reply.push('\n');
            }
            let _ = stream.write_all(reply.as_bytes());
        }
        "get" => {
            let reply = if target == "#defaults" {
                props_reply(&fleet.defaults)
            } else if let Some(db) = fleet.dbs.iter().find(|d| d.name == target) {
                props_reply(&db.props)
            } else {
                format!("no such database: {target}\n")
            };
            let _ = stream.write_all(reply.as_bytes());
        }
        "eximius" if target == "anelosimus" => {
            let mut reply = String::from("OK\n");
            for (suffix, prefix) in &fleet.discoveries {
                reply.push_str(&format!("{suffix}\t{prefix}\n"));
            }
            let _ = stream.write_all(reply.as_bytes());
        }
        action => {
            journal_append(journal, &format!("{target} {action}"));
            if fleet.drop_conn.contains(target) {
                return;
            }
            let reply = if fleet.fail.contains(target) {
                format!("refused: {target}\n")
            } else {
                "OK\n".to_string()
            };
            let _ = stream.write_all(reply.as_bytes());
        }
    }
}

fn props_reply(props: &[(String, String)]) -> String {
    let mut reply = String::from("OK\n");
    for (key, value) in props {
        reply.push_str(&format!("{key}={value}\n"));
    }
    reply
}

fn record(db: &FixtureDb) -> String {
    format!(
        "{}\tmapi:monetdb://localhost:50000/{}\t{}\t{}\tsql\t\t{},{},{},{},{},60,3600,7200,0,0.00,0.00",
        db.name,
        db.name,
        db.state,
        u8::from(db.locked),
        db.starts,
        db.stops,
        db.crashes,
        db.last_start,
        db.last_crash,
    )
}

fn journal_append(journal: &Path, entry: &str) {
    let _ = OpenOptions::new()
        .append(true)
        .open(journal)
        .and_then(|mut f| writeln!(f, "{entry}"));
}
