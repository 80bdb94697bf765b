use std::fs;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use crate::domain::models::Passphrase;
use crate::error::ClientError;

/// Port monetdbd listens on when none is configured.
pub const DEFAULT_PORT: u16 = 50001;

/// Control sockets follow `<dir>/.s.monetdbd.<port>`.
pub const SOCKET_PREFIX: &str = ".s.monetdbd.";

const DEFAULT_SOCKET_DIR: &str = "/tmp";

/// Where the control requests go: a local Unix socket or a TCP peer.
#[derive(Debug, Clone)]
pub enum Endpoint {
    Local(PathBuf),
    Remote { host: String, port: u16 },
}

/// Immutable connection configuration, resolved once during startup and
/// passed by reference into every daemon exchange.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    pub endpoint: Endpoint,
    pub passphrase: Option<Passphrase>,
    pub quiet: bool,
}

/// Resolve the control endpoint from the connection flags.
///
/// A host that is unset or an absolute path selects local mode: the host is
/// the socket directory and the candidate is the conventional socket name for
/// the given (or default) port. When the candidate does not answer and no
/// explicit port was given, the directory is scanned for other monetdbd
/// sockets and each is probed in turn.
pub fn resolve(host: Option<&str>, port: Option<u16>) -> Result<Endpoint, ClientError> {
    match host {
        Some(h) if !h.starts_with('/') => Ok(Endpoint::Remote {
            host: h.to_string(),
            port: port.unwrap_or(DEFAULT_PORT),
        }),
        _ => {
            let dir = Path::new(host.unwrap_or(DEFAULT_SOCKET_DIR));
            resolve_local(dir, port)
        }
    }
}

fn resolve_local(dir: &Path, port: Option<u16>) -> Result<Endpoint, ClientError> {
    let candidate = dir.join(format!("{}{}", SOCKET_PREFIX, port.unwrap_or(DEFAULT_PORT)));
    tracing::debug!(socket = %candidate.display(), "probing control socket");
    if ping(&candidate) {
        return Ok(Endpoint::Local(candidate));
    }

    // Without an explicit port any monetdbd socket in the directory will do.
    if port.is_none() {
        if let Some(found) = scan_socket_dir(dir) {
            return Ok(Endpoint::Local(found));
        }
    }

    Err(ClientError::NoEndpoint)
}

fn scan_socket_dir(dir: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(dir = %dir.display(), %err, "cannot scan socket directory");
            return None;
        }
    };

    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(SOCKET_PREFIX) {
            continue;
        }
        let path = entry.path();
        let is_socket = fs::metadata(&path)
            .map(|m| m.file_type().is_socket())
            .unwrap_or(false);
        if !is_socket {
            continue;
        }
        tracing::debug!(socket = %path.display(), "probing discovered socket");
        if ping(&path) {
            return Some(path);
        }
    }
    None
}

/// Liveness check: a dead socket file refuses the connection, a live daemon
/// accepts it. No protocol traffic is exchanged.
fn ping(path: &Path) -> bool {
    UnixStream::connect(path).is_ok()
}
