use thiserror::Error;

/// Failures that terminate a command, classified by how the process exit
/// code must reflect them.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad flags or arguments; no daemon contact was attempted.
    #[error("{0}")]
    Usage(String),

    /// No control socket answered during endpoint discovery.
    #[error("cannot find a control socket, use -h and/or -p")]
    NoEndpoint,

    /// The daemon answered a result-bearing request with an error line.
    #[error("{0}")]
    Daemon(String),

    /// Send/receive failure on the wire. Fatal for the whole batch.
    #[error("{0}")]
    Transport(String),
}

impl ClientError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ClientError::Usage(_) => 1,
            ClientError::NoEndpoint | ClientError::Daemon(_) | ClientError::Transport(_) => 2,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// A single status record that could not be decoded. The repository client
/// downgrades these to warnings and keeps the rest of the snapshot.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("unknown state: {0}")]
    UnknownState(String),

    #[error("bad lock flag: {0}")]
    BadLockFlag(String),

    #[error("bad number in uptime log: {0}")]
    BadNumber(String),

    #[error("uptime log has {0} fields, expected 11")]
    UplogArity(usize),
}
