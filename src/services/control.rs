use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::os::unix::net::UnixStream;

use crate::error::ClientError;
use crate::services::endpoint::{ConnectConfig, Endpoint};

/// Body of every successful daemon reply starts with this line.
pub const SUCCESS_MARKER: &str = "OK";

trait Wire: Read + Write {}
impl<T: Read + Write> Wire for T {}

fn open(cfg: &ConnectConfig) -> Result<Box<dyn Wire>, ClientError> {
    match &cfg.endpoint {
        Endpoint::Local(path) => {
            let stream = UnixStream::connect(path).map_err(|err| {
                ClientError::Transport(format!("cannot connect to {}: {}", path.display(), err))
            })?;
            Ok(Box::new(stream))
        }
        Endpoint::Remote { host, port } => {
            let stream = TcpStream::connect((host.as_str(), *port)).map_err(|err| {
                ClientError::Transport(format!("cannot connect to {host}:{port}: {err}"))
            })?;
            Ok(Box::new(stream))
        }
    }
}

/// One blocking control exchange: send `<target> <verb>` and collect the
/// reply. Action verbs answer with a single line; result-bearing verbs
/// (`multiline`) answer with a body terminated by the daemon closing the
/// connection.
///
/// Remote connections authenticate by sending the passphrase line first.
pub fn send_command(
    cfg: &ConnectConfig,
    target: &str,
    verb: &str,
    multiline: bool,
) -> Result<String, ClientError> {
    let mut stream = open(cfg)?;

    if let Endpoint::Remote { .. } = cfg.endpoint {
        if let Some(pass) = &cfg.passphrase {
            stream.write_all(pass.as_str().as_bytes())?;
            stream.write_all(b"\n")?;
        }
    }
    stream.write_all(format!("{target} {verb}\n").as_bytes())?;
    stream.flush()?;
    tracing::trace!(db = target, verb, multiline, "control request sent");

    let mut reader = BufReader::new(stream);
    if multiline {
        let mut body = String::new();
        reader.read_to_string(&mut body)?;
        if body.is_empty() {
            return Err(ClientError::Transport(
                "connection closed before a reply arrived".to_string(),
            ));
        }
        Ok(body)
    } else {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(ClientError::Transport(
                "connection closed before a reply arrived".to_string(),
            ));
        }
        Ok(line.trim_end_matches('\n').to_string())
    }
}
