use std::io::{self, Write};

use crate::error::ClientError;
use crate::services::control::{self, SUCCESS_MARKER};
use crate::services::endpoint::ConnectConfig;

/// What a batch dispatch amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Every target answered with the success marker.
    Clean,
    /// At least one target answered with an application-level failure.
    Failed,
}

impl DispatchOutcome {
    pub fn exit_code(self) -> std::process::ExitCode {
        match self {
            DispatchOutcome::Clean => std::process::ExitCode::SUCCESS,
            DispatchOutcome::Failed => std::process::ExitCode::from(1),
        }
    }
}

/// How per-target results are reported.
pub struct Feedback<'a> {
    success: Option<&'a str>,
    progress: Option<&'a str>,
}

impl<'a> Feedback<'a> {
    /// Print `"<msg>: <name>"` after each successful target.
    pub fn success(msg: &'a str) -> Self {
        Feedback {
            success: Some(msg),
            progress: None,
        }
    }

    /// Print `"<action> '<name>'... "` before each request and
    /// `done`/`FAILED` after.
    pub fn progress(action: &'a str) -> Self {
        Feedback {
            success: None,
            progress: Some(action),
        }
    }

    /// No success output at all; failures are still reported.
    pub fn silent() -> Self {
        Feedback {
            success: None,
            progress: None,
        }
    }
}

/// Issue `verb` for each target in order, one blocking request at a time.
///
/// An application-level failure (any body other than the success marker) is
/// printed and accumulated; the batch continues. A transport failure aborts
/// the batch immediately: remaining targets are never attempted. Quiet mode
/// suppresses success and progress text, never failures.
pub fn dispatch(
    cfg: &ConnectConfig,
    cmd: &str,
    targets: &[String],
    verb: &str,
    feedback: &Feedback,
) -> Result<DispatchOutcome, ClientError> {
    let mut failed = false;
    for name in targets {
        if let Some(action) = feedback.progress {
            if !cfg.quiet {
                print!("{action} '{name}'... ");
                let _ = io::stdout().flush();
            }
        }

        let reply = match control::send_command(cfg, name, verb, false) {
            Ok(reply) => reply,
            Err(err) => {
                if feedback.progress.is_some() && !cfg.quiet {
                    println!("FAILED");
                }
                return Err(ClientError::Transport(format!(
                    "{cmd}: failed to perform command: {err}"
                )));
            }
        };

        if reply == SUCCESS_MARKER {
            if !cfg.quiet {
                if feedback.progress.is_some() {
                    println!("done");
                } else if let Some(msg) = feedback.success {
                    println!("{msg}: {name}");
                }
            }
        } else {
            if feedback.progress.is_some() && !cfg.quiet {
                println!("FAILED");
            }
            eprintln!("{cmd}: {reply}");
            failed = true;
        }
    }

    Ok(if failed {
        DispatchOutcome::Failed
    } else {
        DispatchOutcome::Clean
    })
}
