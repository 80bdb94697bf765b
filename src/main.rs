use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod domain;
mod error;
mod services;

use cli::{Cli, Commands};
use commands::lifecycle::PowerAction;
use domain::models::Passphrase;
use error::ClientError;
use services::endpoint::{self, ConnectConfig};
use services::render;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // clap's usage errors exit 2 by default; this tool reserves 2 for
    // transport failures, so remap argument problems to 1
    let mut cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(1);
        }
    };

    // commands that do not need monetdbd to be running
    match &cli.command {
        Commands::Help { command } => return commands::help(command.as_deref()),
        Commands::Version => return commands::version(),
        _ => {}
    }

    if let Err(err) = check_connection_flags(&cli) {
        eprintln!("monetdb: {err}");
        return ExitCode::from(err.exit_code());
    }

    let endpoint = match endpoint::resolve(cli.host.as_deref(), cli.port) {
        Ok(endpoint) => endpoint,
        Err(err) => {
            eprintln!("monetdb: {err}");
            return ExitCode::from(err.exit_code());
        }
    };
    // move the passphrase out of the parsed arguments right away
    let cfg = ConnectConfig {
        endpoint,
        passphrase: cli.passphrase.take().map(Passphrase::new),
        quiet: cli.quiet,
    };

    let term_width = render::terminal_width();

    match run(&cli, &cfg, term_width) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            match err.downcast_ref::<ClientError>() {
                Some(client) => ExitCode::from(client.exit_code()),
                None => ExitCode::from(2),
            }
        }
    }
}

/// A passphrase only makes sense against a TCP host, and a TCP host cannot
/// be spoken to without one.
fn check_connection_flags(cli: &Cli) -> Result<(), ClientError> {
    let host_is_path = cli.host.as_deref().map_or(true, |h| h.starts_with('/'));
    if cli.passphrase.is_some() && host_is_path {
        return Err(ClientError::Usage(
            "-P requires -h to be used with a TCP hostname".to_string(),
        ));
    }
    if !host_is_path && cli.passphrase.is_none() {
        return Err(ClientError::Usage(
            "-h requires -P to be used".to_string(),
        ));
    }
    Ok(())
}

fn run(cli: &Cli, cfg: &ConnectConfig, term_width: usize) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Commands::Create { databases } => commands::lifecycle::create(cfg, databases),
        Commands::Destroy { force, databases } => {
            commands::lifecycle::destroy(cfg, *force, databases)
        }
        Commands::Lock { databases } => commands::lifecycle::lock(cfg, databases),
        Commands::Release { databases } => commands::lifecycle::release(cfg, databases),
        Commands::Status {
            long,
            crash,
            states,
            databases,
        } => commands::status::status(cfg, *long, *crash, states.as_deref(), databases, term_width),
        Commands::Start { all, databases } => {
            commands::lifecycle::power(cfg, PowerAction::Start, *all, databases)
        }
        Commands::Stop { all, databases } => {
            commands::lifecycle::power(cfg, PowerAction::Stop, *all, databases)
        }
        Commands::Kill { all, databases } => {
            commands::lifecycle::power(cfg, PowerAction::Kill, *all, databases)
        }
        Commands::Set {
            property,
            databases,
        } => commands::props::set(cfg, property, databases),
        Commands::Get {
            properties,
            databases,
        } => commands::props::get(cfg, properties, databases, term_width),
        Commands::Inherit {
            property,
            databases,
        } => commands::props::inherit(cfg, property, databases),
        Commands::Discover { expression } => {
            commands::status::discover(cfg, expression.as_deref(), term_width)
        }
        Commands::Help { .. } | Commands::Version => {
            unreachable!("handled before endpoint resolution")
        }
    }
}
