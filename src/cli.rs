use clap::{ArgAction, CommandFactory, Parser, Subcommand};

// The automatic `-h` short flag is disabled at the top level so `-h` can be
// the host flag; `--help` and the `help` command remain.
#[derive(Parser, Debug)]
#[command(
    name = "monetdb",
    version,
    about = "MonetDB Database Server administration toolkit",
    disable_help_flag = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Suppress status output
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Hostname to contact, or a socket directory when it is a path
    #[arg(short = 'h', long = "host")]
    pub host: Option<String>,

    /// Port to contact
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Passphrase to login at a remote monetdbd
    #[arg(
        short = 'P',
        long = "passphrase",
        env = "MONETDB_PASSPHRASE",
        hide_env_values = true
    )]
    pub passphrase: Option<String>,

    /// Print help
    #[arg(long, action = ArgAction::Help, global = true)]
    help: Option<bool>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialise a new database, available for use in maintenance mode
    Create {
        /// Database name(s) to create
        #[arg(required = true)]
        databases: Vec<String>,
    },
    /// Remove a database, including all its data and logfiles
    Destroy {
        /// Do not ask for confirmation, destroy right away
        #[arg(short = 'f')]
        force: bool,
        /// Database(s) to destroy
        #[arg(required = true)]
        databases: Vec<String>,
    },
    /// Put a database under maintenance, only the DBA can connect
    Lock {
        /// Database(s) to lock
        #[arg(required = true)]
        databases: Vec<String>,
    },
    /// Bring a database back from maintenance mode
    Release {
        /// Database(s) to release
        #[arg(required = true)]
        databases: Vec<String>,
    },
    /// Show the state of databases matching a glob-style expression
    Status {
        /// Extended information listing
        #[arg(short = 'l', conflicts_with = "crash")]
        long: bool,
        /// Crash statistics listing
        #[arg(short = 'c')]
        crash: bool,
        /// Only show databases matching a state, combination possible
        /// from r (running), s (stopped), c (crashed) and l (locked)
        #[arg(short = 's', value_name = "states")]
        states: Option<String>,
        /// Glob-style database expressions
        databases: Vec<String>,
    },
    /// Start the given database
    Start {
        /// Start all known databases
        #[arg(short = 'a')]
        all: bool,
        /// Database(s) to start
        databases: Vec<String>,
    },
    /// Stop the given database
    Stop {
        /// Stop all known databases
        #[arg(short = 'a')]
        all: bool,
        /// Database(s) to stop
        databases: Vec<String>,
    },
    /// Kill the given database; a last resort that may lose data
    Kill {
        /// Kill all known databases
        #[arg(short = 'a')]
        all: bool,
        /// Database(s) to kill
        databases: Vec<String>,
    },
    /// Set a property to a value for the given database
    Set {
        /// property=value pair to set
        property: String,
        /// Database(s) to set the property on
        #[arg(required = true)]
        databases: Vec<String>,
    },
    /// Get value(s) for properties, or "all" for every known property
    Get {
        /// "all" or a comma-separated property list
        properties: String,
        /// Database(s) to inspect, all when omitted
        databases: Vec<String>,
    },
    /// Unset a property, reverting to its inherited default value
    Inherit {
        /// Property to revert
        property: String,
        /// Database(s) to revert the property on
        #[arg(required = true)]
        databases: Vec<String>,
    },
    /// List the remote databases discovered by the server
    Discover {
        /// Limited glob-style expression to match locations against
        expression: Option<String>,
    },
    /// Show help for a particular command
    Help {
        /// Command to describe
        command: Option<String>,
    },
    /// Print the version of this monetdb utility
    Version,
}

/// Render the usage text of one subcommand; false when no such command.
pub fn print_usage(name: &str) -> bool {
    let mut cmd = Cli::command();
    match cmd.find_subcommand_mut(name) {
        Some(sub) => {
            let _ = sub.print_help();
            true
        }
        None => false,
    }
}

pub fn print_top_usage() {
    let _ = Cli::command().print_help();
}
