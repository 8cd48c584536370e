//! Command-line arguments of the `gatepass` binary.
//!
//! ```bash
//! # Dashboard counters until Ctrl+C
//! gatepass
//!
//! # Today's visitors as CSV
//! gatepass export --today > today.csv
//!
//! # Audit log of a copied database
//! gatepass --db ./kiosk-backup.db logs
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "gatepass",
    version,
    about = "Inspect and export a gate kiosk's local store"
)]
pub struct Cli {
    /// Database file (defaults to the platform data directory).
    #[arg(long, global = true, env = "GATEPASS_DB_PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print dashboard counters until Ctrl+C (default).
    Stats,

    /// List visitors on the premises.
    Active,

    /// Write the visitor CSV to stdout.
    Export {
        /// Only visitors checked in since local midnight.
        #[arg(long)]
        today: bool,
    },

    /// Print today's pass index as CSV.
    Summary,

    /// Print the audit log, newest first.
    Logs,
}

impl Cli {
    pub fn selected(&self) -> Command {
        self.command.clone().unwrap_or(Command::Stats)
    }
}
