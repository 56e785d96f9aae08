//! CLI argument parsing for the vecindario-import binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "vecindario-import", about = "Vecindario bulk CSV import tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Entity kind handled by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    /// Civic-issue reports
    Report,
    /// Report states
    State,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the downloadable CSV template for an entity kind
    Template {
        #[arg(long, value_enum)]
        entity: EntityKind,
        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Parse and validate a CSV file, printing per-row diagnostics
    Validate {
        #[arg(long, value_enum)]
        entity: EntityKind,
        /// Input CSV file
        #[arg(long)]
        file: PathBuf,
        /// Catalog JSON with category/state lookup tables (reports only)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Only show rows matching this text
        #[arg(long)]
        query: Option<String>,
    },
    /// Run a full import, appending committed records to a JSON-lines file
    Import {
        #[arg(long, value_enum)]
        entity: EntityKind,
        /// Input CSV file
        #[arg(long)]
        file: PathBuf,
        /// Catalog JSON with category/state lookup tables (reports only)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Destination JSON-lines file
        #[arg(long)]
        output: PathBuf,
        /// Confirm the batch even if rows carry warnings
        #[arg(long)]
        yes: bool,
        /// Override the pacing delay between rows
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}
