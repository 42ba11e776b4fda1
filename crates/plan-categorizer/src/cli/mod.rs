//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface using clap's derive API.
//!
//! # Commands
//!
//! - `categorize`: classify every service of a snapshot
//! - `explain`: show the audit trail of one service
//! - `stats`: describe the dependency graph built from a snapshot
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--config <path>`: YAML configuration file
//!
//! # Example
//!
//! ```bash
//! plan-categorizer categorize --snapshot ./snapshot --report-dir ./reports --changes
//! plan-categorizer explain ec2 --snapshot ./snapshot
//! plan-categorizer --json stats --snapshot ./snapshot
//! ```

mod args;
mod execute;

pub use args::{CategorizeArgs, ExplainArgs, SnapshotArgs, StatsArgs};

use crate::output::OutputMode;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Classify internal services into launch-readiness plans
///
/// Builds the milestone/task dependency graph from a snapshot and walks it
/// outward from each service's own milestones and tasks.
#[derive(Parser, Debug)]
#[command(name = "plan-categorizer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// YAML configuration file (sentinel arns, service allowlist, report layout)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Classify every service in a snapshot
    ///
    /// Prints one line per classified service and per-plan totals. With
    /// `--report-dir`, also writes the basic and detailed audit reports.
    Categorize(CategorizeArgs),

    /// Show how one service was classified
    ///
    /// Runs the whole batch, so categories found for other services are
    /// taken into account, then prints the service's audit trail.
    Explain(ExplainArgs),

    /// Show dependency graph statistics
    Stats(StatsArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Execute the parsed command
    pub async fn execute(&self) -> Result<()> {
        let mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };
        let config_path = self.config.as_deref();

        match &self.command {
            Commands::Categorize(args) => execute::execute_categorize(args, config_path, mode).await,
            Commands::Explain(args) => execute::execute_explain(args, config_path, mode).await,
            Commands::Stats(args) => execute::execute_stats(args, config_path, mode).await,
        }
    }
}
