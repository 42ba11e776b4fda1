//! CLI argument structs for all commands.

use crate::domain::ServiceId;
use clap::{Args, Parser};
use std::path::PathBuf;

/// Location of the snapshot listings
#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Directory holding edges.jsonl, milestones.jsonl, tasks.jsonl and plans.jsonl
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub snapshot: PathBuf,
}

/// Arguments for the `categorize` command
#[derive(Parser, Debug, Clone)]
pub struct CategorizeArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Write the basic and detailed audit reports into this directory
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Also list services whose computed plan differs from the stored one
    #[arg(long)]
    pub changes: bool,
}

/// Arguments for the `explain` command
#[derive(Parser, Debug, Clone)]
pub struct ExplainArgs {
    /// Service to explain (e.g. "ec2")
    #[arg(value_parser = validate_service)]
    pub service: ServiceId,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

/// Arguments for the `stats` command
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

/// Validate a service id: non-empty, no whitespace, no `:` (instance suffix).
fn validate_service(s: &str) -> Result<ServiceId, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Service cannot be empty".to_string());
    }
    if s.contains(':') {
        return Err(format!(
            "'{}' looks like an instance; pass the service id before ':'",
            s
        ));
    }
    if s.chars().any(char::is_whitespace) {
        return Err(format!("Service '{}' cannot contain whitespace", s));
    }
    Ok(ServiceId::new(s))
}
