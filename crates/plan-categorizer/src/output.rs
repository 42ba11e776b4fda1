//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or pretty JSON for
//! programmatic use. Text writers take any [`Write`] so they can be tested
//! against a buffer.

use crate::domain::{ProvenanceRecord, ServiceId, ServicePlan};
use crate::engine::RunCaches;
use colored::Colorize;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Configuration for text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Colors are disabled by `NO_COLOR` (any value) or by
    /// `PLAN_CATEGORIZER_COLOR` set to `0` or `false`.
    pub fn from_env() -> Self {
        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("PLAN_CATEGORIZER_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self { use_colors }
    }

    /// Plain text output with no colors
    pub fn plain() -> Self {
        Self { use_colors: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Print a value as pretty JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{}", json)
}

/// Apply the plan's semantic color.
///
/// Launch blocking is red, mandatory yellow, non-global cyan, and
/// uncategorized dimmed.
pub fn colorize_plan(plan: ServicePlan, config: &OutputConfig) -> String {
    let text = plan.as_token();
    if !config.use_colors {
        return text.to_string();
    }
    match plan {
        ServicePlan::LaunchBlocking => text.red().bold().to_string(),
        ServicePlan::Mandatory => text.yellow().to_string(),
        ServicePlan::NonGlobal => text.cyan().to_string(),
        ServicePlan::Uncategorized => text.dimmed().to_string(),
    }
}

fn bold(text: &str, config: &OutputConfig) -> String {
    if config.use_colors {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Write one line per classified service followed by per-plan totals.
pub fn write_summary<W: Write>(w: &mut W, caches: &RunCaches, config: &OutputConfig) -> io::Result<()> {
    let width = caches
        .paths()
        .keys()
        .map(|service| service.as_str().len())
        .max()
        .unwrap_or(0);

    for (service, path) in caches.paths() {
        let plan = caches.category_of(service.as_str()).unwrap_or_default();
        writeln!(
            w,
            "{:<width$}  {}  ({} hops)",
            service.as_str(),
            colorize_plan(plan, config),
            path.len()
        )?;
    }

    writeln!(w)?;
    writeln!(w, "{}", bold("Totals:", config))?;
    let counts = caches.plan_counts();
    for plan in ServicePlan::ALL {
        writeln!(
            w,
            "  {}: {}",
            colorize_plan(plan, config),
            counts.get(&plan).copied().unwrap_or(0)
        )?;
    }
    Ok(())
}

/// Write the final plan and audit trail of one service.
pub fn write_trail<W: Write>(
    w: &mut W,
    service: &ServiceId,
    plan: ServicePlan,
    path: &[ProvenanceRecord],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{} {}", bold(service.as_str(), config), colorize_plan(plan, config))?;
    if path.is_empty() {
        writeln!(w, "  no categorizing successors found")?;
        return Ok(());
    }
    for (index, hop) in path.iter().enumerate() {
        writeln!(
            w,
            "  {}. {} [{}] service={} plan={} via {}",
            index + 1,
            hop.node.name(),
            hop.node.arn,
            hop.node.service().map_or("-", ServiceId::as_str),
            colorize_plan(hop.category, config),
            hop.predecessor
        )?;
    }
    Ok(())
}
