//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

use super::args::{CategorizeArgs, ExplainArgs, SnapshotArgs, StatsArgs};
use crate::app::App;
use crate::changes::{PlanChange, plan_changes};
use crate::domain::{ProvenanceRecord, ServiceId, ServicePlan};
use crate::error::Error;
use crate::ingest::DirectorySource;
use crate::output::{self, OutputConfig, OutputMode};
use crate::report::{ReportFiles, build_reports, write_reports};

/// JSON document printed by `categorize --json`
#[derive(Debug, Serialize)]
struct CategorizeOutput<'a> {
    generated_at: DateTime<Utc>,
    categories: BTreeMap<&'a ServiceId, ServicePlan>,
    paths: &'a BTreeMap<ServiceId, Vec<ProvenanceRecord>>,
    totals: BTreeMap<ServicePlan, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    changes: Option<Vec<PlanChange>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reports: Option<ReportPaths>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ReportPaths {
    basic: String,
    detailed: String,
}

impl From<&ReportFiles> for ReportPaths {
    fn from(files: &ReportFiles) -> Self {
        Self {
            basic: files.basic.display().to_string(),
            detailed: files.detailed.display().to_string(),
        }
    }
}

async fn load_app(snapshot: &SnapshotArgs, config_path: Option<&Path>) -> Result<App> {
    let source = DirectorySource::new(&snapshot.snapshot);
    Ok(App::load(&source, config_path).await?)
}

fn print_warnings(messages: &[String], config: &OutputConfig) {
    for message in messages {
        if config.use_colors {
            eprintln!("{} {}", "warning:".yellow().bold(), message);
        } else {
            eprintln!("warning: {}", message);
        }
    }
}

/// Execute the categorize command
pub async fn execute_categorize(
    args: &CategorizeArgs,
    config_path: Option<&Path>,
    output_mode: OutputMode,
) -> Result<()> {
    let app = load_app(&args.snapshot, config_path).await?;
    let caches = app.run();

    let report_files = match &args.report_dir {
        Some(dir) => {
            let reports =
                build_reports(&caches, &app.inputs().service_to_own_arns, &app.config().report);
            Some(write_reports(dir, &reports).await?)
        }
        None => None,
    };

    let changes = args
        .changes
        .then(|| plan_changes(&app.inputs().service_plan_of, &caches));

    match output_mode {
        OutputMode::Json => {
            let categories = caches
                .paths()
                .keys()
                .map(|service| {
                    let plan = caches.category_of(service.as_str()).unwrap_or_default();
                    (service, plan)
                })
                .collect();
            output::print_json(&CategorizeOutput {
                generated_at: Utc::now(),
                categories,
                paths: caches.paths(),
                totals: caches.plan_counts(),
                changes,
                reports: report_files.as_ref().map(ReportPaths::from),
                warnings: app.warning_messages(),
            })?;
        }
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            print_warnings(&app.warning_messages(), &config);

            let stdout = io::stdout();
            let mut out = stdout.lock();
            output::write_summary(&mut out, &caches, &config)?;

            if let Some(changes) = &changes {
                writeln!(out)?;
                if changes.is_empty() {
                    writeln!(out, "No plan changes.")?;
                } else {
                    writeln!(out, "Plan changes ({}):", changes.len())?;
                    for change in changes {
                        writeln!(
                            out,
                            "  {}: {} -> {}",
                            change.service,
                            change.previous.map_or("(none)", ServicePlan::as_token),
                            output::colorize_plan(change.computed, &config)
                        )?;
                    }
                }
            }

            if let Some(files) = &report_files {
                writeln!(out)?;
                writeln!(out, "Reports:")?;
                writeln!(out, "  {}", files.basic.display())?;
                writeln!(out, "  {}", files.detailed.display())?;
            }
        }
    }

    Ok(())
}

/// Execute the explain command
pub async fn execute_explain(
    args: &ExplainArgs,
    config_path: Option<&Path>,
    output_mode: OutputMode,
) -> Result<()> {
    let app = load_app(&args.snapshot, config_path).await?;
    let caches = app.run();

    let path = caches
        .path_of(args.service.as_str())
        .ok_or_else(|| Error::ServiceNotFound(args.service.to_string()))?;
    let plan = caches.category_of(args.service.as_str()).unwrap_or_default();

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "service": args.service,
                "plan": plan,
                "own_arns": app.inputs().service_to_own_arns.get(&args.service),
                "path": path,
            }))?;
        }
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            let stdout = io::stdout();
            let mut out = stdout.lock();
            output::write_trail(&mut out, &args.service, plan, path, &config)?;
        }
    }

    Ok(())
}

/// Execute the stats command
pub async fn execute_stats(
    args: &StatsArgs,
    config_path: Option<&Path>,
    output_mode: OutputMode,
) -> Result<()> {
    let app = load_app(&args.snapshot, config_path).await?;
    let graph = app.graph();
    let inputs = app.inputs();

    let nodes = graph.node_count();
    let edges = graph.edge_count();
    let dropped = app.build_warnings().len();
    let services = inputs.service_to_own_arns.len();
    let has_cycle = graph.has_cycle();

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "nodes": nodes,
                "edges": edges,
                "dropped_edges": dropped,
                "known_milestones_tasks": inputs.known_nodes.len(),
                "services": services,
                "has_cycle": has_cycle,
                "warnings": app.ingest_warnings().len(),
            }))?;
        }
        OutputMode::Text => {
            println!("Dependency Graph");
            println!("================");
            println!();
            println!("Nodes:            {}", nodes);
            println!("Edges:            {}", edges);
            println!("Dropped edges:    {}", dropped);
            println!("Known nodes:      {}", inputs.known_nodes.len());
            println!("Services:         {}", services);
            println!("Has cycle:        {}", if has_cycle { "yes" } else { "no" });
            if !app.ingest_warnings().is_empty() {
                println!("Ingest warnings:  {}", app.ingest_warnings().len());
            }
        }
    }

    Ok(())
}
