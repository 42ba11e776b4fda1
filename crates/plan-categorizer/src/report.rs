//! Audit report rows built from a finished run.
//!
//! Two flavors are produced per classified service: a basic row listing the
//! successor services seen on the way to the categorization, and a detailed
//! row with one tuple per visited successor. Both are written as JSONL.

use crate::config::ReportConfig;
use crate::domain::{Arn, ProvenanceRecord, ServiceId};
use crate::engine::RunCaches;
use crate::error::Result;
use plan_jsonl::write_jsonl_atomic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of the basic report.
pub const BASIC_REPORT_FILE: &str = "basic_categorization_paths.jsonl";

/// File name of the detailed report.
pub const DETAILED_REPORT_FILE: &str = "detailed_categorization_paths.jsonl";

/// One service with the successor services seen while classifying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicRow {
    /// The classified service
    pub internal_service: ServiceId,
    /// Store label of the final plan
    pub plan_categorization: String,
    /// Successor services in visit order
    pub successor_services_seen: String,
}

/// One service with every hop of its audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedRow {
    /// The classified service
    pub internal_service: ServiceId,
    /// Store label of the final plan
    pub plan_categorization: String,
    /// The service's own milestones/tasks, one per line
    pub associated_milestones_tasks: String,
    /// `(name, arn, service, plan, predecessor)` per hop, blank-line separated
    pub successors: String,
}

/// Both report flavors, ordered by service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reports {
    /// Basic rows
    pub basic: Vec<BasicRow>,
    /// Detailed rows
    pub detailed: Vec<DetailedRow>,
}

/// Where [`write_reports`] put the two files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    /// Basic report path
    pub basic: PathBuf,
    /// Detailed report path
    pub detailed: PathBuf,
}

/// Build report rows for every service classified in `caches`.
pub fn build_reports(
    caches: &RunCaches,
    service_to_own_arns: &BTreeMap<ServiceId, Vec<Arn>>,
    config: &ReportConfig,
) -> Reports {
    let mut reports = Reports::default();

    for (service, path) in caches.paths() {
        let plan = caches
            .category_of(service.as_str())
            .unwrap_or_default()
            .label()
            .to_string();
        let own_arns = service_to_own_arns
            .get(service)
            .map(|arns| join_arns(arns))
            .unwrap_or_default();

        reports.basic.push(BasicRow {
            internal_service: service.clone(),
            plan_categorization: plan.clone(),
            successor_services_seen: successor_services(path, config.services_per_line),
        });
        reports.detailed.push(DetailedRow {
            internal_service: service.clone(),
            plan_categorization: plan,
            associated_milestones_tasks: own_arns,
            successors: successor_details(path),
        });
    }

    reports
}

/// Write both report files into `dir`, creating it if needed.
pub async fn write_reports(dir: &Path, reports: &Reports) -> Result<ReportFiles> {
    tokio::fs::create_dir_all(dir).await?;

    let files = ReportFiles {
        basic: dir.join(BASIC_REPORT_FILE),
        detailed: dir.join(DETAILED_REPORT_FILE),
    };
    write_jsonl_atomic(&files.basic, &reports.basic).await?;
    write_jsonl_atomic(&files.detailed, &reports.detailed).await?;

    tracing::info!(dir = %dir.display(), rows = reports.basic.len(), "Wrote categorization reports");
    Ok(files)
}

fn join_arns(arns: &[Arn]) -> String {
    arns.iter().map(Arn::as_str).collect::<Vec<_>>().join("\n")
}

/// Successor services joined with `", "`, `per_line` to a line.
fn successor_services(path: &[ProvenanceRecord], per_line: usize) -> String {
    let services: Vec<&str> = path
        .iter()
        .map(|hop| hop.node.service().map_or("", ServiceId::as_str))
        .collect();
    services
        .chunks(per_line.max(1))
        .map(|line| line.join(", "))
        .collect::<Vec<_>>()
        .join("\n")
}

fn successor_details(path: &[ProvenanceRecord]) -> String {
    path.iter()
        .map(|hop| {
            format!(
                "({}, {}, {}, {}, {})",
                hop.node.name(),
                hop.node.arn,
                hop.node.service().map_or("", ServiceId::as_str),
                hop.category.label(),
                hop.predecessor
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
