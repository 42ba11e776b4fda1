//! Snapshot ingestion: the collaborator that feeds the graph builder.
//!
//! A run starts from a point-in-time snapshot of four listings: dependency
//! edges, milestones, tasks, and the categorization records of the store
//! of record. The listings are fetched concurrently through a
//! [`SnapshotSource`] and joined before anything else happens. They are
//! then turned into the plain maps the graph builder and batch driver
//! consume ([`Inputs`]).
//!
//! Bad rows never abort a run: they are skipped and returned as
//! [`IngestWarning`]s.

use crate::domain::{Arn, NodeRecord, RawEdge, ServiceId, ServicePlan};
use crate::error::{Error, Result};
use async_trait::async_trait;
use plan_jsonl::{Warning as JsonlWarning, read_jsonl_resilient};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Records of one listing together with the lines that were skipped.
pub type Fetched<T> = (Vec<T>, Vec<JsonlWarning>);

/// The listings that make up a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Listing {
    /// Predecessor -> successor edges
    Edges,
    /// Milestone records
    Milestones,
    /// Task records
    Tasks,
    /// Categorization records
    Plans,
}

impl Listing {
    /// File name of this listing inside a snapshot directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Edges => "edges.jsonl",
            Self::Milestones => "milestones.jsonl",
            Self::Tasks => "tasks.jsonl",
            Self::Plans => "plans.jsonl",
        }
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Edges => "edges",
            Self::Milestones => "milestones",
            Self::Tasks => "tasks",
            Self::Plans => "plans",
        };
        write!(f, "{name}")
    }
}

/// A categorization record from the store of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRecord {
    /// Service instance, e.g. `ec2:v0`
    pub instance: String,

    /// Plan label; empty when the service has no plan
    #[serde(default)]
    pub plan: String,
}

impl PlanRecord {
    /// The service id of the instance: the text before the first `:`.
    pub fn service_id(&self) -> ServiceId {
        let id = self
            .instance
            .split_once(':')
            .map_or(self.instance.as_str(), |(id, _)| id);
        ServiceId::new(id)
    }
}

/// Non-fatal problems found while ingesting a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestWarning {
    /// A listing line could not be decoded and was skipped
    Jsonl {
        /// The listing the line belongs to
        listing: Listing,
        /// What was wrong with the line
        warning: JsonlWarning,
    },

    /// A categorization record carries a label that is not a known plan.
    ///
    /// **Effect**: the record is skipped; the service defaults to
    /// `UNCATEGORIZED`.
    UnknownPlan {
        /// The record's instance
        instance: String,
        /// The unrecognised label
        plan: String,
    },

    /// Two milestone/task records share an arn.
    ///
    /// **Effect**: the last record is kept, so a task replaces a milestone
    /// listed under the same arn.
    DuplicateArn {
        /// The repeated arn
        arn: Arn,
    },
}

impl fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jsonl { listing, warning } => write!(f, "{listing}: {warning}"),
            Self::UnknownPlan { instance, plan } => {
                write!(f, "plans: unknown plan {plan:?} for {instance}")
            }
            Self::DuplicateArn { arn } => write!(f, "milestones/tasks: duplicate arn {arn}"),
        }
    }
}

/// Provides the four listings of a snapshot.
///
/// Implementations are called concurrently by [`load_snapshot`]; each call
/// owns its result.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the edge listing
    async fn edges(&self) -> Result<Fetched<RawEdge>>;

    /// Fetch the milestone listing
    async fn milestones(&self) -> Result<Fetched<NodeRecord>>;

    /// Fetch the task listing
    async fn tasks(&self) -> Result<Fetched<NodeRecord>>;

    /// Fetch the categorization records
    async fn plans(&self) -> Result<Fetched<PlanRecord>>;
}

/// A snapshot stored as JSONL files in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Read listings from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The snapshot directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read<T>(&self, listing: Listing) -> Result<Fetched<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let path = self.root.join(listing.file_name());
        read_jsonl_resilient(&path).await.map_err(|e| match e {
            plan_jsonl::Error::Io(io_err) => Error::Io(io::Error::new(
                io_err.kind(),
                format!("{}: {}", path.display(), io_err),
            )),
            other => Error::Jsonl(other),
        })
    }
}

#[async_trait]
impl SnapshotSource for DirectorySource {
    async fn edges(&self) -> Result<Fetched<RawEdge>> {
        self.read(Listing::Edges).await
    }

    async fn milestones(&self) -> Result<Fetched<NodeRecord>> {
        self.read(Listing::Milestones).await
    }

    async fn tasks(&self) -> Result<Fetched<NodeRecord>> {
        self.read(Listing::Tasks).await
    }

    async fn plans(&self) -> Result<Fetched<PlanRecord>> {
        self.read(Listing::Plans).await
    }
}

/// The raw listings of one run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Edge listing
    pub edges: Vec<RawEdge>,
    /// Milestones followed by tasks, in listing order
    pub nodes: Vec<NodeRecord>,
    /// Categorization records
    pub plans: Vec<PlanRecord>,
}

/// Everything the graph builder and batch driver consume.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    /// Edge listing, unfiltered
    pub edges: Vec<RawEdge>,
    /// Milestones and tasks by arn
    pub known_nodes: HashMap<Arn, NodeRecord>,
    /// Current plan per service
    pub service_plan_of: HashMap<ServiceId, ServicePlan>,
    /// Own milestones/tasks of every service to classify, ordered by service
    pub service_to_own_arns: BTreeMap<ServiceId, Vec<Arn>>,
}

/// Fetch all four listings concurrently and wait for every one of them.
///
/// # Errors
///
/// Fails if any listing cannot be fetched; skipped lines are warnings.
pub async fn load_snapshot(source: &dyn SnapshotSource) -> Result<(Snapshot, Vec<IngestWarning>)> {
    let ((edges, edge_warnings), (milestones, milestone_warnings), (tasks, task_warnings), (plans, plan_warnings)) =
        tokio::try_join!(source.edges(), source.milestones(), source.tasks(), source.plans())?;

    let mut warnings = Vec::new();
    for (listing, skipped) in [
        (Listing::Edges, edge_warnings),
        (Listing::Milestones, milestone_warnings),
        (Listing::Tasks, task_warnings),
        (Listing::Plans, plan_warnings),
    ] {
        if !skipped.is_empty() {
            tracing::warn!(%listing, skipped = skipped.len(), "Skipped undecodable lines");
        }
        warnings.extend(
            skipped
                .into_iter()
                .map(|warning| IngestWarning::Jsonl { listing, warning }),
        );
    }

    let mut nodes = milestones;
    nodes.extend(tasks);

    tracing::info!(
        edges = edges.len(),
        nodes = nodes.len(),
        plans = plans.len(),
        "Loaded snapshot"
    );

    Ok((
        Snapshot {
            edges,
            nodes,
            plans,
        },
        warnings,
    ))
}

impl Snapshot {
    /// Derive the engine inputs, restricting classification to `filter`.
    pub fn into_inputs(self, filter: Option<&HashSet<ServiceId>>) -> (Inputs, Vec<IngestWarning>) {
        let mut warnings = Vec::new();
        let service_to_own_arns = service_to_own_arns(&self.nodes, filter);
        let known_nodes = known_nodes(self.nodes, &mut warnings);
        let service_plan_of = service_plans(&self.plans, &mut warnings);

        (
            Inputs {
                edges: self.edges,
                known_nodes,
                service_plan_of,
                service_to_own_arns,
            },
            warnings,
        )
    }
}

/// Index records by arn. The last record of a repeated arn wins.
pub fn known_nodes(
    nodes: Vec<NodeRecord>,
    warnings: &mut Vec<IngestWarning>,
) -> HashMap<Arn, NodeRecord> {
    let mut by_arn = HashMap::with_capacity(nodes.len());
    for node in nodes {
        let arn = node.arn.clone();
        if by_arn.insert(arn.clone(), node).is_some() {
            warnings.push(IngestWarning::DuplicateArn { arn });
        }
    }
    by_arn
}

/// Current plan per service. A later record for the same service wins.
pub fn service_plans(
    records: &[PlanRecord],
    warnings: &mut Vec<IngestWarning>,
) -> HashMap<ServiceId, ServicePlan> {
    let mut plans = HashMap::with_capacity(records.len());
    for record in records {
        match record.plan.parse::<ServicePlan>() {
            Ok(plan) => {
                plans.insert(record.service_id(), plan);
            }
            Err(_) => {
                tracing::warn!(instance = %record.instance, plan = %record.plan, "Unknown service plan");
                warnings.push(IngestWarning::UnknownPlan {
                    instance: record.instance.clone(),
                    plan: record.plan.clone(),
                });
            }
        }
    }
    plans
}

/// Group milestones/tasks by owning service, in listing order.
///
/// Records without a service cannot be classified and are skipped.
pub fn service_to_own_arns(
    nodes: &[NodeRecord],
    filter: Option<&HashSet<ServiceId>>,
) -> BTreeMap<ServiceId, Vec<Arn>> {
    let mut by_service: BTreeMap<ServiceId, Vec<Arn>> = BTreeMap::new();
    for node in nodes {
        let Some(service) = node.service() else {
            tracing::info!(arn = %node.arn, "Object has no associated service");
            continue;
        };
        if filter.is_some_and(|allowed| !allowed.contains(service)) {
            continue;
        }
        by_service
            .entry(service.clone())
            .or_default()
            .push(node.arn.clone());
    }
    by_service
}
