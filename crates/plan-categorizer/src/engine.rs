//! Breadth-first categorization of a single service.
//!
//! A service is classified by walking the dependency graph outward from its
//! own milestones/tasks, one BFS level at a time, until a categorizing
//! signal settles the answer:
//!
//! 1. Reaching the launch-blocking sentinel, or any successor whose service
//!    resolves to [`ServicePlan::LaunchBlocking`], ends the walk at once.
//! 2. The mandatory sentinel, or a `Mandatory` successor, makes the running
//!    category `Mandatory`. The sentinel's own service, if it has one, is
//!    still evaluated. The walk continues because a later successor
//!    may still be launch blocking.
//! 3. A `NonGlobal` successor makes the running category `NonGlobal`
//!    unless it is already `Mandatory`.
//!
//! Signals are read per edge: a successor reached from several
//! predecessors is evaluated, and recorded, once for each of them. A
//! service's own tasks that depend on each other therefore read the
//! service's own current category.
//!
//! When the frontier is exhausted the running category (default
//! `Uncategorized`) becomes the service's plan.
//!
//! # Memoization
//!
//! [`RunCaches`] is shared by every traversal of a batch run. A successor's
//! category is read from the cache before falling back to the plan baked
//! into its node, and the first category seen for a successor service is
//! recorded for later traversals.

use crate::domain::{Arn, Node, NodeRecord, ProvenanceRecord, ServiceId, ServicePlan};
use crate::graph::DependencyGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Default arn of the milestone that marks a dependency as launch blocking.
pub const DEFAULT_LAUNCH_BLOCKING_ARN: &str =
    "arn:aws:rmsv2:::milestone/26ab1cff-e0b3-49d8-82a4-efd6e5e2b677";

/// Default arn of the milestone that marks a dependency as mandatory.
pub const DEFAULT_MANDATORY_ARN: &str =
    "arn:aws:rmsv2:::milestone/b05fdb54-ff54-44e9-9549-9085402268ed";

/// The two well-known milestones that categorize whatever reaches them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Sentinels {
    /// Reaching this arn makes a service launch blocking
    pub launch_blocking: Arn,

    /// Reaching this arn makes a service at least mandatory
    pub mandatory: Arn,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            launch_blocking: Arn::new(DEFAULT_LAUNCH_BLOCKING_ARN),
            mandatory: Arn::new(DEFAULT_MANDATORY_ARN),
        }
    }
}

/// Caches shared by every traversal of one batch run.
///
/// Create a fresh instance per run; nothing here outlives the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunCaches {
    /// Most up-to-date category known for every service seen so far.
    category_of: BTreeMap<ServiceId, ServicePlan>,

    /// Audit trail per classified service, in visit order.
    path_of: BTreeMap<ServiceId, Vec<ProvenanceRecord>>,
}

impl RunCaches {
    /// Create empty caches
    pub fn new() -> Self {
        Self::default()
    }

    /// The category currently known for `service`.
    pub fn category_of(&self, service: &str) -> Option<ServicePlan> {
        self.category_of.get(service).copied()
    }

    /// The audit trail of `service`, if it has been classified.
    ///
    /// A classified service with no evidence has an empty trail, which is
    /// distinct from `None`.
    pub fn path_of(&self, service: &str) -> Option<&[ProvenanceRecord]> {
        self.path_of.get(service).map(Vec::as_slice)
    }

    /// Every known category, ordered by service.
    pub fn categories(&self) -> &BTreeMap<ServiceId, ServicePlan> {
        &self.category_of
    }

    /// Every audit trail, ordered by service.
    pub fn paths(&self) -> &BTreeMap<ServiceId, Vec<ProvenanceRecord>> {
        &self.path_of
    }

    /// Split into `(category_of, path_of)`.
    pub fn into_parts(
        self,
    ) -> (
        BTreeMap<ServiceId, ServicePlan>,
        BTreeMap<ServiceId, Vec<ProvenanceRecord>>,
    ) {
        (self.category_of, self.path_of)
    }

    /// Number of classified services per final plan.
    ///
    /// Only services with an audit trail count; services merely seen as
    /// successors are not classified.
    pub fn plan_counts(&self) -> BTreeMap<ServicePlan, usize> {
        let mut counts = BTreeMap::new();
        for service in self.path_of.keys() {
            if let Some(plan) = self.category_of(service.as_str()) {
                *counts.entry(plan).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Record the outcome of classifying `service`.
    ///
    /// A `LaunchBlocking` category is never downgraded within a run.
    fn assign(&mut self, service: &ServiceId, plan: ServicePlan) {
        let current = self.category_of.entry(service.clone()).or_insert(plan);
        if *current != ServicePlan::LaunchBlocking {
            *current = plan;
        }
    }

    /// Record `plan` for a successor service unless one is already known.
    fn seed(&mut self, service: &ServiceId, plan: ServicePlan) {
        self.category_of.entry(service.clone()).or_insert(plan);
    }

    fn open_path(&mut self, service: &ServiceId) {
        self.path_of.entry(service.clone()).or_default();
    }

    fn record(&mut self, service: &ServiceId, node: &NodeRecord, category: ServicePlan, predecessor: &Arn) {
        self.path_of
            .entry(service.clone())
            .or_default()
            .push(ProvenanceRecord {
                node: node.clone(),
                category,
                predecessor: predecessor.clone(),
            });
    }
}

/// Classifies services against one dependency graph.
#[derive(Debug, Clone, Copy)]
pub struct Categorizer<'g> {
    graph: &'g DependencyGraph,
    sentinels: &'g Sentinels,
}

impl<'g> Categorizer<'g> {
    /// Create a categorizer over `graph`
    pub fn new(graph: &'g DependencyGraph, sentinels: &'g Sentinels) -> Self {
        Self { graph, sentinels }
    }

    /// Classify `service`, starting from its own milestones/tasks.
    ///
    /// Writes `caches.category_of(service)` and appends to
    /// `caches.path_of(service)`; the graph is never touched.
    ///
    /// Every successor edge of every node on the frontier is evaluated, even
    /// when the successor was already reached through another edge. Only
    /// queueing is limited to arns not yet seen, so cycles terminate.
    pub fn classify<'a, I>(&self, service: &ServiceId, own_arns: I, caches: &mut RunCaches)
    where
        I: IntoIterator<Item = &'a Arn>,
    {
        let mut visited: HashSet<&Arn> = HashSet::new();
        let mut level: Vec<&Arn> = Vec::new();
        for arn in own_arns {
            if visited.insert(arn) {
                level.push(arn);
            }
        }

        caches.open_path(service);
        let mut running = ServicePlan::Uncategorized;
        let mut depth = 0usize;

        while !level.is_empty() {
            depth += 1;
            let mut next = Vec::new();

            for &predecessor in &level {
                for successor in self.graph.successors_of(predecessor.as_str()) {
                    if visited.insert(successor) {
                        next.push(successor);
                    }

                    let Some(node) = self.graph.node_of(successor.as_str()) else {
                        continue;
                    };

                    if *successor == self.sentinels.launch_blocking {
                        tracing::debug!(%service, %successor, depth, "Reached launch blocking milestone");
                        caches.record(service, &node.record, ServicePlan::LaunchBlocking, predecessor);
                        caches.assign(service, ServicePlan::LaunchBlocking);
                        return;
                    }

                    if *successor == self.sentinels.mandatory {
                        caches.record(service, &node.record, ServicePlan::Mandatory, predecessor);
                        running = ServicePlan::Mandatory;
                    }

                    match self.resolve(service, predecessor, node, caches) {
                        Some(ServicePlan::LaunchBlocking) => {
                            tracing::debug!(%service, %successor, depth, "Reached launch blocking dependency");
                            caches.assign(service, ServicePlan::LaunchBlocking);
                            return;
                        }
                        Some(ServicePlan::Mandatory) => running = ServicePlan::Mandatory,
                        Some(ServicePlan::NonGlobal) if running != ServicePlan::Mandatory => {
                            running = ServicePlan::NonGlobal;
                        }
                        _ => {}
                    }
                }
            }

            level = next;
        }

        tracing::debug!(%service, plan = %running, depth, "Exhausted dependencies");
        caches.assign(service, running);
    }

    /// The category of the service owning `node`, recording its provenance.
    ///
    /// `None` means the node has no owning service.
    fn resolve(
        &self,
        service: &ServiceId,
        predecessor: &Arn,
        node: &Node,
        caches: &mut RunCaches,
    ) -> Option<ServicePlan> {
        let Some(successor_service) = node.service() else {
            tracing::info!(arn = %node.arn(), "Milestone/task does not have a service");
            return None;
        };

        let category = caches
            .category_of(successor_service.as_str())
            .or(node.service_plan)
            .unwrap_or_default();
        caches.seed(successor_service, category);
        caches.record(service, &node.record, category, predecessor);

        Some(category)
    }
}
