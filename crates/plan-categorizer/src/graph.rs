//! Dependency graph of milestones and tasks, built on petgraph.
//!
//! Edges point from **predecessor -> successor**. Only edges whose two
//! endpoints are both known milestones/tasks are materialized; everything
//! else lies outside the analysed scope and is dropped. Each node is
//! annotated once, at build time, with the current plan of its owning
//! service.
//!
//! The graph is read-only after [`DependencyGraph::build`] returns.

use crate::domain::{Arn, Node, NodeRecord, RawEdge, ServiceId, ServicePlan};
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// The side of an edge that was not found among the known nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The predecessor is unknown
    From,
    /// The successor is unknown
    To,
    /// Neither end is known
    Both,
}

/// Non-fatal problems found while building the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// Edge references a milestone/task outside the known node set.
    ///
    /// **Effect**: the edge is skipped and contributes no node.
    DanglingEdge {
        /// Predecessor arn as listed
        from: Arn,
        /// Successor arn as listed
        to: Arn,
        /// Which end is unknown
        missing: Endpoint,
    },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingEdge { from, to, missing } => {
                let side = match missing {
                    Endpoint::From => "predecessor",
                    Endpoint::To => "successor",
                    Endpoint::Both => "both endpoints",
                };
                write!(f, "dropped edge {} -> {}: unknown {}", from, to, side)
            }
        }
    }
}

/// Directed graph of milestones and tasks.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Nodes carry their record and build-time plan; edges carry nothing.
    graph: DiGraph<Node, ()>,

    /// Mapping from arn to graph index. Every node has exactly one entry.
    node_map: HashMap<Arn, NodeIndex>,

    /// Every materialized `(from, to)` pair, for coalescing repeated edges.
    edge_set: HashSet<(NodeIndex, NodeIndex)>,
}

impl DependencyGraph {
    /// Build the graph from a flat edge list.
    ///
    /// Dropped edges are logged; use [`build_with_warnings`](Self::build_with_warnings)
    /// to inspect them.
    pub fn build<'a, I>(
        edges: I,
        known_nodes: &HashMap<Arn, NodeRecord>,
        service_plan_of: &HashMap<ServiceId, ServicePlan>,
    ) -> Self
    where
        I: IntoIterator<Item = &'a RawEdge>,
    {
        let (graph, warnings) = Self::build_with_warnings(edges, known_nodes, service_plan_of);
        if !warnings.is_empty() {
            tracing::info!(
                dropped = warnings.len(),
                "Dropped edges referencing unknown milestones/tasks"
            );
        }
        graph
    }

    /// Build the graph and return every dropped edge as a warning.
    ///
    /// Nodes are unique by arn: the first edge that mentions an arn creates
    /// its node and later mentions reuse it. Repeated edges between the same
    /// pair are coalesced into one.
    pub fn build_with_warnings<'a, I>(
        edges: I,
        known_nodes: &HashMap<Arn, NodeRecord>,
        service_plan_of: &HashMap<ServiceId, ServicePlan>,
    ) -> (Self, Vec<BuildWarning>)
    where
        I: IntoIterator<Item = &'a RawEdge>,
    {
        let mut graph = Self::default();
        let mut warnings = Vec::new();

        for edge in edges {
            let (from_record, to_record) = match (
                known_nodes.get(edge.from.as_str()),
                known_nodes.get(edge.to.as_str()),
            ) {
                (Some(from), Some(to)) => (from, to),
                (from, to) => {
                    let missing = match (from, to) {
                        (None, None) => Endpoint::Both,
                        (None, Some(_)) => Endpoint::From,
                        _ => Endpoint::To,
                    };
                    tracing::debug!(from = %edge.from, to = %edge.to, ?missing, "Skipping dangling edge");
                    warnings.push(BuildWarning::DanglingEdge {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                        missing,
                    });
                    continue;
                }
            };

            let from = graph.ensure_node(&edge.from, from_record, service_plan_of);
            let to = graph.ensure_node(&edge.to, to_record, service_plan_of);
            if graph.edge_set.insert((from, to)) {
                graph.graph.add_edge(from, to, ());
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built dependency graph"
        );

        (graph, warnings)
    }

    /// Return the index of `arn`, creating its node on first sight.
    fn ensure_node(
        &mut self,
        arn: &Arn,
        record: &NodeRecord,
        service_plan_of: &HashMap<ServiceId, ServicePlan>,
    ) -> NodeIndex {
        if let Some(&index) = self.node_map.get(arn) {
            return index;
        }

        let service_plan = record
            .service()
            .map(|service| service_plan_of.get(service).copied().unwrap_or_default());
        let index = self.graph.add_node(Node {
            record: record.clone(),
            service_plan,
        });
        self.node_map.insert(arn.clone(), index);
        index
    }

    /// Successors of `arn` in the order their edges were first listed.
    ///
    /// An arn that is not in the graph has no successors.
    pub fn successors_of(&self, arn: &str) -> Vec<&Arn> {
        let Some(&index) = self.node_map.get(arn) else {
            return Vec::new();
        };

        // Edges are never removed, so edge indices follow listing order.
        let mut outgoing: Vec<_> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        outgoing.sort_unstable_by_key(|&(id, _)| id);
        outgoing
            .into_iter()
            .map(|(_, successor)| self.graph[successor].arn())
            .collect()
    }

    /// The node for `arn`, if it is in the graph.
    pub fn node_of(&self, arn: &str) -> Option<&Node> {
        self.node_map.get(arn).map(|&index| &self.graph[index])
    }

    /// Whether `arn` is a node of the graph.
    pub fn contains(&self, arn: &str) -> bool {
        self.node_map.contains_key(arn)
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the graph contains at least one cycle.
    ///
    /// Classification is cycle-safe; this is reported for data quality only.
    pub fn has_cycle(&self) -> bool {
        algo::is_cyclic_directed(&self.graph)
    }
}
