//! Shared helpers for plan-categorizer integration tests.

#![allow(dead_code)]

use plan_categorizer::domain::{Arn, NodeRecord, RawEdge, ServiceId, ServicePlan};
use plan_categorizer::engine::DEFAULT_LAUNCH_BLOCKING_ARN;
use plan_categorizer::engine::DEFAULT_MANDATORY_ARN;
use plan_categorizer::graph::DependencyGraph;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::process::{Command, Output};

pub const LB: &str = DEFAULT_LAUNCH_BLOCKING_ARN;
pub const MANDATORY: &str = DEFAULT_MANDATORY_ARN;

/// Arn of a task in the test namespace
pub fn task(id: &str) -> String {
    format!("arn:aws:rmsv2:::task/{}", id)
}

/// An in-memory snapshot described by tuples.
#[derive(Debug, Default, Clone)]
pub struct Fixture {
    pub edges: Vec<RawEdge>,
    pub nodes: Vec<NodeRecord>,
    pub plans: Vec<(ServiceId, ServicePlan)>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node owned by `service` (or none)
    pub fn node(mut self, arn: &str, service: Option<&str>) -> Self {
        let mut record = NodeRecord::new(arn).with_name(arn.rsplit('/').next().unwrap_or(arn));
        if let Some(service) = service {
            record = record.with_service(service);
        }
        self.nodes.push(record);
        self
    }

    pub fn edge(mut self, from: &str, to: &str) -> Self {
        self.edges.push(RawEdge::new(from, to));
        self
    }

    pub fn plan(mut self, service: &str, plan: ServicePlan) -> Self {
        self.plans.push((ServiceId::new(service), plan));
        self
    }

    pub fn known_nodes(&self) -> HashMap<Arn, NodeRecord> {
        self.nodes
            .iter()
            .map(|node| (node.arn.clone(), node.clone()))
            .collect()
    }

    pub fn plan_of(&self) -> HashMap<ServiceId, ServicePlan> {
        self.plans.iter().cloned().collect()
    }

    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::build(&self.edges, &self.known_nodes(), &self.plan_of())
    }

    /// Own arns per service, from the node list
    pub fn own_arns(&self) -> BTreeMap<ServiceId, Vec<Arn>> {
        let mut own: BTreeMap<ServiceId, Vec<Arn>> = BTreeMap::new();
        for node in &self.nodes {
            if let Some(service) = node.service() {
                own.entry(service.clone()).or_default().push(node.arn.clone());
            }
        }
        own
    }

    /// Write the fixture as the four snapshot listings under `dir`.
    ///
    /// Nodes whose arn contains `milestone` go to milestones.jsonl, the rest
    /// to tasks.jsonl.
    pub fn write_snapshot(&self, dir: &Path) {
        let edges: Vec<Value> = self
            .edges
            .iter()
            .map(|e| json!({ "from": e.from, "to": e.to }))
            .collect();
        let (milestones, tasks): (Vec<&NodeRecord>, Vec<&NodeRecord>) = self
            .nodes
            .iter()
            .partition(|n| n.arn.as_str().contains("milestone"));
        let plans: Vec<Value> = self
            .plans
            .iter()
            .map(|(service, plan)| json!({ "instance": format!("{}:v0", service), "plan": plan.label() }))
            .collect();

        write_lines(&dir.join("edges.jsonl"), &edges);
        write_lines(&dir.join("milestones.jsonl"), &milestones);
        write_lines(&dir.join("tasks.jsonl"), &tasks);
        write_lines(&dir.join("plans.jsonl"), &plans);
    }
}

pub fn write_lines<T: serde::Serialize>(path: &Path, rows: &[T]) {
    let mut content = String::new();
    for row in rows {
        content.push_str(&serde_json::to_string(row).expect("serialize row"));
        content.push('\n');
    }
    std::fs::write(path, content).expect("write listing");
}

/// Run the binary with colors disabled
pub fn run_categorizer(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_plan-categorizer"))
        .args(args)
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute plan-categorizer")
}
