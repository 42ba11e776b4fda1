//! Application context for CLI command execution.
//!
//! [`App`] loads configuration and a snapshot, builds the dependency graph
//! once, and hands the pieces to whichever command runs.
//!
//! # Example
//!
//! ```no_run
//! use plan_categorizer::app::App;
//! use plan_categorizer::ingest::DirectorySource;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::load(&DirectorySource::new("./snapshot"), None).await?;
//!     let caches = app.run();
//!     println!("{} services classified", caches.paths().len());
//!     Ok(())
//! }
//! ```

use crate::config::CategorizerConfig;
use crate::driver::run_all;
use crate::engine::RunCaches;
use crate::error::Result;
use crate::graph::{BuildWarning, DependencyGraph};
use crate::ingest::{Inputs, IngestWarning, SnapshotSource, load_snapshot};
use std::path::Path;

/// Loaded inputs and the graph built from them.
#[derive(Debug)]
pub struct App {
    config: CategorizerConfig,
    inputs: Inputs,
    graph: DependencyGraph,
    ingest_warnings: Vec<IngestWarning>,
    build_warnings: Vec<BuildWarning>,
}

impl App {
    /// Load configuration from `config_path` (defaults when `None`) and the
    /// snapshot from `source`, then build the graph.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration file cannot be read or is invalid
    /// - Any of the four listings cannot be fetched
    pub async fn load(source: &dyn SnapshotSource, config_path: Option<&Path>) -> Result<Self> {
        let config = CategorizerConfig::load_or_default(config_path).await?;
        Self::with_config(source, config).await
    }

    /// Like [`load`](Self::load) with an already parsed configuration.
    pub async fn with_config(source: &dyn SnapshotSource, config: CategorizerConfig) -> Result<Self> {
        let (snapshot, mut ingest_warnings) = load_snapshot(source).await?;
        let filter = config.service_filter();
        let (inputs, derive_warnings) = snapshot.into_inputs(filter.as_ref());
        ingest_warnings.extend(derive_warnings);

        let (graph, build_warnings) = DependencyGraph::build_with_warnings(
            &inputs.edges,
            &inputs.known_nodes,
            &inputs.service_plan_of,
        );
        if !build_warnings.is_empty() {
            tracing::info!(
                dropped = build_warnings.len(),
                "Dropped edges referencing unknown milestones/tasks"
            );
        }
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            services = inputs.service_to_own_arns.len(),
            "Graph ready"
        );

        Ok(Self {
            config,
            inputs,
            graph,
            ingest_warnings,
            build_warnings,
        })
    }

    /// Classify every service in the snapshot.
    pub fn run(&self) -> RunCaches {
        run_all(&self.inputs.service_to_own_arns, &self.graph, &self.config.sentinels)
    }

    /// The active configuration
    pub fn config(&self) -> &CategorizerConfig {
        &self.config
    }

    /// Engine inputs derived from the snapshot
    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    /// The dependency graph
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Warnings raised while decoding the snapshot
    pub fn ingest_warnings(&self) -> &[IngestWarning] {
        &self.ingest_warnings
    }

    /// Edges dropped while building the graph
    pub fn build_warnings(&self) -> &[BuildWarning] {
        &self.build_warnings
    }

    /// All warnings rendered as text, ingestion first.
    pub fn warning_messages(&self) -> Vec<String> {
        self.ingest_warnings
            .iter()
            .map(ToString::to_string)
            .chain(self.build_warnings.iter().map(ToString::to_string))
            .collect()
    }
}
