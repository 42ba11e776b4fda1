//! Plan categorizer - classify internal services by launch readiness.
//!
//! Milestones and tasks form a directed dependency graph. Each service is
//! classified by walking outward from its own milestones and tasks and
//! looking for two sentinel milestones (launch blocking and mandatory) and
//! for successors owned by services that are already categorized.
//!
//! This crate provides both a CLI application and a library:
//!
//! - [`graph`] builds the graph from the edge listing
//! - [`engine`] classifies one service against shared [`engine::RunCaches`]
//! - [`driver`] runs the whole batch
//! - [`ingest`], [`report`] and [`changes`] connect a run to its inputs and outputs

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod changes;
pub mod config;
pub mod domain;
pub mod driver;
pub mod engine;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod report;

// Public CLI module (needed by binary)
pub mod app;
pub mod cli;
pub mod output;
