//! Resilient async JSONL (JSON Lines) reading and atomic writing.
//!
//! Snapshot files are exported one record per line. Readers in this crate
//! either fail on the first bad line ([`JsonlReader::read_line`]) or skip bad
//! lines and report them as [`Warning`]s ([`read_jsonl_resilient`]).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

pub use atomic::{write_jsonl_atomic, write_jsonl_atomic_iter};
pub use error::{Error, Result};
pub use reader::{JsonlReader, read_jsonl_resilient};
pub use warning::Warning;
pub use writer::JsonlWriter;
