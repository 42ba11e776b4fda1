//! JSONL reading operations.
//!
//! This module provides async, line-oriented reading of JSONL data with line
//! number tracking so that bad records can be reported precisely.

use crate::{Error, Result, Warning};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::str::Utf8Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async reader for JSONL (JSON Lines) data.
///
/// Blank lines are ignored and do not produce warnings. Line numbers are
/// 1-based and count blank lines, so they match what an editor shows.
///
/// # Examples
///
/// ```no_run
/// use plan_jsonl::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("edges.jsonl").await?;
/// let mut reader = JsonlReader::new(file);
/// while let Some(edge) = reader.read_line::<serde_json::Value>().await? {
///     println!("{edge}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    /// Buffered reader wrapping the underlying async reader.
    reader: BufReader<R>,
    /// Number of the last line read (0 before any line is read).
    line_number: usize,
    /// Scratch buffer reused for every line.
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: Vec::new(),
        }
    }

    /// Creates a new `JsonlReader` with a custom buffer capacity in bytes.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
            buffer: Vec::new(),
        }
    }

    /// Returns the number of the last line read, or 0 before any read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Advances to the next non-blank line.
    ///
    /// Returns the line number together with the trimmed text, or the UTF-8
    /// error if the line is not valid text. `None` means end of input.
    async fn next_line(&mut self) -> Result<Option<(usize, std::result::Result<&str, Utf8Error>)>> {
        loop {
            self.buffer.clear();
            if self.reader.read_until(b'\n', &mut self.buffer).await? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if !self.buffer.iter().all(u8::is_ascii_whitespace) {
                break;
            }
        }
        Ok(Some((
            self.line_number,
            std::str::from_utf8(&self.buffer).map(str::trim),
        )))
    }

    /// Reads and decodes the next record.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidFormat`] on the first line that is not a
    /// valid `T`, and with [`Error::Io`] if the underlying read fails.
    pub async fn read_line<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        let Some((line_number, line)) = self.next_line().await? else {
            return Ok(None);
        };
        let text =
            line.map_err(|e| Error::InvalidFormat(format!("line {}: {}", line_number, e)))?;
        serde_json::from_str(text)
            .map(Some)
            .map_err(|e| Error::InvalidFormat(format!("line {}: {}", line_number, e)))
    }

    /// Reads every remaining record, skipping lines that cannot be decoded.
    ///
    /// # Errors
    ///
    /// Only I/O failures are errors. Undecodable lines become warnings.
    pub async fn read_all_resilient<T: DeserializeOwned>(
        &mut self,
    ) -> Result<(Vec<T>, Vec<Warning>)> {
        let mut records = Vec::new();
        let mut warnings = Vec::new();

        while let Some((line_number, line)) = self.next_line().await? {
            let text = match line {
                Ok(text) => text,
                Err(e) => {
                    warnings.push(Warning::SkippedLine {
                        line_number,
                        reason: format!("invalid UTF-8: {}", e),
                    });
                    continue;
                }
            };

            match serde_json::from_str::<T>(text) {
                Ok(record) => records.push(record),
                Err(e) if e.is_data() => warnings.push(Warning::InvalidRecord {
                    line_number,
                    error: e.to_string(),
                }),
                Err(e) => warnings.push(Warning::MalformedJson {
                    line_number,
                    error: e.to_string(),
                }),
            }
        }

        Ok((records, warnings))
    }

    /// Consumes the reader, returning the underlying buffered reader.
    #[must_use]
    pub fn into_inner(self) -> BufReader<R> {
        self.reader
    }
}

/// Reads a whole JSONL file, skipping lines that cannot be decoded.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read. Bad lines are
/// never errors; they are returned as warnings alongside the good records.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).await?;
    let (records, warnings) = JsonlReader::new(file).read_all_resilient().await?;

    tracing::debug!(
        path = %path.display(),
        records = records.len(),
        skipped = warnings.len(),
        "read JSONL file"
    );

    Ok((records, warnings))
}
