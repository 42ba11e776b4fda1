//! Atomic write operations for JSONL files.
//!
//! Data is written to a sibling temporary file which is then renamed over
//! the target path. On POSIX systems the rename is atomic within a
//! filesystem, so readers never observe a partially written report.

use crate::{JsonlWriter, Result};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Atomically writes a slice of values to a JSONL file.
///
/// # Errors
///
/// See [`write_jsonl_atomic_iter`].
pub async fn write_jsonl_atomic<T, P>(path: P, values: &[T]) -> Result<usize>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_jsonl_atomic_iter(path, values.iter()).await
}

/// Atomically writes an iterator of values to a JSONL file.
///
/// Returns the number of records written. On failure the target file is
/// left unchanged and the temporary file is removed on a best-effort basis.
///
/// # Errors
///
/// Fails if the temporary file cannot be created, a value fails to
/// serialize, a write fails, or the final rename fails.
pub async fn write_jsonl_atomic_iter<T, I, P>(path: P, values: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    let written = match write_to_temp_file(&temp_path, values).await {
        Ok(written) => written,
        Err(e) => {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&temp_path, path).await?;
    tracing::debug!(path = %path.display(), records = written, "wrote JSONL file");

    Ok(written)
}

/// `report.jsonl` becomes `report.jsonl.tmp`; `report` becomes `report.tmp`.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}

async fn write_to_temp_file<T, I>(temp_path: &Path, values: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = JsonlWriter::new(file);
    let written = writer.write_all(values).await?;
    writer.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::with_extension("out/report.jsonl", "out/report.jsonl.tmp")]
    #[case::without_extension("out/report", "out/report.tmp")]
    fn temp_path_sits_next_to_target(#[case] target: &str, #[case] expected: &str) {
        assert_eq!(make_temp_path(Path::new(target)), PathBuf::from(expected));
    }

    #[tokio::test]
    async fn replaces_existing_file_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        tokio::fs::write(&path, "stale\n").await.unwrap();

        let written = write_jsonl_atomic(&path, &[1, 2, 3]).await.unwrap();

        assert_eq!(written, 3);
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "1\n2\n3\n");
        assert!(!make_temp_path(&path).exists());
    }
}
