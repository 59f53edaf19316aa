//! Task discovery: walking the input tree and mirroring it under the output root

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::OutputFormat;
use crate::error::{BatchmarkError, Result};
use crate::processing::formats::is_supported_input_extension;

/// One input-image-to-output-image unit of work.
///
/// Immutable once created; consumed exactly once by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Walks an input root and produces the ordered task sequence for one run.
pub struct TaskEnumerator {
    input_root: PathBuf,
    output_root: PathBuf,
    output_format: OutputFormat,
}

impl TaskEnumerator {
    pub fn new<P: Into<PathBuf>>(input_root: P, output_root: P, output_format: OutputFormat) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            output_format,
        }
    }

    /// Enumerate every eligible image under the input root.
    ///
    /// The walk is sorted by file name so the sequence is deterministic for a
    /// fixed tree. Destination directories are created eagerly; creation is
    /// idempotent and safe against concurrent creation elsewhere. Any walk
    /// error (unreadable directory, permission failure) is fatal -- there is
    /// nothing meaningful to process without a complete enumeration.
    pub fn enumerate(&self) -> Result<Vec<Task>> {
        if !self.input_root.is_dir() {
            return Err(BatchmarkError::InputDirMissing {
                path: self.input_root.clone(),
            });
        }

        fs::create_dir_all(&self.output_root)
            .map_err(|e| BatchmarkError::output_dir(self.output_root.clone(), e))?;

        let mut tasks = Vec::new();

        for entry in WalkDir::new(&self.input_root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let eligible = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(is_supported_input_extension)
                .unwrap_or(false);
            if !eligible {
                continue;
            }

            tasks.push(self.task_for(path)?);
        }

        debug!(
            "Enumerated {} tasks under {:?}",
            tasks.len(),
            self.input_root
        );

        Ok(tasks)
    }

    /// Build the task for one source file, creating its destination directory.
    fn task_for(&self, source: &Path) -> Result<Task> {
        // enumerate() only hands us paths under input_root
        let relative = source
            .strip_prefix(&self.input_root)
            .expect("walked path outside input root");

        let destination = self
            .output_root
            .join(relative)
            .with_extension(self.output_format.extension());

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BatchmarkError::output_dir(parent.to_path_buf(), e))?;
        }

        Ok(Task {
            source: source.to_path_buf(),
            destination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"stub").unwrap();
    }

    #[test]
    fn test_enumeration_filters_and_mirrors() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        touch(&input.path().join("a.jpg"));
        touch(&input.path().join("sub/b.png"));
        touch(&input.path().join("notes.txt"));

        let enumerator = TaskEnumerator::new(
            input.path().to_path_buf(),
            output.path().to_path_buf(),
            OutputFormat::Jpeg,
        );
        let tasks = enumerator.enumerate().unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].source, input.path().join("a.jpg"));
        assert_eq!(tasks[0].destination, output.path().join("a.jpg"));
        assert_eq!(tasks[1].source, input.path().join("sub/b.png"));
        assert_eq!(tasks[1].destination, output.path().join("sub/b.jpg"));

        // destination subdirectories exist before any worker runs
        assert!(output.path().join("sub").is_dir());
    }

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        touch(&input.path().join("UPPER.JPG"));
        touch(&input.path().join("photo.WebP"));

        let enumerator = TaskEnumerator::new(
            input.path().to_path_buf(),
            output.path().to_path_buf(),
            OutputFormat::Jpeg,
        );
        let tasks = enumerator.enumerate().unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn test_order_is_deterministic() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        for name in ["c.jpg", "a.jpg", "b.jpg"] {
            touch(&input.path().join(name));
        }

        let enumerator = TaskEnumerator::new(
            input.path().to_path_buf(),
            output.path().to_path_buf(),
            OutputFormat::Jpeg,
        );
        let first = enumerator.enumerate().unwrap();
        let second = enumerator.enumerate().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_input_root_is_fatal() {
        let output = TempDir::new().unwrap();
        let enumerator = TaskEnumerator::new(
            PathBuf::from("/nonexistent/batchmark/input"),
            output.path().to_path_buf(),
            OutputFormat::Jpeg,
        );

        let err = enumerator.enumerate().unwrap_err();
        assert!(matches!(err, BatchmarkError::InputDirMissing { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_empty_tree_yields_no_tasks() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        touch(&input.path().join("readme.md"));

        let enumerator = TaskEnumerator::new(
            input.path().to_path_buf(),
            output.path().to_path_buf(),
            OutputFormat::Jpeg,
        );
        assert!(enumerator.enumerate().unwrap().is_empty());
    }

    #[test]
    fn test_png_output_format_rewrites_extension() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        touch(&input.path().join("a.jpg"));

        let enumerator = TaskEnumerator::new(
            input.path().to_path_buf(),
            output.path().to_path_buf(),
            OutputFormat::Png,
        );
        let tasks = enumerator.enumerate().unwrap();
        assert_eq!(tasks[0].destination, output.path().join("a.png"));
    }
}
