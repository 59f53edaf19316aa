//! Error types and handling for batchmark

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for batchmark operations
pub type Result<T> = std::result::Result<T, BatchmarkError>;

/// Main error type for batchmark operations
#[derive(Debug, Error)]
pub enum BatchmarkError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode/encode errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input root does not exist or is not a directory
    #[error("Input directory not found: {path:?}")]
    InputDirMissing { path: PathBuf },

    /// Input root contained no files matching the extension allow-list
    #[error("No eligible image files found under {path:?}")]
    NoEligibleFiles { path: PathBuf },

    /// Failed to create a destination directory
    #[error("Failed to create output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Directory walk failed while enumerating tasks
    #[error("Failed to enumerate input tree: {0}")]
    Enumeration(#[from] walkdir::Error),

    /// Worker pool errors (worker panic, scope failure)
    #[error("Worker pool error: {message}")]
    Pool { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl BatchmarkError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new worker pool error
    pub fn pool<S: Into<String>>(message: S) -> Self {
        Self::Pool {
            message: message.into(),
        }
    }

    /// Create a new output directory error
    pub fn output_dir(path: PathBuf, source: std::io::Error) -> Self {
        Self::OutputDir { path, source }
    }

    /// Check if this error aborts the whole run.
    ///
    /// Per-task errors (decode/encode failures on a single image) are caught
    /// at the worker boundary and recorded; everything else is a setup or
    /// pool failure and terminates the run.
    pub fn is_fatal(&self) -> bool {
        match self {
            // These errors affect individual tasks; the batch continues
            Self::Io(_) | Self::Image(_) => false,

            // Setup and pool errors stop all processing
            Self::Config { .. }
            | Self::InputDirMissing { .. }
            | Self::NoEligibleFiles { .. }
            | Self::OutputDir { .. }
            | Self::Enumeration(_)
            | Self::Pool { .. }
            | Self::Serde(_) => true,
        }
    }
}

// Convert serde errors to our error type
impl From<toml::de::Error> for BatchmarkError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serde(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for BatchmarkError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serde(format!("YAML parsing error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BatchmarkError::config("test message");
        assert!(matches!(err, BatchmarkError::Config { .. }));
        assert!(err.to_string().contains("test message"));
    }

    #[test]
    fn test_fatal_partition() {
        assert!(BatchmarkError::config("bad").is_fatal());
        assert!(BatchmarkError::pool("worker panicked").is_fatal());
        assert!(BatchmarkError::NoEligibleFiles {
            path: PathBuf::from("data_set")
        }
        .is_fatal());

        let io = BatchmarkError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert!(!io.is_fatal());
    }

    #[test]
    fn test_output_dir_message_names_path() {
        let err = BatchmarkError::output_dir(
            PathBuf::from("out/sub"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("out/sub"));
        assert!(msg.contains("denied"));
    }
}
