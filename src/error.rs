use std::path::PathBuf;

use thiserror::Error;

/// Main error type for Sigscribe operations
#[derive(Error, Debug)]
pub enum SigscribeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    /// The codebase root is missing or is not a directory
    #[error("The path {} is not a valid directory", .0.display())]
    InvalidInput(PathBuf),

    #[error("No Python files found in {}", .0.display())]
    NoFilesFound(PathBuf),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid Python 3
    #[error("Syntax error in {} at line {line}, column {column}: {reason}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        reason: String,
    },

    /// Every discovered file failed to parse
    #[error("None of the {attempted} discovered files could be parsed")]
    AggregateFailure { attempted: usize },

    #[error("Failed to write output to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl SigscribeError {
    /// Stable event name used in structured log records
    pub fn event(&self) -> &'static str {
        match self {
            SigscribeError::FileNotFound(_) => "file_not_found",
            SigscribeError::Syntax { .. } => "syntax_error",
            SigscribeError::Read { .. } => "read_error",
            SigscribeError::Write { .. } => "write_failure",
            SigscribeError::InvalidInput(_) => "invalid_input",
            SigscribeError::NoFilesFound(_) => "no_files_found",
            SigscribeError::AggregateFailure { .. } => "aggregate_failure",
            SigscribeError::Config(_) => "config_error",
            SigscribeError::Parser(_)
            | SigscribeError::Io(_)
            | SigscribeError::Serialization(_)
            | SigscribeError::FileSystem(_) => "internal_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, SigscribeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_mentions_path_and_location() {
        let err = SigscribeError::Syntax {
            path: PathBuf::from("pkg/broken.py"),
            line: 3,
            column: 7,
            reason: "invalid syntax".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("pkg/broken.py"));
        assert!(message.contains("line 3, column 7: invalid syntax"));
        assert_eq!(err.event(), "syntax_error");
    }

    #[test]
    fn test_io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SigscribeError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_invalid_input_message() {
        let err = SigscribeError::InvalidInput(PathBuf::from("/no/such/dir"));
        assert_eq!(err.to_string(), "The path /no/such/dir is not a valid directory");
        assert_eq!(err.event(), "invalid_input");
    }

    #[test]
    fn test_write_failure_event() {
        let err = SigscribeError::Write {
            path: PathBuf::from("out.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(err.event(), "write_failure");
        assert!(err.to_string().contains("disk full"));
    }
}
