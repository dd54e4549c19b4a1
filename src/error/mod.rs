//! # Error Module
//!
//! Error types for the duplicate image finder.
//!
//! ## Policy
//! - **No retries** - every failure surfaces to the caller
//! - **No partial results** - one bad item aborts the batch it belongs to
//! - **Include context** - paths, tool names and tool output

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DuplicateFinderError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("External tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Verification error: {0}")]
    Verify(#[from] VerifyError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while expanding the input paths
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot resolve path {path}: {source}")]
    Normalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the external image collaborators
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to run `{tool}` (is it installed?): {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{tool}` failed on {path} ({status}): {stderr}")]
    Failed {
        tool: String,
        path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("Cannot inspect {path}: {reason}")]
    Inspect { path: PathBuf, reason: String },

    #[error("Failed to access tool output {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Contract violations in the similarity metric report
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Expected exactly one SSIM summary line, found {found}: {report}")]
    SummaryLines { found: usize, report: String },

    #[error("Failed to parse SSIM summary line: {line}")]
    UnparsableScore { line: String },

    #[error("Similarity score {score} is outside [0, 1]")]
    ScoreOutOfRange { score: f64 },
}

/// Errors that occur with the persistent result cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read cache store at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache store at {path} is malformed ({source}). Delete this file and try again.")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write cache store at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize cache document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("In-memory cache store is poisoned")]
    Poisoned,
}

/// Errors that occur while building the final report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to read confirmation answer: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("Failed to show preview: {0}")]
    Preview(#[source] ToolError),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DuplicateFinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_error_includes_tool_and_path() {
        let error = ToolError::Failed {
            tool: "convert".to_string(),
            path: PathBuf::from("/photos/broken.jpg"),
            status: "exit status: 1".to_string(),
            stderr: "improper image header".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("convert"));
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("improper image header"));
    }

    #[test]
    fn malformed_cache_suggests_recovery() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error = CacheError::Malformed {
            path: PathBuf::from("/tmp/cache.json"),
            source,
        };
        let message = error.to_string();
        assert!(message.contains("/tmp/cache.json"));
        assert!(message.contains("Delete this file"));
    }

    #[test]
    fn summary_line_error_reports_count() {
        let error = VerifyError::SummaryLines {
            found: 2,
            report: "...".to_string(),
        };
        assert!(error.to_string().contains("found 2"));
    }

    #[test]
    fn nested_errors_convert_to_top_level() {
        let error: DuplicateFinderError = VerifyError::ScoreOutOfRange { score: 1.5 }.into();
        assert!(matches!(error, DuplicateFinderError::Verify(_)));
        assert!(error.to_string().contains("1.5"));
    }
}
