//! CLI support for jsonpath-lang
//!
//! Provides programmatic access to the `jsonpath` command so other tools
//! can run queries the same way the binary does.

mod query;

pub use query::{QueryOptions, execute_files, execute_query, format_match};

use std::{io, path::PathBuf};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Expression failed to compile
    Parse(crate::ParseError),
    /// JSON parsing error
    Json(serde_json::Error),
    /// Reading an input file failed
    File { path: PathBuf, source: io::Error },
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "Invalid expression: {}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::File { path, source } => {
                write!(f, "Cannot read {}: {}", path.display(), source)
            }
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No input provided. Pass JSON files or pipe JSON to stdin."),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::File { source, .. } => Some(source),
            CliError::Io(e) => Some(e),
            CliError::NoInput => None,
        }
    }
}

impl From<crate::ParseError> for CliError {
    fn from(e: crate::ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
