//! Top-level error types for the command line surface.
//!
//! Pipeline failures live in [`crate::bundler::Error`]; this module adds the
//! argument and configuration problems that are caught before any stage runs.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all bundler operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bundler errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Command line flags could not be parsed
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// One or more configuration values are missing or invalid
    #[error("Invalid configuration:\n{}", format_problems(.problems))]
    InvalidConfiguration {
        /// Every problem found, in input order
        problems: Vec<String>,
    },
}

fn format_problems(problems: &[String]) -> String {
    problems
        .iter()
        .map(|p| format!("  - {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl BundlerError {
    /// Short, stable label for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cli(CliError::InvalidArguments(_)) => "InvalidArguments",
            Self::Cli(CliError::InvalidConfiguration { .. }) => "InvalidConfiguration",
            Self::Io(_) => "Io",
            Self::Bundler(e) => e.kind(),
        }
    }
}
