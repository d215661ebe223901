//! Portable-bundle builder for installer-producing release pipelines.
//!
//! Runs the installer a build produced silently into a scratch directory,
//! zips the installed application tree, and attaches the ZIP to the release
//! as a portable bundle.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
