//! Command line argument parsing.
//!
//! Every option also reads the environment variable a GitHub Actions step
//! would set, so the tool runs unchanged as `env:`-configured CI step or by
//! hand. Values are only collected here; [`super::BuildConfig`] validates them.

use crate::error::{CliError, Result};
use clap::{Parser, error::ErrorKind};
use std::path::PathBuf;

/// Portable bundle builder for installer-producing releases
#[derive(Parser, Debug, Default)]
#[command(
    name = "portable_bundler",
    version,
    about = "Turns a silent-capable installer into a portable ZIP release asset",
    long_about = "Runs the installer produced by the build silently into a scratch directory,
zips the installed files, and uploads the ZIP to an existing release.

Installer priority: *-setup.exe (NSIS), then *.exe, then *.msi.

Usage:
  portable_bundler --artifact-paths '[\"App-1.2.3-setup.exe\"]' --tag-name v1.2.3 \\
      --repository octo/app --token $TOKEN
  portable_bundler --artifact-paths App-1.2.3.msi --tag-name v1.2.3 --no-upload

Exit code 0 = archive created (and uploaded unless --no-upload)."
)]
pub struct Args {
    /// Token used for the release API
    #[arg(long, env = "TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository in owner/repo form
    #[arg(long, env = "GITHUB_REPOSITORY", value_name = "OWNER/REPO")]
    pub repository: Option<String>,

    /// Workspace root; the archive is written here
    #[arg(long, env = "GITHUB_WORKSPACE", value_name = "PATH")]
    pub workspace: Option<PathBuf>,

    /// Scratch root for the install directory [default: <workspace>/.tmp]
    #[arg(long, env = "RUNNER_TEMP", value_name = "PATH")]
    pub temp_dir: Option<PathBuf>,

    /// Release tag the bundle is named after
    #[arg(long, env = "TAG_NAME")]
    pub tag_name: Option<String>,

    /// Fallback for the tag when TAG_NAME is unset
    #[arg(long, env = "GITHUB_REF_NAME", hide = true)]
    pub ref_name: Option<String>,

    /// Numeric release id; the release is looked up by tag otherwise
    #[arg(long, env = "RELEASE_ID")]
    pub release_id: Option<String>,

    /// Candidate artifact paths, as a JSON array or newline/semicolon separated
    #[arg(long, env = "ARTIFACT_PATHS", value_name = "PATHS")]
    pub artifact_paths: Option<String>,

    /// Upload endpoint (RFC 6570 template allowed) [default: the release's upload_url]
    #[arg(long, env = "RELEASE_UPLOAD_URL", value_name = "URL")]
    pub upload_url: Option<String>,

    /// Application name prefixed to the archive name
    #[arg(long, env = "APP_NAME")]
    pub app_name: Option<String>,

    /// OS name appended to the archive name
    #[arg(long, env = "OS_NAME")]
    pub os_name: Option<String>,

    /// REST API root
    #[arg(long, env = "GITHUB_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// File receiving `key=value` step outputs
    #[arg(long, env = "GITHUB_OUTPUT", value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Compression backend: native or system
    #[arg(long, env = "PORTABLE_ARCHIVER", value_name = "ARCHIVER")]
    pub archiver: Option<String>,

    /// Empty install directory handling: fail or warn
    #[arg(long, env = "EMPTY_INSTALL", value_name = "POLICY")]
    pub empty_install: Option<String>,

    /// Build the archive only; skip the release lookup and upload
    #[arg(long)]
    pub no_upload: bool,

    /// Show install details
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments.
    ///
    /// `--help` and `--version` print and exit as usual. Any other parse
    /// failure is returned so it is reported like every other fatal error.
    pub fn parse_args() -> Result<Self> {
        Self::parse_from_iter(std::env::args_os())
    }

    /// Parses `args`, where the first item is the program name.
    pub fn parse_from_iter<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(args) => Ok(args),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => Err(CliError::InvalidArguments(first_line(&e.to_string())).into()),
        }
    }
}

/// clap appends usage hints after the first line; the annotation keeps the cause.
fn first_line(message: &str) -> String {
    let line = message.lines().next().unwrap_or(message).trim();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}
