//! Error types for the portable-bundle pipeline.
//!
//! Every stage failure is terminal. The variants still keep caller
//! misconfiguration, environment problems, subprocess failures and remote
//! rejections apart so the final log line says what actually went wrong.

use std::{fmt::Display, io, path::PathBuf};
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building and uploading a portable bundle.
#[derive(Debug, Error)]
pub enum Error {
    /// None of the candidate artifacts looks like an installer.
    #[error("no installer (-setup.exe, .exe or .msi) found among {candidates} candidate artifact path(s)")]
    NoInstallerFound {
        /// Number of candidates that were inspected
        candidates: usize,
    },

    /// The installer process exited with a non-success status.
    #[error("installer {} exited with {}", .installer.display(), exit_code_label(.code))]
    InstallerExecutionFailed {
        /// Installer that was run
        installer: PathBuf,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
    },

    /// The installer reported success but the install directory does not exist.
    #[error(
        "install directory {} does not exist after running the installer; \
         the installer may have ignored the install directory override",
        .install_dir.display()
    )]
    InstallDirectoryMissing {
        /// Expected install directory
        install_dir: PathBuf,
    },

    /// The installer reported success but installed nothing.
    #[error(
        "install directory {} is empty after running the installer; \
         the installer may not support redirecting the install directory",
        .install_dir.display()
    )]
    EmptyInstallResult {
        /// Install directory that was checked
        install_dir: PathBuf,
    },

    /// The external compression tool failed.
    #[error("archive tool {tool} failed ({})", exit_code_label(.code))]
    ArchiveToolFailed {
        /// Tool that was invoked
        tool: String,
        /// Exit code, `None` when the tool was missing or killed
        code: Option<i32>,
    },

    /// The release already carries an asset with the computed name.
    #[error("release already has an asset named {name}; refusing to upload a duplicate")]
    DuplicateAssetName {
        /// Conflicting asset name
        name: String,
        /// Download URL of the existing asset
        existing_url: Option<String>,
    },

    /// Fetching the release metadata failed.
    #[error("release lookup failed. Status: {status}{}", body_suffix(.body))]
    ReleaseLookupFailed {
        /// HTTP status code
        status: u16,
        /// JSON error body, when the response carried one
        body: Option<serde_json::Value>,
    },

    /// The upload endpoint rejected the asset.
    #[error("upload rejected. Status: {status}{}", body_suffix(.body))]
    UploadRejected {
        /// HTTP status code
        status: u16,
        /// JSON error body, when the response carried one
        body: Option<serde_json::Value>,
    },

    /// Filesystem operation failed on a known path.
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        error: io::Error,
    },

    /// A command could not be spawned.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command name
        command: String,
        /// Underlying error
        error: io::Error,
    },

    /// IO errors
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// ZIP writer errors
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    /// HTTP transport errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Directory traversal errors
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix errors while computing archive entry names
    #[error(transparent)]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// URL parsing errors
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, Box<Error>),

    /// Anything else
    #[error("{0}")]
    GenericError(String),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}

fn body_suffix(body: &Option<serde_json::Value>) -> String {
    match body {
        Some(body) => format!(
            "\n::group::Error response:\n{}\n::endgroup::",
            serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string())
        ),
        None => String::new(),
    }
}

impl Error {
    /// Short, stable label for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoInstallerFound { .. } => "NoInstallerFound",
            Self::InstallerExecutionFailed { .. } => "InstallerExecutionFailed",
            Self::InstallDirectoryMissing { .. } => "InstallDirectoryMissing",
            Self::EmptyInstallResult { .. } => "EmptyInstallResult",
            Self::ArchiveToolFailed { .. } => "ArchiveToolFailed",
            Self::DuplicateAssetName { .. } => "DuplicateAssetName",
            Self::ReleaseLookupFailed { .. } => "ReleaseLookupFailed",
            Self::UploadRejected { .. } => "UploadRejected",
            Self::Context(_, inner) => inner.kind(),
            _ => "Internal",
        }
    }
}

/// Attach a human-readable context to a failure.
pub trait Context<T> {
    /// Wrap the error (or `None`) with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Like [`Context::context`], computing the message lazily.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Attach the failing path to IO errors.
pub trait ErrorExt<T> {
    /// Convert an IO error into [`Error::Fs`] carrying `context` and `path`.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Return early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($fmt:literal, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
