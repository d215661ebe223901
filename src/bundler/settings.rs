//! Pipeline settings and their builder.

use crate::bundler::{
    archive::ArchiveBackend,
    error::{Context, Result},
    installer::run::EmptyInstallPolicy,
};
use std::path::{Path, PathBuf};

/// Settings for one portable-bundle run.
///
/// Constructed via [`SettingsBuilder`].
///
/// # Examples
///
/// ```no_run
/// use portable_bundler::bundler::SettingsBuilder;
///
/// # fn example() -> portable_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .candidates(vec!["target/release/bundle/nsis/App_1.0.0_x64-setup.exe".into()])
///     .tag_name("v1.0.0")
///     .workspace(".")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    candidates: Vec<String>,
    tag_name: String,
    workspace: PathBuf,
    temp_root: PathBuf,
    app_name: Option<String>,
    os_name: Option<String>,
    upload_url: Option<String>,
    archiver: ArchiveBackend,
    empty_install: EmptyInstallPolicy,
}

impl Settings {
    /// Candidate installer paths, in the order the build reported them.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Release tag the bundle is named after.
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Directory the final archive is written to.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Root under which per-run install directories are created.
    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Application name prefixed to the archive name.
    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    /// OS name appended to the archive name.
    pub fn os_name(&self) -> Option<&str> {
        self.os_name.as_deref()
    }

    /// Explicit upload endpoint; when `None` the release's own is used.
    pub fn upload_url(&self) -> Option<&str> {
        self.upload_url.as_deref()
    }

    /// Compression backend.
    pub fn archiver(&self) -> ArchiveBackend {
        self.archiver
    }

    /// Handling of an empty install directory.
    pub fn empty_install(&self) -> EmptyInstallPolicy {
        self.empty_install
    }
}

/// Builder for constructing [`Settings`].
///
/// `candidates` and `tag_name` are required. `workspace` defaults to the
/// current directory and `temp_root` to `<workspace>/.tmp`.
#[derive(Default)]
pub struct SettingsBuilder {
    candidates: Option<Vec<String>>,
    tag_name: Option<String>,
    workspace: Option<PathBuf>,
    temp_root: Option<PathBuf>,
    app_name: Option<String>,
    os_name: Option<String>,
    upload_url: Option<String>,
    archiver: ArchiveBackend,
    empty_install: EmptyInstallPolicy,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the candidate installer paths.
    pub fn candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = Some(candidates);
        self
    }

    /// Sets the release tag.
    pub fn tag_name(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = Some(tag.into());
        self
    }

    /// Sets the workspace root.
    pub fn workspace<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.workspace = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the scratch root.
    pub fn temp_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.temp_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the application name used in the archive name.
    pub fn app_name(mut self, name: Option<String>) -> Self {
        self.app_name = name;
        self
    }

    /// Sets the OS name used in the archive name.
    pub fn os_name(mut self, name: Option<String>) -> Self {
        self.os_name = name;
        self
    }

    /// Sets an explicit upload endpoint.
    pub fn upload_url(mut self, url: Option<String>) -> Self {
        self.upload_url = url;
        self
    }

    /// Sets the compression backend.
    ///
    /// Default: [`ArchiveBackend::Native`]
    pub fn archiver(mut self, archiver: ArchiveBackend) -> Self {
        self.archiver = archiver;
        self
    }

    /// Sets the empty-install policy.
    ///
    /// Default: [`EmptyInstallPolicy::Fail`]
    pub fn empty_install(mut self, policy: EmptyInstallPolicy) -> Self {
        self.empty_install = policy;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `candidates` or `tag_name` is missing, or if the
    /// current directory is needed and cannot be read.
    pub fn build(self) -> Result<Settings> {
        let workspace = match self.workspace {
            Some(workspace) => workspace,
            None => std::env::current_dir()?,
        };
        let temp_root = self.temp_root.unwrap_or_else(|| workspace.join(".tmp"));

        Ok(Settings {
            candidates: self.candidates.context("candidates is required")?,
            tag_name: self
                .tag_name
                .filter(|tag| !tag.trim().is_empty())
                .context("tag_name is required")?,
            workspace,
            temp_root,
            app_name: self.app_name,
            os_name: self.os_name,
            upload_url: self.upload_url,
            archiver: self.archiver,
            empty_install: self.empty_install,
        })
    }
}
