//! Silent installer execution (stage 2).
//!
//! Runs the selected installer into a freshly created scratch directory and
//! checks that it actually put something there.

use super::SelectedInstaller;
use crate::bundler::{
    archive::sanitize_component,
    error::{Error, Result},
    utils::fs,
};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// What to do when the installer succeeds but leaves the directory empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyInstallPolicy {
    /// Abort with [`Error::EmptyInstallResult`]
    #[default]
    Fail,
    /// Log a warning and archive the empty directory anyway
    Warn,
}

impl std::str::FromStr for EmptyInstallPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" | "error" => Ok(Self::Fail),
            "warn" | "warning" => Ok(Self::Warn),
            other => Err(format!(
                "unknown empty-install policy '{other}' (expected 'fail' or 'warn')"
            )),
        }
    }
}

/// Outcome of the post-install check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallCheck {
    /// Top-level entries found in the install directory
    Populated(Vec<String>),
    /// Directory exists but is empty, tolerated by [`EmptyInstallPolicy::Warn`]
    Empty,
}

/// Per-run scratch directory name: `portable_install-<tag>-<timestamp>-<token>`.
pub fn install_dir_name(tag: &str, now: DateTime<Utc>, token: &str) -> String {
    format!(
        "portable_install-{}-{}-{}",
        sanitize_component(tag),
        now.format("%Y%m%d%H%M%S"),
        token
    )
}

/// Fresh, collision-free install directory under `temp_root`.
pub fn unique_install_dir(temp_root: &Path, tag: &str) -> PathBuf {
    let token = uuid::Uuid::new_v4().simple().to_string();
    temp_root.join(install_dir_name(tag, Utc::now(), &token[..8]))
}

/// Removes any stale copy of `install_dir` and recreates it empty.
pub async fn prepare_install_dir(install_dir: &Path) -> Result<()> {
    log::debug!("Preparing install directory {}", install_dir.display());
    fs::create_dir_all(install_dir, true).await
}

/// Runs the installer unattended and waits for it to exit.
///
/// Output is inherited so installer diagnostics land in the CI log. There is
/// no timeout: a hung installer blocks until the surrounding job is killed.
pub async fn run_installer(installer: &SelectedInstaller, install_dir: &Path) -> Result<()> {
    let invocation = installer.invocation(install_dir);
    log::info!("Running {} silently: {}", installer.kind, invocation.display());

    let status = tokio::process::Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|error| Error::CommandFailed {
            command: invocation.program.display().to_string(),
            error,
        })?;

    if !status.success() {
        return Err(Error::InstallerExecutionFailed {
            installer: installer.path.clone(),
            code: status.code(),
        });
    }

    Ok(())
}

/// Checks that the installer populated `install_dir`.
///
/// A missing directory is always fatal; before failing, the usual default
/// installation roots are listed so the log shows where the installer went.
pub async fn verify_install_dir(
    install_dir: &Path,
    policy: EmptyInstallPolicy,
    app_hint: Option<&str>,
) -> Result<InstallCheck> {
    let Some(entries) = fs::list_dir(install_dir).await? else {
        log::error!(
            "Install directory {} does not exist after running the installer",
            install_dir.display()
        );
        probe_default_roots(app_hint).await;
        return Err(Error::InstallDirectoryMissing {
            install_dir: install_dir.to_path_buf(),
        });
    };

    if !entries.is_empty() {
        log::info!("Install directory populated:");
        for name in &entries {
            log::info!(" - {name}");
        }
        return Ok(InstallCheck::Populated(entries));
    }

    match policy {
        EmptyInstallPolicy::Fail => Err(Error::EmptyInstallResult {
            install_dir: install_dir.to_path_buf(),
        }),
        EmptyInstallPolicy::Warn => {
            log::warn!(
                "Install directory {} appears empty after running the installer. \
                 The installer may not support redirecting the install directory.",
                install_dir.display()
            );
            Ok(InstallCheck::Empty)
        }
    }
}

/// Well-known roots installers fall back to when they ignore the override.
pub fn default_install_roots() -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = ["ProgramFiles", "ProgramFiles(x86)", "ProgramW6432"]
        .iter()
        .filter_map(|var| std::env::var_os(var))
        .map(PathBuf::from)
        .collect();

    if let Some(local) = std::env::var_os("LOCALAPPDATA") {
        roots.push(PathBuf::from(local).join("Programs"));
    }
    if let Some(local) = dirs::data_local_dir() {
        let programs = local.join("Programs");
        if !roots.contains(&programs) {
            roots.push(programs);
        }
    }

    roots.dedup();
    roots
}

async fn probe_default_roots(app_hint: Option<&str>) {
    let hint = app_hint.map(str::to_lowercase);

    for root in default_install_roots() {
        let entries = match fs::list_dir(&root).await {
            Ok(Some(entries)) => entries,
            Ok(None) => continue,
            Err(e) => {
                log::debug!("Skipping {}: {}", root.display(), e);
                continue;
            }
        };

        let shown: Vec<&String> = match &hint {
            Some(hint) => entries
                .iter()
                .filter(|name| name.to_lowercase().contains(hint.as_str()))
                .collect(),
            None => entries.iter().take(20).collect(),
        };

        log::info!("Contents of default install root {}:", root.display());
        for name in shown {
            log::info!(" - {name}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn install_dir_name_is_tag_timestamp_token() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            install_dir_name("v1.2.3", now, "abcd1234"),
            "portable_install-v1.2.3-20240309070501-abcd1234"
        );
        assert_eq!(
            install_dir_name("app/v1", now, "00000000"),
            "portable_install-app_v1-20240309070501-00000000"
        );
    }

    #[test]
    fn policy_parses_both_spellings() {
        assert_eq!("WARN".parse::<EmptyInstallPolicy>(), Ok(EmptyInstallPolicy::Warn));
        assert_eq!("error".parse::<EmptyInstallPolicy>(), Ok(EmptyInstallPolicy::Fail));
        assert!("ignore".parse::<EmptyInstallPolicy>().is_err());
    }

    #[test]
    fn unique_dirs_do_not_collide() {
        let root = Path::new("/tmp/runner");
        let a = unique_install_dir(root, "v1.0.0");
        let b = unique_install_dir(root, "v1.0.0");
        assert_ne!(a, b);
        assert!(a.starts_with(root));
    }

    #[tokio::test]
    async fn empty_directory_fails_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_install_dir(dir.path(), EmptyInstallPolicy::Fail, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyInstallResult { .. }));
    }

    #[tokio::test]
    async fn empty_directory_is_tolerated_when_warning() {
        let dir = tempfile::tempdir().unwrap();
        let check = verify_install_dir(dir.path(), EmptyInstallPolicy::Warn, None)
            .await
            .unwrap();
        assert_eq!(check, InstallCheck::Empty);
    }

    #[tokio::test]
    async fn missing_directory_is_always_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_install_dir(&dir.path().join("gone"), EmptyInstallPolicy::Warn, Some("app"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InstallDirectoryMissing { .. }));
    }

    #[tokio::test]
    async fn populated_directory_lists_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.exe"), b"MZ").unwrap();
        std::fs::create_dir(dir.path().join("resources")).unwrap();

        let check = verify_install_dir(dir.path(), EmptyInstallPolicy::Fail, None)
            .await
            .unwrap();
        assert_eq!(
            check,
            InstallCheck::Populated(vec!["app.exe".to_string(), "resources".to_string()])
        );
    }
}
