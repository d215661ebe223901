//! Portable bundle naming and archive creation (stage 3).
//!
//! The archive is first written next to its destination under a unique
//! `.partial.zip` name and then renamed into place, so a reader never sees a
//! half-written file and two runs never interleave writes into one archive.
//!
//! # Backends
//!
//! - [`ArchiveBackend::Native`] - in-process deflate via the `zip` crate
//! - [`ArchiveBackend::System`] - `Compress-Archive` on Windows, `zip -r` elsewhere

mod native;
mod system;

use crate::bundler::{
    error::{ErrorExt, Result},
    utils::fs,
};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

/// How the install directory gets compressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArchiveBackend {
    /// `zip` crate, no external tool needed
    #[default]
    Native,
    /// Platform compression tool
    System,
}

impl FromStr for ArchiveBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "system" => Ok(Self::System),
            other => Err(format!(
                "unknown archiver '{other}' (expected 'native' or 'system')"
            )),
        }
    }
}

impl fmt::Display for ArchiveBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Native => "native",
            Self::System => "system",
        })
    }
}

/// Replaces characters that are not portable in file names with `_`.
pub fn sanitize_component(component: &str) -> String {
    component
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() || c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Computes the asset name: `[<app>-]portable-<tag>[-<os>].zip`.
pub fn archive_name(tag: &str, app_name: Option<&str>, os_name: Option<&str>) -> String {
    let mut name = String::new();
    if let Some(app) = app_name.map(str::trim).filter(|s| !s.is_empty()) {
        name.push_str(&sanitize_component(app));
        name.push('-');
    }
    name.push_str("portable-");
    name.push_str(&sanitize_component(tag));
    if let Some(os) = os_name.map(str::trim).filter(|s| !s.is_empty()) {
        name.push('-');
        name.push_str(&sanitize_component(os));
    }
    name.push_str(".zip");
    name
}

/// A finished portable bundle on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortableBundle {
    /// Asset name, also the file name
    pub name: String,
    /// Final archive path
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Hex-encoded SHA-256 of the archive
    pub sha256: String,
}

/// Compresses the contents of `install_dir` into `destination`.
///
/// Any stale archive at `destination` is removed first, so re-running with
/// the same name replaces the archive rather than merging into it.
pub async fn create_archive(
    backend: ArchiveBackend,
    install_dir: &Path,
    destination: &Path,
) -> Result<()> {
    if fs::remove_file(destination).await? {
        log::info!("Removed stale archive {}", destination.display());
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent, false).await?;
    }

    // Platform tools refuse an empty tree (`zip -r` exits 12)
    let backend = match backend {
        ArchiveBackend::System if is_empty_dir(install_dir).await? => {
            log::warn!(
                "{} is empty; writing an empty archive with the native archiver",
                install_dir.display()
            );
            ArchiveBackend::Native
        }
        backend => backend,
    };

    let partial = partial_path(destination);
    log::debug!("Writing archive to {}", partial.display());

    let written = match backend {
        ArchiveBackend::Native => native::write_zip(install_dir, &partial).await,
        ArchiveBackend::System => system::compress(install_dir, &partial).await,
    };
    if let Err(e) = written {
        // Best-effort cleanup; the write error is returned.
        let _ = fs::remove_file(&partial).await;
        return Err(e);
    }

    tokio::fs::rename(&partial, destination)
        .await
        .fs_context("moving archive into place", destination)?;

    log::info!("Created archive {} using {} archiver", destination.display(), backend);
    Ok(())
}

async fn is_empty_dir(dir: &Path) -> Result<bool> {
    Ok(fs::list_dir(dir).await?.is_some_and(|entries| entries.is_empty()))
}

/// Unique sibling of `destination` used while the archive is being written.
fn partial_path(destination: &Path) -> PathBuf {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "portable".to_string());
    let token = uuid::Uuid::new_v4().simple().to_string();
    destination.with_file_name(format!(".{stem}.{}.partial.zip", &token[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_defaults_to_portable_tag() {
        assert_eq!(archive_name("v1.2.3", None, None), "portable-v1.2.3.zip");
    }

    #[test]
    fn name_is_qualified_by_app_and_os() {
        assert_eq!(
            archive_name("v1.2.3", Some("My App"), Some("windows")),
            "My_App-portable-v1.2.3-windows.zip"
        );
        assert_eq!(
            archive_name("v2.0.0", Some(""), Some("win-x64")),
            "portable-v2.0.0-win-x64.zip"
        );
    }

    #[test]
    fn tags_with_slashes_stay_one_file_name() {
        assert_eq!(archive_name("app/v1.0", None, None), "portable-app_v1.0.zip");
    }

    #[test]
    fn partial_path_is_a_hidden_sibling() {
        let dest = Path::new("/ws/portable-v1.zip");
        let partial = partial_path(dest);
        assert_eq!(partial.parent(), dest.parent());
        let name = partial.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".portable-v1."));
        assert!(name.ends_with(".partial.zip"));
        assert_ne!(partial, partial_path(dest));
    }

    #[tokio::test]
    async fn system_backend_handles_an_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let install_dir = dir.path().join("install");
        std::fs::create_dir(&install_dir).unwrap();
        let destination = dir.path().join("portable-v1.zip");

        create_archive(ArchiveBackend::System, &install_dir, &destination)
            .await
            .unwrap();

        let archive = zip::ZipArchive::new(std::fs::File::open(&destination).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[tokio::test]
    async fn stale_archive_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let install_dir = dir.path().join("install");
        std::fs::create_dir(&install_dir).unwrap();
        std::fs::write(install_dir.join("app.exe"), b"MZ").unwrap();
        let destination = dir.path().join("out").join("portable-v1.zip");
        std::fs::create_dir(dir.path().join("out")).unwrap();
        std::fs::write(&destination, b"stale").unwrap();

        create_archive(ArchiveBackend::Native, &install_dir, &destination)
            .await
            .unwrap();

        let archive = zip::ZipArchive::new(std::fs::File::open(&destination).unwrap()).unwrap();
        assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["app.exe"]);
        assert_eq!(std::fs::read_dir(dir.path().join("out")).unwrap().count(), 1);
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("Native".parse::<ArchiveBackend>(), Ok(ArchiveBackend::Native));
        assert_eq!("system".parse::<ArchiveBackend>(), Ok(ArchiveBackend::System));
        assert!("7z".parse::<ArchiveBackend>().is_err());
    }
}
