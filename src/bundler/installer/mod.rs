//! Installer selection and silent invocation.
//!
//! Stage 1 of the pipeline picks a single installer out of the artifact
//! paths produced by the build. The pick also fixes the [`InstallerKind`],
//! which owns the unattended command line used in stage 2.
//!
//! # Priority
//!
//! 1. `*-setup.exe` - NSIS setup produced by the Tauri bundler
//! 2. `*.exe` - any other executable installer, assumed NSIS-compatible
//! 3. `*.msi` - Windows Installer package, run through `msiexec`
//!
//! Within a tier the first candidate in list order wins.

pub mod run;

use crate::bundler::error::{Error, Result};
use regex::Regex;
use std::{
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
    sync::LazyLock,
};

static NSIS_SETUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)-setup\.exe$").unwrap());
static EXECUTABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\.exe$").unwrap());
static PACKAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\.msi$").unwrap());

/// Installer technology, selected once from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerKind {
    /// NSIS setup executable (`-setup.exe`)
    Nsis,
    /// Generic executable installer, invoked with NSIS-style flags
    Exe,
    /// Windows Installer package (`.msi`)
    Msi,
}

impl InstallerKind {
    /// All kinds in selection priority order.
    pub const PRIORITY: [InstallerKind; 3] = [Self::Nsis, Self::Exe, Self::Msi];

    /// Returns whether `candidate` belongs to this kind's tier.
    pub fn matches(self, candidate: &str) -> bool {
        let pattern = match self {
            Self::Nsis => &NSIS_SETUP,
            Self::Exe => &EXECUTABLE,
            Self::Msi => &PACKAGE,
        };
        pattern.is_match(candidate)
    }

    /// Builds the unattended command line installing into `install_dir`.
    ///
    /// NSIS requires `/D=` to be the last argument and unquoted, so the path
    /// is appended verbatim even when it contains spaces.
    pub fn invocation(self, installer: &Path, install_dir: &Path) -> Invocation {
        match self {
            Self::Nsis | Self::Exe => {
                let mut dest = OsString::from("/D=");
                dest.push(install_dir);
                Invocation {
                    program: installer.to_path_buf(),
                    args: vec![OsString::from("/S"), dest],
                }
            }
            Self::Msi => {
                let mut dest = OsString::from("INSTALLDIR=");
                dest.push(install_dir);
                Invocation {
                    program: PathBuf::from("msiexec"),
                    args: vec![
                        OsString::from("/i"),
                        installer.as_os_str().to_owned(),
                        OsString::from("/qn"),
                        dest,
                    ],
                }
            }
        }
    }
}

impl fmt::Display for InstallerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nsis => "NSIS setup",
            Self::Exe => "executable installer",
            Self::Msi => "MSI package",
        };
        f.write_str(name)
    }
}

/// Program and arguments for one silent installer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments, in order
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Renders the command line for logs.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// The installer chosen in stage 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedInstaller {
    /// Installer path, trimmed
    pub path: PathBuf,
    /// Technology that decides the silent flags
    pub kind: InstallerKind,
}

impl SelectedInstaller {
    /// Command line installing into `install_dir`.
    pub fn invocation(&self, install_dir: &Path) -> Invocation {
        self.kind.invocation(&self.path, install_dir)
    }
}

/// Picks the installer from `candidates` by tier, then list order.
///
/// Pure: touches neither the filesystem nor the network.
pub fn select_installer<S: AsRef<str>>(candidates: &[S]) -> Result<SelectedInstaller> {
    for kind in InstallerKind::PRIORITY {
        if let Some(found) = candidates
            .iter()
            .map(|c| c.as_ref().trim())
            .find(|c| kind.matches(c))
        {
            return Ok(SelectedInstaller {
                path: PathBuf::from(found),
                kind,
            });
        }
    }

    Err(Error::NoInstallerFound {
        candidates: candidates.len(),
    })
}

/// Parses the artifact path list handed over by the build step.
///
/// Accepts a JSON array of strings or a newline/semicolon separated list.
/// Entries are trimmed and blank entries dropped.
pub fn parse_candidates(raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim();

    let entries: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        trimmed
            .split(['\r', '\n', ';'])
            .map(str::to_string)
            .collect()
    };

    Ok(entries
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nsis_setup_wins_regardless_of_order() {
        let candidates = ["App-1.2.3.exe", "App-1.2.3.msi", "App-1.2.3-setup.exe"];
        let selected = select_installer(&candidates).unwrap();
        assert_eq!(selected.path, PathBuf::from("App-1.2.3-setup.exe"));
        assert_eq!(selected.kind, InstallerKind::Nsis);
    }

    #[test]
    fn exe_beats_msi() {
        let selected = select_installer(&["App.msi", "tools/App.EXE"]).unwrap();
        assert_eq!(selected.path, PathBuf::from("tools/App.EXE"));
        assert_eq!(selected.kind, InstallerKind::Exe);
    }

    #[test]
    fn msi_is_the_last_resort() {
        let selected = select_installer(&["notes.md", "  App_1.0.0_x64_en-US.msi  "]).unwrap();
        assert_eq!(selected.path, PathBuf::from("App_1.0.0_x64_en-US.msi"));
        assert_eq!(selected.kind, InstallerKind::Msi);
    }

    #[test]
    fn first_candidate_within_a_tier_wins() {
        let selected = select_installer(&["a-setup.exe", "b-setup.exe"]).unwrap();
        assert_eq!(selected.path, PathBuf::from("a-setup.exe"));
    }

    #[test]
    fn nothing_matching_is_no_installer_found() {
        let err = select_installer(&["readme.txt", "App.exe.sig", "App.zip"]).unwrap_err();
        assert!(matches!(err, Error::NoInstallerFound { candidates: 3 }));

        let empty: [&str; 0] = [];
        assert!(matches!(
            select_installer(&empty),
            Err(Error::NoInstallerFound { candidates: 0 })
        ));
    }

    #[test]
    fn nsis_invocation_puts_destination_last() {
        let inv = InstallerKind::Nsis.invocation(
            Path::new("C:/out/App-setup.exe"),
            Path::new("C:/tmp/portable install"),
        );
        assert_eq!(inv.program, PathBuf::from("C:/out/App-setup.exe"));
        assert_eq!(
            inv.args,
            vec![OsString::from("/S"), OsString::from("/D=C:/tmp/portable install")]
        );
    }

    #[test]
    fn msi_invocation_goes_through_msiexec() {
        let inv = InstallerKind::Msi.invocation(Path::new("App.msi"), Path::new("D:/install"));
        assert_eq!(inv.program, PathBuf::from("msiexec"));
        assert_eq!(inv.display(), "msiexec /i App.msi /qn INSTALLDIR=D:/install");
    }

    #[test]
    fn parses_json_arrays() {
        let parsed = parse_candidates(r#"["a/App-setup.exe", " b/App.msi ", ""]"#).unwrap();
        assert_eq!(parsed, vec!["a/App-setup.exe", "b/App.msi"]);
    }

    #[test]
    fn parses_delimited_lists() {
        let parsed = parse_candidates("a/App-setup.exe;b/App.msi\r\n\nc/App.exe\n").unwrap();
        assert_eq!(parsed, vec!["a/App-setup.exe", "b/App.msi", "c/App.exe"]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(parse_candidates("[\"a.exe\""), Err(Error::Json(_))));
    }
}
