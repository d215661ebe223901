//! Portable-bundle pipeline.
//!
//! Takes the installer a Tauri-style build produced, installs it silently
//! into a scratch directory, zips the installed tree and attaches the ZIP to
//! the release.
//!
//! # Module Organization
//!
//! - [`installer`] - candidate parsing, installer selection and silent runs
//! - [`archive`] - bundle naming and archive creation
//! - [`checksum`] - SHA-256 of the produced archive
//! - [`release`] - release lookup and asset upload
//! - [`builder`] - the [`PortableBundler`] orchestrator
//! - [`settings`] - [`Settings`] and [`SettingsBuilder`]

pub mod archive;
pub mod builder;
pub mod checksum;
pub mod error;
pub mod installer;
pub mod release;
pub mod settings;
pub mod utils;

pub use archive::{ArchiveBackend, PortableBundle};
pub use builder::{BundleReport, PortableBundler};
pub use error::{Error, Result};
pub use installer::{InstallerKind, SelectedInstaller, run::EmptyInstallPolicy};
pub use release::{
    GitHubReleaseClient, Release, ReleaseApi, ReleaseAsset, ReleaseTarget, Repository,
};
pub use settings::{Settings, SettingsBuilder};
