//! Main portable-bundle orchestration.

use crate::bundler::{
    archive::{self, PortableBundle},
    checksum::calculate_sha256,
    error::{Error, ErrorExt, Result},
    installer::{
        self, SelectedInstaller,
        run::{self as install, InstallCheck},
    },
    release::{ReleaseApi, ReleaseAsset, asset_upload_url},
    settings::Settings,
};
use bytes::Bytes;
use std::path::PathBuf;

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct BundleReport {
    /// Installer that was run
    pub installer: SelectedInstaller,
    /// Scratch directory the installer populated
    pub install_dir: PathBuf,
    /// Top-level entries of the install directory
    pub installed: Vec<String>,
    /// Archive on disk
    pub bundle: PortableBundle,
    /// Uploaded asset, `None` for local-only runs
    pub asset: Option<ReleaseAsset>,
}

/// Portable-bundle orchestrator.
///
/// Stages run strictly in sequence and every failure is terminal: nothing
/// is retried, the surrounding CI job is expected to re-run instead.
#[derive(Debug)]
pub struct PortableBundler {
    settings: Settings,
}

impl PortableBundler {
    /// Creates an orchestrator for `settings`.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Returns a reference to the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The asset name this run produces.
    pub fn archive_name(&self) -> String {
        archive::archive_name(
            self.settings.tag_name(),
            self.settings.app_name(),
            self.settings.os_name(),
        )
    }

    /// Stage 1. Pure; fails with [`Error::NoInstallerFound`] before any side effect.
    pub fn select_installer(&self) -> Result<SelectedInstaller> {
        let selected = installer::select_installer(self.settings.candidates())?;
        log::info!(
            "Chosen installer: {} ({})",
            selected.path.display(),
            selected.kind
        );
        Ok(selected)
    }

    /// Runs stages 1-3 without touching the network.
    pub async fn bundle(&self) -> Result<BundleReport> {
        let installer = self.select_installer()?;
        let name = self.archive_name();
        self.install_and_archive(installer, name).await
    }

    /// Runs all stages, uploading the archive through `api`.
    ///
    /// The release is fetched before the installer runs; an existing asset
    /// with the computed name aborts with [`Error::DuplicateAssetName`].
    pub async fn bundle_and_upload<A: ReleaseApi>(&self, api: &A) -> Result<BundleReport> {
        let installer = self.select_installer()?;
        let name = self.archive_name();

        let release = api.fetch_release().await?;
        log::info!(
            "Release {} ({} asset(s)) fetched",
            release.tag_name,
            release.assets.len()
        );
        if let Some(existing) = release.find_asset(&name) {
            return Err(Error::DuplicateAssetName {
                name,
                existing_url: existing.browser_download_url.clone(),
            });
        }

        let template = self
            .settings
            .upload_url()
            .unwrap_or(release.upload_url.as_str());
        let upload_url = asset_upload_url(template, &name)?;

        let mut report = self.install_and_archive(installer, name).await?;

        let body = tokio::fs::read(&report.bundle.path)
            .await
            .fs_context("reading archive for upload", &report.bundle.path)?;
        let asset = api.upload_asset(&upload_url, Bytes::from(body)).await?;
        log::info!("Uploaded asset: {}", asset.display_url());

        report.asset = Some(asset);
        Ok(report)
    }

    /// Stages 2 and 3.
    async fn install_and_archive(
        &self,
        installer: SelectedInstaller,
        name: String,
    ) -> Result<BundleReport> {
        let install_dir =
            install::unique_install_dir(self.settings.temp_root(), self.settings.tag_name());
        install::prepare_install_dir(&install_dir).await?;
        install::run_installer(&installer, &install_dir).await?;

        let installed = match install::verify_install_dir(
            &install_dir,
            self.settings.empty_install(),
            self.settings.app_name(),
        )
        .await?
        {
            InstallCheck::Populated(entries) => entries,
            InstallCheck::Empty => Vec::new(),
        };

        let path = self.settings.workspace().join(&name);
        archive::create_archive(self.settings.archiver(), &install_dir, &path).await?;

        let size = tokio::fs::metadata(&path)
            .await
            .fs_context("reading archive metadata", &path)?
            .len();
        let sha256 = calculate_sha256(&path).await?;
        log::info!("Created zip: {} ({} bytes, sha256 {})", path.display(), size, sha256);

        Ok(BundleReport {
            installer,
            install_dir,
            installed,
            bundle: PortableBundle {
                name,
                path,
                size,
                sha256,
            },
            asset: None,
        })
    }
}
