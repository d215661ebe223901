//! Command line interface for the portable bundler.
//!
//! Parses arguments, validates them into a [`BuildConfig`], runs the
//! pipeline and reports the result in a form the CI runner understands.

mod args;
pub mod ci_output;
mod config;
mod output;

pub use args::Args;
pub use config::{BuildConfig, UploadConfig};
pub use output::OutputManager;

use crate::bundler::{self, PortableBundler};
use crate::error::{BundlerError, Result};
use std::path::Path;

/// Maximum number of workspace entries listed when no installer is found.
const WORKSPACE_SAMPLE: usize = 20;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args()?;
    let output = OutputManager::new(args.verbose, args.quiet);
    run_with(args, &output).await
}

/// Runs one build for already-parsed arguments.
pub async fn run_with(args: Args, output: &OutputManager) -> Result<i32> {
    output.progress("Start portable bundle build")?;

    let config = BuildConfig::from_args(args)?;
    let settings = config.settings.clone();
    output.info(&format!(
        "Found {} candidate artifact path(s).",
        settings.candidates().len()
    ))?;

    let pipeline = PortableBundler::new(settings);
    let result = match &config.upload {
        Some(upload) => {
            output.section(&format!(
                "Building {} for {} ({})",
                pipeline.archive_name(),
                upload.repository,
                pipeline.settings().tag_name()
            ))?;
            pipeline.bundle_and_upload(&upload.client()?).await
        }
        None => {
            output.section(&format!("Building {} (upload skipped)", pipeline.archive_name()))?;
            pipeline.bundle().await
        }
    };

    let report = match result {
        Ok(report) => report,
        Err(e @ bundler::Error::NoInstallerFound { .. }) => {
            list_workspace(output, pipeline.settings().workspace()).await?;
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    output.success(&format!(
        "Chosen installer: {} ({})",
        report.installer.path.display(),
        report.installer.kind
    ))?;
    output.success(&format!(
        "Created zip: {} ({} bytes)",
        report.bundle.path.display(),
        report.bundle.size
    ))?;
    output.indent(&format!("sha256: {}", report.bundle.sha256))?;
    output.verbose(&format!("Install directory: {}", report.install_dir.display()))?;
    for name in &report.installed {
        output.verbose(&format!("  - {}", name))?;
    }
    if let Some(asset) = &report.asset {
        output.success(&format!("Uploaded asset: {}", asset.display_url()))?;
    }

    let zip_path = report.bundle.path.display().to_string();
    match &config.output_file {
        Some(path) => {
            ci_output::append_output(path, "portable_zip", &zip_path)?;
            output.info(&format!("Set step output 'portable_zip' -> {}", zip_path))?;
        }
        None => output.info("GITHUB_OUTPUT not set; skipping step output write.")?,
    }

    output.info(&format!("All done. Portable zip path: {}", zip_path))?;
    output.progress("Finished portable bundle build successfully")?;
    Ok(0)
}

/// Prints the failure as a CI error annotation.
pub fn report_failure(error: &BundlerError) {
    log::debug!("Run failed: {:?}", error);
    let output = OutputManager::new(false, false);
    if let Err(e) = output.error(&format!("❌ {} [{}]", error, error.kind())) {
        eprintln!("Error: {} ({})", error, e);
    }
}

/// Lists the top of the workspace to show what the build actually produced.
async fn list_workspace(output: &OutputManager, workspace: &Path) -> Result<()> {
    match bundler::utils::fs::list_dir(workspace).await {
        Ok(Some(entries)) => {
            output.group("Workspace top-level sample")?;
            for name in entries.iter().take(WORKSPACE_SAMPLE) {
                output.indent(&format!("- {}", name))?;
            }
            output.end_group()?;
        }
        Ok(None) => output.warn(&format!(
            "Workspace {} does not exist",
            workspace.display()
        ))?,
        Err(e) => log::debug!("Cannot list workspace: {}", e),
    }
    Ok(())
}
