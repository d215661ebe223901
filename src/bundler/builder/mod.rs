//! Bundle orchestration.
//!
//! This module provides the [`PortableBundler`] orchestrator that runs the
//! four stages in order:
//!
//! 1. Select the installer from the build's artifact paths
//! 2. Run it silently into a fresh scratch directory and verify the result
//! 3. Compress the installed tree into the portable archive
//! 4. Upload the archive to the release
//!
//! Before stage 2, the release is fetched once and the run aborts if an asset
//! with the same name is already attached.
//!
//! # Example
//!
//! ```no_run
//! use portable_bundler::bundler::{
//!     Error, GitHubReleaseClient, PortableBundler, ReleaseTarget, Repository, SettingsBuilder,
//! };
//!
//! # async fn example() -> portable_bundler::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .candidates(vec!["App-1.2.3-setup.exe".into()])
//!     .tag_name("v1.2.3")
//!     .build()?;
//!
//! let client = GitHubReleaseClient::new(
//!     url::Url::parse("https://api.github.com")?,
//!     "octo/app".parse::<Repository>().map_err(Error::GenericError)?,
//!     ReleaseTarget::Tag("v1.2.3".into()),
//!     std::env::var("TOKEN").unwrap_or_default(),
//! )?;
//!
//! let report = PortableBundler::new(settings).bundle_and_upload(&client).await?;
//! println!("Created: {}", report.bundle.path.display());
//! # Ok(())
//! # }
//! ```

mod orchestrator;

pub use orchestrator::{BundleReport, PortableBundler};
