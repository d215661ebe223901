//! Release lookup and asset upload (stage 4).
//!
//! The pipeline talks to the release host through [`ReleaseApi`], so the
//! orchestration can be exercised without a network. [`GitHubReleaseClient`]
//! is the production implementation on top of `reqwest`.

mod client;
mod types;
mod upload_url;

pub use client::{GitHubReleaseClient, ReleaseApi};
pub use types::{Release, ReleaseAsset, ReleaseTarget, Repository};
pub use upload_url::asset_upload_url;
