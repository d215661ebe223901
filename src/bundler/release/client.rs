//! GitHub Releases REST client.

use super::types::{Release, ReleaseAsset, ReleaseTarget, Repository};
use crate::{
    bail,
    bundler::error::{Error, Result},
};
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use std::future::Future;
use url::Url;

/// Media type GitHub recommends for REST calls.
const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const CLIENT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Operations the pipeline needs from the release host.
pub trait ReleaseApi {
    /// Fetches the target release's metadata.
    fn fetch_release(&self) -> impl Future<Output = Result<Release>> + Send;

    /// Uploads `body` as a ZIP asset to the concrete `upload_url`.
    fn upload_asset(
        &self,
        upload_url: &Url,
        body: Bytes,
    ) -> impl Future<Output = Result<ReleaseAsset>> + Send;
}

/// Authenticated client for one repository and release.
#[derive(Debug, Clone)]
pub struct GitHubReleaseClient {
    http: reqwest::Client,
    api_url: Url,
    repository: Repository,
    target: ReleaseTarget,
    token: String,
}

impl GitHubReleaseClient {
    /// Creates a client.
    ///
    /// # Arguments
    ///
    /// * `api_url` - REST root, `https://api.github.com` on github.com
    /// * `repository` - Repository owning the release
    /// * `target` - Release id or tag
    /// * `token` - Token sent as `Authorization: Bearer`
    pub fn new(
        api_url: Url,
        repository: Repository,
        target: ReleaseTarget,
        token: String,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            api_url,
            repository,
            target,
            token,
        })
    }

    /// REST URL of the target release.
    pub fn release_url(&self) -> Result<Url> {
        let mut url = self.api_url.clone();
        {
            let Ok(mut segments) = url.path_segments_mut() else {
                bail!("invalid API URL: {}", self.api_url);
            };
            segments.pop_if_empty().extend([
                "repos",
                self.repository.owner.as_str(),
                self.repository.name.as_str(),
                "releases",
            ]);
            match &self.target {
                ReleaseTarget::Id(id) => {
                    segments.push(&id.to_string());
                }
                ReleaseTarget::Tag(tag) => {
                    segments.extend(["tags", tag.as_str()]);
                }
            }
        }
        Ok(url)
    }
}

impl ReleaseApi for GitHubReleaseClient {
    async fn fetch_release(&self) -> Result<Release> {
        let url = self.release_url()?;
        log::debug!("Fetching release metadata from {}", url);

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ReleaseLookupFailed {
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        Ok(response.json().await?)
    }

    async fn upload_asset(&self, upload_url: &Url, body: Bytes) -> Result<ReleaseAsset> {
        log::info!("Uploading asset to: {}", upload_url);

        let response = self
            .http
            .post(upload_url.clone())
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(CONTENT_TYPE, "application/zip")
            .header(CONTENT_LENGTH, body.len())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UploadRejected {
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        Ok(response.json().await?)
    }
}

/// Parses the JSON error document, if the response carried one.
async fn error_body(response: reqwest::Response) -> Option<serde_json::Value> {
    let bytes = response.bytes().await.ok()?;
    serde_json::from_slice(&bytes).ok()
}
