//! Release API data model. Only the fields the pipeline reads are kept.

use serde::Deserialize;
use std::{fmt, str::FromStr};

/// A release, fetched once for the duplicate-asset guard.
///
/// See the GitHub [docs](https://docs.github.com/en/rest/releases/releases#get-a-release).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    /// RFC 6570 template, e.g. `https://uploads.github.com/.../assets{?name,label}`
    pub upload_url: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Finds an asset by exact name.
    pub fn find_asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// A release asset, as listed on a release or returned by an upload.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReleaseAsset {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

impl ReleaseAsset {
    /// Best link to show in logs.
    pub fn display_url(&self) -> &str {
        self.browser_download_url
            .as_deref()
            .or(self.url.as_deref())
            .unwrap_or(&self.name)
    }
}

/// Which release the bundle is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseTarget {
    /// Numeric release id
    Id(u64),
    /// Release looked up by tag name
    Tag(String),
}

/// `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl FromStr for Repository {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(format!("'{s}' is not in owner/repo form")),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_deserializes_from_api_payload() {
        let release: Release = serde_json::from_str(
            r#"{
                "id": 42,
                "tag_name": "v1.2.3",
                "upload_url": "https://uploads.github.com/repos/o/r/releases/42/assets{?name,label}",
                "html_url": "https://github.com/o/r/releases/tag/v1.2.3",
                "draft": false,
                "assets": [
                    {"id": 7, "name": "App-1.2.3-setup.exe", "size": 10,
                     "browser_download_url": "https://github.com/o/r/releases/download/v1.2.3/App-1.2.3-setup.exe"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(release.id, 42);
        assert!(release.find_asset("App-1.2.3-setup.exe").is_some());
        assert!(release.find_asset("portable-v1.2.3.zip").is_none());
    }

    #[test]
    fn repository_requires_owner_and_name() {
        let repo: Repository = "tauri-apps/tauri".parse().unwrap();
        assert_eq!(repo.owner, "tauri-apps");
        assert_eq!(repo.to_string(), "tauri-apps/tauri");

        assert!("tauri".parse::<Repository>().is_err());
        assert!("/tauri".parse::<Repository>().is_err());
        assert!("a/b/c".parse::<Repository>().is_err());
    }

    #[test]
    fn display_url_prefers_browser_download_url() {
        let asset = ReleaseAsset {
            id: 1,
            name: "portable-v1.zip".into(),
            size: 3,
            url: Some("https://api.github.com/assets/1".into()),
            browser_download_url: None,
        };
        assert_eq!(asset.display_url(), "https://api.github.com/assets/1");
    }
}
