//! Upload endpoint templating.

use crate::bundler::error::Result;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static URI_TEMPLATE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^}]*\}$").unwrap());

/// Turns an upload endpoint into the concrete URL for `asset_name`.
///
/// A trailing RFC 6570 expression such as `{?name,label}` is stripped, then
/// a single `name` query parameter is set.
pub fn asset_upload_url(template: &str, asset_name: &str) -> Result<Url> {
    let base = URI_TEMPLATE_SUFFIX.replace(template.trim(), "");
    let mut url = Url::parse(&base)?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "name")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in &kept {
            query.append_pair(key, value);
        }
        query.append_pair("name", asset_name);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_template_and_appends_name() {
        let url = asset_upload_url(
            "https://uploads.github.com/repos/o/r/releases/42/assets{?name,label}",
            "portable-v1.2.3.zip",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://uploads.github.com/repos/o/r/releases/42/assets?name=portable-v1.2.3.zip"
        );
    }

    #[test]
    fn encodes_the_asset_name() {
        let url = asset_upload_url("https://uploads.example/assets", "My App portable.zip").unwrap();
        assert_eq!(url.query(), Some("name=My+App+portable.zip"));
    }

    #[test]
    fn replaces_an_existing_name_parameter() {
        let url = asset_upload_url("https://uploads.example/assets?name=old.zip&label=x", "new.zip").unwrap();
        assert_eq!(url.query(), Some("label=x&name=new.zip"));
    }

    #[test]
    fn rejects_non_urls() {
        assert!(asset_upload_url("not a url{?name}", "a.zip").is_err());
    }
}
