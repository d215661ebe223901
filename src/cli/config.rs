//! Validated run configuration.
//!
//! [`BuildConfig::from_args`] checks every input once and reports all
//! missing or invalid values together, so a misconfigured workflow is fixed
//! in one round trip instead of one variable at a time.

use super::Args;
use crate::bundler::{
    ArchiveBackend, EmptyInstallPolicy, GitHubReleaseClient, ReleaseTarget, Repository, Settings,
    SettingsBuilder, installer::parse_candidates, release::asset_upload_url,
};
use crate::error::{BundlerError, CliError, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use url::Url;

const DEFAULT_API_URL: &str = "https://api.github.com";

/// Release API access, present unless `--no-upload` was given.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub api_url: Url,
    pub repository: Repository,
    pub target: ReleaseTarget,
    pub token: String,
}

impl UploadConfig {
    /// Builds the HTTP client for this release.
    pub fn client(&self) -> Result<GitHubReleaseClient> {
        Ok(GitHubReleaseClient::new(
            self.api_url.clone(),
            self.repository.clone(),
            self.target.clone(),
            self.token.clone(),
        )?)
    }
}

/// Everything a run needs, validated.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub settings: Settings,
    pub upload: Option<UploadConfig>,
    pub output_file: Option<PathBuf>,
}

impl BuildConfig {
    /// Validates `args`, collecting every problem before failing.
    pub fn from_args(args: Args) -> Result<Self> {
        let mut problems = Vec::new();

        let tag_name = non_empty(args.tag_name).or_else(|| non_empty(args.ref_name));
        if tag_name.is_none() {
            problems.push("TAG_NAME (or GITHUB_REF_NAME) is not set".to_string());
        }

        let candidates = match non_empty(args.artifact_paths) {
            None => {
                problems.push("ARTIFACT_PATHS is not set".to_string());
                None
            }
            Some(raw) => match parse_candidates(&raw) {
                Ok(paths) if paths.is_empty() => {
                    problems.push("ARTIFACT_PATHS contains no paths".to_string());
                    None
                }
                Ok(paths) => Some(paths),
                Err(e) => {
                    problems.push(format!("ARTIFACT_PATHS is not a valid path list: {e}"));
                    None
                }
            },
        };

        let archiver: Option<ArchiveBackend> =
            parse_or_report(non_empty(args.archiver), &mut problems);
        let empty_install: Option<EmptyInstallPolicy> =
            parse_or_report(non_empty(args.empty_install), &mut problems);

        let workspace = match args.workspace.filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => absolute_or_report("GITHUB_WORKSPACE", &path, &mut problems),
            None => match std::env::current_dir() {
                Ok(dir) => Some(dir),
                Err(e) => {
                    problems.push(format!("cannot determine workspace directory: {e}"));
                    None
                }
            },
        };
        let temp_root = args
            .temp_dir
            .filter(|p| !p.as_os_str().is_empty())
            .and_then(|path| absolute_or_report("RUNNER_TEMP", &path, &mut problems));

        let upload_url = non_empty(args.upload_url);
        let upload = if args.no_upload {
            None
        } else {
            collect_upload_config(
                non_empty(args.token),
                non_empty(args.repository),
                non_empty(args.release_id),
                non_empty(args.api_url),
                upload_url.as_deref(),
                tag_name.as_deref(),
                &mut problems,
            )
        };

        if !problems.is_empty() {
            return Err(CliError::InvalidConfiguration { problems }.into());
        }

        let (Some(tag_name), Some(candidates), Some(workspace)) = (tag_name, candidates, workspace)
        else {
            unreachable!("missing values are reported as problems");
        };

        let mut builder = SettingsBuilder::new()
            .candidates(candidates)
            .tag_name(tag_name)
            .workspace(workspace)
            .app_name(non_empty(args.app_name))
            .os_name(non_empty(args.os_name))
            .upload_url(upload_url)
            .archiver(archiver.unwrap_or_default())
            .empty_install(empty_install.unwrap_or_default());
        if let Some(temp_root) = temp_root {
            builder = builder.temp_root(temp_root);
        }
        let settings = builder.build().map_err(BundlerError::from)?;

        Ok(Self {
            settings,
            upload,
            output_file: args.output_file.filter(|p| !p.as_os_str().is_empty()),
        })
    }
}

fn collect_upload_config(
    token: Option<String>,
    repository: Option<String>,
    release_id: Option<String>,
    api_url: Option<String>,
    upload_url: Option<&str>,
    tag_name: Option<&str>,
    problems: &mut Vec<String>,
) -> Option<UploadConfig> {
    if token.is_none() {
        problems.push("TOKEN is not set".to_string());
    }

    let repository = match repository {
        None => {
            problems.push("GITHUB_REPOSITORY is not set".to_string());
            None
        }
        Some(raw) => match raw.parse::<Repository>() {
            Ok(repo) => Some(repo),
            Err(e) => {
                problems.push(format!("GITHUB_REPOSITORY {e}"));
                None
            }
        },
    };

    let target = match release_id {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(id) => Some(ReleaseTarget::Id(id)),
            Err(_) => {
                problems.push(format!("RELEASE_ID '{raw}' is not a number"));
                None
            }
        },
        None => tag_name.map(|tag| ReleaseTarget::Tag(tag.to_string())),
    };

    let api_url_raw = api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let api_url = match Url::parse(&api_url_raw) {
        Ok(url) => Some(url),
        Err(e) => {
            problems.push(format!("GITHUB_API_URL '{api_url_raw}' is not a valid URL: {e}"));
            None
        }
    };

    if let Some(raw) = upload_url {
        if let Err(e) = asset_upload_url(raw, "portable.zip") {
            problems.push(format!("RELEASE_UPLOAD_URL '{raw}' is not a valid URL: {e}"));
        }
    }

    Some(UploadConfig {
        api_url: api_url?,
        repository: repository?,
        target: target?,
        token: token?,
    })
}

/// Installers only honour absolute target directories, so relative inputs
/// are resolved against the current directory once, here.
fn absolute_or_report(name: &str, path: &Path, problems: &mut Vec<String>) -> Option<PathBuf> {
    match path.absolutize() {
        Ok(path) => Some(path.into_owned()),
        Err(e) => {
            problems.push(format!("{name} '{}' cannot be made absolute: {e}", path.display()));
            None
        }
    }
}

fn parse_or_report<T>(raw: Option<String>, problems: &mut Vec<String>) -> Option<T>
where
    T: std::str::FromStr<Err = String>,
{
    match raw?.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            problems.push(e);
            None
        }
    }
}

/// CI passes unset inputs as empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_args() -> Args {
        Args {
            token: Some("t0ken".into()),
            repository: Some("octo/app".into()),
            workspace: Some(PathBuf::from("/ws")),
            tag_name: Some("v1.2.3".into()),
            artifact_paths: Some(r#"["App-1.2.3-setup.exe","App-1.2.3.msi"]"#.into()),
            ..Default::default()
        }
    }

    fn problems(args: Args) -> Vec<String> {
        match BuildConfig::from_args(args) {
            Err(BundlerError::Cli(CliError::InvalidConfiguration { problems })) => problems,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn complete_arguments_validate() {
        let config = BuildConfig::from_args(full_args()).unwrap();
        assert_eq!(config.settings.tag_name(), "v1.2.3");
        assert_eq!(config.settings.candidates().len(), 2);
        assert_eq!(config.settings.temp_root(), std::path::Path::new("/ws/.tmp"));

        let upload = config.upload.unwrap();
        assert_eq!(upload.target, ReleaseTarget::Tag("v1.2.3".into()));
        assert_eq!(upload.api_url.as_str(), "https://api.github.com/");
    }

    #[test]
    fn all_problems_are_reported_together() {
        let found = problems(Args {
            workspace: Some(PathBuf::from("/ws")),
            ..Default::default()
        });
        assert_eq!(
            found,
            vec![
                "TAG_NAME (or GITHUB_REF_NAME) is not set",
                "ARTIFACT_PATHS is not set",
                "TOKEN is not set",
                "GITHUB_REPOSITORY is not set",
            ]
        );
    }

    #[test]
    fn invalid_values_are_reported() {
        let found = problems(Args {
            repository: Some("octo".into()),
            release_id: Some("latest".into()),
            archiver: Some("rar".into()),
            ..full_args()
        });
        assert_eq!(found.len(), 3);
        assert!(found[0].starts_with("unknown archiver 'rar'"));
        assert!(found[1].contains("owner/repo"));
        assert!(found[2].contains("RELEASE_ID 'latest'"));
    }

    #[test]
    fn ref_name_backs_up_tag_name_and_empty_values_are_unset() {
        let config = BuildConfig::from_args(Args {
            tag_name: Some("".into()),
            ref_name: Some("v9.9.9".into()),
            release_id: Some("17".into()),
            app_name: Some(" ".into()),
            ..full_args()
        })
        .unwrap();
        assert_eq!(config.settings.tag_name(), "v9.9.9");
        assert_eq!(config.settings.app_name(), None);
        assert_eq!(config.upload.unwrap().target, ReleaseTarget::Id(17));
    }

    #[test]
    fn no_upload_needs_no_credentials() {
        let config = BuildConfig::from_args(Args {
            token: None,
            repository: None,
            no_upload: true,
            empty_install: Some("warn".into()),
            ..full_args()
        })
        .unwrap();
        assert!(config.upload.is_none());
        assert_eq!(config.settings.empty_install(), EmptyInstallPolicy::Warn);
    }

    #[test]
    fn relative_directories_become_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let config = BuildConfig::from_args(Args {
            workspace: Some(PathBuf::from("ws")),
            temp_dir: Some(PathBuf::from("runner/tmp")),
            ..full_args()
        })
        .unwrap();

        assert!(config.settings.workspace().is_absolute());
        assert_eq!(config.settings.workspace(), cwd.join("ws"));
        assert_eq!(config.settings.temp_root(), cwd.join("runner").join("tmp"));
    }

    #[test]
    fn relative_workspace_gives_absolute_scratch_root() {
        let config = BuildConfig::from_args(Args {
            workspace: Some(PathBuf::from("ws")),
            ..full_args()
        })
        .unwrap();
        assert!(config.settings.temp_root().is_absolute());
        assert!(config.settings.temp_root().ends_with("ws/.tmp"));
    }

    #[test]
    fn delimited_paths_without_entries_are_rejected() {
        let found = problems(Args {
            artifact_paths: Some(";\n;".into()),
            ..full_args()
        });
        assert_eq!(found, vec!["ARTIFACT_PATHS contains no paths"]);
    }
}
