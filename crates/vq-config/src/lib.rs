// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # vq-config
//!
//! Read-only configuration discovery. Values are resolved with CLI flags
//! taking precedence over environment variables taking precedence over
//! the config file; the file lives at
//! `$XDG_CONFIG_HOME/api-cli/virtuoso-config.yaml` or
//! `$HOME/.api-cli/virtuoso-config.yaml`, whichever exists first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;
use vq_error::PlatformError;

/// Default platform endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api-app2.virtuoso.qa/api";
/// Config file name.
pub const CONFIG_FILE: &str = "virtuoso-config.yaml";
/// Directory name under `$XDG_CONFIG_HOME` / `$HOME`.
pub const CONFIG_DIR: &str = "api-cli";

// ── Environment keys ────────────────────────────────────────────────────

/// `VIRTUOSO_API_BASE_URL`.
pub const ENV_BASE_URL: &str = "VIRTUOSO_API_BASE_URL";
/// `VIRTUOSO_API_TOKEN`.
pub const ENV_TOKEN: &str = "VIRTUOSO_API_TOKEN";
/// `VIRTUOSO_ORGANIZATION_ID`.
pub const ENV_ORGANIZATION: &str = "VIRTUOSO_ORGANIZATION_ID";
/// `VIRTUOSO_HEADERS_X_VIRTUOSO_CLIENT_ID`.
pub const ENV_CLIENT_ID: &str = "VIRTUOSO_HEADERS_X_VIRTUOSO_CLIENT_ID";
/// `VIRTUOSO_HEADERS_X_VIRTUOSO_CLIENT_NAME`.
pub const ENV_CLIENT_NAME: &str = "VIRTUOSO_HEADERS_X_VIRTUOSO_CLIENT_NAME";
/// `VIRTUOSO_OUTPUT_DEFAULT_FORMAT`.
pub const ENV_OUTPUT_FORMAT: &str = "VIRTUOSO_OUTPUT_DEFAULT_FORMAT";

// ── Types ───────────────────────────────────────────────────────────────

/// On-disk config file shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Platform base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Organization id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Extra headers (`X-Virtuoso-Client-ID`, `X-Virtuoso-Client-Name`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Default output format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

/// Values supplied on the command line; they win over everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--base-url`.
    pub base_url: Option<String>,
    /// `--token`.
    pub api_token: Option<String>,
    /// `--organization`.
    pub organization_id: Option<String>,
    /// `--output`.
    pub output_format: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Platform base URL.
    pub base_url: String,
    /// Bearer token; empty when unconfigured.
    pub api_token: String,
    /// Organization id; empty when unconfigured.
    pub organization_id: String,
    /// `X-Virtuoso-Client-ID` header value.
    pub client_id: String,
    /// `X-Virtuoso-Client-Name` header value.
    pub client_name: String,
    /// Default output format name.
    pub output_format: Option<String>,
    /// Where the file layer was read from, if any.
    pub file_path: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration from the real environment and filesystem.
    pub fn load(overrides: Overrides) -> Result<Self, PlatformError> {
        let (file, path) = read_file_layer()?;
        Ok(Self::resolve(overrides, file, path, &|key| {
            std::env::var(key).ok()
        }))
    }

    /// Pure resolution: flags > environment > file > defaults.
    #[must_use]
    pub fn resolve(
        overrides: Overrides,
        file: FileConfig,
        file_path: Option<PathBuf>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Self {
        let pick = |flag: Option<String>, env_key: &str, file_value: Option<String>| {
            flag.or_else(|| env(env_key)).or(file_value)
        };

        let client_id = env(ENV_CLIENT_ID)
            .or_else(|| file.headers.get("X-Virtuoso-Client-ID").cloned())
            .unwrap_or_else(|| "api-cli".to_string());
        let client_name = env(ENV_CLIENT_NAME)
            .or_else(|| file.headers.get("X-Virtuoso-Client-Name").cloned())
            .unwrap_or_else(|| "api-cli".to_string());

        Self {
            base_url: pick(overrides.base_url, ENV_BASE_URL, file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_token: pick(overrides.api_token, ENV_TOKEN, file.api_token)
                .unwrap_or_default(),
            organization_id: pick(
                overrides.organization_id,
                ENV_ORGANIZATION,
                file.organization_id,
            )
            .unwrap_or_default(),
            client_id,
            client_name,
            output_format: pick(
                overrides.output_format,
                ENV_OUTPUT_FORMAT,
                file.output_format,
            ),
            file_path,
        }
    }

    /// Validation errors that make platform calls impossible.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.api_token.trim().is_empty() {
            errors.push(format!(
                "no API token configured (set {ENV_TOKEN} or api_token in the config file)"
            ));
        }
        if self.organization_id.trim().is_empty() {
            errors.push(format!(
                "no organization id configured (set {ENV_ORGANIZATION} or organization_id in the config file)"
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            errors.push(format!("base URL '{}' is not absolute", self.base_url));
        }
        errors
    }

    /// Validate and convert the error list into a taxonomy error.
    pub fn ensure_valid(&self) -> Result<(), PlatformError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PlatformError::validation(errors.join("; "))
                .with_hint("run `api-cli validate-config` for details"))
        }
    }
}

// ── File discovery ──────────────────────────────────────────────────────

/// Candidate config file paths, in precedence order.
#[must_use]
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        out.push(PathBuf::from(xdg).join(CONFIG_DIR).join(CONFIG_FILE));
    }
    if let Some(dirs) = directories::UserDirs::new() {
        out.push(
            dirs.home_dir()
                .join(format!(".{CONFIG_DIR}"))
                .join(CONFIG_FILE),
        );
    }
    out
}

fn read_file_layer() -> Result<(FileConfig, Option<PathBuf>), PlatformError> {
    for path in candidate_paths() {
        match std::fs::read_to_string(&path) {
            Ok(raw) => {
                debug!(target: "vq.config", path = %path.display(), "loaded config file");
                let parsed: FileConfig = serde_yaml::from_str(&raw).map_err(|e| {
                    PlatformError::validation(format!(
                        "config file {} is invalid: {e}",
                        path.display()
                    ))
                })?;
                return Ok((parsed, Some(path)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(PlatformError::internal(format!(
                    "cannot read config file {}: {e}",
                    path.display()
                )))
            }
        }
    }
    Ok((FileConfig::default(), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_when_nothing_configured() {
        let cfg = Config::resolve(Overrides::default(), FileConfig::default(), None, &no_env);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.client_id, "api-cli");
        assert!(cfg.api_token.is_empty());
        assert_eq!(cfg.validate().len(), 2);
    }

    #[test]
    fn flags_beat_env_beats_file() {
        let file = FileConfig {
            base_url: Some("https://file.example".into()),
            api_token: Some("file-token".into()),
            organization_id: Some("file-org".into()),
            ..FileConfig::default()
        };
        let env = |key: &str| match key {
            ENV_BASE_URL => Some("https://env.example".to_string()),
            ENV_TOKEN => Some("env-token".to_string()),
            _ => None,
        };
        let overrides = Overrides {
            base_url: Some("https://flag.example".into()),
            ..Overrides::default()
        };
        let cfg = Config::resolve(overrides, file, None, &env);
        assert_eq!(cfg.base_url, "https://flag.example");
        assert_eq!(cfg.api_token, "env-token");
        assert_eq!(cfg.organization_id, "file-org");
    }

    #[test]
    fn headers_come_from_env_or_file_headers_map() {
        let mut file = FileConfig::default();
        file.headers
            .insert("X-Virtuoso-Client-ID".into(), "file-id".into());
        let env = |key: &str| match key {
            ENV_CLIENT_NAME => Some("env-name".to_string()),
            _ => None,
        };
        let cfg = Config::resolve(Overrides::default(), file, None, &env);
        assert_eq!(cfg.client_id, "file-id");
        assert_eq!(cfg.client_name, "env-name");
    }

    #[test]
    fn file_config_parses_expected_yaml() {
        let raw = r#"
base_url: https://api-app2.virtuoso.qa/api
api_token: tok
organization_id: "1234"
headers:
  X-Virtuoso-Client-ID: my-client
output_format: json
"#;
        let file: FileConfig = serde_yaml::from_str(raw).unwrap();
        assert_eq!(file.organization_id.as_deref(), Some("1234"));
        assert_eq!(
            file.headers.get("X-Virtuoso-Client-ID").map(String::as_str),
            Some("my-client")
        );
        let cfg = Config::resolve(Overrides::default(), file, None, &no_env);
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.output_format.as_deref(), Some("json"));
    }

    #[test]
    fn ensure_valid_surfaces_taxonomy_error() {
        let cfg = Config::resolve(Overrides::default(), FileConfig::default(), None, &no_env);
        let err = cfg.ensure_valid().unwrap_err();
        assert_eq!(err.kind, vq_error::ErrorKind::Validation);
        assert!(err.message.contains("VIRTUOSO_API_TOKEN"));
    }

    #[test]
    fn relative_base_url_fails_validation() {
        let file = FileConfig {
            base_url: Some("api.example/api".into()),
            api_token: Some("t".into()),
            organization_id: Some("o".into()),
            ..FileConfig::default()
        };
        let cfg = Config::resolve(Overrides::default(), file, None, &no_env);
        assert_eq!(cfg.validate().len(), 1);
    }
}
