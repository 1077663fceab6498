//! Client configuration
//!
//! Loaded from a YAML file with PascalCase keys:
//!
//! ```yaml
//! Endpoint:
//!   Host: api.example.org
//!   Port: 443
//!   Timeout: 30
//! Auth:
//!   AccessToken: ...
//!   UserToken: ...
//! ```
//!
//! Lookup order: explicit path, `<config_dir>/sciobjsdb/config.yaml`,
//! `~/.sciobjsdb/config.yaml`. A missing file yields an empty configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error};

use crate::sciobjsdb::error::{Result, SciObjsDbError};

const CONFIG_DIR_NAME: &str = "sciobjsdb";
const CONFIG_FILE_NAME: &str = "config.yaml";
const HOME_CONFIG_PATH: &str = ".sciobjsdb/config.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    /// Optional deadline in seconds for connecting and for each call;
    /// `0` means no deadline
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl EndpointConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthConfig {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user_token: Option<String>,
}

impl AuthConfig {
    /// Configured access token; empty strings count as unset
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Configured API token; empty strings count as unset
    pub fn user_token(&self) -> Option<&str> {
        self.user_token.as_deref().filter(|t| !t.is_empty())
    }
}

impl Config {
    /// Parse a configuration document
    pub fn from_yaml_str(data: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document is an empty configuration, not an error
        if data.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(data)
    }

    /// Load the configuration from `path`, or from the default locations
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.is_file() {
                    let err = SciObjsDbError::Config(format!(
                        "Configuration file '{}' doesn't exist",
                        path.display()
                    ));
                    error!("{}", err);
                    return Err(err);
                }
                path.to_path_buf()
            }
            None => match Self::default_path() {
                Some(path) => path,
                None => {
                    debug!("No configuration file found, using an empty configuration");
                    return Ok(Config::default());
                }
            },
        };

        debug!("Reading config file at '{}'", path.display());
        let data = std::fs::read_to_string(&path).map_err(|source| {
            error!("Could not read config file '{}': {}", path.display(), source);
            SciObjsDbError::File {
                path: path.clone(),
                source,
            }
        })?;

        Self::from_yaml_str(&data).map_err(|e| {
            let err = SciObjsDbError::Config(format!(
                "Could not parse config file '{}': {}",
                path.display(),
                e
            ));
            error!("{}", err);
            err
        })
    }

    /// Apply command line / environment overrides for the endpoint
    pub fn with_endpoint_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.endpoint.host = host;
        }
        if let Some(port) = port {
            self.endpoint.port = port;
        }
        self
    }

    fn default_path() -> Option<PathBuf> {
        let candidates = [
            dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)),
            dirs::home_dir().map(|dir| dir.join(HOME_CONFIG_PATH)),
        ];

        candidates.into_iter().flatten().find(|path| path.is_file())
    }
}
