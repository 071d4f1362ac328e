use crate::campaign::{DEFAULT_MESSAGE, DEFAULT_PREVIEW_LIMIT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    pub preview: PreviewSettings,
    pub campaign: CampaignSettings,
    pub warnings: WarningSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Customers requested per preview
    pub limit: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignSettings {
    pub default_message: String,
    /// Used as `createdBy` when no user is given on the command line
    pub created_by: String,
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            default_message: DEFAULT_MESSAGE.to_string(),
            created_by: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningSettings {
    /// Warn about fields and operators outside the backend schema
    pub unknown_tokens: bool,
    /// Warn when rows on the same field are silently merged
    pub collisions: bool,
}

impl Default for WarningSettings {
    fn default() -> Self {
        Self {
            unknown_tokens: true,
            collisions: true,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<SegmentConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<SegmentConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<SegmentConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static SegmentConfig {
    static DEFAULT_CONFIG: LazyLock<SegmentConfig> = LazyLock::new(SegmentConfig::default);
    &DEFAULT_CONFIG
}
