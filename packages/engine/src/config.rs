use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "stencil.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// What happens to a region whose controlling data is missing or empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDataPolicy {
    /// Drop the region together with its markers
    #[default]
    Delete,
    /// Keep the region body, drop only the markers
    Keep,
    /// Replace the region with the configured marker text
    Marker,
}

impl MissingDataPolicy {
    pub fn parse(src: &str) -> Option<Self> {
        match src {
            "delete" => Some(MissingDataPolicy::Delete),
            "keep" => Some(MissingDataPolicy::Keep),
            "marker" => Some(MissingDataPolicy::Marker),
            _ => None,
        }
    }
}

/// What happens to a placeholder no handler accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCommandPolicy {
    #[default]
    Keep,
    Remove,
    Error,
}

/// Render session options (`stencil.config.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    #[serde(default)]
    pub missing_data: MissingDataPolicy,

    /// Text used by [`MissingDataPolicy::Marker`]
    #[serde(default = "default_missing_marker")]
    pub missing_marker: String,

    #[serde(default)]
    pub unknown_command: UnknownCommandPolicy,

    /// Upper bound on rescans and restarts within one render
    #[serde(default = "default_max_rescans")]
    pub max_rescans: usize,

    /// Variable receiving the iteration index when a loop has no `index` attribute
    #[serde(default = "default_index_name")]
    pub default_index_name: String,
}

fn default_missing_marker() -> String {
    "[missing]".to_string()
}

fn default_max_rescans() -> usize {
    100_000
}

fn default_index_name() -> String {
    "index".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            missing_data: MissingDataPolicy::default(),
            missing_marker: default_missing_marker(),
            unknown_command: UnknownCommandPolicy::default(),
            max_rescans: default_max_rescans(),
            default_index_name: default_index_name(),
        }
    }
}

impl RenderConfig {
    /// Load `stencil.config.json` from `dir`, falling back to defaults when absent
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(src)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "missingData": "marker",
            "missingMarker": "n/a",
            "unknownCommand": "error",
            "maxRescans": 12
        }"#;

        let config = RenderConfig::from_json_str(json).unwrap();
        assert_eq!(config.missing_data, MissingDataPolicy::Marker);
        assert_eq!(config.missing_marker, "n/a");
        assert_eq!(config.unknown_command, UnknownCommandPolicy::Error);
        assert_eq!(config.max_rescans, 12);
        assert_eq!(config.default_index_name, "index");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(RenderConfig::from_json_str("{}").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let err = RenderConfig::from_json_str(r#"{ "missingData": "shrug" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = std::env::temp_dir().join("stencil-config-absent");
        let config = RenderConfig::load(&dir).unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_on_missing_attribute_values() {
        assert_eq!(MissingDataPolicy::parse("keep"), Some(MissingDataPolicy::Keep));
        assert_eq!(MissingDataPolicy::parse("KEEP"), None);
    }
}
