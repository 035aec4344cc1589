//! Configuration surface.
//!
//! Three string values are required before anything else can run: the map
//! style URL, the style API key, and the renderer token. A blank value for
//! any of them is a fatal startup error with a descriptive message, never a
//! runtime error to retry.
//!
//! Values are resolved from an INI config file (see [`config_file_path`]),
//! with `TILEPACK_*` environment variables taking precedence. The CLI's
//! `config` command edits the file through the typed [`ConfigKey`] surface.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

/// Environment variable overriding the style URL.
pub const ENV_STYLE_URL: &str = "TILEPACK_STYLE_URL";
/// Environment variable overriding the style API key.
pub const ENV_API_KEY: &str = "TILEPACK_API_KEY";
/// Environment variable overriding the renderer token.
pub const ENV_MAP_TOKEN: &str = "TILEPACK_MAP_TOKEN";

/// Errors produced by the configuration layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A required value is blank or absent. Fatal at startup.
    #[error("required configuration value '{0}' is not set")]
    MissingValue(&'static str),

    /// The key string does not name a known configuration setting.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    /// The config file exists but could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    /// The config file could not be written.
    #[error("failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tilepack")
        .join("config.ini")
}

/// On-disk configuration, INI-backed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// `[style] url` - base URL of the map style.
    pub style_url: String,
    /// `[style] api_key` - API key appended to the style URL.
    pub api_key: String,
    /// `[map] token` - token required by the map renderer.
    pub map_token: String,
}

impl ConfigFile {
    /// Load from the default path. A missing file yields the default
    /// (empty) configuration.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        let get = |section: &str, key: &str| -> String {
            ini.section(Some(section))
                .and_then(|s| s.get(key))
                .unwrap_or("")
                .to_string()
        };

        Ok(Self {
            style_url: get("style", "url"),
            api_key: get("style", "api_key"),
            map_token: get("map", "token"),
        })
    }

    /// Save to the default path, creating parent directories as needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some("style"))
            .set("url", self.style_url.as_str())
            .set("api_key", self.api_key.as_str());
        ini.with_section(Some("map"))
            .set("token", self.map_token.as_str());

        ini.write_to_file(path)
            .map_err(|e| ConfigError::SaveFailed(e.to_string()))
    }
}

/// Typed handle to a single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    StyleUrl,
    ApiKey,
    MapToken,
}

impl ConfigKey {
    /// Every known key, in display order.
    pub fn all() -> &'static [ConfigKey] {
        &[Self::StyleUrl, Self::ApiKey, Self::MapToken]
    }

    /// INI section the key lives in.
    pub fn section(&self) -> &'static str {
        match self {
            Self::StyleUrl | Self::ApiKey => "style",
            Self::MapToken => "map",
        }
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        match self {
            Self::StyleUrl => "url",
            Self::ApiKey => "api_key",
            Self::MapToken => "token",
        }
    }

    /// Fully qualified `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StyleUrl => "style.url",
            Self::ApiKey => "style.api_key",
            Self::MapToken => "map.token",
        }
    }

    /// Read this key's value from a config file.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::StyleUrl => config.style_url.clone(),
            Self::ApiKey => config.api_key.clone(),
            Self::MapToken => config.map_token.clone(),
        }
    }

    /// Write this key's value into a config file.
    pub fn set(&self, config: &mut ConfigFile, value: &str) {
        let value = value.to_string();
        match self {
            Self::StyleUrl => config.style_url = value,
            Self::ApiKey => config.api_key = value,
            Self::MapToken => config.map_token = value,
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "style.url" => Ok(Self::StyleUrl),
            "style.api_key" => Ok(Self::ApiKey),
            "map.token" => Ok(Self::MapToken),
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }
}

/// Resolved configuration handed to the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineConfig {
    /// Base URL of the map style.
    pub style_url: String,
    /// API key appended to the style URL.
    pub api_key: String,
    /// Token required by the map renderer.
    pub map_token: String,
}

impl OfflineConfig {
    /// Build from explicit values.
    pub fn new(
        style_url: impl Into<String>,
        api_key: impl Into<String>,
        map_token: impl Into<String>,
    ) -> Self {
        Self {
            style_url: style_url.into(),
            api_key: api_key.into(),
            map_token: map_token.into(),
        }
    }

    /// Resolve from a config file, letting `TILEPACK_*` environment
    /// variables override file values.
    pub fn from_file(config: &ConfigFile) -> Self {
        let env_or = |name: &str, fallback: &str| -> String {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };

        Self {
            style_url: env_or(ENV_STYLE_URL, &config.style_url),
            api_key: env_or(ENV_API_KEY, &config.api_key),
            map_token: env_or(ENV_MAP_TOKEN, &config.map_token),
        }
    }

    /// Check that every required value is present.
    ///
    /// Returns the first missing value; callers treat this as fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.style_url.trim().is_empty() {
            return Err(ConfigError::MissingValue("style.url"));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingValue("style.api_key"));
        }
        if self.map_token.trim().is_empty() {
            return Err(ConfigError::MissingValue("map.token"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_complete_config() {
        let config = OfflineConfig::new("https://maps.example.com/style.json", "key", "token");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_first_missing_value() {
        let config = OfflineConfig::new("", "key", "token");
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingValue("style.url"))
        );

        let config = OfflineConfig::new("url", "   ", "token");
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingValue("style.api_key"))
        );

        let config = OfflineConfig::new("url", "key", "");
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingValue("map.token"))
        );
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");

        let config = ConfigFile {
            style_url: "https://maps.example.com/style.json".to_string(),
            api_key: "abc123".to_string(),
            map_token: "tok".to_string(),
        };
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_file_missing_keys_default_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[style]\nurl = https://maps.example.com\n").unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded.style_url, "https://maps.example.com");
        assert_eq!(loaded.api_key, "");
        assert_eq!(loaded.map_token, "");
    }

    #[test]
    fn test_config_key_parse() {
        assert_eq!("style.url".parse::<ConfigKey>().unwrap(), ConfigKey::StyleUrl);
        assert_eq!(
            "style.api_key".parse::<ConfigKey>().unwrap(),
            ConfigKey::ApiKey
        );
        assert_eq!("map.token".parse::<ConfigKey>().unwrap(), ConfigKey::MapToken);
        assert!(matches!(
            "nope".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_config_key_get_set() {
        let mut config = ConfigFile::default();
        ConfigKey::ApiKey.set(&mut config, "secret");
        assert_eq!(ConfigKey::ApiKey.get(&config), "secret");
        assert_eq!(config.api_key, "secret");
    }

    #[test]
    fn test_config_key_all_sections() {
        let sections: Vec<_> = ConfigKey::all().iter().map(|k| k.section()).collect();
        assert_eq!(sections, vec!["style", "style", "map"]);
    }
}
