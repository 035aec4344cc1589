//! Map style references.
//!
//! A style reference identifies the visual style an offline region is
//! downloaded for. It is a composite of the style URL and the API key,
//! rendered as a single URI with the key attached as a query parameter.
//! Once built it is treated as an opaque, immutable handle.

use std::fmt;

use crate::config::ConfigError;

/// Opaque handle identifying a map style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleReference {
    uri: String,
}

impl StyleReference {
    /// Build a style reference from a style URL and an API key.
    ///
    /// Both values are required configuration; a blank value is an
    /// unrecoverable configuration error, not something to retry.
    pub fn new(style_url: &str, api_key: &str) -> Result<Self, ConfigError> {
        if style_url.trim().is_empty() {
            return Err(ConfigError::MissingValue("style.url"));
        }
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingValue("style.api_key"));
        }
        Ok(Self {
            uri: format!("{}?key={}", style_url, api_key),
        })
    }

    /// The composite style URI, key included.
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for StyleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri)
    }
}
