#![forbid(unsafe_code)]

//! Palette configuration.
//!
//! [`PaletteConfig`] carries the tunables the controller and the built-in
//! categories read at construction. With the `config` feature (on by
//! default) it can be loaded from TOML or JSON; every field has a default, so
//! a partial file only overrides what it names.
//!
//! ```toml
//! max_results = 50
//! fuzzy_ratio_percent = 25
//!
//! [keys]
//! j = "next"
//! k = "previous"
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unreadable file | I/O error | [`ConfigError::Io`] |
//! | Bad syntax / unknown field | Parse error | [`ConfigError::Toml`] / [`ConfigError::Json`] |
//! | Unknown extension | Not `.toml` / `.json` | [`ConfigError::UnsupportedFormat`] |
//! | Out-of-range value | e.g. `max_results = 0` | [`ConfigError::Invalid`] |

use std::path::{Path, PathBuf};

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::keys::KeyMap;
use crate::matching::{DEFAULT_FUZZY_RATIO_PERCENT, MatchMode};
use crate::state::DEFAULT_MAX_RESULTS;

/// Per-category ceiling while the palette shows every category collapsed.
pub const DEFAULT_PREVIEW_RESULTS: usize = 8;

/// Errors from loading or validating a [`PaletteConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML syntax or schema error.
    #[cfg(feature = "config")]
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON syntax or schema error.
    #[cfg(feature = "config")]
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    /// The file extension names no supported format.
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    /// A field holds a value outside its valid range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for the palette controller and built-in categories.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct PaletteConfig {
    /// Default result ceiling per category.
    pub max_results: usize,
    /// Per-category ceiling when no category is active and the state is collapsed.
    pub preview_results: usize,
    /// Fuzzy acceptance threshold, percent of the query length.
    pub fuzzy_ratio_percent: u32,
    /// Fall back to fuzzy matching when substring matching finds nothing.
    pub fuzzy_fallback: bool,
    /// Extra key bindings layered over the defaults.
    pub keys: KeyMap,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            preview_results: DEFAULT_PREVIEW_RESULTS,
            fuzzy_ratio_percent: DEFAULT_FUZZY_RATIO_PERCENT,
            fuzzy_fallback: true,
            keys: KeyMap::empty(),
        }
    }
}

impl PaletteConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_results == 0 {
            return Err(ConfigError::Invalid {
                field: "max_results",
                reason: "must be at least 1".into(),
            });
        }
        if self.preview_results == 0 {
            return Err(ConfigError::Invalid {
                field: "preview_results",
                reason: "must be at least 1".into(),
            });
        }
        if !(1..=100).contains(&self.fuzzy_ratio_percent) {
            return Err(ConfigError::Invalid {
                field: "fuzzy_ratio_percent",
                reason: format!("{} is outside 1..=100", self.fuzzy_ratio_percent),
            });
        }
        Ok(())
    }

    /// Default bindings with [`keys`](Self::keys) layered on top.
    #[must_use]
    pub fn key_map(&self) -> KeyMap {
        let mut map = KeyMap::default();
        map.extend(&self.keys);
        map
    }

    /// Match mode implied by the fuzzy settings.
    #[must_use]
    pub fn match_mode(&self) -> MatchMode {
        if self.fuzzy_fallback {
            MatchMode::SubstringThenFuzzy {
                ratio_percent: self.fuzzy_ratio_percent,
            }
        } else {
            MatchMode::Substring
        }
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "config")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    #[cfg(feature = "config")]
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml` or `.json` file.
    #[cfg(feature = "config")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&source)?,
            Some("json") => Self::from_json_str(&source)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ));
            }
        };
        tracing::debug!(path = %path.display(), "loaded palette config");
        Ok(config)
    }
}
