//! Viewer configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! By default the viewer looks for `config.toml` in the current directory.
//! Pass `--config <FILE>` to point at another file. A missing default file is
//! not an error; a missing explicit file is.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [parser]
//! image_extensions = ["jpg", "jpeg", "png", "gif", "bmp", "webp"]
//!
//! [transport]
//! timeout_secs = 15         # Per-request timeout
//! user_agent = "autoindex-viewer/0.1.0"
//!
//! [viewer]
//! subdirs = false           # Start in subdirectory mode
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::listing::{DEFAULT_IMAGE_EXTENSIONS, IndexParser};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Viewer configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Which links count as images.
    pub parser: ParserConfig,
    /// HTTP client settings.
    pub transport: TransportConfig,
    /// Front-end defaults.
    pub viewer: ViewerDefaults,
}

impl ViewerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parser.image_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "parser.image_extensions must not be empty".into(),
            ));
        }
        if let Some(bad) = self
            .parser
            .image_extensions
            .iter()
            .find(|e| e.is_empty() || e.contains(['.', '/']))
        {
            return Err(ConfigError::Validation(format!(
                "parser.image_extensions entry '{bad}' must be a bare extension like \"jpg\""
            )));
        }
        if self.transport.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "transport.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Build the index parser described by `[parser]`.
    pub fn index_parser(&self) -> IndexParser {
        IndexParser::new(&self.parser.image_extensions)
    }
}

/// Index parsing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// File extensions (without dot, any case) treated as images.
    pub image_extensions: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: concat!("autoindex-viewer/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Defaults for the interactive front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerDefaults {
    /// Start sessions in subdirectory mode.
    pub subdirs: bool,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ViewerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ViewerConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ViewerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Falls back to stock defaults when the file does not exist.
pub fn load_config(dir: &Path) -> Result<ViewerConfig, ConfigError> {
    let path = dir.join("config.toml");
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Load config from an explicit file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# autoindex-viewer configuration
# ===============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Index parsing
# ---------------------------------------------------------------------------
[parser]
# Links whose filename ends in one of these extensions (any case) are images.
# Everything else except subdirectories is ignored.
image_extensions = ["jpg", "jpeg", "png", "gif", "bmp", "webp"]

# ---------------------------------------------------------------------------
# HTTP
# ---------------------------------------------------------------------------
[transport]
# Whole-request timeout in seconds.
timeout_secs = 15

# User-Agent header sent with each request.
# user_agent = "autoindex-viewer/<version>"

# ---------------------------------------------------------------------------
# Viewer
# ---------------------------------------------------------------------------
[viewer]
# Treat the submitted URL as a directory of subdirectories and browse them
# one at a time. Can be toggled per session with --subdirs or the `s` command.
subdirs = false
"##
}
