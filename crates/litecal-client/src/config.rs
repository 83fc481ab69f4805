//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/litecal/config.toml` by default:
//!
//! ```toml
//! debug = false
//!
//! [calendar]
//! default_duration_minutes = 60
//! reminder_minutes = 15
//!
//! [display]
//! max_title_length = 40
//! ```

use std::path::{Path, PathBuf};

use litecal_core::event::is_sentinel;
use litecal_core::{CanonicalizerOptions, DisplayOptions};
use serde::{Deserialize, Serialize};

/// Longest accepted default event duration: one day.
const MAX_DEFAULT_DURATION_MINUTES: u32 = 24 * 60;

/// Configuration for the litecal client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Canonicalization and document settings.
    pub calendar: CalendarSettings,

    /// Display settings.
    pub display: DisplaySettings,
}

/// Settings for building events and documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Title used when none was extracted.
    pub default_title: String,

    /// Event length when no end was extracted.
    pub default_duration_minutes: u32,

    /// Domain part of generated event uids.
    pub uid_domain: String,

    /// `PRODID` written to documents.
    pub product_id: String,

    /// Minutes before the start at which the device calendar alerts.
    pub reminder_minutes: u32,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        let options = CanonicalizerOptions::default();
        Self {
            default_title: options.default_title,
            default_duration_minutes: options.default_duration_minutes,
            uid_domain: options.uid_domain,
            product_id: options.product_id,
            reminder_minutes: options.reminder_minutes,
        }
    }
}

impl CalendarSettings {
    /// Converts to canonicalizer options, rejecting values that would produce
    /// malformed events or documents.
    pub fn to_options(&self) -> Result<CanonicalizerOptions, String> {
        if is_sentinel(&self.default_title) {
            return Err("calendar.default_title must not be blank".to_string());
        }
        if !(1..=MAX_DEFAULT_DURATION_MINUTES).contains(&self.default_duration_minutes) {
            return Err(format!(
                "calendar.default_duration_minutes must be between 1 and {}",
                MAX_DEFAULT_DURATION_MINUTES
            ));
        }
        if self.uid_domain.is_empty()
            || self
                .uid_domain
                .chars()
                .any(|c| c.is_whitespace() || c.is_control() || c == '@')
        {
            return Err(format!(
                "calendar.uid_domain {:?} is not a valid domain",
                self.uid_domain
            ));
        }
        if self.product_id.trim().is_empty() || self.product_id.chars().any(char::is_control) {
            return Err("calendar.product_id must be a single non-empty line".to_string());
        }

        Ok(CanonicalizerOptions {
            default_title: self.default_title.trim().to_string(),
            default_duration_minutes: self.default_duration_minutes,
            uid_domain: self.uid_domain.clone(),
            product_id: self.product_id.clone(),
            reminder_minutes: self.reminder_minutes,
        })
    }
}

/// Display settings for the confirmation card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Maximum title length (truncated with ellipsis).
    pub max_title_length: Option<usize>,
}

impl DisplaySettings {
    pub fn to_options(&self) -> DisplayOptions {
        DisplayOptions {
            max_title_length: self.max_title_length,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if there is no
    /// file there.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("litecal")
    }
}
