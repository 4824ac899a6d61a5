//! # Configuration
//!
//! Optional TOML configuration for front ends:
//!
//! ```toml
//! book_path = "bread/dough_book.json"
//! user = "baker"
//! log_filter = "dough_core=debug"
//!
//! [timeline]
//! room_temp_c = 24.0
//! starter_fed = false
//! ```
//!
//! Every key is optional; a missing file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{DoughError, DoughResult};
use crate::timeline::REFERENCE_TEMP_C;

/// Default formula book location, relative to the working directory
pub const DEFAULT_BOOK_PATH: &str = "dough_book.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoughConfig {
    pub book_path: PathBuf,
    /// Name recorded in book lock files
    pub user: String,
    /// `tracing` env-filter directive; logging is off when unset
    pub log_filter: Option<String>,
    pub timeline: TimelineDefaults,
}

impl Default for DoughConfig {
    fn default() -> Self {
        DoughConfig {
            book_path: PathBuf::from(DEFAULT_BOOK_PATH),
            user: default_user(),
            log_filter: None,
            timeline: TimelineDefaults::default(),
        }
    }
}

/// Defaults for timeline generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineDefaults {
    pub room_temp_c: f64,
    pub starter_fed: bool,
}

impl Default for TimelineDefaults {
    fn default() -> Self {
        TimelineDefaults {
            room_temp_c: REFERENCE_TEMP_C,
            starter_fed: true,
        }
    }
}

fn default_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

impl DoughConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Example
    /// ```
    /// use dough_core::config::DoughConfig;
    ///
    /// let config = DoughConfig::from_toml("[timeline]\nroom_temp_c = 25.0").unwrap();
    /// assert_eq!(config.timeline.room_temp_c, 25.0);
    /// assert!(config.timeline.starter_fed);
    /// ```
    pub fn from_toml(text: &str) -> DoughResult<Self> {
        toml::from_str(text).map_err(|e| DoughError::ConfigError {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Load configuration from `path`; a missing file yields the defaults.
pub fn load_config(path: &Path) -> DoughResult<DoughConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(DoughConfig::default());
    }

    let config_error = |reason: String| DoughError::ConfigError {
        path: path.display().to_string(),
        reason,
    };
    let text = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
    let config: DoughConfig = toml::from_str(&text).map_err(|e| config_error(e.to_string()))?;

    debug!(path = %path.display(), book = %config.book_path.display(), "loaded config");
    Ok(config)
}
