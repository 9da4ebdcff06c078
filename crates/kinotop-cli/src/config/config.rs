//! `AppConfig` struct and TOML read/write.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Page cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Scraping settings.
    #[serde(default)]
    pub scrape: ScrapeConfig,
}

/// Page cache configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entry time-to-live in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
    /// Maximum number of cached pages.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            capacity: default_capacity(),
        }
    }
}

/// Scraping configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Venue-count threshold for the schedule listing (strict).
    #[serde(default = "default_min_venue_count")]
    pub min_venue_count: usize,
    /// Default number of films shown by `top`.
    #[serde(default = "default_top_count")]
    pub top_count: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            min_venue_count: default_min_venue_count(),
            top_count: default_top_count(),
        }
    }
}

const fn default_ttl_hours() -> u64 {
    24
}

const fn default_capacity() -> usize {
    100
}

const fn default_min_venue_count() -> usize {
    30
}

const fn default_top_count() -> usize {
    10
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}
