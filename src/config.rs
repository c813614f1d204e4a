//! Optional TOML configuration for a snapshot run.
//!
//! The config file is optional; a missing file yields `Config::default()`,
//! which reproduces the stock behavior: fetch the note.com feed, keep 12 items,
//! write `assets/note_feed.json`. Unknown keys are ignored by serde, though we
//! log a warning when the file contains potential typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Feed fetched when nothing else is configured.
pub const DEFAULT_FEED_URL: &str = "https://note.com/loyal_dill1011/rss";

/// Snapshot destination, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "assets/note_feed.json";

/// Number of feed items kept in a snapshot.
pub const DEFAULT_MAX_ITEMS: usize = 12;

/// User-Agent sent when scraping item pages for `og:image`.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

const DEFAULT_MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024; // 10MB

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file is bigger than [`Config::MAX_FILE_SIZE`].
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Settings for one snapshot run.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// RSS feed to snapshot.
    pub feed_url: String,

    /// Where the JSON snapshot is written. Parent directories are created.
    pub output_path: PathBuf,

    /// Items beyond this count are dropped, in document order.
    pub max_items: usize,

    /// User-Agent header for the `og:image` page fetch.
    pub user_agent: String,

    /// Per-request timeout in seconds. Unset means requests may hang forever.
    pub request_timeout_secs: Option<u64>,

    /// Upper bound on any response body (feed or item page).
    pub max_response_bytes: usize,

    /// How many item pages may be scraped at once. 1 = strictly sequential.
    pub og_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            max_items: DEFAULT_MAX_ITEMS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: None,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            og_concurrency: 1,
        }
    }
}

impl Config {
    /// Largest config file `load` will read (1 MiB).
    pub const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Reads run settings from a TOML file.
    ///
    /// A missing or blank file means the stock run, so `notefeed --config`
    /// can point at a file that does not exist yet. Keys other than the
    /// fields of [`Config`] are warned about and ignored.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Removed after the size check
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Warn about keys that are not Config fields
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "feed_url",
                "output_path",
                "max_items",
                "user_agent",
                "request_timeout_secs",
                "max_response_bytes",
                "og_concurrency",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), feed = %config.feed_url, "Loaded configuration");
        Ok(config)
    }

    /// Request timeout as a `Duration`, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Effective scrape concurrency (never zero).
    pub fn og_concurrency(&self) -> usize {
        self.og_concurrency.max(1)
    }
}

// ============================================================================
// Tests
// ============================================================================
