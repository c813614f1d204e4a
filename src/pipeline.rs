//! One snapshot run: fetch → parse → resolve images → write.

use crate::config::Config;
use crate::feed::{fetch_feed, parse_feed, FetchLimits};
use crate::resolver::ImageResolver;
use crate::snapshot::{write_snapshot, Snapshot};
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub path: PathBuf,
    pub snapshot: Snapshot,
}

impl RunSummary {
    /// The line printed once the snapshot is on disk.
    pub fn confirmation(&self) -> String {
        format!("Saved: {}", self.path.display())
    }
}

/// Runs the whole pipeline once.
///
/// Feed download, XML parsing and the final write are fatal; nothing is
/// written when any of them fails. Per-item image scraping never is.
pub async fn run(config: &Config) -> Result<RunSummary> {
    let limits = FetchLimits {
        timeout: config.request_timeout(),
        max_bytes: config.max_response_bytes,
    };
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = limits.timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().context("Failed to build HTTP client")?;

    tracing::info!(feed = %config.feed_url, "Fetching feed");
    let bytes = fetch_feed(&client, &config.feed_url, limits)
        .await
        .with_context(|| format!("Failed to fetch feed {}", config.feed_url))?;

    let items = parse_feed(&bytes, config.max_items)
        .with_context(|| format!("Failed to parse feed {}", config.feed_url))?;
    tracing::info!(items = items.len(), "Feed parsed");

    let resolver = ImageResolver::new(client, config.user_agent.clone(), limits);
    let resolved = resolver.resolve_all(items, config.og_concurrency()).await;

    let missing = resolved.iter().filter(|item| item.image.is_empty()).count();
    if missing > 0 {
        tracing::warn!(missing = missing, "Items without an image");
    }

    let snapshot = Snapshot::new(Utc::now(), resolved);
    write_snapshot(&config.output_path, &snapshot)
        .await
        .with_context(|| format!("Failed to write snapshot {}", config.output_path.display()))?;

    Ok(RunSummary {
        path: config.output_path.clone(),
        snapshot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_line() {
        let summary = RunSummary {
            path: PathBuf::from("assets/note_feed.json"),
            snapshot: Snapshot::new(Utc::now(), Vec::new()),
        };
        assert_eq!(summary.confirmation(), "Saved: assets/note_feed.json");
    }
}
