//! The persisted JSON snapshot and its writer.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One feed item with its resolved image, in the on-disk shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItem {
    pub title: String,
    pub link: String,
    /// Publish date exactly as written in the feed.
    pub pub_date: String,
    /// Image URL, or empty when nothing was found.
    pub image: String,
}

/// Everything a run writes: a generation timestamp and the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// ISO-8601 UTC, millisecond precision, `Z` suffix.
    pub updated_at: String,
    pub items: Vec<ResolvedItem>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Snapshot {
    pub fn new(updated_at: DateTime<Utc>, items: Vec<ResolvedItem>) -> Self {
        Self {
            updated_at: updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            items,
        }
    }

    /// Parses `updated_at` back into a timestamp.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.updated_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Pretty-printed JSON with 2-space indentation.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Writes `snapshot` to `path`, replacing any previous file.
///
/// Missing parent directories are created. The JSON is written to a sibling
/// temporary file and renamed into place, so the destination is never left
/// half-written.
pub async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let json = snapshot.to_json()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| SnapshotError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let temp_path = path.with_extension(format!("tmp.{}", std::process::id()));

    if let Err(source) = tokio::fs::write(&temp_path, json.as_bytes()).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(SnapshotError::Write {
            path: temp_path,
            source,
        });
    }

    // On Windows, rename fails if destination exists, so remove it first
    #[cfg(windows)]
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        if let Err(source) = tokio::fs::remove_file(path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(SnapshotError::Write {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    if let Err(source) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(SnapshotError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    tracing::debug!(path = %path.display(), items = snapshot.items.len(), "Snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample() -> Snapshot {
        let at = Utc.with_ymd_and_hms(2025, 10, 18, 0, 0, 0).unwrap();
        Snapshot::new(
            at,
            vec![
                ResolvedItem {
                    title: "First".to_string(),
                    link: "https://example.com/1".to_string(),
                    pub_date: "Sat, 18 Oct 2025 09:00:00 +0900".to_string(),
                    image: "https://example.com/1.jpg".to_string(),
                },
                ResolvedItem {
                    title: "Second".to_string(),
                    link: "https://example.com/2".to_string(),
                    pub_date: "Fri, 17 Oct 2025 09:00:00 +0900".to_string(),
                    image: String::new(),
                },
            ],
        )
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("notefeed_snapshot_test_{name}"));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn test_timestamp_format() {
        let snapshot = sample();
        assert_eq!(snapshot.updated_at, "2025-10-18T00:00:00.000Z");
        assert_eq!(
            snapshot.updated_at(),
            Some(Utc.with_ymd_and_hms(2025, 10, 18, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_json_field_names() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["updatedAt"], "2025-10-18T00:00:00.000Z");
        assert_eq!(value["items"][0]["title"], "First");
        assert_eq!(value["items"][0]["link"], "https://example.com/1");
        assert_eq!(value["items"][0]["pubDate"], "Sat, 18 Oct 2025 09:00:00 +0900");
        assert_eq!(value["items"][1]["image"], "");
        // Two-space indentation
        assert!(json.contains("\n  \"updatedAt\""));
    }

    #[tokio::test]
    async fn test_write_creates_directories_and_round_trips() {
        let dir = temp_dir("round_trip");
        let path = dir.join("assets").join("note_feed.json");
        let snapshot = sample();

        write_snapshot(&path, &snapshot).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: Snapshot = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, snapshot);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_write_replaces_existing_file() {
        let dir = temp_dir("replace");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("note_feed.json");
        std::fs::write(&path, "{\"stale\": true}").unwrap();

        let snapshot = Snapshot::new(Utc::now(), Vec::new());
        write_snapshot(&path, &snapshot).await.unwrap();

        let parsed: Snapshot =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, snapshot);
        // No temp file left behind
        let leftovers: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert_eq!(leftovers.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_write_into_file_as_directory_fails() {
        let dir = temp_dir("blocked");
        std::fs::create_dir_all(&dir).unwrap();
        // A regular file where a directory is needed
        let blocker = dir.join("assets");
        std::fs::write(&blocker, "").unwrap();

        let result = write_snapshot(&blocker.join("note_feed.json"), &sample()).await;
        assert!(matches!(result, Err(SnapshotError::CreateDir { .. })));

        std::fs::remove_dir_all(&dir).ok();
    }
}
