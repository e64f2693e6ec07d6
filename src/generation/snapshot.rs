use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub path: String,
    pub content: String,
}

/// Flat disk copy of one generation result. Keyed by a fresh id per
/// request, so concurrent writes never touch the same file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: Uuid,
    pub prompt: String,
    pub files: Vec<SnapshotFile>,
    pub summary: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Snapshot {
    pub fn new(prompt: &str, code: &str) -> Self {
        let summary = if prompt.chars().count() > 120 {
            let head: String = prompt.chars().take(117).collect();
            format!("{head}...")
        } else {
            prompt.to_string()
        };
        Self {
            id: Uuid::new_v4(),
            prompt: prompt.to_string(),
            files: vec![SnapshotFile {
                path: "index.html".into(),
                content: code.to_string(),
            }],
            summary,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Best-effort JSON-file persistence for generated snapshots. Callers log
/// write failures and move on; this store is a convenience, not the record
/// of truth.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub async fn write(&self, snapshot: &Snapshot) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create snapshot dir {}", self.dir.display()))?;
        let path = self.dir.join(format!("{}.json", snapshot.id));
        let body = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("write snapshot {}", path.display()))?;
        debug!(path = %path.display(), "snapshot written");
        Ok(path)
    }

    pub async fn read(&self, id: Uuid) -> anyhow::Result<Snapshot> {
        let path = self.dir.join(format!("{id}.json"));
        let body = tokio::fs::read(&path)
            .await
            .with_context(|| format!("read snapshot {}", path.display()))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> SnapshotStore {
        let dir = std::env::temp_dir().join(format!("snapui-snapshots-{}", Uuid::new_v4()));
        SnapshotStore::new(dir)
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let store = temp_store();
        let snapshot = Snapshot::new("a hero section", "<section>hi</section>");
        store.write(&snapshot).await.expect("write snapshot");

        let loaded = store.read(snapshot.id).await.expect("read snapshot");
        assert_eq!(loaded.id, snapshot.id);
        assert_eq!(loaded.prompt, "a hero section");
        assert_eq!(loaded.files.len(), 1);
        assert_eq!(loaded.files[0].path, "index.html");
        assert_eq!(loaded.files[0].content, "<section>hi</section>");
    }

    #[test]
    fn summary_truncates_long_prompts() {
        let prompt = "p".repeat(200);
        let snapshot = Snapshot::new(&prompt, "<div/>");
        assert_eq!(snapshot.summary.chars().count(), 120);
        assert!(snapshot.summary.ends_with("..."));

        let short = Snapshot::new("short prompt", "<div/>");
        assert_eq!(short.summary, "short prompt");
    }
}
