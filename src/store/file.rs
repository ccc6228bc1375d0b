use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{validate_id, ContentStore, StoreError, StoreResult, TriviaRecord};

/// One `<id>.json` file per trivia record
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &str) -> StoreResult<PathBuf> {
        validate_id(id)?;
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

fn not_found_as(id: &str, err: std::io::Error) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::NotFound(id.to_string())
    } else {
        StoreError::Io(err)
    }
}

#[async_trait]
impl ContentStore for JsonDirStore {
    async fn fetch(&self, id: &str) -> StoreResult<TriviaRecord> {
        let path = self.path_for(id)?;
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| not_found_as(id, e))?;
        let mut record: TriviaRecord = serde_json::from_str(&raw)?;
        // The file name is authoritative
        record.id = id.to_string();
        Ok(record)
    }

    async fn list(&self) -> StoreResult<Vec<TriviaRecord>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Transport(format!(
                    "cannot read {}: {}",
                    self.dir.display(),
                    e
                )))
            }
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.fetch(id).await {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping trivia file {}: {}", path.display(), e),
            }
        }

        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    async fn save(&self, record: &TriviaRecord) -> StoreResult<()> {
        let path = self.path_for(&record.id)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write then rename so a crash never leaves a half-written record
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!("Saved trivia {} to {}", record.id, path.display());
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let path = self.path_for(id)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| not_found_as(id, e))
    }

    fn name(&self) -> &str {
        "json-dir"
    }
}
