use crate::adapters::storage::StoredDocument;
use crate::core::{Incubator, IncubatorId, IncubatorStore, Precondition, Version, Versioned};
use crate::utils::error::{IncubatorError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One `<id>.json` document per incubator under `base_path`.
///
/// Compare-and-write is serialized inside this process only; two processes
/// sharing a directory can still race.
#[derive(Debug, Clone)]
pub struct LocalIncubatorStore {
    base_path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl LocalIncubatorStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn document_path(&self, id: &IncubatorId) -> PathBuf {
        self.base_path.join(format!("{}.json", id.as_str()))
    }

    async fn read_document(&self, id: &IncubatorId) -> Result<Option<StoredDocument>> {
        let path = self.document_path(id);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IncubatorError::IoError(e)),
        };

        let document = serde_json::from_slice(&data).map_err(|e| IncubatorError::StorageError {
            message: format!("Corrupted incubator document {}: {}", path.display(), e),
        })?;
        Ok(Some(document))
    }

    async fn write_document(&self, id: &IncubatorId, document: &StoredDocument) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        let path = self.document_path(id);
        let tmp_path = path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(document)?;

        // 先寫暫存檔再 rename，避免讀到寫一半的檔案
        tokio::fs::write(&tmp_path, &data).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        tracing::debug!(
            "Wrote incubator document {} ({} bytes, revision {})",
            path.display(),
            data.len(),
            document.revision
        );
        Ok(())
    }
}

impl IncubatorStore for LocalIncubatorStore {
    async fn load(&self, id: &IncubatorId) -> Result<Option<Versioned<Incubator>>> {
        Ok(self.read_document(id).await?.map(|document| Versioned {
            version: Version::from_revision(document.revision),
            value: document.incubator,
        }))
    }

    async fn save(
        &self,
        id: &IncubatorId,
        incubator: &Incubator,
        precondition: Precondition,
    ) -> Result<Version> {
        let _guard = self.write_lock.lock().await;

        let stored_revision = match self.read_document(id).await {
            Ok(document) => document.map(|document| document.revision),
            // 覆寫時允許取代損毀的檔案
            Err(IncubatorError::StorageError { .. }) if precondition == Precondition::Any => None,
            Err(e) => return Err(e),
        };

        let accepted = match (&precondition, stored_revision) {
            (Precondition::Any, _) => true,
            (Precondition::Absent, stored) => stored.is_none(),
            (Precondition::Matches(expected), Some(stored)) => {
                expected.revision() == Some(stored)
            }
            (Precondition::Matches(_), None) => false,
        };
        if !accepted {
            return Err(IncubatorError::StoreConflict { id: id.to_string() });
        }

        let revision = stored_revision.unwrap_or(0) + 1;
        self.write_document(id, &StoredDocument::new(revision, incubator.clone()))
            .await?;
        Ok(Version::from_revision(revision))
    }
}
