use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::{BlobError, BlobResult, VideoId, VideoRecord};

pub const METADATA_FILE: &str = "metadata.json";

/// The authoritative, ordered list of video records
///
/// The whole list is read and rewritten on every mutation.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Every record, in insertion order. A missing or unreadable document
    /// yields an empty list.
    async fn load_all(&self) -> BlobResult<Vec<VideoRecord>>;

    /// Replace the whole document
    async fn save_all(&self, records: Vec<VideoRecord>) -> BlobResult<()>;

    /// Add one record at the end; ids must stay unique
    async fn append(&self, record: VideoRecord) -> BlobResult<()>;

    /// Remove a record, returning it. Absent ids leave the document untouched.
    async fn remove_by_id(&self, id: VideoId) -> BlobResult<Option<VideoRecord>>;

    async fn find_by_id(&self, id: VideoId) -> BlobResult<Option<VideoRecord>> {
        Ok(self.load_all().await?.into_iter().find(|r| r.id == id))
    }

    async fn max_id(&self) -> BlobResult<Option<VideoId>> {
        Ok(self.load_all().await?.iter().map(|r| r.id).max())
    }
}

fn ensure_unique(records: &[VideoRecord], record: &VideoRecord) -> BlobResult<()> {
    if records.iter().any(|r| r.id == record.id) {
        return Err(BlobError::invalid(format!("Duplicate video id {}", record.id)));
    }
    Ok(())
}

/// `metadata.json` on disk, rewritten atomically, one writer at a time
pub struct JsonMetadataStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl JsonMetadataStore {
    /// Open the document under `root`, creating `root` and an empty `[]`
    /// document on first run.
    pub async fn open(root: impl AsRef<Path>) -> BlobResult<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root).await?;
        let store = Self {
            path: root.join(METADATA_FILE),
            lock: tokio::sync::Mutex::new(()),
        };
        if !fs::try_exists(&store.path).await? {
            store.write_document(&[]).await?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> BlobResult<Vec<VideoRecord>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "metadata file not found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "metadata file is malformed, treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn write_document(&self, records: &[VideoRecord]) -> BlobResult<()> {
        let json = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&json).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for JsonMetadataStore {
    async fn load_all(&self) -> BlobResult<Vec<VideoRecord>> {
        let _guard = self.lock.lock().await;
        self.read_document().await
    }

    async fn save_all(&self, records: Vec<VideoRecord>) -> BlobResult<()> {
        let _guard = self.lock.lock().await;
        self.write_document(&records).await
    }

    async fn append(&self, record: VideoRecord) -> BlobResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_document().await?;
        ensure_unique(&records, &record)?;
        records.push(record);
        self.write_document(&records).await
    }

    async fn remove_by_id(&self, id: VideoId) -> BlobResult<Option<VideoRecord>> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_document().await?;
        let Some(index) = records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let removed = records.remove(index);
        self.write_document(&records).await?;
        Ok(Some(removed))
    }
}

/// In-memory metadata store
#[derive(Clone, Default)]
pub struct MemoryMetadataStore {
    records: Arc<Mutex<Vec<VideoRecord>>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn load_all(&self) -> BlobResult<Vec<VideoRecord>> {
        Ok(self.records.lock().clone())
    }

    async fn save_all(&self, records: Vec<VideoRecord>) -> BlobResult<()> {
        *self.records.lock() = records;
        Ok(())
    }

    async fn append(&self, record: VideoRecord) -> BlobResult<()> {
        let mut records = self.records.lock();
        ensure_unique(&records, &record)?;
        records.push(record);
        Ok(())
    }

    async fn remove_by_id(&self, id: VideoId) -> BlobResult<Option<VideoRecord>> {
        let mut records = self.records.lock();
        Ok(records
            .iter()
            .position(|r| r.id == id)
            .map(|index| records.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> VideoRecord {
        VideoRecord::new(VideoId(id), format!("{id}-x.mp4"), id * 10)
            .with_original_filename(format!("clip{id}.mp4"))
            .with_mime_type("video/mp4")
    }

    #[tokio::test]
    async fn open_bootstraps_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("videos");
        let store = JsonMetadataStore::open(&root).await.unwrap();
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[]");
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_find_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonMetadataStore::open(dir.path()).await.unwrap();

        store.append(record(1)).await.unwrap();
        store.append(record(2)).await.unwrap();
        assert_eq!(store.find_by_id(VideoId(2)).await.unwrap(), Some(record(2)));
        assert_eq!(store.max_id().await.unwrap(), Some(VideoId(2)));

        assert_eq!(store.remove_by_id(VideoId(1)).await.unwrap(), Some(record(1)));
        assert_eq!(store.load_all().await.unwrap(), vec![record(2)]);
        assert!(!dir.path().join("metadata.json.tmp").exists());
    }

    #[tokio::test]
    async fn duplicate_ids_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonMetadataStore::open(dir.path()).await.unwrap();
        store.append(record(5)).await.unwrap();
        assert!(matches!(store.append(record(5)).await, Err(BlobError::Invalid { .. })));
        assert_eq!(store.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn removing_unknown_id_leaves_document_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonMetadataStore::open(dir.path()).await.unwrap();
        store.append(record(1)).await.unwrap();
        let before = std::fs::read(store.path()).unwrap();

        assert_eq!(store.remove_by_id(VideoId(99)).await.unwrap(), None);
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn malformed_document_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(METADATA_FILE), "{ not json").unwrap();
        let store = JsonMetadataStore::open(dir.path()).await.unwrap();
        assert!(store.load_all().await.unwrap().is_empty());

        store.append(record(3)).await.unwrap();
        assert_eq!(store.load_all().await.unwrap(), vec![record(3)]);
    }

    #[tokio::test]
    async fn reload_without_mutation_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonMetadataStore::open(dir.path()).await.unwrap();
            store.save_all(vec![record(1), record(2)]).await.unwrap();
        }
        let store = JsonMetadataStore::open(dir.path()).await.unwrap();
        let first = store.load_all().await.unwrap();
        let second = store.load_all().await.unwrap();
        assert_eq!(first, vec![record(1), record(2)]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn reads_documents_written_by_the_legacy_service() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(METADATA_FILE),
            r#"[
  {
    "id": 1700000000000,
    "filename": "1700000000000.mp4",
    "originalname": "holiday.mp4",
    "mimetype": "video/mp4",
    "size": 2048
  }
]"#,
        )
        .unwrap();
        let store = JsonMetadataStore::open(dir.path()).await.unwrap();
        let found = store.find_by_id(VideoId(1700000000000)).await.unwrap().unwrap();
        assert_eq!(found.stored_filename, "1700000000000.mp4");
        assert_eq!(found.size_bytes, 2048);
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonMetadataStore::open(dir.path()).await.unwrap());

        let tasks: Vec<_> = (1..=16)
            .map(|id| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.append(record(id)).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(store.load_all().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn memory_store_behaves_like_json_store() {
        let store = MemoryMetadataStore::new();
        store.append(record(1)).await.unwrap();
        assert!(store.append(record(1)).await.is_err());
        assert_eq!(store.remove_by_id(VideoId(1)).await.unwrap(), Some(record(1)));
        assert_eq!(store.remove_by_id(VideoId(1)).await.unwrap(), None);
        assert_eq!(store.max_id().await.unwrap(), None);
    }
}
