use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;

use crate::{
    BlobError, BlobResult, BlobStore, ByteStream, GetResult, ObjectHead, PutResult, ResolvedRange,
};

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Blob store backed by one flat directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    chunk_size: usize,
}

impl FsBlobStore {
    /// Open the store, creating the directory if needed
    pub async fn open(root: impl Into<PathBuf>) -> BlobResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Keys are plain file names; anything that could escape the root is refused.
    pub fn path_for(&self, key: &str) -> BlobResult<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains('/')
            && !key.contains('\\')
            && !key.contains('\0');
        if !valid {
            return Err(BlobError::invalid(format!("Invalid blob key: {key:?}")));
        }
        Ok(self.root.join(key))
    }

    fn map_missing(err: std::io::Error, key: &str) -> BlobError {
        if err.kind() == std::io::ErrorKind::NotFound {
            BlobError::file_missing(key)
        } else {
            BlobError::from(err)
        }
    }

    async fn write_part(path: &Path, mut stream: ByteStream) -> BlobResult<u64> {
        let mut file = File::create(path).await?;
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, stream: ByteStream) -> BlobResult<PutResult> {
        let path = self.path_for(key)?;
        let part = self.root.join(format!("{key}.part"));

        match Self::write_part(&part, stream).await {
            Ok(size_bytes) => {
                fs::rename(&part, &path).await?;
                Ok(PutResult { size_bytes })
            }
            Err(err) => {
                if let Err(cleanup) = fs::remove_file(&part).await {
                    tracing::warn!(key, error = %cleanup, "failed to remove partial upload");
                }
                Err(err)
            }
        }
    }

    async fn get(&self, key: &str, range: Option<ResolvedRange>) -> BlobResult<GetResult> {
        let path = self.path_for(key)?;
        let mut file = File::open(&path)
            .await
            .map_err(|e| Self::map_missing(e, key))?;
        let total = file.metadata().await?.len();

        let (offset, length) = match range {
            Some(r) => {
                if r.end >= total || r.start > r.end {
                    return Err(BlobError::range_not_satisfiable(total));
                }
                (r.start, r.content_length())
            }
            None => (0, total),
        };

        if offset > 0 {
            file.seek(SeekFrom::Start(offset)).await?;
        }
        let stream = ReaderStream::with_capacity(file.take(length), self.chunk_size);

        Ok(GetResult {
            stream: Box::pin(stream),
            size_bytes: length,
            resolved_range: range,
        })
    }

    async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        let path = self.path_for(key)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| Self::map_missing(e, key))?;

        Ok(ObjectHead {
            size_bytes: meta.len(),
        })
    }

    async fn exists(&self, key: &str) -> BlobResult<bool> {
        let path = self.path_for(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        let path = self.path_for(key)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| Self::map_missing(e, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tokio_test::assert_ok;

    fn body(chunks: Vec<&'static [u8]>) -> ByteStream {
        Box::pin(futures_util::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, std::io::Error>(Bytes::from_static(c))),
        ))
    }

    async fn collect(stream: ByteStream) -> Vec<u8> {
        stream
            .fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk.unwrap());
                acc
            })
            .await
    }

    #[tokio::test]
    async fn put_then_get_full_and_range() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path().join("uploads")).await.unwrap().with_chunk_size(3);

        let put = store.put("a.mp4", body(vec![b"0123", b"456789"])).await.unwrap();
        assert_eq!(put.size_bytes, 10);
        assert!(!dir.path().join("uploads/a.mp4.part").exists());

        let full = store.get("a.mp4", None).await.unwrap();
        assert_eq!(full.size_bytes, 10);
        assert_eq!(collect(full.stream).await, b"0123456789");

        let range = ResolvedRange { start: 2, end: 5, total_size: 10 };
        let part = store.get("a.mp4", Some(range)).await.unwrap();
        assert_eq!(part.size_bytes, 4);
        assert_eq!(collect(part.stream).await, b"2345");
    }

    #[tokio::test]
    async fn failed_put_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        let failing: ByteStream = Box::pin(futures_util::stream::iter(vec![
            Ok(Bytes::from_static(b"abc")),
            Err(std::io::Error::other("client went away")),
        ]));

        assert!(store.put("b.mkv", failing).await.is_err());
        assert!(!store.exists("b.mkv").await.unwrap());
        assert!(!dir.path().join("b.mkv.part").exists());
    }

    #[tokio::test]
    async fn missing_files_and_bad_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();

        assert!(matches!(store.get("nope.mp4", None).await, Err(BlobError::FileMissing { .. })));
        assert!(matches!(store.head("nope.mp4").await, Err(BlobError::FileMissing { .. })));
        assert!(matches!(store.delete("nope.mp4").await, Err(BlobError::FileMissing { .. })));
        assert!(matches!(store.path_for("../metadata.json"), Err(BlobError::Invalid { .. })));
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        assert_ok!(store.put("c.mov", body(vec![b"xyz"])).await);
        assert_eq!(store.head("c.mov").await.unwrap().size_bytes, 3);
        assert_ok!(store.delete("c.mov").await);
        assert!(!store.exists("c.mov").await.unwrap());
    }

    #[tokio::test]
    async fn out_of_bounds_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        assert_ok!(store.put("d.avi", body(vec![b"xyz"])).await);
        let range = ResolvedRange { start: 1, end: 9, total_size: 10 };
        let res = store.get("d.avi", Some(range)).await;
        assert!(matches!(res, Err(BlobError::RangeNotSatisfiable { total_size: 3 })));
    }
}
