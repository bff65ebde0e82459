use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;

use crate::{
    BlobConfig, BlobError, BlobKeyStrategy, BlobPut, BlobResult, BlobStore, ByteStream,
    DefaultKeyStrategy, MetadataStore, OpenedBlob, RangeRequest, VideoId, VideoIdGenerator,
    VideoRecord,
};

/// The main video adapter - this is what the HTTP handlers embed
///
/// Pairs the file store (bytes) with the metadata store (records) and keeps
/// the two consistent across upload, stream and delete.
pub struct BlobAdapter {
    store: Arc<dyn BlobStore>,
    catalog: Arc<dyn MetadataStore>,
    keys: Arc<dyn BlobKeyStrategy>,
    ids: VideoIdGenerator,
    config: BlobConfig,
}

impl BlobAdapter {
    /// Create a new adapter; ids continue after the largest one already stored
    pub async fn new<S, M>(store: S, catalog: M, config: BlobConfig) -> BlobResult<Self>
    where
        S: BlobStore + 'static,
        M: MetadataStore + 'static,
    {
        let ids = VideoIdGenerator::seeded(catalog.max_id().await?);
        Ok(Self {
            store: Arc::new(store),
            catalog: Arc::new(catalog),
            keys: Arc::new(DefaultKeyStrategy),
            ids,
            config,
        })
    }

    /// Use a custom stored-name strategy
    pub fn with_key_strategy<K: BlobKeyStrategy + 'static>(mut self, keys: K) -> Self {
        self.keys = Arc::new(keys);
        self
    }

    /// Check the upload rules that can be decided before reading the body.
    /// Returns the file extension, dot included.
    pub fn validate(&self, put: &BlobPut) -> BlobResult<String> {
        let extension = put
            .filename
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        if !self.config.is_allowed_extension(&extension) {
            return Err(BlobError::invalid("Only video files are allowed"));
        }

        Ok(extension)
    }

    /// Store an uploaded video and record it
    pub async fn put(&self, put: BlobPut, body: ByteStream) -> BlobResult<VideoRecord> {
        let extension = self.validate(&put)?;
        let key = self.keys.object_key(&extension);
        let max_bytes = self.config.max_blob_bytes;

        let result = self
            .store
            .put(&key, limit_stream(body, max_bytes))
            .await
            .map_err(|e| map_body_error(e, max_bytes))?;

        // Generic binary tells us nothing; let the extension decide
        let mime_type = put
            .content_type
            .filter(|ct| !ct.is_empty() && ct != OCTET_STREAM)
            .or_else(|| {
                mime_guess::from_ext(extension.trim_start_matches('.'))
                    .first_raw()
                    .map(String::from)
            })
            .unwrap_or_else(|| self.config.fallback_mime_type.clone());

        let id = match self.ids.next_id() {
            Ok(id) => id,
            Err(err) => {
                self.discard(&key).await;
                return Err(err);
            }
        };
        let record = VideoRecord::new(id, key.clone(), result.size_bytes)
            .with_original_filename(put.filename.unwrap_or_default())
            .with_mime_type(mime_type);

        if let Err(err) = self.catalog.append(record.clone()).await {
            self.discard(&key).await;
            return Err(err);
        }

        tracing::info!(
            id = %record.id,
            stored = %record.stored_filename,
            size = record.size_bytes,
            "video uploaded"
        );
        Ok(record)
    }

    /// Every record, in store order
    pub async fn list(&self) -> BlobResult<Vec<VideoRecord>> {
        self.catalog.load_all().await
    }

    pub async fn get(&self, id: VideoId) -> BlobResult<VideoRecord> {
        self.catalog
            .find_by_id(id)
            .await?
            .ok_or_else(|| BlobError::not_found(id.to_string()))
    }

    /// Open a video for reading, whole or as one byte window
    pub async fn open(&self, id: VideoId, range: RangeRequest) -> BlobResult<OpenedBlob> {
        let record = self.get(id).await?;
        let total_size = self.store.head(&record.stored_filename).await?.size_bytes;

        let resolved = match range {
            RangeRequest::Full => None,
            RangeRequest::Partial(requested) => Some(
                requested
                    .resolve(total_size)
                    .ok_or_else(|| BlobError::range_not_satisfiable(total_size))?,
            ),
            RangeRequest::Unsatisfiable => {
                return Err(BlobError::range_not_satisfiable(total_size));
            }
        };

        if let Some(r) = resolved {
            tracing::debug!(id = %id, start = r.start, end = r.end, total = total_size, "serving range");
        }

        let got = self.store.get(&record.stored_filename, resolved).await?;
        Ok(OpenedBlob::new(record, got.stream, total_size, got.resolved_range))
    }

    /// Delete the backing file, then the record
    pub async fn delete(&self, id: VideoId) -> BlobResult<VideoRecord> {
        let record = self.get(id).await?;

        if !self.store.exists(&record.stored_filename).await? {
            return Err(BlobError::file_missing(record.stored_filename));
        }
        self.store.delete(&record.stored_filename).await?;
        self.catalog.remove_by_id(id).await?;

        tracing::info!(id = %id, stored = %record.stored_filename, "video deleted");
        Ok(record)
    }

    /// Remove a stored file that never got a record
    async fn discard(&self, key: &str) {
        if let Err(cleanup) = self.store.delete(key).await {
            tracing::warn!(key, error = %cleanup, "failed to remove orphaned upload");
        }
    }
}

const OCTET_STREAM: &str = "application/octet-stream";

/// Marker carried inside the io error that aborts an oversized upload
#[derive(Debug)]
struct SizeLimitExceeded {
    max_bytes: u64,
}

impl fmt::Display for SizeLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upload exceeds {} bytes", self.max_bytes)
    }
}

impl std::error::Error for SizeLimitExceeded {}

/// Pass the body through, failing once it grows past `max_bytes`
fn limit_stream(body: ByteStream, max_bytes: u64) -> ByteStream {
    let stream = async_stream::stream! {
        let mut body = body;
        let mut seen = 0u64;
        while let Some(chunk) = StreamExt::next(&mut body).await {
            if let Ok(bytes) = &chunk {
                seen += bytes.len() as u64;
                if seen > max_bytes {
                    yield Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        SizeLimitExceeded { max_bytes },
                    ));
                    return;
                }
            }
            yield chunk;
        }
    };
    Box::pin(stream)
}

/// Errors raised while reading the request body are the client's fault
fn map_body_error(err: BlobError, max_bytes: u64) -> BlobError {
    match err {
        BlobError::Io { source }
            if source
                .get_ref()
                .is_some_and(|inner| inner.is::<SizeLimitExceeded>()) =>
        {
            BlobError::TooLarge { max_bytes }
        }
        BlobError::Io { source } if source.kind() == io::ErrorKind::InvalidData => {
            BlobError::invalid(format!("Failed to read upload: {source}"))
        }
        other => other,
    }
}
