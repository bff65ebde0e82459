use async_trait::async_trait;
use crate::{BlobResult, ByteStream, ResolvedRange};

/// Core blob storage operations - must be implemented by all storage backends
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob from a stream. The blob becomes visible under `key`
    /// only once the whole stream has been written.
    async fn put(&self, key: &str, stream: ByteStream) -> BlobResult<PutResult>;

    /// Get a blob as a stream, optionally bounded to a resolved range
    async fn get(&self, key: &str, range: Option<ResolvedRange>) -> BlobResult<GetResult>;

    /// Get blob metadata without content
    async fn head(&self, key: &str) -> BlobResult<ObjectHead>;

    async fn exists(&self, key: &str) -> BlobResult<bool>;

    /// Delete a blob
    async fn delete(&self, key: &str) -> BlobResult<()>;
}

/// Result of a successful put operation
#[derive(Debug, Clone)]
pub struct PutResult {
    pub size_bytes: u64,
}

/// Result of a get operation
pub struct GetResult {
    pub stream: ByteStream,
    /// Bytes the stream will yield
    pub size_bytes: u64,
    pub resolved_range: Option<ResolvedRange>,
}

/// Metadata about a blob
#[derive(Debug, Clone)]
pub struct ObjectHead {
    pub size_bytes: u64,
}

/// Strategy for generating stored file names
pub trait BlobKeyStrategy: Send + Sync {
    /// Generate a key for a new blob; `extension` includes the leading dot
    fn object_key(&self, extension: &str) -> String;
}

/// Default key strategy: `<unix millis>-<uuid><extension>`
#[derive(Debug, Clone)]
pub struct DefaultKeyStrategy;

impl BlobKeyStrategy for DefaultKeyStrategy {
    fn object_key(&self, extension: &str) -> String {
        format!(
            "{}-{}{}",
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple(),
            extension
        )
    }
}
