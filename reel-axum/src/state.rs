use std::sync::Arc;

use reel_blob::BlobAdapter;
use reel_core::config::UPLOAD_FIELD;
use reel_core::ReelConfigSnapshot;

pub const DEFAULT_UPLOAD_FIELD: &str = "video";

/// Shared by every handler
#[derive(Clone)]
pub struct ReelAxumState {
    pub blobs: Arc<BlobAdapter>,
    pub config: ReelConfigSnapshot,
}

impl ReelAxumState {
    pub fn new(blobs: BlobAdapter, config: ReelConfigSnapshot) -> Self {
        Self {
            blobs: Arc::new(blobs),
            config,
        }
    }

    /// Multipart field that carries the uploaded file
    pub fn upload_field(&self) -> &str {
        self.config.get(UPLOAD_FIELD).unwrap_or(DEFAULT_UPLOAD_FIELD)
    }
}
