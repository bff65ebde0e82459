/// Configuration for video uploads
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Absolute max size allowed for a single upload (safety guard)
    pub max_blob_bytes: u64,

    /// Accepted file extensions, dot included, compared case-sensitively
    pub allowed_extensions: Vec<String>,

    /// Mime type recorded when neither the client nor the extension tells us
    pub fallback_mime_type: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            max_blob_bytes: 5 * 1024 * 1024 * 1024, // 5GB
            allowed_extensions: [".mp4", ".avi", ".mov", ".mkv"]
                .into_iter()
                .map(String::from)
                .collect(),
            fallback_mime_type: "application/octet-stream".to_string(),
        }
    }
}

impl BlobConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max upload size
    pub fn with_max_blob_bytes(mut self, bytes: u64) -> Self {
        self.max_blob_bytes = bytes;
        self
    }

    /// Replace the extension whitelist
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fallback_mime_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.fallback_mime_type = mime_type.into();
        self
    }

    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.iter().any(|e| e == extension)
    }
}
