use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur during blob operations
#[derive(Error, Debug)]
pub enum BlobError {
    /// No metadata record for this id
    #[error("Video not found: {id}")]
    NotFound { id: String },

    /// The record exists but its backing file does not
    #[error("Video file not found: {key}")]
    FileMissing { key: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Upload exceeds maximum size of {max_bytes} bytes")]
    TooLarge { max_bytes: u64 },

    #[error("Range not satisfiable for size {total_size}")]
    RangeNotSatisfiable { total_size: u64 },

    /// Every id after the last one stored is taken
    #[error("No video ids left after {last}")]
    IdsExhausted { last: u64 },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl BlobError {
    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a missing-file error
    pub fn file_missing<S: Into<String>>(key: S) -> Self {
        Self::FileMissing { key: key.into() }
    }

    pub fn range_not_satisfiable(total_size: u64) -> Self {
        Self::RangeNotSatisfiable { total_size }
    }

    /// True for errors caused by the caller rather than the storage layer
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::FileMissing { .. }
                | Self::Invalid { .. }
                | Self::TooLarge { .. }
                | Self::RangeNotSatisfiable { .. }
        )
    }
}
