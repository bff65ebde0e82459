use serde::{Deserialize, Serialize};
use crate::{ByteStream, VideoId};

/// Metadata record kept for every stored video
///
/// Field names on disk match the layout of existing `metadata.json` files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: VideoId,
    #[serde(rename = "filename")]
    pub stored_filename: String,
    #[serde(rename = "originalname")]
    pub original_filename: String,
    #[serde(rename = "mimetype")]
    pub mime_type: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
}

impl VideoRecord {
    pub fn new(id: VideoId, stored_filename: String, size_bytes: u64) -> Self {
        Self {
            id,
            stored_filename,
            original_filename: String::new(),
            mime_type: "application/octet-stream".to_string(),
            size_bytes,
        }
    }

    pub fn with_original_filename<S: Into<String>>(mut self, filename: S) -> Self {
        self.original_filename = filename.into();
        self
    }

    pub fn with_mime_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

/// Range information for partial content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
}

impl ResolvedRange {
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_full_content(&self) -> bool {
        self.start == 0 && self.end + 1 == self.total_size
    }
}

/// Result of opening a video for reading
pub struct OpenedBlob {
    pub record: VideoRecord,
    pub stream: ByteStream,
    pub total_size: u64,
    /// Set when a range was requested, even if it spans the whole file
    pub resolved_range: Option<ResolvedRange>,
}

impl OpenedBlob {
    pub fn new(
        record: VideoRecord,
        stream: ByteStream,
        total_size: u64,
        resolved_range: Option<ResolvedRange>,
    ) -> Self {
        Self {
            record,
            stream,
            total_size,
            resolved_range,
        }
    }

    /// Answer with partial content (206)
    pub fn is_partial(&self) -> bool {
        self.resolved_range.is_some()
    }

    pub fn content_length(&self) -> u64 {
        self.resolved_range
            .map_or(self.total_size, |r| r.content_length())
    }

    pub fn content_type(&self) -> &str {
        &self.record.mime_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_legacy_document_keys() {
        let record = VideoRecord::new(VideoId(1700000000000), "1700000000000-ab.mp4".into(), 42)
            .with_original_filename("clip.mp4")
            .with_mime_type("video/mp4");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1700000000000u64,
                "filename": "1700000000000-ab.mp4",
                "originalname": "clip.mp4",
                "mimetype": "video/mp4",
                "size": 42
            })
        );
        let back: VideoRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn partial_content_length() {
        let record = VideoRecord::new(VideoId(1), "a.mp4".into(), 1000);
        let range = ResolvedRange { start: 200, end: 299, total_size: 1000 };
        let opened = OpenedBlob::new(
            record,
            Box::pin(futures_util::stream::empty::<std::io::Result<bytes::Bytes>>()),
            1000,
            Some(range),
        );
        assert!(opened.is_partial());
        assert_eq!(opened.content_length(), 100);
        assert_eq!(opened.content_type(), "application/octet-stream");
    }
}
