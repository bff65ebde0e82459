use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use reel_blob::BlobError;
use reel_core::errors::ReelError;

#[derive(Debug)]
pub struct ReelAxumError(pub anyhow::Error);

impl From<anyhow::Error> for ReelAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<ReelError> for ReelAxumError {
    fn from(e: ReelError) -> Self {
        Self(e.into_anyhow())
    }
}

impl From<BlobError> for ReelAxumError {
    fn from(e: BlobError) -> Self {
        Self(blob_error_to_reel(e).into_anyhow())
    }
}

/// Map storage failures onto the client-facing taxonomy
pub fn blob_error_to_reel(err: BlobError) -> ReelError {
    match err {
        BlobError::NotFound { .. } => ReelError::not_found("Video not found"),
        BlobError::FileMissing { .. } => ReelError::not_found("Video file not found"),
        BlobError::Invalid { message } => ReelError::bad_request(message),
        BlobError::TooLarge { max_bytes } => {
            ReelError::bad_request(format!("Video exceeds the maximum size of {max_bytes} bytes"))
        }
        BlobError::RangeNotSatisfiable { total_size } => {
            ReelError::range_not_satisfiable(total_size)
        }
        other => ReelError::general_error("Internal server error")
            .with_source(anyhow::Error::new(other)),
    }
}

impl IntoResponse for ReelAxumError {
    fn into_response(self) -> Response {
        // A ReelError anywhere in the chain (even under anyhow contexts) decides the status
        let safe = match self.0.chain().find_map(|e| e.downcast_ref::<ReelError>()) {
            Some(reel) => reel.sanitize_for_client(),
            None => ReelError::general_error("Internal server error"),
        };

        if safe.kind.is_server_error() {
            tracing::error!(error = ?self.0, "request failed");
        }

        let status =
            StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, safe.message.clone()).into_response();

        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            if let Some(total) = safe.total_size() {
                if let Ok(value) = HeaderValue::from_str(&format!("bytes */{total}")) {
                    response.headers_mut().insert(header::CONTENT_RANGE, value);
                }
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_errors_map_to_client_statuses() {
        let cases = [
            (BlobError::not_found("1"), 404, "Video not found"),
            (BlobError::file_missing("a.mp4"), 404, "Video file not found"),
            (BlobError::invalid("Only video files are allowed"), 400, "Only video files are allowed"),
            (BlobError::range_not_satisfiable(10), 416, "Requested range not satisfiable"),
        ];
        for (err, code, message) in cases {
            let reel = blob_error_to_reel(err);
            assert_eq!(reel.code(), code);
            assert_eq!(reel.message, message);
        }
    }

    #[test]
    fn io_errors_hide_details() {
        let err = BlobError::from(std::io::Error::other("/secret/path"));
        let reel = blob_error_to_reel(err);
        assert_eq!(reel.code(), 500);
        assert!(!reel.message.contains("secret"));
        assert!(reel.source.is_some());
    }

    #[test]
    fn range_error_response_carries_total() {
        let response = ReelAxumError::from(BlobError::range_not_satisfiable(1000)).into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */1000");
    }

    #[test]
    fn foreign_errors_become_500() {
        let response = ReelAxumError(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
