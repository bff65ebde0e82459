//! Streaming access to the uploaded file inside a `multipart/form-data` body.
//!
//! multer is used instead of axum's extractor so the file part is handed on
//! as a stream and never buffered in memory.

use std::io;

use axum::{
    body::Body,
    http::{header, HeaderMap},
};
use reel_blob::{BlobPut, ByteStream};
use reel_core::errors::ReelError;

use crate::ReelAxumError;

/// The file part of an upload, body not yet read
pub struct FilePart {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub body: ByteStream,
}

impl FilePart {
    pub fn to_put(&self) -> BlobPut {
        BlobPut {
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
        }
    }
}

fn malformed(e: multer::Error) -> ReelAxumError {
    ReelError::bad_request(format!("Failed to parse multipart data: {e}")).into()
}

/// Find the file sent under `field_name`.
///
/// Fields before it are drained and discarded; whatever follows it is never
/// read. Returns `Ok(None)` when the request is not multipart or carries no
/// such file.
pub async fn file_field(
    headers: &HeaderMap,
    body: Body,
    field_name: &str,
) -> Result<Option<FilePart>, ReelAxumError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !content_type.starts_with("multipart/form-data") {
        return Ok(None);
    }

    let boundary = multer::parse_boundary(content_type).map_err(malformed)?;
    let mut multipart = multer::Multipart::new(body.into_data_stream(), boundary);

    while let Some(mut field) = multipart.next_field().await.map_err(malformed)? {
        let is_file = field.name() == Some(field_name) && field.file_name().is_some();
        if !is_file {
            while field.chunk().await.map_err(malformed)?.is_some() {}
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(|ct| ct.to_string());
        tracing::debug!(field = field_name, ?filename, ?content_type, "receiving file part");

        let stream = async_stream::stream! {
            // The parser owns the connection; keep it alive while the part is read
            let _multipart = multipart;
            let mut field = field;
            loop {
                match field.chunk().await {
                    Ok(Some(chunk)) => yield Ok(chunk),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(io::Error::new(io::ErrorKind::InvalidData, e));
                        break;
                    }
                }
            }
        };

        return Ok(Some(FilePart {
            filename,
            content_type,
            body: Box::pin(stream),
        }));
    }

    Ok(None)
}
