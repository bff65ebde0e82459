use axum::{
    body::Body,
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use reel_blob::{OpenedBlob, RangeRequest};

use crate::ReelAxumError;

/// Read the `Range` header. A header that is not valid text can never be
/// satisfied.
pub fn range_request(headers: &HeaderMap) -> RangeRequest {
    match headers.get(header::RANGE) {
        None => RangeRequest::Full,
        Some(value) => match value.to_str() {
            Ok(value) => RangeRequest::from_header(Some(value)),
            Err(_) => RangeRequest::Unsatisfiable,
        },
    }
}

/// 200 with the whole file, or 206 with the resolved window
pub fn stream_response(opened: OpenedBlob) -> Result<Response, ReelAxumError> {
    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, opened.content_type())
        .header(header::CONTENT_LENGTH, opened.content_length())
        .header(header::ACCEPT_RANGES, "bytes");

    let status = match opened.resolved_range {
        Some(r) => {
            builder = builder.header(
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", r.start, r.end, r.total_size),
            );
            StatusCode::PARTIAL_CONTENT
        }
        None => StatusCode::OK,
    };

    builder
        .status(status)
        .body(Body::from_stream(opened.stream))
        .map_err(|e| ReelAxumError(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use bytes::Bytes;
    use reel_blob::{ByteRange, ResolvedRange, VideoId, VideoRecord};

    fn opened(range: Option<ResolvedRange>) -> OpenedBlob {
        let record = VideoRecord::new(VideoId(1), "a.mp4".into(), 1000).with_mime_type("video/mp4");
        let stream = futures::stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from_static(b"x"))]);
        OpenedBlob::new(record, Box::pin(stream), 1000, range)
    }

    #[test]
    fn reads_range_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(range_request(&headers), RangeRequest::Full);

        headers.insert(header::RANGE, HeaderValue::from_static("bytes=200-299"));
        assert_eq!(
            range_request(&headers),
            RangeRequest::Partial(ByteRange::new(200, Some(299)))
        );

        headers.insert(header::RANGE, HeaderValue::from_static("bytes=0-1,5-6"));
        assert_eq!(range_request(&headers), RangeRequest::Unsatisfiable);
    }

    #[test]
    fn full_response_headers() {
        let res = stream_response(opened(None)).unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_LENGTH], "1000");
        assert_eq!(res.headers()[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(res.headers()[header::ACCEPT_RANGES], "bytes");
        assert!(res.headers().get(header::CONTENT_RANGE).is_none());
    }

    #[test]
    fn partial_response_headers() {
        let range = ResolvedRange { start: 200, end: 299, total_size: 1000 };
        let res = stream_response(opened(Some(range))).unwrap();
        assert_eq!(res.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(res.headers()[header::CONTENT_LENGTH], "100");
        assert_eq!(res.headers()[header::CONTENT_RANGE], "bytes 200-299/1000");
    }
}
