use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    response::Response,
    routing, Json, Router,
};
use reel_blob::{BlobError, VideoId, VideoRecord};
use reel_core::errors::ReelError;

use crate::{multipart, range, ReelAxumError, ReelAxumState};

fn parse_id(raw: &str) -> Result<VideoId, ReelAxumError> {
    // A non-numeric id can never match a record
    raw.parse()
        .map_err(|_| ReelError::not_found("Video not found").into())
}

/// Routes for one video collection, meant to be nested under a prefix
pub fn videos_router(state: ReelAxumState) -> Router<()> {
    Router::new()
        .route("/", routing::get(list_videos).post(upload_video))
        .route("/{id}", routing::get(get_video).delete(delete_video))
        .route("/{id}/stream", routing::get(stream_video))
        .with_state(state)
}

async fn upload_video(
    State(state): State<ReelAxumState>,
    request: Request,
) -> Result<&'static str, ReelAxumError> {
    let (parts, body) = request.into_parts();

    let Some(file) = multipart::file_field(&parts.headers, body, state.upload_field()).await?
    else {
        return Err(ReelError::bad_request("No video file uploaded").into());
    };

    state.blobs.put(file.to_put(), file.body).await?;
    Ok("Video uploaded successfully")
}

async fn list_videos(
    State(state): State<ReelAxumState>,
) -> Result<Json<Vec<VideoRecord>>, ReelAxumError> {
    Ok(Json(state.blobs.list().await?))
}

async fn get_video(
    State(state): State<ReelAxumState>,
    Path(id): Path<String>,
) -> Result<Json<VideoRecord>, ReelAxumError> {
    let id = parse_id(&id)?;
    Ok(Json(state.blobs.get(id).await?))
}

async fn stream_video(
    State(state): State<ReelAxumState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ReelAxumError> {
    let id = parse_id(&id)?;
    let opened = state.blobs.open(id, range::range_request(&headers)).await?;
    range::stream_response(opened)
}

async fn delete_video(
    State(state): State<ReelAxumState>,
    Path(id): Path<String>,
) -> Result<&'static str, ReelAxumError> {
    let id = parse_id(&id)?;
    state.blobs.delete(id).await.map_err(delete_error)?;
    Ok("Video deleted successfully")
}

fn delete_error(err: BlobError) -> ReelAxumError {
    if err.is_client_error() {
        return err.into();
    }
    ReelError::general_error("Error deleting video file")
        .with_source(anyhow::Error::new(err))
        .into()
}
