use std::path::PathBuf;

use anyhow::Result;
use reel_axum::{axum, AxumApp, ReelAxumState};
use reel_blob::{BlobAdapter, BlobConfig, FsBlobStore, JsonMetadataStore};
use reel_core::config::{load_env_config, STORAGE_ROOT, UPLOAD_EXTENSIONS, UPLOAD_MAX_BYTES};
use reel_core::ReelConfig;

pub const ENV_PREFIX: &str = "REEL__";
pub const UPLOADS_DIR: &str = "uploads";

/// Defaults, then `REEL__*` environment overrides
pub fn reel_config() -> ReelConfig {
    let mut config = ReelConfig::with_defaults();
    load_env_config(&mut config, ENV_PREFIX);
    config
}

fn blob_config(config: &ReelConfig) -> BlobConfig {
    let snapshot = config.snapshot();
    let mut blob = BlobConfig::default();
    if let Some(max) = snapshot.get_u64(UPLOAD_MAX_BYTES) {
        blob = blob.with_max_blob_bytes(max);
    }
    if let Some(extensions) = snapshot.get_list(UPLOAD_EXTENSIONS) {
        blob = blob.with_allowed_extensions(extensions);
    }
    blob
}

pub async fn reel_app(config: &ReelConfig) -> Result<AxumApp> {
    let root = PathBuf::from(config.get(STORAGE_ROOT).unwrap_or("./videos"));

    let store = FsBlobStore::open(root.join(UPLOADS_DIR)).await?;
    let catalog = JsonMetadataStore::open(&root).await?;
    let blobs = BlobAdapter::new(store, catalog, blob_config(config)).await?;

    tracing::info!(root = %root.display(), "video storage ready");

    let state = ReelAxumState::new(blobs, config.snapshot());
    Ok(axum(state))
}
