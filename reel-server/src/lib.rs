mod app;

use anyhow::Result;
use reel_axum::AxumApp;
use reel_core::ReelConfig;

pub use app::{reel_config, ENV_PREFIX, UPLOADS_DIR};

pub async fn build(config: ReelConfig) -> Result<AxumApp> {
    let ax = app::reel_app(&config).await?;

    let ax = ax
        .use_videos("/api/videos")
        .service("/health", || async { "ok" });

    Ok(ax)
}
