use anyhow::Result;
use reel_core::config::{HTTP_HOST, HTTP_PORT};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = reel_server::reel_config();
    let ax = reel_server::build(config.clone()).await?;

    let host = config.get(HTTP_HOST).unwrap_or("127.0.0.1");
    let port = config.get(HTTP_PORT).unwrap_or("3000");
    let addr = format!("{host}:{port}");

    ax.listen(addr).await?;

    Ok(())
}
