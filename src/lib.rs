pub mod api;
pub mod config;
pub mod downloader;
pub mod state;

use std::sync::Arc;

pub use api::create_router;
pub use config::Config;
pub use state::AppState;

use downloader::extractors::{CliInfoExtractor, InfoExtractor};
use downloader::Downloader;

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let engine = CliInfoExtractor::new(
        config.engine.mode,
        config.engine.ytdlp_path.clone(),
        &config.engine.python,
    );
    tracing::info!("Using {} via {}", engine.name(), engine.program());

    let downloader = Downloader::new(Arc::new(engine), config.retrieval_settings());
    match downloader.engine_version().await {
        Ok(version) => tracing::info!("yt-dlp version {}", version),
        // Keep serving; every request will report the same failure
        Err(e) => tracing::warn!("yt-dlp is not usable: {}", e),
    }

    let listen = config.server.listen.clone();
    let app = create_router(AppState::new(downloader));

    tracing::info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
