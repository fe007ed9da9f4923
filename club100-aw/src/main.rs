//! club100-aw - Mixtape Audio Worker
//!
//! HTTP service that turns a timeline of songs, snippets, and effects into a
//! single mp3. External heavy lifting is delegated to yt-dlp, ffmpeg, and the
//! local tts CLI; results and job history live under the root folder.

use anyhow::Result;
use club100_aw::catalog::EffectCatalog;
use club100_aw::services::{
    FfmpegClient, ItemProcessor, MediaCache, MixtapePipeline, SongFetcher, SpeechSynthesizer,
    ToolRunner, YoutubeClient,
};
use club100_aw::AppState;
use club100_common::config::{resolve_root_folder, Layout, WorkerConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting club100-aw (Mixtape Audio Worker)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve the root folder and create the on-disk layout
    let cli_root = std::env::args().nth(1);
    let root = resolve_root_folder(cli_root.as_deref());
    let layout = Layout::new(&root);
    layout.ensure_directories()?;
    info!("Root folder: {}", root.display());

    let config = WorkerConfig::load()?;

    // Open or create the database
    let db_path = layout.database_path();
    info!("Database: {}", db_path.display());
    let db = club100_common::db::init_database(&db_path).await?;
    info!("Database connection established");

    // Wire up the tool clients and the pipeline
    let runner = ToolRunner::new(Duration::from_secs(config.tool_timeout_secs));
    let ffmpeg = FfmpegClient::new(runner.clone());
    let youtube = YoutubeClient::new(runner.clone());
    let cache = MediaCache::new(
        layout.cache_dir(),
        Duration::from_secs(config.cache_ttl_days * 24 * 3600),
    );
    let catalog = Arc::new(EffectCatalog::new(layout.effects_dir()));

    let fetcher = SongFetcher::new(
        youtube.clone(),
        cache.clone(),
        ffmpeg.clone(),
        config.segment_seconds,
    );
    let synthesizer = SpeechSynthesizer::new(runner, ffmpeg.clone());
    let processor = ItemProcessor::new(ffmpeg.clone(), synthesizer, catalog.clone());
    let pipeline = Arc::new(MixtapePipeline::new(
        db.clone(),
        fetcher,
        processor,
        ffmpeg,
        layout.output_dir(),
        config.default_language.clone(),
        config.workers,
    ));

    // Periodic cache eviction, off the job path
    let sweeper_cache = cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match sweeper_cache.sweep_expired() {
                Ok(0) => {}
                Ok(n) => info!(removed = n, "Swept expired cache entries"),
                Err(e) => error!(error = %e, "Cache sweep failed"),
            }
        }
    });

    let state = AppState {
        db,
        catalog,
        pipeline,
        youtube,
        cache,
        output_dir: layout.output_dir(),
    };

    let app = club100_aw::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
