use anyhow::{Context, Result};
use clap::Parser;
use keepsake::{
    create_router, AppState, Config, DeepgramProvider, FileProfileStore, InMemoryStore,
    LogEnrichment, SegmentSink, SessionDeps, WavEncoder,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "keepsake", about = "Streaming memory capture backend")]
struct Cli {
    /// Configuration file (without extension)
    #[arg(long, default_value = "config/keepsake")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} starting", cfg.service.name);

    let nats = if cfg.nats.enabled {
        let client = async_nats::connect(&cfg.nats.url)
            .await
            .context("Failed to connect to NATS")?;
        info!("Segment fan-out connected to {}", cfg.nats.url);
        Some(client)
    } else {
        None
    };

    let temp_dir = PathBuf::from(&cfg.audio.temp_path);
    std::fs::create_dir_all(&temp_dir).context("Failed to create audio temp directory")?;

    let deps = SessionDeps {
        provider: Arc::new(DeepgramProvider::new(
            cfg.stt.endpoint.clone(),
            cfg.stt.api_key.clone(),
        )),
        store: Arc::new(InMemoryStore::new()),
        profiles: Arc::new(FileProfileStore::new(&cfg.profiles.path)),
        encoder: Arc::new(WavEncoder),
        enrichment: Arc::new(LogEnrichment),
        segment_sink: Arc::new(SegmentSink::start(nats)),
        temp_dir,
    };

    let app = create_router(AppState::new(deps));
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
