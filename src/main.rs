use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use story_search::{
    api::{build_router, AppState},
    config::Config,
    StoryLibrary,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "story-search")]
#[command(about = "Full-text story search service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (overrides CONFIG_PATH)
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<String>,

    /// Index directory
    #[arg(short, long)]
    index_path: Option<PathBuf>,

    /// HTTP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Load the sample stories on startup
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "story_search=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(index_path) = cli.index_path {
        config.search.index_path = index_path;
    }
    if let Some(port) = cli.port {
        config.server.http_port = port;
    }

    tracing::info!("Starting story-search v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(index_path = %config.search.index_path.display(), "Opening index");

    let library = {
        let search_config = config.search.clone();
        tokio::task::spawn_blocking(move || StoryLibrary::open(search_config)).await??
    };

    if cli.seed {
        let seeder = library.clone();
        let indexed = tokio::task::spawn_blocking(move || seeder.seed()).await??;
        tracing::info!(indexed, "Seeded sample stories");
    }

    let app = build_router(AppState::new(library));

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("Failed to bind {}", http_addr))?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(http_listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
