// PanPipe Append - pick tracks, drop them into a local playlist
// Scans the library, then hands marked tracks to the playlist dialogs

use anyhow::Result;
use clap::Parser;
use panpipe_append::{ui::App, Config, LocalPlaylistManager, MusicScanner, PlaylistStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "panpipe_append")]
#[command(about = "Add tracks from your music library to local playlists")]
struct Args {
    /// Enable developer logging (stderr + debug output)
    #[arg(long)]
    dev: bool,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Playlist database to use instead of the configured one
    #[arg(long)]
    database: Option<PathBuf>,
}

fn init_logging(log_dir: &Path, dev: bool) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(log_dir, "panpipe-append.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let base_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,panpipe_append=debug"));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    // Dev mode mirrors everything to stderr
    let stderr_layer = dev.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    });

    tracing_subscriber::registry()
        .with(base_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    // Keep the writer alive for the whole run
    std::mem::forget(guard);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    init_logging(&config.log_directory, args.dev)?;
    info!("🎵 PanPipe Append starting up");

    let database_path = args.database.clone().unwrap_or_else(|| config.database_path.clone());
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store: Arc<dyn PlaylistStore> = Arc::new(LocalPlaylistManager::open(&database_path)?);

    let scanner = MusicScanner::new();
    let streams = scanner.scan_directories(&config.music_directories)?;
    debug!("Library has {} tracks", streams.len());

    let mut app = App::new(config, store, streams)?;
    app.run().await?;

    Ok(())
}
