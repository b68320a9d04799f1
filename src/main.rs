use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod config;
mod engine;
mod engines;
mod error;
mod extract;
mod pipeline;
mod preprocessing;
mod range;
mod server;

#[derive(Parser, Debug)]
#[command(name = "labtest-ocr-server")]
#[command(about = "Extracts structured lab test results from report images")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "LAB_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "LAB_PORT", default_value = "8000")]
    pub port: u16,

    /// Tesseract language code used by the leptess engine
    #[arg(long, env = "LAB_DEFAULT_LANGUAGE", default_value = "eng")]
    pub default_language: String,

    /// Maximum upload size in bytes (default: 20MB)
    #[arg(long, env = "LAB_MAX_FILE_SIZE", default_value = "20971520")]
    pub max_file_size: usize,

    /// Path to tessdata directory (downloaded to the cache dir if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<String>,

    /// Default OCR engine (e.g., "ocrs", "leptess")
    #[arg(long, env = "LAB_OCR_ENGINE")]
    pub engine: Option<String>,

    /// JSON file replacing the built-in test catalog
    #[arg(long, env = "LAB_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from(args);

    tracing::info!("Starting labtest-ocr-server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Binding to {}:{}", config.host, config.port);

    server::run(config).await
}
