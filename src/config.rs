use crate::Args;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub default_language: String,
    pub max_file_size: usize,
    #[allow(dead_code)]
    pub tessdata_path: Option<String>,
    pub default_engine: Option<String>,
    pub catalog_path: Option<PathBuf>,
    /// Where downloaded OCR models and tessdata are kept
    pub cache_dir: PathBuf,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("labtest-ocr");

        Self {
            host: args.host,
            port: args.port,
            default_language: args.default_language,
            max_file_size: args.max_file_size,
            tessdata_path: args.tessdata_path,
            default_engine: args.engine,
            catalog_path: args.catalog,
            cache_dir,
        }
    }
}
