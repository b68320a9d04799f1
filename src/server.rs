use crate::catalog::Catalog;
use crate::config::Config;
use crate::engine::OcrEngine;
use crate::engines::{EngineInfo, EngineRegistry};
use crate::error::LabError;
use crate::extract::LabTestResult;
use crate::pipeline::LabReportProcessor;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const NO_TESTS_FOUND: &str = "No lab tests could be identified in the image";

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engines: Arc<EngineRegistry>,
    pub catalog: Arc<Catalog>,
    pub config: Arc<Config>,
}

/// Lab test extraction response
#[derive(Serialize)]
pub struct LabTestsResponse {
    pub is_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Vec<LabTestResult>,
}

impl From<Vec<LabTestResult>> for LabTestsResponse {
    fn from(data: Vec<LabTestResult>) -> Self {
        if data.is_empty() {
            Self {
                is_success: false,
                message: Some(NO_TESTS_FOUND.to_string()),
                data,
            }
        } else {
            Self {
                is_success: true,
                message: None,
                data,
            }
        }
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Catalog entry as reported by /info
#[derive(Serialize)]
pub struct CatalogEntryInfo {
    pub name: String,
    pub unit: Option<String>,
    pub reference_range: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub default_engine: String,
    pub available_engines: Vec<EngineInfo>,
    pub max_file_size_bytes: usize,
    pub default_language: String,
    pub catalog: Vec<CatalogEntryInfo>,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let catalog = Catalog::load(config.catalog_path.as_deref())?;
    if catalog.is_empty() {
        tracing::warn!("Test catalog is empty; every upload will report no lab tests");
    }

    let engines = EngineRegistry::new(&config)?;
    tracing::info!("Default OCR engine: {}", engines.default_name());

    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        engines: Arc::new(engines),
        catalog: Arc::new(catalog),
        config: Arc::new(config),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/", get(handle_health))
        .route("/info", get(handle_info))
        .route("/get-lab-tests", post(handle_lab_tests))
        .route("/get-lab-tests/:engine", post(handle_lab_tests_with_engine))
        .layer(DefaultBodyLimit::max(
            max_file_size.saturating_add(MULTIPART_OVERHEAD),
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::very_permissive()),
        )
        .with_state(state)
}

/// Handle lab test requests with the default engine
async fn handle_lab_tests(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<LabTestsResponse>, LabError> {
    let engine = state
        .engines
        .default()
        .ok_or_else(|| LabError::Internal("No default engine available".to_string()))?;

    process_upload(state, engine, multipart).await
}

/// Handle lab test requests with a specific engine
async fn handle_lab_tests_with_engine(
    State(state): State<AppState>,
    Path(engine_name): Path<String>,
    multipart: Multipart,
) -> Result<Json<LabTestsResponse>, LabError> {
    let engine = state
        .engines
        .get(&engine_name)
        .ok_or(LabError::UnknownEngine(engine_name))?;

    process_upload(state, engine, multipart).await
}

async fn process_upload(
    state: AppState,
    engine: Arc<dyn OcrEngine>,
    mut multipart: Multipart,
) -> Result<Json<LabTestsResponse>, LabError> {
    let start = Instant::now();
    let max_file_size = state.config.max_file_size;

    let mut file_data: Option<Bytes> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to parse multipart", max_file_size))?
    {
        if field.name() == Some("file") {
            content_type = field.content_type().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, "Failed to read file data", max_file_size))?,
            );
        }
    }

    let data = file_data.ok_or(LabError::MissingFile)?;

    let mime = content_type.unwrap_or_default();
    if !mime.starts_with("image/") {
        tracing::warn!("Rejected upload with content type: {:?}", mime);
        return Err(LabError::NotAnImage);
    }

    if data.len() > max_file_size {
        return Err(LabError::ImageTooLarge {
            size: data.len(),
            max: max_file_size,
        });
    }

    let engine_name = engine.name();
    let processor = LabReportProcessor::new(engine, state.catalog.clone());

    // OCR is CPU-bound; keep it off the async workers
    let results = tokio::task::spawn_blocking(move || processor.process_lab_image(&data))
        .await
        .map_err(|e| LabError::Internal(format!("OCR task failed: {}", e)))??;

    tracing::info!(
        "Lab report processed in {}ms with {}: {} tests found",
        start.elapsed().as_millis(),
        engine_name,
        results.len()
    );

    Ok(Json(LabTestsResponse::from(results)))
}

/// Body-limit failures surface from multer as 413; keep that status
fn multipart_error(err: MultipartError, context: &str, max_file_size: usize) -> LabError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        LabError::UploadTooLarge { max: max_file_size }
    } else {
        LabError::InvalidRequest(format!("{}: {}", context, err))
    }
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "active".to_string(),
        message: "Lab Test Analyzer API is running".to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state
        .catalog
        .definitions()
        .iter()
        .map(|d| CatalogEntryInfo {
            name: d.name.clone(),
            unit: d.unit.clone(),
            reference_range: d.reference_range.clone(),
        })
        .collect();

    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_engine: state.engines.default_name().to_string(),
        available_engines: state.engines.info(),
        max_file_size_bytes: state.config.max_file_size,
        default_language: state.config.default_language.clone(),
        catalog,
    })
}
