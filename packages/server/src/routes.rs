//! HTTP routes over the pipeline.
//!
//! Route shapes mirror the frontend's expectations: filename lists come
//! as `[{name}]` objects, figure URLs leave rewritten to this server's
//! image route, and QA returns a `{summary, answer}` pair. Pipeline
//! errors map onto distinct statuses: a never-extracted document is 404,
//! a dead provider is 503, and unparseable model output is 502.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use paperqa::pipeline::Metric;
use paperqa::{AiError, Document, DocSummaryInput, QueryError};

use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/files", get(list_files))
        .route("/api/upload", post(upload))
        .route("/api/uploads/:filename", get(serve_upload))
        .route("/api/images/:filename", get(serve_image))
        .route("/api/extract", post(trigger_extract))
        .route("/api/extract_meta_from_pdf", post(extract_meta))
        .route("/api/extract_table_from_pdf", post(extract_tables))
        .route("/api/extract_figure_from_pdf", post(extract_figures))
        .route("/api/qa", post(qa))
        .route("/api/summarize", post(summarize))
        .route("/api/get_confidence_scores", post(confidence_scores))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// =============================================================================
// Error mapping
// =============================================================================

/// Route-level error with an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "request failed");
        }
        (self.status, Json(serde_json::json!({"message": self.message}))).into_response()
    }
}

fn ai_status(error: &AiError) -> StatusCode {
    match error {
        AiError::Transient(_) | AiError::Exhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AiError::Api { .. } | AiError::MalformedOutput(_) => StatusCode::BAD_GATEWAY,
        AiError::MissingCredentials(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<QueryError> for ApiError {
    fn from(error: QueryError) -> Self {
        let status = match &error {
            QueryError::MissingArtifact { .. } => StatusCode::NOT_FOUND,
            QueryError::Ai(ai) => ai_status(ai),
            QueryError::MalformedAnswer(_) => StatusCode::BAD_GATEWAY,
            QueryError::Store(_) | QueryError::Cancelled => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl From<AiError> for ApiError {
    fn from(error: AiError) -> Self {
        Self {
            status: ai_status(&error),
            message: error.to_string(),
        }
    }
}

// =============================================================================
// Request/response shapes
// =============================================================================

#[derive(Deserialize)]
struct FileName {
    name: String,
}

#[derive(Deserialize)]
struct FilenamesRequest {
    filenames: Vec<FileName>,
}

#[derive(Serialize)]
struct FileEntry {
    name: String,
    url: String,
    raw: String,
}

#[derive(Serialize)]
struct UploadedFile {
    url: String,
}

#[derive(Deserialize)]
struct QaRequest {
    question: String,
    filenames: Vec<FileName>,
    evidence_budget: Option<usize>,
}

#[derive(Deserialize)]
struct EvalRequest {
    question: String,
    answer: serde_json::Value,
}

/// Reject filenames that would escape the data directory.
fn sanitize_filename(name: &str) -> Result<String, ApiError> {
    let candidate = std::path::Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ApiError::bad_request("invalid filename"))?;
    if candidate != name {
        return Err(ApiError::bad_request("invalid filename"));
    }
    Ok(candidate.to_string())
}

fn names(request: &FilenamesRequest) -> Vec<String> {
    request.filenames.iter().map(|f| f.name.clone()).collect()
}

// =============================================================================
// Files
// =============================================================================

async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileEntry>>, ApiError> {
    let mut entries = Vec::new();
    let mut dir = tokio::fs::read_dir(&state.data_dir)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".pdf") {
            continue;
        }
        let bytes = tokio::fs::read(entry.path())
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        entries.push(FileEntry {
            url: format!("{}/api/uploads/{}", state.public_base_url, name),
            raw: format!("data:application/pdf;base64,{encoded}"),
            name,
        });
    }
    Ok(Json(entries))
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<UploadedFile>>, ApiError> {
    let mut uploaded = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        let Some(raw_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let name = sanitize_filename(&raw_name)?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;

        tokio::fs::write(state.data_dir.join(&name), &bytes)
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?;
        info!(file = %name, size = bytes.len(), "stored upload");

        uploaded.push(UploadedFile {
            url: format!("{}/api/uploads/{}", state.public_base_url, name),
        });
    }
    if uploaded.is_empty() {
        return Err(ApiError::bad_request("no file part in the request"));
    }
    Ok(Json(uploaded))
}

async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let name = sanitize_filename(&filename)?;
    let bytes = tokio::fs::read(state.data_dir.join(&name))
        .await
        .map_err(|_| ApiError::not_found(format!("no such file: {name}")))?;
    Ok(([(header::CONTENT_TYPE, "application/pdf")], bytes).into_response())
}

async fn serve_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let name = sanitize_filename(&filename)?;
    let bytes = tokio::fs::read(state.data_dir.join("output").join(&name))
        .await
        .map_err(|_| ApiError::not_found(format!("no such image: {name}")))?;
    let content_type = if name.ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    };
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

// =============================================================================
// Extraction
// =============================================================================

async fn trigger_extract(
    State(state): State<AppState>,
    Json(request): Json<FilenamesRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut queued = Vec::new();
    for name in names(&request) {
        let name = sanitize_filename(&name)?;
        let pipeline = state.pipeline.clone();
        let document = Document::from_filename(name.clone());
        // Detached: the cache populate belongs to every future query, not
        // to this request, and keeps running if the client disconnects.
        tokio::spawn(async move {
            if let Err(error) = pipeline.ensure_extracted(&document).await {
                error!(document = %document.id, %error, "extraction failed");
            }
        });
        queued.push(name);
    }
    Ok(Json(serde_json::json!({"queued": queued})))
}

async fn extract_meta(
    State(state): State<AppState>,
    Json(request): Json<FilenamesRequest>,
) -> Result<Json<Vec<paperqa::MetaRecord>>, ApiError> {
    let records = state.pipeline.cached_meta(&names(&request)).await?;
    Ok(Json(records))
}

async fn extract_tables(
    State(state): State<AppState>,
    Json(request): Json<FilenamesRequest>,
) -> Result<Json<Vec<Vec<paperqa::TableRecord>>>, ApiError> {
    let records = state.pipeline.cached_tables(&names(&request)).await?;
    Ok(Json(records))
}

async fn extract_figures(
    State(state): State<AppState>,
    Json(request): Json<FilenamesRequest>,
) -> Result<Json<Vec<Vec<paperqa::FigureRecord>>>, ApiError> {
    let records = state.pipeline.cached_figures(&names(&request)).await?;
    let image_base = format!("{}/api/images", state.public_base_url);
    let rewritten = records
        .into_iter()
        .map(|figures| {
            figures
                .into_iter()
                .map(|figure| figure.resolved_against(&image_base))
                .collect()
        })
        .collect();
    Ok(Json(rewritten))
}

// =============================================================================
// QA, summarize, evaluate
// =============================================================================

async fn qa(
    State(state): State<AppState>,
    Json(request): Json<QaRequest>,
) -> Result<Json<paperqa::QueryResult>, ApiError> {
    let filenames: Vec<String> = request.filenames.iter().map(|f| f.name.clone()).collect();
    let result = state
        .pipeline
        .ask(&request.question, &filenames, request.evidence_budget)
        .await?;
    Ok(Json(result))
}

async fn summarize(
    State(state): State<AppState>,
    Json(docs): Json<Vec<DocSummaryInput>>,
) -> Result<Json<String>, ApiError> {
    let summary = state.pipeline.summarize(&docs).await?;
    Ok(Json(summary))
}

async fn confidence_scores(
    State(state): State<AppState>,
    Json(request): Json<EvalRequest>,
) -> Result<Json<std::collections::HashMap<String, f64>>, ApiError> {
    let answer = match &request.answer {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    let scores = state
        .pipeline
        .evaluate(&request.question, &answer, "", &[Metric::AnswerRelevancy])
        .await?;
    Ok(Json(scores))
}
