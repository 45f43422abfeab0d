use axum::{
    routing::{get, post},
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
    extract::{
        Path,
        State,
        ws::WebSocketUpgrade,
    },
};

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};
use uuid::Uuid;

use waveform_reader::{WaveformError, WaveformReader};

use crate::routes::ws_handler::handle_ws_fetch;
use crate::state::app_state::{unique_name, AppState, LoadedFile, SignalInfo};

#[derive(Serialize)]
pub struct ReaderSummary {
    pub id: String,
    pub path: String,
    pub row_count: usize,
    pub signals_count: usize,
    pub headers: Vec<String>,
}

/// Response for GET /readers/{id}/headers
#[derive(Serialize)]
pub struct ReaderHeaders {
    pub id: String,
    pub headers: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct FileReadRequest {
    pub mode: String, // "online" | "offline"
    pub path: String,
}

#[derive(Serialize, Debug)]
pub struct FileReadResponse {
    pub id: String,
    pub name: String,
    pub path: String,
    pub source: String,
    pub headers: Option<Vec<String>>,
    pub desc: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: Option<String>,
    pub source_url: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SignalValues {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}


/// =======================
/// ROUTER
/// =======================

pub fn data_routes(state: AppState) -> Router {
    Router::new()
        .route("/read-file", post(read_file))
        .route("/signals/{*name}", get(signal_values))
        .route("/fetch/{*signal}", get(ws_fetch))
        .route("/readers", get(list_readers))
        .route("/readers/{id}/headers", get(reader_headers))
        .with_state(state)
}

pub fn status_for(err: &WaveformError) -> StatusCode {
    match err {
        WaveformError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        WaveformError::RealSignalAccessor { .. }
        | WaveformError::MissingAccessor { .. }
        | WaveformError::Projection { .. }
        | WaveformError::ComplexLengthMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn error_response(err: &WaveformError) -> Response {
    (status_for(err), Json(json!({ "error": err.to_string() }))).into_response()
}


/// =======================
/// HANDLERS
/// =======================

async fn read_file(
    State(state): State<AppState>,
    Json(request): Json<FileReadRequest>,
) -> Response {
    debug!("Reading file: mode={}, path={}", request.mode, request.path);

    let path = request.path.clone();
    let loaded = tokio::task::spawn_blocking(move || WaveformReader::open(&path)).await;

    let waveform = match loaded {
        Ok(Ok(w)) => Arc::new(w),
        Ok(Err(e)) => {
            error!("Failed to open file {}: {}", request.path, e);
            return error_response(&e);
        }
        Err(e) => {
            error!("Loader task for {} failed: {}", request.path, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let file_id = Uuid::new_v4().to_string();
    let mut exposed_headers = Vec::new();

    {
        let mut signals = state.signals.write().await;

        for base_name in waveform.resolver().selectable_names() {
            // Global unique name across every loaded file
            let final_name = unique_name(&*signals, &base_name);

            info!("Register signal: {} (original: {})", final_name, base_name);

            signals.insert(
                final_name.clone(),
                SignalInfo {
                    waveform: waveform.clone(),
                    file_id: file_id.clone(),
                    original_name: base_name,
                },
            );

            exposed_headers.push(final_name);
        }
    }

    state.files.write().await.insert(
        file_id.clone(),
        LoadedFile {
            path: request.path.clone(),
            waveform,
            headers: exposed_headers.clone(),
        },
    );

    let file_name = request
        .path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("unknown")
        .to_string();

    Json(FileReadResponse {
        id: file_id,
        name: file_name,
        path: request.path.clone(),
        source: request.path,
        headers: Some(exposed_headers),
        desc: None,
        tags: None,
        created_at: Some(Utc::now().to_rfc3339()),
        source_url: None,
    })
    .into_response()
}


async fn lookup_signal(state: &AppState, name: &str) -> Option<SignalInfo> {
    let signals = state.signals.read().await;
    signals.get(name).cloned()
}


async fn signal_values(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    let Some(info) = lookup_signal(&state, &name).await else {
        error!("Signal not found: {}", name);
        return StatusCode::NOT_FOUND.into_response();
    };

    match info.waveform.resolve_signal_values(&info.original_name) {
        Ok(Some(y)) => Json(SignalValues {
            name,
            x: info.waveform.independent_values().to_vec(),
            y,
        })
        .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("Resolving {} failed: {}", name, e);
            error_response(&e)
        }
    }
}


async fn ws_fetch(
    State(state): State<AppState>,
    Path(signal_name): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let Some(signal_info) = lookup_signal(&state, &signal_name).await else {
        error!("Signal not found: {}", signal_name);
        return StatusCode::NOT_FOUND.into_response();
    };

    ws.on_upgrade(move |socket| handle_ws_fetch(socket, signal_info))
}


async fn list_readers(
    State(state): State<AppState>,
) -> impl IntoResponse {
    let files = state.files.read().await;

    let mut out: Vec<ReaderSummary> = files
        .iter()
        .map(|(id, file)| ReaderSummary {
            id: id.clone(),
            path: file.path.clone(),
            row_count: file.waveform.row_count(),
            signals_count: file.headers.len(),
            headers: file.headers.clone(),
        })
        .collect();
    out.sort_by(|a, b| a.path.cmp(&b.path));

    Json(out)
}


async fn reader_headers(
    State(state): State<AppState>,
    Path(reader_id): Path<String>,
) -> impl IntoResponse {
    let files = state.files.read().await;

    match files.get(&reader_id) {
        Some(file) => Json(ReaderHeaders {
            id: reader_id.clone(),
            headers: file.headers.clone(),
        })
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
