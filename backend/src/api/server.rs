//! HTTP Server for the datasweeper API.
//!
//! Provides REST endpoints for uploading, cleaning, charting and
//! converting tables. Files live in per-session state on the server.
//!
//! # API Endpoints
//!
//! | Method | Path                                          | Description                |
//! |--------|-----------------------------------------------|----------------------------|
//! | GET    | `/health`                                     | Health check               |
//! | POST   | `/api/sessions`                               | Create a session           |
//! | DELETE | `/api/sessions/{session}`                     | End a session              |
//! | POST   | `/api/sessions/{session}/files`               | Upload files (multipart)   |
//! | GET    | `/api/sessions/{session}/files`               | List files                 |
//! | GET    | `/api/sessions/{session}/files/{file}`        | File summary and preview   |
//! | POST   | `/api/sessions/{session}/files/{file}/dedup`  | Remove duplicate rows      |
//! | POST   | `.../files/{file}/fill-missing`               | Fill numeric gaps          |
//! | GET    | `.../files/{file}/chart?column=`              | Bar chart of a column      |
//! | PUT    | `.../files/{file}/columns`                    | Select columns             |
//! | POST   | `.../files/{file}/reset`                      | Restore the uploaded table |
//! | GET    | `.../files/{file}/export?format=csv\|excel`   | Download the converted file|
//! | GET    | `/api/logs`                                   | SSE stream for live logs   |

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{delete, get, post, put},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use uuid::Uuid;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{
    ChartQuery, ColumnsRequest, ColumnsResponse, DedupResponse, ExportQuery, FileSummary,
    FillResponse, SessionCreated, UploadResponse, UploadResult,
};
use crate::chart::Visualization;
use crate::config::ServerConfig;
use crate::error::{ServerError, SessionError};
use crate::models::UploadedFile;
use crate::parser::TableFormat;
use crate::session::{parse_file_id, parse_session_id, SessionStore};

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<SessionStore>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let ttl = chrono::Duration::minutes(config.session_ttl_minutes);
        Self {
            sessions: Arc::new(RwLock::new(SessionStore::with_ttl(ttl))),
            config: Arc::new(config),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    // Permissive CORS for the dev frontend on another port
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{session}", delete(delete_session))
        .route("/api/sessions/{session}/files", post(upload_files).get(list_files))
        .route("/api/sessions/{session}/files/{file}", get(get_file))
        .route("/api/sessions/{session}/files/{file}/dedup", post(dedup))
        .route("/api/sessions/{session}/files/{file}/fill-missing", post(fill_missing))
        .route("/api/sessions/{session}/files/{file}/chart", get(chart))
        .route("/api/sessions/{session}/files/{file}/columns", put(select_columns))
        .route("/api/sessions/{session}/files/{file}/reset", post(reset))
        .route("/api/sessions/{session}/files/{file}/export", get(export))
        .route("/api/logs", get(sse_logs));

    app = match &state.config.static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.route("/", get(health)),
    };

    app.layer(DefaultBodyLimit::max(state.config.max_upload_bytes()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.port;
    let static_dir = config.static_dir.clone();
    let app = router(AppState::new(config));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("🚀 Data Sweeper running on http://localhost:{}", port);
    tracing::info!("   POST /api/sessions                 - Start a session");
    tracing::info!("   POST /api/sessions/{{id}}/files      - Upload CSV or Excel files");
    tracing::info!("   GET  /api/logs                     - SSE log stream");
    if let Some(dir) = static_dir {
        tracing::info!("   Serving frontend from {}", dir.display());
    }

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "datasweeper",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip what they missed
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

// ============================================================================
// Sessions
// ============================================================================

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let session_id = state.sessions.write().await.create();
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<StatusCode, ServerError> {
    let id = parse_session_id(&session)?;
    state.sessions.write().await.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Files
// ============================================================================

/// Multipart upload: every `file` field is one file
async fn upload_files(
    State(state): State<AppState>,
    Path(session): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    let id = parse_session_id(&session)?;
    // Fail fast on unknown sessions, before reading the body
    state.sessions.write().await.get(id)?;

    let mut uploads = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("unnamed").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
        uploads.push(UploadedFile::new(name, bytes.to_vec()));
    }

    if uploads.is_empty() {
        return Err(ServerError::BadRequest("No file provided".to_string()));
    }

    let preview_rows = state.config.preview_rows;
    let mut store = state.sessions.write().await;
    let mut files = Vec::with_capacity(uploads.len());

    for upload in &uploads {
        match store.add_file(id, upload) {
            Ok(entry) => files.push(UploadResult::Ok {
                file: FileSummary::from_entry(entry, preview_rows),
            }),
            Err(e @ SessionError::SessionNotFound(_)) => return Err(e.into()),
            Err(e) => {
                log_error(format!("{}: {}", upload.name, e));
                files.push(UploadResult::Error {
                    name: upload.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(Json(UploadResponse { files }))
}

async fn list_files(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<Vec<FileSummary>>, ServerError> {
    let id = parse_session_id(&session)?;
    let preview_rows = state.config.preview_rows;
    let mut store = state.sessions.write().await;

    let files = store
        .files(id)?
        .iter()
        .map(|entry| FileSummary::from_entry(entry, preview_rows))
        .collect();
    Ok(Json(files))
}

fn ids(session: &str, file: &str) -> Result<(Uuid, Uuid), ServerError> {
    Ok((parse_session_id(session)?, parse_file_id(file)?))
}

async fn get_file(
    State(state): State<AppState>,
    Path((session, file)): Path<(String, String)>,
) -> Result<Json<FileSummary>, ServerError> {
    let (session, file) = ids(&session, &file)?;
    let mut store = state.sessions.write().await;
    let entry = store.file(session, file)?;
    Ok(Json(FileSummary::from_entry(entry, state.config.preview_rows)))
}

async fn dedup(
    State(state): State<AppState>,
    Path((session, file)): Path<(String, String)>,
) -> Result<Json<DedupResponse>, ServerError> {
    let (session, file) = ids(&session, &file)?;
    let mut store = state.sessions.write().await;
    let removed = store.dedup(session, file)?;
    let entry = store.file(session, file)?;
    Ok(Json(DedupResponse {
        removed,
        file: FileSummary::from_entry(entry, state.config.preview_rows),
    }))
}

async fn fill_missing(
    State(state): State<AppState>,
    Path((session, file)): Path<(String, String)>,
) -> Result<Json<FillResponse>, ServerError> {
    let (session, file) = ids(&session, &file)?;
    let mut store = state.sessions.write().await;
    let report = store.fill_missing(session, file)?;
    let entry = store.file(session, file)?;
    Ok(Json(FillResponse {
        report,
        file: FileSummary::from_entry(entry, state.config.preview_rows),
    }))
}

async fn chart(
    State(state): State<AppState>,
    Path((session, file)): Path<(String, String)>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<Visualization>, ServerError> {
    let (session, file) = ids(&session, &file)?;
    let column = query.column.filter(|c| !c.is_empty());
    let visualization = state
        .sessions
        .write()
        .await
        .chart(session, file, column.as_deref())?;
    Ok(Json(visualization))
}

async fn select_columns(
    State(state): State<AppState>,
    Path((session, file)): Path<(String, String)>,
    Json(request): Json<ColumnsRequest>,
) -> Result<Json<ColumnsResponse>, ServerError> {
    let (session, file) = ids(&session, &file)?;
    let selected_columns = state
        .sessions
        .write()
        .await
        .select_columns(session, file, &request.columns)?;
    Ok(Json(ColumnsResponse { selected_columns }))
}

async fn reset(
    State(state): State<AppState>,
    Path((session, file)): Path<(String, String)>,
) -> Result<Json<FileSummary>, ServerError> {
    let (session, file) = ids(&session, &file)?;
    let mut store = state.sessions.write().await;
    let entry = store.reset(session, file)?;
    Ok(Json(FileSummary::from_entry(entry, state.config.preview_rows)))
}

/// Download the selected columns as CSV (default) or Excel
async fn export(
    State(state): State<AppState>,
    Path((session, file)): Path<(String, String)>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ServerError> {
    let (session, file) = ids(&session, &file)?;
    let format = match query.format.as_deref() {
        None | Some("") => TableFormat::Csv,
        Some(raw) => raw.parse::<TableFormat>().map_err(ServerError::BadRequest)?,
    };

    let artifact = state.sessions.write().await.export(session, file, format)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        artifact.file_name.replace(['"', '\\', '\r', '\n'], "_")
    );
    let headers = [
        (header::CONTENT_TYPE, artifact.content_type.to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, artifact.bytes).into_response())
}
