//! Axum server for the dashboard page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rust_embed::RustEmbed;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::catalog::ReportCatalog;
use crate::model::{Report, ResultKind};
use crate::render::report_entry;
use crate::runner::ReportRunner;
use crate::source::DataSource;

/// Embedded static files for the dashboard page.
#[derive(RustEmbed)]
#[folder = "ui/"]
struct Assets;

/// Shared state: the catalog and the one connection every request uses.
pub struct AppState {
    pub title: String,
    pub catalog: ReportCatalog,
    pub source: Mutex<Box<dyn DataSource + Send>>,
}

type ApiError = (StatusCode, String);

/// Build the axum router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/reports", get(list_reports))
        .route("/api/reports/{id}", get(run_report))
        .route("/api/dashboard", get(run_dashboard))
        .fallback(static_handler)
        .layer(cors)
        .with_state(state)
}

/// Start the web server.
///
/// The caller keeps its own handle on `state` so a worker-backed source is
/// dropped outside the async runtime.
pub async fn serve(
    state: Arc<AppState>,
    port: u16,
    open_browser: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let title = state.title.clone();
    let app = router(state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "dashboard listening");
    println!("{}", title);
    println!("   URL: http://localhost:{}", port);
    println!();
    println!("   Press Ctrl+C to stop");

    if open_browser {
        let _ = open::that(format!("http://localhost:{}", port));
    }

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Serialize)]
struct ReportSummary<'a> {
    id: &'a str,
    title: &'a str,
    kind: ResultKind,
}

/// GET /api/reports - catalog in display order
async fn list_reports(State(state): State<Arc<AppState>>) -> Json<JsonValue> {
    let reports: Vec<ReportSummary<'_>> = state
        .catalog
        .list()
        .iter()
        .map(|r| ReportSummary {
            id: &r.id,
            title: &r.title,
            kind: r.kind,
        })
        .collect();
    Json(json!({ "title": state.title, "reports": reports }))
}

/// GET /api/reports/{id} - run one report
async fn run_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JsonValue>, ApiError> {
    if state.catalog.get(&id).is_none() {
        return Err((StatusCode::NOT_FOUND, format!("unknown report id: {}", id)));
    }
    let entries = run_blocking(state, Some(id)).await?;
    entries
        .into_iter()
        .next()
        .map(Json)
        .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "report produced no entry".to_string()))
}

/// GET /api/dashboard - run every report in order
async fn run_dashboard(State(state): State<Arc<AppState>>) -> Result<Json<JsonValue>, ApiError> {
    let title = state.title.clone();
    let entries = run_blocking(state, None).await?;
    Ok(Json(json!({ "title": title, "reports": entries })))
}

/// Queries block, so they run on the blocking pool, one request at a time.
async fn run_blocking(
    state: Arc<AppState>,
    only: Option<String>,
) -> Result<Vec<JsonValue>, ApiError> {
    let internal = |e: String| (StatusCode::INTERNAL_SERVER_ERROR, e);

    tokio::task::spawn_blocking(move || {
        let source = state
            .source
            .lock()
            .map_err(|_| "data source lock poisoned".to_string())?;
        let runner = ReportRunner::new(&**source);

        let reports: Vec<&Report> = match &only {
            Some(id) => state.catalog.get(id).into_iter().collect(),
            None => state.catalog.list().iter().collect(),
        };
        let entries = reports
            .into_iter()
            .map(|report| report_entry(report, &runner.run(report)).map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, String>>();
        entries
    })
    .await
    .map_err(|e| internal(e.to_string()))?
    .map_err(internal)
}

async fn static_handler(uri: Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}
