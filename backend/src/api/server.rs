//! HTTP Server for the carload converter.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/`               | Upload form                              |
//! | POST   | `/`               | Convert an upload (form target)          |
//! | POST   | `/api/convert`    | Convert an upload                        |
//! | GET    | `/api/template`   | Import template headers and their rules  |
//! | GET    | `/api/logs`       | SSE stream for real-time logs            |
//! | GET    | `/health`         | Health check                             |
//!
//! Uploads are multipart forms with exactly one of two file fields:
//! `origin` (readable xlsx output) or `processed_csv` (import CSV output).

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method},
    response::{sse::Event, Html, IntoResponse, Json, Response, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, log_warning, JobLog, LOG_BROADCASTER};
use super::types::{HealthResponse, TemplateResponse};
use crate::config::Config;
use crate::error::{ServerError, ServerResult};
use crate::transform::pipeline::{select_input, Converter, Upload};

/// Multipart field selecting the readable branch
pub const ORIGIN_FIELD: &str = "origin";

/// Multipart field selecting the import branch
pub const PROCESSED_FIELD: &str = "processed_csv";

const INDEX_HTML: &str = r#"<!doctype html>
<title>Shipment Column Processor</title>
<h1>Shipment Column Processor</h1>
<form method=post enctype=multipart/form-data>
  <p><strong>1) Upload original export to clean (Excel output):</strong><br>
     <input type=file name=origin accept=".xls,.xlsx,.ods,.csv"></p>
  <p><strong>2) OR upload processed sheet for import-template CSV output:</strong><br>
     <input type=file name=processed_csv accept=".xls,.xlsx,.ods,.csv"></p>
  <p><input type=submit value=Process></p>
</form>
"#;

/// Build the application router
pub fn router(converter: Converter, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(index).post(convert_upload))
        .route("/api/convert", axum::routing::post(convert_upload))
        .route("/api/template", get(template_info))
        .route("/api/logs", get(sse_logs))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(converter)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    // The mapper cannot run without a template; fail before binding
    let converter = Converter::load(config.template_path.as_deref())?;
    log_info(format!(
        "📋 Loaded {} template headers ({}), {} mapping rules",
        converter.template().len(),
        converter.template().origin(),
        converter.mapping().len()
    ));
    for gap in converter.coverage_gaps() {
        log_warning(format!("Mapped header '{}' is not in the template", gap));
    }

    let app = router(converter, config.max_upload_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 Carload server running on http://localhost:{}", config.port);
    println!("   GET  /              - Upload form");
    println!("   POST /api/convert   - Convert an upload");
    println!("   GET  /api/template  - Template headers and rules");
    println!("   GET  /api/logs      - SSE log stream");
    println!("   GET  /health        - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
async fn health(State(converter): State<Converter>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(&converter))
}

/// Template headers with their mapping rules
async fn template_info(State(converter): State<Converter>) -> Response {
    Json(TemplateResponse::from_converter(&converter)).into_response()
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

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

/// Convert an uploaded file and return it as an attachment
async fn convert_upload(
    State(converter): State<Converter>,
    mut multipart: Multipart,
) -> ServerResult<Response> {
    let mut origin: Option<Upload> = None;
    let mut processed: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != ORIGIN_FIELD && name != PROCESSED_FIELD {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?
            .to_vec();
        let upload = Upload { file_name, bytes };

        if name == ORIGIN_FIELD {
            origin = Some(upload);
        } else {
            processed = Some(upload);
        }
    }

    let (kind, upload) = select_input(origin, processed)?;

    let log = JobLog::start();
    log.info(format!(
        "📄 New upload: {} ({} bytes) -> {:?}",
        upload.file_name.as_deref().unwrap_or("unknown"),
        upload.bytes.len(),
        kind
    ));

    let job = log.clone();
    let output = tokio::task::spawn_blocking(move || {
        converter.convert_bytes_logged(kind, &upload.bytes, &job)
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))??;

    let disposition = format!("attachment; filename=\"{}\"", output.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, output.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        output.bytes,
    )
        .into_response())
}
