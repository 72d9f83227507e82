//! HTTP server for document extraction, conversion and auditing.

use crate::config::ServerConfig;
use crate::responses::{ConvertResponse, ErrorResponse, HealthResponse};
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use doc_audit::analysis::{SharedAnalyzer, TextractAnalyzer, extract_document};
use doc_audit::audit::{Auditor, OpenAiClient, SharedCompletion, parse_documents};
use doc_audit::convert::convert_structured;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Application state shared across handlers
pub struct AppState {
    pub analyzer: SharedAnalyzer,
    pub auditor: Auditor,
}

/// A file taken from the multipart `file` field.
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// Run the HTTP server
pub async fn run_server(
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Initializing document analysis client...");
    let analyzer: SharedAnalyzer = Arc::new(TextractAnalyzer::new(&config.analysis).await);

    info!(model = %config.completion.model, "Initializing completion client...");
    let completion: SharedCompletion = Arc::new(OpenAiClient::new(config.completion.clone())?);

    let state = Arc::new(AppState {
        analyzer,
        auditor: Auditor::new(completion),
    });
    let app = build_router(state, &config.static_dir, config.max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    info!("Server listening on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /health   - Health check");
    info!("  POST /extract  - OCR a PDF or image (multipart 'file')");
    info!("  POST /convert  - Convert CSV, Excel or XML (multipart 'file')");
    info!("  POST /audit    - Audit a list of extracted documents");
    info!("  GET  /*        - Frontend from {}", config.static_dir.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the router; unmatched paths serve the frontend with an `index.html` fallback.
pub fn build_router(state: Arc<AppState>, static_dir: &Path, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let frontend =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(health_handler))
        .route("/extract", post(extract_handler))
        .route("/convert", post(convert_handler))
        .route("/audit", post(audit_handler))
        .fallback_service(frontend)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// OCR endpoint: analyze the upload and reconstruct lines, fields and cells.
async fn extract_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();

    let upload = match read_upload(&request_id, multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };
    info!(
        request_id = %request_id,
        file_name = %upload.file_name,
        size = upload.bytes.len(),
        "Processing extract request"
    );

    let start = Instant::now();
    match extract_document(state.analyzer.as_ref(), upload.bytes).await {
        Ok(result) => {
            info!(
                request_id = %request_id,
                lines = result.text_lines.len(),
                fields = result.form_fields.len(),
                cells = result.table_cells.len(),
                total_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Extraction completed"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => {
            error!(request_id = %request_id, stage = ?e.stage(), error = ?e, "Extraction failed");
            ErrorResponse::respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong during OCR.",
            )
        }
    }
}

/// Structured file endpoint: CSV, Excel and XML become `structuredData`.
async fn convert_handler(multipart: Result<Multipart, MultipartRejection>) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();

    let upload = match read_upload(&request_id, multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };
    info!(
        request_id = %request_id,
        file_name = %upload.file_name,
        size = upload.bytes.len(),
        "Processing convert request"
    );

    let converted = tokio::task::spawn_blocking(move || {
        convert_structured(&upload.file_name, &upload.bytes)
    })
    .await;

    match converted {
        Ok(Ok(structured_data)) => {
            info!(request_id = %request_id, "Conversion completed");
            (StatusCode::OK, Json(ConvertResponse { structured_data })).into_response()
        }
        Ok(Err(e)) if e.is_client_error() => {
            warn!(request_id = %request_id, error = %e, "Rejected structured upload");
            ErrorResponse::respond(StatusCode::BAD_REQUEST, "Unsupported structured file type")
        }
        Ok(Err(e)) => {
            error!(request_id = %request_id, stage = ?e.stage(), error = ?e, "Conversion failed");
            ErrorResponse::respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to convert structured document.",
            )
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Conversion task panicked");
            ErrorResponse::respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to convert structured document.",
            )
        }
    }
}

/// Audit endpoint: one completion over every submitted document.
async fn audit_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();

    let documents = match body
        .map_err(|e| e.body_text())
        .and_then(|Json(value)| parse_documents(value).map_err(|e| e.to_string()))
    {
        Ok(documents) => documents,
        Err(reason) => {
            warn!(request_id = %request_id, reason = %reason, "Rejected audit request");
            return ErrorResponse::respond(StatusCode::BAD_REQUEST, "Expected a list of documents");
        }
    };
    info!(request_id = %request_id, documents = documents.len(), "Processing audit request");

    match state.auditor.audit(&documents).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            error!(request_id = %request_id, stage = ?e.stage(), error = ?e, "Audit failed");
            ErrorResponse::respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate audit summary",
            )
        }
    }
}

/// Reads the `file` field, or produces the error response to send instead.
async fn read_upload(
    request_id: &str,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Upload, Response> {
    let no_file = || ErrorResponse::respond(StatusCode::BAD_REQUEST, "No file uploaded");

    let mut multipart = multipart.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "Request is not multipart");
        no_file()
    })?;

    match next_file(&mut multipart).await {
        Ok(Some(upload)) => Ok(upload),
        Ok(None) => Err(no_file()),
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "Failed to read upload");
            Err(ErrorResponse::respond(e.status(), e.body_text()))
        }
    }
}

async fn next_file(multipart: &mut Multipart) -> Result<Option<Upload>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok(Some(Upload {
            file_name,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use doc_audit::analysis::{AnalysisResponse, DocumentAnalyzer};
    use doc_audit::audit::{CompletionRequest, CompletionService};
    use doc_audit::core::errors::{AuditError, AuditResult};
    use doc_audit::domain::{Block, BlockType, EntityType, Relationship, RelationshipType};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const BOUNDARY: &str = "audit-test-boundary";

    struct FakeAnalyzer(Option<Vec<Block>>);

    #[async_trait]
    impl DocumentAnalyzer for FakeAnalyzer {
        async fn analyze(&self, _bytes: Vec<u8>) -> AuditResult<AnalysisResponse> {
            Ok(AnalysisResponse {
                blocks: self.0.clone(),
            })
        }
    }

    struct FakeCompletion(Option<&'static str>);

    #[async_trait]
    impl CompletionService for FakeCompletion {
        async fn complete(&self, _request: &CompletionRequest) -> AuditResult<String> {
            self.0
                .map(str::to_string)
                .ok_or(AuditError::EmptyCompletion)
        }
    }

    fn invoice_blocks() -> Vec<Block> {
        vec![
            Block::new("l1", BlockType::Line).with_text("Invoice #1021"),
            Block::new("w1", BlockType::Word).with_text("Total:"),
            Block::new("w2", BlockType::Word).with_text("$450.00"),
            Block::new("k1", BlockType::KeyValueSet)
                .with_entity_type(EntityType::Key)
                .with_relationship(Relationship::new(RelationshipType::Child, ["w1"]))
                .with_relationship(Relationship::new(RelationshipType::Value, ["w2"])),
            Block::new("k2", BlockType::KeyValueSet)
                .with_entity_type(EntityType::Key)
                .with_relationship(Relationship::new(RelationshipType::Child, ["w3"]))
                .with_relationship(Relationship::new(RelationshipType::Value, ["v2"])),
            Block::new("w3", BlockType::Word).with_text("Due:"),
            // Value text is read from the VALUE targets only, not their CHILD edges.
            Block::new("v2", BlockType::KeyValueSet)
                .with_entity_type(EntityType::Value)
                .with_relationship(Relationship::new(RelationshipType::Child, ["w4"])),
            Block::new("w4", BlockType::Word).with_text("2024-07-01"),
        ]
    }

    fn app(blocks: Option<Vec<Block>>, summary: Option<&'static str>) -> (Router, tempfile::TempDir) {
        let static_dir = tempfile::tempdir().unwrap();
        std::fs::write(static_dir.path().join("index.html"), "<html>audit</html>").unwrap();

        let state = Arc::new(AppState {
            analyzer: Arc::new(FakeAnalyzer(blocks)),
            auditor: Auditor::new(Arc::new(FakeCompletion(summary))),
        });
        let router = build_router(state, static_dir.path(), 1024 * 1024);
        (router, static_dir)
    }

    fn upload(uri: &str, field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _dir) = app(None, None);
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_extract_reconstructs_blocks() {
        let (router, _dir) = app(Some(invoice_blocks()), None);
        let (status, body) = send(router, upload("/extract", "file", "scan.pdf", b"%PDF-1.7")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "text_lines": ["Invoice #1021"],
                "form_fields": {"Total:": "$450.00", "Due:": ""},
                "table_cells": []
            })
        );
    }

    #[tokio::test]
    async fn test_extract_without_file_field() {
        let (router, _dir) = app(Some(invoice_blocks()), None);
        let (status, body) = send(router, upload("/extract", "attachment", "scan.pdf", b"%PDF")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No file uploaded"}));
    }

    #[tokio::test]
    async fn test_extract_not_multipart() {
        let (router, _dir) = app(Some(invoice_blocks()), None);
        let (status, body) = send(router, json_request("/extract", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No file uploaded"}));
    }

    #[tokio::test]
    async fn test_extract_missing_blocks_is_server_error() {
        for blocks in [None, Some(Vec::new())] {
            let (router, _dir) = app(blocks, None);
            let (status, body) = send(router, upload("/extract", "file", "scan.png", b"\x89PNG")).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({"error": "Something went wrong during OCR."}));
        }
    }

    #[tokio::test]
    async fn test_convert_csv() {
        let (router, _dir) = app(None, None);
        let (status, body) = send(
            router,
            upload("/convert", "file", "expenses.csv", b"item,cost\ntaxi,23.5\nhotel,\n"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"structuredData": [{"item": "taxi", "cost": 23.5}, {"item": "hotel", "cost": null}]})
        );
    }

    #[tokio::test]
    async fn test_convert_unsupported_type() {
        let (router, _dir) = app(None, None);
        let (status, body) = send(router, upload("/convert", "file", "notes.txt", b"hello")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Unsupported structured file type"}));
    }

    #[tokio::test]
    async fn test_convert_malformed_xml() {
        let (router, _dir) = app(None, None);
        let (status, body) = send(router, upload("/convert", "file", "po.xml", b"<po><total>")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to convert structured document."}));
    }

    #[tokio::test]
    async fn test_audit_requires_list() {
        let (router, _dir) = app(None, Some("unused"));
        let (status, body) = send(router, json_request("/audit", json!({"fileName": "a.pdf"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Expected a list of documents"}));
    }

    #[tokio::test]
    async fn test_audit_returns_summary() {
        let (router, _dir) = app(None, Some("## invoice.pdf\n- Totals reconcile."));
        let docs = json!([{
            "fileName": "invoice.pdf",
            "textLines": ["Invoice #1021"],
            "formFields": {"Total:": "$450.00"},
            "tableCells": [{"row": 1, "col": 1, "text": "Qty"}]
        }]);
        let (status, body) = send(router, json_request("/audit", docs)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"summary": "## invoice.pdf\n- Totals reconcile."}));
    }

    #[tokio::test]
    async fn test_audit_completion_failure() {
        let (router, _dir) = app(None, None);
        let (status, body) = send(router, json_request("/audit", json!([]))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to generate audit summary"}));
    }

    #[tokio::test]
    async fn test_unknown_path_serves_index() {
        let (router, _dir) = app(None, None);
        let request = Request::builder()
            .uri("/reports/42")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<html>audit</html>");
    }
}
