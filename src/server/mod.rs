#![allow(clippy::result_large_err)] // Server entry points return AppError for consistent diagnostics.

//! HTTP surface for the customization service.

pub mod handlers;

use crate::core::error::AppError;
use crate::core::service::PdfService;
use crate::core::types::ErrorCategory;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Extension},
    http::{header, HeaderValue, Response, StatusCode},
    routing::{get, post},
    Router,
};
use pdf_customizer_types::ErrorDetail;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::util::MapResponseLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub const PAYLOAD_TOO_LARGE_DETAIL: &str = "payload too large";

/// Listener settings resolved from the service configuration.
#[derive(Debug, Clone, Copy)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub max_upload_bytes: usize,
}

/// Build the application router around a shared service.
pub fn router(service: Arc<PdfService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/customize-pdf/", post(handlers::customize_pdf))
        .route("/customize-pdf", post(handlers::customize_pdf))
        .route("/get-pdf/{file_id}", get(handlers::get_pdf))
        .route("/openapi.json", get(handlers::openapi))
        .layer(Extension(service))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(MapResponseLayer::new(|mut response: Response<Body>| {
            if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
                let body = serde_json::to_string(&ErrorDetail::new(PAYLOAD_TOO_LARGE_DETAIL))
                    .unwrap_or_default();
                *response.body_mut() = Body::from(body);
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                response.headers_mut().remove(header::CONTENT_LENGTH);
            }
            response
        }))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP listener and block until the service terminates.
pub async fn serve(service: PdfService, settings: ServerSettings) -> Result<(), AppError> {
    serve_internal(service, settings, None).await
}

/// Start the HTTP listener and notify once the bind address is known (test helper).
pub async fn serve_with_ready_notifier(
    service: PdfService,
    settings: ServerSettings,
    ready_notifier: oneshot::Sender<SocketAddr>,
) -> Result<(), AppError> {
    serve_internal(service, settings, Some(ready_notifier)).await
}

async fn serve_internal(
    service: PdfService,
    settings: ServerSettings,
    ready_notifier: Option<oneshot::Sender<SocketAddr>>,
) -> Result<(), AppError> {
    let app = router(Arc::new(service), settings.max_upload_bytes);
    let listener = TcpListener::bind(settings.addr).await.map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to bind listener {}: {}", settings.addr, err),
        )
    })?;
    let local_addr = listener.local_addr().map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to determine listener address: {}", err),
        )
    })?;
    if let Some(tx) = ready_notifier {
        let _ = tx.send(local_addr);
    }
    info!("pdf customizer listening on {}", local_addr);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            AppError::new(
                ErrorCategory::InternalError,
                format!("server terminated: {}", err),
            )
        })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    } else {
        std::future::pending::<()>().await;
    }
}
