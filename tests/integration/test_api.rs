#[path = "../common/mod.rs"]
mod common;

use anyhow::Result;
use common::{page_rotations, sample_pdf};
use pdf_customizer::core::error::AppError;
use pdf_customizer::core::service::{PdfService, ServiceLimits};
use pdf_customizer::core::storage::DocumentStorage;
use pdf_customizer::core::transform;
use pdf_customizer::core::types::ErrorCategory;
use pdf_customizer::server::{self, ServerSettings};
use pdf_customizer_backend::SqliteRegistry;
use reqwest::multipart::{Form, Part};
use reqwest::{header, StatusCode};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::{sync::oneshot, task::JoinHandle};

const DEFAULT_LIMIT: usize = 4 * 1024 * 1024;

struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<Result<(), AppError>>,
    storage_root: PathBuf,
    _dir: TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn staged_count(&self) -> usize {
        std::fs::read_dir(self.storage_root.join("staging"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}

async fn spawn_server(max_upload_bytes: usize) -> Result<TestServer> {
    let dir = TempDir::new()?;
    let storage_root = dir.path().join("generated_pdfs");
    let storage = DocumentStorage::new(&storage_root);
    storage.ensure_layout()?;
    let database_url = format!("sqlite://{}", storage_root.join("pdf_files.db").display());
    let registry = SqliteRegistry::connect(&database_url).await?;
    let service = PdfService::new(Arc::new(registry), storage, ServiceLimits::default());
    let settings = ServerSettings {
        addr: "127.0.0.1:0".parse()?,
        max_upload_bytes,
    };

    let (addr_tx, addr_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        server::serve_with_ready_notifier(service, settings, addr_tx).await
    });
    let addr = addr_rx.await.map_err(|_| {
        AppError::new(
            ErrorCategory::InternalError,
            "server startup canceled before bind address reported",
        )
    })?;
    Ok(TestServer {
        addr,
        handle,
        storage_root,
        _dir: dir,
    })
}

fn pdf_part(bytes: Vec<u8>, name: &str) -> Result<Part> {
    Ok(Part::bytes(bytes)
        .file_name(name.to_string())
        .mime_str("application/pdf")?)
}

async fn submit(
    client: &reqwest::Client,
    server: &TestServer,
    form: Form,
) -> Result<(StatusCode, Value)> {
    let resp = client
        .post(server.url("/customize-pdf/"))
        .multipart(form)
        .send()
        .await?;
    let status = resp.status();
    let body: Value = resp.json().await?;
    Ok((status, body))
}

#[tokio::test]
async fn liveness_returns_welcome_message() -> Result<()> {
    let server = spawn_server(DEFAULT_LIMIT).await?;
    let resp = reqwest::get(server.url("/")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Welcome to the PDF customization service!");
    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn landscape_copies_round_trip() -> Result<()> {
    let server = spawn_server(DEFAULT_LIMIT).await?;
    let client = reqwest::Client::new();
    let form = Form::new()
        .part("pdf_file", pdf_part(sample_pdf(3), "sample.pdf")?)
        .text("orientation", "landscape")
        .text("copies", "2");

    let (status, body) = submit(&client, &server, form).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "PDF has been customized and saved.");
    let file_id = body["file_id"].as_str().expect("file_id string").to_string();
    assert!(uuid::Uuid::parse_str(&file_id).is_ok());
    assert_eq!(server.staged_count(), 0);

    let resp = client
        .get(server.url(&format!("/get-pdf/{}", file_id)))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str()?.to_string();
    assert!(disposition.contains("filename=\"customized_sample.pdf\""));
    let content_length = resp.headers()[header::CONTENT_LENGTH].to_str()?.parse::<usize>()?;
    let bytes = resp.bytes().await?;
    assert_eq!(transform::page_count(&bytes)?, 6);
    assert_eq!(page_rotations(&bytes), vec![90; 6]);

    let on_disk = std::fs::read(server.storage_root.join(format!("{}.pdf", file_id)))?;
    assert_eq!(content_length, on_disk.len());
    assert_eq!(on_disk, bytes.to_vec());
    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn defaults_apply_and_route_accepts_missing_slash() -> Result<()> {
    let server = spawn_server(DEFAULT_LIMIT).await?;
    let client = reqwest::Client::new();
    let form = Form::new().part("pdf_file", pdf_part(sample_pdf(2), "notes.pdf")?);
    let resp = client
        .post(server.url("/customize-pdf"))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    let file_id = body["file_id"].as_str().expect("file_id string");

    let bytes = client
        .get(server.url(&format!("/get-pdf/{}", file_id)))
        .send()
        .await?
        .bytes()
        .await?;
    assert_eq!(transform::page_count(&bytes)?, 2);
    assert_eq!(page_rotations(&bytes), vec![0, 0]);
    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn repeated_uploads_get_distinct_ids() -> Result<()> {
    let server = spawn_server(DEFAULT_LIMIT).await?;
    let client = reqwest::Client::new();
    let mut ids = Vec::new();
    for copies in ["1", "3"] {
        let form = Form::new()
            .part("pdf_file", pdf_part(sample_pdf(1), "same.pdf")?)
            .text("copies", copies);
        let (status, body) = submit(&client, &server, form).await?;
        assert_eq!(status, StatusCode::OK);
        ids.push(body["file_id"].as_str().expect("file_id string").to_string());
    }
    assert_ne!(ids[0], ids[1]);

    let mut counts = Vec::new();
    for id in &ids {
        let bytes = client
            .get(server.url(&format!("/get-pdf/{}", id)))
            .send()
            .await?
            .bytes()
            .await?;
        counts.push(transform::page_count(&bytes)?);
    }
    assert_eq!(counts, vec![1, 3]);
    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn unknown_id_is_404() -> Result<()> {
    let server = spawn_server(DEFAULT_LIMIT).await?;
    let resp = reqwest::get(server.url("/get-pdf/does-not-exist")).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await?;
    assert_eq!(body, serde_json::json!({ "detail": "PDF not found" }));
    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn invalid_form_fields_are_422() -> Result<()> {
    let server = spawn_server(DEFAULT_LIMIT).await?;
    let client = reqwest::Client::new();

    let (status, body) = submit(&client, &server, Form::new().text("copies", "2")).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap_or_default().contains("pdf_file"));

    for copies in ["0", "-1", "two", "101"] {
        let form = Form::new()
            .part("pdf_file", pdf_part(sample_pdf(1), "sample.pdf")?)
            .text("copies", copies);
        let (status, body) = submit(&client, &server, form).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "copies={}", copies);
        assert!(body["detail"].is_string());
    }
    assert_eq!(server.staged_count(), 0);
    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn non_pdf_upload_is_500_and_cleans_staging() -> Result<()> {
    let server = spawn_server(DEFAULT_LIMIT).await?;
    let client = reqwest::Client::new();
    let form = Form::new().part("pdf_file", pdf_part(b"plain text".to_vec(), "notes.txt")?);
    let (status, body) = submit(&client, &server, form).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap_or_default().contains("parse"));
    assert_eq!(server.staged_count(), 0);
    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn oversized_upload_is_413() -> Result<()> {
    let server = spawn_server(512).await?;
    let client = reqwest::Client::new();
    let form = Form::new().part("pdf_file", pdf_part(vec![b'x'; 4 * 1024], "big.pdf")?);
    let (status, body) = submit(&client, &server, form).await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["detail"], "payload too large");
    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn non_multipart_body_is_400() -> Result<()> {
    let server = spawn_server(DEFAULT_LIMIT).await?;
    let resp = reqwest::Client::new()
        .post(server.url("/customize-pdf/"))
        .json(&serde_json::json!({ "copies": 2 }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert!(body["detail"].is_string());
    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn openapi_document_lists_routes() -> Result<()> {
    let server = spawn_server(DEFAULT_LIMIT).await?;
    let body: Value = reqwest::get(server.url("/openapi.json")).await?.json().await?;
    let paths = body["paths"].as_object().expect("paths object");
    for route in ["/", "/customize-pdf/", "/get-pdf/{file_id}"] {
        assert!(paths.contains_key(route), "missing {}", route);
    }
    server.shutdown().await;
    Ok(())
}
