use crate::{
    cli::args::{ServeArgs, TransformArgs},
    core::{
        storage::display_name, transform, ConfigLoader, ConfigValidator, DocumentStorage,
        PdfService, ServiceConfig, ServiceLimits, TransformRequest,
    },
    server::{self, ServerSettings},
    Result,
};
use anyhow::Context;
use pdf_customizer_backend::SqliteRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = ConfigLoader::load(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    ConfigValidator::validate(&config)?;
    let addr = config.socket_addr()?;

    let storage = DocumentStorage::new(&config.storage.dir);
    storage.ensure_layout()?;
    ensure_database_dir(&config.database.url)?;
    let registry = SqliteRegistry::connect(&config.database.url)
        .await
        .with_context(|| format!("failed to open registry {}", config.database.url))?;

    info!(
        storage = %config.storage.dir.display(),
        database = %config.database.url,
        max_copies = config.transform.max_copies,
        max_upload_bytes = config.server.max_upload_bytes,
        "registry ready"
    );

    let service = PdfService::new(
        Arc::new(registry),
        storage,
        ServiceLimits {
            max_copies: config.transform.max_copies,
        },
    );
    server::serve(
        service,
        ServerSettings {
            addr,
            max_upload_bytes: config.server.max_upload_bytes,
        },
    )
    .await?;
    Ok(())
}

pub async fn transform(args: TransformArgs) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    let request = TransformRequest {
        orientation: args.orientation.into(),
        copies: args.copies,
    };

    let source = args.input.clone();
    let destination = output.clone();
    let result = tokio::task::spawn_blocking(move || {
        transform::customize_file(&source, &destination, &request)
    })
    .await?
    .with_context(|| format!("failed to customize {}", args.input.display()))?;

    info!(
        input = %args.input.display(),
        output = %output.display(),
        source_pages = result.source_pages,
        output_pages = result.output_pages,
        "transform complete"
    );
    println!(
        "Wrote {} ({} pages from {} source pages)",
        output.display(),
        result.output_pages,
        result.source_pages
    );
    Ok(())
}

/// Flags take precedence over file and environment values.
fn apply_overrides(config: &mut ServiceConfig, args: &ServeArgs) {
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = &args.storage_dir {
        config.storage.dir = dir.clone();
    }
    if let Some(url) = &args.database_url {
        config.database.url = url.clone();
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(display_name(&name))
}

/// Create the parent directory of a file-backed SQLite database.
fn ensure_database_dir(url: &str) -> Result<()> {
    let Some(path) = sqlite_file_path(url) else {
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create database directory {}", parent.display()))?;
    }
    Ok(())
}

fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(PathBuf::from(path))
    }
}
