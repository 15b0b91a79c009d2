#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use pdf_customizer_types::DISPLAY_NAME_PREFIX;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const STAGING_DIR: &str = "staging";
const FALLBACK_UPLOAD_NAME: &str = "document.pdf";

/// On-disk layout for staged uploads and derived documents.
///
/// Every path is derived from the minted file id; client-supplied names never reach the
/// filesystem.
#[derive(Debug, Clone)]
pub struct DocumentStorage {
    root: PathBuf,
}

impl DocumentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DocumentStorage { root: root.into() }
    }

    /// Create the storage root and staging directory.
    pub fn ensure_layout(&self) -> Result<(), AppError> {
        let staging = self.root.join(STAGING_DIR);
        std::fs::create_dir_all(&staging).map_err(|e| {
            AppError::with_source(
                ErrorCategory::IoError,
                format!(
                    "Failed to create storage directory {}: {}",
                    staging.display(),
                    e
                ),
                e,
            )
        })
    }

    pub fn staging_path(&self, file_id: &str) -> PathBuf {
        self.root
            .join(STAGING_DIR)
            .join(format!("{}.upload", file_id))
    }

    pub fn derived_path(&self, file_id: &str) -> PathBuf {
        self.root.join(format!("{}.pdf", file_id))
    }

    /// Write the uploaded bytes verbatim to the staging area.
    pub async fn stage(&self, file_id: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        let path = self.staging_path(file_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await.map_err(|e| {
            AppError::with_source(
                ErrorCategory::IoError,
                format!("Failed to stage upload: {}", e),
                e,
            )
            .with_context(path.display().to_string())
        })?;
        Ok(path)
    }

    /// Remove a staged upload. Failures are logged and otherwise ignored.
    pub async fn discard_staged(&self, file_id: &str) {
        let path = self.staging_path(file_id);
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "failed to remove staged upload {}: {}",
                path.display(),
                e
            ),
        }
    }

    /// Open a stored document for streaming along with its size in bytes.
    /// A missing file is reported as an I/O error.
    pub async fn open(&self, path: &Path) -> Result<(fs::File, u64), AppError> {
        let read_error = |e: std::io::Error| {
            AppError::with_source(
                ErrorCategory::IoError,
                format!("Failed to read stored document {}: {}", path.display(), e),
                e,
            )
        };
        let file = fs::File::open(path).await.map_err(read_error)?;
        let len = file.metadata().await.map_err(read_error)?.len();
        Ok((file, len))
    }
}

/// Download name for a derived document: the fixed prefix plus the upload's final path
/// component.
pub fn display_name(upload_name: &str) -> String {
    let base = upload_name
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or(FALLBACK_UPLOAD_NAME);
    format!("{}{}", DISPLAY_NAME_PREFIX, base)
}
