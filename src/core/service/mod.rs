#![allow(clippy::result_large_err)]

//! Submit and fetch flows tying the transform engine to the document registry.

use crate::core::error::AppError;
use crate::core::storage::{display_name, DocumentStorage};
use crate::core::transform::{self, TransformRequest};
use crate::core::types::ErrorCategory;
use pdf_customizer_backend::DocumentRegistry;
use pdf_customizer_types::{CustomizeResponse, DerivedDocumentRecord, NewDocumentRecord};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub const NOT_FOUND_DETAIL: &str = "PDF not found";

/// Bounds applied to every submitted transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimits {
    pub max_copies: u32,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        ServiceLimits { max_copies: 100 }
    }
}

/// A registry hit together with an open handle on the stored file.
#[derive(Debug)]
pub struct RetrievedDocument {
    pub record: DerivedDocumentRecord,
    pub file: tokio::fs::File,
    pub len: u64,
}

pub struct PdfService {
    registry: Arc<dyn DocumentRegistry>,
    storage: DocumentStorage,
    limits: ServiceLimits,
}

impl PdfService {
    pub fn new(
        registry: Arc<dyn DocumentRegistry>,
        storage: DocumentStorage,
        limits: ServiceLimits,
    ) -> Self {
        PdfService {
            registry,
            storage,
            limits,
        }
    }

    pub fn storage(&self) -> &DocumentStorage {
        &self.storage
    }

    /// Reject copy counts outside `1..=max_copies`.
    pub fn validate(&self, request: &TransformRequest) -> Result<(), AppError> {
        if request.copies < 1 {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "copies must be at least 1",
            ));
        }
        if request.copies > self.limits.max_copies {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!("copies must not exceed {}", self.limits.max_copies),
            ));
        }
        Ok(())
    }

    /// Stage, transform and register an upload, returning the minted identifier.
    ///
    /// The staged upload is removed whether or not the flow succeeds. Nothing else is rolled
    /// back: a derived file written before a failed registry insert stays on disk.
    pub async fn submit(
        &self,
        upload_name: &str,
        bytes: &[u8],
        request: TransformRequest,
    ) -> Result<CustomizeResponse, AppError> {
        self.validate(&request)?;
        let file_id = uuid::Uuid::new_v4().to_string();
        let result = self
            .stage_transform_register(&file_id, upload_name, bytes, request)
            .await;
        self.storage.discard_staged(&file_id).await;
        result.map_err(|mut err| {
            err.add_context("file_id", &file_id);
            err
        })
    }

    async fn stage_transform_register(
        &self,
        file_id: &str,
        upload_name: &str,
        bytes: &[u8],
        request: TransformRequest,
    ) -> Result<CustomizeResponse, AppError> {
        let staged = self.storage.stage(file_id, bytes).await?;
        let derived = self.storage.derived_path(file_id);

        let destination = derived.clone();
        let output = tokio::task::spawn_blocking(move || {
            transform::customize_file(&staged, &destination, &request)
        })
        .await
        .map_err(|e| {
            AppError::new(
                ErrorCategory::InternalError,
                format!("transform task failed: {}", e),
            )
        })??;

        let record = NewDocumentRecord::new(
            file_id,
            display_name(upload_name),
            derived.to_string_lossy(),
        );
        self.registry.insert(&record).await?;

        info!(
            file_id,
            orientation = %request.orientation,
            copies = request.copies,
            source_pages = output.source_pages,
            output_pages = output.output_pages,
            "customized PDF stored as {}",
            record.file_name
        );
        Ok(CustomizeResponse::success(file_id))
    }

    /// Look up a derived document and open it for streaming.
    pub async fn fetch(&self, file_id: &str) -> Result<RetrievedDocument, AppError> {
        let record = self
            .registry
            .find_by_file_id(file_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCategory::NotFound, NOT_FOUND_DETAIL).with_context(file_id)
            })?;
        let (file, len) = self.storage.open(Path::new(&record.file_path)).await?;
        Ok(RetrievedDocument { record, file, len })
    }
}
