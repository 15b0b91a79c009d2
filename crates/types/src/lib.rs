//! Wire and record types shared by the PDF customizer service and its registry backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prefix applied to the original upload name to form the download name.
pub const DISPLAY_NAME_PREFIX: &str = "customized_";

/// Message returned alongside a successful customization.
pub const CUSTOMIZE_SUCCESS_MESSAGE: &str = "PDF has been customized and saved.";

/// One stored transformation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DerivedDocumentRecord {
    /// Opaque identifier handed to the client.
    pub file_id: String,
    /// Name presented when the document is downloaded.
    pub file_name: String,
    /// Storage location of the derived bytes.
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

/// Values required to register a derived document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocumentRecord {
    pub file_id: String,
    pub file_name: String,
    pub file_path: String,
}

impl NewDocumentRecord {
    pub fn new(
        file_id: impl Into<String>,
        file_name: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            file_name: file_name.into(),
            file_path: file_path.into(),
        }
    }
}

/// Body of a successful `POST /customize-pdf/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomizeResponse {
    pub status: String,
    pub file_id: String,
    pub message: String,
}

impl CustomizeResponse {
    pub fn success(file_id: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            file_id: file_id.into(),
            message: CUSTOMIZE_SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Error body used by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Liveness payload served from `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
}
