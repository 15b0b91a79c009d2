//! Request handlers and the JSON rejection type shared by every route.

use crate::core::error::AppError;
use crate::core::service::{PdfService, NOT_FOUND_DETAIL};
use crate::core::transform::{Orientation, TransformRequest};
use crate::core::types::ErrorCategory;
use crate::server::PAYLOAD_TOO_LARGE_DETAIL;
use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Extension, Multipart, Path,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use pdf_customizer_types::{CustomizeResponse, ErrorDetail, WelcomeResponse};
use std::sync::Arc;
use tracing::{error, info, warn};
use tokio_util::io::ReaderStream;
use utoipa::{OpenApi, ToSchema};

pub const WELCOME_MESSAGE: &str = "Welcome to the PDF customization service!";

const FILE_FIELD: &str = "pdf_file";
const ORIENTATION_FIELD: &str = "orientation";
const COPIES_FIELD: &str = "copies";

#[derive(OpenApi)]
#[openapi(
    paths(home, customize_pdf, get_pdf),
    components(schemas(CustomizeResponse, ErrorDetail, WelcomeResponse, CustomizeUpload)),
    info(
        title = "PDF Customizer",
        description = "Rotate and duplicate the pages of uploaded PDF documents."
    )
)]
pub struct ApiDoc;

/// Multipart form accepted by `POST /customize-pdf/`.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct CustomizeUpload {
    /// The source PDF document.
    #[schema(value_type = String, format = Binary)]
    pdf_file: Vec<u8>,
    /// `landscape` rotates every page by 90 degrees; any other value keeps the source rotation.
    #[schema(default = "portrait")]
    orientation: Option<String>,
    /// Number of times the full page sequence is repeated.
    #[schema(default = 1, minimum = 1)]
    copies: Option<u32>,
}

/// Error response rendered as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiRejection {
    status: StatusCode,
    detail: String,
}

impl ApiRejection {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn from_multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            warn!("upload rejected: {}", err.body_text());
            Self::new(StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE_DETAIL)
        } else {
            warn!("malformed multipart body: {}", err.body_text());
            Self::new(StatusCode::BAD_REQUEST, err.body_text())
        }
    }
}

impl From<AppError> for ApiRejection {
    fn from(err: AppError) -> Self {
        match err.category {
            ErrorCategory::NotFound => {
                warn!("lookup missed: {}", err);
                Self::new(StatusCode::NOT_FOUND, NOT_FOUND_DETAIL)
            }
            ErrorCategory::ValidationError => {
                warn!("request rejected: {}", err);
                Self::unprocessable(err.message)
            }
            _ => {
                error!("request failed: {}", err);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.message)
            }
        }
    }
}

impl IntoResponse for ApiRejection {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorDetail::new(self.detail))).into_response()
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is up", body = WelcomeResponse))
)]
pub async fn home() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/customize-pdf/",
    request_body(content = CustomizeUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document customized and stored", body = CustomizeResponse),
        (status = 400, description = "Body is not valid multipart data", body = ErrorDetail),
        (status = 413, description = "Upload exceeds the configured size limit", body = ErrorDetail),
        (status = 422, description = "Missing or invalid form fields", body = ErrorDetail),
        (status = 500, description = "Transform or storage failure", body = ErrorDetail)
    )
)]
pub async fn customize_pdf(
    Extension(service): Extension<Arc<PdfService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CustomizeResponse>, ApiRejection> {
    let multipart = multipart.map_err(|rejection| {
        warn!("request is not multipart: {}", rejection.body_text());
        ApiRejection::new(rejection.status(), rejection.body_text())
    })?;
    let form = CustomizeForm::read(multipart).await?;
    let request = form.transform_request()?;
    let upload = form
        .upload
        .ok_or_else(|| ApiRejection::unprocessable(format!("{} is required", FILE_FIELD)))?;

    info!(
        upload = %upload.file_name,
        bytes = upload.bytes.len(),
        orientation = %request.orientation,
        copies = request.copies,
        "customization requested"
    );
    let response = service
        .submit(&upload.file_name, &upload.bytes, request)
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/get-pdf/{file_id}",
    params(("file_id" = String, Path, description = "Identifier returned by /customize-pdf/")),
    responses(
        (status = 200, description = "The customized document", content_type = "application/pdf"),
        (status = 404, description = "Unknown identifier", body = ErrorDetail),
        (status = 500, description = "Stored file could not be read", body = ErrorDetail)
    )
)]
pub async fn get_pdf(
    Extension(service): Extension<Arc<PdfService>>,
    Path(file_id): Path<String>,
) -> Result<Response, ApiRejection> {
    let document = service.fetch(&file_id).await?;
    info!(
        file_id = %file_id,
        bytes = document.len,
        "serving {}",
        document.record.file_name
    );
    let body = Body::from_stream(ReaderStream::new(document.file));
    Ok(pdf_response(&document.record.file_name, document.len, body))
}

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

struct UploadedFile {
    file_name: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct CustomizeForm {
    upload: Option<UploadedFile>,
    orientation: Option<String>,
    copies: Option<String>,
}

impl CustomizeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiRejection> {
        let mut form = CustomizeForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(ApiRejection::from_multipart)?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                FILE_FIELD => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(ApiRejection::from_multipart)?;
                    form.upload = Some(UploadedFile {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
                ORIENTATION_FIELD => {
                    form.orientation =
                        Some(field.text().await.map_err(ApiRejection::from_multipart)?);
                }
                COPIES_FIELD => {
                    form.copies = Some(field.text().await.map_err(ApiRejection::from_multipart)?);
                }
                _ => {
                    // Unknown fields are drained and ignored.
                    field.bytes().await.map_err(ApiRejection::from_multipart)?;
                }
            }
        }
        Ok(form)
    }

    fn transform_request(&self) -> Result<TransformRequest, ApiRejection> {
        let orientation = self
            .orientation
            .as_deref()
            .map(Orientation::from_form_value)
            .unwrap_or_default();
        let copies = match self.copies.as_deref() {
            None => 1,
            Some(raw) => parse_copies(raw)?,
        };
        Ok(TransformRequest {
            orientation,
            copies,
        })
    }
}

fn parse_copies(raw: &str) -> Result<u32, ApiRejection> {
    raw.trim().parse::<u32>().map_err(|_| {
        ApiRejection::unprocessable(format!(
            "{} must be a non-negative integer, got '{}'",
            COPIES_FIELD, raw
        ))
    })
}

fn pdf_response(file_name: &str, len: u64, body: Body) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_LENGTH, HeaderValue::from(len)),
            (header::CONTENT_DISPOSITION, content_disposition(file_name)),
        ],
        body,
    )
        .into_response()
}

/// `attachment` disposition with an ASCII fallback name and an RFC 5987 encoded name.
fn content_disposition(file_name: &str) -> HeaderValue {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, NON_ALPHANUMERIC);
    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
