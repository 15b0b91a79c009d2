pub mod config;
pub mod error;
pub mod service;
pub mod storage;
pub mod transform;
pub mod types;

pub use config::{ConfigLoader, ConfigValidator, ServiceConfig};
pub use error::AppError;
pub use service::{PdfService, RetrievedDocument, ServiceLimits};
pub use storage::DocumentStorage;
pub use transform::{Orientation, TransformError, TransformRequest};
pub use types::*;
