use crate::core::transform::TransformError;
use crate::core::types::{ErrorCategory, ErrorSeverity};
use chrono::{DateTime, Utc};
use pdf_customizer_backend::RegistryError;
use std::collections::HashMap;

#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub code: String,
    pub message: String,
    pub context: HashMap<String, String>,
    pub occurred_at: DateTime<Utc>,
    pub source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        let severity = match category {
            ErrorCategory::ValidationError
            | ErrorCategory::IoError
            | ErrorCategory::TransformError
            | ErrorCategory::StorageError
            | ErrorCategory::ConfigError
            | ErrorCategory::InternalError => ErrorSeverity::Error,
            ErrorCategory::NotFound => ErrorSeverity::Warning,
        };
        AppError {
            category,
            severity,
            code: format!("ERR-{}", uuid::Uuid::new_v4()),
            message: message.into(),
            context: HashMap::new(),
            occurred_at: Utc::now(),
            source: None,
        }
    }

    pub fn with_source<T: Into<String>>(
        category: ErrorCategory,
        message: T,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        let mut error = AppError::new(category, message);
        error.source = Some(source.into());
        error
    }

    pub fn with_context<T: Into<String>>(mut self, context: T) -> Self {
        self.context.insert("context".to_string(), context.into());
        self
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }

    pub fn add_context(&mut self, key: &str, value: &str) {
        self.context.insert(key.to_string(), value.to_string());
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }

    pub fn is_not_found(&self) -> bool {
        self.category == ErrorCategory::NotFound
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if !self.context.is_empty() {
            write!(f, " (Context: {:?})", self.context)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn std::error::Error + 'static))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError {
            message: e.to_string(),
            source: Some(e),
            ..AppError::new(ErrorCategory::InternalError, String::new())
        }
        .with_code("ANYHOW_ERROR")
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::with_source(ErrorCategory::IoError, e.to_string(), e).with_code("IO_ERROR")
    }
}

impl From<TransformError> for AppError {
    fn from(e: TransformError) -> Self {
        AppError::with_source(ErrorCategory::TransformError, e.to_string(), e)
            .with_code("TRANSFORM_ERROR")
    }
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        AppError::with_source(ErrorCategory::StorageError, e.to_string(), e)
            .with_code("REGISTRY_ERROR")
    }
}
