use pdf_customizer::core::error::AppError;
use pdf_customizer::core::transform::TransformError;
use pdf_customizer::core::types::{ErrorCategory, ErrorSeverity};
use pdf_customizer_backend::RegistryError;
use std::error::Error;

#[test]
fn test_error_creation_all_categories() {
    let categories = vec![
        ErrorCategory::ValidationError,
        ErrorCategory::IoError,
        ErrorCategory::TransformError,
        ErrorCategory::StorageError,
        ErrorCategory::NotFound,
        ErrorCategory::ConfigError,
        ErrorCategory::InternalError,
    ];

    for category in categories {
        let error = AppError::new(category, "test message");
        assert_eq!(error.category, category);
        assert_eq!(error.message, "test message");
        assert!(error.context.is_empty());
        assert!(error.occurred_at <= chrono::Utc::now());
        assert!(error.source.is_none());
    }
}

#[test]
fn test_error_severity_mapping() {
    let test_cases = vec![
        (ErrorCategory::ValidationError, ErrorSeverity::Error),
        (ErrorCategory::IoError, ErrorSeverity::Error),
        (ErrorCategory::TransformError, ErrorSeverity::Error),
        (ErrorCategory::StorageError, ErrorSeverity::Error),
        (ErrorCategory::ConfigError, ErrorSeverity::Error),
        (ErrorCategory::InternalError, ErrorSeverity::Error),
        (ErrorCategory::NotFound, ErrorSeverity::Warning),
    ];

    for (category, expected_severity) in test_cases {
        let error = AppError::new(category, "test");
        assert_eq!(error.severity(), expected_severity);
    }
}

#[test]
fn test_error_add_context() {
    let mut error = AppError::new(ErrorCategory::TransformError, "transform failed");

    error.add_context("file_id", "0b6c");
    error.add_context("copies", "3");

    assert_eq!(error.context.len(), 2);
    assert_eq!(error.context.get("copies"), Some(&"3".to_string()));
    let rendered = error.to_string();
    assert!(rendered.contains("TransformError: transform failed"));
    assert!(rendered.contains("file_id"));
}

#[test]
fn test_with_code_replaces_generated_code() {
    let error = AppError::new(ErrorCategory::ConfigError, "bad").with_code("CFG-001");
    assert_eq!(error.code, "CFG-001");
    assert!(error.to_string().starts_with("[CFG-001] ConfigError: bad"));
}

#[test]
fn test_io_error_conversion_keeps_source() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
    let error: AppError = io.into();
    assert_eq!(error.category, ErrorCategory::IoError);
    assert_eq!(error.code, "IO_ERROR");
    assert!(error.source().is_some());
}

#[test]
fn test_transform_error_conversion() {
    let error: AppError = TransformError::NoPages.into();
    assert_eq!(error.category, ErrorCategory::TransformError);
    assert_eq!(error.code, "TRANSFORM_ERROR");
    assert_eq!(error.message, TransformError::NoPages.to_string());
}

#[test]
fn test_registry_error_conversion() {
    let error: AppError = RegistryError::Duplicate("abc".to_string()).into();
    assert_eq!(error.category, ErrorCategory::StorageError);
    assert_eq!(error.code, "REGISTRY_ERROR");
    assert!(error.message.contains("abc"));
}

#[test]
fn test_anyhow_conversion_is_internal() {
    let error: AppError = anyhow::anyhow!("unexpected").into();
    assert_eq!(error.category, ErrorCategory::InternalError);
    assert_eq!(error.code, "ANYHOW_ERROR");
    assert_eq!(error.message, "unexpected");
}

#[test]
fn test_not_found_predicate() {
    assert!(AppError::new(ErrorCategory::NotFound, "PDF not found").is_not_found());
    assert!(!AppError::new(ErrorCategory::IoError, "disk").is_not_found());
}
