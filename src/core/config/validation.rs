#![allow(clippy::result_large_err)]

use super::ServiceConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &ServiceConfig) -> Result<(), AppError> {
        if config.server.bind.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "server.bind cannot be empty",
            ));
        }

        if config.server.port == 0 {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "server.port must be greater than 0",
            ));
        }

        if config.server.max_upload_bytes == 0 {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "server.max_upload_bytes must be greater than 0",
            ));
        }

        if config.storage.dir.as_os_str().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "storage.dir cannot be empty",
            ));
        }

        if config.database.url.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "database.url cannot be empty",
            ));
        }

        if config.transform.max_copies < 1 {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "transform.max_copies must be at least 1",
            ));
        }

        Ok(())
    }
}
