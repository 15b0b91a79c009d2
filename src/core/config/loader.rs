#![allow(clippy::result_large_err)]

use super::{ServiceConfig, DEFAULT_CONFIG_FILE};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the service configuration.
    ///
    /// An explicit path must exist. Without one, `pdf-customizer.toml` in the working directory
    /// is used when present. Environment variables override file values.
    pub fn load(explicit: Option<&Path>) -> Result<ServiceConfig, AppError> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?.ok_or_else(|| {
                AppError::new(
                    ErrorCategory::ConfigError,
                    format!("Config file {} does not exist", path.display()),
                )
            })?,
            None => Self::load_from_file(Path::new(DEFAULT_CONFIG_FILE))?.unwrap_or_default(),
        };

        Self::apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<ServiceConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: ServiceConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut ServiceConfig) {
        // Server overrides
        if let Ok(bind) = env::var("PDF_CUSTOMIZER_BIND") {
            config.server.bind = bind;
        }

        // PORT is honoured for hosting platforms; the prefixed variable wins when both are set
        for key in ["PORT", "PDF_CUSTOMIZER_PORT"] {
            if let Ok(port_str) = env::var(key) {
                if let Ok(port) = port_str.trim().parse::<u16>() {
                    config.server.port = port;
                }
            }
        }

        if let Ok(max_upload_str) = env::var("PDF_CUSTOMIZER_MAX_UPLOAD_BYTES") {
            if let Ok(max_upload) = max_upload_str.trim().parse::<usize>() {
                config.server.max_upload_bytes = max_upload;
            }
        }

        // Storage overrides
        if let Ok(dir) = env::var("PDF_CUSTOMIZER_STORAGE_DIR") {
            config.storage.dir = PathBuf::from(dir);
        }

        // Database overrides
        if let Ok(url) = env::var("DATABASE_URL") {
            config.database.url = url;
        }

        // Transform overrides
        if let Ok(max_copies_str) = env::var("PDF_CUSTOMIZER_MAX_COPIES") {
            if let Ok(max_copies) = max_copies_str.trim().parse::<u32>() {
                config.transform.max_copies = max_copies;
            }
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "PDF_CUSTOMIZER_BIND - Override the listener address (default: 0.0.0.0)",
            "PORT - Override the listener port (default: 8000)",
            "PDF_CUSTOMIZER_PORT - Override the listener port, taking precedence over PORT",
            "PDF_CUSTOMIZER_MAX_UPLOAD_BYTES - Override the request body limit (default: 26214400)",
            "PDF_CUSTOMIZER_STORAGE_DIR - Override the document storage directory (default: generated_pdfs)",
            "DATABASE_URL - Override the registry database URL (default: sqlite://generated_pdfs/pdf_files.db)",
            "PDF_CUSTOMIZER_MAX_COPIES - Override the maximum copies per request (default: 100)",
        ]
    }
}
