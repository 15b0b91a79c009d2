#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pdf-customizer.toml";

/// Service configuration loaded from pdf-customizer.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Document storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Registry database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Transform limits
    #[serde(default)]
    pub transform: TransformConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface address to bind
    #[serde(default = "default_bind")]
    pub bind: String,

    /// TCP port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

/// Document storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding derived documents and staged uploads
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

/// Registry database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

/// Transform limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Upper bound on the copies form field
    #[serde(default = "default_max_copies")]
    pub max_copies: u32,
}

// Default functions
fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("generated_pdfs")
}

fn default_database_url() -> String {
    "sqlite://generated_pdfs/pdf_files.db".to_string()
}

fn default_max_copies() -> u32 {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            dir: default_storage_dir(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            url: default_database_url(),
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        TransformConfig {
            max_copies: default_max_copies(),
        }
    }
}

impl ServiceConfig {
    /// Socket address the HTTP listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        let ip: IpAddr = self.server.bind.trim().parse().map_err(|err| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("invalid bind address {}: {}", self.server.bind, err),
            )
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
