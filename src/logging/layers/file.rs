use crate::logging::config::LoggingConfig;
use crate::logging::context::ExecutionContext;
use crate::Result;
use anyhow::{anyhow, Context};
use dirs_next::home_dir;
use std::fs::create_dir_all;
use std::io;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self as tracing_fmt, format, writer::BoxMakeWriter};
use tracing_subscriber::registry::LookupSpan;

const LOG_FILE_NAME: &str = "pdf-customizer.log";
const DEFAULT_LOG_DIR: &str = ".pdf-customizer/logs";

/// Layer type produced by the file sink builder.
pub type FileFmtLayer<S> =
    tracing_fmt::Layer<S, format::DefaultFields, format::Format<format::Full>, BoxMakeWriter>;

/// Layer stack that already wraps the provided subscriber.
pub type FileLayerStack<S> = tracing_subscriber::layer::Layered<FileFmtLayer<S>, S>;

/// Determine the file used by the logging file sink.
pub fn log_file_path(config: &LoggingConfig, anchor: Option<&Path>) -> Result<PathBuf> {
    let directory = resolve_log_dir(config, anchor)?;
    Ok(directory.join(LOG_FILE_NAME))
}

/// How the file sink rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRotation {
    /// Append to a single file.
    Never,
    /// Start a new `<name>.YYYY-MM-DD` file every day.
    Daily,
}

/// The long-running service rotates daily; one-shot commands share a single file.
pub fn rotation_for(context: ExecutionContext) -> FileRotation {
    match context {
        ExecutionContext::Service => FileRotation::Daily,
        ExecutionContext::LocalDev => FileRotation::Never,
    }
}

/// Build a tracing layer backed by a non-blocking rolling appender rooted at `log_file`.
pub fn file_layer<S>(
    log_file: &Path,
    enabled: bool,
    rotation: FileRotation,
) -> Result<(FileFmtLayer<S>, Option<WorkerGuard>)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if !enabled {
        return Ok((make_layer(BoxMakeWriter::new(io::sink)), None));
    }

    let directory = log_file.parent().ok_or_else(|| {
        anyhow!(
            "log file path {} has no parent directory",
            log_file.display()
        )
    })?;
    let file_name = log_file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("log file path {} has no file name", log_file.display()))?;
    create_dir_all(directory)
        .with_context(|| format!("failed to create log directory {}", directory.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(match rotation {
            FileRotation::Never => Rotation::NEVER,
            FileRotation::Daily => Rotation::DAILY,
        })
        .filename_prefix(file_name)
        .build(directory)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((make_layer(BoxMakeWriter::new(writer)), Some(guard)))
}

fn make_layer<S>(writer: BoxMakeWriter) -> FileFmtLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
}

fn resolve_log_dir(config: &LoggingConfig, anchor: Option<&Path>) -> Result<PathBuf> {
    let base_dir = if let Some(custom) = &config.log_dir {
        if custom.is_absolute() {
            custom.clone()
        } else if let Some(anchor) = anchor {
            anchor.join(custom)
        } else {
            home_base()?.join(custom)
        }
    } else if let Some(anchor) = anchor {
        anchor.join(DEFAULT_LOG_DIR)
    } else {
        home_base()?.join(DEFAULT_LOG_DIR)
    };

    let normalized = canonicalize_or_clone(&base_dir);
    ensure_within_anchor(&normalized, anchor, &config.log_dir)?;
    Ok(normalized)
}

fn home_base() -> Result<PathBuf> {
    home_dir().ok_or_else(|| anyhow!("$HOME directory unavailable"))
}

fn canonicalize_or_clone(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn ensure_within_anchor(
    candidate: &Path,
    anchor: Option<&Path>,
    override_dir: &Option<PathBuf>,
) -> Result<()> {
    if let Some(custom) = override_dir {
        if custom.is_absolute() {
            return Ok(());
        }
        let anchor = match anchor {
            Some(anchor) => canonicalize_or_clone(anchor),
            None => canonicalize_or_clone(&home_base()?),
        };
        if !candidate.starts_with(&anchor) {
            return Err(anyhow!(
                "logging.log_dir resolves outside {}",
                anchor.display()
            ));
        }
    }
    Ok(())
}
