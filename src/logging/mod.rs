pub mod config;
pub mod context;
pub mod layers;

pub use context::{detect_context, ExecutionContext};
pub use layers::console::ConsoleOutput;

use crate::logging::config::LoggingConfig;
use crate::logging::layers::{console, file};
use crate::{cli::Command, Result};
use anyhow::{anyhow, Context};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;

static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Guards that keep logging sinks active for the duration of the command.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    console_output: ConsoleOutput,
    log_file_path: PathBuf,
}

impl LoggingGuard {
    /// Returns the console output configuration used during initialization.
    pub fn console_output(&self) -> ConsoleOutput {
        self.console_output
    }

    /// Returns the base path of the file sink. Daily rotation appends a date suffix.
    pub fn log_file_path(&self) -> &Path {
        &self.log_file_path
    }
}

/// Initialize the logging framework for the provided CLI command.
///
/// Settings come from the `[logging]` table of the service config file, with `RUST_LOG`
/// taking precedence for the level filter. Errors when invoked more than once per process.
pub fn init(command: &Command) -> Result<LoggingGuard> {
    if LOGGER_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(anyhow!("logging already initialized"));
    }

    let context = detect_context(command);
    let config_file = command.config_path();
    let anchor = resolve_anchor(config_file.as_deref());
    let config = LoggingConfig::load(config_file.as_deref())?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_level))
        .context("failed to configure tracing level")?;
    let log_file_path = file::log_file_path(&config, anchor.as_deref())?;
    type FileSubscriber = file::FileLayerStack<Registry>;

    let (file_layer, file_guard) = file::file_layer::<Registry>(
        &log_file_path,
        config.enable_file,
        file::rotation_for(context),
    )?;

    let console_output = console::select_console_output(context, config.console_output);
    let console_layer = console::console_layer::<FileSubscriber>(console_output);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(env_filter)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
        console_output,
        log_file_path,
    })
}

/// Directory that relative log locations are resolved against: the config file's directory,
/// or the working directory when no config file is in use.
fn resolve_anchor(config_file: Option<&Path>) -> Option<PathBuf> {
    config_file
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| env::current_dir().ok())
}
