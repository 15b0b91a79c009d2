use clap::Parser;
use pdf_customizer::{cli, logging};

#[tokio::main]
async fn main() -> pdf_customizer::Result<()> {
    let args = cli::Args::parse();
    let guard = logging::init(&args.command)?;
    tracing::debug!(
        log_file = %guard.log_file_path().display(),
        console = %guard.console_output(),
        "logging initialized"
    );

    let result = cli::run(args).await;
    if let Err(err) = &result {
        tracing::error!("{:#}", err);
    }
    drop(guard);
    result
}
