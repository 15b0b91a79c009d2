pub mod args;
pub mod commands;

pub use args::{OrientationArg, ServeArgs, TransformArgs};
use crate::core::config::DEFAULT_CONFIG_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "pdf-customizer")]
#[command(version = crate::VERSION)]
#[command(about = "Rotate and duplicate PDF pages over HTTP")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: start the service, POST a PDF to /customize-pdf/, then download it from /get-pdf/<file_id>."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Run the HTTP service",
        long_about = "Serve loads pdf-customizer.toml (or --config), applies environment and flag overrides, opens the document registry, and listens for customization requests.",
        after_help = "Example:\n    pdf-customizer serve --port 8000 --storage-dir ./generated_pdfs"
    )]
    Serve(ServeArgs),
    #[command(
        about = "Customize a local PDF file",
        long_about = "Transform applies the same rotation and duplication as the service to a file on disk, without touching the registry.",
        after_help = "Example:\n    pdf-customizer transform report.pdf --orientation landscape --copies 2"
    )]
    Transform(TransformArgs),
}

impl Command {
    /// Config file whose `[logging]` table applies to this command, if any.
    pub fn config_path(&self) -> Option<PathBuf> {
        let explicit = match self {
            Command::Serve(args) => args.config.clone(),
            Command::Transform(_) => None,
        };
        explicit.or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        })
    }
}

pub async fn run(args: Args) -> crate::Result<()> {
    match args.command {
        Command::Serve(serve_args) => commands::serve(serve_args).await,
        Command::Transform(transform_args) => commands::transform(transform_args).await,
    }
}
