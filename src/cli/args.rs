use crate::core::transform::Orientation;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Service configuration file (default: ./pdf-customizer.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind the listener to
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Directory holding derived documents and staged uploads
    #[arg(long, value_name = "DIR", help_heading = "Storage")]
    pub storage_dir: Option<PathBuf>,

    /// SQLite connection string for the document registry
    #[arg(long, value_name = "URL", help_heading = "Storage")]
    pub database_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Source PDF document
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Destination file (default: customized_<input name> next to the input)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Page orientation for the output
    #[arg(long, value_enum, default_value_t = OrientationArg::Portrait)]
    pub orientation: OrientationArg,

    /// Number of times the page sequence is repeated
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub copies: u32,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(value: OrientationArg) -> Self {
        match value {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}
