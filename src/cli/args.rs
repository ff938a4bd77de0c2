use crate::core::report::OutputFormat;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Where configuration and extra catalog files come from.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file (default: ./promise-pipeline.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Additional catalog file; may be repeated
    #[arg(long = "catalog", value_name = "FILE")]
    pub catalogs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Resource document to read, or '-' for stdin (default: /kratix/input/object.yaml)
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Directory receiving rendered artifacts (default: /kratix/output)
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory receiving status.yaml (default: /kratix/metadata)
    #[arg(long, value_name = "DIR")]
    pub metadata_dir: Option<PathBuf>,

    /// Resource kind to render, overriding the document's kind
    #[arg(long, value_name = "KIND")]
    pub kind: Option<String>,

    /// Skip writing status.yaml
    #[arg(long)]
    pub no_status: bool,

    /// Print the run report to stdout in this format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub report_format: Option<ReportFormat>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Only list this kind
    #[arg(long, value_name = "KIND")]
    pub kind: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Text => OutputFormat::Text,
            ReportFormat::Json => OutputFormat::Json,
        }
    }
}
