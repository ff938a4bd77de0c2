pub mod args;
pub mod commands;

pub use args::{CatalogArgs, ConfigArgs, ReportFormat, RunArgs};
use clap::{Parser, Subcommand};
use std::process::ExitCode;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "promise-pipeline")]
#[command(version = crate::VERSION)]
#[command(about = "Render platform artifacts from a staged resource document")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Runs as a pipeline stage: reads the resource from /kratix/input, writes artifacts to /kratix/output and status to /kratix/metadata."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Render every artifact registered for the resource's kind",
        long_about = "Run reads the resource document, renders each catalog artifact for its kind, and writes them to the output directory. One diagnostic line per artifact is printed on stderr; the exit status is non-zero when any artifact fails.",
        after_help = "Example:\n    promise-pipeline run --input team.yaml --output-dir out --metadata-dir meta"
    )]
    Run(RunArgs),
    #[command(
        about = "List registered kinds and their artifacts",
        long_about = "Catalog prints the built-in kinds plus any loaded from catalog files, with each artifact's template and output path.",
        after_help = "Example:\n    promise-pipeline catalog --catalog service.yaml --kind Service"
    )]
    Catalog(CatalogArgs),
}

pub fn run(args: Args) -> crate::Result<ExitCode> {
    match args.command {
        Command::Run(run_args) => commands::run(run_args),
        Command::Catalog(catalog_args) => commands::catalog(catalog_args),
    }
}
