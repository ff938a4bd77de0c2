use crate::cli::args::{CatalogArgs, ConfigArgs, RunArgs};
use crate::core::catalog::Catalog;
use crate::core::config::{ConfigLoader, ConfigValidator, PipelineConfig};
use crate::core::input::{InputSource, ResourceReader, YamlResourceReader};
use crate::core::pipeline::PipelineRunner;
use crate::core::sink::DirectorySink;
use crate::core::status::ResourceStatus;
use crate::logging;
use crate::Result;
use anyhow::Context;
use std::process::ExitCode;

fn load_config(args: &ConfigArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_explicit(path)?,
        None => {
            let cwd = std::env::current_dir().context("failed to resolve working directory")?;
            ConfigLoader::load_from_dir(&cwd)?
        }
    };
    config.pipeline.catalogs.extend(args.catalogs.iter().cloned());
    Ok(config)
}

fn apply_run_overrides(config: &mut PipelineConfig, args: &RunArgs) {
    if let Some(input) = &args.input {
        config.paths.input = input.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.paths.output_dir = output_dir.clone();
    }
    if let Some(metadata_dir) = &args.metadata_dir {
        config.paths.metadata_dir = metadata_dir.clone();
    }
    if let Some(kind) = &args.kind {
        config.pipeline.kind = Some(kind.clone());
    }
    if args.no_status {
        config.pipeline.write_status = false;
    }
}

pub fn run(args: RunArgs) -> Result<ExitCode> {
    let mut config = load_config(&args.config)?;
    apply_run_overrides(&mut config, &args);
    ConfigValidator::validate(&config)?;
    let _logging = logging::init(&config.logging)?;

    let catalog = Catalog::with_files(&config.pipeline.catalogs)?;

    let reader = YamlResourceReader::new(InputSource::from_path(&config.paths.input));
    let document = match reader.read() {
        Ok(document) => document,
        Err(err) => {
            tracing::error!(code = err.code(), error = %err, "cannot read resource");
            eprintln!("input failed [{}] {}", err.code(), err);
            return Ok(ExitCode::FAILURE);
        }
    };

    let kind = config.select_kind(document.kind()).to_string();
    if !catalog.is_registered(&kind) {
        tracing::error!(kind = %kind, "no artifacts registered for kind");
        eprintln!(
            "catalog failed [PIPE-CAT-020] no artifacts registered for kind '{}'",
            kind
        );
        return Ok(ExitCode::FAILURE);
    }

    let sink = DirectorySink::new(config.paths.output_dir.clone());
    let report = PipelineRunner::new(&catalog, &sink).run(&document, &kind);

    for line in report.diagnostic_lines() {
        eprintln!("{}", line);
    }
    if let Some(format) = args.report_format {
        println!("{}", report.render(format.into())?.trim_end());
    }

    if config.pipeline.write_status {
        let status = ResourceStatus::from_report(&report, document.resource_name());
        let metadata = DirectorySink::new(config.paths.metadata_dir.clone());
        if let Err(err) = status.write(&metadata) {
            tracing::warn!(error = %err, "could not write resource status");
        }
    }

    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

pub fn catalog(args: CatalogArgs) -> Result<ExitCode> {
    let config = load_config(&args.config)?;
    ConfigValidator::validate(&config)?;
    let _logging = logging::init(&config.logging)?;

    let catalog = Catalog::with_files(&config.pipeline.catalogs)?;
    let kinds: Vec<&str> = match &args.kind {
        Some(kind) if catalog.is_registered(kind) => vec![kind.as_str()],
        Some(kind) => {
            eprintln!(
                "catalog failed [PIPE-CAT-020] no artifacts registered for kind '{}'",
                kind
            );
            return Ok(ExitCode::FAILURE);
        }
        None => catalog.kinds().collect(),
    };

    for kind in kinds {
        println!("{} (catalog {})", kind, catalog.version());
        for spec in catalog.artifacts_for(kind) {
            let template_kind = catalog
                .templates()
                .get(spec.template_id())
                .map(|template| template.kind())
                .unwrap_or("unknown");
            println!(
                "  {}  {} ({})  {}",
                spec.name(),
                spec.template_id(),
                template_kind,
                spec.output_path().source()
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}
