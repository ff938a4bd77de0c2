#![allow(clippy::result_large_err)]

use super::{PipelineConfig, CONFIG_FILE_NAME};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `promise-pipeline.toml` from `dir` when present, then apply environment overrides.
    pub fn load_from_dir(dir: &Path) -> Result<PipelineConfig, AppError> {
        let config_file = Self::load_from_file(&dir.join(CONFIG_FILE_NAME))?;
        let mut config = config_file.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load an explicitly named config file; unlike the implicit one it must exist.
    pub fn load_explicit(path: &Path) -> Result<PipelineConfig, AppError> {
        let mut config = Self::load_from_file(path)?.ok_or_else(|| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Config file {} does not exist", path.display()),
            )
            .with_code("CONFIG-001")
        })?;
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Returns Ok(None) if the file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<PipelineConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
            .with_code("CONFIG-002")
        })?;

        let config: PipelineConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("CONFIG-003")
        })?;

        Ok(Some(config))
    }

    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut PipelineConfig) {
        if let Ok(input) = env::var("PROMISE_INPUT") {
            config.paths.input = PathBuf::from(input);
        }

        if let Ok(output_dir) = env::var("PROMISE_OUTPUT_DIR") {
            config.paths.output_dir = PathBuf::from(output_dir);
        }

        if let Ok(metadata_dir) = env::var("PROMISE_METADATA_DIR") {
            config.paths.metadata_dir = PathBuf::from(metadata_dir);
        }

        if let Ok(kind) = env::var("PROMISE_KIND") {
            if !kind.trim().is_empty() {
                config.pipeline.kind = Some(kind);
            }
        }

        if let Ok(catalogs) = env::var("PROMISE_CATALOGS") {
            config.pipeline.catalogs = env::split_paths(&catalogs).collect();
        }

        if let Ok(write_status_str) = env::var("PROMISE_WRITE_STATUS") {
            if let Ok(write_status) = write_status_str.parse::<bool>() {
                config.pipeline.write_status = write_status;
            }
        }

        config.logging.apply_env_overrides();
    }

    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "PROMISE_INPUT - Override the input document path, '-' for stdin (default: /kratix/input/object.yaml)",
            "PROMISE_OUTPUT_DIR - Override the output directory (default: /kratix/output)",
            "PROMISE_METADATA_DIR - Override the metadata directory (default: /kratix/metadata)",
            "PROMISE_KIND - Force the resource kind instead of reading it from the document",
            "PROMISE_CATALOGS - Extra catalog files, separated like PATH",
            "PROMISE_WRITE_STATUS - Write status.yaml to the metadata directory (true/false, default: true)",
            "PROMISE_LOG_LEVEL - Override the log level (default: info; RUST_LOG wins when set)",
            "PROMISE_LOG_DIR - Write logs to promise-pipeline.log in this directory",
            "PROMISE_LOG_CONSOLE - Console log sink (stdout/stderr/none, default: stderr)",
        ]
    }
}
