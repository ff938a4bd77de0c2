#![allow(clippy::result_large_err)]

use super::PipelineConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &PipelineConfig) -> Result<(), AppError> {
        for (name, path) in [
            ("paths.input", &config.paths.input),
            ("paths.output_dir", &config.paths.output_dir),
            ("paths.metadata_dir", &config.paths.metadata_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(invalid(format!("{} cannot be empty", name)));
            }
        }

        if config.pipeline.default_kind.trim().is_empty() {
            return Err(invalid("pipeline.default_kind cannot be empty"));
        }

        if config.pipeline.catalogs.iter().any(|p| p.as_os_str().is_empty()) {
            return Err(invalid("pipeline.catalogs cannot contain empty paths"));
        }

        config
            .logging
            .validate()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(())
    }
}

fn invalid<T: Into<String>>(message: T) -> AppError {
    AppError::new(ErrorCategory::ValidationError, message).with_code("CONFIG-010")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_is_valid() {
        assert!(ConfigValidator::validate(&PipelineConfig::default()).is_ok());
    }

    #[test]
    fn empty_output_dir_is_rejected() {
        let mut config = PipelineConfig::default();
        config.paths.output_dir = PathBuf::new();
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("paths.output_dir"));
    }

    #[test]
    fn blank_default_kind_is_rejected() {
        let mut config = PipelineConfig::default();
        config.pipeline.default_kind = "  ".to_string();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut config = PipelineConfig::default();
        config.logging.default_level = "info=[".to_string();
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(err.code, "CONFIG-010");
    }
}
