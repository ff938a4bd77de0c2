use crate::core::types::ErrorCategory;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Failures raised while turning one input resource into its artifacts.
///
/// Every variant except [`PipelineError::InputUnavailable`] is scoped to a single
/// artifact and ends up as a failed outcome in the run report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("missing field '{path}'")]
    MissingField { path: String },

    #[error("field '{path}' value '{value}' does not match pattern {pattern}")]
    InvalidField {
        path: String,
        value: String,
        pattern: String,
    },

    #[error("template '{template}' has no value for placeholder '{name}' (unresolved: {})", unresolved.join(", "))]
    UnresolvedPlaceholder {
        template: String,
        name: String,
        unresolved: Vec<String>,
    },

    #[error("failed to render template '{template}': {message}")]
    Render { template: String, message: String },

    #[error("invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: String, reason: String },

    #[error("failed to write '{}': {cause}", path.display())]
    Io { path: PathBuf, cause: String },

    #[error("input unavailable at {location}: {reason}")]
    InputUnavailable { location: String, reason: String },
}

impl PipelineError {
    /// Taxonomy name used in diagnostics and JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::MissingField { .. } => "MissingField",
            PipelineError::InvalidField { .. } => "InvalidField",
            PipelineError::UnresolvedPlaceholder { .. } => "UnresolvedPlaceholder",
            PipelineError::Render { .. } => "RenderError",
            PipelineError::InvalidOutputPath { .. } => "InvalidOutputPath",
            PipelineError::Io { .. } => "IOError",
            PipelineError::InputUnavailable { .. } => "InputUnavailable",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::MissingField { .. } => "PIPE-EXT-001",
            PipelineError::InvalidField { .. } => "PIPE-EXT-002",
            PipelineError::UnresolvedPlaceholder { .. } => "PIPE-TPL-001",
            PipelineError::Render { .. } => "PIPE-TPL-002",
            PipelineError::InvalidOutputPath { .. } => "PIPE-TPL-003",
            PipelineError::Io { .. } => "PIPE-IO-001",
            PipelineError::InputUnavailable { .. } => "PIPE-IN-001",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::MissingField { .. } | PipelineError::InvalidField { .. } => {
                ErrorCategory::ExtractionError
            }
            PipelineError::UnresolvedPlaceholder { .. }
            | PipelineError::Render { .. }
            | PipelineError::InvalidOutputPath { .. } => ErrorCategory::RenderError,
            PipelineError::Io { .. } => ErrorCategory::IoError,
            PipelineError::InputUnavailable { .. } => ErrorCategory::InputError,
        }
    }

    /// Only a missing input document aborts a whole invocation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::InputUnavailable { .. })
    }
}

/// Structured diagnostic used for configuration and catalog registration failures.
#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
    pub context: BTreeMap<String, String>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        AppError {
            category,
            code: format!("ERR-{}", uuid::Uuid::new_v4()),
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    pub fn with_context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if !self.context.is_empty() {
            write!(f, " (Context: {:?})", self.context)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        AppError::new(e.category(), e.to_string()).with_code(e.code())
    }
}
