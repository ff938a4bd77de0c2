use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;

pub const CONFIG_FILE_NAME: &str = "promise-pipeline.toml";

/// Pipeline configuration loaded from promise-pipeline.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub pipeline: RunConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Locations provided by the platform container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Staged resource document; `-` reads standard input
    #[serde(default = "default_input")]
    pub input: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Forces the kind regardless of the document's `kind`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Used when the document carries no `kind`
    #[serde(default = "default_kind")]
    pub default_kind: String,

    /// Extra catalog files registered after the built-in kinds
    #[serde(default)]
    pub catalogs: Vec<PathBuf>,

    #[serde(default = "default_write_status")]
    pub write_status: bool,
}

fn default_input() -> PathBuf {
    PathBuf::from("/kratix/input/object.yaml")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("/kratix/output")
}

fn default_metadata_dir() -> PathBuf {
    PathBuf::from("/kratix/metadata")
}

fn default_kind() -> String {
    "Team".to_string()
}

fn default_write_status() -> bool {
    true
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            input: default_input(),
            output_dir: default_output_dir(),
            metadata_dir: default_metadata_dir(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            kind: None,
            default_kind: default_kind(),
            catalogs: Vec::new(),
            write_status: default_write_status(),
        }
    }
}

impl PipelineConfig {
    /// Kind for a document: forced kind, then the document's own, then the default.
    pub fn select_kind<'a>(&'a self, document_kind: Option<&'a str>) -> &'a str {
        self.pipeline
            .kind
            .as_deref()
            .or(document_kind)
            .unwrap_or(&self.pipeline.default_kind)
    }
}
