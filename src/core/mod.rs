pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod input;
pub mod pipeline;
pub mod report;
pub mod sink;
pub mod status;
pub mod template;
pub mod types;

pub use catalog::{ArtifactSpec, Catalog};
pub use document::{Document, Scalar, Value};
pub use error::{AppError, PipelineError};
pub use extract::{resolve, resolve_bindings, FieldBinding, FieldDefault, FieldPath, ResolvedFields};
pub use input::{InputSource, ResourceReader, YamlResourceReader};
pub use pipeline::PipelineRunner;
pub use report::{ArtifactOutcome, ArtifactResult, OutputFormat, RunReport};
pub use sink::{DirectorySink, OutputSink};
pub use status::ResourceStatus;
pub use template::{Template, TemplateRegistry};
pub use types::*;
