//! Resource status written back to the platform's metadata directory.

use crate::core::error::PipelineError;
use crate::core::report::RunReport;
use crate::core::sink::OutputSink;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const STATUS_FILE: &str = "status.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub message: String,
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

impl ResourceStatus {
    /// Summarize a run; contains no timestamps so reruns produce the same file.
    pub fn from_report(report: &RunReport, resource: Option<&str>) -> Self {
        let outputs: Vec<String> = report
            .written_paths()
            .map(|path| path.to_string_lossy().replace('\\', "/"))
            .collect();
        let failed: Vec<String> = report
            .failures()
            .map(|outcome| outcome.artifact.clone())
            .collect();

        let subject = match resource {
            Some(name) => format!("{} {}", report.kind, name),
            None => report.kind.clone(),
        };
        let mut message = format!(
            "Generated {}/{} artifacts for {}",
            outputs.len(),
            report.outcomes.len(),
            subject
        );
        if !failed.is_empty() {
            message.push_str(&format!("; failed: {}", failed.join(", ")));
        }

        ResourceStatus {
            message,
            outputs,
            failed,
        }
    }

    pub fn write(&self, sink: &dyn OutputSink) -> Result<(), PipelineError> {
        let yaml = serde_yaml::to_string(self).map_err(|e| PipelineError::Io {
            path: STATUS_FILE.into(),
            cause: format!("could not serialize status: {}", e),
        })?;
        sink.write(Path::new(STATUS_FILE), yaml.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::ArtifactResult;
    use crate::core::sink::DirectorySink;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn report() -> RunReport {
        let mut report = RunReport::new("Team", "v1");
        report.record(
            "backstage-group",
            ArtifactResult::Written {
                path: PathBuf::from("backstage-team-acme.yaml"),
                size_bytes: 10,
                sha256: String::new(),
            },
        );
        report.record(
            "terraform-org",
            ArtifactResult::Failed(PipelineError::MissingField {
                path: "spec.name".to_string(),
            }),
        );
        report
    }

    #[test]
    fn message_lists_failed_artifacts() {
        let status = ResourceStatus::from_report(&report(), Some("team-acme"));
        assert_eq!(
            status.message,
            "Generated 1/2 artifacts for Team team-acme; failed: terraform-org"
        );
        assert_eq!(status.outputs, vec!["backstage-team-acme.yaml".to_string()]);
        assert_eq!(status.failed, vec!["terraform-org".to_string()]);
    }

    #[test]
    fn writes_status_yaml_into_metadata_dir() {
        let dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(dir.path().to_path_buf());
        let status = ResourceStatus::from_report(&report(), None);
        status.write(&sink).unwrap();

        let text = std::fs::read_to_string(dir.path().join(STATUS_FILE)).unwrap();
        let parsed: ResourceStatus = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed, status);
        assert!(text.starts_with("message: "));
        assert!(text.contains("outputs:\n- backstage-team-acme.yaml\n"));
    }
}
