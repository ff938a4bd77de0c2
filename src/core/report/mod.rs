#![allow(clippy::result_large_err)]

use crate::core::error::{AppError, PipelineError};
use crate::core::types::{ErrorCategory, OutcomeStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What happened to one artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactResult {
    Written {
        path: PathBuf,
        size_bytes: u64,
        sha256: String,
    },
    Failed(PipelineError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactOutcome {
    pub artifact: String,
    pub result: ArtifactResult,
}

impl ArtifactOutcome {
    pub fn status(&self) -> OutcomeStatus {
        match self.result {
            ArtifactResult::Written { .. } => OutcomeStatus::Ok,
            ArtifactResult::Failed(_) => OutcomeStatus::Failed,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.result {
            ArtifactResult::Written { path, .. } => Some(path),
            ArtifactResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match &self.result {
            ArtifactResult::Failed(err) => Some(err),
            ArtifactResult::Written { .. } => None,
        }
    }

    /// One line for the diagnostic stream.
    pub fn diagnostic_line(&self) -> String {
        match &self.result {
            ArtifactResult::Written { path, .. } => {
                format!("{} {} {}", self.artifact, self.status(), path.display())
            }
            ArtifactResult::Failed(err) => format!(
                "{} {} [{}] {}",
                self.artifact,
                self.status(),
                err.code(),
                err
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Ordered per-artifact outcomes of one invocation.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub kind: String,
    pub catalog_version: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<ArtifactOutcome>,
}

impl RunReport {
    pub fn new(kind: &str, catalog_version: &str) -> Self {
        RunReport {
            run_id: Uuid::new_v4(),
            kind: kind.to_string(),
            catalog_version: catalog_version.to_string(),
            started_at: Utc::now(),
            completed_at: None,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, artifact: &str, result: ArtifactResult) {
        self.outcomes.push(ArtifactOutcome {
            artifact: artifact.to_string(),
            result,
        });
    }

    pub fn finish(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status() == OutcomeStatus::Failed)
    }

    pub fn written_paths(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(ArtifactOutcome::path)
    }

    pub fn outcome(&self, artifact: &str) -> Option<&ArtifactOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.artifact == artifact)
    }

    pub fn summary(&self) -> String {
        let written = self.written_paths().count();
        format!(
            "generated {} of {} artifacts for {}",
            written,
            self.outcomes.len(),
            self.kind
        )
    }

    pub fn diagnostic_lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .map(ArtifactOutcome::diagnostic_line)
            .collect()
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, AppError> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => self.render_json(),
        }
    }

    fn render_text(&self) -> String {
        let mut text = format!(
            "run {} kind={} catalog={}\n",
            self.run_id, self.kind, self.catalog_version
        );
        for line in self.diagnostic_lines() {
            text.push_str("  ");
            text.push_str(&line);
            text.push('\n');
        }
        text.push_str(&self.summary());
        text.push('\n');
        text
    }

    fn render_json(&self) -> Result<String, AppError> {
        let record = ReportRecord {
            run_id: self.run_id,
            kind: &self.kind,
            catalog_version: &self.catalog_version,
            started_at: self.started_at,
            completed_at: self.completed_at,
            succeeded: !self.has_failures(),
            outcomes: self.outcomes.iter().map(OutcomeRecord::from).collect(),
        };
        serde_json::to_string_pretty(&record).map_err(|e| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("Failed to generate JSON report: {}", e),
            )
            .with_code("REPORT-JSON-001")
        })
    }
}

#[derive(Serialize)]
struct ReportRecord<'a> {
    run_id: Uuid,
    kind: &'a str,
    catalog_version: &'a str,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    succeeded: bool,
    outcomes: Vec<OutcomeRecord<'a>>,
}

#[derive(Serialize)]
struct OutcomeRecord<'a> {
    artifact: &'a str,
    status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha256: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorRecord>,
}

#[derive(Serialize)]
struct ErrorRecord {
    kind: &'static str,
    code: &'static str,
    message: String,
}

impl<'a> From<&'a ArtifactOutcome> for OutcomeRecord<'a> {
    fn from(outcome: &'a ArtifactOutcome) -> Self {
        let mut record = OutcomeRecord {
            artifact: &outcome.artifact,
            status: outcome.status(),
            path: None,
            size_bytes: None,
            sha256: None,
            error: None,
        };
        match &outcome.result {
            ArtifactResult::Written {
                path,
                size_bytes,
                sha256,
            } => {
                record.path = Some(path);
                record.size_bytes = Some(*size_bytes);
                record.sha256 = Some(sha256);
            }
            ArtifactResult::Failed(err) => {
                record.error = Some(ErrorRecord {
                    kind: err.kind(),
                    code: err.code(),
                    message: err.to_string(),
                });
            }
        }
        record
    }
}
