//! Drives every artifact of a kind through extraction, rendering and the sink.

use crate::core::catalog::{ArtifactSpec, Catalog};
use crate::core::document::Document;
use crate::core::error::PipelineError;
use crate::core::extract::resolve_bindings;
use crate::core::report::{ArtifactResult, RunReport};
use crate::core::sink::{relative_output_path, OutputSink};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::PathBuf;

/// Runs the catalog entries for one kind against one document.
///
/// Each artifact succeeds or fails on its own; a failure is recorded in the
/// report and the runner moves on to the next artifact.
pub struct PipelineRunner<'a> {
    catalog: &'a Catalog,
    sink: &'a dyn OutputSink,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(catalog: &'a Catalog, sink: &'a dyn OutputSink) -> Self {
        PipelineRunner { catalog, sink }
    }

    pub fn run(&self, document: &Document, kind: &str) -> RunReport {
        let mut report = RunReport::new(kind, self.catalog.version());
        let span = tracing::info_span!(
            "pipeline_run",
            run_id = %report.run_id,
            kind = %kind,
            resource = document.resource_name().unwrap_or("<unnamed>")
        );
        let _enter = span.enter();

        let specs = self.catalog.artifacts_for(kind);
        tracing::debug!(artifacts = specs.len(), "starting run");

        let mut claimed = HashSet::new();
        for spec in specs {
            let artifact_span = tracing::info_span!("artifact", name = %spec.name());
            let _artifact = artifact_span.enter();

            let result = match self.produce(document, spec, &mut claimed) {
                Ok(written) => {
                    if let ArtifactResult::Written {
                        path, size_bytes, ..
                    } = &written
                    {
                        tracing::info!(path = %path.display(), size_bytes, "artifact written");
                    }
                    written
                }
                Err(err) => {
                    tracing::warn!(code = err.code(), error = %err, "artifact failed");
                    ArtifactResult::Failed(err)
                }
            };
            report.record(spec.name(), result);
        }

        report.finish();
        tracing::info!(
            failures = report.failures().count(),
            "{}",
            report.summary()
        );
        report
    }

    fn produce(
        &self,
        document: &Document,
        spec: &ArtifactSpec,
        claimed: &mut HashSet<PathBuf>,
    ) -> Result<ArtifactResult, PipelineError> {
        let fields = resolve_bindings(document, spec.bindings())?;
        let bytes = self
            .catalog
            .templates()
            .render(spec.template_id(), &fields)?;

        let raw_path = spec
            .output_path()
            .render(&format!("{} output path", spec.name()), &fields)?;
        let path = relative_output_path(&raw_path)?;
        if !claimed.insert(path.clone()) {
            return Err(PipelineError::InvalidOutputPath {
                path: raw_path,
                reason: "already written by an earlier artifact in this run".to_string(),
            });
        }

        self.sink.write(&path, &bytes)?;
        Ok(ArtifactResult::Written {
            path,
            size_bytes: bytes.len() as u64,
            sha256: hex::encode(Sha256::digest(&bytes)),
        })
    }
}
