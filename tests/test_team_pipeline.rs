use promise_pipeline::core::catalog::Catalog;
use promise_pipeline::core::document::Document;
use promise_pipeline::core::error::PipelineError;
use promise_pipeline::core::pipeline::PipelineRunner;
use promise_pipeline::core::report::ArtifactResult;
use promise_pipeline::core::sink::{DirectorySink, OutputSink};
use promise_pipeline::core::types::OutcomeStatus;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TEAM_ACME: &str = r#"
apiVersion: platform.kratix.io/v1alpha1
kind: Team
metadata:
  name: team-acme
  namespace: default
spec:
  id: team-acme
  name: Acme
  email: acme@x.com
"#;

const TEAM_ACME_NO_EMAIL: &str = r#"
kind: Team
spec:
  id: team-acme
  name: Acme
"#;

fn run_into(dir: &Path, yaml: &str) -> promise_pipeline::core::report::RunReport {
    let catalog = Catalog::builtin().unwrap();
    let sink = DirectorySink::new(dir.to_path_buf());
    let document = Document::from_yaml_str(yaml).unwrap();
    PipelineRunner::new(&catalog, &sink).run(&document, "Team")
}

fn entity(dir: &Path) -> serde_yaml::Value {
    let text = fs::read_to_string(dir.join("backstage-team-team-acme.yaml")).unwrap();
    serde_yaml::from_str(&text).unwrap()
}

#[test]
fn team_acme_renders_entity_and_terraform() {
    let out = TempDir::new().unwrap();
    let report = run_into(out.path(), TEAM_ACME);
    assert!(!report.has_failures(), "{:?}", report.diagnostic_lines());

    let entity = entity(out.path());
    assert_eq!(entity["metadata"]["name"], "team-acme");
    assert_eq!(entity["spec"]["displayName"], "Acme");
    assert_eq!(entity["metadata"]["annotations"]["contact.email"], "acme@x.com");

    let terraform = fs::read_to_string(out.path().join("infra/org-team-acme.tf")).unwrap();
    assert!(terraform.contains("team-acme"));
    assert!(terraform.contains("Acme"));
    assert!(terraform.contains("acme@x.com"));
}

#[test]
fn missing_email_falls_back_to_example_domain() {
    let out = TempDir::new().unwrap();
    let report = run_into(out.path(), TEAM_ACME_NO_EMAIL);
    assert!(!report.has_failures());

    assert_eq!(
        entity(out.path())["metadata"]["annotations"]["contact.email"],
        "team-acme@example.com"
    );
    let terraform = fs::read_to_string(out.path().join("infra/org-team-acme.tf")).unwrap();
    assert!(terraform.contains("email = \"team-acme@example.com\""));
}

#[test]
fn identical_input_gives_identical_bytes() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let a = run_into(first.path(), TEAM_ACME);
    let b = run_into(second.path(), TEAM_ACME);

    for path in ["backstage-team-team-acme.yaml", "infra/org-team-acme.tf"] {
        assert_eq!(
            fs::read(first.path().join(path)).unwrap(),
            fs::read(second.path().join(path)).unwrap()
        );
    }
    let digests = |report: &promise_pipeline::core::report::RunReport| -> Vec<String> {
        report
            .outcomes
            .iter()
            .filter_map(|outcome| match &outcome.result {
                ArtifactResult::Written { sha256, .. } => Some(sha256.clone()),
                ArtifactResult::Failed(_) => None,
            })
            .collect()
    };
    assert_eq!(digests(&a), digests(&b));
    assert_ne!(a.run_id, b.run_id);
}

#[test]
fn rerun_overwrites_without_leftovers() {
    let out = TempDir::new().unwrap();
    run_into(out.path(), TEAM_ACME);
    let before = fs::read(out.path().join("backstage-team-team-acme.yaml")).unwrap();
    let report = run_into(out.path(), TEAM_ACME);
    assert!(!report.has_failures());

    assert_eq!(
        fs::read(out.path().join("backstage-team-team-acme.yaml")).unwrap(),
        before
    );
    let mut names: Vec<String> = fs::read_dir(out.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["backstage-team-team-acme.yaml", "infra"]);
}

#[test]
fn rendered_text_has_no_placeholders_left() {
    let out = TempDir::new().unwrap();
    run_into(out.path(), TEAM_ACME_NO_EMAIL);
    for path in ["backstage-team-team-acme.yaml", "infra/org-team-acme.tf"] {
        let text = fs::read_to_string(out.path().join(path)).unwrap();
        assert!(!text.contains("{{"), "{} still has placeholders", path);
    }
}

#[test]
fn missing_name_fails_both_artifacts_without_writing() {
    let out = TempDir::new().unwrap();
    let report = run_into(out.path(), "kind: Team\nspec:\n  id: team-acme\n");

    assert_eq!(report.failures().count(), 2);
    for outcome in &report.outcomes {
        assert_eq!(
            outcome.error(),
            Some(&PipelineError::MissingField {
                path: "spec.name".to_string()
            })
        );
    }
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn identifier_outside_entity_name_rules_is_rejected() {
    let out = TempDir::new().unwrap();
    let report = run_into(out.path(), "spec:\n  id: ../escape\n  name: Evil\n");
    for outcome in &report.outcomes {
        assert_eq!(outcome.status(), OutcomeStatus::Failed);
        assert_eq!(outcome.error().unwrap().kind(), "InvalidField");
    }
}

#[test]
fn non_string_identifiers_write_nothing() {
    for yaml in [
        "spec:\n  id: ~\n  name: Acme\n",
        "spec:\n  id: 123\n  name: Acme\n",
    ] {
        let out = TempDir::new().unwrap();
        let report = run_into(out.path(), yaml);
        assert_eq!(report.failures().count(), 2, "{:?}", report.diagnostic_lines());
        for outcome in &report.outcomes {
            assert_eq!(outcome.error().unwrap().kind(), "InvalidField");
        }
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }
}

struct RefusingSink {
    inner: DirectorySink,
}

impl OutputSink for RefusingSink {
    fn write(&self, relative_path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
        if relative_path.extension().is_some_and(|ext| ext == "yaml") {
            return Err(PipelineError::Io {
                path: relative_path.to_path_buf(),
                cause: "read-only file system".to_string(),
            });
        }
        self.inner.write(relative_path, bytes)
    }
}

#[test]
fn sink_failure_only_affects_its_artifact() {
    let out = TempDir::new().unwrap();
    let catalog = Catalog::builtin().unwrap();
    let sink = RefusingSink {
        inner: DirectorySink::new(out.path().to_path_buf()),
    };
    let document = Document::from_yaml_str(TEAM_ACME).unwrap();
    let report = PipelineRunner::new(&catalog, &sink).run(&document, "Team");

    let lines = report.diagnostic_lines();
    assert_eq!(
        lines[0],
        "backstage-group failed [PIPE-IO-001] failed to write 'backstage-team-team-acme.yaml': read-only file system"
    );
    assert_eq!(lines[1], "terraform-org ok infra/org-team-acme.tf");
    assert!(out.path().join("infra/org-team-acme.tf").exists());
}
