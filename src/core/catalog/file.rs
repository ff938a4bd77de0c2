//! YAML catalog files declaring additional templates and kinds.
//!
//! ```yaml
//! templates:
//!   readme:
//!     type: text
//!     body: "# {{name}}\n"
//! kinds:
//!   Service:
//!     - name: readme
//!       template: readme
//!       output: docs/{{id}}.md
//!       fields:
//!         id: { path: spec.id, pattern: "^[a-z0-9-]+$" }
//!         name: { path: spec.name, default: "{{id}}" }
//! ```

#![allow(clippy::result_large_err)]

use super::{ArtifactSpec, Catalog};
use crate::core::document::Value;
use crate::core::error::AppError;
use crate::core::extract::{FieldBinding, FieldDefault};
use crate::core::template::{StructuredTemplate, Template, TextTemplate};
use crate::core::types::ErrorCategory;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub templates: IndexMap<String, TemplateDef>,
    #[serde(default)]
    pub kinds: IndexMap<String, Vec<ArtifactDef>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateDef {
    Text { body: String },
    Structured { skeleton: serde_yaml::Value },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactDef {
    pub name: String,
    pub template: String,
    pub output: String,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub path: String,
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
    #[serde(default)]
    pub pattern: Option<String>,
}

impl Catalog {
    /// Load a catalog file and register its templates, then its kinds.
    pub fn load_file(&mut self, path: &Path) -> Result<(), AppError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read catalog file {}: {}", path.display(), e),
            )
        })?;
        let file: CatalogFile = serde_yaml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse catalog file {}: {}", path.display(), e),
            )
            .with_code("PIPE-CAT-002")
        })?;
        tracing::info!(
            path = %path.display(),
            version = file.version.as_deref().unwrap_or("unversioned"),
            "loading catalog file"
        );
        self.apply(file)
            .map_err(|err| err.with_context("catalog_file", path.display().to_string()))
    }

    pub fn apply(&mut self, file: CatalogFile) -> Result<(), AppError> {
        for (id, definition) in file.templates {
            let template = build_template(&id, definition)?;
            self.register_template(&id, template)?;
        }
        for (kind, artifacts) in file.kinds {
            let specs = artifacts
                .into_iter()
                .map(build_spec)
                .collect::<Result<Vec<_>, _>>()?;
            self.register(&kind, specs)?;
        }
        Ok(())
    }
}

fn build_template(id: &str, definition: TemplateDef) -> Result<Template, AppError> {
    let syntax_error = |err: crate::core::template::TemplateSyntaxError| {
        AppError::new(
            ErrorCategory::ValidationError,
            format!("template '{}' is invalid: {}", id, err),
        )
        .with_code("PIPE-CAT-003")
    };
    Ok(match definition {
        TemplateDef::Text { body } => Template::Text(TextTemplate::parse(&body).map_err(syntax_error)?),
        TemplateDef::Structured { skeleton } => {
            Template::Structured(StructuredTemplate::from_skeleton(&skeleton).map_err(syntax_error)?)
        }
    })
}

fn build_spec(definition: ArtifactDef) -> Result<ArtifactSpec, AppError> {
    let mut spec = ArtifactSpec::new(&definition.name, &definition.template, &definition.output)?;
    for (field, def) in definition.fields {
        let mut binding = FieldBinding::required(&def.path)?;
        if let Some(pattern) = &def.pattern {
            binding = binding.with_pattern(pattern)?;
        }
        binding = match def.default {
            None => binding,
            Some(serde_yaml::Value::String(text)) => binding.with_default_text(&text)?,
            // non-string scalars keep their YAML type
            Some(other) => match Value::try_from(other) {
                Ok(Value::Scalar(scalar)) => binding.with_default(FieldDefault::Literal(scalar)),
                _ => {
                    return Err(AppError::new(
                        ErrorCategory::ValidationError,
                        format!(
                            "default for field '{}' of artifact '{}' must be a scalar",
                            field, definition.name
                        ),
                    )
                    .with_code("PIPE-CAT-004"))
                }
            },
        };
        spec = spec.bind(&field, binding);
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::Document;
    use crate::core::extract::resolve_bindings;
    use tempfile::TempDir;

    const SERVICE_CATALOG: &str = r##"
version: v2
templates:
  readme:
    type: text
    body: "# {{name}} ({{tier}})\n"
  entity:
    type: structured
    skeleton:
      kind: Component
      metadata:
        name: "{{id}}"
      spec:
        lifecycle: production
        replicas: "{{replicas}}"
kinds:
  Service:
    - name: readme
      template: readme
      output: docs/{{id}}.md
      fields:
        id: { path: spec.id, pattern: "^[a-z0-9-]+$" }
        name: { path: spec.name, default: "{{id}}" }
        tier: { path: spec.tier, default: standard }
    - name: entity
      template: entity
      output: catalog/{{id}}.yaml
      fields:
        id: { path: spec.id }
        replicas: { path: spec.replicas, default: 2 }
"##;

    #[test]
    fn loads_templates_and_kinds_next_to_builtin() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("service.yaml");
        fs::write(&path, SERVICE_CATALOG).unwrap();

        let catalog = Catalog::with_files(&[&path]).unwrap();
        assert!(catalog.is_registered("Team"));
        assert!(catalog.is_registered("Service"));

        let specs = catalog.artifacts_for("Service");
        assert_eq!(specs.len(), 2);
        let doc = Document::from_yaml_str("spec:\n  id: billing\n").unwrap();

        let fields = resolve_bindings(&doc, specs[0].bindings()).unwrap();
        let readme = catalog.templates().render("readme", &fields).unwrap();
        assert_eq!(readme, b"# billing (standard)\n");

        let fields = resolve_bindings(&doc, specs[1].bindings()).unwrap();
        let entity = catalog.templates().render("entity", &fields).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_slice(&entity).unwrap();
        assert_eq!(parsed["spec"]["replicas"], serde_yaml::Value::from(2));
    }

    #[test]
    fn cannot_redefine_builtin_kind() {
        let mut catalog = Catalog::builtin().unwrap();
        let file: CatalogFile = serde_yaml::from_str(
            "kinds:\n  Team:\n    - name: x\n      template: terraform-org\n      output: x.tf\n",
        )
        .unwrap();
        let err = catalog.apply(file).unwrap_err();
        assert!(err.message.contains("already registered"));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_templates() {
        assert!(serde_yaml::from_str::<CatalogFile>("templates: {}\nextra: 1\n").is_err());

        let mut catalog = Catalog::new("t");
        let file: CatalogFile =
            serde_yaml::from_str("templates:\n  bad:\n    type: text\n    body: \"{{oops\"\n")
                .unwrap();
        let err = catalog.apply(file).unwrap_err();
        assert_eq!(err.code, "PIPE-CAT-003");
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut catalog = Catalog::new("t");
        let err = catalog
            .load_file(Path::new("/nonexistent/catalog.yaml"))
            .unwrap_err();
        assert_eq!(err.category, ErrorCategory::IoError);
    }
}
