//! Registry of what gets produced for each input kind.
//!
//! New artifacts are added by registering another kind (or loading a catalog file);
//! entries already registered are never modified.

#![allow(clippy::result_large_err)]

pub mod file;
pub mod team;

use crate::core::error::AppError;
use crate::core::extract::{FieldBinding, FieldDefault};
use crate::core::template::{Template, TemplateRegistry, TextTemplate};
use crate::core::types::ErrorCategory;
use indexmap::{IndexMap, IndexSet};
use std::path::Path;

pub const BUILTIN_CATALOG_VERSION: &str = "v1";

/// One producible output for a kind.
#[derive(Debug, Clone)]
pub struct ArtifactSpec {
    name: String,
    template_id: String,
    bindings: IndexMap<String, FieldBinding>,
    output_path: TextTemplate,
}

impl ArtifactSpec {
    pub fn new(name: &str, template_id: &str, output_path: &str) -> Result<Self, AppError> {
        let output_path = TextTemplate::parse(output_path).map_err(|err| {
            validation_error(format!(
                "artifact '{}' has an invalid output path: {}",
                name, err
            ))
        })?;
        Ok(ArtifactSpec {
            name: name.to_string(),
            template_id: template_id.to_string(),
            bindings: IndexMap::new(),
            output_path,
        })
    }

    /// Bind `field` for this artifact; bindings resolve in the order they are added.
    pub fn bind(mut self, field: &str, binding: FieldBinding) -> Self {
        self.bindings.insert(field.to_string(), binding);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn bindings(&self) -> &IndexMap<String, FieldBinding> {
        &self.bindings
    }

    pub fn output_path(&self) -> &TextTemplate {
        &self.output_path
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    version: String,
    templates: TemplateRegistry,
    kinds: IndexMap<String, Vec<ArtifactSpec>>,
}

impl Catalog {
    pub fn new(version: &str) -> Self {
        Catalog {
            version: version.to_string(),
            templates: TemplateRegistry::new(),
            kinds: IndexMap::new(),
        }
    }

    /// Catalog with the built-in `Team` kind registered.
    pub fn builtin() -> Result<Self, AppError> {
        let mut catalog = Catalog::new(BUILTIN_CATALOG_VERSION);
        team::register(&mut catalog)?;
        Ok(catalog)
    }

    /// Built-in catalog extended with every file in `paths`, in order.
    pub fn with_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, AppError> {
        let mut catalog = Self::builtin()?;
        for path in paths {
            catalog.load_file(path.as_ref())?;
        }
        Ok(catalog)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn register_template(&mut self, id: &str, template: Template) -> Result<(), AppError> {
        self.templates.register(id, template)
    }

    /// Register the artifacts for a new kind after checking them against the registry.
    pub fn register(&mut self, kind: &str, specs: Vec<ArtifactSpec>) -> Result<(), AppError> {
        if kind.trim().is_empty() {
            return Err(validation_error("kind cannot be empty"));
        }
        if self.kinds.contains_key(kind) {
            return Err(validation_error(format!("kind '{}' is already registered", kind))
                .with_context("kind", kind));
        }
        if specs.is_empty() {
            return Err(validation_error(format!(
                "kind '{}' must declare at least one artifact",
                kind
            )));
        }

        let mut names = IndexSet::new();
        let mut paths = IndexSet::new();
        for spec in &specs {
            self.check_spec(spec)
                .map_err(|err| err.with_context("kind", kind).with_context("artifact", spec.name()))?;
            if !names.insert(spec.name()) {
                return Err(validation_error(format!(
                    "artifact '{}' is declared twice for kind '{}'",
                    spec.name(),
                    kind
                )));
            }
            if !paths.insert(spec.output_path().source()) {
                return Err(validation_error(format!(
                    "artifacts of kind '{}' share the output path '{}'",
                    kind,
                    spec.output_path().source()
                )));
            }
        }

        tracing::debug!(kind, artifacts = specs.len(), "registered catalog kind");
        self.kinds.insert(kind.to_string(), specs);
        Ok(())
    }

    fn check_spec(&self, spec: &ArtifactSpec) -> Result<(), AppError> {
        if spec.name().trim().is_empty() {
            return Err(validation_error("artifact name cannot be empty"));
        }
        if !self.templates.contains(spec.template_id()) {
            return Err(validation_error(format!(
                "artifact '{}' references unknown template '{}'",
                spec.name(),
                spec.template_id()
            )));
        }

        let source = spec.output_path().source();
        if source.trim().is_empty() {
            return Err(validation_error(format!(
                "artifact '{}' has an empty output path",
                spec.name()
            )));
        }
        if source.starts_with('/') || source.split('/').any(|part| part == "..") {
            return Err(validation_error(format!(
                "artifact '{}' output path '{}' must be relative",
                spec.name(),
                source
            )));
        }
        for name in spec.output_path().placeholders() {
            if !spec.bindings().contains_key(name) {
                return Err(validation_error(format!(
                    "output path of '{}' uses unbound field '{}'",
                    spec.name(),
                    name
                )));
            }
        }

        let mut earlier: IndexSet<&str> = IndexSet::new();
        for (field, binding) in spec.bindings() {
            if let Some(FieldDefault::Template(template)) = binding.default() {
                if let Some(name) = template
                    .placeholders()
                    .into_iter()
                    .find(|name| !earlier.contains(name))
                {
                    return Err(validation_error(format!(
                        "default of '{}' uses '{}', which is not bound before it",
                        field, name
                    )));
                }
            }
            earlier.insert(field.as_str());
        }
        Ok(())
    }

    /// Artifacts for `kind` in registration order; empty for unknown kinds.
    pub fn artifacts_for(&self, kind: &str) -> &[ArtifactSpec] {
        self.kinds.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }
}

fn validation_error<T: Into<String>>(message: T) -> AppError {
    AppError::new(ErrorCategory::ValidationError, message).with_code("PIPE-CAT-001")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_with_template() -> Catalog {
        let mut catalog = Catalog::new("test");
        catalog
            .register_template(
                "note",
                Template::Text(TextTemplate::parse("{{id}}").unwrap()),
            )
            .unwrap();
        catalog
    }

    fn note(name: &str, path: &str) -> ArtifactSpec {
        ArtifactSpec::new(name, "note", path)
            .unwrap()
            .bind("id", FieldBinding::required("spec.id").unwrap())
    }

    #[test]
    fn artifacts_keep_registration_order() {
        let mut catalog = catalog_with_template();
        catalog
            .register(
                "Widget",
                vec![note("second", "b-{{id}}.txt"), note("first", "a-{{id}}.txt")],
            )
            .unwrap();
        let names: Vec<&str> = catalog
            .artifacts_for("Widget")
            .iter()
            .map(ArtifactSpec::name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
        assert!(catalog.artifacts_for("Unknown").is_empty());
    }

    #[test]
    fn existing_kinds_are_never_replaced() {
        let mut catalog = catalog_with_template();
        catalog
            .register("Widget", vec![note("a", "a-{{id}}.txt")])
            .unwrap();
        let err = catalog
            .register("Widget", vec![note("b", "b-{{id}}.txt")])
            .unwrap_err();
        assert!(err.message.contains("already registered"));
        assert_eq!(catalog.artifacts_for("Widget")[0].name(), "a");
    }

    #[test]
    fn rejects_shared_output_paths() {
        let mut catalog = catalog_with_template();
        let err = catalog
            .register(
                "Widget",
                vec![note("a", "out-{{id}}.txt"), note("b", "out-{{id}}.txt")],
            )
            .unwrap_err();
        assert!(err.message.contains("share the output path"));
    }

    #[test]
    fn rejects_unknown_templates_and_unbound_path_fields() {
        let mut catalog = catalog_with_template();
        let unknown = ArtifactSpec::new("a", "missing", "a.txt").unwrap();
        assert!(catalog.register("A", vec![unknown]).is_err());

        let unbound = ArtifactSpec::new("b", "note", "b-{{owner}}.txt").unwrap();
        assert!(catalog.register("B", vec![unbound]).is_err());
    }

    #[test]
    fn rejects_absolute_and_escaping_paths() {
        let mut catalog = catalog_with_template();
        assert!(catalog
            .register("A", vec![note("a", "/etc/{{id}}")])
            .is_err());
        assert!(catalog
            .register("B", vec![note("b", "../{{id}}.txt")])
            .is_err());
    }

    #[test]
    fn defaults_may_only_reference_earlier_fields() {
        let mut catalog = catalog_with_template();
        let spec = ArtifactSpec::new("a", "note", "{{id}}.txt")
            .unwrap()
            .bind(
                "email",
                FieldBinding::required("spec.email")
                    .unwrap()
                    .with_default_text("{{id}}@example.com")
                    .unwrap(),
            )
            .bind("id", FieldBinding::required("spec.id").unwrap());
        let err = catalog.register("A", vec![spec]).unwrap_err();
        assert!(err.message.contains("not bound before it"));
    }

    #[test]
    fn builtin_catalog_registers_team() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.version(), BUILTIN_CATALOG_VERSION);
        assert!(catalog.is_registered("Team"));
        assert_eq!(catalog.artifacts_for("Team").len(), 2);
    }
}
