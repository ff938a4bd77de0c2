#![allow(clippy::result_large_err)]

pub mod structured;
pub mod text;

pub use structured::{Node, StructuredTemplate};
pub use text::{TemplateSyntaxError, TextTemplate};

use crate::core::error::{AppError, PipelineError};
use crate::core::extract::ResolvedFields;
use crate::core::types::ErrorCategory;
use indexmap::{IndexMap, IndexSet};

/// A renderable artifact body.
#[derive(Debug, Clone)]
pub enum Template {
    Structured(StructuredTemplate),
    Text(TextTemplate),
}

impl Template {
    pub fn kind(&self) -> &'static str {
        match self {
            Template::Structured(_) => "structured",
            Template::Text(_) => "text",
        }
    }

    pub fn placeholders(&self) -> IndexSet<&str> {
        match self {
            Template::Structured(template) => template.placeholders(),
            Template::Text(template) => template.placeholders(),
        }
    }

    pub fn render(&self, template_id: &str, fields: &ResolvedFields) -> Result<Vec<u8>, PipelineError> {
        match self {
            Template::Structured(template) => template.render(template_id, fields),
            Template::Text(template) => template
                .render(template_id, fields)
                .map(String::into_bytes),
        }
    }
}

/// Templates addressable by identifier.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: IndexMap<String, Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: &str, template: Template) -> Result<(), AppError> {
        if id.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "template id cannot be empty",
            )
            .with_code("PIPE-CAT-010"));
        }
        if self.templates.contains_key(id) {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!("template '{}' is already registered", id),
            )
            .with_code("PIPE-CAT-011"));
        }
        self.templates.insert(id.to_string(), template);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.templates.iter().map(|(id, template)| (id.as_str(), template))
    }

    /// Render a registered template; pure, no I/O.
    pub fn render(&self, template_id: &str, fields: &ResolvedFields) -> Result<Vec<u8>, PipelineError> {
        let template = self.get(template_id).ok_or_else(|| PipelineError::Render {
            template: template_id.to_string(),
            message: "template is not registered".to_string(),
        })?;
        template.render(template_id, fields)
    }
}
