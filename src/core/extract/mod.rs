//! Dotted-path field resolution against input documents.

#![allow(clippy::result_large_err)]

use crate::core::document::{Document, Scalar, Value};
use crate::core::error::{AppError, PipelineError};
use crate::core::template::text::TextTemplate;
use crate::core::types::ErrorCategory;
use indexmap::IndexMap;
use regex::Regex;
use std::fmt;

/// A dot-separated sequence of mapping keys, e.g. `spec.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "field path cannot be empty",
            )
            .with_code("PIPE-EXT-010"));
        }
        let segments: Vec<String> = trimmed.split('.').map(str::to_string).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!("field path '{}' contains an empty segment", trimmed),
            )
            .with_code("PIPE-EXT-010"));
        }
        Ok(FieldPath {
            raw: trimmed.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Value used when a binding's path is absent from the document.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    Literal(Scalar),
    /// Rendered against the fields bound earlier in the same artifact.
    Template(TextTemplate),
}

#[derive(Debug, Clone)]
pub struct FieldBinding {
    path: FieldPath,
    default: Option<FieldDefault>,
    pattern: Option<Regex>,
}

impl FieldBinding {
    pub fn required(path: &str) -> Result<Self, AppError> {
        Ok(FieldBinding {
            path: FieldPath::parse(path)?,
            default: None,
            pattern: None,
        })
    }

    pub fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Default given as template text; a source without placeholders becomes a literal.
    pub fn with_default_text(self, default: &str) -> Result<Self, AppError> {
        let template = TextTemplate::parse(default).map_err(|err| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("invalid default for '{}': {}", self.path, err),
            )
            .with_code("PIPE-EXT-011")
        })?;
        let default = if template.has_placeholders() {
            FieldDefault::Template(template)
        } else {
            FieldDefault::Literal(Scalar::String(default.to_string()))
        };
        Ok(self.with_default(default))
    }

    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, AppError> {
        let compiled = Regex::new(pattern).map_err(|err| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("invalid pattern for '{}': {}", self.path, err),
            )
            .with_code("PIPE-EXT-012")
        })?;
        self.pattern = Some(compiled);
        Ok(self)
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn default(&self) -> Option<&FieldDefault> {
        self.default.as_ref()
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }
}

/// Field name to resolved value, in binding order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFields {
    values: IndexMap<String, Value>,
}

impl ResolvedFields {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn lookup<'a>(document: &'a Document, path: &FieldPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = document.root().get(first)?;
    for segment in rest {
        current = current.as_mapping()?.get(segment)?;
    }
    current.is_leaf().then_some(current)
}

/// Resolve `path` against `document`, falling back to `default` when it is absent.
///
/// Absence covers missing keys, non-mapping intermediates and non-scalar targets.
pub fn resolve(
    document: &Document,
    path: &FieldPath,
    default: Option<&Value>,
) -> Result<Value, PipelineError> {
    match (lookup(document, path), default) {
        (Some(found), _) => Ok(found.clone()),
        (None, Some(fallback)) => Ok(fallback.clone()),
        (None, None) => Err(PipelineError::MissingField {
            path: path.to_string(),
        }),
    }
}

/// Resolve an ordered binding set. Template defaults see the fields bound before them.
pub fn resolve_bindings(
    document: &Document,
    bindings: &IndexMap<String, FieldBinding>,
) -> Result<ResolvedFields, PipelineError> {
    let mut fields = ResolvedFields::default();
    for (name, binding) in bindings {
        let default = match binding.default() {
            None => None,
            Some(_) if lookup(document, binding.path()).is_some() => None,
            Some(FieldDefault::Literal(scalar)) => Some(Value::Scalar(scalar.clone())),
            Some(FieldDefault::Template(template)) => {
                let template_id = format!("default of {}", name);
                Some(Value::from(template.render(&template_id, &fields)?))
            }
        };
        let value = resolve(document, binding.path(), default.as_ref())?;

        // patterned fields must be strings; null and numbers never match
        if let Some(pattern) = binding.pattern() {
            if !value.as_str().is_some_and(|text| pattern.is_match(text)) {
                return Err(PipelineError::InvalidField {
                    path: binding.path().to_string(),
                    value: value.to_string(),
                    pattern: pattern.as_str().to_string(),
                });
            }
        }
        fields.insert(name, value);
    }
    Ok(fields)
}
