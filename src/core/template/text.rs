use crate::core::error::PipelineError;
use crate::core::extract::ResolvedFields;
use indexmap::IndexSet;

/// Syntax problems found while scanning a template source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateSyntaxError {
    #[error("unterminated placeholder starting at byte {offset}")]
    Unterminated { offset: usize },

    #[error("empty placeholder at byte {offset}")]
    EmptyName { offset: usize },

    #[error("invalid placeholder name '{name}' at byte {offset}")]
    InvalidName { name: String, offset: usize },

    #[error("skeleton mapping keys must be strings, found {found}")]
    NonStringKey { found: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A `{{field_name}}` template, scanned once into literal and placeholder segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl TextTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateSyntaxError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            literal.push_str(&rest[..start]);
            let body = &rest[start + 2..];
            let end = body
                .find("}}")
                .ok_or(TemplateSyntaxError::Unterminated {
                    offset: offset + start,
                })?;
            let name = body[..end].trim();
            if name.is_empty() {
                return Err(TemplateSyntaxError::EmptyName {
                    offset: offset + start,
                });
            }
            if !is_valid_name(name) {
                return Err(TemplateSyntaxError::InvalidName {
                    name: name.to_string(),
                    offset: offset + start,
                });
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Placeholder(name.to_string()));

            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(TextTemplate {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> IndexSet<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// `Some(name)` when the whole template is exactly one placeholder.
    pub fn as_single_placeholder(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [Segment::Placeholder(name)] => Some(name),
            _ => None,
        }
    }

    pub fn has_placeholders(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Placeholder(_)))
    }

    /// Substitute every placeholder. Nothing is produced unless all of them resolve.
    pub fn render(&self, template_id: &str, fields: &ResolvedFields) -> Result<String, PipelineError> {
        let unresolved: Vec<String> = self
            .placeholders()
            .into_iter()
            .filter(|name| !fields.contains(name))
            .map(str::to_string)
            .collect();
        if let Some(first) = unresolved.first() {
            return Err(PipelineError::UnresolvedPlaceholder {
                template: template_id.to_string(),
                name: first.clone(),
                unresolved,
            });
        }

        let mut rendered = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(name) => {
                    if let Some(value) = fields.get(name) {
                        rendered.push_str(&value.to_string());
                    }
                }
            }
        }
        Ok(rendered)
    }
}

fn is_valid_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
