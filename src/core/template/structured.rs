use crate::core::error::PipelineError;
use crate::core::extract::ResolvedFields;
use crate::core::template::text::{TemplateSyntaxError, TextTemplate};
use indexmap::IndexSet;

/// One position in a structured skeleton.
#[derive(Debug, Clone)]
pub enum Node {
    Literal(serde_yaml::Value),
    /// Filled with the field's value, keeping its type.
    Field(String),
    /// A string with embedded placeholders.
    Interpolated(TextTemplate),
    /// Entries keep skeleton order in the output.
    Mapping(Vec<(String, Node)>),
    Sequence(Vec<Node>),
}

impl Node {
    pub fn literal(value: impl Into<serde_yaml::Value>) -> Self {
        Node::Literal(value.into())
    }

    pub fn field(name: &str) -> Self {
        Node::Field(name.to_string())
    }

    /// `"{{x}}"` becomes a field slot, other placeholder text is interpolated.
    pub fn text(source: &str) -> Result<Self, TemplateSyntaxError> {
        let template = TextTemplate::parse(source)?;
        Ok(if let Some(name) = template.as_single_placeholder() {
            Node::Field(name.to_string())
        } else if template.has_placeholders() {
            Node::Interpolated(template)
        } else {
            Node::Literal(serde_yaml::Value::String(source.to_string()))
        })
    }

    pub fn mapping<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Node)>,
        K: Into<String>,
    {
        Node::Mapping(
            entries
                .into_iter()
                .map(|(key, node)| (key.into(), node))
                .collect(),
        )
    }

    pub fn sequence(items: impl IntoIterator<Item = Node>) -> Self {
        Node::Sequence(items.into_iter().collect())
    }

    /// Build a node tree from a YAML skeleton where strings may hold placeholders.
    pub fn from_skeleton(skeleton: &serde_yaml::Value) -> Result<Self, TemplateSyntaxError> {
        match skeleton {
            serde_yaml::Value::String(text) => Node::text(text),
            serde_yaml::Value::Sequence(items) => Ok(Node::Sequence(
                items
                    .iter()
                    .map(Node::from_skeleton)
                    .collect::<Result<_, _>>()?,
            )),
            serde_yaml::Value::Mapping(mapping) => {
                let mut entries = Vec::with_capacity(mapping.len());
                for (key, value) in mapping {
                    let key = key
                        .as_str()
                        .ok_or_else(|| TemplateSyntaxError::NonStringKey {
                            found: format!("{:?}", key),
                        })?;
                    entries.push((key.to_string(), Node::from_skeleton(value)?));
                }
                Ok(Node::Mapping(entries))
            }
            serde_yaml::Value::Tagged(tagged) => Node::from_skeleton(&tagged.value),
            other => Ok(Node::Literal(other.clone())),
        }
    }

    fn collect_placeholders<'a>(&'a self, names: &mut IndexSet<&'a str>) {
        match self {
            Node::Literal(_) => {}
            Node::Field(name) => {
                names.insert(name.as_str());
            }
            Node::Interpolated(template) => names.extend(template.placeholders()),
            Node::Mapping(entries) => entries
                .iter()
                .for_each(|(_, node)| node.collect_placeholders(names)),
            Node::Sequence(items) => items
                .iter()
                .for_each(|node| node.collect_placeholders(names)),
        }
    }

    fn fill(
        &self,
        template_id: &str,
        fields: &ResolvedFields,
    ) -> Result<serde_yaml::Value, PipelineError> {
        Ok(match self {
            Node::Literal(value) => value.clone(),
            Node::Field(name) => fields
                .get(name)
                .map(|value| value.to_yaml())
                .ok_or_else(|| PipelineError::UnresolvedPlaceholder {
                    template: template_id.to_string(),
                    name: name.clone(),
                    unresolved: vec![name.clone()],
                })?,
            Node::Interpolated(template) => {
                serde_yaml::Value::String(template.render(template_id, fields)?)
            }
            Node::Mapping(entries) => {
                let mut mapping = serde_yaml::Mapping::with_capacity(entries.len());
                for (key, node) in entries {
                    mapping.insert(
                        serde_yaml::Value::String(key.clone()),
                        node.fill(template_id, fields)?,
                    );
                }
                serde_yaml::Value::Mapping(mapping)
            }
            Node::Sequence(items) => serde_yaml::Value::Sequence(
                items
                    .iter()
                    .map(|node| node.fill(template_id, fields))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

/// Fill-in-the-blanks document builder serialized as YAML.
#[derive(Debug, Clone)]
pub struct StructuredTemplate {
    root: Node,
}

impl StructuredTemplate {
    pub fn new(root: Node) -> Self {
        StructuredTemplate { root }
    }

    pub fn from_skeleton(skeleton: &serde_yaml::Value) -> Result<Self, TemplateSyntaxError> {
        Ok(StructuredTemplate::new(Node::from_skeleton(skeleton)?))
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn placeholders(&self) -> IndexSet<&str> {
        let mut names = IndexSet::new();
        self.root.collect_placeholders(&mut names);
        names
    }

    pub fn render(&self, template_id: &str, fields: &ResolvedFields) -> Result<Vec<u8>, PipelineError> {
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

        let document = self.root.fill(template_id, fields)?;
        let text = serde_yaml::to_string(&document).map_err(|err| PipelineError::Render {
            template: template_id.to_string(),
            message: err.to_string(),
        })?;
        Ok(text.into_bytes())
    }
}
