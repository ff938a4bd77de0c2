//! Loosely structured input documents.
//!
//! Resources arrive as YAML. They are converted once into [`Value`], a small tagged
//! union, so that field resolution never has to deal with YAML tags or non-string keys.

use indexmap::IndexMap;
use std::fmt;

/// A leaf value of an input document.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(serde_yaml::Number),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(text) => f.write_str(text),
            Scalar::Number(number) => write!(f, "{}", number),
            Scalar::Bool(flag) => write!(f, "{}", flag),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::String(text)) => Some(text),
            _ => None,
        }
    }

    /// `true` for values a template slot can hold: scalars and null.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Value::Null | Value::Scalar(_))
    }

    pub fn to_yaml(&self) -> serde_yaml::Value {
        match self {
            Value::Null => serde_yaml::Value::Null,
            Value::Scalar(Scalar::String(text)) => serde_yaml::Value::String(text.clone()),
            Value::Scalar(Scalar::Number(number)) => serde_yaml::Value::Number(number.clone()),
            Value::Scalar(Scalar::Bool(flag)) => serde_yaml::Value::Bool(*flag),
            Value::Sequence(items) => {
                serde_yaml::Value::Sequence(items.iter().map(Value::to_yaml).collect())
            }
            Value::Mapping(map) => {
                let mut mapping = serde_yaml::Mapping::new();
                for (key, value) in map {
                    mapping.insert(serde_yaml::Value::String(key.clone()), value.to_yaml());
                }
                serde_yaml::Value::Mapping(mapping)
            }
        }
    }
}

/// Text form used by text templates and output paths.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Scalar(scalar) => write!(f, "{}", scalar),
            composite => {
                let text = serde_yaml::to_string(&composite.to_yaml()).map_err(|_| fmt::Error)?;
                f.write_str(text.trim_end())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Scalar(Scalar::String(text.to_string()))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Scalar(Scalar::String(text))
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Scalar(Scalar::Bool(flag))
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Scalar(Scalar::Number(number.into()))
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = String;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(flag) => Value::Scalar(Scalar::Bool(flag)),
            serde_yaml::Value::Number(number) => Value::Scalar(Scalar::Number(number)),
            serde_yaml::Value::String(text) => Value::Scalar(Scalar::String(text)),
            serde_yaml::Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_yaml::Value::Mapping(mapping) => {
                let mut map = IndexMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    map.insert(mapping_key(key)?, Value::try_from(value)?);
                }
                Value::Mapping(map)
            }
            serde_yaml::Value::Tagged(tagged) => Value::try_from(tagged.value)?,
        })
    }
}

fn mapping_key(key: serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(text) => Ok(text),
        serde_yaml::Value::Number(number) => Ok(number.to_string()),
        serde_yaml::Value::Bool(flag) => Ok(flag.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => mapping_key(tagged.value),
        other => Err(format!("unsupported mapping key {:?}", other)),
    }
}

/// One externally supplied resource. The root is always a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: IndexMap<String, Value>,
}

impl Document {
    pub fn new(root: IndexMap<String, Value>) -> Self {
        Document { root }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, String> {
        if text.trim().is_empty() {
            return Err("document is empty".to_string());
        }
        let parsed: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|err| format!("invalid YAML: {}", err))?;
        Self::try_from(parsed)
    }

    pub fn root(&self) -> &IndexMap<String, Value> {
        &self.root
    }

    /// Top-level `kind`, as set on Kubernetes-style resources.
    pub fn kind(&self) -> Option<&str> {
        self.root.get("kind").and_then(Value::as_str)
    }

    /// `metadata.name`, used for log context only.
    pub fn resource_name(&self) -> Option<&str> {
        self.root
            .get("metadata")
            .and_then(Value::as_mapping)
            .and_then(|metadata| metadata.get("name"))
            .and_then(Value::as_str)
    }
}

impl TryFrom<serde_yaml::Value> for Document {
    type Error = String;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        match Value::try_from(value)? {
            Value::Mapping(root) => Ok(Document { root }),
            Value::Null => Err("document is empty".to_string()),
            _ => Err("document root is not a mapping".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_mapping_in_source_order() {
        let doc = Document::from_yaml_str(
            "kind: Team\nmetadata:\n  name: acme\nspec:\n  name: Acme\n  id: team-acme\n",
        )
        .unwrap();
        assert_eq!(doc.kind(), Some("Team"));
        assert_eq!(doc.resource_name(), Some("acme"));
        let spec = doc.root().get("spec").and_then(Value::as_mapping).unwrap();
        let keys: Vec<&str> = spec.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "id"]);
    }

    #[test]
    fn keeps_scalar_types() {
        let doc = Document::from_yaml_str("a: 7\nb: true\nc: ~\nd: '7'\n").unwrap();
        let root = doc.root();
        assert_eq!(root["a"], Value::from(7i64));
        assert_eq!(root["b"], Value::from(true));
        assert_eq!(root["c"], Value::Null);
        assert_eq!(root["d"], Value::from("7"));
    }

    #[test]
    fn stringifies_non_string_keys_and_strips_tags() {
        let doc = Document::from_yaml_str("1: one\ntrue: yes\ntagged: !custom value\n").unwrap();
        assert_eq!(doc.root()["1"], Value::from("one"));
        assert_eq!(doc.root()["true"], Value::from("yes"));
        assert_eq!(doc.root()["tagged"], Value::from("value"));
    }

    #[test]
    fn rejects_empty_and_non_mapping_documents() {
        assert_eq!(
            Document::from_yaml_str("").unwrap_err(),
            "document is empty".to_string()
        );
        assert!(Document::from_yaml_str("- a\n- b\n")
            .unwrap_err()
            .contains("not a mapping"));
        assert!(Document::from_yaml_str("a: [unclosed")
            .unwrap_err()
            .starts_with("invalid YAML"));
    }

    #[test]
    fn display_renders_leaf_values() {
        assert_eq!(Value::from("Acme").to_string(), "Acme");
        assert_eq!(Value::from(42i64).to_string(), "42");
        assert_eq!(Value::from(false).to_string(), "false");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
