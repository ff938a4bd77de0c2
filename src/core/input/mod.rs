//! Reading the staged resource document.

use crate::core::document::Document;
use crate::core::error::PipelineError;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Supplies the input document for a run.
pub trait ResourceReader {
    fn read(&self) -> Result<Document, PipelineError>;
}

/// Where the input document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
}

impl InputSource {
    /// `-` selects standard input; anything else is a file path.
    pub fn from_path(path: &Path) -> Self {
        if path.as_os_str() == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(path.to_path_buf())
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::File(path) => write!(f, "{}", path.display()),
            InputSource::Stdin => write!(f, "<stdin>"),
        }
    }
}

/// Reads a YAML resource from a file or standard input.
#[derive(Debug, Clone)]
pub struct YamlResourceReader {
    source: InputSource,
}

impl YamlResourceReader {
    pub fn new(source: InputSource) -> Self {
        YamlResourceReader { source }
    }

    pub fn source(&self) -> &InputSource {
        &self.source
    }

    fn read_text(&self) -> Result<String, PipelineError> {
        match &self.source {
            InputSource::File(path) => {
                if !path.exists() {
                    return Err(self.unavailable("file does not exist"));
                }
                std::fs::read_to_string(path).map_err(|e| self.unavailable(e.to_string()))
            }
            InputSource::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|e| self.unavailable(e.to_string()))?;
                Ok(text)
            }
        }
    }

    fn unavailable<T: Into<String>>(&self, reason: T) -> PipelineError {
        PipelineError::InputUnavailable {
            location: self.source.to_string(),
            reason: reason.into(),
        }
    }
}

impl ResourceReader for YamlResourceReader {
    fn read(&self) -> Result<Document, PipelineError> {
        let text = self.read_text()?;
        let document = Document::from_yaml_str(&text).map_err(|reason| self.unavailable(reason))?;
        tracing::debug!(
            source = %self.source,
            kind = document.kind().unwrap_or("<none>"),
            "read input resource"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn reader_for(dir: &TempDir, contents: &str) -> YamlResourceReader {
        let path = dir.path().join("object.yaml");
        std::fs::write(&path, contents).unwrap();
        YamlResourceReader::new(InputSource::File(path))
    }

    #[test]
    fn dash_selects_stdin() {
        assert_eq!(InputSource::from_path(Path::new("-")), InputSource::Stdin);
        assert_eq!(
            InputSource::from_path(Path::new("object.yaml")),
            InputSource::File(PathBuf::from("object.yaml"))
        );
    }

    #[test]
    fn reads_mapping_document() {
        let dir = TempDir::new().unwrap();
        let document = reader_for(&dir, "kind: Team\nspec:\n  id: acme\n")
            .read()
            .unwrap();
        assert_eq!(document.kind(), Some("Team"));
    }

    #[test]
    fn missing_file_is_input_unavailable() {
        let dir = TempDir::new().unwrap();
        let reader = YamlResourceReader::new(InputSource::File(dir.path().join("absent.yaml")));
        let err = reader.read().unwrap_err();
        assert_eq!(err.kind(), "InputUnavailable");
        assert!(err.is_fatal());
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn malformed_inputs_are_input_unavailable() {
        let dir = TempDir::new().unwrap();
        for contents in ["", "kind: [unclosed", "- just\n- a list\n"] {
            let err = reader_for(&dir, contents).read().unwrap_err();
            assert_eq!(err.kind(), "InputUnavailable", "input {:?}", contents);
        }
    }
}
