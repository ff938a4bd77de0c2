//! Output sinks: the only place rendered artifacts touch the filesystem.

use crate::core::error::PipelineError;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub trait OutputSink {
    /// Write `bytes` at `relative_path`, replacing any previous content.
    fn write(&self, relative_path: &Path, bytes: &[u8]) -> Result<(), PipelineError>;
}

/// Validate and normalize a rendered output path.
pub fn relative_output_path(raw: &str) -> Result<PathBuf, PipelineError> {
    let invalid = |reason: &str| PipelineError::InvalidOutputPath {
        path: raw.to_string(),
        reason: reason.to_string(),
    };
    if raw.trim().is_empty() {
        return Err(invalid("path is empty"));
    }
    if raw.ends_with('/') || raw.ends_with('\\') {
        return Err(invalid("path must name a file"));
    }

    let mut normalized = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("path must not contain '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("path must be relative"))
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }
    Ok(normalized)
}

/// Sink rooted at an externally provided writable directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: PathBuf) -> Self {
        DirectorySink { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target(&self, relative_path: &Path) -> Result<PathBuf, PipelineError> {
        let raw = relative_path.to_string_lossy();
        Ok(self.root.join(relative_output_path(&raw)?))
    }
}

impl OutputSink for DirectorySink {
    fn write(&self, relative_path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
        let target = self.target(relative_path)?;
        atomic_write(&target, bytes).map_err(|err| PipelineError::Io {
            path: relative_path.to_path_buf(),
            cause: err.to_string(),
        })?;
        tracing::debug!(
            path = %target.display(),
            bytes = bytes.len(),
            "artifact written"
        );
        Ok(())
    }
}

/// Write to a temporary sibling then rename, so a reader never sees a partial file.
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));
    fs::write(&tmp, data)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_intermediate_directories() {
        let tmp = TempDir::new().unwrap();
        let sink = DirectorySink::new(tmp.path().to_path_buf());
        sink.write(Path::new("infra/nested/org-a.tf"), b"org")
            .unwrap();
        let written = fs::read(tmp.path().join("infra/nested/org-a.tf")).unwrap();
        assert_eq!(written, b"org");
    }

    #[test]
    fn overwrites_without_mixing_content() {
        let tmp = TempDir::new().unwrap();
        let sink = DirectorySink::new(tmp.path().to_path_buf());
        let path = Path::new("backstage-team-a.yaml");
        sink.write(path, b"displayName: A much longer first version\n")
            .unwrap();
        sink.write(path, b"displayName: B\n").unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join(path)).unwrap(),
            "displayName: B\n"
        );
        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .flatten()
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn failed_write_reports_io_error_and_keeps_siblings() {
        let tmp = TempDir::new().unwrap();
        let sink = DirectorySink::new(tmp.path().to_path_buf());
        sink.write(Path::new("keep.yaml"), b"keep").unwrap();
        fs::write(tmp.path().join("blocker"), b"file, not a directory").unwrap();

        let err = sink
            .write(Path::new("blocker/child.tf"), b"never")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { ref path, .. } if path == Path::new("blocker/child.tf")));
        assert_eq!(fs::read(tmp.path().join("keep.yaml")).unwrap(), b"keep");
    }

    #[test]
    fn validates_relative_paths() {
        assert_eq!(
            relative_output_path("./infra/org-a.tf").unwrap(),
            PathBuf::from("infra/org-a.tf")
        );
        for bad in ["", "   ", "/etc/passwd", "../escape.yaml", "a/../../b", "infra/"] {
            assert!(
                matches!(
                    relative_output_path(bad),
                    Err(PipelineError::InvalidOutputPath { .. })
                ),
                "expected {:?} to be rejected",
                bad
            );
        }
    }
}
