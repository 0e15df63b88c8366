//! Reading and writing documents on disk.

use std::path::Path;

use super::{Document, DocumentError};

/// Reads and parses a YAML file.
///
/// A missing file is reported as [`DocumentError::Read`] with
/// `ErrorKind::NotFound`; callers that treat absence as emptiness check for it.
pub fn read_document(path: &Path) -> Result<Document, DocumentError> {
    let contents = std::fs::read_to_string(path).map_err(|e| DocumentError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Document::parse(&contents).map_err(|e| e.with_file(path))
}

/// Renders a document and writes it, creating missing parent directories.
pub fn write_document(document: &Document, path: &Path) -> Result<(), DocumentError> {
    let text = document.to_yaml_string()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DocumentError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, text).map_err(|e| DocumentError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

impl DocumentError {
    /// Whether this error means the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DocumentError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
