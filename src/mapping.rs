//! Mapping-file loading and validation.
//!
//! Mapping documents live under `{base_path}/mappings/{index_name}.json` and
//! are treated as opaque schema bodies: the only inspection performed is the
//! presence of the top-level `mappings` field. Everything here fails before
//! any store mutation is attempted.

use crate::naming::IndexName;
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors loading or validating a mapping document. All are fatal input
/// errors reported before any network I/O.
#[derive(Debug)]
pub enum MappingError {
    /// The `mappings` directory does not exist under the base path.
    DirectoryMissing(PathBuf),
    /// The per-index mapping file does not exist.
    FileMissing(PathBuf),
    /// The file could not be read.
    Io(PathBuf, std::io::Error),
    /// The file is not valid JSON.
    Parse(PathBuf, serde_json::Error),
    /// The document lacks the required top-level `mappings` field.
    MissingMappingsField(PathBuf),
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::DirectoryMissing(base) => write!(
                f,
                "mappings directory not found under base path: {}",
                base.display()
            ),
            MappingError::FileMissing(path) => {
                write!(f, "mapping file not found: {}", path.display())
            }
            MappingError::Io(path, e) => {
                write!(f, "failed to read {}: {e}", path.display())
            }
            MappingError::Parse(path, e) => {
                write!(f, "invalid JSON in {}: {e}", path.display())
            }
            MappingError::MissingMappingsField(path) => write!(
                f,
                "no mappings-field found in {}. Check the contents",
                path.display()
            ),
        }
    }
}

impl std::error::Error for MappingError {}

/// An opaque mapping document, validated once at load time and never
/// inspected or diffed afterwards.
#[derive(Debug, Clone)]
pub struct MappingDocument {
    body: serde_json::Value,
}

impl MappingDocument {
    /// Wrap an already-parsed document, enforcing the `mappings` field.
    ///
    /// `origin` is only used in the error message.
    pub fn from_value(body: serde_json::Value, origin: &Path) -> Result<Self, MappingError> {
        if body.get("mappings").is_none() {
            return Err(MappingError::MissingMappingsField(origin.to_path_buf()));
        }
        Ok(MappingDocument { body })
    }

    /// The raw schema body sent to the store at index creation.
    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }
}

/// Load the mapping document for `index` from `{base_path}/mappings/{index}.json`.
pub fn load_mapping(base_path: &Path, index: &IndexName) -> Result<MappingDocument, MappingError> {
    let dir = base_path.join("mappings");
    if !dir.is_dir() {
        return Err(MappingError::DirectoryMissing(base_path.to_path_buf()));
    }

    let path = dir.join(format!("{index}.json"));
    if !path.is_file() {
        return Err(MappingError::FileMissing(path));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| MappingError::Io(path.clone(), e))?;
    let body: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| MappingError::Parse(path.clone(), e))?;
    MappingDocument::from_value(body, &path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_mapping(dir: &TempDir, name: &str, content: &str) {
        let mappings = dir.path().join("mappings");
        std::fs::create_dir_all(&mappings).unwrap();
        std::fs::write(mappings.join(name), content).unwrap();
    }

    #[test]
    fn missing_directory_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = load_mapping(tmp.path(), &IndexName::raw("app-users_v1")).unwrap_err();
        assert!(matches!(err, MappingError::DirectoryMissing(_)));
        assert!(format!("{err}").contains("mappings directory not found"));
    }

    #[test]
    fn missing_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("mappings")).unwrap();
        let err = load_mapping(tmp.path(), &IndexName::raw("app-users_v1")).unwrap_err();
        assert!(matches!(err, MappingError::FileMissing(_)));
    }

    #[test]
    fn document_without_mappings_field_rejected() {
        let tmp = TempDir::new().unwrap();
        write_mapping(&tmp, "app-users_v1.json", r#"{"settings": {}}"#);
        let err = load_mapping(tmp.path(), &IndexName::raw("app-users_v1")).unwrap_err();
        assert!(matches!(err, MappingError::MissingMappingsField(_)));
    }

    #[test]
    fn valid_document_loads() {
        let tmp = TempDir::new().unwrap();
        write_mapping(
            &tmp,
            "app-users_v2.json",
            r#"{"mappings": {"properties": {"name": {"type": "text"}}}}"#,
        );
        let doc = load_mapping(tmp.path(), &IndexName::raw("app-users_v2")).unwrap();
        assert!(doc.body().get("mappings").is_some());
    }

    #[test]
    fn invalid_json_rejected() {
        let tmp = TempDir::new().unwrap();
        write_mapping(&tmp, "app-users_v1.json", "{not json");
        let err = load_mapping(tmp.path(), &IndexName::raw("app-users_v1")).unwrap_err();
        assert!(matches!(err, MappingError::Parse(_, _)));
    }
}
