//! Pinned-revision manifest
//!
//! Reads the vcpkg revision a project is pinned to from its `vcpkg.json`.
//! Only the `builtin-baseline` field is consumed; everything else in the
//! manifest belongs to vcpkg.

use serde::Deserialize;
use std::path::Path;

use crate::config::defaults::BASELINE_FIELD;
use crate::error::ManifestError;

#[derive(Debug, Deserialize)]
struct BaselineOnly {
    #[serde(rename = "builtin-baseline")]
    builtin_baseline: Option<String>,
}

/// Extract the pinned revision from manifest JSON
pub fn parse_pinned_revision(content: &str, path: &Path) -> Result<String, ManifestError> {
    let manifest: BaselineOnly =
        serde_json::from_str(content).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

    manifest
        .builtin_baseline
        .map(|baseline| baseline.trim().to_string())
        .filter(|baseline| !baseline.is_empty())
        .ok_or_else(|| ManifestError::MissingBaseline {
            path: path.to_path_buf(),
            field: BASELINE_FIELD.to_string(),
        })
}

/// Read the pinned revision from a manifest file
pub fn read_pinned_revision(path: &Path) -> Result<String, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    parse_pinned_revision(&content, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "name": "libdarknetpy",
        "version-string": "0.0.1",
        "builtin-baseline": "c8696863d371ab7f46e213d8f5ca923c4aef2a00",
        "dependencies": ["darknet", { "name": "opencv4", "default-features": false }]
    }"#;

    #[test]
    fn test_parse_baseline_ignores_other_fields() {
        let revision = parse_pinned_revision(MANIFEST, Path::new("vcpkg.json")).unwrap();
        assert_eq!(revision, "c8696863d371ab7f46e213d8f5ca923c4aef2a00");
    }

    #[test]
    fn test_missing_baseline() {
        let result = parse_pinned_revision(r#"{"name": "x"}"#, Path::new("vcpkg.json"));
        match result {
            Err(ManifestError::MissingBaseline { field, .. }) => {
                assert_eq!(field, "builtin-baseline");
            }
            other => panic!("Expected MissingBaseline, got: {other:?}"),
        }
    }

    #[test]
    fn test_empty_baseline_is_missing() {
        let result = parse_pinned_revision(r#"{"builtin-baseline": " "}"#, Path::new("vcpkg.json"));
        assert!(matches!(result, Err(ManifestError::MissingBaseline { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let result = parse_pinned_revision("{not json", Path::new("vcpkg.json"));
        assert!(matches!(result, Err(ManifestError::Parse { .. })));
    }

    #[test]
    fn test_read_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vcpkg.json");
        std::fs::write(&path, MANIFEST).unwrap();

        assert_eq!(
            read_pinned_revision(&path).unwrap(),
            "c8696863d371ab7f46e213d8f5ca923c4aef2a00"
        );
        assert!(matches!(
            read_pinned_revision(&temp.path().join("missing.json")),
            Err(ManifestError::Read { .. })
        ));
    }
}
