//! YAML documents under `.pieces/`: the config, the catalog and one manifest
//! per piece.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Parse the document at `path`. `Ok(None)` when no such file exists.
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_yaml::from_str(&data)?))
}

/// Serialize `value` and swap it into place with a single rename, so a
/// reader sees either the previous document or the new one.
pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_yaml::to_string(value)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::debug!(path = %path.display(), bytes = data.len(), "wrote document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PiecesError;
    use crate::types::Tier;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn missing_document_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let read: Option<BTreeMap<String, Tier>> =
            read_yaml(&dir.path().join("catalog.yaml")).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn write_creates_parents_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".pieces/pieces/week-1/manifest.yaml");

        let mut tiers = BTreeMap::new();
        tiers.insert("p1".to_string(), Tier::Low);
        write_yaml(&path, &tiers).unwrap();
        tiers.insert("p2".to_string(), Tier::High);
        write_yaml(&path, &tiers).unwrap();

        let read: BTreeMap<String, Tier> = read_yaml(&path).unwrap().unwrap();
        assert_eq!(read, tiers);
        // Only the manifest is left behind, no temp files.
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn malformed_document_is_a_yaml_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "default_total: [unterminated").unwrap();
        let err = read_yaml::<BTreeMap<String, u64>>(&path).unwrap_err();
        assert!(matches!(err, PiecesError::Yaml(_)));
    }
}
