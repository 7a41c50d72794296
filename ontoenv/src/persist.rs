//! Reading and writing `mapping.json` and `dependencies.json`.
//!
//! Both files are rewritten in full on every save. Each write goes to a
//! sibling temporary file that is then renamed over the target, so a crash
//! mid-write leaves the previous version intact.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{DependencyGraph, PersistedGraph};
use crate::index::LocationIndex;

/// Loads the location index; a missing file is an empty index.
///
/// # Errors
///
/// Returns an error if the file exists but is unreadable or malformed.
pub fn load_index(path: &Path, cache_dir: &Path) -> Result<LocationIndex> {
    let raw: BTreeMap<String, String> = read_json(path)?.unwrap_or_default();
    Ok(LocationIndex::from_persisted(raw, cache_dir))
}

/// Writes the location index.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_index(path: &Path, index: &LocationIndex) -> Result<()> {
    write_json(path, &index.to_persisted())
}

/// Loads the dependency graph; a missing file is an empty graph.
///
/// # Errors
///
/// Returns an error if the file exists but is unreadable or malformed.
pub fn load_graph(path: &Path) -> Result<DependencyGraph> {
    let persisted: PersistedGraph = read_json(path)?.unwrap_or_default();
    Ok(DependencyGraph::from_persisted(persisted))
}

/// Writes the dependency graph.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_graph(path: &Path, graph: &DependencyGraph) -> Result<()> {
    write_json(path, &graph.to_persisted())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    #[test]
    fn missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = load_index(&dir.path().join("mapping.json"), dir.path()).unwrap();
        let graph = load_graph(&dir.path().join("dependencies.json")).unwrap();
        assert!(index.is_empty());
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn index_file_is_flat_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        let mut index = LocationIndex::new();
        index.record("urn:a", Location::Local(dir.path().join("a.ttl")));
        save_index(&path, &index).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["urn:a"].as_str().unwrap().ends_with("a.ttl"));
        assert_eq!(load_index(&path, &dir.path().join("cache")).unwrap(), index);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn graph_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dependencies.json");
        let mut graph = DependencyGraph::new();
        graph.add_edge("urn:a", "urn:b");
        graph.add_edge("urn:b", "urn:a");
        save_graph(&path, &graph).unwrap();
        assert_eq!(load_graph(&path).unwrap(), graph);
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_index(&path, dir.path()).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        assert!(err.to_string().contains("mapping.json"));
    }
}
