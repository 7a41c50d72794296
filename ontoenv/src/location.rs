//! Physical locations of ontology documents.

use std::fmt;
use std::path::{Path, PathBuf};

/// Where the bytes of an ontology document live.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    /// A file in the scanned corpus.
    Local(PathBuf),
    /// A materialized copy of a remote document inside the cache directory.
    Cached(PathBuf),
    /// A URI that has not yet been fetched.
    Remote(String),
}

impl Location {
    /// Classifies a persisted path: anything under `cache_dir` is `Cached`.
    pub fn from_persisted(path: impl Into<PathBuf>, cache_dir: &Path) -> Self {
        let path = path.into();
        if path.starts_with(cache_dir) {
            Location::Cached(path)
        } else {
            Location::Local(path)
        }
    }

    /// Returns the on-disk path, or `None` for a remote location.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Location::Local(path) | Location::Cached(path) => Some(path),
            Location::Remote(_) => None,
        }
    }

    /// Returns true if the location is on disk and the file still exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path().map(Path::is_file).unwrap_or(false)
    }

    /// The string form written to the mapping file.
    #[must_use]
    pub fn as_persisted(&self) -> String {
        match self {
            Location::Local(path) | Location::Cached(path) => path.display().to_string(),
            Location::Remote(uri) => uri.clone(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_persisted())
    }
}

/// Derives the cache file name for a remote URI.
///
/// Every character outside `[A-Za-z0-9._-]` becomes `_` and `.ttl` is appended,
/// so `http://example.org/onto#` maps to `http___example.org_onto_.ttl`.
#[must_use]
pub fn cache_file_name(uri: &str) -> String {
    let mut name: String = uri
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    name.push_str(".ttl");
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_file_name_substitutes_separators_and_colons() {
        assert_eq!(
            cache_file_name("http://example.org/onto#"),
            "http___example.org_onto_.ttl"
        );
        assert_eq!(cache_file_name("urn:x:y"), "urn_x_y.ttl");
    }

    #[test]
    fn cache_file_name_is_deterministic() {
        let uri = "https://w3id.org/rec/core/";
        assert_eq!(cache_file_name(uri), cache_file_name(uri));
        assert!(!cache_file_name(uri).contains('/'));
    }

    #[test]
    fn persisted_paths_under_cache_are_cached() {
        let cache = Path::new("/proj/.ontoenv/cache");
        assert_eq!(
            Location::from_persisted("/proj/.ontoenv/cache/a.ttl", cache),
            Location::Cached(PathBuf::from("/proj/.ontoenv/cache/a.ttl"))
        );
        assert_eq!(
            Location::from_persisted("/proj/models/a.ttl", cache),
            Location::Local(PathBuf::from("/proj/models/a.ttl"))
        );
    }

    #[test]
    fn remote_locations_never_exist_on_disk() {
        assert!(!Location::Remote("http://example.org/".into()).exists());
        assert!(Location::Remote("http://example.org/".into()).path().is_none());
    }
}
