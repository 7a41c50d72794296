//! Location index: ontology URI → physical location.

use std::collections::BTreeMap;
use std::path::Path;

use crate::location::Location;

/// Maps each known ontology URI to the single location that defines it.
///
/// Recording a URI twice keeps the last location; two files declaring the
/// same ontology are not reconciled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationIndex {
    entries: BTreeMap<String, Location>,
}

impl LocationIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an index from its persisted `uri → path` form.
    #[must_use]
    pub fn from_persisted(raw: BTreeMap<String, String>, cache_dir: &Path) -> Self {
        let entries = raw
            .into_iter()
            .map(|(uri, path)| (uri, Location::from_persisted(path, cache_dir)))
            .collect();
        Self { entries }
    }

    /// The persisted `uri → path` form.
    #[must_use]
    pub fn to_persisted(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(uri, location)| (uri.clone(), location.as_persisted()))
            .collect()
    }

    /// Looks up the location recorded for `uri`.
    #[must_use]
    pub fn lookup(&self, uri: &str) -> Option<&Location> {
        self.entries.get(uri)
    }

    /// Records `location` for `uri`. Returns true if the mapping changed.
    pub fn record(&mut self, uri: impl Into<String>, location: Location) -> bool {
        let uri = uri.into();
        if self.entries.get(&uri) == Some(&location) {
            return false;
        }
        self.entries.insert(uri, location);
        true
    }

    /// Returns true if some URI is recorded at `location`.
    #[must_use]
    pub fn contains_location(&self, location: &Location) -> bool {
        self.entries.values().any(|l| l == location)
    }

    /// Every URI recorded at `location`, in sorted order.
    #[must_use]
    pub fn uris_at(&self, location: &Location) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, l)| *l == location)
            .map(|(uri, _)| uri.clone())
            .collect()
    }

    /// Removes every entry whose file no longer exists; returns the removed URIs.
    pub fn prune(&mut self) -> Vec<String> {
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, location)| !location.exists())
            .map(|(uri, _)| uri.clone())
            .collect();
        for uri in &stale {
            self.entries.remove(uri);
        }
        stale
    }

    /// Iterates `(uri, location)` pairs in URI order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Location)> {
        self.entries.iter().map(|(uri, l)| (uri.as_str(), l))
    }

    /// Number of indexed URIs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
