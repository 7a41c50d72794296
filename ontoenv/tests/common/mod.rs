//! Shared fixtures: scratch corpora and an in-memory fetcher.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ontoenv::{FetchError, Fetched, Fetcher, InitSettings, OfflineFetcher, OntoEnv};

pub const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
pub const OWL_IMPORTS: &str = "http://www.w3.org/2002/07/owl#imports";

/// Turtle for an ontology `uri` importing each of `imports`, plus a label
/// statement so its content is recognizable after merging.
pub fn ontology(uri: &str, imports: &[&str]) -> String {
    let mut ttl = format!("<{uri}> a <{OWL_ONTOLOGY}> .\n");
    for import in imports {
        ttl.push_str(&format!("<{uri}> <{OWL_IMPORTS}> <{import}> .\n"));
    }
    ttl.push_str(&format!("<{uri}#thing> <urn:test:from> \"{uri}\" .\n"));
    ttl
}

/// Writes `content` to `dir/name`, creating parent directories.
pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Canonical form of a scratch path, matching what the environment records.
pub fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap()
}

/// Initializes a lenient environment over `dir` that never touches the network.
pub fn init_offline(dir: &Path) -> OntoEnv {
    OntoEnv::init_with(dir, &InitSettings::default(), Box::new(OfflineFetcher)).unwrap()
}

/// Serves fixed Turtle bodies and counts every fetch attempt.
pub struct CountingFetcher {
    bodies: HashMap<String, String>,
    count: Rc<Cell<usize>>,
}

impl CountingFetcher {
    /// Returns the fetcher and a handle to its counter.
    pub fn new(bodies: &[(&str, String)]) -> (Self, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        let fetcher = Self {
            bodies: bodies
                .iter()
                .map(|(uri, body)| (uri.to_string(), body.clone()))
                .collect(),
            count: Rc::clone(&count),
        };
        (fetcher, count)
    }
}

impl Fetcher for CountingFetcher {
    fn fetch(&self, uri: &str) -> Result<Fetched, FetchError> {
        self.count.set(self.count.get() + 1);
        self.bodies
            .get(uri)
            .map(|body| Fetched {
                bytes: body.clone().into_bytes(),
                content_type: Some("text/turtle".to_string()),
            })
            .ok_or_else(|| FetchError::Status {
                uri: uri.to_string(),
                status: 404,
            })
    }
}
