//! Document store: turns locations into parsed [`Document`]s and back.
//!
//! - **Parsing** ([`parser`]) delegates to sophia's Turtle, N-Triples and RDF/XML parsers
//! - **Serialization** ([`serializer`]) writes Turtle or N-Triples
//! - **Fetching** ([`fetch`]) dereferences remote URIs behind the [`Fetcher`] trait

pub mod fetch;
pub mod parser;
pub mod serializer;

use std::cell::Cell;
use std::fs;
use std::path::Path;

use tracing::debug;

pub use fetch::{FetchError, Fetched, Fetcher, HttpFetcher, OfflineFetcher};

use crate::error::{Error, Result};
use crate::location::Location;
use crate::model::Document;

/// Concrete RDF syntaxes understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// Turtle 1.1 (also used for `.n3` files).
    Turtle,
    /// N-Triples.
    NTriples,
    /// RDF/XML.
    RdfXml,
}

impl RdfFormat {
    /// Guesses the format from a file name or URI by its extension.
    #[must_use]
    pub fn guess(name: &str) -> Option<Self> {
        let name = name.split(['?', '#']).next().unwrap_or(name);
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ttl" | "n3" | "turtle" => Some(RdfFormat::Turtle),
            "nt" | "ntriples" => Some(RdfFormat::NTriples),
            "rdf" | "owl" | "xml" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }

    /// Maps an HTTP `Content-Type` value to a format.
    #[must_use]
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "text/turtle" | "application/x-turtle" | "text/n3" | "text/rdf+n3" => {
                Some(RdfFormat::Turtle)
            }
            "application/n-triples" => Some(RdfFormat::NTriples),
            "application/rdf+xml" | "application/xml" | "text/xml" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }
}

/// Parses and serializes documents, fetching remote ones through a [`Fetcher`].
pub struct Store {
    fetcher: Box<dyn Fetcher>,
    parses: Cell<u64>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("parses", &self.parses.get())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Creates a store that fetches remote documents with `fetcher`.
    pub fn new(fetcher: Box<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            parses: Cell::new(0),
        }
    }

    /// Loads and parses the document at `location`.
    ///
    /// Unknown file extensions are parsed as RDF/XML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a local file cannot be read,
    /// [`Error::Resolution`] if a remote fetch fails, and [`Error::Parse`] if
    /// the bytes are not valid RDF.
    pub fn load(&self, location: &Location) -> Result<Document> {
        match location {
            Location::Local(path) | Location::Cached(path) => {
                let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
                let name = path.display().to_string();
                let format = RdfFormat::guess(&name).unwrap_or(RdfFormat::RdfXml);
                self.parse(&bytes, format, &name)
            }
            Location::Remote(uri) => {
                let fetched = self
                    .fetcher
                    .fetch(uri)
                    .map_err(|source| Error::fetch(uri.as_str(), source))?;
                let format = fetched
                    .content_type
                    .as_deref()
                    .and_then(RdfFormat::from_media_type)
                    .or_else(|| RdfFormat::guess(uri))
                    .unwrap_or(RdfFormat::RdfXml);
                self.parse(&fetched.bytes, format, uri)
            }
        }
    }

    /// Parses `bytes`; `label` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the bytes are not valid RDF in `format`.
    pub fn parse(&self, bytes: &[u8], format: RdfFormat, label: &str) -> Result<Document> {
        let n = self.parses.get();
        self.parses.set(n + 1);
        debug!(location = label, ?format, "parsing");
        parser::parse(bytes, format, &format!("b{n}_")).map_err(|message| Error::Parse {
            location: label.to_string(),
            message,
        })
    }

    /// Serializes `doc` to `path` in the format implied by its extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for anything but Turtle and
    /// N-Triples, and [`Error::Io`] if the file cannot be written.
    pub fn write(&self, doc: &Document, path: &Path) -> Result<()> {
        let name = path.display().to_string();
        let content = match RdfFormat::guess(&name) {
            Some(RdfFormat::Turtle) => serializer::to_turtle(doc),
            Some(RdfFormat::NTriples) => serializer::to_ntriples(doc),
            _ => return Err(Error::UnsupportedFormat(name)),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(path, content).map_err(|e| Error::io(path, e))
    }
}
