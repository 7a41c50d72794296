//! URI resolver: index first, then the local file system, then the network.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::env::OntoEnv;
use crate::error::{Error, Result};
use crate::location::{cache_file_name, Location};
use crate::model::Document;

impl OntoEnv {
    /// Produces the document for `uri` together with where it came from.
    ///
    /// Lookup order:
    ///
    /// 1. an indexed URI whose document is already parsed is returned as is
    /// 2. an indexed URI is parsed from its recorded location
    /// 3. a string naming an existing file is parsed from that file
    /// 4. anything else is fetched, written to the cache as Turtle, and
    ///    indexed as [`Location::Cached`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolution`] if no step produces a document, and an
    /// I/O or persistence error if the write-through fails.
    pub fn resolve(&mut self, uri: &str) -> Result<(Document, Location)> {
        if let Some(location) = self.index.lookup(uri).cloned() {
            let doc = self.load_indexed(uri, &location)?;
            return Ok((doc, location));
        }

        let path = Path::new(uri);
        if path.is_file() {
            let location = Location::Local(path.to_path_buf());
            let doc = self.load_once(uri, &location)?;
            return Ok((doc, location));
        }

        let remote = Location::Remote(uri.to_string());
        info!(uri, "fetching");
        let doc = self.load_once(uri, &remote)?;

        fs::create_dir_all(&self.paths.cache_dir)
            .map_err(|e| Error::io(&self.paths.cache_dir, e))?;
        let cached = self.paths.cache_dir.join(cache_file_name(uri));
        self.store.write(&doc, &cached)?;
        let location = Location::Cached(cached);
        info!(uri, %location, "cached");
        self.index.record(uri, location.clone());
        self.documents.insert(uri.to_string(), doc.clone());
        self.save()?;
        Ok((doc, location))
    }

    /// Returns the document indexed at `location` for `uri`, parsing it at
    /// most once per process.
    pub(crate) fn load_indexed(&mut self, uri: &str, location: &Location) -> Result<Document> {
        if let Some(doc) = self.documents.get(uri) {
            debug!(uri, "document cache hit");
            return Ok(doc.clone());
        }
        let doc = self.load_once(uri, location)?;
        self.documents.insert(uri.to_string(), doc.clone());
        Ok(doc)
    }

    /// Loads `location`, remembering failures so they are not retried.
    fn load_once(&mut self, uri: &str, location: &Location) -> Result<Document> {
        if self.failed.contains(location) {
            return Err(Error::Resolution {
                uri: uri.to_string(),
                cause: format!("{location} previously failed to load"),
                source: None,
            });
        }
        self.store.load(location).map_err(|err| {
            self.failed.insert(location.clone());
            match err {
                Error::Resolution { .. } => err,
                other => Error::Resolution {
                    uri: uri.to_string(),
                    cause: other.to_string(),
                    source: None,
                },
            }
        })
    }
}
