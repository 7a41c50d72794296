//! Definition scanner: records which ontologies a document declares.

use tracing::{debug, info};

use crate::env::OntoEnv;
use crate::error::Result;
use crate::location::Location;

impl OntoEnv {
    /// Parses the document at `location` and indexes every ontology it declares.
    ///
    /// Does nothing if the location is already indexed or failed to parse
    /// earlier in this process. Returns the URIs newly recorded.
    ///
    /// # Errors
    ///
    /// In strict mode, returns the parse or read failure. In lenient mode the
    /// failure is logged and an empty list returned.
    pub fn scan(&mut self, location: &Location) -> Result<Vec<String>> {
        if self.index.contains_location(location) {
            debug!(%location, "already indexed");
            return Ok(Vec::new());
        }
        if self.failed.contains(location) {
            debug!(%location, "previously failed to parse");
            return Ok(Vec::new());
        }

        let doc = match self.store.load(location) {
            Ok(doc) => doc,
            Err(err) => {
                self.failed.insert(location.clone());
                self.escalate(err)?;
                return Ok(Vec::new());
            }
        };

        let uris = doc.ontology_subjects();
        for uri in &uris {
            info!(uri, %location, "found ontology");
            self.index.record(uri.clone(), location.clone());
            self.documents.insert(uri.clone(), doc.clone());
        }
        if !uris.is_empty() {
            self.save()?;
        }
        Ok(uris)
    }
}
