//! Import flattening: merging an ontology's imports closure into one document.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::info;

use crate::env::OntoEnv;
use crate::error::{Error, Result};
use crate::location::Location;
use crate::model::{iris, Document, Node, Statement};

/// How far and how cleanly to flatten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Keep merging until a pass adds nothing new.
    pub recursive: bool,
    /// Negative means unlimited, `0` leaves the document alone, a positive
    /// value performs exactly one pass.
    pub depth_limit: i64,
    /// Remove every `owl:imports` statement afterwards.
    pub strip_imports: bool,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            depth_limit: -1,
            strip_imports: true,
        }
    }
}

/// Returns the single ontology `doc` declares.
///
/// # Errors
///
/// Returns [`Error::MissingOntologyDeclaration`] or
/// [`Error::AmbiguousOntologyDeclaration`] unless exactly one exists.
pub fn root_ontology(doc: &Document) -> Result<String> {
    let mut subjects = doc.ontology_subjects();
    match subjects.len() {
        0 => Err(Error::MissingOntologyDeclaration),
        1 => Ok(subjects.remove(0)),
        _ => Err(Error::AmbiguousOntologyDeclaration { subjects }),
    }
}

impl OntoEnv {
    /// Merges the imports closure of `doc` into it, in place.
    ///
    /// Imports are looked up in the location index only; nothing is fetched.
    /// After merging, `sh:prefixes` objects are pointed at the root ontology
    /// and `sh:declare` subjects become the root ontology, so SHACL prefix
    /// declarations from imported documents keep working.
    ///
    /// # Errors
    ///
    /// Returns an error if `doc` does not declare exactly one ontology, and
    /// in strict mode if an import has no indexed definition or cannot be
    /// loaded.
    pub fn flatten(&mut self, doc: &mut Document, options: &FlattenOptions) -> Result<()> {
        let root = root_ontology(doc)?;
        if options.depth_limit == 0 {
            return Ok(());
        }

        let single_pass = options.depth_limit > 0 || !options.recursive;
        let mut merged = BTreeSet::from([root.clone()]);
        loop {
            let added = self.merge_imports_once(doc, &mut merged)?;
            if added == 0 || single_pass {
                break;
            }
        }

        let root = Node::iri(root);
        doc.rewrite(iris::SH_PREFIXES, |s| {
            (s.object != root)
                .then(|| Statement::new(s.subject.clone(), iris::SH_PREFIXES, root.clone()))
        });
        doc.rewrite(iris::SH_DECLARE, |s| {
            (s.subject != root)
                .then(|| Statement::new(root.clone(), iris::SH_DECLARE, s.object.clone()))
        });
        if options.strip_imports {
            doc.remove_predicate(iris::OWL_IMPORTS);
        }
        Ok(())
    }

    /// Merges every import of `doc` not yet in `merged`, one level deep.
    ///
    /// Returns how many imports were newly considered. An import without an
    /// index entry still counts, so the caller's loop terminates.
    ///
    /// # Errors
    ///
    /// In strict mode, returns the first missing or unloadable import.
    pub fn merge_imports_once(
        &mut self,
        doc: &mut Document,
        merged: &mut BTreeSet<String>,
    ) -> Result<usize> {
        let pending: Vec<String> = doc
            .imports()
            .into_iter()
            .filter(|uri| !merged.contains(uri))
            .collect();
        for uri in &pending {
            merged.insert(uri.clone());
            let Some(location) = self.index.lookup(uri).cloned() else {
                self.escalate(Error::MissingImportTarget { uri: uri.clone() })?;
                continue;
            };
            info!(uri, %location, "importing");
            match self.load_indexed(uri, &location) {
                Ok(imported) => doc.merge(imported),
                Err(err) => self.escalate(err)?,
            }
        }
        Ok(pending.len())
    }

    /// Parses `input`, flattens it, and writes the result to `output`.
    ///
    /// The output format follows the extension of `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` cannot be parsed, flattening fails, or
    /// `output` has an unsupported extension or cannot be written.
    pub fn flatten_file(
        &mut self,
        input: &Path,
        output: &Path,
        options: &FlattenOptions,
    ) -> Result<Document> {
        let mut doc = self.store.load(&Location::Local(input.to_path_buf()))?;
        self.flatten(&mut doc, options)?;
        self.store.write(&doc, output)?;
        info!(
            input = %input.display(),
            output = %output.display(),
            statements = doc.len(),
            "wrote flattened document"
        );
        Ok(doc)
    }
}
