//! Rebuilding the index and dependency graph from a corpus.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use crate::env::OntoEnv;
use crate::error::Result;
use crate::location::Location;
use crate::walk::find_ontology_files;

/// What a refresh found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Ontology files discovered under the search root.
    pub files: usize,
    /// URIs dropped because their file disappeared.
    pub pruned: Vec<String>,
    /// Indexed ontologies after the refresh.
    pub ontologies: usize,
    /// Graph nodes after the refresh.
    pub nodes: usize,
    /// Graph edges after the refresh.
    pub edges: usize,
}

impl OntoEnv {
    /// Refreshes from the configured search root.
    ///
    /// # Errors
    ///
    /// See [`refresh_all`](Self::refresh_all).
    pub fn refresh(&mut self) -> Result<RefreshSummary> {
        let root = self.search_root();
        self.refresh_all(&root)
    }

    /// Rescans every ontology file under `root` and rebuilds the graph.
    ///
    /// Parsed documents held from earlier calls are dropped, so edits made
    /// since then are seen. Stale index entries are pruned first. Every
    /// discovered file is then scanned, and the imports closure of each file is walked, fetching
    /// and caching whatever the corpus does not define.
    ///
    /// # Errors
    ///
    /// In strict mode, returns the first parse or resolution failure. In
    /// either mode, returns an error if persisted state cannot be written.
    pub fn refresh_all(&mut self, root: &Path) -> Result<RefreshSummary> {
        self.documents.clear();
        let pruned = self.prune()?;

        let files = find_ontology_files(root, &self.config.extensions);
        info!(count = files.len(), root = %root.display(), "found ontology files");
        for file in &files {
            self.scan(&Location::Local(file.clone()))?;
        }

        let mut visited = HashSet::new();
        for file in &files {
            let location = Location::Local(file.clone());
            if self.failed.contains(&location) {
                continue;
            }
            let mut starts = self.index.uris_at(&location);
            if starts.is_empty() {
                starts.push(file.display().to_string());
            }
            for start in starts {
                self.resolve_imports_from(&start, &mut visited)?;
            }
        }
        self.save()?;

        Ok(RefreshSummary {
            files: files.len(),
            pruned,
            ontologies: self.index.len(),
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
        })
    }

    /// Walks the imports closure of `start`, recording an edge for every
    /// declared import.
    ///
    /// Nodes already in `visited` are skipped, which terminates cycles. Each
    /// visited node has its outgoing edges replaced by those observed now.
    /// A node that cannot be resolved keeps no outgoing edges.
    ///
    /// # Errors
    ///
    /// In strict mode, returns the first resolution failure.
    pub fn resolve_imports_from(
        &mut self,
        start: &str,
        visited: &mut HashSet<String>,
    ) -> Result<()> {
        let mut stack = vec![start.to_string()];
        while let Some(node) = stack.pop() {
            if !visited.insert(node.clone()) {
                debug!(node, "already visited");
                continue;
            }
            info!(node, "resolving imports");
            self.graph.clear_edges_from(&node);

            let (doc, location) = match self.resolve(&node) {
                Ok(found) => found,
                Err(err) => {
                    self.save()?;
                    self.escalate(err)?;
                    continue;
                }
            };
            self.scan(&location)?;

            let imports = doc.imports();
            let is_path = Path::new(&node).is_file();
            if !is_path || !imports.is_empty() {
                self.graph.add_node(node.clone());
            }
            for import in &imports {
                self.graph.add_edge(node.clone(), import.clone());
            }
            self.save()?;
            stack.extend(imports.into_iter().rev());
        }
        Ok(())
    }
}
