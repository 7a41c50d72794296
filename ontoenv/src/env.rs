//! The environment context: one object owning every piece of state.
//!
//! [`OntoEnv`] holds the location index, the dependency graph, the document
//! store, the in-memory document cache, and the parse-failure set. The
//! scanner, resolver, refresh, and flattener are methods on it, defined in
//! their own modules.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::{find_root, Config, EnvPaths};
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::index::LocationIndex;
use crate::location::Location;
use crate::model::Document;
use crate::persist;
use crate::store::{Fetcher, HttpFetcher, OfflineFetcher, Store};

/// Timeout for a single remote fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings that `init` writes into `config.toml` when given.
#[derive(Debug, Clone, Default)]
pub struct InitSettings {
    /// Overrides `strict`.
    pub strict: Option<bool>,
    /// Overrides `offline`.
    pub offline: Option<bool>,
    /// Overrides the directory `refresh` scans.
    pub search_root: Option<PathBuf>,
}

impl InitSettings {
    fn is_empty(&self) -> bool {
        self.strict.is_none() && self.offline.is_none() && self.search_root.is_none()
    }

    fn apply(&self, config: &mut Config) {
        if let Some(strict) = self.strict {
            config.strict = strict;
        }
        if let Some(offline) = self.offline {
            config.offline = offline;
        }
        if let Some(root) = &self.search_root {
            config.search_root = Some(root.clone());
        }
    }
}

/// An opened ontology environment.
#[derive(Debug)]
pub struct OntoEnv {
    pub(crate) paths: EnvPaths,
    pub(crate) config: Config,
    pub(crate) index: LocationIndex,
    pub(crate) graph: DependencyGraph,
    pub(crate) store: Store,
    /// Parsed documents keyed by ontology URI.
    pub(crate) documents: HashMap<String, Document>,
    /// Locations that failed to parse in this process; never retried.
    pub(crate) failed: HashSet<Location>,
}

impl OntoEnv {
    /// Creates (or re-initializes) the environment under `root`.
    ///
    /// Directories are created as needed. The config is written when absent
    /// or when `settings` overrides something. If the mapping file did not
    /// exist yet, an initial [`refresh`](Self::refresh) runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be created, or if the
    /// initial refresh fails in strict mode.
    pub fn init(root: &Path, settings: &InitSettings) -> Result<Self> {
        let config = Self::prepare(root, settings)?;
        let fetcher = default_fetcher(&config);
        Self::init_inner(root, fetcher)
    }

    /// Like [`init`](Self::init) but fetching remote documents with `fetcher`.
    ///
    /// # Errors
    ///
    /// Same as [`init`](Self::init).
    pub fn init_with(
        root: &Path,
        settings: &InitSettings,
        fetcher: Box<dyn Fetcher>,
    ) -> Result<Self> {
        Self::prepare(root, settings)?;
        Self::init_inner(root, fetcher)
    }

    fn prepare(root: &Path, settings: &InitSettings) -> Result<Config> {
        let paths = EnvPaths::new(root);
        if paths.env_dir.exists() && !paths.env_dir.is_dir() {
            return Err(Error::InvalidEnvDirectory {
                path: paths.env_dir,
            });
        }
        fs::create_dir_all(&paths.cache_dir).map_err(|e| Error::io(&paths.cache_dir, e))?;

        let config_exists = paths.env_dir.join(crate::config::CONFIG_FILE).exists();
        let mut config = Config::load(&paths.env_dir)?;
        settings.apply(&mut config);
        if !config_exists || !settings.is_empty() {
            config.save(&paths.env_dir)?;
        }
        Ok(config)
    }

    fn init_inner(root: &Path, fetcher: Box<dyn Fetcher>) -> Result<Self> {
        let paths = EnvPaths::new(root);
        let created = !paths.mapping_file.exists();
        if created {
            persist::save_index(&paths.mapping_file, &LocationIndex::new())?;
            persist::save_graph(&paths.graph_file, &DependencyGraph::new())?;
        }
        let mut env = Self::open_with(root, fetcher)?;
        if created {
            info!(env = %env.paths.env_dir.display(), "initialized environment");
            env.refresh()?;
        }
        Ok(env)
    }

    /// Opens the existing environment under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if there is no environment there,
    /// or an error if its persisted state is unreadable.
    pub fn open(root: &Path) -> Result<Self> {
        let paths = EnvPaths::new(root);
        let config = Config::load(&paths.env_dir)?;
        Self::open_with(root, default_fetcher(&config))
    }

    /// Opens the existing environment under `root`, fetching with `fetcher`.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn open_with(root: &Path, fetcher: Box<dyn Fetcher>) -> Result<Self> {
        let root = fs::canonicalize(root).map_err(|e| Error::io(root, e))?;
        let paths = EnvPaths::new(&root);
        if !paths.env_dir.is_dir() || !paths.mapping_file.exists() {
            return Err(Error::NotInitialized {
                path: paths.env_dir,
            });
        }
        let config = Config::load(&paths.env_dir)?;
        let index = persist::load_index(&paths.mapping_file, &paths.cache_dir)?;
        let graph = persist::load_graph(&paths.graph_file)?;
        Ok(Self {
            paths,
            config,
            index,
            graph,
            store: Store::new(fetcher),
            documents: HashMap::new(),
            failed: HashSet::new(),
        })
    }

    /// Opens the environment in `start` or its nearest ancestor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if no ancestor has one.
    pub fn discover(start: &Path) -> Result<Self> {
        match find_root(start)? {
            Some(root) => Self::open(&root),
            None => Err(Error::NotInitialized {
                path: start.join(crate::config::ENV_DIR),
            }),
        }
    }

    /// The location index.
    #[must_use]
    pub fn index(&self) -> &LocationIndex {
        &self.index
    }

    /// The dependency graph.
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The environment's paths.
    #[must_use]
    pub fn paths(&self) -> &EnvPaths {
        &self.paths
    }

    /// Returns true if failures abort the current operation.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.config.strict
    }

    /// Switches strict mode for this session without touching `config.toml`.
    pub fn set_strict(&mut self, strict: bool) {
        self.config.strict = strict;
    }

    /// Directory scanned by [`refresh`](Self::refresh).
    #[must_use]
    pub fn search_root(&self) -> PathBuf {
        match &self.config.search_root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => self.paths.project_root().join(root),
            None => self.paths.project_root().to_path_buf(),
        }
    }

    /// Writes the location index and the dependency graph.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be written.
    pub fn save(&self) -> Result<()> {
        persist::save_index(&self.paths.mapping_file, &self.index)?;
        persist::save_graph(&self.paths.graph_file, &self.graph)
    }

    /// Applies the strict/lenient policy to a recoverable failure.
    ///
    /// # Errors
    ///
    /// Returns `err` unchanged in strict mode.
    pub(crate) fn escalate(&self, err: Error) -> Result<()> {
        if self.config.strict {
            error!(fatal = true, error = %err, "aborting");
            Err(err)
        } else {
            error!(error = %err, "skipping");
            Ok(())
        }
    }

    /// Drops index entries whose files vanished, and their graph nodes.
    ///
    /// Returns the removed URIs.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated state cannot be saved.
    pub fn prune(&mut self) -> Result<Vec<String>> {
        let removed = self.index.prune();
        if removed.is_empty() {
            return Ok(removed);
        }
        for uri in &removed {
            warn!(uri, "definition no longer exists; removing");
            self.graph.remove_node(uri);
            self.documents.remove(uri);
        }
        self.save()?;
        Ok(removed)
    }

    /// `uri => location` lines for every indexed ontology, sorted by URI.
    #[must_use]
    pub fn dump(&self) -> String {
        self.index
            .iter()
            .map(|(uri, location)| format!("{uri} => {location}\n"))
            .collect()
    }

    /// Renders the dependency tree below `root`, or below every root node.
    ///
    /// A `root` that is not itself a graph node falls back to its indexed
    /// location, which is where path-named nodes come from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if `root` matches nothing.
    pub fn dependency_tree(&self, root: Option<&str>) -> Result<String> {
        let roots = match root {
            None => self.graph.default_roots(),
            Some(node) if self.graph.contains(node) => vec![node.to_string()],
            Some(node) => match self.index.lookup(node).map(Location::as_persisted) {
                Some(path) if self.graph.contains(&path) => vec![path],
                _ => return Err(Error::UnknownNode(node.to_string())),
            },
        };
        Ok(self.graph.render_tree(&roots))
    }
}

fn default_fetcher(config: &Config) -> Box<dyn Fetcher> {
    if config.offline {
        return Box::new(OfflineFetcher);
    }
    match HttpFetcher::new(FETCH_TIMEOUT) {
        Ok(fetcher) => Box::new(fetcher),
        Err(e) => {
            warn!(error = %e, "HTTP client unavailable; working offline");
            Box::new(OfflineFetcher)
        }
    }
}
