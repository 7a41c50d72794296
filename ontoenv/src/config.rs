//! Environment directory layout and `config.toml`.
//!
//! ```text
//! <project>/
//!   .ontoenv/
//!     config.toml          ← strict/offline flags, extensions, search root
//!     mapping.json         ← location index
//!     dependencies.json    ← dependency graph
//!     cache/               ← materialized remote documents
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the environment directory.
pub const ENV_DIR: &str = ".ontoenv";
/// Config file inside the environment directory.
pub const CONFIG_FILE: &str = "config.toml";
/// Location index file inside the environment directory.
pub const MAPPING_FILE: &str = "mapping.json";
/// Dependency graph file inside the environment directory.
pub const GRAPH_FILE: &str = "dependencies.json";
/// Cache directory inside the environment directory.
pub const CACHE_DIR: &str = "cache";

/// File extensions recognized as ontology documents.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".ttl", ".rdf", ".owl", ".n3", ".ntriples", ".nt"];

/// Persisted environment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Abort on the first parse or resolution failure instead of logging it.
    pub strict: bool,
    /// Never touch the network; unresolved URIs fail immediately.
    pub offline: bool,
    /// Extensions (with leading dot) that mark a file as an ontology document.
    pub extensions: Vec<String>,
    /// Directory scanned by `refresh`; defaults to the parent of `.ontoenv`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: false,
            offline: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            search_root: None,
        }
    }
}

impl Config {
    /// Reads `config.toml` from `env_dir`, falling back to defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(env_dir: &Path) -> Result<Self> {
        let path = env_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        toml::from_str(&text).map_err(|source| Error::ConfigRead { path, source })
    }

    /// Writes `config.toml` into `env_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, env_dir: &Path) -> Result<()> {
        let path = env_dir.join(CONFIG_FILE);
        let text = toml::to_string_pretty(self)?;
        fs::write(&path, text).map_err(|e| Error::io(&path, e))
    }
}

/// Resolved paths of one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvPaths {
    /// The `.ontoenv` directory itself.
    pub env_dir: PathBuf,
    /// Where materialized remote documents go.
    pub cache_dir: PathBuf,
    /// The location index file.
    pub mapping_file: PathBuf,
    /// The dependency graph file.
    pub graph_file: PathBuf,
}

impl EnvPaths {
    /// Paths for the environment rooted at `root`.
    ///
    /// `root` may be the project directory or the `.ontoenv` directory itself.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        let env_dir = if root.file_name().map(|n| n == ENV_DIR).unwrap_or(false) {
            root.to_path_buf()
        } else {
            root.join(ENV_DIR)
        };
        Self {
            cache_dir: env_dir.join(CACHE_DIR),
            mapping_file: env_dir.join(MAPPING_FILE),
            graph_file: env_dir.join(GRAPH_FILE),
            env_dir,
        }
    }

    /// The project directory that contains `.ontoenv`.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        self.env_dir.parent().unwrap_or(&self.env_dir)
    }
}

/// Walks upward from `start` to the nearest directory containing `.ontoenv`.
///
/// Relative paths are resolved against the current directory first, so `.`
/// finds an environment in any ancestor of the working directory. Returns
/// `Ok(None)` if the file system root is reached without a match.
///
/// # Errors
///
/// Returns an error if `start` cannot be canonicalized, or
/// [`Error::InvalidEnvDirectory`] if a `.ontoenv` entry exists but is not a
/// directory.
pub fn find_root(start: &Path) -> Result<Option<PathBuf>> {
    let start = fs::canonicalize(start).map_err(|e| Error::io(start, e))?;
    for dir in start.ancestors() {
        let candidate = dir.join(ENV_DIR);
        if candidate.exists() {
            if !candidate.is_dir() {
                return Err(Error::InvalidEnvDirectory { path: candidate });
            }
            return Ok(Some(dir.to_path_buf()));
        }
    }
    Ok(None)
}
