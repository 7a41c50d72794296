//! Error type shared by every ontoenv operation.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::FetchError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while resolving, caching, or flattening.
#[derive(Debug, Error)]
pub enum Error {
    /// A document's bytes could not be interpreted as RDF.
    #[error("could not parse {location}: {message}")]
    Parse {
        /// Path or URI of the offending document.
        location: String,
        /// Parser diagnostic.
        message: String,
    },

    /// A URI has no local definition and could not be fetched.
    #[error("could not resolve {uri}: {cause}")]
    Resolution {
        /// The URI being resolved.
        uri: String,
        /// Underlying fetch or parse failure.
        cause: String,
        /// The fetch failure, when the network was the problem.
        #[source]
        source: Option<FetchError>,
    },

    /// A document handed to the flattener declares no `owl:Ontology`.
    #[error("document does not declare an owl:Ontology")]
    MissingOntologyDeclaration,

    /// A document handed to the flattener declares several `owl:Ontology` subjects.
    #[error("document declares {} ontologies ({}); expected exactly one", .subjects.len(), .subjects.join(", "))]
    AmbiguousOntologyDeclaration {
        /// Every declared ontology IRI.
        subjects: Vec<String>,
    },

    /// An imported URI has no entry in the location index.
    #[error("could not load {uri} (no definition found)")]
    MissingImportTarget {
        /// The imported URI.
        uri: String,
    },

    /// No environment directory exists where one was expected.
    #[error("no .ontoenv directory at {}; be sure to run `ontoenv init`", .path.display())]
    NotInitialized {
        /// Expected location of the environment directory.
        path: PathBuf,
    },

    /// `.ontoenv` exists but is not a directory.
    #[error(".ontoenv ({}) must be a directory", .path.display())]
    InvalidEnvDirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The requested serialization format is not supported.
    #[error("unsupported output format for {0}")]
    UnsupportedFormat(String),

    /// A node named on the command line is not in the dependency graph.
    #[error("{0} is not in the dependency graph")]
    UnknownNode(String),

    /// File system failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A persisted JSON file could not be read or written.
    #[error("malformed JSON in {}: {source}", .path.display())]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The environment config could not be parsed.
    #[error("invalid config {}: {source}", .path.display())]
    ConfigRead {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// The environment config could not be serialized.
    #[error("could not serialize config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

impl Error {
    /// Builds an [`Error::Resolution`] from a failed fetch of `uri`.
    pub fn fetch(uri: impl Into<String>, source: FetchError) -> Self {
        Error::Resolution {
            uri: uri.into(),
            cause: source.to_string(),
            source: Some(source),
        }
    }

    /// Builds an [`Error::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
