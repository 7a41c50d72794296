//! Ontology environment: resolves, caches, and flattens `owl:imports`.
//!
//! An environment lives in a `.ontoenv` directory beside a corpus of
//! ontology files. It keeps a location index (which file defines which
//! ontology URI), a dependency graph of declared imports, and a cache of
//! remote documents fetched while walking imports closures.
//!
//! # Entry Point
//!
//! ```no_run
//! use std::path::Path;
//! use ontoenv::{FlattenOptions, InitSettings, OntoEnv};
//!
//! # fn main() -> ontoenv::Result<()> {
//! let mut env = OntoEnv::init(Path::new("."), &InitSettings::default())?;
//! env.refresh()?;
//! print!("{}", env.dump());
//! env.flatten_file(
//!     Path::new("brick.ttl"),
//!     Path::new("brick-flat.ttl"),
//!     &FlattenOptions::default(),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! # Failure policy
//!
//! In strict mode the first parse or resolution failure aborts the current
//! operation. Otherwise failures are logged through `tracing` and the
//! affected document or import is skipped.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod env;
pub mod error;
pub mod flatten;
pub mod graph;
pub mod index;
pub mod location;
pub mod model;
pub mod persist;
pub mod refresh;
mod resolver;
mod scanner;
pub mod store;
pub mod walk;

pub use config::{find_root, Config, EnvPaths};
pub use env::{InitSettings, OntoEnv};
pub use error::{Error, Result};
pub use flatten::{root_ontology, FlattenOptions};
pub use graph::{DependencyGraph, DUPLICATE_MARKER};
pub use index::LocationIndex;
pub use location::{cache_file_name, Location};
pub use model::{iris, Document, Literal, Node, Statement};
pub use refresh::RefreshSummary;
pub use store::{FetchError, Fetched, Fetcher, HttpFetcher, OfflineFetcher, RdfFormat, Store};
