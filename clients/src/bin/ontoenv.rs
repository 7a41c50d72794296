//! `ontoenv`: manages an ontology environment for a directory of ontology files.
//!
//! **Commands:**
//! - `init [--strict]`: create `.ontoenv/` and index the corpus
//! - `refresh`: rescan the corpus and re-resolve every imports closure
//! - `dump`: print `uri => location` for every indexed ontology
//! - `deps [root]`: print the dependency tree
//! - `import <input> <output>`: write `input` with its imports merged in
//! - `output [file]`: write the dependency graph as Graphviz DOT
//!
//! **Usage:**
//! ```
//! ontoenv [-v...] [--dir <path>] [--offline] <command>
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use ontoenv::{find_root, FlattenOptions, InitSettings, OfflineFetcher, OntoEnv};
use tracing_subscriber::EnvFilter;

/// Resolve, cache, and flatten ontology imports.
#[derive(Parser)]
#[command(name = "ontoenv", version, about = "Manage an ontology environment")]
struct Args {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding (or below) the environment.
    #[arg(long, default_value = ".", global = true)]
    dir: PathBuf,

    /// Never fetch remote documents.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the environment and index the corpus.
    Init {
        /// Abort on the first parse or resolution failure.
        #[arg(long)]
        strict: bool,
    },
    /// Rescan the corpus and rebuild the dependency graph.
    Refresh,
    /// Print every indexed ontology and its location.
    Dump,
    /// Print the dependency tree below `root`, or below every root node.
    Deps {
        /// Ontology URI or file path to start from.
        root: Option<String>,
    },
    /// Merge the imports closure of a document into a single output file.
    Import {
        /// Document to flatten.
        input: PathBuf,
        /// Output file; `.ttl` or `.nt`.
        output: PathBuf,
        /// Merge direct imports only.
        #[arg(long)]
        no_recursive: bool,
        /// Merge passes to perform; negative means unlimited.
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        depth: i64,
        /// Keep `owl:imports` statements in the output.
        #[arg(long)]
        keep_imports: bool,
    },
    /// Write the dependency graph as Graphviz DOT.
    Output {
        /// Destination file.
        #[arg(default_value = "dependencies.dot")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Init { strict } => {
            let settings = InitSettings {
                strict: strict.then_some(true),
                offline: args.offline.then_some(true),
                search_root: None,
            };
            fs::create_dir_all(&args.dir)
                .with_context(|| format!("Failed to create {}", args.dir.display()))?;
            let env = OntoEnv::init(&args.dir, &settings).context("Failed to initialize")?;
            println!(
                "Initialized {} ({} ontologies)",
                env.paths().env_dir.display(),
                env.index().len()
            );
        }
        Command::Refresh => {
            let mut env = open(&args.dir, args.offline)?;
            let summary = env.refresh().context("Refresh failed")?;
            for uri in &summary.pruned {
                println!("  Removed: {uri}");
            }
            println!(
                "Scanned {} files: {} ontologies, {} dependencies",
                summary.files, summary.ontologies, summary.edges
            );
        }
        Command::Dump => {
            let env = open(&args.dir, args.offline)?;
            print!("{}", env.dump());
        }
        Command::Deps { root } => {
            let env = open(&args.dir, args.offline)?;
            let tree = env.dependency_tree(root.as_deref())?;
            println!(
                "{} = dependencies listed elsewhere in this tree",
                ontoenv::DUPLICATE_MARKER
            );
            print!("{tree}");
        }
        Command::Import {
            input,
            output,
            no_recursive,
            depth,
            keep_imports,
        } => {
            let mut env = open(&args.dir, args.offline)?;
            let options = FlattenOptions {
                recursive: !no_recursive,
                depth_limit: depth,
                strip_imports: !keep_imports,
            };
            let doc = env
                .flatten_file(&input, &output, &options)
                .with_context(|| format!("Failed to flatten {}", input.display()))?;
            println!("  Written: {} ({} statements)", output.display(), doc.len());
        }
        Command::Output { file } => {
            let env = open(&args.dir, args.offline)?;
            fs::write(&file, env.graph().to_dot())
                .with_context(|| format!("Failed to write {}", file.display()))?;
            println!("  Written: {}", file.display());
        }
    }
    Ok(())
}

/// Opens the environment at `dir` or its nearest ancestor.
fn open(dir: &Path, offline: bool) -> Result<OntoEnv> {
    let root = find_root(dir)?.ok_or_else(|| ontoenv::Error::NotInitialized {
        path: dir.join(ontoenv::config::ENV_DIR),
    })?;
    let env = if offline {
        OntoEnv::open_with(&root, Box::new(OfflineFetcher))
    } else {
        OntoEnv::open(&root)
    };
    env.with_context(|| format!("Failed to open environment at {}", root.display()))
}

/// Logs to stderr; `RUST_LOG` overrides the `-v` level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
