//! Corpus refresh: indexing, graph construction, pruning, and failure policy.

mod common;

use std::fs;

use common::{canonical, init_offline, ontology, write};
use ontoenv::{
    Error, FlattenOptions, InitSettings, Location, Node, OfflineFetcher, OntoEnv, DUPLICATE_MARKER,
};

/// A chain `a → b → c` where `c` exists nowhere: the declared edge to `c`
/// is still recorded, and `c` never enters the index.
#[test]
fn unresolvable_import_keeps_its_edge() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ttl", &ontology("urn:a", &["urn:b"]));
    write(dir.path(), "b.ttl", &ontology("urn:b", &["urn:c"]));

    let env = init_offline(dir.path());

    let root = canonical(dir.path());
    assert_eq!(
        env.index().lookup("urn:a"),
        Some(&Location::Local(root.join("a.ttl")))
    );
    assert_eq!(
        env.index().lookup("urn:b"),
        Some(&Location::Local(root.join("b.ttl")))
    );
    assert!(env.index().lookup("urn:c").is_none());
    assert!(env.graph().has_edge("urn:a", "urn:b"));
    assert!(env.graph().has_edge("urn:b", "urn:c"));
    assert_eq!(env.graph().edges_from("urn:c").count(), 0);
}

/// Running refresh twice over an unchanged corpus leaves both persisted
/// files byte-identical.
#[test]
fn refresh_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ttl", &ontology("urn:a", &["urn:b", "urn:x"]));
    write(dir.path(), "nested/b.ttl", &ontology("urn:b", &[]));

    let mut env = init_offline(dir.path());
    let mapping = fs::read_to_string(&env.paths().mapping_file).unwrap();
    let graph = fs::read_to_string(&env.paths().graph_file).unwrap();
    let index_before = env.index().clone();

    env.refresh().unwrap();
    assert_eq!(env.index(), &index_before);
    assert_eq!(fs::read_to_string(&env.paths().mapping_file).unwrap(), mapping);
    assert_eq!(fs::read_to_string(&env.paths().graph_file).unwrap(), graph);

    let mut reopened = OntoEnv::open_with(dir.path(), Box::new(OfflineFetcher)).unwrap();
    reopened.refresh().unwrap();
    assert_eq!(
        fs::read_to_string(&reopened.paths().mapping_file).unwrap(),
        mapping,
        "a fresh process must reach the same state"
    );
    assert_eq!(fs::read_to_string(&reopened.paths().graph_file).unwrap(), graph);
}

/// Mutual imports terminate and produce both edges.
#[test]
fn cyclic_imports_terminate() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ttl", &ontology("urn:a", &["urn:b"]));
    write(dir.path(), "b.ttl", &ontology("urn:b", &["urn:a"]));

    let env = init_offline(dir.path());
    assert!(env.graph().has_edge("urn:a", "urn:b"));
    assert!(env.graph().has_edge("urn:b", "urn:a"));
    assert_eq!(env.graph().edge_count(), 2);

    let tree = env.dependency_tree(None).unwrap();
    assert!(tree.contains(DUPLICATE_MARKER), "cycle must be cut:\n{tree}");
}

/// Deleting a file drops its ontology from the index and the graph.
#[test]
fn deleted_file_is_pruned() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ttl", &ontology("urn:a", &[]));
    let b = write(dir.path(), "b.ttl", &ontology("urn:b", &[]));

    let mut env = init_offline(dir.path());
    assert!(env.index().lookup("urn:b").is_some());
    assert!(env.graph().contains("urn:b"));

    fs::remove_file(b).unwrap();
    let summary = env.refresh().unwrap();
    assert_eq!(summary.pruned, vec!["urn:b".to_string()]);
    assert!(env.index().lookup("urn:b").is_none());
    assert!(!env.graph().contains("urn:b"));
    assert!(env.index().lookup("urn:a").is_some());

    let persisted = fs::read_to_string(&env.paths().mapping_file).unwrap();
    assert!(!persisted.contains("urn:b"));
}

/// Editing a file's imports replaces its outgoing edges on the next refresh.
#[test]
fn edited_imports_replace_edges() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.ttl", &ontology("urn:a", &["urn:old"]));
    let env = init_offline(dir.path());
    assert!(env.graph().has_edge("urn:a", "urn:old"));

    fs::write(&a, ontology("urn:a", &["urn:new"])).unwrap();
    let mut env2 = OntoEnv::open_with(dir.path(), Box::new(OfflineFetcher)).unwrap();
    env2.refresh().unwrap();
    assert!(env2.graph().has_edge("urn:a", "urn:new"));
    assert!(!env2.graph().has_edge("urn:a", "urn:old"));
}

/// The same instance sees an import edit on its next refresh, and flattening
/// afterwards merges the new target.
#[test]
fn edited_imports_replace_edges_in_same_session() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.ttl", &ontology("urn:a", &["urn:old"]));
    write(dir.path(), "old.ttl", &ontology("urn:old", &[]));
    write(dir.path(), "new.ttl", &ontology("urn:new", &[]));
    let mut env = init_offline(dir.path());
    assert!(env.graph().has_edge("urn:a", "urn:old"));

    fs::write(&a, ontology("urn:a", &["urn:new"])).unwrap();
    env.refresh().unwrap();
    assert!(env.graph().has_edge("urn:a", "urn:new"));
    assert!(!env.graph().has_edge("urn:a", "urn:old"));

    let (mut doc, _) = env.resolve("urn:a").unwrap();
    env.flatten(&mut doc, &FlattenOptions::default()).unwrap();
    let from = |uri: &str| {
        doc.iter()
            .any(|s| s.predicate == "urn:test:from" && s.object == Node::string(uri))
    };
    assert!(from("urn:new"));
    assert!(!from("urn:old"));
}

/// A file declaring no ontology is traversed under its path.
#[test]
fn undeclared_file_becomes_path_node() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ttl", &ontology("urn:a", &[]));
    write(
        dir.path(),
        "shapes.ttl",
        "<urn:shape> <http://www.w3.org/2002/07/owl#imports> <urn:a> .\n",
    );

    let env = init_offline(dir.path());
    let node = canonical(dir.path()).join("shapes.ttl").display().to_string();
    assert!(env.graph().has_edge(&node, "urn:a"));
    assert!(env.index().lookup(&node).is_none(), "paths are never indexed");
}

/// Lenient mode logs a malformed file and indexes the rest; strict mode
/// aborts and leaves the index as it was.
#[test]
fn malformed_file_follows_failure_policy() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "good.ttl", &ontology("urn:good", &[]));
    write(dir.path(), "bad.ttl", "<urn:x> this is not turtle <<<");

    let env = init_offline(dir.path());
    assert!(env.index().lookup("urn:good").is_some());
    assert_eq!(env.index().len(), 1);
    let mapping = fs::read_to_string(&env.paths().mapping_file).unwrap();

    let mut strict = OntoEnv::open_with(dir.path(), Box::new(OfflineFetcher)).unwrap();
    strict.set_strict(true);
    let err = strict.refresh().unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "got {err}");
    assert_eq!(fs::read_to_string(&strict.paths().mapping_file).unwrap(), mapping);
}

/// Strict mode aborts on an import that cannot be resolved.
#[test]
fn strict_refresh_fails_on_unresolvable_import() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ttl", &ontology("urn:a", &["urn:missing"]));

    let settings = InitSettings {
        strict: Some(true),
        ..InitSettings::default()
    };
    let err = OntoEnv::init_with(dir.path(), &settings, Box::new(OfflineFetcher)).unwrap_err();
    assert!(
        matches!(err, Error::Resolution { ref uri, .. } if uri == "urn:missing"),
        "got {err}"
    );
}

/// Compound suffixes and each supported syntax are discovered.
#[test]
fn discovers_all_ontology_extensions() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "one.owl.ttl", &ontology("urn:one", &[]));
    write(
        dir.path(),
        "two.nt",
        "<urn:two> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2002/07/owl#Ontology> .\n",
    );
    write(
        dir.path(),
        "three.owl",
        r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:owl="http://www.w3.org/2002/07/owl#">
  <owl:Ontology rdf:about="urn:three"/>
</rdf:RDF>
"#,
    );
    write(dir.path(), "notes.md", "# not an ontology");

    let env = init_offline(dir.path());
    for uri in ["urn:one", "urn:two", "urn:three"] {
        assert!(env.index().lookup(uri).is_some(), "{uri} not indexed");
    }
    assert_eq!(env.index().len(), 3);
}

/// `dump` lists every ontology sorted by URI.
#[test]
fn dump_is_sorted() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "z.ttl", &ontology("urn:a", &[]));
    write(dir.path(), "a.ttl", &ontology("urn:b", &[]));

    let env = init_offline(dir.path());
    let dump = env.dump();
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("urn:a => "));
    assert!(lines[0].ends_with("z.ttl"));
    assert!(lines[1].starts_with("urn:b => "));
}
