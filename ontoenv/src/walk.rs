//! Corpus discovery: every ontology document below a directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::ENV_DIR;

/// Returns every file under `root` whose name ends in one of `extensions`.
///
/// Matching considers the compound suffix too, so `.owl.ttl` files are found
/// by either extension. The `.ontoenv` directory is never descended into.
/// Results are sorted for a stable traversal order.
#[must_use]
pub fn find_ontology_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name() != ENV_DIR)
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_ontology_extension(e.path(), extensions))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Returns true if the file name ends in one of `extensions`.
#[must_use]
pub fn has_ontology_extension(path: &Path, extensions: &[String]) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n.to_ascii_lowercase(),
        None => return false,
    };
    extensions
        .iter()
        .any(|ext| name.len() > ext.len() && name.ends_with(&ext.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_EXTENSIONS;
    use std::fs;

    fn exts() -> Vec<String> {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn matches_simple_and_compound_suffixes() {
        assert!(has_ontology_extension(Path::new("a.ttl"), &exts()));
        assert!(has_ontology_extension(Path::new("brick.owl.ttl"), &exts()));
        assert!(has_ontology_extension(Path::new("A.TTL"), &exts()));
        assert!(!has_ontology_extension(Path::new("readme.md"), &exts()));
        assert!(!has_ontology_extension(Path::new(".ttl"), &exts()));
    }

    #[test]
    fn walks_nested_directories_and_skips_env_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("models/sub")).unwrap();
        fs::create_dir_all(root.join(".ontoenv/cache")).unwrap();
        fs::write(root.join("top.ttl"), "").unwrap();
        fs::write(root.join("models/sub/deep.owl"), "").unwrap();
        fs::write(root.join("models/notes.txt"), "").unwrap();
        fs::write(root.join(".ontoenv/cache/cached.ttl"), "").unwrap();

        let found = find_ontology_files(root, &exts());
        assert_eq!(
            found,
            vec![root.join("models/sub/deep.owl"), root.join("top.ttl")]
        );
    }
}
