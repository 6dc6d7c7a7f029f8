//! Per-component documentation discovery (spec §4.2).
//!
//! For a component path `P`: `{P}/README.md` is the public doc; every
//! `*.md` directly under `{P}/docs/` (non-recursive) is a private doc. The
//! `src/` collapse rule makes the conventional source directory
//! transparent: if `P` itself ends in `src`, its parent is scanned too; if
//! `P/src` exists, it is scanned as well. Explicit `docs:` entries from the
//! manifest are always included, deduplicated by absolute path against
//! whatever discovery already found.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::manifest::Component;

const CONVENTIONAL_SRC_DIR: &str = "src";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDoc {
    pub path: PathBuf,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Discover all docs owned by `component`, rooted at `component_root` (one
/// of its normalized path prefixes).
pub fn discover_docs(component: &Component, component_root: &Path) -> Vec<DiscoveredDoc> {
    let mut out = Vec::new();
    let mut seen = std::collections::HashSet::new();

    let mut roots = vec![component_root.to_path_buf()];
    if component_root.file_name().and_then(|n| n.to_str()) == Some(CONVENTIONAL_SRC_DIR) {
        if let Some(parent) = component_root.parent() {
            roots.push(parent.to_path_buf());
        }
    }
    let src_child = component_root.join(CONVENTIONAL_SRC_DIR);
    if src_child.is_dir() {
        roots.push(src_child);
    }

    for root in &roots {
        scan_one_root(root, &mut out, &mut seen);
    }

    for declared in &component.docs {
        let p = component_root.join(declared);
        if seen.insert(p.clone()) {
            let visibility = if is_public_doc_name(&p) {
                Visibility::Public
            } else {
                Visibility::Private
            };
            debug!(path = %p.display(), ?visibility, "explicit doc entry");
            out.push(DiscoveredDoc { path: p, visibility });
        }
    }

    out
}

fn scan_one_root(
    root: &Path,
    out: &mut Vec<DiscoveredDoc>,
    seen: &mut std::collections::HashSet<PathBuf>,
) {
    let readme = root.join("README.md");
    if readme.is_file() && seen.insert(readme.clone()) {
        out.push(DiscoveredDoc {
            path: readme,
            visibility: Visibility::Public,
        });
    }

    let docs_dir = root.join("docs");
    let Ok(entries) = std::fs::read_dir(&docs_dir) else {
        return;
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        if seen.insert(path.clone()) {
            debug!(path = %path.display(), "discovered private doc");
            out.push(DiscoveredDoc {
                path,
                visibility: Visibility::Private,
            });
        }
    }
}

/// Whether `path`'s filename is the canonical public-doc name, matched
/// case-sensitively per spec §3 ("Doc").
pub fn is_public_doc_name(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some("README.md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Component, PathSpec, Stability};
    use std::fs;
    use tempfile::TempDir;

    fn comp() -> Component {
        Component {
            name: "api".into(),
            path: PathSpec::One("api".into()),
            deps: vec![],
            docs: vec![],
            tags: vec![],
            env: vec![],
            stability: Stability::Active,
            test: None,
            normalized_paths: vec![],
        }
    }

    #[test]
    fn finds_readme_and_private_docs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("README.md"), "# api").unwrap();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/design.md"), "design").unwrap();

        let docs = discover_docs(&comp(), root);
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().any(|d| d.visibility == Visibility::Public));
        assert!(docs.iter().any(|d| d.visibility == Visibility::Private));
    }

    #[test]
    fn docs_dir_scan_is_non_recursive() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("docs/nested")).unwrap();
        fs::write(root.join("docs/nested/deep.md"), "deep").unwrap();

        let docs = discover_docs(&comp(), root);
        assert!(docs.is_empty());
    }

    #[test]
    fn src_child_is_scanned_when_present() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/README.md"), "inner").unwrap();

        let docs = discover_docs(&comp(), root);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, root.join("src/README.md"));
    }

    #[test]
    fn parent_is_scanned_when_root_ends_in_src() {
        let dir = TempDir::new().unwrap();
        let parent = dir.path();
        let src = parent.join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(parent.join("README.md"), "top-level").unwrap();

        let docs = discover_docs(&comp(), &src);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, parent.join("README.md"));
    }

    #[test]
    fn declared_non_readme_docs_are_included_but_private() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("ARCHITECTURE.md"), "notes").unwrap();
        let mut c = comp();
        c.docs = vec!["ARCHITECTURE.md".to_string()];

        let docs = discover_docs(&c, root);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, root.join("ARCHITECTURE.md"));
        assert_eq!(docs[0].visibility, Visibility::Private);
    }

    #[test]
    fn declared_readme_doc_is_public() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("nested/README.md"), "notes").unwrap();
        let mut c = comp();
        c.docs = vec!["nested/README.md".to_string()];

        let docs = discover_docs(&c, root);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].visibility, Visibility::Public);
    }

    #[test]
    fn nonexistent_readme_is_skipped_not_errored() {
        let dir = TempDir::new().unwrap();
        let docs = discover_docs(&comp(), dir.path());
        assert!(docs.is_empty());
    }
}
