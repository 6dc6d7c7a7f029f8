//! Resolve a task's `Touches` declaration into the docs it should see.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::docs::discovery::{discover_docs, Visibility};
use crate::error::ManifestError;
use crate::manifest::{resolve_component_refs, Manifest};
use crate::plan::model::Touches;

/// A single doc entry in a resolved reading list, carrying the grouping
/// metadata callers need to render "why is this here" context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDoc {
    pub component: String,
    pub path: PathBuf,
    pub visibility: Visibility,
}

/// For `writes` components: all docs, public and private. For `reads`
/// components: public docs only. Deduplicated by path across components
/// (first component to claim a path wins the grouping metadata).
pub fn resolve_docs_for_touches(
    manifest: &Manifest,
    touches: &Touches,
) -> Result<Vec<ResolvedDoc>, ManifestError> {
    let write_components = resolve_component_refs(manifest, &touches.writes)?;
    let read_components = resolve_component_refs(manifest, &touches.reads)?;

    let mut out = Vec::new();
    let mut seen_paths: HashSet<PathBuf> = HashSet::new();

    for name in &write_components {
        append_component_docs(manifest, name, None, &mut out, &mut seen_paths);
    }
    for name in &read_components {
        append_component_docs(
            manifest,
            name,
            Some(Visibility::Public),
            &mut out,
            &mut seen_paths,
        );
    }

    Ok(out)
}

fn append_component_docs(
    manifest: &Manifest,
    name: &str,
    only: Option<Visibility>,
    out: &mut Vec<ResolvedDoc>,
    seen_paths: &mut HashSet<PathBuf>,
) {
    let Some(component) = manifest.get(name) else {
        return;
    };
    for root in &component.normalized_paths {
        for doc in discover_docs(component, root) {
            if let Some(want) = only {
                if doc.visibility != want {
                    continue;
                }
            }
            if seen_paths.insert(doc.path.clone()) {
                out.push(ResolvedDoc {
                    component: name.to_string(),
                    path: doc.path,
                    visibility: doc.visibility,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Component, PathSpec, Stability};
    use std::fs;
    use tempfile::TempDir;

    fn make_manifest(root: &std::path::Path) -> Manifest {
        let comp = |name: &str, rel: &str| Component {
            name: name.to_string(),
            path: PathSpec::One(rel.to_string()),
            deps: vec![],
            docs: vec![],
            tags: vec![],
            env: vec![],
            stability: Stability::Active,
            test: None,
            normalized_paths: vec![],
        };
        Manifest::new(
            "1".into(),
            vec![comp("auth", "auth"), comp("api", "api")],
            root,
        )
        .unwrap()
    }

    #[test]
    fn writes_get_all_visibilities_reads_get_public_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("auth/docs")).unwrap();
        fs::write(root.join("auth/README.md"), "pub").unwrap();
        fs::write(root.join("auth/docs/internal.md"), "priv").unwrap();
        fs::create_dir_all(root.join("api/docs")).unwrap();
        fs::write(root.join("api/README.md"), "pub").unwrap();
        fs::write(root.join("api/docs/internal.md"), "priv").unwrap();

        let manifest = make_manifest(root);
        let touches = Touches {
            reads: vec!["api".to_string()],
            writes: vec!["auth".to_string()],
        };
        let resolved = resolve_docs_for_touches(&manifest, &touches).unwrap();

        let auth_docs: Vec<_> = resolved.iter().filter(|d| d.component == "auth").collect();
        let api_docs: Vec<_> = resolved.iter().filter(|d| d.component == "api").collect();
        assert_eq!(auth_docs.len(), 2);
        assert_eq!(api_docs.len(), 1);
        assert_eq!(api_docs[0].visibility, Visibility::Public);
    }

    #[test]
    fn unknown_ref_errors() {
        let dir = TempDir::new().unwrap();
        let manifest = make_manifest(dir.path());
        let touches = Touches {
            reads: vec![],
            writes: vec!["ghost".to_string()],
        };
        assert!(resolve_docs_for_touches(&manifest, &touches).is_err());
    }
}
