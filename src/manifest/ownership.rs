//! The shared file -> component index, built once per [`Manifest`] and
//! borrowed by every subsystem that needs to know who owns a path.

use std::path::{Path, PathBuf};

use crate::error::ManifestError;
use crate::manifest::model::Manifest;

/// Longest-prefix file ownership lookup over a manifest's component paths.
///
/// Built once via [`OwnershipIndex::build`] and passed by reference into the
/// docs, hazards, scan, and co-change subsystems instead of being
/// recomputed in each of them.
#[derive(Debug, Clone)]
pub struct OwnershipIndex {
    /// (normalized path prefix, owning component name), sorted by
    /// descending path length so the first match found is the longest.
    entries: Vec<(PathBuf, String)>,
}

impl OwnershipIndex {
    pub fn build(manifest: &Manifest) -> Self {
        let mut entries: Vec<(PathBuf, String)> = manifest
            .components
            .iter()
            .flat_map(|c| {
                c.normalized_paths
                    .iter()
                    .map(move |p| (p.clone(), c.name.clone()))
            })
            .collect();

        entries.sort_by(|a, b| b.0.as_os_str().len().cmp(&a.0.as_os_str().len()));
        Self { entries }
    }

    /// The component owning `path`, by longest directory-prefix match.
    /// A prefix only matches at a path-component boundary — `src/api` does
    /// not own `src/api-gateway/foo.rs`.
    pub fn owning_component(&self, path: &Path) -> Option<&str> {
        self.entries
            .iter()
            .find(|(prefix, _)| path_is_within(prefix, path))
            .map(|(_, name)| name.as_str())
    }

    /// All component names in the index, longest-path-first order; mostly
    /// useful for tests and debugging.
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, n)| n.as_str())
    }
}

fn path_is_within(prefix: &Path, path: &Path) -> bool {
    path == prefix || path.starts_with(prefix)
}

/// Resolves a list of component-or-tag references (as used by `Touches` and
/// plan-level scoping) into a deduplicated list of component names.
///
/// Per spec §4.1/§9: a reference that is both a component name and a tag is
/// resolved as the component name (name-before-tag precedence), uniformly
/// for both read and write reference lists.
pub fn resolve_component_refs(
    manifest: &Manifest,
    refs: &[String],
) -> Result<Vec<String>, ManifestError> {
    let mut out = Vec::new();
    for r in refs {
        if manifest.get(r).is_some() {
            push_unique(&mut out, r.clone());
            continue;
        }
        let tagged = manifest.components_with_tag(r);
        if tagged.is_empty() {
            return Err(ManifestError::UnknownComponentRef(r.clone()));
        }
        for name in tagged {
            push_unique(&mut out, name.to_string());
        }
    }
    Ok(out)
}

fn push_unique(out: &mut Vec<String>, name: String) {
    if !out.contains(&name) {
        out.push(name);
    }
}
