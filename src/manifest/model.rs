//! Component and manifest types, and normalization of their path fields.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::ManifestError;

/// Maturity of a component, informational for now but part of the wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    Stable,
    Active,
    Experimental,
}

/// A single path entry as given in the manifest, before normalization —
/// either a bare string or a list of strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSpec {
    One(String),
    Many(Vec<String>),
}

impl PathSpec {
    fn entries(&self) -> Vec<&str> {
        match self {
            PathSpec::One(s) => vec![s.as_str()],
            PathSpec::Many(v) => v.iter().map(|s| s.as_str()).collect(),
        }
    }
}

/// A named, path-anchored unit of the repository as declared in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub path: PathSpec,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub docs: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default = "default_stability")]
    pub stability: Stability,
    #[serde(default)]
    pub test: Option<String>,

    /// Absolute, normalized path prefixes. Populated by [`Manifest::new`];
    /// empty until then.
    #[serde(skip)]
    pub normalized_paths: Vec<PathBuf>,
}

fn default_stability() -> Stability {
    Stability::Active
}

/// The parsed, pre-validated manifest document: a version string plus the
/// component registry, keyed by name in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    /// Insertion-ordered list of components (order is preserved for
    /// round-trip fidelity; lookups go through `components_by_name`).
    pub components: Vec<Component>,

    /// Absolute directory the manifest lives in; all component paths are
    /// normalized relative to it.
    #[serde(skip)]
    pub root: PathBuf,
}

impl Manifest {
    /// Construct a manifest from already-parsed components, normalizing
    /// every component's path entries to absolute paths rooted at `root`,
    /// and validating the invariants from spec §3-4.1:
    /// unique names, known deps, no self-deps, acyclic dep graph, and
    /// path-prefix-only overlap between components.
    pub fn new(
        version: String,
        mut components: Vec<Component>,
        root: impl Into<PathBuf>,
    ) -> Result<Self, ManifestError> {
        let root = root.into();

        let mut seen_names = HashSet::new();
        for c in &components {
            if !seen_names.insert(c.name.clone()) {
                return Err(ManifestError::DuplicateComponent(c.name.clone()));
            }
        }

        for c in &mut components {
            c.normalized_paths = c
                .path
                .entries()
                .iter()
                .map(|p| normalize_path(&root, p))
                .collect();
        }

        let names: HashSet<&str> = components.iter().map(|c| c.name.as_str()).collect();
        for c in &components {
            for dep in &c.deps {
                if dep == &c.name {
                    return Err(ManifestError::SelfDependency(c.name.clone()));
                }
                if !names.contains(dep.as_str()) {
                    return Err(ManifestError::UnknownDependency {
                        component: c.name.clone(),
                        dep: dep.clone(),
                    });
                }
            }
        }

        check_path_overlaps(&components)?;

        let manifest = Manifest {
            version,
            components,
            root,
        };

        // Acyclicity is checked eagerly so construction itself fails fast,
        // per spec §9 ("cyclic dep graphs are detected but never tolerated
        // at the manifest layer").
        crate::manifest::graph::topological_order(&manifest)?;

        Ok(manifest)
    }

    /// Build a name -> &Component index. O(n); callers that need repeated
    /// lookups should cache this themselves (the manifest is immutable once
    /// constructed).
    pub fn components_by_name(&self) -> HashMap<&str, &Component> {
        self.components
            .iter()
            .map(|c| (c.name.as_str(), c))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// All component names bearing the given tag.
    pub fn components_with_tag(&self, tag: &str) -> Vec<&str> {
        self.components
            .iter()
            .filter(|c| c.tags.iter().any(|t| t == tag))
            .map(|c| c.name.as_str())
            .collect()
    }
}

fn normalize_path(root: &Path, entry: &str) -> PathBuf {
    let p = Path::new(entry);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

/// A component's path may overlap another's only when one is a strict
/// prefix of the other (directory-boundary aware); anything else is a
/// `PathConflict`.
fn check_path_overlaps(components: &[Component]) -> Result<(), ManifestError> {
    for (i, a) in components.iter().enumerate() {
        for b in components.iter().skip(i + 1) {
            if a.name == b.name {
                continue;
            }
            for pa in &a.normalized_paths {
                for pb in &b.normalized_paths {
                    if pa == pb {
                        continue; // identical: treated as nested at depth 0, allowed
                    }
                    let a_prefixes_b = is_dir_prefix(pa, pb);
                    let b_prefixes_a = is_dir_prefix(pb, pa);
                    if !a_prefixes_b && !b_prefixes_a && paths_share_prefix(pa, pb) {
                        return Err(ManifestError::PathConflict {
                            a: a.name.clone(),
                            b: b.name.clone(),
                            path: pa.clone(),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

/// True iff `prefix` is a true directory-prefix of `candidate`.
pub(crate) fn is_dir_prefix(prefix: &Path, candidate: &Path) -> bool {
    candidate.starts_with(prefix)
}

/// Whether two paths could be considered "overlapping" at all — i.e. one
/// is an ancestor-or-descendant of the other on the filesystem tree. Two
/// unrelated paths (neither an ancestor of the other) never conflict even
/// if they share a textual prefix (`/repo/api` vs `/repo/api-gateway`).
fn paths_share_prefix(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}
