//! Markdown link scanner: doc -> component dependency inference (spec §4.8).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::docs::discovery::discover_docs;
use crate::manifest::{Manifest, OwnershipIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    File,
    Heading,
    Url,
    Broken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source_doc: PathBuf,
    pub target_path: String,
    pub kind: LinkKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkScanReport {
    pub links: Vec<Link>,
    pub broken: Vec<Link>,
    pub inferred_deps: Vec<(String, String)>,
}

/// Either scan every doc the manifest's components own, or a single
/// explicit file.
pub enum LinkScanScope<'a> {
    AllDocs,
    SingleFile(&'a Path),
}

fn link_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(!?)\[[^\]]*\]\(([^)\s]+)(?:\s+\"[^\"]*\")?\)").unwrap())
}

pub fn scan_links(manifest: &Manifest, ownership: &OwnershipIndex, scope: LinkScanScope) -> LinkScanReport {
    let docs = match scope {
        LinkScanScope::AllDocs => all_component_docs(manifest),
        LinkScanScope::SingleFile(p) => vec![p.to_path_buf()],
    };

    let mut links = Vec::new();
    let mut broken = Vec::new();
    let mut inferred: HashSet<(String, String)> = HashSet::new();

    for doc in &docs {
        let Ok(contents) = std::fs::read_to_string(doc) else {
            continue;
        };
        let headings = extract_heading_slugs(&contents);

        for caps in link_re().captures_iter(&contents) {
            if caps.get(1).map(|m| !m.as_str().is_empty()).unwrap_or(false) {
                continue; // image link, ignored per spec
            }
            let raw_target = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let target = strip_fragment_for_display(raw_target);
            let link = classify(doc, raw_target, &headings);

            if link.kind == LinkKind::Broken {
                broken.push(link.clone());
            }
            if link.kind == LinkKind::File {
                if let Some(target_path) = resolve_file_target(doc, raw_target) {
                    if let (Some(source_c), Some(target_c)) = (
                        ownership.owning_component(doc),
                        ownership.owning_component(&target_path),
                    ) {
                        if source_c != target_c {
                            inferred.insert((source_c.to_string(), target_c.to_string()));
                        }
                    }
                }
            }
            let _ = target;
            links.push(link);
        }
    }

    let mut inferred_deps: Vec<(String, String)> = inferred.into_iter().collect();
    inferred_deps.sort();

    LinkScanReport {
        links,
        broken,
        inferred_deps,
    }
}

fn all_component_docs(manifest: &Manifest) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for component in &manifest.components {
        for root in &component.normalized_paths {
            for doc in discover_docs(component, root) {
                if seen.insert(doc.path.clone()) {
                    out.push(doc.path);
                }
            }
        }
    }
    out
}

fn classify(source_doc: &Path, raw_target: &str, headings: &HashSet<String>) -> Link {
    if raw_target.starts_with("http://") || raw_target.starts_with("https://") || raw_target.starts_with("mailto:") {
        return Link {
            source_doc: source_doc.to_path_buf(),
            target_path: raw_target.to_string(),
            kind: LinkKind::Url,
        };
    }

    if let Some(fragment) = raw_target.strip_prefix('#') {
        let slug = slugify(fragment);
        let kind = if headings.contains(&slug) {
            LinkKind::Heading
        } else {
            LinkKind::Broken
        };
        return Link {
            source_doc: source_doc.to_path_buf(),
            target_path: raw_target.to_string(),
            kind,
        };
    }

    let exists = resolve_file_target(source_doc, raw_target)
        .map(|p| p.is_file())
        .unwrap_or(false);
    Link {
        source_doc: source_doc.to_path_buf(),
        target_path: raw_target.to_string(),
        kind: if exists { LinkKind::File } else { LinkKind::Broken },
    }
}

fn resolve_file_target(source_doc: &Path, raw_target: &str) -> Option<PathBuf> {
    let without_fragment = strip_fragment_for_display(raw_target);
    if without_fragment.is_empty() {
        return None;
    }
    let base = source_doc.parent()?;
    Some(base.join(without_fragment))
}

fn strip_fragment_for_display(raw_target: &str) -> &str {
    raw_target.split('#').next().unwrap_or(raw_target)
}

/// Case-folded heading slug extraction: `## Some Heading` -> `some-heading`.
fn extract_heading_slugs(contents: &str) -> HashSet<String> {
    contents
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') {
                Some(slugify(trimmed.trim_start_matches('#').trim()))
            } else {
                None
            }
        })
        .collect()
}

fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .trim_matches('-')
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Component, PathSpec, Stability};
    use std::fs;
    use tempfile::TempDir;

    fn comp(name: &str, path: &str) -> Component {
        Component {
            name: name.to_string(),
            path: PathSpec::One(path.to_string()),
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
    fn classifies_url_heading_file_and_broken_links() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("api")).unwrap();
        fs::write(root.join("api/OTHER.md"), "# Other\n").unwrap();
        fs::write(
            root.join("api/README.md"),
            "# Title\n\n[ext](https://example.com) [sec](#title) [file](./OTHER.md) [gone](./MISSING.md)\n",
        )
        .unwrap();

        let manifest = Manifest::new("1".into(), vec![comp("api", "api")], root).unwrap();
        let ownership = OwnershipIndex::build(&manifest);
        let report = scan_links(&manifest, &ownership, LinkScanScope::AllDocs);

        assert_eq!(report.links.len(), 4);
        assert_eq!(report.broken.len(), 1);
        assert!(report.links.iter().any(|l| l.kind == LinkKind::Url));
        assert!(report.links.iter().any(|l| l.kind == LinkKind::Heading));
        assert!(report.links.iter().any(|l| l.kind == LinkKind::File));
    }

    #[test]
    fn image_links_are_ignored() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("api")).unwrap();
        fs::write(root.join("api/README.md"), "![alt](./pic.png)\n").unwrap();

        let manifest = Manifest::new("1".into(), vec![comp("api", "api")], root).unwrap();
        let ownership = OwnershipIndex::build(&manifest);
        let report = scan_links(&manifest, &ownership, LinkScanScope::AllDocs);
        assert!(report.links.is_empty());
    }

    #[test]
    fn cross_component_file_link_infers_dep() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("api")).unwrap();
        fs::create_dir_all(root.join("auth")).unwrap();
        fs::write(root.join("auth/README.md"), "# Auth\n").unwrap();
        fs::write(
            root.join("api/README.md"),
            "[auth docs](../auth/README.md)\n",
        )
        .unwrap();

        let manifest = Manifest::new(
            "1".into(),
            vec![comp("api", "api"), comp("auth", "auth")],
            root,
        )
        .unwrap();
        let ownership = OwnershipIndex::build(&manifest);
        let report = scan_links(&manifest, &ownership, LinkScanScope::AllDocs);
        assert_eq!(report.inferred_deps, vec![("api".to_string(), "auth".to_string())]);
    }
}
