//! mtime-based doc staleness and "warm staleness" résumé summaries (spec §4.2).

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use tracing::warn;
use walkdir::WalkDir;

use crate::docs::discovery::discover_docs;
use crate::manifest::{Component, Manifest};

/// A doc's freshness relative to its component's most recently modified
/// source file. `mtime = None` models the "N/A" sentinel for a doc that
/// doesn't exist on disk (declared but missing, or unreadable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessRecord {
    pub component: String,
    pub path: PathBuf,
    pub mtime: Option<SystemTime>,
    pub stale: bool,
}

/// Compute freshness records for every doc owned by every component in the
/// manifest.
pub fn compute_freshness(manifest: &Manifest) -> Vec<FreshnessRecord> {
    let mut out = Vec::new();
    for component in &manifest.components {
        let src_mtime = max_mtime_under(component);
        for root in &component.normalized_paths {
            for doc in discover_docs(component, root) {
                let doc_mtime = fs::metadata(&doc.path).and_then(|m| m.modified()).ok();
                let stale = match (doc_mtime, src_mtime) {
                    (Some(d), Some(s)) => d < s,
                    (None, _) => true,
                    (Some(_), None) => false,
                };
                out.push(FreshnessRecord {
                    component: component.name.clone(),
                    path: doc.path,
                    mtime: doc_mtime,
                    stale,
                });
            }
        }
    }
    out
}

/// Max mtime of any file under a component's path(s), recursive.
/// Unreadable directories are treated as empty per spec §4.2, and a single
/// unreadable file is skipped with a warning rather than aborting the
/// whole walk (spec §7's "non-fatal when a single file is unreadable").
fn max_mtime_under(component: &Component) -> Option<SystemTime> {
    let mut max: Option<SystemTime> = None;
    for root in &component.normalized_paths {
        if !root.exists() {
            continue;
        }
        for entry in WalkDir::new(root).into_iter() {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry during freshness scan");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            match entry.metadata().and_then(|m| m.modified()) {
                Ok(mtime) => {
                    if max.map(|m| mtime > m).unwrap_or(true) {
                        max = Some(mtime);
                    }
                }
                Err(err) => {
                    warn!(path = %entry.path().display(), error = %err, "skipping file with unreadable mtime");
                }
            }
        }
    }
    max
}

/// A "safe to resume" résumé check for a component scope against a
/// checkpoint timestamp `since`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmStaleness {
    pub safe: bool,
    pub changed_components: Vec<String>,
    pub note: String,
}

/// True iff no file under any component in `scope` has mtime later than
/// `since`; otherwise produces a human-readable note naming which
/// components changed, suitable for injection into a resumed executor's
/// context.
pub fn warm_staleness(manifest: &Manifest, scope: &[String], since: SystemTime) -> WarmStaleness {
    let mut changed = Vec::new();
    for name in scope {
        if let Some(component) = manifest.get(name) {
            if let Some(mtime) = max_mtime_under(component) {
                if mtime > since {
                    changed.push(name.clone());
                }
            }
        }
    }
    changed.sort();

    if changed.is_empty() {
        WarmStaleness {
            safe: true,
            changed_components: Vec::new(),
            note: "no changes detected since checkpoint".to_string(),
        }
    } else {
        let note = format!(
            "{} component(s) changed since checkpoint: {}",
            changed.len(),
            changed.join(", ")
        );
        WarmStaleness {
            safe: false,
            changed_components: changed,
            note,
        }
    }
}
