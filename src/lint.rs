//! Lint aggregator: combines freshness, link, and import scan results into
//! a single flat issue list with suppression support (spec §4.11).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::docs::freshness::FreshnessRecord;
use crate::scan::imports::ImportScanReport;
use crate::scan::links::{LinkKind, LinkScanReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: String,
    pub component: Option<String>,
    pub message: String,
}

impl Issue {
    /// Stable suppression key over `(category, component?, message)`, the
    /// same SHA-256-over-normalized-fields technique the teacher uses for
    /// code-symbol hashing, generalized to this three-tuple.
    pub fn suppression_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.category.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.component.as_deref().unwrap_or("").as_bytes());
        hasher.update([0u8]);
        hasher.update(self.message.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintReport {
    pub issues: Vec<Issue>,
    pub error_count: usize,
    pub warning_count: usize,
    pub suppressed_count: usize,
}

/// Combine freshness, link-scan, and import-scan results into one lint
/// report. `extra_issues` lets a caller fold in issues surfaced by other
/// layers — a manifest cycle, an unknown plan reference — that carry the
/// same `cycle` / `unknown-ref` categories this aggregator's taxonomy
/// reserves for them but that this function does not itself compute.
pub fn aggregate(
    freshness: &[FreshnessRecord],
    links: &LinkScanReport,
    imports: &ImportScanReport,
    extra_issues: Vec<Issue>,
    suppressed: &HashSet<String>,
) -> LintReport {
    let mut issues = Vec::new();

    for record in freshness {
        if record.stale {
            issues.push(Issue {
                severity: Severity::Warning,
                category: "freshness".to_string(),
                component: Some(record.component.clone()),
                message: format!("{} is stale relative to its component's source", record.path.display()),
            });
        }
    }

    for link in &links.links {
        if link.kind == LinkKind::Broken {
            issues.push(Issue {
                severity: Severity::Error,
                category: "broken-link".to_string(),
                component: None,
                message: format!(
                    "{} -> {} does not resolve",
                    link.source_doc.display(),
                    link.target_path
                ),
            });
        }
    }

    for (from, to) in &imports.missing_deps {
        issues.push(Issue {
            severity: Severity::Warning,
            category: "undeclared-dep".to_string(),
            component: Some(from.clone()),
            message: format!("{from} imports {to} without declaring it as a dependency"),
        });
    }
    for (from, to) in &imports.extra_deps {
        issues.push(Issue {
            severity: Severity::Warning,
            category: "extraneous-dep".to_string(),
            component: Some(from.clone()),
            message: format!("{from} declares a dependency on {to} with no corresponding import"),
        });
    }

    issues.extend(extra_issues);

    let mut suppressed_count = 0;
    let issues: Vec<Issue> = issues
        .into_iter()
        .filter(|issue| {
            let keep = !suppressed.contains(&issue.suppression_key());
            if !keep {
                suppressed_count += 1;
            }
            keep
        })
        .collect();

    let error_count = issues.iter().filter(|i| i.severity == Severity::Error).count();
    let warning_count = issues.iter().filter(|i| i.severity == Severity::Warning).count();

    LintReport {
        issues,
        error_count,
        warning_count,
        suppressed_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::links::Link;
    use std::path::PathBuf;

    fn empty_imports() -> ImportScanReport {
        ImportScanReport {
            import_deps: vec![],
            missing_deps: vec![],
            extra_deps: vec![],
            components_with_source: vec![],
            total_files_scanned: 0,
            total_imports_scanned: 0,
        }
    }

    #[test]
    fn stale_docs_become_warnings() {
        let freshness = vec![FreshnessRecord {
            component: "api".to_string(),
            path: PathBuf::from("/repo/api/README.md"),
            mtime: None,
            stale: true,
        }];
        let links = LinkScanReport {
            links: vec![],
            broken: vec![],
            inferred_deps: vec![],
        };
        let report = aggregate(&freshness, &links, &empty_imports(), vec![], &HashSet::new());
        assert_eq!(report.warning_count, 1);
        assert_eq!(report.issues[0].category, "freshness");
    }

    #[test]
    fn broken_links_become_errors() {
        let links = LinkScanReport {
            links: vec![Link {
                source_doc: PathBuf::from("/repo/api/README.md"),
                target_path: "./MISSING.md".to_string(),
                kind: LinkKind::Broken,
            }],
            broken: vec![],
            inferred_deps: vec![],
        };
        let report = aggregate(&[], &links, &empty_imports(), vec![], &HashSet::new());
        assert_eq!(report.error_count, 1);
        assert_eq!(report.issues[0].category, "broken-link");
    }

    #[test]
    fn missing_and_extra_deps_are_reported() {
        let mut imports = empty_imports();
        imports.missing_deps = vec![("api".to_string(), "auth".to_string())];
        imports.extra_deps = vec![("api".to_string(), "db".to_string())];
        let links = LinkScanReport {
            links: vec![],
            broken: vec![],
            inferred_deps: vec![],
        };
        let report = aggregate(&[], &links, &imports, vec![], &HashSet::new());
        assert_eq!(report.warning_count, 2);
        let categories: Vec<&str> = report.issues.iter().map(|i| i.category.as_str()).collect();
        assert!(categories.contains(&"undeclared-dep"));
        assert!(categories.contains(&"extraneous-dep"));
    }

    #[test]
    fn suppression_removes_matching_issues() {
        let freshness = vec![FreshnessRecord {
            component: "api".to_string(),
            path: PathBuf::from("/repo/api/README.md"),
            mtime: None,
            stale: true,
        }];
        let links = LinkScanReport {
            links: vec![],
            broken: vec![],
            inferred_deps: vec![],
        };
        let first = aggregate(&freshness, &links, &empty_imports(), vec![], &HashSet::new());
        let key = first.issues[0].suppression_key();
        let suppressed: HashSet<String> = [key].into_iter().collect();

        let second = aggregate(&freshness, &links, &empty_imports(), vec![], &suppressed);
        assert!(second.issues.is_empty());
        assert_eq!(second.suppressed_count, 1);
    }

    #[test]
    fn suppression_key_is_stable_across_calls() {
        let issue = Issue {
            severity: Severity::Warning,
            category: "freshness".to_string(),
            component: Some("api".to_string()),
            message: "stale".to_string(),
        };
        assert_eq!(issue.suppression_key(), issue.suppression_key());
    }
}
