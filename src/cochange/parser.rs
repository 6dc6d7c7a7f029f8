//! numstat stream -> weighted co-change graph (spec §4.9).

use std::collections::HashMap;
use std::path::PathBuf;

use glob::Pattern;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cancel::CancellationToken;
use crate::cochange::git_adapter::{Commit, GitAdapter};
use crate::error::AnalysisError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoChangeConfig {
    /// Case-insensitive substrings; a commit subject containing any of
    /// these is skipped entirely (e.g. "merge", "revert").
    pub skip_message_patterns: Vec<String>,
    /// Commits touching more than this many (post-exclusion) files are
    /// treated as sweeping refactors, not behavioral coupling.
    pub file_count_ceiling: usize,
    /// Glob patterns; files matching any of these never participate in
    /// co-change edges (lockfiles, generated output).
    pub exclude_globs: Vec<String>,
    /// Optional conventional-commit-type multipliers (`feat`, `fix`, ...)
    /// applied to a kept commit's total contribution.
    pub type_multipliers: HashMap<String, f64>,
}

impl Default for CoChangeConfig {
    fn default() -> Self {
        Self {
            skip_message_patterns: vec!["merge".to_string(), "revert".to_string()],
            file_count_ceiling: 50,
            exclude_globs: Vec::new(),
            type_multipliers: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoChangeEdge {
    /// Unordered file pair, stored lexically sorted for stable identity.
    pub files: (PathBuf, PathBuf),
    pub weight: f64,
    pub commit_count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoChangeGraph {
    pub edges: Vec<CoChangeEdge>,
    pub total_commits_analyzed: usize,
    pub total_commits_filtered: usize,
}

/// Build a [`CoChangeGraph`] by streaming `adapter`'s commit log for
/// `range`, filtering and weighting per `config`. The stream is consumed
/// lazily; cancellation is checked once per commit (spec §9's "must not
/// buffer the entire stream before filtering").
pub fn build_co_change_graph(
    adapter: &dyn GitAdapter,
    range: &str,
    config: &CoChangeConfig,
    cancel: &CancellationToken,
) -> Result<CoChangeGraph, AnalysisError> {
    let excludes: Vec<Pattern> = config
        .exclude_globs
        .iter()
        .filter_map(|g| Pattern::new(g).ok())
        .collect();

    let mut edges: HashMap<(PathBuf, PathBuf), (f64, u32)> = HashMap::new();
    let mut analyzed = 0usize;
    let mut filtered = 0usize;

    for commit in adapter.log_numstat(range) {
        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        if should_skip(&commit, config) {
            filtered += 1;
            trace!(sha = %commit.sha, "co-change commit filtered");
            continue;
        }

        let files: Vec<PathBuf> = commit
            .numstat_entries
            .iter()
            .filter(|e| e.additions.is_some() && e.deletions.is_some())
            .map(|e| e.file.clone())
            .filter(|f| !excludes.iter().any(|p| p.matches_path(f)))
            .collect();

        let n = files.len();
        if n > config.file_count_ceiling {
            filtered += 1;
            trace!(sha = %commit.sha, files = n, "co-change commit exceeds file ceiling");
            continue;
        }
        if n < 2 {
            analyzed += 1;
            continue;
        }

        analyzed += 1;
        let multiplier = commit_type_multiplier(&commit.subject, config);
        let per_pair_weight = multiplier * 2.0 / (n as f64 * (n as f64 - 1.0));

        for i in 0..n {
            for j in (i + 1)..n {
                let pair = sorted_pair(files[i].clone(), files[j].clone());
                let entry = edges.entry(pair).or_insert((0.0, 0));
                entry.0 += per_pair_weight;
                entry.1 += 1;
            }
        }
    }

    let mut edges: Vec<CoChangeEdge> = edges
        .into_iter()
        .map(|(files, (weight, commit_count))| CoChangeEdge {
            files,
            weight,
            commit_count,
        })
        .collect();
    edges.sort_by(|a, b| a.files.cmp(&b.files));

    debug!(analyzed, filtered, edges = edges.len(), "co-change graph built");

    Ok(CoChangeGraph {
        edges,
        total_commits_analyzed: analyzed,
        total_commits_filtered: filtered,
    })
}

fn should_skip(commit: &Commit, config: &CoChangeConfig) -> bool {
    let subject_lower = commit.subject.to_lowercase();
    config
        .skip_message_patterns
        .iter()
        .any(|p| subject_lower.contains(&p.to_lowercase()))
}

/// Parses a `type(scope): subject` conventional-commit prefix and looks up
/// a configured multiplier for `type`; defaults to 1.0 when absent or
/// unconfigured.
fn commit_type_multiplier(subject: &str, config: &CoChangeConfig) -> f64 {
    let Some(colon) = subject.find(':') else {
        return 1.0;
    };
    let prefix = &subject[..colon];
    let commit_type = prefix.split('(').next().unwrap_or(prefix).trim();
    config.type_multipliers.get(commit_type).copied().unwrap_or(1.0)
}

fn sorted_pair(a: PathBuf, b: PathBuf) -> (PathBuf, PathBuf) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cochange::git_adapter::{FakeGitAdapter, NumstatEntry};
    use chrono::Utc;

    fn commit(sha: &str, subject: &str, files: &[&str]) -> Commit {
        Commit {
            sha: sha.to_string(),
            author: "a".into(),
            timestamp: Utc::now(),
            subject: subject.to_string(),
            body: String::new(),
            numstat_entries: files
                .iter()
                .map(|f| NumstatEntry {
                    file: PathBuf::from(f),
                    additions: Some(1),
                    deletions: Some(0),
                })
                .collect(),
        }
    }

    #[test]
    fn each_commit_contributes_total_weight_one() {
        let adapter = FakeGitAdapter::new(vec![commit("a", "feat: x", &["x", "y", "z"])]);
        let graph = build_co_change_graph(&adapter, "HEAD", &CoChangeConfig::default(), &CancellationToken::new()).unwrap();
        let total: f64 = graph.edges.iter().map(|e| e.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(graph.edges.len(), 3);
    }

    #[test]
    fn merge_commits_are_filtered() {
        let adapter = FakeGitAdapter::new(vec![commit("a", "Merge branch 'foo'", &["x", "y"])]);
        let graph = build_co_change_graph(&adapter, "HEAD", &CoChangeConfig::default(), &CancellationToken::new()).unwrap();
        assert!(graph.edges.is_empty());
        assert_eq!(graph.total_commits_filtered, 1);
    }

    #[test]
    fn commits_exceeding_ceiling_are_filtered() {
        let files: Vec<String> = (0..60).map(|i| format!("f{i}")).collect();
        let file_refs: Vec<&str> = files.iter().map(|s| s.as_str()).collect();
        let adapter = FakeGitAdapter::new(vec![commit("a", "chore: refactor", &file_refs)]);
        let graph = build_co_change_graph(&adapter, "HEAD", &CoChangeConfig::default(), &CancellationToken::new()).unwrap();
        assert_eq!(graph.total_commits_filtered, 1);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn excluded_globs_drop_individual_files() {
        let adapter = FakeGitAdapter::new(vec![commit("a", "feat: x", &["x.rs", "Cargo.lock"])]);
        let mut config = CoChangeConfig::default();
        config.exclude_globs = vec!["*.lock".to_string()];
        let graph = build_co_change_graph(&adapter, "HEAD", &config, &CancellationToken::new()).unwrap();
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn binary_entries_are_discarded() {
        let mut c = commit("a", "feat: x", &["x"]);
        c.numstat_entries.push(NumstatEntry {
            file: PathBuf::from("image.png"),
            additions: None,
            deletions: None,
        });
        let adapter = FakeGitAdapter::new(vec![c]);
        let graph = build_co_change_graph(&adapter, "HEAD", &CoChangeConfig::default(), &CancellationToken::new()).unwrap();
        assert!(graph.edges.is_empty()); // only one non-binary file left, no pair
    }

    #[test]
    fn repeated_pair_merges_weight_and_commit_count() {
        let adapter = FakeGitAdapter::new(vec![
            commit("a", "feat: x", &["x", "y"]),
            commit("b", "fix: y", &["x", "y"]),
        ]);
        let graph = build_co_change_graph(&adapter, "HEAD", &CoChangeConfig::default(), &CancellationToken::new()).unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].commit_count, 2);
        assert!((graph.edges[0].weight - 2.0).abs() < 1e-9);
    }

    #[test]
    fn cancellation_stops_the_stream() {
        let adapter = FakeGitAdapter::new(vec![commit("a", "feat: x", &["x", "y"])]);
        let token = CancellationToken::new();
        token.cancel();
        let result = build_co_change_graph(&adapter, "HEAD", &CoChangeConfig::default(), &token);
        assert!(matches!(result, Err(AnalysisError::Cancelled)));
    }
}
