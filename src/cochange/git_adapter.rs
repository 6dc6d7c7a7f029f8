//! Abstract git adapter the co-change parser consumes (spec §6).
//!
//! The core never shells out to git itself; it consumes already-parsed
//! `git log --numstat` entries through this trait. A [`FakeGitAdapter`]
//! backs this crate's own tests instead of standing up a real repository,
//! the same role the teacher's `neo4j::mock` / `graph::mock` types play for
//! its store traits.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// A single file's numstat line within a commit. `additions`/`deletions`
/// are `None` for binary files (numstat reports `-` for both), which the
/// core discards before they ever reach the co-change parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumstatEntry {
    pub file: PathBuf,
    pub additions: Option<u32>,
    pub deletions: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub subject: String,
    pub body: String,
    pub numstat_entries: Vec<NumstatEntry>,
}

/// Abstract, synchronous source of git history. Implementations are
/// expected to stream rather than buffer — the co-change parser consumes
/// the returned iterator lazily and checks cancellation between commits
/// (spec §5, §9).
pub trait GitAdapter {
    fn log_numstat<'a>(&'a self, range: &str) -> Box<dyn Iterator<Item = Commit> + 'a>;

    fn show(&self, reference: &str, path: &Path) -> Option<String>;
}

/// An in-memory [`GitAdapter`] over a fixed commit list, for tests.
#[derive(Debug, Clone, Default)]
pub struct FakeGitAdapter {
    commits: Vec<Commit>,
}

impl FakeGitAdapter {
    pub fn new(commits: Vec<Commit>) -> Self {
        Self { commits }
    }
}

impl GitAdapter for FakeGitAdapter {
    fn log_numstat<'a>(&'a self, _range: &str) -> Box<dyn Iterator<Item = Commit> + 'a> {
        Box::new(self.commits.iter().cloned())
    }

    fn show(&self, _reference: &str, _path: &Path) -> Option<String> {
        None
    }
}
