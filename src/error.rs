//! The structured error taxonomy every public entry point returns.
//!
//! Four kinds, matching the boundary contract: `ManifestError` and
//! `PlanError` signal bad input and are meant to fail fast; `AnalysisError`
//! covers cycle detection during scheduling and fatal filesystem failures;
//! `Cancelled` is always surfaced immediately. Each variant carries enough
//! typed context (component, path, task id) to render a one-line
//! diagnostic without further lookups.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type returned by every public Varp operation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("operation cancelled")]
    Cancelled,
}

/// Errors arising from an invalid or inconsistent manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("duplicate component name: {0}")]
    DuplicateComponent(String),

    #[error("component {component} depends on unknown component {dep}")]
    UnknownDependency { component: String, dep: String },

    #[error("component {0} depends on itself")]
    SelfDependency(String),

    #[error("dependency cycle detected among components: {0:?}")]
    CycleDetected(Vec<String>),

    #[error("component path conflict: {a} and {b} both claim {path} without one being a strict prefix of the other")]
    PathConflict {
        a: String,
        b: String,
        path: PathBuf,
    },

    #[error("unknown component or tag reference: {0}")]
    UnknownComponentRef(String),
}

/// Errors arising from an invalid plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("duplicate task id: {0}")]
    DuplicateTaskId(String),

    #[error("task {task} references unknown component or tag: {reference}")]
    UnknownRef { task: String, reference: String },

    #[error("{section} condition {id} has an empty verify command")]
    EmptyVerifyCommand { section: String, id: String },

    #[error("{section} has duplicate condition id: {id}")]
    DuplicateConditionId { section: String, id: String },

    #[error("task {task} has an empty mutex name")]
    EmptyMutexName { task: String },
}

/// Errors arising during scheduling or filesystem-backed analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("dependency cycle detected among tasks: {0:?}")]
    CycleDetected(Vec<String>),

    #[error("dependency cycle detected among tasks {tasks:?}; all write to component {component}, consider downgrading to sequential execution in task id order")]
    SingleScopeCycle {
        tasks: Vec<String>,
        component: String,
    },

    #[error("component root unreadable: {path} ({source})")]
    ComponentRootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("operation cancelled")]
    Cancelled,
}
