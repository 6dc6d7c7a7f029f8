//! Varp: a manifest-driven orchestration substrate for AI coding agents.
//!
//! The crate is organized as a pure core — manifest resolution, hazard
//! analysis, wave scheduling, capability enforcement, static codebase
//! analysis, and plan validation/diffing — plus a thin I/O boundary
//! ([`loader`]) that is the only place this crate touches a filesystem
//! path directly rather than accepting already-resolved in-memory values.
//!
//! Everything else operates on values a caller assembles however it likes:
//! parsed from YAML via [`loader`], built programmatically, or fabricated
//! in a test.

pub mod cancel;
pub mod capability;
pub mod cochange;
pub mod docs;
pub mod error;
pub mod hazards;
pub mod lint;
pub mod loader;
pub mod manifest;
pub mod plan;
pub mod schedule;
pub mod scan;

/// Re-exports of the types most call sites need, so a consumer can usually
/// get by with a single `use varp::prelude::*;`.
pub mod prelude {
    pub use crate::cancel::CancellationToken;
    pub use crate::capability::{
        derive_restart_strategy, verify_capabilities, CapabilityReport, CapabilityViolation,
        RestartStrategy, RestartStrategyKind,
    };
    pub use crate::cochange::{
        build_co_change_graph, build_coupling_matrix, component_profile, find_hidden_coupling,
        CoChangeConfig, CoChangeEdge, CoChangeGraph, Commit, CouplingClass, CouplingEntry,
        CouplingMatrix, CouplingMatrixConfig, FakeGitAdapter, GitAdapter, NumstatEntry,
    };
    pub use crate::docs::{
        compute_freshness, discover_docs, resolve_docs_for_touches, warm_staleness, DiscoveredDoc,
        FreshnessRecord, ResolvedDoc, Visibility, WarmStaleness,
    };
    pub use crate::error::{AnalysisError, CoreError, ManifestError, PlanError};
    pub use crate::hazards::{detect_hazards, Hazard, HazardKind};
    pub use crate::lint::{aggregate as aggregate_lint, Issue, LintReport, Severity};
    pub use crate::loader::{load_manifest, load_plan, LoadError};
    pub use crate::manifest::{
        invalidation_cascade, resolve_component_refs, topological_order, Component, Manifest,
        OwnershipIndex, PathSpec, Stability,
    };
    pub use crate::plan::{
        diff_plans, validate_plan, AsTaskRef, Condition, ConditionDiff, Contract, FieldChange, Plan,
        PlanDiff, PlanMetadata, Task, TaskDiff, TaskRef, Touches, ValidationIssue, ValidationResult,
    };
    pub use crate::scan::{
        scan_imports, scan_links, ImportDep, ImportEvidence, ImportScanReport, Link, LinkKind,
        LinkScanReport, LinkScanScope, ScanConfig,
    };
    pub use crate::schedule::{critical_path, compute_waves, CriticalPath, Wave};
}
