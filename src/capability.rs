//! Capability enforcement and restart-strategy derivation (spec §4.6).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;
use crate::manifest::{resolve_component_refs, Manifest, OwnershipIndex};
use crate::plan::model::{AsTaskRef, Touches};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityViolation {
    pub path: PathBuf,
    pub declared: Option<String>,
    pub actual: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub valid: bool,
    pub violations: Vec<CapabilityViolation>,
}

/// Verify that every path an executor reports modifying falls inside the
/// task's declared write scope.
pub fn verify_capabilities(
    manifest: &Manifest,
    ownership: &OwnershipIndex,
    touches: &Touches,
    diff_paths: &[PathBuf],
) -> Result<CapabilityReport, ManifestError> {
    let writes: HashSet<String> = resolve_component_refs(manifest, &touches.writes)?
        .into_iter()
        .collect();

    let mut violations = Vec::new();
    for p in diff_paths {
        let abs = absolute(p);
        let owner = ownership.owning_component(&abs).map(|s| s.to_string());
        match &owner {
            Some(c) if !writes.contains(c) => {
                violations.push(CapabilityViolation {
                    path: abs,
                    declared: Some(c.clone()),
                    actual: Some(c.clone()),
                });
            }
            None if !writes.is_empty() => {
                violations.push(CapabilityViolation {
                    path: abs,
                    declared: None,
                    actual: None,
                });
            }
            _ => {}
        }
    }

    Ok(CapabilityReport {
        valid: violations.is_empty(),
        violations,
    })
}

fn absolute(p: &Path) -> PathBuf {
    // Paths are expected already-absolute per the executor-result contract
    // (spec §6); this is defensive normalization only, never a filesystem
    // round-trip (`canonicalize` would fail for paths the executor
    // reports but that no longer exist, e.g. a deleted file).
    p.to_path_buf()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartStrategyKind {
    IsolatedRetry,
    CascadeRestart,
    Escalate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartStrategy {
    pub kind: RestartStrategyKind,
    pub reason: String,
    pub affected_task_ids: Vec<String>,
}

/// Mechanically derive a restart strategy from `touches` topology alone —
/// no heuristics (spec §4.6).
pub fn derive_restart_strategy<T: AsTaskRef>(
    failed_task: &T,
    all_tasks: &[T],
    completed_ids: &HashSet<String>,
    dispatched_ids: &HashSet<String>,
) -> RestartStrategy {
    if failed_task.touches().writes.is_empty() {
        return RestartStrategy {
            kind: RestartStrategyKind::IsolatedRetry,
            reason: "task has no observable effect on downstream".to_string(),
            affected_task_ids: Vec::new(),
        };
    }

    let failed_writes: HashSet<&str> = failed_task
        .touches()
        .writes
        .iter()
        .map(|s| s.as_str())
        .collect();

    let mut readers: Vec<&str> = all_tasks
        .iter()
        .filter(|t| t.id() != failed_task.id())
        .filter(|t| {
            t.touches()
                .reads
                .iter()
                .any(|r| failed_writes.contains(r.as_str()))
        })
        .map(|t| t.id())
        .collect();
    readers.sort();

    let completed_readers: Vec<String> = readers
        .iter()
        .filter(|id| completed_ids.contains(**id))
        .map(|s| s.to_string())
        .collect();
    if !completed_readers.is_empty() {
        return RestartStrategy {
            kind: RestartStrategyKind::Escalate,
            reason: "completed downstream tasks consumed suspect output; cannot safely recover"
                .to_string(),
            affected_task_ids: completed_readers,
        };
    }

    let dispatched_readers: Vec<String> = readers
        .iter()
        .filter(|id| dispatched_ids.contains(**id))
        .map(|s| s.to_string())
        .collect();
    if !dispatched_readers.is_empty() {
        return RestartStrategy {
            kind: RestartStrategyKind::CascadeRestart,
            reason: "dispatched downstream tasks must be cancelled and re-executed".to_string(),
            affected_task_ids: dispatched_readers,
        };
    }

    RestartStrategy {
        kind: RestartStrategyKind::IsolatedRetry,
        reason: "no active downstream consumers".to_string(),
        affected_task_ids: Vec::new(),
    }
}
