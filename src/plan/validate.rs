//! Plan validation against a manifest (spec §4.10).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::manifest::{resolve_component_refs, Manifest};
use crate::plan::model::{Condition, Plan};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    pub task_id: Option<String>,
}

impl ValidationIssue {
    fn new(code: &str, message: impl Into<String>, task_id: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            task_id: task_id.map(|s| s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate `plan` against `manifest`. Never fails — bad input is reported
/// as `errors`/`warnings` in the returned report rather than propagated as
/// a `PlanError`, since a caller usually wants the complete list of
/// problems in one pass rather than fail-fast-on-first.
pub fn validate_plan(plan: &Plan, manifest: &Manifest) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_unique_task_ids(plan, &mut errors);

    for task in &plan.tasks {
        check_refs_resolve(manifest, task, &mut errors);
        check_mutex_names(task, &mut errors);
    }

    check_dep_consistency(manifest, plan, &mut warnings);

    check_conditions(&plan.contract.preconditions, "preconditions", &mut errors);
    check_conditions(&plan.contract.invariants, "invariants", &mut errors);
    check_conditions(&plan.contract.postconditions, "postconditions", &mut errors);

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_unique_task_ids(plan: &Plan, errors: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for task in &plan.tasks {
        if !seen.insert(task.id.clone()) {
            errors.push(ValidationIssue::new(
                "duplicate_task_id",
                format!("duplicate task id: {}", task.id),
                Some(&task.id),
            ));
        }
    }
}

fn check_refs_resolve(
    manifest: &Manifest,
    task: &crate::plan::model::Task,
    errors: &mut Vec<ValidationIssue>,
) {
    for reference in task.touches.reads.iter().chain(task.touches.writes.iter()) {
        if resolve_component_refs(manifest, std::slice::from_ref(reference)).is_err() {
            errors.push(ValidationIssue::new(
                "unknown_ref",
                format!("task {} references unknown component or tag: {reference}", task.id),
                Some(&task.id),
            ));
        }
    }
}

fn check_mutex_names(task: &crate::plan::model::Task, errors: &mut Vec<ValidationIssue>) {
    for m in &task.mutexes {
        if m.trim().is_empty() {
            errors.push(ValidationIssue::new(
                "empty_mutex_name",
                format!("task {} has an empty mutex name", task.id),
                Some(&task.id),
            ));
        }
    }
}

/// Warn when a task writes to a component `w` but none of its declared
/// reads is `w` itself or a (transitive) dependent of `w` — i.e. nothing in
/// the task's own read set explains why it is allowed to touch `w` per the
/// declared dependency graph. This is advisory: capability checks at
/// execution time are authoritative (spec §4.10).
fn check_dep_consistency(manifest: &Manifest, plan: &Plan, warnings: &mut Vec<ValidationIssue>) {
    let forward_deps = build_forward_deps(manifest);

    for task in &plan.tasks {
        let Ok(writes) = resolve_component_refs(manifest, &task.touches.writes) else {
            continue;
        };
        let Ok(reads) = resolve_component_refs(manifest, &task.touches.reads) else {
            continue;
        };
        if reads.is_empty() {
            continue;
        }
        for w in &writes {
            let reachable = reads
                .iter()
                .any(|r| r == w || depends_on(&forward_deps, r, w));
            if !reachable {
                warnings.push(ValidationIssue::new(
                    "write_not_reachable_from_reads",
                    format!(
                        "task {} writes {w} but no read component depends on it per the declared dependency graph",
                        task.id
                    ),
                    Some(&task.id),
                ));
            }
        }
    }
}

fn build_forward_deps(manifest: &Manifest) -> HashMap<&str, Vec<&str>> {
    manifest
        .components
        .iter()
        .map(|c| (c.name.as_str(), c.deps.iter().map(|d| d.as_str()).collect()))
        .collect()
}

/// True iff `from` transitively depends on `to` (reachable by walking
/// `deps` forward from `from`).
fn depends_on(forward_deps: &HashMap<&str, Vec<&str>>, from: &str, to: &str) -> bool {
    let mut stack = vec![from];
    let mut visited: HashSet<&str> = HashSet::new();
    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        if let Some(deps) = forward_deps.get(current) {
            for &dep in deps {
                if dep == to {
                    return true;
                }
                stack.push(dep);
            }
        }
    }
    false
}

fn check_conditions(conditions: &[Condition], section: &str, errors: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for c in conditions {
        if !seen.insert(c.id.clone()) {
            errors.push(ValidationIssue::new(
                "duplicate_condition_id",
                format!("{section} has duplicate condition id: {}", c.id),
                None,
            ));
        }
        if c.verify.trim().is_empty() {
            errors.push(ValidationIssue::new(
                "empty_verify_command",
                format!("{section} condition {} has an empty verify command", c.id),
                None,
            ));
        }
    }
}
