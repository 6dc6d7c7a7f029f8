//! Structural, order-insensitive diff between two plans (spec §4.10).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::plan::model::{Condition, Plan, Task};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDiff {
    pub task_id: String,
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDiff {
    pub metadata_changed: Vec<FieldChange>,
    pub preconditions: ConditionDiff,
    pub invariants: ConditionDiff,
    pub postconditions: ConditionDiff,
    pub tasks_added: Vec<String>,
    pub tasks_removed: Vec<String>,
    pub tasks_changed: Vec<TaskDiff>,
}

impl PlanDiff {
    pub fn is_empty(&self) -> bool {
        self.metadata_changed.is_empty()
            && self.preconditions == ConditionDiff::default()
            && self.invariants == ConditionDiff::default()
            && self.postconditions == ConditionDiff::default()
            && self.tasks_added.is_empty()
            && self.tasks_removed.is_empty()
            && self.tasks_changed.is_empty()
    }
}

pub fn diff_plans(a: &Plan, b: &Plan) -> PlanDiff {
    PlanDiff {
        metadata_changed: diff_metadata(a, b),
        preconditions: diff_conditions(&a.contract.preconditions, &b.contract.preconditions),
        invariants: diff_conditions(&a.contract.invariants, &b.contract.invariants),
        postconditions: diff_conditions(&a.contract.postconditions, &b.contract.postconditions),
        ..diff_tasks(a, b)
    }
}

fn diff_metadata(a: &Plan, b: &Plan) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    if a.metadata.name != b.metadata.name {
        changes.push(FieldChange {
            field: "metadata.name".to_string(),
            before: a.metadata.name.clone(),
            after: b.metadata.name.clone(),
        });
    }
    if a.metadata.description != b.metadata.description {
        changes.push(FieldChange {
            field: "metadata.description".to_string(),
            before: a.metadata.description.clone(),
            after: b.metadata.description.clone(),
        });
    }
    changes
}

fn diff_conditions(a: &[Condition], b: &[Condition]) -> ConditionDiff {
    let a_by_id: HashMap<&str, &Condition> = a.iter().map(|c| (c.id.as_str(), c)).collect();
    let b_by_id: HashMap<&str, &Condition> = b.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut added: Vec<String> = b_by_id.keys().filter(|id| !a_by_id.contains_key(*id)).map(|s| s.to_string()).collect();
    let mut removed: Vec<String> = a_by_id.keys().filter(|id| !b_by_id.contains_key(*id)).map(|s| s.to_string()).collect();
    let mut changed: Vec<String> = a_by_id
        .iter()
        .filter_map(|(id, ac)| {
            b_by_id.get(id).and_then(|bc| {
                if ac.verify != bc.verify || ac.critical != bc.critical {
                    Some(id.to_string())
                } else {
                    None
                }
            })
        })
        .collect();

    added.sort();
    removed.sort();
    changed.sort();
    ConditionDiff { added, removed, changed }
}

fn diff_tasks(a: &Plan, b: &Plan) -> PlanDiff {
    let a_by_id: HashMap<&str, &Task> = a.tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let b_by_id: HashMap<&str, &Task> = b.tasks.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut tasks_added: Vec<String> = b_by_id.keys().filter(|id| !a_by_id.contains_key(*id)).map(|s| s.to_string()).collect();
    let mut tasks_removed: Vec<String> = a_by_id.keys().filter(|id| !b_by_id.contains_key(*id)).map(|s| s.to_string()).collect();
    tasks_added.sort();
    tasks_removed.sort();

    let mut tasks_changed: Vec<TaskDiff> = a_by_id
        .iter()
        .filter_map(|(id, at)| b_by_id.get(id).map(|bt| (id, at, bt)))
        .filter_map(|(id, at, bt)| {
            let changes = diff_task_fields(at, bt);
            if changes.is_empty() {
                None
            } else {
                Some(TaskDiff {
                    task_id: id.to_string(),
                    changes,
                })
            }
        })
        .collect();
    tasks_changed.sort_by(|a, b| a.task_id.cmp(&b.task_id));

    PlanDiff {
        tasks_added,
        tasks_removed,
        tasks_changed,
        ..Default::default()
    }
}

fn diff_task_fields(a: &Task, b: &Task) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if a.description != b.description {
        changes.push(field_change("description", &a.description, &b.description));
    }
    if a.action != b.action {
        changes.push(field_change("action", &a.action, &b.action));
    }
    if a.values != b.values {
        changes.push(field_change("values", &format!("{:?}", a.values), &format!("{:?}", b.values)));
    }

    let a_reads: HashSet<&String> = a.touches.reads.iter().collect();
    let b_reads: HashSet<&String> = b.touches.reads.iter().collect();
    if a_reads != b_reads {
        changes.push(field_change(
            "touches.reads",
            &set_repr(&a_reads),
            &set_repr(&b_reads),
        ));
    }

    let a_writes: HashSet<&String> = a.touches.writes.iter().collect();
    let b_writes: HashSet<&String> = b.touches.writes.iter().collect();
    if a_writes != b_writes {
        changes.push(field_change(
            "touches.writes",
            &set_repr(&a_writes),
            &set_repr(&b_writes),
        ));
    }

    changes
}

fn field_change(field: &str, before: &str, after: &str) -> FieldChange {
    FieldChange {
        field: field.to_string(),
        before: before.to_string(),
        after: after.to_string(),
    }
}

fn set_repr(set: &HashSet<&String>) -> String {
    let mut items: Vec<&str> = set.iter().map(|s| s.as_str()).collect();
    items.sort();
    format!("{items:?}")
}
