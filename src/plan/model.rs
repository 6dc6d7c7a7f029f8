//! Plan, Task, and Touches types, plus the `AsTaskRef` narrowing trait that
//! lets scheduler-layer code (hazards, waves, critical path, capability)
//! depend only on `{id, touches, mutexes}` while planner-layer code keeps
//! the full `Task` record (spec §9, "polymorphism over task shapes").

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A task's read/write declaration over components and tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Touches {
    #[serde(default)]
    pub reads: Vec<String>,
    #[serde(default)]
    pub writes: Vec<String>,
}

/// The narrow view the scheduler subsystems operate on. Every operation in
/// `hazards`, `schedule`, and `capability` is generic over `AsTaskRef`
/// rather than concrete on `Task`, so planner-only fields never leak in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: String,
    pub touches: Touches,
    #[serde(default)]
    pub mutexes: HashSet<String>,
}

/// The full planner-layer task record: everything in `TaskRef` plus
/// free-text metadata that is opaque to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub touches: Touches,
    #[serde(default)]
    pub mutexes: HashSet<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Narrows any task-shaped record to the `{id, touches, mutexes}` view the
/// scheduler needs.
pub trait AsTaskRef {
    fn id(&self) -> &str;
    fn touches(&self) -> &Touches;
    fn mutexes(&self) -> &HashSet<String>;

    fn to_task_ref(&self) -> TaskRef {
        TaskRef {
            id: self.id().to_string(),
            touches: self.touches().clone(),
            mutexes: self.mutexes().clone(),
        }
    }
}

impl AsTaskRef for TaskRef {
    fn id(&self) -> &str {
        &self.id
    }
    fn touches(&self) -> &Touches {
        &self.touches
    }
    fn mutexes(&self) -> &HashSet<String> {
        &self.mutexes
    }
}

impl AsTaskRef for Task {
    fn id(&self) -> &str {
        &self.id
    }
    fn touches(&self) -> &Touches {
        &self.touches
    }
    fn mutexes(&self) -> &HashSet<String> {
        &self.mutexes
    }
}

/// A single precondition / invariant / postcondition entry in a plan's
/// contract. `critical` only has meaning on invariants; it is ignored
/// elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: String,
    pub verify: String,
    #[serde(default)]
    pub critical: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    #[serde(default)]
    pub preconditions: Vec<Condition>,
    #[serde(default)]
    pub invariants: Vec<Condition>,
    #[serde(default)]
    pub postconditions: Vec<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub metadata: PlanMetadata,
    #[serde(default)]
    pub contract: Contract,
    pub tasks: Vec<Task>,
}
