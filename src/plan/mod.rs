//! Plan model, validation, and structural diffing.

pub mod diff;
pub mod model;
pub mod validate;

pub use diff::{diff_plans, ConditionDiff, FieldChange, PlanDiff, TaskDiff};
pub use model::{AsTaskRef, Condition, Contract, Plan, PlanMetadata, Task, TaskRef, Touches};
pub use validate::{validate_plan, ValidationIssue, ValidationResult};
