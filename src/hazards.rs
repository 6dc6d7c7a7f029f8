//! Pairwise RAW/WAR/WAW/MUTEX hazard detection over task `touches`
//! declarations (spec §4.3).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::plan::model::AsTaskRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HazardKind {
    Raw,
    War,
    Waw,
    Mutex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hazard {
    pub kind: HazardKind,
    pub source_task_id: String,
    pub target_task_id: String,
    /// The component (or mutex name, for `Mutex` hazards) the hazard is
    /// keyed on.
    pub component: String,
}

/// Detect all RAW/WAR/WAW/MUTEX hazards among `tasks`. Pure function of its
/// input; deterministic regardless of input order (spec §8 invariant 6) —
/// pairs are always considered in `id`-sorted order and hazards are emitted
/// in task-pair order then component lexical order (spec §4.3).
pub fn detect_hazards<T: AsTaskRef>(tasks: &[T]) -> Vec<Hazard> {
    let mut sorted: Vec<&T> = tasks.iter().collect();
    sorted.sort_by(|a, b| a.id().cmp(b.id()));

    let mut hazards = Vec::new();

    for i in 0..sorted.len() {
        for j in (i + 1)..sorted.len() {
            let a = sorted[i];
            let b = sorted[j];
            debug_assert!(a.id() < b.id());
            hazards.extend(pairwise_hazards(a, b));
        }
    }

    hazards
}

fn pairwise_hazards<T: AsTaskRef>(a: &T, b: &T) -> Vec<Hazard> {
    let wa: BTreeSet<&str> = a.touches().writes.iter().map(|s| s.as_str()).collect();
    let ra: BTreeSet<&str> = a.touches().reads.iter().map(|s| s.as_str()).collect();
    let wb: BTreeSet<&str> = b.touches().writes.iter().map(|s| s.as_str()).collect();
    let rb: BTreeSet<&str> = b.touches().reads.iter().map(|s| s.as_str()).collect();

    let mut components: BTreeSet<&str> = BTreeSet::new();
    components.extend(&wa);
    components.extend(&ra);
    components.extend(&wb);
    components.extend(&rb);

    let mut out = Vec::new();
    for c in components {
        if wa.contains(c) && rb.contains(c) {
            out.push(hazard(HazardKind::Raw, a.id(), b.id(), c));
        }
        if wb.contains(c) && ra.contains(c) {
            out.push(hazard(HazardKind::Raw, b.id(), a.id(), c));
        }
        if wa.contains(c) && wb.contains(c) {
            out.push(hazard(HazardKind::Waw, a.id(), b.id(), c));
        }
        if ra.contains(c) && wb.contains(c) && !wa.contains(c) {
            out.push(hazard(HazardKind::War, a.id(), b.id(), c));
        }
        if rb.contains(c) && wa.contains(c) && !wb.contains(c) {
            out.push(hazard(HazardKind::War, b.id(), a.id(), c));
        }
    }

    let mut mutexes: Vec<&String> = a.mutexes().intersection(b.mutexes()).collect();
    mutexes.sort();
    for m in mutexes {
        out.push(hazard(HazardKind::Mutex, a.id(), b.id(), m));
    }

    out
}

fn hazard(kind: HazardKind, source: &str, target: &str, component: &str) -> Hazard {
    Hazard {
        kind,
        source_task_id: source.to_string(),
        target_task_id: target.to_string(),
        component: component.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::model::{TaskRef, Touches};
    use std::collections::HashSet;

    fn t(id: &str, reads: &[&str], writes: &[&str]) -> TaskRef {
        TaskRef {
            id: id.to_string(),
            touches: Touches {
                reads: reads.iter().map(|s| s.to_string()).collect(),
                writes: writes.iter().map(|s| s.to_string()).collect(),
            },
            mutexes: HashSet::new(),
        }
    }

    #[test]
    fn raw_hazard_between_writer_and_reader() {
        let tasks = vec![t("1", &[], &["a"]), t("2", &["a"], &[])];
        let hazards = detect_hazards(&tasks);
        assert_eq!(hazards.len(), 1);
        assert_eq!(hazards[0].kind, HazardKind::Raw);
        assert_eq!(hazards[0].source_task_id, "1");
        assert_eq!(hazards[0].target_task_id, "2");
    }

    #[test]
    fn waw_hazard_between_two_writers() {
        let tasks = vec![t("1", &[], &["a"]), t("2", &[], &["a"])];
        let hazards = detect_hazards(&tasks);
        assert_eq!(hazards.len(), 1);
        assert_eq!(hazards[0].kind, HazardKind::Waw);
    }

    #[test]
    fn war_suppressed_when_reader_also_writes() {
        // task 1 reads+writes a, task 2 writes a: WAW + RAW should appear,
        // but WAR(1->2) must be suppressed since 1 also writes a.
        let tasks = vec![t("1", &["a"], &["a"]), t("2", &[], &["a"])];
        let hazards = detect_hazards(&tasks);
        assert!(hazards.iter().any(|h| h.kind == HazardKind::Waw));
        assert!(!hazards.iter().any(|h| h.kind == HazardKind::War));
    }

    #[test]
    fn mutex_hazard_on_shared_lock() {
        let mut a = t("1", &[], &[]);
        a.mutexes.insert("lock".to_string());
        let mut b = t("2", &[], &[]);
        b.mutexes.insert("lock".to_string());
        let hazards = detect_hazards(&[a, b]);
        assert_eq!(hazards.len(), 1);
        assert_eq!(hazards[0].kind, HazardKind::Mutex);
        assert_eq!(hazards[0].component, "lock");
    }

    #[test]
    fn detection_is_order_independent() {
        let forward = vec![t("1", &[], &["a"]), t("2", &["a"], &[])];
        let backward = vec![t("2", &["a"], &[]), t("1", &[], &["a"])];
        assert_eq!(detect_hazards(&forward), detect_hazards(&backward));
    }

    #[test]
    fn disjoint_touches_produce_no_hazards() {
        let tasks = vec![t("1", &[], &["a"]), t("2", &[], &["b"])];
        assert!(detect_hazards(&tasks).is_empty());
    }
}
