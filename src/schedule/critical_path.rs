//! Memoized longest RAW-dependency chain (spec §4.5).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::hazards::{detect_hazards, Hazard, HazardKind};
use crate::plan::model::AsTaskRef;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPath {
    pub task_ids: Vec<String>,
    pub length: usize,
}

/// Compute the critical path over `tasks`, optionally reusing an
/// already-computed hazard list (the wave scheduler does this to avoid a
/// second O(n^2) pass).
pub fn critical_path<T: AsTaskRef>(tasks: &[T], hazards: Option<&[Hazard]>) -> CriticalPath {
    if tasks.is_empty() {
        return CriticalPath::default();
    }

    let owned_hazards;
    let hazards: &[Hazard] = match hazards {
        Some(h) => h,
        None => {
            owned_hazards = detect_hazards(tasks);
            &owned_hazards
        }
    };

    // predecessors(t) = sources of RAW hazards targeting t, sorted for
    // deterministic tie-breaking.
    let mut preds: HashMap<&str, Vec<&str>> = HashMap::new();
    for h in hazards {
        if h.kind == HazardKind::Raw {
            preds
                .entry(h.target_task_id.as_str())
                .or_default()
                .push(h.source_task_id.as_str());
        }
    }
    for v in preds.values_mut() {
        v.sort();
        v.dedup();
    }

    let mut ids: Vec<&str> = tasks.iter().map(|t| t.id()).collect();
    ids.sort();

    // memo: task id -> (length, best predecessor chosen for that length, or
    // None at a root).
    let mut memo: HashMap<&str, (usize, Option<&str>)> = HashMap::new();

    for id in &ids {
        longest_path_to(id, &preds, &mut memo);
    }

    let (&best_id, &(best_len, _)) = memo
        .iter()
        .max_by(|a, b| {
            a.1 .0
                .cmp(&b.1 .0)
                .then_with(|| b.0.cmp(a.0)) // prefer lexicographically smaller id on ties
        })
        .expect("memo populated for every task");

    let mut chain = vec![best_id.to_string()];
    let mut current = best_id;
    loop {
        let (_, pred) = memo[current];
        match pred {
            Some(p) => {
                chain.push(p.to_string());
                current = p;
            }
            None => break,
        }
    }
    chain.reverse();

    CriticalPath {
        task_ids: chain,
        length: best_len,
    }
}

fn longest_path_to<'a>(
    id: &'a str,
    preds: &HashMap<&'a str, Vec<&'a str>>,
    memo: &mut HashMap<&'a str, (usize, Option<&'a str>)>,
) -> usize {
    if let Some((len, _)) = memo.get(id) {
        return *len;
    }

    let predecessors = preds.get(id);
    let result = match predecessors {
        None => (1, None),
        Some(ps) if ps.is_empty() => (1, None),
        Some(ps) => {
            // Tie-break: among predecessors achieving the max length,
            // prefer the lexicographically smaller id.
            let mut best: Option<(usize, &str)> = None;
            for &p in ps {
                let plen = longest_path_to(p, preds, memo);
                let candidate = (plen + 1, p);
                best = Some(match best {
                    None => candidate,
                    Some((blen, bid)) => {
                        if candidate.0 > blen || (candidate.0 == blen && candidate.1 < bid) {
                            candidate
                        } else {
                            (blen, bid)
                        }
                    }
                });
            }
            let (len, pred) = best.unwrap();
            (len, Some(pred))
        }
    };

    memo.insert(id, result);
    result.0
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
    fn empty_tasks_yield_empty_path() {
        let result = critical_path::<TaskRef>(&[], None);
        assert_eq!(result.length, 0);
        assert!(result.task_ids.is_empty());
    }

    #[test]
    fn single_task_has_length_one() {
        let tasks = vec![t("1", &[], &["a"])];
        let result = critical_path(&tasks, None);
        assert_eq!(result.length, 1);
        assert_eq!(result.task_ids, vec!["1".to_string()]);
    }

    #[test]
    fn linear_chain() {
        let tasks = vec![
            t("1", &[], &["a"]),
            t("2", &["a"], &["b"]),
            t("3", &["b"], &[]),
        ];
        let result = critical_path(&tasks, None);
        assert_eq!(result.length, 3);
        assert_eq!(
            result.task_ids,
            vec!["1".to_string(), "2".to_string(), "3".to_string()]
        );
    }

    #[test]
    fn fan_out_diamond_length_three() {
        let tasks = vec![
            t("1", &[], &["core"]),
            t("2", &["core"], &["auth"]),
            t("3", &["core"], &["api"]),
            t("4", &["auth", "api"], &[]),
        ];
        let result = critical_path(&tasks, None);
        assert_eq!(result.length, 3);
    }
}
