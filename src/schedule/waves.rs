//! Topological wave assignment with critical-path-first intra-wave
//! ordering (spec §4.4).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::hazards::{detect_hazards, HazardKind};
use crate::plan::model::AsTaskRef;
use crate::schedule::critical_path::critical_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave<T> {
    pub id: usize,
    pub tasks: Vec<T>,
}

/// Assign tasks to parallel-safe execution waves. WAR hazards never create
/// ordering edges here — they are diagnostic only (spec §4.4); MUTEX
/// hazards are advisory and left to the executor to serialize within a
/// wave.
pub fn compute_waves<T: AsTaskRef + Clone>(tasks: &[T]) -> Result<Vec<Wave<T>>, AnalysisError> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }

    let hazards = detect_hazards(tasks);

    let mut deps: HashMap<&str, Vec<&str>> = HashMap::new();
    for h in &hazards {
        if h.kind == HazardKind::Raw || h.kind == HazardKind::Waw {
            let bucket = deps.entry(h.target_task_id.as_str()).or_default();
            if !bucket.contains(&h.source_task_id.as_str()) {
                bucket.push(h.source_task_id.as_str());
            }
        }
    }
    for v in deps.values_mut() {
        v.sort();
    }

    let mut wave_of: HashMap<&str, usize> = HashMap::new();
    let mut visiting: Vec<&str> = Vec::new();
    let mut visiting_set: HashSet<&str> = HashSet::new();

    let mut ids: Vec<&str> = tasks.iter().map(|t| t.id()).collect();
    ids.sort();

    for id in &ids {
        assign_wave(id, &deps, &mut wave_of, &mut visiting, &mut visiting_set, tasks)?;
    }

    let crit = critical_path(tasks, Some(&hazards));
    let on_critical_path: HashSet<&str> = crit.task_ids.iter().map(|s| s.as_str()).collect();

    let max_wave = *wave_of.values().max().unwrap_or(&0);
    let mut waves: Vec<Wave<T>> = (0..=max_wave)
        .map(|id| Wave { id, tasks: Vec::new() })
        .collect();

    let mut by_id: HashMap<&str, &T> = tasks.iter().map(|t| (t.id(), t)).collect();
    for id in &ids {
        let w = wave_of[id];
        if let Some(task) = by_id.remove(id) {
            waves[w].tasks.push(task.clone());
        }
    }

    for wave in &mut waves {
        wave.tasks.sort_by(|a, b| {
            let a_crit = on_critical_path.contains(a.id());
            let b_crit = on_critical_path.contains(b.id());
            match (a_crit, b_crit) {
                (true, false) => std::cmp::Ordering::Less,
                (false, true) => std::cmp::Ordering::Greater,
                _ => a.id().cmp(b.id()),
            }
        });
    }

    Ok(waves)
}

fn assign_wave<'a, T: AsTaskRef>(
    id: &'a str,
    deps: &HashMap<&'a str, Vec<&'a str>>,
    wave_of: &mut HashMap<&'a str, usize>,
    visiting: &mut Vec<&'a str>,
    visiting_set: &mut HashSet<&'a str>,
    tasks: &[T],
) -> Result<usize, AnalysisError> {
    if let Some(&w) = wave_of.get(id) {
        return Ok(w);
    }

    if visiting_set.contains(id) {
        let start = visiting.iter().position(|&v| v == id).unwrap_or(0);
        let cycle: Vec<String> = visiting[start..].iter().map(|s| s.to_string()).collect();
        return Err(cycle_error(&cycle, tasks));
    }

    visiting.push(id);
    visiting_set.insert(id);

    let parents = deps.get(id);
    let wave = match parents {
        None => 0,
        Some(ps) if ps.is_empty() => 0,
        Some(ps) => {
            let mut max = 0usize;
            for &p in ps {
                let pw = assign_wave(p, deps, wave_of, visiting, visiting_set, tasks)?;
                max = max.max(pw + 1);
            }
            max
        }
    };

    visiting.pop();
    visiting_set.remove(id);
    wave_of.insert(id, wave);
    Ok(wave)
}

/// If every task in the cycle shares a single write component, report the
/// specific single-scope variant with a downgrade hint (spec §4.4).
fn cycle_error<T: AsTaskRef>(cycle: &[String], tasks: &[T]) -> AnalysisError {
    let by_id: HashMap<&str, &T> = tasks.iter().map(|t| (t.id(), t)).collect();

    let mut shared: Option<&str> = None;
    let mut single_scope = !cycle.is_empty();
    for id in cycle {
        let Some(task) = by_id.get(id.as_str()) else {
            single_scope = false;
            break;
        };
        let writes = &task.touches().writes;
        if writes.len() != 1 {
            single_scope = false;
            break;
        }
        let w = writes[0].as_str();
        match shared {
            None => shared = Some(w),
            Some(existing) if existing == w => {}
            Some(_) => {
                single_scope = false;
                break;
            }
        }
    }

    if single_scope {
        if let Some(component) = shared {
            return AnalysisError::SingleScopeCycle {
                tasks: cycle.to_vec(),
                component: component.to_string(),
            };
        }
    }

    AnalysisError::CycleDetected(cycle.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::model::{TaskRef, Touches};
    use std::collections::HashSet as StdHashSet;

    fn t(id: &str, reads: &[&str], writes: &[&str]) -> TaskRef {
        TaskRef {
            id: id.to_string(),
            touches: Touches {
                reads: reads.iter().map(|s| s.to_string()).collect(),
                writes: writes.iter().map(|s| s.to_string()).collect(),
            },
            mutexes: StdHashSet::new(),
        }
    }

    #[test]
    fn empty_tasks_yield_empty_waves() {
        let waves = compute_waves::<TaskRef>(&[]).unwrap();
        assert!(waves.is_empty());
    }

    #[test]
    fn linear_chain_three_waves() {
        let tasks = vec![
            t("1", &[], &["a"]),
            t("2", &["a"], &["b"]),
            t("3", &["b"], &[]),
        ];
        let waves = compute_waves(&tasks).unwrap();
        assert_eq!(waves.len(), 3);
        for w in &waves {
            assert_eq!(w.tasks.len(), 1);
        }
        assert_eq!(waves[0].tasks[0].id, "1");
        assert_eq!(waves[2].tasks[0].id, "3");
    }

    #[test]
    fn fan_out_diamond_three_waves() {
        let tasks = vec![
            t("1", &[], &["core"]),
            t("2", &["core"], &["auth"]),
            t("3", &["core"], &["api"]),
            t("4", &["auth", "api"], &[]),
        ];
        let waves = compute_waves(&tasks).unwrap();
        assert_eq!(waves.len(), 3);
        assert_eq!(waves[0].tasks.len(), 1);
        assert_eq!(waves[1].tasks.len(), 2);
        assert_eq!(waves[2].tasks.len(), 1);
        // critical-path-first ordering within wave 1 (both 2 and 3 could be
        // on the critical path tie; deterministic id order is the fallback)
        assert_eq!(waves[1].tasks[0].id, "2");
    }

    #[test]
    fn waw_merge_two_waves() {
        let tasks = vec![t("1", &[], &["auth"]), t("2", &[], &["auth"])];
        let waves = compute_waves(&tasks).unwrap();
        assert_eq!(waves.len(), 2);
        assert_eq!(waves[0].tasks[0].id, "1");
        assert_eq!(waves[1].tasks[0].id, "2");
    }

    #[test]
    fn war_hazard_alone_does_not_block_same_wave_grouping_beyond_its_raw_counterpart() {
        // 1 reads a, 2 writes a: this pair produces both RAW(2->1, a) and
        // WAR(1->2, a) per the literal pairwise rules in spec §4.3 (WAR is
        // only suppressed when the reader also writes the component). Only
        // the RAW edge affects wave assignment, so 2 (the writer) lands
        // strictly before 1 (the reader).
        let tasks = vec![t("1", &["a"], &[]), t("2", &[], &["a"])];
        let waves = compute_waves(&tasks).unwrap();
        assert_eq!(waves.len(), 2);
        assert_eq!(waves[0].tasks[0].id, "2");
        assert_eq!(waves[1].tasks[0].id, "1");
    }

    #[test]
    fn single_task_one_wave() {
        let tasks = vec![t("1", &[], &["a"])];
        let waves = compute_waves(&tasks).unwrap();
        assert_eq!(waves.len(), 1);
        assert_eq!(waves[0].tasks.len(), 1);
    }
}
