//! Coupling matrix: structural + behavioral signal fusion and hotspot
//! queries (spec §4.9).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cochange::parser::CoChangeGraph;
use crate::manifest::OwnershipIndex;
use crate::scan::imports::ImportScanReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplingClass {
    ExplicitModule,
    StableInterface,
    HiddenCoupling,
    Unrelated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingEntry {
    /// Unordered component pair, lexically sorted for stable identity.
    pub pair: (String, String),
    pub structural_weight: u32,
    pub behavioral_weight: f64,
    pub classification: CouplingClass,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouplingMatrixConfig {
    /// Override the structural threshold instead of using the median of
    /// positive weights.
    pub structural_threshold_override: Option<u32>,
    /// Override the behavioral threshold instead of using the median of
    /// positive weights.
    pub behavioral_threshold_override: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouplingMatrix {
    pub entries: Vec<CouplingEntry>,
    pub structural_threshold: u32,
    pub behavioral_threshold: f64,
}

pub fn build_coupling_matrix(
    co_change: &CoChangeGraph,
    imports: &ImportScanReport,
    ownership: &OwnershipIndex,
    config: &CouplingMatrixConfig,
) -> CouplingMatrix {
    let mut behavioral: HashMap<(String, String), f64> = HashMap::new();
    for edge in &co_change.edges {
        let (Some(a), Some(b)) = (
            ownership.owning_component(&edge.files.0),
            ownership.owning_component(&edge.files.1),
        ) else {
            continue;
        };
        if a == b {
            continue;
        }
        let pair = sorted_pair(a.to_string(), b.to_string());
        *behavioral.entry(pair).or_insert(0.0) += edge.weight;
    }

    let mut structural: HashMap<(String, String), u32> = HashMap::new();
    for dep in &imports.import_deps {
        if dep.from_component == dep.to_component {
            continue;
        }
        let pair = sorted_pair(dep.from_component.clone(), dep.to_component.clone());
        *structural.entry(pair).or_insert(0) += dep.evidence.len() as u32;
    }

    let mut all_pairs: std::collections::HashSet<(String, String)> =
        behavioral.keys().cloned().collect();
    all_pairs.extend(structural.keys().cloned());

    let structural_threshold = config
        .structural_threshold_override
        .unwrap_or_else(|| median_u32(structural.values().copied().filter(|&w| w > 0)));
    let behavioral_threshold = config
        .behavioral_threshold_override
        .unwrap_or_else(|| median_f64(behavioral.values().copied().filter(|&w| w > 0.0)));

    let mut entries: Vec<CouplingEntry> = all_pairs
        .into_iter()
        .map(|pair| {
            let s = structural.get(&pair).copied().unwrap_or(0);
            let b = behavioral.get(&pair).copied().unwrap_or(0.0);
            let classification = classify(s, b, structural_threshold, behavioral_threshold);
            CouplingEntry {
                pair,
                structural_weight: s,
                behavioral_weight: b,
                classification,
            }
        })
        .collect();
    entries.sort_by(|a, b| a.pair.cmp(&b.pair));

    CouplingMatrix {
        entries,
        structural_threshold,
        behavioral_threshold,
    }
}

fn classify(structural: u32, behavioral: f64, s_threshold: u32, b_threshold: f64) -> CouplingClass {
    let s_high = structural as f64 >= s_threshold as f64 && s_threshold > 0;
    let b_high = behavioral >= b_threshold && b_threshold > 0.0;
    match (s_high, b_high) {
        (true, true) => CouplingClass::ExplicitModule,
        (true, false) => CouplingClass::StableInterface,
        (false, true) => CouplingClass::HiddenCoupling,
        (false, false) => CouplingClass::Unrelated,
    }
}

fn sorted_pair(a: String, b: String) -> (String, String) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn median_u32(values: impl Iterator<Item = u32>) -> u32 {
    let mut v: Vec<u32> = values.collect();
    if v.is_empty() {
        return 0;
    }
    v.sort();
    v[v.len() / 2]
}

fn median_f64(values: impl Iterator<Item = f64>) -> f64 {
    let mut v: Vec<f64> = values.collect();
    if v.is_empty() {
        return 0.0;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap());
    v[v.len() / 2]
}

/// All entries classified `hidden_coupling`, sorted descending by
/// behavioral weight.
pub fn find_hidden_coupling(matrix: &CouplingMatrix) -> Vec<&CouplingEntry> {
    let mut hidden: Vec<&CouplingEntry> = matrix
        .entries
        .iter()
        .filter(|e| e.classification == CouplingClass::HiddenCoupling)
        .collect();
    hidden.sort_by(|a, b| b.behavioral_weight.partial_cmp(&a.behavioral_weight).unwrap());
    hidden
}

/// All entries touching `component`.
pub fn component_profile<'a>(matrix: &'a CouplingMatrix, component: &str) -> Vec<&'a CouplingEntry> {
    matrix
        .entries
        .iter()
        .filter(|e| e.pair.0 == component || e.pair.1 == component)
        .collect()
}
