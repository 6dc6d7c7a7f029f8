//! Dependency-graph validation and the invalidation cascade over a
//! [`Manifest`]'s component `deps` edges.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::algo::toposort;

use crate::error::ManifestError;
use crate::manifest::model::Manifest;

/// A deterministic topological order of component names, built on
/// `deps` edges (an edge `a -> b` meaning "a depends on b"). The order
/// lists dependencies before dependents, so the caller sees `b` before `a`.
///
/// Fails with [`ManifestError::CycleDetected`] if the dep graph isn't a DAG;
/// the cycle's member names are reported in insertion order for
/// reproducible diagnostics, not in whatever order `petgraph` discovers
/// them.
pub fn topological_order(manifest: &Manifest) -> Result<Vec<String>, ManifestError> {
    let (graph, index_of) = build_graph(manifest);

    match toposort(&graph, None) {
        Ok(order) => {
            // toposort yields dependents-before-dependencies for our edge
            // direction (a -> b means a depends on b, so a must wait on b);
            // petgraph's toposort actually yields nodes with no *incoming*
            // edges first, which for our a->b ("a needs b") convention are
            // the *dependents* with nothing depending on them. Reverse so
            // dependencies precede dependents.
            let mut names: Vec<String> = order
                .into_iter()
                .map(|idx| graph[idx].clone())
                .collect();
            names.reverse();
            Ok(names)
        }
        Err(cycle) => {
            let offender = cycle.node_id();
            let members = find_cycle_members(&graph, offender, &index_of);
            Err(ManifestError::CycleDetected(members))
        }
    }
}

fn build_graph(manifest: &Manifest) -> (DiGraph<String, ()>, HashMap<String, NodeIndex>) {
    let mut graph = DiGraph::new();
    let mut index_of = HashMap::new();

    for c in &manifest.components {
        let idx = graph.add_node(c.name.clone());
        index_of.insert(c.name.clone(), idx);
    }
    for c in &manifest.components {
        let from = index_of[&c.name];
        for dep in &c.deps {
            if let Some(&to) = index_of.get(dep) {
                graph.add_edge(from, to, ());
            }
        }
    }
    (graph, index_of)
}

/// Starting from a node `toposort` flagged as part of a cycle, walk forward
/// along edges to recover the full cycle membership for error reporting.
/// `toposort`'s cycle report only guarantees one offending node, not the
/// whole loop, so this does a bounded DFS back to the start.
fn find_cycle_members(
    graph: &DiGraph<String, ()>,
    start: NodeIndex,
    index_of: &HashMap<String, NodeIndex>,
) -> Vec<String> {
    let mut stack = vec![(start, vec![start])];
    let mut visited = HashSet::new();

    while let Some((node, path)) = stack.pop() {
        for neighbor in graph.neighbors(node) {
            if neighbor == start {
                let mut names: Vec<String> =
                    path.iter().map(|&idx| graph[idx].clone()).collect();
                names.sort();
                return names;
            }
            if visited.insert(neighbor) {
                let mut next_path = path.clone();
                next_path.push(neighbor);
                stack.push((neighbor, next_path));
            }
        }
    }

    // Fallback: couldn't reconstruct the loop (shouldn't happen for a real
    // cycle), just report the one node petgraph flagged.
    let _ = index_of;
    vec![graph[start].clone()]
}

/// Given a set of components whose contents changed, compute the full set
/// of components whose plans/docs should be considered stale: the changed
/// set plus everything that transitively depends on any of them (reverse
/// BFS over `deps` edges).
pub fn invalidation_cascade(manifest: &Manifest, changed: &[String]) -> Vec<String> {
    let mut reverse_deps: HashMap<&str, Vec<&str>> = HashMap::new();
    for c in &manifest.components {
        for dep in &c.deps {
            reverse_deps.entry(dep.as_str()).or_default().push(c.name.as_str());
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<String> = Vec::new();
    let mut queue: VecDeque<String> = VecDeque::new();

    for name in changed {
        if seen.insert(name.clone()) {
            out.push(name.clone());
            queue.push_back(name.clone());
        }
    }

    while let Some(name) = queue.pop_front() {
        if let Some(dependents) = reverse_deps.get(name.as_str()) {
            for &dependent in dependents {
                if seen.insert(dependent.to_string()) {
                    out.push(dependent.to_string());
                    queue.push_back(dependent.to_string());
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::model::{Component, PathSpec, Stability};

    fn comp(name: &str, deps: &[&str]) -> Component {
        Component {
            name: name.to_string(),
            path: PathSpec::One(format!("src/{name}")),
            deps: deps.iter().map(|s| s.to_string()).collect(),
            docs: vec![],
            tags: vec![],
            env: vec![],
            stability: Stability::Active,
            test: None,
            normalized_paths: vec![],
        }
    }

    #[test]
    fn topological_order_places_deps_first() {
        let m = Manifest::new(
            "1".into(),
            vec![comp("api", &["core"]), comp("core", &[])],
            "/repo",
        )
        .unwrap();
        let order = topological_order(&m).unwrap();
        let core_pos = order.iter().position(|n| n == "core").unwrap();
        let api_pos = order.iter().position(|n| n == "api").unwrap();
        assert!(core_pos < api_pos);
    }

    #[test]
    fn invalidation_cascade_includes_transitive_dependents() {
        let m = Manifest::new(
            "1".into(),
            vec![
                comp("core", &[]),
                comp("api", &["core"]),
                comp("web", &["api"]),
                comp("unrelated", &[]),
            ],
            "/repo",
        )
        .unwrap();
        let affected = invalidation_cascade(&m, &["core".to_string()]);
        assert_eq!(affected, vec!["core".to_string(), "api".to_string(), "web".to_string()]);
    }

    #[test]
    fn invalidation_cascade_is_breadth_first_not_alphabetical() {
        // core <- api <- web, and core <- aaa (a sibling dependent that
        // sorts first alphabetically but is reached after api/web in BFS
        // order since it's inserted into the queue after them).
        let m = Manifest::new(
            "1".into(),
            vec![
                comp("core", &[]),
                comp("api", &["core"]),
                comp("web", &["api"]),
                comp("aaa", &["web"]),
            ],
            "/repo",
        )
        .unwrap();
        let affected = invalidation_cascade(&m, &["core".to_string()]);
        assert_eq!(
            affected,
            vec![
                "core".to_string(),
                "api".to_string(),
                "web".to_string(),
                "aaa".to_string(),
            ]
        );
    }

    #[test]
    fn invalidation_cascade_with_no_dependents_is_identity() {
        let m = Manifest::new("1".into(), vec![comp("lone", &[])], "/repo").unwrap();
        let affected = invalidation_cascade(&m, &["lone".to_string()]);
        assert_eq!(affected, vec!["lone".to_string()]);
    }
}
