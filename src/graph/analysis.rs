//! Structural summary of a topology.
//!
//! Provides degree statistics, isolated nodes, connected components and
//! per-kind node counts. Used by the text renderer's summary block and by
//! the interactive session's `stats` command.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;

use super::model::GraphModel;

/// Statistical summary of node degrees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub median: f64,
}

/// Structural summary of a graph
#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub link_count: usize,
    pub degree: DegreeStats,
    /// Nodes with no links at all
    pub isolated_nodes: Vec<String>,
    /// Connected components, each sorted, largest first
    pub components: Vec<Vec<String>>,
    /// Node count per kind label
    pub kinds: BTreeMap<String, usize>,
}

impl GraphSummary {
    /// Multi-line human readable report
    pub fn report(&self) -> String {
        let mut out = format!(
            "{} nodes, {} links, {} component(s)\n",
            self.node_count,
            self.link_count,
            self.components.len()
        );
        if self.node_count > 0 {
            out.push_str(&format!(
                "degree: min {} / max {} / mean {:.2} / median {:.1}\n",
                self.degree.min, self.degree.max, self.degree.mean, self.degree.median
            ));
        }
        if !self.kinds.is_empty() {
            let kinds: Vec<String> =
                self.kinds.iter().map(|(k, n)| format!("{}={}", k, n)).collect();
            out.push_str(&format!("kinds: {}\n", kinds.join(", ")));
        }
        if !self.isolated_nodes.is_empty() {
            out.push_str(&format!("isolated: {}\n", self.isolated_nodes.join(", ")));
        }
        out
    }
}

/// Summarize the structure of `graph`
pub fn summarize(graph: &GraphModel) -> GraphSummary {
    let ids = graph.sorted_ids();
    let degrees: Vec<usize> = ids.iter().map(|id| graph.degree(id)).collect();

    let isolated_nodes = ids
        .iter()
        .filter(|id| graph.degree(id) == 0)
        .map(|id| id.to_string())
        .collect();

    let mut kinds = BTreeMap::new();
    for node in graph.nodes() {
        *kinds.entry(node.kind.clone()).or_insert(0) += 1;
    }

    GraphSummary {
        node_count: graph.node_count(),
        link_count: graph.link_count(),
        degree: calculate_stats(&degrees),
        isolated_nodes,
        components: connected_components(graph),
        kinds,
    }
}

/// Group nodes into connected components
///
/// Components are discovered breadth-first from identifiers in sorted order,
/// then ordered largest first (ties keep discovery order).
pub fn connected_components(graph: &GraphModel) -> Vec<Vec<String>> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut components = Vec::new();

    for start in graph.sorted_ids() {
        if !seen.insert(start) {
            continue;
        }
        let mut component = vec![start.to_string()];
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for next in graph.neighbors(current).into_iter().flatten() {
                if seen.insert(next.as_str()) {
                    component.push(next.clone());
                    queue.push_back(next.as_str());
                }
            }
        }

        component.sort();
        components.push(component);
    }

    components.sort_by(|a, b| b.len().cmp(&a.len()));
    components
}

fn calculate_stats(values: &[usize]) -> DegreeStats {
    if values.is_empty() {
        return DegreeStats {
            min: 0,
            max: 0,
            mean: 0.0,
            median: 0.0,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mean = sorted.iter().sum::<usize>() as f64 / sorted.len() as f64;
    let median = if sorted.len() % 2 == 0 {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) as f64 / 2.0
    } else {
        sorted[sorted.len() / 2] as f64
    };

    DegreeStats {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean,
        median,
    }
}
