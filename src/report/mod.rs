//! Reporting utilities: per-sub-node summaries and formatted terminal output.

use crate::domain::{Configuration, NodeType, SubNodeId, SuperNodeId};
use crate::graph::GraphRun;
use crate::math::SeriesStats;

pub mod format;

pub use format::*;

/// Boundary checks allow this much slack for floating-point rounding.
const BOUNDARY_EPS: f64 = 1e-9;

/// Summary of one generated sub node.
#[derive(Debug, Clone, PartialEq)]
pub struct SubNodeSummary {
    pub super_node: SuperNodeId,
    pub sub_node: SubNodeId,
    pub node_type: NodeType,
    pub stats: SeriesStats,
    /// Whether the final series stays inside the sub node's boundary.
    ///
    /// Always true for independent nodes; dependent nodes may leave it.
    pub within_boundary: bool,
}

/// Summarize every generated sub node, in generation order.
pub fn summarize(config: &Configuration, run: &GraphRun) -> Vec<SubNodeSummary> {
    let mut out = Vec::new();
    for &id in &run.order {
        let (Some(node), Some(subs)) = (config.supernodes.get(&id), run.store.super_node(id)) else {
            continue;
        };
        for (&sub, series) in subs {
            let Some(stats) = SeriesStats::from_values(series.values()) else {
                continue;
            };
            let within_boundary = node
                .boundaries
                .get(sub)
                .map(|b| b.contains(stats.min, BOUNDARY_EPS) && b.contains(stats.max, BOUNDARY_EPS))
                .unwrap_or(false);
            out.push(SubNodeSummary {
                super_node: id,
                sub_node: sub,
                node_type: node.node_type,
                stats,
                within_boundary,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Boundary, InputSpec, SuperNodeConfig};
    use crate::graph::{RunOptions, run};

    #[test]
    fn dependent_series_can_leave_their_boundary() {
        let cp = vec![0.0, 1.0, 2.0];
        let config = Configuration::new(20)
            .with_node(0, SuperNodeConfig::independent(vec![Boundary::new(100.0, 200.0)], cp.clone()))
            .with_node(
                1,
                SuperNodeConfig::dependent(vec![Boundary::new(0.0, 1.0)], cp, vec![InputSpec::new(0, 1.0, 1.0, vec![0])]),
            );
        let result = run(&config, RunOptions::default()).unwrap();
        let summary = summarize(&config, &result);

        assert_eq!(summary.len(), 2);
        assert!(summary[0].within_boundary);
        assert!(!summary[1].within_boundary);
        assert!(summary[1].stats.min >= 100.0);
    }
}
