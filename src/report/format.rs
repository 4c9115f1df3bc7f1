//! Formatted terminal output.
//!
//! We keep formatting code in one place so the generation code stays clean and
//! output changes are localized.

use crate::domain::Configuration;
use crate::graph::{ExpectationViolation, PlanStep};
use crate::report::SubNodeSummary;

/// Format the run summary: one row per generated sub node, then any expectation violations.
pub fn format_run_summary(
    config: &Configuration,
    summary: &[SubNodeSummary],
    violations: &[ExpectationViolation],
    seed: u64,
    noise: f64,
) -> String {
    let mut out = String::new();

    out.push_str("=== gsgen - graph series generation ===\n");
    out.push_str(&format!(
        "Super nodes: {} | Cycles: {} | Noise: {noise} | Seed: {seed}\n",
        config.supernodes.len(),
        config.n_cycles
    ));
    out.push('\n');
    out.push_str(&format!(
        "{:<6} {:<4} {:<12} {:>6} {:>14} {:>14} {:>14}  {}\n",
        "super", "sub", "type", "len", "min", "max", "mean", "bounds"
    ));
    for s in summary {
        out.push_str(&format!(
            "{:<6} {:<4} {:<12} {:>6} {:>14.4} {:>14.4} {:>14.4}  {}\n",
            s.super_node,
            s.sub_node,
            s.node_type.display_name(),
            s.stats.len,
            s.stats.min,
            s.stats.max,
            s.stats.mean,
            if s.within_boundary { "ok" } else { "outside" }
        ));
    }

    if !violations.is_empty() {
        out.push('\n');
        out.push_str(&format!("Expectation violations ({}):\n", violations.len()));
        for v in violations {
            out.push_str(&format!("  - {v}\n"));
        }
    }

    out
}

/// Format the processing plan produced by `gsgen check`.
pub fn format_plan(steps: &[PlanStep]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Configuration OK: {} super nodes\n", steps.len()));
    out.push_str("Processing order:\n");
    for (i, step) in steps.iter().enumerate() {
        out.push_str(&format!(
            "  {:>3}. super node {} ({}, tier {})\n",
            i + 1,
            step.id,
            step.node_type.display_name(),
            step.tier.0
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeType, Tier};

    #[test]
    fn plan_lists_steps_in_order() {
        let steps = [
            PlanStep { id: 3, node_type: NodeType::Independent, tier: Tier::INDEPENDENT },
            PlanStep { id: 1, node_type: NodeType::Dependent, tier: Tier::DEPENDENT },
        ];
        let txt = format_plan(&steps);
        assert_eq!(
            txt,
            concat!(
                "Configuration OK: 2 super nodes\n",
                "Processing order:\n",
                "    1. super node 3 (independent, tier 0)\n",
                "    2. super node 1 (dependent, tier 1)\n",
            )
        );
    }
}
