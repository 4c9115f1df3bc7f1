//! Walks the configuration and generates every super node in dependency order.
//!
//! Ordering contract:
//!
//! - nodes are grouped by their dependency tier (independent = 0, dependent = 1)
//! - tiers run in ascending order; a tier is finished before the next one starts
//! - within a tier, nodes run in configuration iteration order (ascending id)
//!
//! A dependent node may therefore read any independent node, or a dependent node
//! with a smaller id. Anything else is a forward reference and fails the run.
//!
//! Each super node gets its own RNG, seeded from the run seed and the node id,
//! so results do not depend on how a tier is scheduled.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::info;

use crate::domain::{
    Configuration, GeneratedStore, NodeType, SubNodeFrame, SuperNodeConfig, SuperNodeId, Tier,
};
use crate::error::{GenError, GenResult};
use crate::graph::dependent::generate_dependent;
use crate::graph::expectations::ExpectationViolation;
use crate::graph::independent::{NodeOutput, generate_independent};

/// Options that are not part of the graph itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub seed: u64,
    /// Overrides `Configuration::noise` when set.
    pub noise: Option<f64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            noise: None,
        }
    }
}

/// Outputs of a complete run.
#[derive(Debug, Clone, Default)]
pub struct GraphRun {
    pub store: GeneratedStore,
    /// Export frames, in processing order.
    pub frames: Vec<SubNodeFrame>,
    pub violations: Vec<ExpectationViolation>,
    /// Super nodes in the order they were generated.
    pub order: Vec<SuperNodeId>,
}

/// One step of the processing plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStep {
    pub id: SuperNodeId,
    pub node_type: NodeType,
    pub tier: Tier,
}

/// Compute the processing order and check every reference without generating anything.
///
/// Traverses nodes in the same order as [`run`], so configuration problems surface
/// as the same first error a full run would hit.
pub fn plan(config: &Configuration) -> GenResult<Vec<PlanStep>> {
    check_run_settings(config)?;

    let mut available: BTreeMap<SuperNodeId, usize> = BTreeMap::new();
    let mut steps = Vec::with_capacity(config.supernodes.len());
    for (id, node) in config.processing_order() {
        node.validate(id)?;
        check_inputs(config, id, node, |source| available.get(&source).copied())?;
        available.insert(id, node.n_subnodes);
        steps.push(PlanStep {
            id,
            node_type: node.node_type,
            tier: node.tier(),
        });
    }
    Ok(steps)
}

/// Generate every super node of `config`.
///
/// Stops at the first error; a super node is committed to the store only when all
/// of its sub nodes succeeded.
pub fn run(config: &Configuration, options: RunOptions) -> GenResult<GraphRun> {
    check_run_settings(config)?;
    let noise = options.noise.unwrap_or(config.noise);

    let mut out = GraphRun::default();
    for tier in config.tiers() {
        let nodes = config.nodes_in_tier(tier);
        info!(tier = tier.0, nodes = nodes.len(), "generating tier");

        if tier.is_self_contained() {
            let store = &out.store;
            let results: Vec<(SuperNodeId, GenResult<NodeOutput>)> = nodes
                .par_iter()
                .map(|&(id, node)| (id, generate_node(id, node, config.n_cycles, noise, store, options.seed)))
                .collect();
            for (id, result) in results {
                commit(&mut out, id, result?)?;
            }
        } else {
            for (id, node) in nodes {
                node.validate(id)?;
                check_inputs(config, id, node, |source| out.store.super_node(source).map(|s| s.len()))?;
                let output = generate_node(id, node, config.n_cycles, noise, &out.store, options.seed)?;
                commit(&mut out, id, output)?;
            }
        }
    }
    Ok(out)
}

fn check_run_settings(config: &Configuration) -> GenResult<()> {
    if config.n_cycles == 0 {
        return Err(GenError::config("n_cycles must be greater than 0"));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(GenError::config(format!(
            "noise must be finite and >= 0, got {}",
            config.noise
        )));
    }
    Ok(())
}

/// Every input must name an already generated node and valid sub-node indices of it.
///
/// `generated` returns the sub-node count of a super node that is already available.
fn check_inputs(
    config: &Configuration,
    id: SuperNodeId,
    node: &SuperNodeConfig,
    generated: impl Fn(SuperNodeId) -> Option<usize>,
) -> GenResult<()> {
    for (j, input) in node.inputs.iter().enumerate() {
        let source = input.input_supernode;
        let Some(n_subs) = generated(source) else {
            let reason = if config.supernodes.contains_key(&source) {
                "is processed later (unsupported forward reference)"
            } else {
                "does not exist"
            };
            return Err(GenError::config(format!(
                "super node {id}: input {j} references super node {source}, which {reason}"
            )));
        };
        if let Some(&k) = input.connections.iter().find(|&&k| k >= n_subs) {
            return Err(GenError::config(format!(
                "super node {id}: input {j} connects to sub node {k} of super node {source}, \
                 which has {n_subs} sub nodes"
            )));
        }
    }
    Ok(())
}

fn generate_node(
    id: SuperNodeId,
    node: &SuperNodeConfig,
    n_cycles: usize,
    noise: f64,
    store: &GeneratedStore,
    seed: u64,
) -> GenResult<NodeOutput> {
    let mut rng = StdRng::seed_from_u64(node_seed(seed, id));
    match node.node_type {
        NodeType::Independent => generate_independent(id, node, n_cycles, noise, &mut rng),
        NodeType::Dependent => generate_dependent(id, node, n_cycles, noise, store, &mut rng),
    }
}

fn commit(out: &mut GraphRun, id: SuperNodeId, output: NodeOutput) -> GenResult<()> {
    let n_subs = output.series.len();
    out.store.insert(id, output.series)?;
    out.frames.extend(output.frames);
    out.violations.extend(output.violations);
    out.order.push(id);
    info!(super_node = id, sub_nodes = n_subs, "super node generated");
    Ok(())
}

/// Deterministic per-node seed derived from the run seed.
pub fn node_seed(seed: u64, id: SuperNodeId) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    id.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Boundary, InputSpec};

    fn unit() -> Vec<Boundary> {
        vec![Boundary::new(0.0, 1.0), Boundary::new(10.0, 20.0)]
    }

    fn cp() -> Vec<f64> {
        vec![0.0, 2.0, 1.0, 3.0]
    }

    fn graph() -> Configuration {
        Configuration::new(25)
            .with_node(0, SuperNodeConfig::independent(unit(), cp()))
            .with_node(
                1,
                SuperNodeConfig::dependent(unit(), cp(), vec![InputSpec::new(0, 0.8, 0.5, vec![0, 1])]),
            )
            .with_node(
                2,
                SuperNodeConfig::dependent(unit(), cp(), vec![InputSpec::new(1, -0.3, 1.0, vec![1])]),
            )
            .with_node(3, SuperNodeConfig::independent(unit(), cp()))
    }

    #[test]
    fn runs_independent_tier_before_dependent_tier() {
        let run = run(&graph(), RunOptions::default()).unwrap();
        assert_eq!(run.order, vec![0, 3, 1, 2]);
        assert_eq!(run.store.len(), 4);
        assert_eq!(run.frames.len(), 8);
        for (_, subs) in run.store.iter() {
            for series in subs.values() {
                assert_eq!(series.len(), 25);
            }
        }
    }

    #[test]
    fn dependent_may_reference_an_independent_declared_later() {
        let config = Configuration::new(10)
            .with_node(0, SuperNodeConfig::dependent(unit(), cp(), vec![InputSpec::new(5, 1.0, 1.0, vec![0])]))
            .with_node(5, SuperNodeConfig::independent(unit(), cp()));
        assert!(run(&config, RunOptions::default()).is_ok());
        assert!(plan(&config).is_ok());
    }

    #[test]
    fn forward_reference_between_dependents_is_rejected() {
        let config = Configuration::new(10)
            .with_node(0, SuperNodeConfig::independent(unit(), cp()))
            .with_node(1, SuperNodeConfig::dependent(unit(), cp(), vec![InputSpec::new(2, 1.0, 1.0, vec![0])]))
            .with_node(2, SuperNodeConfig::dependent(unit(), cp(), vec![InputSpec::new(0, 1.0, 1.0, vec![0])]));

        let err = run(&config, RunOptions::default()).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("forward reference"), "{err}");

        let err = plan(&config).unwrap_err();
        assert!(err.to_string().contains("forward reference"), "{err}");
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let a = run(&graph(), RunOptions { seed: 5, noise: None }).unwrap();
        let b = run(&graph(), RunOptions { seed: 5, noise: None }).unwrap();
        let c = run(&graph(), RunOptions { seed: 6, noise: None }).unwrap();
        assert_eq!(a.store, b.store);
        assert_ne!(a.store, c.store);
    }

    #[test]
    fn failing_node_aborts_the_run() {
        let mut config = graph();
        if let Some(node) = config.supernodes.get_mut(&2) {
            node.control_points = vec![1.0, 1.0, 1.0];
        }
        let err = run(&config, RunOptions { seed: 1, noise: Some(0.0) }).unwrap_err();
        assert!(matches!(err, GenError::Computation(_)));
    }

    #[test]
    fn plan_reports_bad_connection() {
        let config = Configuration::new(10)
            .with_node(0, SuperNodeConfig::independent(unit(), cp()))
            .with_node(1, SuperNodeConfig::dependent(unit(), cp(), vec![InputSpec::new(0, 1.0, 1.0, vec![2])]));
        let err = plan(&config).unwrap_err();
        assert!(err.to_string().contains("sub node 2"), "{err}");
    }
}
