//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built from a parsed configuration document (or directly in code/tests)
//! - read by the generators during a run
//! - exported to CSV/JSON afterwards

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};

/// Identifier of a super node (the integer key in the configuration).
pub type SuperNodeId = u32;

/// Index of a sub node within its super node.
pub type SubNodeId = usize;

/// How a super node obtains its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Base curve only.
    Independent,
    /// Base curve plus weighted contributions from already generated nodes.
    Dependent,
}

impl NodeType {
    /// Dependency tier used by the orchestrator to order processing.
    pub fn tier(self) -> Tier {
        match self {
            NodeType::Independent => Tier::INDEPENDENT,
            NodeType::Dependent => Tier::DEPENDENT,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            NodeType::Independent => "independent",
            NodeType::Dependent => "dependent",
        }
    }
}

/// Processing tier. Lower tiers are fully generated before higher tiers start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tier(pub u8);

impl Tier {
    pub const INDEPENDENT: Tier = Tier(0);
    pub const DEPENDENT: Tier = Tier(1);

    /// Nodes of this tier never read each other, so they may be generated concurrently.
    pub fn is_self_contained(self) -> bool {
        self == Tier::INDEPENDENT
    }
}

/// Target value range `[min, max]` for one sub node's base curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub min: f64,
    pub max: f64,
}

impl Boundary {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn validate(&self) -> GenResult<()> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(GenError::config(format!(
                "boundary ({}, {}) must be finite",
                self.min, self.max
            )));
        }
        if self.min >= self.max {
            return Err(GenError::config(format!(
                "boundary ({}, {}) must satisfy min < max",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, value: f64, eps: f64) -> bool {
        value >= self.min - eps && value <= self.max + eps
    }
}

/// Optional, advisory expectations about one input's contribution.
///
/// These never influence generation; they are checked after the fact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub mean: Option<f64>,
}

impl Expectation {
    pub fn is_empty(&self) -> bool {
        self.lower_bound.is_none() && self.upper_bound.is_none() && self.mean.is_none()
    }
}

/// One incoming edge of a dependent super node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub input_supernode: SuperNodeId,
    pub correlation: f64,
    pub weight: f64,
    /// Sub-node indices of `input_supernode` that are summed into each target sub node.
    pub connections: Vec<SubNodeId>,
    #[serde(default)]
    pub expectation: Expectation,
}

impl InputSpec {
    pub fn new(input_supernode: SuperNodeId, correlation: f64, weight: f64, connections: Vec<SubNodeId>) -> Self {
        Self {
            input_supernode,
            correlation,
            weight,
            connections,
            expectation: Expectation::default(),
        }
    }

    /// Factor applied to every referenced series: `weight * correlation`.
    pub fn scale(&self) -> f64 {
        self.weight * self.correlation
    }
}

/// Configuration of one super node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperNodeConfig {
    pub node_type: NodeType,
    pub n_subnodes: usize,
    pub boundaries: Vec<Boundary>,
    pub control_points: Vec<f64>,
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
}

impl SuperNodeConfig {
    pub fn independent(boundaries: Vec<Boundary>, control_points: Vec<f64>) -> Self {
        Self {
            node_type: NodeType::Independent,
            n_subnodes: boundaries.len(),
            boundaries,
            control_points,
            inputs: Vec::new(),
        }
    }

    pub fn dependent(boundaries: Vec<Boundary>, control_points: Vec<f64>, inputs: Vec<InputSpec>) -> Self {
        Self {
            node_type: NodeType::Dependent,
            n_subnodes: boundaries.len(),
            boundaries,
            control_points,
            inputs,
        }
    }

    pub fn tier(&self) -> Tier {
        self.node_type.tier()
    }

    pub fn boundary(&self, sub: SubNodeId) -> GenResult<Boundary> {
        self.boundaries.get(sub).copied().ok_or_else(|| {
            GenError::config(format!(
                "sub node {sub} has no boundary ({} boundaries declared)",
                self.boundaries.len()
            ))
        })
    }

    /// Checks everything that can be checked without looking at other nodes.
    pub fn validate(&self, id: SuperNodeId) -> GenResult<()> {
        let ctx = |msg: String| GenError::config(format!("super node {id}: {msg}"));

        if self.n_subnodes == 0 {
            return Err(ctx("n_subnodes must be at least 1".to_string()));
        }
        if self.boundaries.len() != self.n_subnodes {
            return Err(ctx(format!(
                "expected {} boundaries (one per sub node), got {}",
                self.n_subnodes,
                self.boundaries.len()
            )));
        }
        for (i, b) in self.boundaries.iter().enumerate() {
            b.validate().map_err(|e| ctx(format!("sub node {i}: {}", strip_kind(&e))))?;
        }

        if self.control_points.len() < 3 {
            return Err(ctx(format!(
                "at least 3 control points are required, got {}",
                self.control_points.len()
            )));
        }
        if self.control_points.iter().any(|v| !v.is_finite()) {
            return Err(ctx("control points must be finite".to_string()));
        }

        if self.node_type == NodeType::Independent && !self.inputs.is_empty() {
            return Err(ctx(format!(
                "independent node declares {} inputs",
                self.inputs.len()
            )));
        }
        for (j, input) in self.inputs.iter().enumerate() {
            if !(input.weight.is_finite() && input.correlation.is_finite()) {
                return Err(ctx(format!("input {j}: weight and correlation must be finite")));
            }
            if input.input_supernode == id {
                return Err(ctx(format!("input {j}: a super node cannot reference itself")));
            }
        }

        Ok(())
    }
}

fn strip_kind(err: &GenError) -> &str {
    match err {
        GenError::Config(m) | GenError::Computation(m) => m,
    }
}

/// The whole generation graph, immutable for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Number of samples per generated series.
    pub n_cycles: usize,
    /// Standard deviation of the Gaussian noise added before normalization.
    pub noise: f64,
    /// Super nodes keyed by id; iteration order is ascending id.
    pub supernodes: BTreeMap<SuperNodeId, SuperNodeConfig>,
}

impl Configuration {
    pub fn new(n_cycles: usize) -> Self {
        Self {
            n_cycles,
            noise: crate::fit::DEFAULT_NOISE_SIGMA,
            supernodes: BTreeMap::new(),
        }
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_node(mut self, id: SuperNodeId, node: SuperNodeConfig) -> Self {
        self.supernodes.insert(id, node);
        self
    }

    pub fn validate(&self) -> GenResult<()> {
        if self.n_cycles == 0 {
            return Err(GenError::config("n_cycles must be greater than 0"));
        }
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(GenError::config(format!(
                "noise must be finite and >= 0, got {}",
                self.noise
            )));
        }
        for (&id, node) in &self.supernodes {
            node.validate(id)?;
        }
        Ok(())
    }

    /// Distinct tiers present in the configuration, ascending.
    pub fn tiers(&self) -> Vec<Tier> {
        let mut tiers: Vec<Tier> = self.supernodes.values().map(|n| n.tier()).collect();
        tiers.sort();
        tiers.dedup();
        tiers
    }

    /// Nodes of one tier, in configuration iteration order.
    pub fn nodes_in_tier(&self, tier: Tier) -> Vec<(SuperNodeId, &SuperNodeConfig)> {
        self.supernodes
            .iter()
            .filter(|(_, n)| n.tier() == tier)
            .map(|(&id, n)| (id, n))
            .collect()
    }

    /// Full processing order: tier by tier, iteration order within a tier.
    pub fn processing_order(&self) -> Vec<(SuperNodeId, &SuperNodeConfig)> {
        self.tiers()
            .into_iter()
            .flat_map(|tier| self.nodes_in_tier(tier))
            .collect()
    }
}

/// One generated series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedSeries {
    values: Vec<f64>,
}

impl GeneratedSeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl From<Vec<f64>> for GeneratedSeries {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// Sub-node series of one super node.
pub type SubNodeSeries = BTreeMap<SubNodeId, GeneratedSeries>;

/// Append-only store of generated series.
///
/// A super node is inserted whole; once present it is never replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedStore {
    nodes: BTreeMap<SuperNodeId, SubNodeSeries>,
}

impl GeneratedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: SuperNodeId, series: SubNodeSeries) -> GenResult<()> {
        if self.nodes.contains_key(&id) {
            return Err(GenError::config(format!(
                "super node {id} has already been generated"
            )));
        }
        self.nodes.insert(id, series);
        Ok(())
    }

    pub fn contains(&self, id: SuperNodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn super_node(&self, id: SuperNodeId) -> Option<&SubNodeSeries> {
        self.nodes.get(&id)
    }

    pub fn get(&self, id: SuperNodeId, sub: SubNodeId) -> Option<&GeneratedSeries> {
        self.nodes.get(&id).and_then(|subs| subs.get(&sub))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SuperNodeId, &SubNodeSeries)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A named column of an export frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// Tabular view of one sub node: raw input components followed by the final `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubNodeFrame {
    pub super_node: SuperNodeId,
    pub sub_node: SubNodeId,
    pub columns: Vec<FrameColumn>,
}

impl SubNodeFrame {
    pub const BASE_COLUMN: &'static str = "base";

    pub fn file_name(&self) -> String {
        format!("subnode_{}_{}.csv", self.super_node, self.sub_node)
    }

    pub fn base(&self) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == Self::BASE_COLUMN)
            .map(|c| c.values.as_slice())
    }

    pub fn n_rows(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Vec<Boundary> {
        vec![Boundary::new(0.0, 1.0)]
    }

    #[test]
    fn boundary_rejects_empty_range() {
        assert!(Boundary::new(1.0, 1.0).validate().unwrap_err().is_config());
        assert!(Boundary::new(2.0, 1.0).validate().is_err());
        assert!(Boundary::new(0.0, 1.0).validate().is_ok());
    }

    #[test]
    fn node_validation_catches_shape_errors() {
        let mut node = SuperNodeConfig::independent(unit(), vec![0.0, 1.0, 2.0]);
        assert!(node.validate(0).is_ok());

        node.n_subnodes = 2;
        let err = node.validate(0).unwrap_err();
        assert!(err.to_string().contains("expected 2 boundaries"), "{err}");

        let short = SuperNodeConfig::independent(unit(), vec![0.0, 1.0]);
        assert!(short.validate(3).unwrap_err().to_string().contains("super node 3"));
    }

    #[test]
    fn independent_node_with_inputs_is_rejected() {
        let mut node = SuperNodeConfig::independent(unit(), vec![0.0, 1.0, 2.0]);
        node.inputs.push(InputSpec::new(1, 1.0, 1.0, vec![0]));
        assert!(node.validate(0).unwrap_err().is_config());
    }

    #[test]
    fn processing_order_is_tier_then_id() {
        let cp = vec![0.0, 1.0, 2.0];
        let config = Configuration::new(10)
            .with_node(0, SuperNodeConfig::dependent(unit(), cp.clone(), vec![InputSpec::new(2, 1.0, 1.0, vec![0])]))
            .with_node(1, SuperNodeConfig::independent(unit(), cp.clone()))
            .with_node(2, SuperNodeConfig::independent(unit(), cp.clone()))
            .with_node(3, SuperNodeConfig::dependent(unit(), cp, vec![]));

        let order: Vec<SuperNodeId> = config.processing_order().iter().map(|(id, _)| *id).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
        assert_eq!(config.tiers(), vec![Tier::INDEPENDENT, Tier::DEPENDENT]);
    }

    #[test]
    fn store_is_append_only() {
        let mut store = GeneratedStore::new();
        let mut subs = SubNodeSeries::new();
        subs.insert(0, GeneratedSeries::new(vec![1.0, 2.0]));
        store.insert(7, subs.clone()).unwrap();
        assert!(store.insert(7, subs).is_err());
        assert_eq!(store.get(7, 0).map(|s| s.len()), Some(2));
        assert!(store.get(7, 1).is_none());
    }
}
