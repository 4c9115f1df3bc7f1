//! Super nodes without inputs: one base curve per sub node.

use rand::Rng;
use tracing::debug;

use crate::domain::{
    FrameColumn, GeneratedSeries, SubNodeFrame, SubNodeSeries, SuperNodeConfig, SuperNodeId,
};
use crate::error::GenResult;
use crate::fit::fit_curve;
use crate::graph::expectations::ExpectationViolation;

/// Everything produced for one super node.
///
/// `series` goes into the store; `frames` and `violations` are for reporting/export.
#[derive(Debug, Clone, Default)]
pub struct NodeOutput {
    pub series: SubNodeSeries,
    pub frames: Vec<SubNodeFrame>,
    pub violations: Vec<ExpectationViolation>,
}

/// Generate every sub node of an independent super node.
pub fn generate_independent<R: Rng + ?Sized>(
    id: SuperNodeId,
    node: &SuperNodeConfig,
    n_cycles: usize,
    noise_sigma: f64,
    rng: &mut R,
) -> GenResult<NodeOutput> {
    node.validate(id)?;

    let mut out = NodeOutput::default();
    for sub in 0..node.n_subnodes {
        let base = fit_curve(&node.control_points, node.boundary(sub)?, n_cycles, noise_sigma, rng)?;
        debug!(super_node = id, sub_node = sub, samples = base.len(), "generated base curve");

        out.frames.push(SubNodeFrame {
            super_node: id,
            sub_node: sub,
            columns: vec![FrameColumn {
                name: SubNodeFrame::BASE_COLUMN.to_string(),
                values: base.clone(),
            }],
        });
        out.series.insert(sub, GeneratedSeries::new(base));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Boundary;
    use crate::math::min_max;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn each_sub_node_gets_its_own_range() {
        let node = SuperNodeConfig::independent(
            vec![Boundary::new(0.0, 1.0), Boundary::new(50.0, 60.0)],
            vec![1.0, 3.0, 2.0, 5.0],
        );
        let out = generate_independent(4, &node, 30, 0.05, &mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(out.series.len(), 2);
        let (lo, hi) = min_max(out.series[&1].values()).unwrap();
        assert!((lo - 50.0).abs() < 1e-9 && (hi - 60.0).abs() < 1e-9);
        assert_eq!(out.frames[1].file_name(), "subnode_4_1.csv");
        assert_eq!(out.frames[1].base(), Some(out.series[&1].values()));
    }

    #[test]
    fn invalid_node_produces_nothing() {
        let node = SuperNodeConfig::independent(
            vec![Boundary::new(0.0, 1.0), Boundary::new(5.0, 5.0)],
            vec![1.0, 3.0, 2.0],
        );
        let err = generate_independent(0, &node, 10, 0.0, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(err.is_config());
    }
}
