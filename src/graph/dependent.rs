//! Super nodes with inputs: base curve plus weighted, correlated copies of
//! already generated series.
//!
//! For every sub node `i`:
//!
//! ```text
//! base_i = fit(control_points, boundaries[i])
//! for input in inputs:
//!     for k in input.connections:
//!         base_i += store[input.input_supernode][k] * weight * correlation
//! ```
//!
//! Contributions compound across connections and inputs and the sum is not
//! renormalized, so a dependent series can leave its own boundaries. The
//! boundaries only shape the base term.

use rand::Rng;
use tracing::{debug, warn};

use crate::domain::{
    FrameColumn, GeneratedSeries, GeneratedStore, InputSpec, SubNodeFrame, SubNodeSeries,
    SuperNodeConfig, SuperNodeId,
};
use crate::error::{GenError, GenResult};
use crate::fit::fit_curve;
use crate::graph::expectations::check_contribution;
use crate::graph::independent::NodeOutput;

/// Relative tolerance for the expected-mean check.
const MEAN_TOLERANCE: f64 = 0.05;

/// Generate every sub node of a dependent super node, reading inputs from `store`.
pub fn generate_dependent<R: Rng + ?Sized>(
    id: SuperNodeId,
    node: &SuperNodeConfig,
    n_cycles: usize,
    noise_sigma: f64,
    store: &GeneratedStore,
    rng: &mut R,
) -> GenResult<NodeOutput> {
    node.validate(id)?;
    let resolved = resolve_inputs(id, &node.inputs, store)?;

    let mut out = NodeOutput::default();
    for sub in 0..node.n_subnodes {
        let mut base = fit_curve(&node.control_points, node.boundary(sub)?, n_cycles, noise_sigma, rng)?;
        let mut columns = Vec::new();

        for (input, referenced) in node.inputs.iter().zip(&resolved) {
            let mut contribution = vec![0.0; base.len()];
            for (&k, series) in input.connections.iter().zip(referenced) {
                accumulate(&mut base, series.values(), input.weight, input.correlation)?;
                accumulate(&mut contribution, series.values(), input.weight, input.correlation)?;
                columns.push(FrameColumn {
                    name: format!("in{}_{}", input.input_supernode, k),
                    values: series.values().to_vec(),
                });
            }

            for violation in check_contribution(
                id,
                sub,
                input.input_supernode,
                &input.expectation,
                &contribution,
                MEAN_TOLERANCE,
            ) {
                warn!("{violation}");
                out.violations.push(violation);
            }
        }

        debug!(
            super_node = id,
            sub_node = sub,
            components = columns.len(),
            "combined dependent series"
        );
        columns.push(FrameColumn {
            name: SubNodeFrame::BASE_COLUMN.to_string(),
            values: base.clone(),
        });
        out.frames.push(SubNodeFrame {
            super_node: id,
            sub_node: sub,
            columns,
        });
        out.series.insert(sub, GeneratedSeries::new(base));
    }
    Ok(out)
}

/// `base[j] += series[j] * weight * correlation`.
pub fn accumulate(base: &mut [f64], series: &[f64], weight: f64, correlation: f64) -> GenResult<()> {
    if base.len() != series.len() {
        return Err(GenError::computation(format!(
            "cannot combine series of length {} into a series of length {}",
            series.len(),
            base.len()
        )));
    }
    for (b, &s) in base.iter_mut().zip(series) {
        *b += s * weight * correlation;
    }
    Ok(())
}

/// Look up every referenced series up front so a bad reference fails before any sub node is built.
fn resolve_inputs<'a>(
    id: SuperNodeId,
    inputs: &[InputSpec],
    store: &'a GeneratedStore,
) -> GenResult<Vec<Vec<&'a GeneratedSeries>>> {
    inputs
        .iter()
        .enumerate()
        .map(|(j, input)| -> GenResult<Vec<&'a GeneratedSeries>> {
            let source = input.input_supernode;
            let subs: &SubNodeSeries = store.super_node(source).ok_or_else(|| {
                GenError::config(format!(
                    "super node {id}: input {j} references super node {source}, which has not been generated \
                     (missing, or a dependent node later in processing order)"
                ))
            })?;
            input
                .connections
                .iter()
                .map(|&k| {
                    subs.get(&k).ok_or_else(|| {
                        GenError::config(format!(
                            "super node {id}: input {j} connects to sub node {k} of super node {source}, \
                             which has {} sub nodes",
                            subs.len()
                        ))
                    })
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Boundary;
    use crate::graph::generate_independent;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn store_with(id: SuperNodeId, series: Vec<Vec<f64>>) -> GeneratedStore {
        let mut store = GeneratedStore::new();
        let subs = series
            .into_iter()
            .enumerate()
            .map(|(k, v)| (k, GeneratedSeries::new(v)))
            .collect();
        store.insert(id, subs).unwrap();
        store
    }

    #[test]
    fn weighted_composition_of_single_samples() {
        // A = [2.0] is another input's series and plays no part in this sub node.
        let b = [3.0];
        let mut base = vec![1.0];
        accumulate(&mut base, &b, 0.5, 0.4).unwrap();
        assert!((base[0] - 1.6).abs() < 1e-12, "{base:?}");
    }

    #[test]
    fn accumulate_rejects_length_mismatch() {
        let mut base = vec![0.0; 3];
        assert!(!accumulate(&mut base, &[1.0, 2.0], 1.0, 1.0).unwrap_err().is_config());
    }

    #[test]
    fn empty_inputs_match_independent_generation() {
        let boundaries = vec![Boundary::new(0.0, 5.0), Boundary::new(-1.0, 1.0)];
        let cp = vec![4.0, 1.0, 2.0, 8.0];
        let dep = SuperNodeConfig::dependent(boundaries.clone(), cp.clone(), vec![]);
        let ind = SuperNodeConfig::independent(boundaries, cp);

        let a = generate_dependent(1, &dep, 40, 0.05, &GeneratedStore::new(), &mut StdRng::seed_from_u64(9)).unwrap();
        let b = generate_independent(1, &ind, 40, 0.05, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.series, b.series);
        assert_eq!(a.frames, b.frames);
    }

    #[test]
    fn contributions_compound_across_connections_and_inputs() {
        let n = 8;
        let store = store_with(0, vec![vec![1.0; n], vec![2.0; n]]);
        let boundaries = vec![Boundary::new(0.0, 1.0)];
        let cp = vec![0.0, 1.0, 2.0];
        let inputs = vec![
            InputSpec::new(0, 0.5, 1.0, vec![0, 1]),
            InputSpec::new(0, -1.0, 0.25, vec![1]),
        ];
        let dep = SuperNodeConfig::dependent(boundaries.clone(), cp.clone(), inputs);
        let ind = SuperNodeConfig::independent(boundaries, cp);

        let combined = generate_dependent(5, &dep, n, 0.0, &store, &mut StdRng::seed_from_u64(0)).unwrap();
        let base = generate_independent(5, &ind, n, 0.0, &mut StdRng::seed_from_u64(0)).unwrap();

        // 1*0.5 + 2*0.5 + 2*(-0.25) = 1.0
        for (c, b) in combined.series[&0].values().iter().zip(base.series[&0].values()) {
            assert!((c - (b + 1.0)).abs() < 1e-12);
        }
        // Shifted by +1, the top of the range is exceeded: boundaries only bound the base term.
        assert!(combined.series[&0].values().iter().any(|&v| v > 1.0));

        let names: Vec<&str> = combined.frames[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["in0_0", "in0_1", "in0_1", "base"]);
    }

    #[test]
    fn missing_reference_and_bad_connection_are_config_errors() {
        let boundaries = vec![Boundary::new(0.0, 1.0)];
        let cp = vec![0.0, 1.0, 2.0];

        let missing = SuperNodeConfig::dependent(boundaries.clone(), cp.clone(), vec![InputSpec::new(3, 1.0, 1.0, vec![0])]);
        let err = generate_dependent(5, &missing, 4, 0.0, &GeneratedStore::new(), &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("super node 3"));

        let store = store_with(3, vec![vec![0.0; 4]]);
        let out_of_range = SuperNodeConfig::dependent(boundaries, cp, vec![InputSpec::new(3, 1.0, 1.0, vec![1])]);
        let err = generate_dependent(5, &out_of_range, 4, 0.0, &store, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("sub node 1"));
    }

    #[test]
    fn expectation_violations_are_reported_not_fatal() {
        let n = 6;
        let store = store_with(0, vec![vec![10.0; n]]);
        let mut input = InputSpec::new(0, 1.0, 1.0, vec![0]);
        input.expectation.upper_bound = Some(5.0);
        let dep = SuperNodeConfig::dependent(vec![Boundary::new(0.0, 1.0)], vec![0.0, 1.0, 2.0], vec![input]);

        let out = generate_dependent(1, &dep, n, 0.0, &store, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(out.violations.len(), 1);
        assert_eq!(out.violations[0].observed, 10.0);
    }
}
