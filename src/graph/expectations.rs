//! Post-generation checks of an input's contribution against its declared expectations.
//!
//! An input's contribution to one sub node is `Σ_k series_k * weight * correlation`
//! over its connections. Expectations are advisory: violations are reported, never fatal.

use serde::Serialize;

use crate::domain::{Expectation, SubNodeId, SuperNodeId};
use crate::math::SeriesStats;

const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectationKind {
    LowerBound,
    UpperBound,
    Mean,
}

/// One violated expectation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectationViolation {
    pub super_node: SuperNodeId,
    pub sub_node: SubNodeId,
    pub input_supernode: SuperNodeId,
    pub kind: ExpectationKind,
    pub expected: f64,
    pub observed: f64,
}

impl std::fmt::Display for ExpectationViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let what = match self.kind {
            ExpectationKind::LowerBound => "min below expected lower bound",
            ExpectationKind::UpperBound => "max above expected upper bound",
            ExpectationKind::Mean => "mean differs from expected mean",
        };
        write!(
            f,
            "super node {} sub node {} (input from {}): {what}: expected {:.4}, observed {:.4}",
            self.super_node, self.sub_node, self.input_supernode, self.expected, self.observed
        )
    }
}

/// Compare one contribution series against `expectation`.
///
/// `mean_tolerance` is relative to the contribution's own range.
pub fn check_contribution(
    super_node: SuperNodeId,
    sub_node: SubNodeId,
    input_supernode: SuperNodeId,
    expectation: &Expectation,
    contribution: &[f64],
    mean_tolerance: f64,
) -> Vec<ExpectationViolation> {
    let Some(stats) = SeriesStats::from_values(contribution) else {
        return Vec::new();
    };
    let violation = |kind, expected, observed| ExpectationViolation {
        super_node,
        sub_node,
        input_supernode,
        kind,
        expected,
        observed,
    };

    let mut out = Vec::new();
    if let Some(lower) = expectation.lower_bound {
        if stats.min < lower - TOLERANCE {
            out.push(violation(ExpectationKind::LowerBound, lower, stats.min));
        }
    }
    if let Some(upper) = expectation.upper_bound {
        if stats.max > upper + TOLERANCE {
            out.push(violation(ExpectationKind::UpperBound, upper, stats.max));
        }
    }
    if let Some(mean) = expectation.mean {
        let allowed = (stats.max - stats.min).abs() * mean_tolerance + TOLERANCE;
        if (stats.mean - mean).abs() > allowed {
            out.push(violation(ExpectationKind::Mean, mean, stats.mean));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_each_violated_expectation() {
        let expectation = Expectation {
            lower_bound: Some(0.0),
            upper_bound: Some(1.0),
            mean: Some(10.0),
        };
        let v = check_contribution(1, 0, 0, &expectation, &[-1.0, 0.5, 2.0], 0.1);
        let kinds: Vec<_> = v.iter().map(|x| x.kind).collect();
        assert_eq!(
            kinds,
            vec![ExpectationKind::LowerBound, ExpectationKind::UpperBound, ExpectationKind::Mean]
        );
        assert!(v[0].to_string().contains("lower bound"));
    }

    #[test]
    fn satisfied_or_missing_expectations_are_silent() {
        let expectation = Expectation {
            lower_bound: Some(0.0),
            upper_bound: Some(3.0),
            mean: Some(1.5),
        };
        assert!(check_contribution(1, 0, 0, &expectation, &[0.0, 1.5, 3.0], 0.05).is_empty());
        assert!(check_contribution(1, 0, 0, &Expectation::default(), &[-9.0, 9.0], 0.05).is_empty());
    }
}
