//! Levenberg–Marquardt backend for the small fits in this crate.
//!
//! Both the bore cross-section `(cy, cz, r)` and the logarithmic
//! potentiometer `(a, b, p)` are three-parameter problems with one scalar
//! residual per sample, so every problem here optimizes a single parameter
//! block named [`PARAMS`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tiny_solver::factors::na as ts_na;
use tiny_solver::Optimizer;

/// Key of the shared parameter block in a [`tiny_solver::Problem`].
pub(crate) const PARAMS: &str = "p";

/// Optimizer limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Iteration cap handed to the optimizer (clamped to at least 1).
    pub max_iteration: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self { max_iteration: 100 }
    }
}

/// Lift an `f64` constant into the optimizer's scalar type.
#[inline]
pub(crate) fn scalar<T: ts_na::RealField>(v: f64) -> T {
    ts_na::convert(v)
}

/// Run LM over `problem` from `init`.
///
/// Returns `None` when the optimizer gives up or ends on non-finite values.
pub(crate) fn minimize(
    problem: &tiny_solver::Problem,
    init: [f64; 3],
    options: &SolverOptions,
) -> Option<[f64; 3]> {
    let mut initial_values = HashMap::<String, ts_na::DVector<f64>>::new();
    initial_values.insert(
        PARAMS.to_string(),
        ts_na::DVector::<f64>::from_vec(init.to_vec()),
    );

    let optimizer = tiny_solver::LevenbergMarquardtOptimizer::default();
    let opts = tiny_solver::OptimizerOptions {
        max_iteration: options.max_iteration.max(1),
        verbosity_level: 0,
        ..Default::default()
    };
    let result = optimizer.optimize(problem, &initial_values, Some(opts))?;
    let p = result.get(PARAMS)?;
    if p.len() != 3 {
        return None;
    }
    let out = [p[0], p[1], p[2]];
    if !out.iter().all(|v| v.is_finite()) {
        tracing::trace!("optimizer ended on non-finite parameters {:?}", out);
        return None;
    }
    Some(out)
}
