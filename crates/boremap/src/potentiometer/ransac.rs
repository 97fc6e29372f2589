//! Constrained RANSAC fit of a potentiometer model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tiny_solver::factors::na as ts_na;

use super::model::{PotError, PotModel, PotParams};
use super::regression::linear_regression;
use crate::solver::{minimize, scalar, SolverOptions, PARAMS};

/// RANSAC parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PotRansacConfig {
    pub model: PotModel,
    /// Number of random hypotheses.
    pub max_iters: usize,
    /// Absolute residual below which a sample is an inlier (Ω).
    pub inlier_threshold: f64,
    /// Minimum inlier count for a valid calibration.
    pub min_inliers: usize,
    /// Position range over which the model must stay strictly positive.
    pub check_range: [f64; 2],
    /// Number of evenly spaced positions checked in `check_range`.
    pub check_samples: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

impl Default for PotRansacConfig {
    fn default() -> Self {
        Self {
            model: PotModel::Linear,
            max_iters: 100,
            inlier_threshold: 100.0,
            min_inliers: 3,
            check_range: [0.0, 9.0],
            check_samples: 100,
            seed: 42,
        }
    }
}

/// Calibrated potentiometer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotCalibration {
    pub params: PotParams,
    pub num_inliers: usize,
    /// Per-sample inlier flag under the final model.
    pub inlier_mask: Vec<bool>,
}

impl PotCalibration {
    /// Resistance expected at `position`.
    pub fn resistance_at(&self, position: f64) -> f64 {
        self.params.eval(position)
    }

    /// Position producing `resistance`.
    pub fn position_for(&self, resistance: f64) -> f64 {
        self.params.invert(resistance)
    }
}

/// Residual `a·ln(x + p) + b − y` of one sample.
#[derive(Debug, Clone)]
struct LogSample {
    x: f64,
    y: f64,
}

impl<T: ts_na::RealField> tiny_solver::factors::Factor<T> for LogSample {
    fn residual_func(&self, params: &[ts_na::DVector<T>]) -> ts_na::DVector<T> {
        let q = &params[0];
        let l = (scalar::<T>(self.x) + q[2].clone()).ln();
        let r = q[0].clone() * l + q[1].clone() - scalar::<T>(self.y);
        ts_na::DVector::<T>::from_vec(vec![r])
    }
}

/// Least-squares fit of `model` to `(x, y)`; `seed` warm-starts the log model.
fn fit_model(model: PotModel, x: &[f64], y: &[f64], seed: Option<&PotParams>) -> Option<PotParams> {
    match model {
        PotModel::Linear => {
            let (a, b) = linear_regression(x, y)?;
            Some(PotParams::Linear { a, b })
        }
        PotModel::Logarithmic => {
            let init = match seed {
                Some(&PotParams::Logarithmic { a, b, p }) => [a, b, p],
                _ => {
                    let p0 = 1.0 - x.iter().copied().fold(f64::INFINITY, f64::min).min(0.0);
                    let logs: Vec<f64> = x.iter().map(|v| (v + p0).ln()).collect();
                    let (a, b) = linear_regression(&logs, y)?;
                    [a, b, p0]
                }
            };
            let mut problem = tiny_solver::Problem::new();
            for (&xi, &yi) in x.iter().zip(y) {
                problem.add_residual_block(1, &[PARAMS], Box::new(LogSample { x: xi, y: yi }), None);
            }
            let [a, b, p] = minimize(&problem, init, &SolverOptions::default())?;
            // Every sample must stay inside the logarithm's domain.
            x.iter()
                .all(|v| v + p > 0.0)
                .then_some(PotParams::Logarithmic { a, b, p })
        }
    }
}

fn positive_over(params: &PotParams, range: [f64; 2], samples: usize) -> bool {
    if !params.is_positive() {
        return false;
    }
    let n = samples.max(2);
    (0..n).all(|i| {
        let x = range[0] + (range[1] - range[0]) * i as f64 / (n - 1) as f64;
        let v = params.eval(x);
        v.is_finite() && v > 0.0
    })
}

fn inliers(params: &PotParams, x: &[f64], y: &[f64], threshold: f64) -> Vec<bool> {
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| (yi - params.eval(xi)).abs() < threshold)
        .collect()
}

/// Draw a minimal RANSAC subset: `k` different sample indices below `n`.
///
/// Only the first `k` slots of the index list are shuffled into place.
fn sample_indices(rng: &mut impl Rng, n: usize, k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    for i in 0..k.min(n) {
        let j = rng.gen_range(i..n);
        indices.swap(i, j);
    }
    indices.truncate(k);
    indices
}

/// Fit `config.model` to `(positions, values)` robustly.
///
/// Each trial fits a minimal random subset; hypotheses with a non-positive
/// parameter or a non-positive model value anywhere in `check_range` are
/// discarded. The hypothesis with the most inliers is refit on its inliers.
pub fn fit_pot_model_ransac(
    positions: &[f64],
    values: &[f64],
    config: &PotRansacConfig,
) -> Result<PotCalibration, PotError> {
    let n = positions.len();
    if n != values.len() {
        return Err(PotError::LengthMismatch {
            positions: n,
            values: values.len(),
        });
    }
    if let Some(index) = positions
        .iter()
        .zip(values)
        .position(|(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(PotError::NonFiniteSample { index });
    }
    let k = config.model.minimal_samples();
    if n < k {
        return Err(PotError::TooFewSamples { needed: k, got: n });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<(PotParams, usize)> = None;

    for _ in 0..config.max_iters {
        let sample = sample_indices(&mut rng, n, k);
        let xs: Vec<f64> = sample.iter().map(|&i| positions[i]).collect();
        let ys: Vec<f64> = sample.iter().map(|&i| values[i]).collect();
        let Some(params) = fit_model(config.model, &xs, &ys, None) else {
            continue;
        };
        if !positive_over(&params, config.check_range, config.check_samples) {
            continue;
        }
        let count = inliers(&params, positions, values, config.inlier_threshold)
            .iter()
            .filter(|&&m| m)
            .count();
        if best.as_ref().map_or(true, |&(_, c)| count > c) {
            best = Some((params, count));
            if count == n {
                break;
            }
        }
    }

    let Some((hypothesis, count)) = best else {
        return Err(PotError::NoValidModel {
            trials: config.max_iters,
        });
    };
    if count < config.min_inliers {
        return Err(PotError::InsufficientInliers {
            needed: config.min_inliers,
            found: count,
        });
    }

    // Refit on the inliers; keep the hypothesis if the refit breaks a constraint.
    let mask = inliers(&hypothesis, positions, values, config.inlier_threshold);
    let (xs, ys): (Vec<f64>, Vec<f64>) = positions
        .iter()
        .zip(values)
        .zip(&mask)
        .filter_map(|((&x, &y), &m)| m.then_some((x, y)))
        .unzip();
    let params = fit_model(config.model, &xs, &ys, Some(&hypothesis))
        .filter(|p| positive_over(p, config.check_range, config.check_samples))
        .unwrap_or(hypothesis);

    let inlier_mask = inliers(&params, positions, values, config.inlier_threshold);
    let num_inliers = inlier_mask.iter().filter(|&&m| m).count();
    tracing::debug!(
        "pot RANSAC ({:?}): {} of {} inliers, params {:?}",
        config.model,
        num_inliers,
        n,
        params
    );
    Ok(PotCalibration {
        params,
        num_inliers,
        inlier_mask,
    })
}
