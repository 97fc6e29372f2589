use serde::{Deserialize, Serialize};

// ── Error type ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PotError {
    TooFewSamples { needed: usize, got: usize },
    LengthMismatch { positions: usize, values: usize },
    /// A sample contains NaN/∞.
    NonFiniteSample { index: usize },
    /// No trial produced a model satisfying the positivity constraints.
    NoValidModel { trials: usize },
    /// Best model has fewer inliers than required.
    InsufficientInliers { needed: usize, found: usize },
    /// Regression input has no spread in the independent variable.
    Degenerate,
}

impl std::fmt::Display for PotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewSamples { needed, got } => {
                write!(f, "need at least {} samples, got {}", needed, got)
            }
            Self::LengthMismatch { positions, values } => write!(
                f,
                "{} positions but {} measured values",
                positions, values
            ),
            Self::NonFiniteSample { index } => write!(f, "sample {} is not finite", index),
            Self::NoValidModel { trials } => write!(
                f,
                "no positive model found in {} RANSAC trials",
                trials
            ),
            Self::InsufficientInliers { needed, found } => {
                write!(f, "best model has {} inliers, need {}", found, needed)
            }
            Self::Degenerate => write!(f, "regression input is degenerate"),
        }
    }
}

impl std::error::Error for PotError {}

// ── Models ─────────────────────────────────────────────────────────────────

/// Resistance-vs-position model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotModel {
    /// `r = a·x + b`
    #[default]
    Linear,
    /// `r = a·ln(x + p) + b`
    Logarithmic,
}

impl PotModel {
    /// Samples per RANSAC hypothesis.
    pub fn minimal_samples(self) -> usize {
        match self {
            Self::Linear => 2,
            Self::Logarithmic => 3,
        }
    }
}

/// Fitted model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum PotParams {
    Linear { a: f64, b: f64 },
    Logarithmic { a: f64, b: f64, p: f64 },
}

impl PotParams {
    pub fn model(&self) -> PotModel {
        match self {
            Self::Linear { .. } => PotModel::Linear,
            Self::Logarithmic { .. } => PotModel::Logarithmic,
        }
    }

    /// Model value at position `x`. NaN outside the log model's domain.
    pub fn eval(&self, x: f64) -> f64 {
        match *self {
            Self::Linear { a, b } => a * x + b,
            Self::Logarithmic { a, b, p } => {
                let arg = x + p;
                if arg > 0.0 {
                    a * arg.ln() + b
                } else {
                    f64::NAN
                }
            }
        }
    }

    /// Inverse of [`eval`](Self::eval).
    pub fn invert(&self, r: f64) -> f64 {
        match *self {
            Self::Linear { a, b } => (r - b) / a,
            Self::Logarithmic { a, b, p } => ((r - b) / a).exp() - p,
        }
    }

    /// All parameters non-negative, slope strictly positive.
    pub fn is_positive(&self) -> bool {
        match *self {
            Self::Linear { a, b } => a > 0.0 && b >= 0.0,
            Self::Logarithmic { a, b, p } => a > 0.0 && b >= 0.0 && p >= 0.0,
        }
    }
}
