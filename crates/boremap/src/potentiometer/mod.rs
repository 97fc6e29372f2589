//! Potentiometer position-sensor calibration.
//!
//! Implements:
//! - constrained RANSAC fit of a linear or logarithmic resistance-vs-position
//!   model, with inversion from a reading back to a position,
//! - linear regression of distance on supply-adjusted divider voltage with
//!   error statistics and the ADC resolution needed for a target step.

mod model;
mod ransac;
mod regression;

pub use model::{PotError, PotModel, PotParams};
pub use ransac::{fit_pot_model_ransac, PotCalibration, PotRansacConfig};
pub use regression::{
    analyze_voltage_curve, linear_regression, VoltageAnalysisOptions, VoltageCurveReport,
};

/// Bench measurement: slide position (mm) against divider output (V).
pub const LAB_DISTANCES_MM: [f64; 29] = [
    0.0, 15.0, 22.0, 32.0, 41.0, 49.0, 58.0, 64.0, 74.0, 83.0, 94.0, 102.0, 115.0, 125.0, 134.0,
    142.0, 151.0, 159.0, 167.0, 174.0, 181.0, 190.0, 199.0, 206.0, 214.0, 222.0, 227.0, 238.0,
    248.0,
];

pub const LAB_VOLTAGES: [f64; 29] = [
    4.910, 4.769, 4.698, 4.604, 4.514, 4.427, 4.340, 4.280, 4.177, 4.090, 3.979, 3.899, 3.766,
    3.666, 3.586, 3.505, 3.414, 3.330, 3.254, 3.183, 3.111, 3.018, 2.939, 2.863, 2.792, 2.710,
    2.651, 2.547, 2.442,
];
