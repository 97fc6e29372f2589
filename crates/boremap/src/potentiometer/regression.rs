//! Voltage-divider position sensing analysis.

use serde::{Deserialize, Serialize};

use super::model::PotError;

/// Ordinary least squares `y = slope·x + intercept`. `None` when `x` has no
/// spread or fewer than two samples are given.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mx = x[..n].iter().sum::<f64>() / nf;
    let my = y[..n].iter().sum::<f64>() / nf;
    let (mut sxx, mut sxy) = (0.0f64, 0.0f64);
    for (xi, yi) in x[..n].iter().zip(&y[..n]) {
        sxx += (xi - mx) * (xi - mx);
        sxy += (xi - mx) * (yi - my);
    }
    if sxx <= f64::EPSILON * nf * mx.abs().max(1.0) {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, my - slope * mx))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoltageAnalysisOptions {
    /// Supply voltage across the potentiometer; readings are taken as `supply − v`.
    pub supply_voltage: f64,
    /// ADC full-scale reference (V).
    pub adc_reference: f64,
    /// Position resolution to achieve (mm).
    pub target_resolution_mm: f64,
}

impl Default for VoltageAnalysisOptions {
    fn default() -> Self {
        Self {
            supply_voltage: 4.998,
            adc_reference: 5.0,
            target_resolution_mm: 0.1,
        }
    }
}

/// Linear position-vs-voltage calibration summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoltageCurveReport {
    pub samples: usize,
    /// Fitted mm per volt of adjusted voltage.
    pub slope_mm_per_volt: f64,
    pub intercept_mm: f64,
    pub rmse_mm: f64,
    /// Most negative `measured − predicted` distance (mm).
    pub min_error_mm: f64,
    /// Most positive `measured − predicted` distance (mm).
    pub max_error_mm: f64,
    pub volts_per_mm: f64,
    /// Voltage step matching `target_resolution_mm`.
    pub required_voltage_resolution: f64,
    pub adc_levels: f64,
    pub adc_bits: u32,
}

/// Regress distance on adjusted voltage and size the ADC.
pub fn analyze_voltage_curve(
    distances: &[f64],
    voltages: &[f64],
    options: &VoltageAnalysisOptions,
) -> Result<VoltageCurveReport, PotError> {
    if distances.len() != voltages.len() {
        return Err(PotError::LengthMismatch {
            positions: distances.len(),
            values: voltages.len(),
        });
    }
    if distances.len() < 2 {
        return Err(PotError::TooFewSamples {
            needed: 2,
            got: distances.len(),
        });
    }
    if let Some(index) = distances
        .iter()
        .zip(voltages)
        .position(|(d, v)| !d.is_finite() || !v.is_finite())
    {
        return Err(PotError::NonFiniteSample { index });
    }

    let adjusted: Vec<f64> = voltages
        .iter()
        .map(|v| options.supply_voltage - v)
        .collect();
    let (slope, intercept) = linear_regression(&adjusted, distances).ok_or(PotError::Degenerate)?;
    if slope == 0.0 {
        return Err(PotError::Degenerate);
    }

    let errors: Vec<f64> = adjusted
        .iter()
        .zip(distances)
        .map(|(x, d)| d - (slope * x + intercept))
        .collect();
    let n = errors.len() as f64;
    let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt();
    let min_error = errors.iter().copied().fold(f64::INFINITY, f64::min);
    let max_error = errors.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let volts_per_mm = 1.0 / slope.abs();
    let required = volts_per_mm * options.target_resolution_mm;
    let levels = options.adc_reference / required;
    let bits = levels.log2().ceil().max(0.0) as u32;

    tracing::info!(
        "voltage curve: {:.3} mm/V, rmse {:.3} mm, {} ADC bits for {} mm",
        slope,
        rmse,
        bits,
        options.target_resolution_mm
    );
    Ok(VoltageCurveReport {
        samples: errors.len(),
        slope_mm_per_volt: slope,
        intercept_mm: intercept,
        rmse_mm: rmse,
        min_error_mm: min_error,
        max_error_mm: max_error,
        volts_per_mm,
        required_voltage_resolution: required,
        adc_levels: levels,
        adc_bits: bits,
    })
}
