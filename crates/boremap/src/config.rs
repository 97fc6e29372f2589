//! Calibration configuration document.
//!
//! Every field has a default matching the laboratory rig, so an empty JSON
//! object `{}` is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cylinder::{CylinderFitConfig, TouchSimulationConfig};
use crate::geometry::{Envelope, GeometryError};
use crate::motion::{GcodeProgram, ProbeOrientation};
use crate::potentiometer::{PotRansacConfig, VoltageAnalysisOptions};
use crate::solver::SolverOptions;
use crate::survey::SurveyOptions;
use crate::sweep::SweepConfig;

/// Nominal bore dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoreSpec {
    /// Nominal radius, used as the fit's initial guess (mm).
    pub nominal_radius: f64,
    /// Axial length (mm).
    pub length: f64,
}

impl Default for BoreSpec {
    fn default() -> Self {
        Self {
            nominal_radius: 145.0,
            length: 440.0,
        }
    }
}

/// Top-level configuration for calibration, planning and survey runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Reachable gantry volume (machine mm).
    pub envelope: Envelope,
    pub bore: BoreSpec,
    /// Cylinder fit solver limits.
    pub solver: SolverOptions,
    /// Point generation: spacing, clearance, pattern, secondary region.
    pub sweep: SweepConfig,
    /// Bore frame rotated 180° about z (x̂ and ŷ negated).
    pub flipped: bool,
    /// Synthetic touch points for dry runs.
    pub simulation: TouchSimulationConfig,
    /// Offline G-code export.
    pub gcode: GcodeProgram,
    /// Probe mounting.
    pub probe: ProbeOrientation,
    pub survey: SurveyOptions,
    pub potentiometer: PotRansacConfig,
    pub voltage: VoltageAnalysisOptions,
}

impl CalibrationConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Envelope bounds and planning parameters that can be checked without a fit.
    pub fn validate(&self) -> Result<(), GeometryError> {
        self.envelope.validate()?;
        if !self.sweep.spacing.is_finite() || self.sweep.spacing <= 0.0 {
            return Err(GeometryError::InvalidSpacing {
                spacing: self.sweep.spacing,
            });
        }
        if !self.sweep.clearance.is_finite() || self.sweep.clearance < 0.0 {
            return Err(GeometryError::InvalidClearance {
                radius: self.bore.nominal_radius,
                clearance: self.sweep.clearance,
            });
        }
        Ok(())
    }

    /// Fit parameters seeded from the nominal bore radius.
    pub fn fit_config(&self) -> CylinderFitConfig {
        CylinderFitConfig {
            initial_radius: self.bore.nominal_radius,
            solver: self.solver.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RegionShape;
    use crate::sweep::SweepPattern;

    #[test]
    fn empty_document_is_lab_defaults() {
        let cfg: CalibrationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.envelope, Envelope::default());
        assert_eq!(cfg.bore.length, 440.0);
        assert_eq!(cfg.sweep.clearance, 20.0);
        assert_eq!(cfg.sweep.pattern, SweepPattern::Dense);
        assert!(!cfg.flipped);
        assert_eq!(cfg.fit_config().initial_radius, 145.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_document_overrides_fields() {
        let json = r#"{
            "flipped": true,
            "bore": { "length": 400.0 },
            "sweep": {
                "spacing": 25.0,
                "pattern": { "kind": "quadrant_line", "step": 5.0 },
                "region": { "kind": "sphere", "center": {"x": 200.0, "y": 125.0, "z": -25.0}, "radius": 50.0 }
            }
        }"#;
        let cfg: CalibrationConfig = serde_json::from_str(json).unwrap();
        assert!(cfg.flipped);
        assert_eq!(cfg.bore.length, 400.0);
        assert_eq!(cfg.bore.nominal_radius, 145.0);
        assert_eq!(cfg.sweep.spacing, 25.0);
        assert_eq!(cfg.sweep.clearance, 20.0);
        assert!(matches!(
            cfg.sweep.pattern,
            SweepPattern::QuadrantLine { step, include_axis: true, .. } if step == 5.0
        ));
        assert!(matches!(cfg.sweep.region, RegionShape::Sphere { radius, .. } if radius == 50.0));
    }

    #[test]
    fn json_round_trip() {
        let mut cfg = CalibrationConfig::default();
        cfg.sweep.pattern = SweepPattern::angled_lines();
        let text = cfg.to_json().unwrap();
        let back: CalibrationConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.sweep.pattern, cfg.sweep.pattern);
        assert_eq!(back.gcode.feed_rate, 1500.0);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = CalibrationConfig::default();
        cfg.sweep.spacing = 0.0;
        assert!(matches!(cfg.validate(), Err(GeometryError::InvalidSpacing { .. })));

        let mut cfg = CalibrationConfig::default();
        cfg.envelope.z = [10.0, -10.0];
        assert!(matches!(cfg.validate(), Err(GeometryError::InvalidEnvelope { axis: 'z', .. })));
    }
}
