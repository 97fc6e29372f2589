use serde::{Deserialize, Serialize};

use super::{ProbeError, ProbeReader};

/// Magnetic flux density in millitesla, bore-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldVector {
    pub bx: f64,
    pub by: f64,
    pub bz: f64,
}

impl FieldVector {
    pub const fn new(bx: f64, by: f64, bz: f64) -> Self {
        Self { bx, by, bz }
    }

    pub fn magnitude(&self) -> f64 {
        (self.bx * self.bx + self.by * self.by + self.bz * self.bz).sqrt()
    }
}

/// Axis of the raw probe triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawAxis {
    X,
    Y,
    Z,
}

impl RawAxis {
    fn pick(self, raw: [f64; 3]) -> f64 {
        match self {
            Self::X => raw[0],
            Self::Y => raw[1],
            Self::Z => raw[2],
        }
    }
}

/// Source axis and sign of one output component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisMap {
    pub source: RawAxis,
    #[serde(default)]
    pub negate: bool,
}

impl AxisMap {
    pub const fn new(source: RawAxis, negate: bool) -> Self {
        Self { source, negate }
    }

    fn apply(&self, raw: [f64; 3]) -> f64 {
        let v = self.source.pick(raw);
        if self.negate {
            -v
        } else {
            v
        }
    }
}

/// How the probe is mounted relative to the bore.
///
/// The default matches a probe whose z sensor points along the bore axis:
/// `Bx = +raw_z`, `By = −raw_y`, `Bz = +raw_x`, scaled from tesla to mT.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeOrientation {
    pub bx: AxisMap,
    pub by: AxisMap,
    pub bz: AxisMap,
    /// Multiplier from raw probe units to mT.
    pub scale: f64,
}

impl Default for ProbeOrientation {
    fn default() -> Self {
        Self {
            bx: AxisMap::new(RawAxis::Z, false),
            by: AxisMap::new(RawAxis::Y, true),
            bz: AxisMap::new(RawAxis::X, false),
            scale: 1000.0,
        }
    }
}

impl ProbeOrientation {
    pub fn to_field(&self, raw: [f64; 3]) -> FieldVector {
        FieldVector::new(
            self.bx.apply(raw) * self.scale,
            self.by.apply(raw) * self.scale,
            self.bz.apply(raw) * self.scale,
        )
    }
}

/// Probe stand-in returning a fixed raw reading through an orientation.
#[derive(Debug, Clone)]
pub struct SimulatedProbe {
    raw: [f64; 3],
    orientation: ProbeOrientation,
    reads: usize,
}

impl SimulatedProbe {
    pub fn new(raw_tesla: [f64; 3], orientation: ProbeOrientation) -> Self {
        Self {
            raw: raw_tesla,
            orientation,
            reads: 0,
        }
    }

    /// Number of readings taken so far.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl ProbeReader for SimulatedProbe {
    fn read_field(&mut self) -> Result<FieldVector, ProbeError> {
        if !self.raw.iter().all(|v| v.is_finite()) {
            return Err(ProbeError::Fault("non-finite raw reading".to_string()));
        }
        self.reads += 1;
        Ok(self.orientation.to_field(self.raw))
    }
}
