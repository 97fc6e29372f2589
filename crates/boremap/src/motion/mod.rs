//! Collaborator interfaces for the gantry and the field probe.
//!
//! Calibration and survey code talks to hardware only through
//! [`MotionController`] and [`ProbeReader`]; handles are passed explicitly.

mod gcode;
mod probe;

use serde::{Deserialize, Serialize};

use crate::geometry::{clamp_axis, Envelope, Point3};

pub use gcode::{GcodeGantry, GcodeProgram};
pub use probe::{AxisMap, FieldVector, ProbeOrientation, RawAxis, SimulatedProbe};

// ── Error types ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum MotionError {
    /// Writing to the controller connection failed.
    Io(std::io::Error),
    /// Controller reported a fault.
    Fault(String),
}

impl std::fmt::Display for MotionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "motion controller I/O error: {}", e),
            Self::Fault(msg) => write!(f, "motion controller fault: {}", msg),
        }
    }
}

impl std::error::Error for MotionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Fault(_) => None,
        }
    }
}

impl From<std::io::Error> for MotionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[derive(Debug)]
pub enum ProbeError {
    Io(std::io::Error),
    Fault(String),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "probe I/O error: {}", e),
            Self::Fault(msg) => write!(f, "probe fault: {}", msg),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Fault(_) => None,
        }
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ── Targets ────────────────────────────────────────────────────────────────

/// Per-axis move target; unset axes keep their current position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisTarget {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl AxisTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, v: f64) -> Self {
        self.x = Some(v);
        self
    }

    pub fn y(mut self, v: f64) -> Self {
        self.y = Some(v);
        self
    }

    pub fn z(mut self, v: f64) -> Self {
        self.z = Some(v);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }

    /// Fill unset axes from `current`.
    pub fn resolve(&self, current: &Point3) -> Point3 {
        Point3::new(
            self.x.unwrap_or(current.x),
            self.y.unwrap_or(current.y),
            self.z.unwrap_or(current.z),
        )
    }
}

impl From<Point3> for AxisTarget {
    fn from(p: Point3) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
            z: Some(p.z),
        }
    }
}

impl Envelope {
    /// Clamp each set axis of `target` into the envelope.
    pub fn clamp_target(&self, target: &AxisTarget) -> AxisTarget {
        AxisTarget {
            x: target.x.map(|v| clamp_axis(v, self.x)),
            y: target.y.map(|v| clamp_axis(v, self.y)),
            z: target.z.map(|v| clamp_axis(v, self.z)),
        }
    }
}

// ── Traits ─────────────────────────────────────────────────────────────────

/// Positioning stage. Coordinates are machine millimeters.
pub trait MotionController {
    /// Move the set axes; returns the commanded position after clamping.
    fn move_axes(&mut self, target: &AxisTarget) -> Result<Point3, MotionError>;

    fn current_position(&self) -> Point3;

    fn home(&mut self) -> Result<(), MotionError>;

    fn move_to(&mut self, p: &Point3) -> Result<Point3, MotionError> {
        self.move_axes(&AxisTarget::from(*p))
    }
}

/// Three-axis field probe.
pub trait ProbeReader {
    fn read_field(&mut self) -> Result<FieldVector, ProbeError>;
}
