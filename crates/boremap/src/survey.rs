//! Field survey: visit planned points and record probe readings in the bore
//! frame.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::geometry::Point3;
use crate::motion::{FieldVector, MotionController, MotionError, ProbeError, ProbeReader};
use crate::sweep::{SweepPlan, SweepSegment};

/// One probe sample at a bore-frame position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldReading {
    /// Probe position in bore coordinates (mm).
    pub position: Point3,
    pub field: FieldVector,
}

/// Readings of one sweep segment, aligned with the segment's points.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentReadings {
    pub label: String,
    pub readings: Vec<FieldReading>,
    /// Scalar coordinate carried over from the segment, if any.
    pub coords: Option<Vec<f64>>,
}

impl SegmentReadings {
    pub fn fields(&self) -> Vec<FieldVector> {
        self.readings.iter().map(|r| r.field).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyOptions {
    /// Wait after each move before sampling.
    pub settle: Duration,
    /// Home the gantry before the first point.
    pub home_first: bool,
}

impl Default for SurveyOptions {
    fn default() -> Self {
        Self {
            settle: Duration::ZERO,
            home_first: false,
        }
    }
}

// ── Error type ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum SurveyError {
    Motion { index: usize, source: MotionError },
    Probe { index: usize, source: ProbeError },
}

impl SurveyError {
    /// Index of the point being visited when the run aborted.
    pub fn index(&self) -> usize {
        match self {
            Self::Motion { index, .. } | Self::Probe { index, .. } => *index,
        }
    }
}

impl std::fmt::Display for SurveyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Motion { index, source } => {
                write!(f, "survey aborted moving to point {}: {}", index, source)
            }
            Self::Probe { index, source } => {
                write!(f, "survey aborted reading point {}: {}", index, source)
            }
        }
    }
}

impl std::error::Error for SurveyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Motion { source, .. } => Some(source),
            Self::Probe { source, .. } => Some(source),
        }
    }
}

// ── Runs ───────────────────────────────────────────────────────────────────

/// Visit `points` (machine coordinates) in order and sample the probe at each.
///
/// Each reading is stored at the position the controller actually commanded,
/// which differs from the requested point when the move was clamped to the
/// envelope. The first collaborator error aborts the run; nothing is retried.
pub fn run_survey(
    points: &[Point3],
    frame: &Frame,
    motion: &mut dyn MotionController,
    probe: &mut dyn ProbeReader,
    options: &SurveyOptions,
) -> Result<Vec<FieldReading>, SurveyError> {
    if options.home_first {
        motion
            .home()
            .map_err(|source| SurveyError::Motion { index: 0, source })?;
    }

    let mut readings = Vec::with_capacity(points.len());
    for (index, p) in points.iter().enumerate() {
        let commanded = motion
            .move_to(p)
            .map_err(|source| SurveyError::Motion { index, source })?;
        if commanded != *p {
            tracing::warn!(
                "point {} clamped from {:?} to {:?}",
                index,
                p.to_array(),
                commanded.to_array()
            );
        }
        if !options.settle.is_zero() {
            std::thread::sleep(options.settle);
        }
        let field = probe
            .read_field()
            .map_err(|source| SurveyError::Probe { index, source })?;
        readings.push(FieldReading {
            position: frame.to_frame(&commanded),
            field,
        });
        tracing::trace!("point {}/{}: {:?}", index + 1, points.len(), field);
    }
    tracing::info!("survey complete: {} readings", readings.len());
    Ok(readings)
}

fn survey_segment(
    segment: &SweepSegment,
    frame: &Frame,
    motion: &mut dyn MotionController,
    probe: &mut dyn ProbeReader,
    options: &SurveyOptions,
    offset: usize,
) -> Result<SegmentReadings, SurveyError> {
    tracing::debug!("surveying segment {} ({} points)", segment.label, segment.len());
    let readings = run_survey(&segment.points, frame, motion, probe, options).map_err(|e| match e {
        SurveyError::Motion { index, source } => SurveyError::Motion {
            index: index + offset,
            source,
        },
        SurveyError::Probe { index, source } => SurveyError::Probe {
            index: index + offset,
            source,
        },
    })?;
    Ok(SegmentReadings {
        label: segment.label.clone(),
        readings,
        coords: segment.coords.clone(),
    })
}

/// Survey every segment of `plan` in order. Error indices count points across
/// the whole plan. `options.home_first` applies once, before the first segment.
pub fn run_sweep_survey(
    plan: &SweepPlan,
    frame: &Frame,
    motion: &mut dyn MotionController,
    probe: &mut dyn ProbeReader,
    options: &SurveyOptions,
) -> Result<Vec<SegmentReadings>, SurveyError> {
    if options.home_first {
        motion
            .home()
            .map_err(|source| SurveyError::Motion { index: 0, source })?;
    }
    let per_segment = SurveyOptions {
        home_first: false,
        ..options.clone()
    };

    let mut out = Vec::with_capacity(plan.segments.len());
    let mut offset = 0;
    for segment in &plan.segments {
        out.push(survey_segment(segment, frame, motion, probe, &per_segment, offset)?);
        offset += segment.len();
    }
    Ok(out)
}
