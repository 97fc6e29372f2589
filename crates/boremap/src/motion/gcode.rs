//! G-code encoding for the gantry.
//!
//! The CNC controller counts y and z downward from the top of the envelope,
//! so a machine target `(x, y, z)` is sent as `X x  Y y_max − y  Z z_max − z`.

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::{AxisTarget, MotionController, MotionError};
use crate::geometry::{Envelope, Point3};

/// Live (or simulated) gantry driven by `G0` rapid moves over a byte stream.
#[derive(Debug)]
pub struct GcodeGantry<W: Write> {
    out: W,
    envelope: Envelope,
    position: Point3,
    commands: usize,
}

impl<W: Write> GcodeGantry<W> {
    pub fn new(out: W, envelope: Envelope) -> Self {
        Self {
            out,
            envelope,
            position: Point3::ORIGIN,
            commands: 0,
        }
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Commands written so far.
    pub fn commands_sent(&self) -> usize {
        self.commands
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Encode a move to an already clamped target. Only set axes are emitted.
    pub fn encode_move(&self, target: &AxisTarget) -> String {
        let mut cmd = String::from("G0");
        if let Some(x) = target.x {
            cmd.push_str(&format!(" X{:.3}", x));
        }
        if let Some(y) = target.y {
            cmd.push_str(&format!(" Y{:.3}", self.envelope.y[1] - y));
        }
        if let Some(z) = target.z {
            cmd.push_str(&format!(" Z{:.3}", self.envelope.z[1] - z));
        }
        cmd
    }

    fn send(&mut self, cmd: &str) -> Result<(), MotionError> {
        tracing::trace!("gcode: {}", cmd);
        writeln!(self.out, "{}", cmd)?;
        self.out.flush()?;
        self.commands += 1;
        Ok(())
    }
}

impl<W: Write> MotionController for GcodeGantry<W> {
    fn move_axes(&mut self, target: &AxisTarget) -> Result<Point3, MotionError> {
        if target.is_empty() {
            return Ok(self.position);
        }
        let clamped = self.envelope.clamp_target(target);
        let cmd = self.encode_move(&clamped);
        self.send(&cmd)?;
        self.position = clamped.resolve(&self.position);
        Ok(self.position)
    }

    fn current_position(&self) -> Point3 {
        self.position
    }

    /// `$H`; afterwards the head sits at CNC zero, i.e. `(x_min, y_max, z_max)`.
    fn home(&mut self) -> Result<(), MotionError> {
        self.send("$H")?;
        self.position = Point3::new(self.envelope.x[0], self.envelope.y[1], self.envelope.z[1]);
        Ok(())
    }
}

/// Offline G-code program for a point list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GcodeProgram {
    /// `F` word of every move (mm/min).
    pub feed_rate: f64,
    /// Machine position of the program zero; subtracted from each point.
    pub offset: Point3,
}

impl Default for GcodeProgram {
    fn default() -> Self {
        Self {
            feed_rate: 1500.0,
            offset: Point3::new(377.0, 252.0, 252.0),
        }
    }
}

impl GcodeProgram {
    /// Program text: unit/positioning/home preamble, then one `G1` per point
    /// shifted by `offset`.
    pub fn render(&self, points: &[Point3]) -> String {
        let mut text = String::from(
            "G21 ; Set units to millimeters\nG90 ; Use absolute positioning\nG28 ; Home all axes\n",
        );
        for p in points {
            let q = *p - self.offset;
            text += &format!(
                "G1 X{:.3} Y{:.3} Z{:.3} F{}\n",
                q.x, q.y, q.z, self.feed_rate
            );
        }
        text
    }

    pub fn write<W: Write>(&self, mut w: W, points: &[Point3]) -> std::io::Result<()> {
        w.write_all(self.render(points).as_bytes())?;
        w.flush()
    }
}
