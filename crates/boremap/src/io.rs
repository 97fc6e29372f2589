//! CSV persistence for point sets, frames and field readings.
//!
//! Every file starts with a single header row. Readers accept any header
//! text and trim surrounding whitespace from fields.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};

use crate::frame::{Frame, FrameError};
use crate::geometry::Point3;
use crate::motion::FieldVector;
use crate::survey::FieldReading;

pub const POINTS_HEADER: [&str; 3] = ["X[mm]", "Y[mm]", "Z[mm]"];
pub const FIELD_READINGS_HEADER: [&str; 6] =
    ["X[mm]", "Y[mm]", "Z[mm]", "Bx[mT]", "By[mT]", "Bz[mT]"];
pub const RADIAL_SWEEP_HEADER: [&str; 4] = ["R", "Bx", "By", "Bz"];
pub const LINEAR_SWEEP_HEADER: [&str; 6] = ["X", "Y", "Z", "Bx", "By", "Bz"];

// ── Error type ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    Csv(csv::Error),
    /// File parsed as CSV but does not have the expected shape.
    Format(String),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Csv(e) => write!(f, "CSV error: {}", e),
            Self::Format(msg) => write!(f, "malformed file: {}", msg),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Format(_) => None,
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for PersistError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<FrameError> for PersistError {
    fn from(e: FrameError) -> Self {
        Self::Format(e.to_string())
    }
}

fn csv_writer<W: Write>(w: W, header: &[&str]) -> Result<csv::Writer<W>, PersistError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(w);
    wtr.write_record(header)?;
    Ok(wtr)
}

fn csv_reader<R: Read>(r: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(r)
}

// ── Points ─────────────────────────────────────────────────────────────────

pub fn write_points<W: Write>(w: W, points: &[Point3]) -> Result<(), PersistError> {
    let mut wtr = csv_writer(w, &POINTS_HEADER)?;
    for p in points {
        wtr.serialize((p.x, p.y, p.z))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_points<R: Read>(r: R) -> Result<Vec<Point3>, PersistError> {
    let mut rdr = csv_reader(r);
    let mut out = Vec::new();
    for row in rdr.deserialize::<(f64, f64, f64)>() {
        let (x, y, z) = row?;
        out.push(Point3::new(x, y, z));
    }
    Ok(out)
}

// ── Frame ──────────────────────────────────────────────────────────────────

/// Write `origin_info.csv`: header, then origin, x̂, ŷ, ẑ.
pub fn write_frame<W: Write>(w: W, frame: &Frame) -> Result<(), PersistError> {
    let mut wtr = csv_writer(w, &POINTS_HEADER)?;
    for row in frame.to_rows() {
        wtr.serialize((row[0], row[1], row[2]))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_frame<R: Read>(r: R) -> Result<Frame, PersistError> {
    let rows = read_points(r)?;
    if rows.len() != 4 {
        return Err(PersistError::Format(format!(
            "frame file needs 4 rows (origin + 3 axes), found {}",
            rows.len()
        )));
    }
    Ok(Frame::from_rows([
        rows[0].to_array(),
        rows[1].to_array(),
        rows[2].to_array(),
        rows[3].to_array(),
    ])?)
}

// ── Field readings ─────────────────────────────────────────────────────────

pub fn write_field_readings<W: Write>(w: W, readings: &[FieldReading]) -> Result<(), PersistError> {
    let mut wtr = csv_writer(w, &FIELD_READINGS_HEADER)?;
    for r in readings {
        let (p, b) = (r.position, r.field);
        wtr.serialize((p.x, p.y, p.z, b.bx, b.by, b.bz))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_field_readings<R: Read>(r: R) -> Result<Vec<FieldReading>, PersistError> {
    let mut rdr = csv_reader(r);
    let mut out = Vec::new();
    for row in rdr.deserialize::<(f64, f64, f64, f64, f64, f64)>() {
        let (x, y, z, bx, by, bz) = row?;
        out.push(FieldReading {
            position: Point3::new(x, y, z),
            field: FieldVector::new(bx, by, bz),
        });
    }
    Ok(out)
}

/// Angled-line readings keyed by signed radius: `R,Bx,By,Bz`.
pub fn write_radial_sweep<W: Write>(
    w: W,
    radii: &[f64],
    fields: &[FieldVector],
) -> Result<(), PersistError> {
    if radii.len() != fields.len() {
        return Err(PersistError::Format(format!(
            "{} radii for {} field readings",
            radii.len(),
            fields.len()
        )));
    }
    let mut wtr = csv_writer(w, &RADIAL_SWEEP_HEADER)?;
    for (r, b) in radii.iter().zip(fields) {
        wtr.serialize((r, b.bx, b.by, b.bz))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Axial-line readings: `X,Y,Z,Bx,By,Bz`.
pub fn write_linear_sweep<W: Write>(w: W, readings: &[FieldReading]) -> Result<(), PersistError> {
    let mut wtr = csv_writer(w, &LINEAR_SWEEP_HEADER)?;
    for r in readings {
        let (p, b) = (r.position, r.field);
        wtr.serialize((p.x, p.y, p.z, b.bx, b.by, b.bz))?;
    }
    wtr.flush()?;
    Ok(())
}

// ── Two-column samples ─────────────────────────────────────────────────────

/// Read a two-column numeric table (e.g. position vs. resistance) after a
/// header row.
pub fn read_samples<R: Read>(r: R) -> Result<(Vec<f64>, Vec<f64>), PersistError> {
    let mut rdr = csv_reader(r);
    let mut first = Vec::new();
    let mut second = Vec::new();
    for row in rdr.deserialize::<(f64, f64)>() {
        let (a, b) = row?;
        first.push(a);
        second.push(b);
    }
    Ok((first, second))
}

// ── Path wrappers ──────────────────────────────────────────────────────────

fn create(path: &Path) -> Result<BufWriter<File>, PersistError> {
    Ok(BufWriter::new(File::create(path)?))
}

fn open(path: &Path) -> Result<BufReader<File>, PersistError> {
    Ok(BufReader::new(File::open(path)?))
}

pub fn write_points_file(path: &Path, points: &[Point3]) -> Result<(), PersistError> {
    write_points(create(path)?, points)
}

pub fn read_points_file(path: &Path) -> Result<Vec<Point3>, PersistError> {
    read_points(open(path)?)
}

pub fn write_frame_file(path: &Path, frame: &Frame) -> Result<(), PersistError> {
    write_frame(create(path)?, frame)
}

pub fn read_frame_file(path: &Path) -> Result<Frame, PersistError> {
    read_frame(open(path)?)
}

pub fn write_field_readings_file(path: &Path, readings: &[FieldReading]) -> Result<(), PersistError> {
    write_field_readings(create(path)?, readings)
}

pub fn read_field_readings_file(path: &Path) -> Result<Vec<FieldReading>, PersistError> {
    read_field_readings(open(path)?)
}

pub fn read_samples_file(path: &Path) -> Result<(Vec<f64>, Vec<f64>), PersistError> {
    read_samples(open(path)?)
}

pub fn write_radial_sweep_file(
    path: &Path,
    radii: &[f64],
    fields: &[FieldVector],
) -> Result<(), PersistError> {
    write_radial_sweep(create(path)?, radii, fields)
}

pub fn write_linear_sweep_file(path: &Path, readings: &[FieldReading]) -> Result<(), PersistError> {
    write_linear_sweep(create(path)?, readings)
}
