//! boremap CLI — bore calibration, sweep planning and field surveys.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use boremap::io;
use boremap::potentiometer::{
    analyze_voltage_curve, fit_pot_model_ransac, PotModel, LAB_DISTANCES_MM, LAB_VOLTAGES,
};
use boremap::{
    run_sweep_survey, simulate_touch_points, CalibrationConfig, Calibrator, GcodeGantry,
    SegmentReadings, SimulatedProbe, SweepPattern,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "boremap")]
#[command(about = "Fit a bore from touch points, plan probe positions and map its field")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the bore and write the frame and planned points.
    Fit(CliFitArgs),

    /// Generate synthetic touch points on the nominal bore wall.
    SimulateTouch {
        /// Output CSV (X[mm],Y[mm],Z[mm]).
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 12)]
        count: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Optional JSON config (simulation and envelope sections).
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Convert points between machine and bore coordinates.
    Transform {
        #[arg(long)]
        points: PathBuf,
        /// Frame file written by `fit` (origin_info.csv).
        #[arg(long)]
        frame: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Bore → machine instead of machine → bore.
        #[arg(long)]
        to_machine: bool,
    },

    /// Write an offline G-code program visiting the given points.
    Gcode {
        #[arg(long)]
        points: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Feed rate in mm/min (overrides config).
        #[arg(long)]
        feed_rate: Option<f64>,
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Dry-run survey: G-code gantry writing to a file and a fixed-field probe.
    Survey(CliSurveyArgs),

    /// Fit a potentiometer resistance-vs-position model with RANSAC.
    PotFit {
        /// Two-column CSV: position, resistance.
        #[arg(long)]
        data: PathBuf,
        #[arg(long, value_enum, default_value_t = CliPotModel::Linear)]
        model: CliPotModel,
        /// Inlier threshold in ohms (overrides config).
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Regress slide distance on divider voltage and size the ADC.
    PotAnalyze {
        /// Two-column CSV: distance (mm), voltage (V). Bench data if omitted.
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        supply: Option<f64>,
        #[arg(long)]
        target_resolution: Option<f64>,
    },

    /// Print the default configuration as JSON.
    DefaultConfig {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
struct CliFitArgs {
    /// Touch points CSV (X[mm],Y[mm],Z[mm]).
    #[arg(long)]
    points: PathBuf,

    /// Directory for origin_info.csv and the per-segment point files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Path to write the calibration report (JSON).
    #[arg(long)]
    report: Option<PathBuf>,

    #[command(flatten)]
    overrides: CliPlanOverrides,
}

#[derive(Debug, Clone, Args)]
struct CliSurveyArgs {
    /// Touch points CSV; the survey runs over the resulting plan.
    #[arg(long)]
    points: PathBuf,

    /// Directory for the readings files.
    #[arg(long)]
    out_dir: PathBuf,

    /// File receiving the G-code stream (stdout if omitted).
    #[arg(long)]
    commands: Option<PathBuf>,

    /// Raw probe reading in tesla, sensor axes.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    raw_field: Option<Vec<f64>>,

    /// Home the gantry before the first move.
    #[arg(long)]
    home: bool,

    #[command(flatten)]
    overrides: CliPlanOverrides,
}

#[derive(Debug, Clone, Args)]
struct CliPlanOverrides {
    /// JSON config file; flags below take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pattern: Option<CliPattern>,

    /// Lattice spacing (mm).
    #[arg(long)]
    spacing: Option<f64>,

    /// Wall clearance subtracted from the fitted radius (mm).
    #[arg(long)]
    clearance: Option<f64>,

    /// Rotate the bore frame 180° about z.
    #[arg(long)]
    flipped: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPattern {
    Dense,
    Ring,
    Angled,
    Quadrant,
}

impl CliPattern {
    fn to_core(self) -> SweepPattern {
        match self {
            Self::Dense => SweepPattern::Dense,
            Self::Ring => SweepPattern::ring(),
            Self::Angled => SweepPattern::angled_lines(),
            Self::Quadrant => SweepPattern::quadrant_lines(),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPotModel {
    Linear,
    Log,
}

impl CliPotModel {
    fn to_core(self) -> PotModel {
        match self {
            Self::Linear => PotModel::Linear,
            Self::Log => PotModel::Logarithmic,
        }
    }
}

fn load_config(path: Option<&Path>) -> CliResult<CalibrationConfig> {
    match path {
        Some(p) => CalibrationConfig::from_json_file(p),
        None => Ok(CalibrationConfig::default()),
    }
}

impl CliPlanOverrides {
    fn build_config(&self) -> CliResult<CalibrationConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(pattern) = self.pattern {
            config.sweep.pattern = pattern.to_core();
        }
        if let Some(spacing) = self.spacing {
            config.sweep.spacing = spacing;
        }
        if let Some(clearance) = self.clearance {
            config.sweep.clearance = clearance;
        }
        if self.flipped {
            config.flipped = true;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fit(args) => run_fit(&args),
        Commands::SimulateTouch {
            out,
            count,
            seed,
            config,
        } => run_simulate_touch(&out, count, seed, config.as_deref()),
        Commands::Transform {
            points,
            frame,
            out,
            to_machine,
        } => run_transform(&points, &frame, &out, to_machine),
        Commands::Gcode {
            points,
            out,
            feed_rate,
            config,
        } => run_gcode(&points, &out, feed_rate, config.as_deref()),
        Commands::Survey(args) => run_survey(&args),
        Commands::PotFit {
            data,
            model,
            threshold,
            seed,
            config,
        } => run_pot_fit(&data, model, threshold, seed, config.as_deref()),
        Commands::PotAnalyze {
            data,
            supply,
            target_resolution,
        } => run_pot_analyze(data.as_deref(), supply, target_resolution),
        Commands::DefaultConfig { out } => run_default_config(out.as_deref()),
    }
}

// ── fit ────────────────────────────────────────────────────────────────

fn run_fit(args: &CliFitArgs) -> CliResult<()> {
    let config = args.overrides.build_config()?;
    let touch = io::read_points_file(&args.points)?;
    tracing::info!("Loaded {} touch points from {}", touch.len(), args.points.display());

    let calibrator = Calibrator::with_config(config);
    let calibration = calibrator.calibrate(&touch)?;
    let fit = &calibration.fit;
    tracing::info!(
        "Bore axis y={:.3} z={:.3} radius={:.3} mm, rms residual {:.4} mm",
        fit.center_y,
        fit.center_z,
        fit.radius,
        calibration.stats.rms_residual_mm
    );

    for path in calibration.write_outputs(&args.out_dir)? {
        tracing::info!("Wrote {}", path.display());
    }

    if let Some(report_path) = &args.report {
        let report = calibration.report(calibrator.config());
        std::fs::write(report_path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!("Report written to {}", report_path.display());
    }
    Ok(())
}

// ── simulate-touch ─────────────────────────────────────────────────────

fn run_simulate_touch(out: &Path, count: usize, seed: u64, config: Option<&Path>) -> CliResult<()> {
    let config = load_config(config)?;
    let points = simulate_touch_points(&config.simulation, &config.envelope, count, seed)?;
    io::write_points_file(out, &points)?;
    tracing::info!("Wrote {} touch points to {}", points.len(), out.display());
    Ok(())
}

// ── transform ──────────────────────────────────────────────────────────

fn run_transform(points: &Path, frame: &Path, out: &Path, to_machine: bool) -> CliResult<()> {
    let input = io::read_points_file(points)?;
    let frame = io::read_frame_file(frame)?;
    let output = if to_machine {
        frame.points_to_machine(&input)
    } else {
        frame.points_to_frame(&input)
    };
    io::write_points_file(out, &output)?;
    tracing::info!(
        "Transformed {} points ({}) to {}",
        output.len(),
        if to_machine { "bore → machine" } else { "machine → bore" },
        out.display()
    );
    Ok(())
}

// ── gcode ──────────────────────────────────────────────────────────────

fn run_gcode(
    points: &Path,
    out: &Path,
    feed_rate: Option<f64>,
    config: Option<&Path>,
) -> CliResult<()> {
    let mut program = load_config(config)?.gcode;
    if let Some(f) = feed_rate {
        program.feed_rate = f;
    }
    let points = io::read_points_file(points)?;
    let file = std::fs::File::create(out)?;
    program.write(std::io::BufWriter::new(file), &points)?;
    tracing::info!("Wrote {} moves to {}", points.len(), out.display());
    Ok(())
}

// ── survey ─────────────────────────────────────────────────────────────

fn run_survey(args: &CliSurveyArgs) -> CliResult<()> {
    let mut config = args.overrides.build_config()?;
    if args.home {
        config.survey.home_first = true;
    }

    let touch = io::read_points_file(&args.points)?;
    let calibrator = Calibrator::with_config(config);
    let calibration = calibrator.calibrate(&touch)?;
    let config = calibrator.config();

    let raw = match args.raw_field.as_deref() {
        Some([x, y, z]) => [*x, *y, *z],
        Some(other) => return Err(format!("--raw-field needs 3 values, got {}", other.len()).into()),
        None => [0.0, 0.0, 0.0],
    };
    let mut probe = SimulatedProbe::new(raw, config.probe);

    let sink: Box<dyn std::io::Write> = match &args.commands {
        Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    let mut gantry = GcodeGantry::new(sink, config.envelope);

    let segments = run_sweep_survey(
        &calibration.plan,
        &calibration.frame,
        &mut gantry,
        &mut probe,
        &config.survey,
    )?;
    tracing::info!(
        "Survey sent {} commands, took {} readings",
        gantry.commands_sent(),
        probe.reads()
    );

    std::fs::create_dir_all(&args.out_dir)?;
    io::write_frame_file(&args.out_dir.join(boremap::FRAME_FILE), &calibration.frame)?;
    for segment in &segments {
        let path = write_segment_readings(&args.out_dir, &config.sweep.pattern, segment)?;
        tracing::info!("{}: {} readings → {}", segment.label, segment.readings.len(), path.display());
    }
    Ok(())
}

/// Radial format for angled lines, linear format for quadrant lines and the
/// full reading format otherwise.
fn write_segment_readings(
    dir: &Path,
    pattern: &SweepPattern,
    segment: &SegmentReadings,
) -> CliResult<PathBuf> {
    let path = match pattern {
        SweepPattern::Dense => dir.join("field_readings.csv"),
        _ => dir.join(format!("readings_{}.csv", segment.label)),
    };
    match (pattern, &segment.coords) {
        (SweepPattern::AngledLine { .. }, Some(radii)) => {
            io::write_radial_sweep_file(&path, radii, &segment.fields())?
        }
        (SweepPattern::QuadrantLine { .. }, _) => {
            io::write_linear_sweep_file(&path, &segment.readings)?
        }
        _ => io::write_field_readings_file(&path, &segment.readings)?,
    }
    Ok(path)
}

// ── pot-fit ────────────────────────────────────────────────────────────

fn run_pot_fit(
    data: &Path,
    model: CliPotModel,
    threshold: Option<f64>,
    seed: Option<u64>,
    config: Option<&Path>,
) -> CliResult<()> {
    let mut ransac = load_config(config)?.potentiometer;
    ransac.model = model.to_core();
    if let Some(t) = threshold {
        ransac.inlier_threshold = t;
    }
    if let Some(s) = seed {
        ransac.seed = s;
    }

    let (positions, resistances) = io::read_samples_file(data)?;
    let calibration = fit_pot_model_ransac(&positions, &resistances, &ransac)?;
    tracing::info!(
        "{:?} model: {}/{} inliers",
        ransac.model,
        calibration.num_inliers,
        positions.len()
    );
    println!("{}", serde_json::to_string_pretty(&calibration)?);
    Ok(())
}

// ── pot-analyze ────────────────────────────────────────────────────────

fn run_pot_analyze(
    data: Option<&Path>,
    supply: Option<f64>,
    target_resolution: Option<f64>,
) -> CliResult<()> {
    let (distances, voltages) = match data {
        Some(path) => io::read_samples_file(path)?,
        None => (LAB_DISTANCES_MM.to_vec(), LAB_VOLTAGES.to_vec()),
    };
    let mut options = CalibrationConfig::default().voltage;
    if let Some(s) = supply {
        options.supply_voltage = s;
    }
    if let Some(r) = target_resolution {
        options.target_resolution_mm = r;
    }

    let report = analyze_voltage_curve(&distances, &voltages, &options)?;
    tracing::info!(
        "slope {:.4} mm/V, rmse {:.4} mm, {} ADC bits for {} mm",
        report.slope_mm_per_volt,
        report.rmse_mm,
        report.adc_bits,
        options.target_resolution_mm
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// ── default-config ─────────────────────────────────────────────────────

fn run_default_config(out: Option<&Path>) -> CliResult<()> {
    let json = CalibrationConfig::default().to_json()?;
    match out {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!("Default config written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
