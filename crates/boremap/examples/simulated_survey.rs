use boremap::{
    io, run_survey, simulate_touch_points, Calibrator, GcodeGantry, ProbeOrientation,
    SimulatedProbe, SurveyOptions,
};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let out = std::env::args().nth(1);

    let mut calibrator = Calibrator::new();
    calibrator.config_mut().sweep.spacing = 50.0;
    let cfg = calibrator.config();

    let touch = simulate_touch_points(&cfg.simulation, &cfg.envelope, 12, 42)?;
    let calibration = calibrator.calibrate(&touch)?;

    // Commands go to stderr instead of a serial port.
    let mut gantry = GcodeGantry::new(std::io::stderr(), cfg.envelope);
    let mut probe = SimulatedProbe::new([0.0, 0.0, 0.25], ProbeOrientation::default());
    let readings = run_survey(
        &calibration.plan.all_points(),
        &calibration.frame,
        &mut gantry,
        &mut probe,
        &SurveyOptions::default(),
    )?;
    println!(
        "Surveyed {} points, {} G-code commands.",
        readings.len(),
        gantry.commands_sent()
    );

    if let Some(path) = out {
        io::write_field_readings_file(Path::new(&path), &readings)?;
        println!("Wrote {path}");
    }
    Ok(())
}
