use boremap::{io, Calibrator};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <calibration_points.csv> [out_dir]", args[0]);
        std::process::exit(2);
    }

    let touch = io::read_points_file(Path::new(&args[1]))?;
    let calibration = Calibrator::new().calibrate(&touch)?;

    println!(
        "Bore axis at y={:.3} z={:.3}, radius {:.3} mm (rms {:.3} mm).",
        calibration.fit.center_y,
        calibration.fit.center_z,
        calibration.fit.radius,
        calibration.stats.rms_residual_mm
    );
    println!("Planned {} valid points.", calibration.plan.len());

    if let Some(out_dir) = args.get(2) {
        for path in calibration.write_outputs(Path::new(out_dir))? {
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
