use boremap::{io, Calibrator, SweepPattern};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage: {} <calibration_points.csv> [config.json] [report.json]",
            args[0]
        );
        std::process::exit(2);
    }

    let touch = io::read_points_file(Path::new(&args[1]))?;
    let mut calibrator = match args.get(2) {
        Some(path) => Calibrator::from_json_file(Path::new(path))?,
        None => Calibrator::new(),
    };

    // Angled diameters in the cross-section 50 mm into the bore.
    calibrator.config_mut().sweep.pattern = SweepPattern::AngledLine {
        angles_deg: vec![90.0, 45.0, 0.0, -45.0],
        samples: 30,
        axial_offset: 50.0,
    };

    let calibration = calibrator.calibrate(&touch)?;
    for segment in &calibration.plan.segments {
        println!("{:>10}: {} points", segment.label, segment.len());
    }

    let report = calibration.report(calibrator.config());
    let json = serde_json::to_string_pretty(&report)?;
    match args.get(3) {
        Some(out_path) => {
            std::fs::write(out_path, json)?;
            println!("Wrote {out_path}");
        }
        None => println!("{json}"),
    }
    Ok(())
}
