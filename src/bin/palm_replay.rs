use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result, bail};

use palm_gate::logging::init_logging;
use palm_gate::replay::{read_recording, replay};
use palm_gate::{Action, AppConfig, SteadinessTracker};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(config_path), Some(recording_path)) = (args.next(), args.next()) else {
        bail!("usage: palm-replay <config.json> <recording.jsonl>");
    };

    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading config from {config_path}"))?;
    init_logging(&config.log_level)?;

    let file = File::open(&recording_path)
        .with_context(|| format!("opening recording {recording_path}"))?;
    let frames = read_recording(BufReader::new(file))?;
    let mut tracker = SteadinessTracker::new(config.tracker.clone())?;

    let mut uploads = 0usize;
    for (at, action) in replay(&mut tracker, &frames) {
        match action {
            Action::NoAction => {}
            Action::UploadReady { bbox } => {
                uploads += 1;
                println!(
                    "{:>9.3}s  upload  [{:.0}, {:.0}, {:.0}, {:.0}]",
                    at.as_secs_f64(),
                    bbox.x0,
                    bbox.y0,
                    bbox.x1,
                    bbox.y1
                );
            }
        }
    }

    println!("{} frames, {} uploads", frames.len(), uploads);
    Ok(())
}
