//! Follow a Recorded Performance Example
//!
//! Replays a WAV recording against a `ScoreData.h` reference, as the
//! page turner would hear it live, and writes one `n` to stdout per page
//! turn.
//!
//! ```text
//! cargo run --example follow_wav -- ScoreData.h performance.wav [settings.toml]
//! ```

use log::{info, warn};
use pageturner::config::Settings;
use pageturner::io::WavFrames;
use pageturner::pipeline::{PageTurner, SerialSink};
use pageturner::score::read_header;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: {} <ScoreData.h> <performance.wav> [settings.toml]", args[0]);
        std::process::exit(2);
    }

    let settings = match args.get(3) {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let profile = Arc::new(read_header(&args[1])?);
    info!(
        "Reference: {} frames, page boundaries {:?}",
        profile.len(),
        profile.page_boundaries()
    );

    let frames = WavFrames::open(&args[2], 1024)?;
    let spec = frames.spec();
    if spec.sample_rate != settings.extractor.sample_rate {
        warn!(
            "recording is {} Hz but the extractor expects {} Hz; pitch classes will be off",
            spec.sample_rate, settings.extractor.sample_rate
        );
    }

    let mut turner = PageTurner::new(profile, &settings)?;
    let mut sink = SerialSink::new(std::io::stdout());
    let mut turns = 0;
    for block in frames {
        turns += turner.push_and_dispatch(&block?, &mut sink)?;
        if turner.is_finished() {
            break;
        }
    }

    info!("{turns} page turn(s); final state: {}", turner.telemetry());
    Ok(())
}
