//! Synthetic Page-Turning Session Example
//!
//! Builds a reference profile from a synthesized melody, then follows a
//! faster rendition of the same melody through a full session and prints
//! every page turn. The reference header and the take are left in the
//! temp directory for replaying with `follow_wav`.
//!
//! Run with `RUST_LOG=info` (or `trace` for per-frame telemetry).

use log::info;
use pageturner::config::Settings;
use pageturner::convert::{midi_to_hz, time_to_frame};
use pageturner::feature::ChromaExtractor;
use pageturner::io::{save_mono_i16, tone_i16};
use pageturner::pipeline::PageTurner;
use pageturner::score::{ReferenceProfile, write_header};
use pageturner::tracker::PageTurn;
use std::sync::Arc;

/// Twinkle, twinkle: (MIDI note, beats)
const MELODY: [(u8, f32); 14] = [
    (60, 1.0),
    (60, 1.0),
    (67, 1.0),
    (67, 1.0),
    (69, 1.0),
    (69, 1.0),
    (67, 2.0),
    (65, 1.0),
    (65, 1.0),
    (64, 1.0),
    (64, 1.0),
    (62, 1.0),
    (62, 1.0),
    (60, 2.0),
];

fn render(sr: u32, seconds_per_beat: f32) -> Vec<i16> {
    MELODY
        .iter()
        .flat_map(|&(note, beats)| {
            let freq = midi_to_hz(note as f32);
            let n = (beats * seconds_per_beat * sr as f32) as usize;
            tone_i16(freq, sr, n, 0.4)
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    info!("Synthetic page-turning session");

    let mut settings = Settings::default();
    settings.tracker.page_turn_offset = 3;
    let sr = settings.extractor.sample_rate;
    let frame = settings.extractor.frame_size;

    // Reference at 60 BPM
    let reference_audio = render(sr, 1.0);
    let mut extractor = ChromaExtractor::new(settings.extractor.clone())?;
    let frames: Vec<[f32; 12]> = reference_audio
        .chunks_exact(frame)
        .map(|f| extractor.extract(f))
        .collect();
    // One page per line of the tune: the first line is 8 beats long
    let boundaries = vec![time_to_frame(8.0, sr, frame).saturating_sub(1)];
    let profile = Arc::new(ReferenceProfile::from_vectors(&frames, boundaries)?);
    info!(
        "Reference: {} frames, {} pages",
        profile.len(),
        profile.num_pages()
    );
    info!(
        "Header preview:\n{}",
        write_header(&profile, Some("synthetic reference"))
            .lines()
            .take(8)
            .collect::<Vec<_>>()
            .join("\n")
    );

    // Performance at roughly 70 BPM, a second of silence up front,
    // delivered in 512-sample blocks like an audio callback.
    let mut live = vec![0i16; sr as usize];
    live.extend(render(sr, 0.85));

    // Keep the take and its reference for replaying with `follow_wav`
    let dir = std::env::temp_dir();
    let header_path = dir.join("pageturner-synthetic-ScoreData.h");
    let take_path = dir.join("pageturner-synthetic-take.wav");
    std::fs::write(&header_path, write_header(&profile, Some("synthetic reference")))?;
    save_mono_i16(&take_path, &live, sr)?;
    info!(
        "Wrote {} and {}",
        header_path.display(),
        take_path.display()
    );

    let mut turner = PageTurner::new(Arc::clone(&profile), &settings)?;
    let mut turns: Vec<PageTurn> = Vec::new();
    for block in live.chunks(512) {
        turner.push_and_dispatch(block, &mut turns)?;
        if turner.is_finished() {
            break;
        }
    }

    for turn in &turns {
        info!(
            "Turned to page {} at reference frame {} (boundary {})",
            turn.page, turn.position, turn.boundary
        );
    }
    info!("Final state: {}", turner.telemetry());
    Ok(())
}
