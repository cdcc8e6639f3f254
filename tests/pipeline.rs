//! End-to-end sessions: synthetic performance in, page turns out.

use pageturner::config::{ActivityMeasure, Settings, TempoConfig};
use pageturner::feature::ChromaExtractor;
use pageturner::io::{load_mono_i16, save_mono_i16, tone_i16};
use pageturner::pipeline::{FrameReport, PageTurnSink, PageTurner, SerialSink};
use pageturner::score::ReferenceProfile;
use pageturner::tracker::{PageTurn, Step};
use pageturner::Error;
use std::sync::Arc;

const FRAME: usize = 4096;
const SR: u32 = 44100;
const FRAMES_PER_NOTE: usize = 4;
/// C major scale, C4 to C5
const SCALE: [f32; 8] = [261.63, 293.66, 329.63, 349.23, 392.0, 440.0, 493.88, 523.25];

fn performance() -> Vec<i16> {
    SCALE
        .iter()
        .flat_map(|&f| tone_i16(f, SR, FRAME * FRAMES_PER_NOTE, 0.5))
        .collect()
}

/// Reference built from the same audio, one page boundary at the end of
/// the fourth note.
fn reference(audio: &[i16], settings: &Settings) -> Arc<ReferenceProfile> {
    let mut extractor = ChromaExtractor::new(settings.extractor.clone()).unwrap();
    let frames: Vec<[f32; 12]> = audio.chunks_exact(FRAME).map(|f| extractor.extract(f)).collect();
    Arc::new(ReferenceProfile::from_vectors(&frames, vec![4 * FRAMES_PER_NOTE - 1]).unwrap())
}

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.tracker.page_turn_offset = 2;
    settings
}

#[test]
fn scale_performance_turns_one_page() {
    let audio = performance();
    let settings = settings();
    let mut turner = PageTurner::new(reference(&audio, &settings), &settings).unwrap();

    let mut reports: Vec<FrameReport> = Vec::new();
    for block in audio.chunks(1000) {
        turner
            .push_samples(block, |report| {
                reports.push(report);
                Ok(())
            })
            .unwrap();
    }

    assert_eq!(reports.len(), SCALE.len() * FRAMES_PER_NOTE);
    let turns: Vec<(usize, PageTurn)> = reports
        .iter()
        .enumerate()
        .flat_map(|(i, r)| r.page_turns().iter().map(move |t| (i, *t)))
        .collect();
    assert_eq!(turns.len(), 1);
    let (frame_index, turn) = turns[0];
    assert_eq!(turn.page, 2);
    assert!(turn.position >= 13);
    // Fires while the fourth note is still sounding
    assert!((10..=15).contains(&frame_index), "turned at frame {frame_index}");

    assert!(turner.is_finished());
    assert!(reports.iter().all(|r| !matches!(r.step, Step::Waiting)));
}

#[test]
fn position_tracks_the_notes() {
    let audio = performance();
    let settings = settings();
    let mut turner = PageTurner::new(reference(&audio, &settings), &settings).unwrap();
    for (k, frame) in audio.chunks_exact(FRAME).enumerate().take(20) {
        let report = turner.process_frame(frame).unwrap();
        let position = report.telemetry.position;
        // Never more than one note away from the true frame
        assert!(position.abs_diff(k) <= FRAMES_PER_NOTE, "frame {k} aligned to {position}");
    }
}

#[test]
fn silence_then_music_starts_late() {
    let audio = performance();
    let settings = settings();
    let mut turner = PageTurner::new(reference(&audio, &settings), &settings).unwrap();

    let mut session = vec![0i16; FRAME * 3];
    session.extend_from_slice(&audio);
    let mut steps = Vec::new();
    turner
        .push_samples(&session, |report| {
            steps.push(report.step);
            Ok(())
        })
        .unwrap();
    assert!(steps[..3].iter().all(|s| *s == Step::Waiting));
    assert!(matches!(steps[3], Step::Tracked { .. }));
}

#[test]
fn sinks_receive_turns() {
    let audio = performance();
    let settings = settings();
    let profile = reference(&audio, &settings);

    let mut collected: Vec<PageTurn> = Vec::new();
    let mut turner = PageTurner::new(Arc::clone(&profile), &settings).unwrap();
    let delivered = turner.push_and_dispatch(&audio, &mut collected).unwrap();
    assert_eq!(delivered, 1);
    assert_eq!(collected.len(), 1);

    let mut serial = SerialSink::new(Vec::new());
    let mut turner = PageTurner::new(profile, &settings).unwrap();
    for block in audio.chunks(4410) {
        turner.push_and_dispatch(block, &mut serial).unwrap();
    }
    assert_eq!(serial.into_inner(), b"n");
}

struct FailingSink;

impl PageTurnSink for FailingSink {
    fn turn_page(&mut self, _turn: &PageTurn) -> pageturner::Result<()> {
        Err(std::io::Error::other("link down").into())
    }
}

#[test]
fn sink_errors_propagate() {
    let audio = performance();
    let settings = settings();
    let mut turner = PageTurner::new(reference(&audio, &settings), &settings).unwrap();
    let err = turner.push_and_dispatch(&audio, &mut FailingSink).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn wrong_frame_length_is_an_error() {
    let audio = performance();
    let settings = settings();
    let mut turner = PageTurner::new(reference(&audio, &settings), &settings).unwrap();
    let err = turner.process_frame(&audio[..100]).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }));
    assert!(!turner.telemetry().is_running());
}

#[test]
fn reset_starts_over() {
    let audio = performance();
    let settings = settings();
    let mut turner = PageTurner::new(reference(&audio, &settings), &settings).unwrap();
    turner.push_samples(&audio[..FRAME * 6 + 10], |_| Ok(())).unwrap();
    assert!(turner.telemetry().position > 0);

    turner.reset();
    let tel = turner.telemetry();
    assert!(!tel.is_running());
    assert_eq!(tel.position, 0);
    assert_eq!(tel.pages_turned, 0);

    let mut collected: Vec<PageTurn> = Vec::new();
    turner.push_and_dispatch(&audio, &mut collected).unwrap();
    assert_eq!(collected.len(), 1);
}

#[test]
fn overlapping_frames_and_rms_gate() {
    let audio = performance();
    let mut settings = settings();
    settings.session.hop_length = Some(FRAME / 2);
    settings.session.activity = ActivityMeasure::Rms;
    settings.session.smoothing_window = 2;
    let mut turner = PageTurner::new(reference(&audio, &settings), &settings).unwrap();

    let mut count = 0;
    let mut activity = 0.0f32;
    turner
        .push_samples(&audio[..FRAME * 4], |report| {
            count += 1;
            activity = report.activity;
            Ok(())
        })
        .unwrap();
    // (4 * FRAME - FRAME) / hop + 1
    assert_eq!(count, 7);
    assert!((activity - 0.5 * 32767.0 / 2.0f32.sqrt()).abs() < 100.0);
}

#[test]
fn tempo_adds_measure_and_beat() {
    let audio = performance();
    let mut settings = settings();
    settings.tempo = Some(TempoConfig {
        bpm: 60.0,
        beats_per_measure: 4,
        reference_hop: FRAME,
        sample_rate: SR,
    });
    let mut turner = PageTurner::new(reference(&audio, &settings), &settings).unwrap();
    let report = turner.process_frame(&audio[..FRAME]).unwrap();
    assert_eq!(report.measure_beat, Some((1, 1)));
}

#[test]
fn recorded_performance_with_a_rest_replays_from_wav() {
    // Two frames of silence after the sixth note, in the reference too.
    let mut audio = performance();
    let rest_at = 6 * FRAMES_PER_NOTE * FRAME;
    audio.splice(rest_at..rest_at, std::iter::repeat_n(0i16, 2 * FRAME));

    let path = std::env::temp_dir().join(format!("pageturner-take-{}.wav", std::process::id()));
    save_mono_i16(&path, &audio, SR).unwrap();
    let (recorded, spec) = load_mono_i16(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(spec.sample_rate, SR);
    assert_eq!(spec.channels, 1);
    assert_eq!(recorded, audio);

    let settings = settings();
    let profile = reference(&recorded, &settings);
    assert!((0..profile.len()).any(|j| profile.magnitude(j) == 0.0));

    let mut turner = PageTurner::new(profile, &settings).unwrap();
    let mut steps = Vec::new();
    let mut turns: Vec<PageTurn> = Vec::new();
    for block in recorded.chunks(2048) {
        turner
            .push_samples(block, |report| {
                turns.extend_from_slice(report.page_turns());
                steps.push(report.step);
                Ok(())
            })
            .unwrap();
    }
    assert!(steps.iter().all(|s| !matches!(s, Step::Lost { .. })));
    assert_eq!(turns.len(), 1);
    assert!(turner.is_finished());
}
