use super::*;

#[test]
fn test_hz_conversions() {
    let midi = hz_to_midi(440.0).unwrap();
    assert!((midi - 69.0).abs() < 0.01);
    assert!((midi_to_hz(midi) - 440.0).abs() < 0.1);
    assert_eq!(hz_to_midi(-3.0), None);
    assert_eq!(hz_to_midi(f32::NAN), None);
}

#[test]
fn test_pitch_classes() {
    assert_eq!(midi_to_pitch_class(60.0), 0);
    assert_eq!(midi_to_pitch_class(71.4), 11);
    assert_eq!(midi_to_pitch_class(71.6), 0);
    // sub-audio notes wrap instead of going negative
    assert_eq!(midi_to_pitch_class(-1.0), 11);
    assert_eq!(hz_to_pitch_class(midi_to_hz(64.0)), Some(4));
}

#[test]
fn test_bin_frequencies() {
    let freqs = fft_frequencies(44100, 4096);
    assert!((freqs[1] - 10.766).abs() < 1e-3);
    assert!((freqs[2048] - 22050.0).abs() < 1e-2);
    assert_eq!(bin_to_hz(3, 44100, 0), 0.0);
}

#[test]
fn test_time_conversions() {
    let t = frame_to_time(10, 22050, 512);
    assert!((t - 0.232).abs() < 0.01);
    assert_eq!(time_to_frame(t, 22050, 512), 10);
    assert_eq!(frame_to_time(3, 0, 512), 0.0);
}

#[test]
fn test_measure_beat() {
    assert_eq!(time_to_measure_beat(0.0, 40.0, 4), (1, 1));
    // 40 BPM: 1.5 s per beat, 6 s per measure
    assert_eq!(time_to_measure_beat(6.0, 40.0, 4), (2, 1));
    assert_eq!(time_to_measure_beat(10.6, 40.0, 4), (2, 4));
    assert_eq!(time_to_measure_beat(3.0, 0.0, 4), (1, 1));
}
