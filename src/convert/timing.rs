/// Convert a frame index to time in seconds.
pub fn frame_to_time(frame: usize, sr: u32, hop_length: usize) -> f32 {
    if sr == 0 {
        return 0.0;
    }
    (frame * hop_length) as f32 / sr as f32
}

/// Convert a time (seconds) to the nearest frame index.
pub fn time_to_frame(time: f32, sr: u32, hop_length: usize) -> usize {
    if hop_length == 0 || time <= 0.0 {
        return 0;
    }
    ((time * sr as f32) / hop_length as f32).round() as usize
}

/// Convert a time (seconds) to a 1-based `(measure, beat)` pair.
///
/// # Arguments
/// * `time` - Seconds from the start of the piece
/// * `bpm` - Tempo in beats per minute
/// * `beats_per_measure` - Beats in one measure (e.g. 4 for 4/4)
///
/// # Example
/// ```
/// use pageturner::convert::time_to_measure_beat;
///
/// // 60 BPM in 4/4: second 5 is the second beat of measure two.
/// assert_eq!(time_to_measure_beat(5.0, 60.0, 4), (2, 2));
/// ```
pub fn time_to_measure_beat(time: f32, bpm: f32, beats_per_measure: u32) -> (u32, u32) {
    if bpm <= 0.0 || beats_per_measure == 0 || time <= 0.0 {
        return (1, 1);
    }
    let sec_per_beat = 60.0 / bpm;
    let sec_per_measure = sec_per_beat * beats_per_measure as f32;
    let measure = (time / sec_per_measure) as u32 + 1;
    let beat = ((time % sec_per_measure) / sec_per_beat) as u32 + 1;
    (measure, beat.min(beats_per_measure))
}
