use super::{A4_HZ, MIDI_A4, N_CHROMA};

/// Convert a frequency (Hz) to a fractional MIDI note number.
///
/// Non-positive frequencies have no pitch and return `None`.
pub fn hz_to_midi(frequency: f32) -> Option<f32> {
    if frequency > 0.0 && frequency.is_finite() {
        Some(12.0 * (frequency / A4_HZ).log2() + MIDI_A4)
    } else {
        None
    }
}

/// Convert a MIDI note number to frequency (Hz).
pub fn midi_to_hz(note: f32) -> f32 {
    A4_HZ * 2.0_f32.powf((note - MIDI_A4) / 12.0)
}

/// Fold a MIDI note number onto a pitch class in `0..12` (C = 0).
///
/// The note is rounded to the nearest semitone first; negative notes wrap
/// around instead of producing a negative class.
pub fn midi_to_pitch_class(note: f32) -> usize {
    (note.round() as i64).rem_euclid(N_CHROMA as i64) as usize
}

/// Pitch class of a frequency, or `None` for frequencies without a pitch.
///
/// # Example
/// ```
/// use pageturner::convert::hz_to_pitch_class;
///
/// assert_eq!(hz_to_pitch_class(440.0), Some(9)); // A
/// assert_eq!(hz_to_pitch_class(261.63), Some(0)); // C
/// assert_eq!(hz_to_pitch_class(0.0), None);
/// ```
pub fn hz_to_pitch_class(frequency: f32) -> Option<usize> {
    hz_to_midi(frequency).map(midi_to_pitch_class)
}
