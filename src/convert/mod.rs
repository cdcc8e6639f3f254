//! Conversion utilities (frequency, pitch class, frames, musical time).

pub(crate) const A4_HZ: f32 = 440.0;
pub(crate) const MIDI_A4: f32 = 69.0;

/// Number of pitch classes in an octave.
pub const N_CHROMA: usize = 12;

mod frequency;
mod pitch;
mod timing;

pub use frequency::*;
pub use pitch::*;
pub use timing::*;

#[cfg(test)]
mod tests;
