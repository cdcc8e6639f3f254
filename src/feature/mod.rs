//! Per-frame audio features: chroma vectors and activity (gate) measures.

pub mod activity;
pub mod chroma;
pub mod smoothing;

pub use activity::{mean_abs, rms};
pub use chroma::{ChromaExtractor, ChromaVector, magnitude};
pub use smoothing::ChromaSmoother;
