//! Real-time score following and automatic page turning for Rust.
//!
//! Pageturner listens to a live performance, aligns it against a reference
//! recording of the same piece, and fires a page-turn event shortly before
//! the performer reaches the end of each page.
//!
//! The alignment is an online Dynamic Time Warping over chroma (pitch-class)
//! features, restricted to a window around the current position so that
//! the work per audio frame stays constant however long the score is.
//!
//! # Features
//!
//! - **Chroma extraction**: Hann window, real FFT, noise-floored pitch-class
//!   folding and max normalization for 16-bit PCM frames
//! - **Reference profiles**: chroma sequences with page boundaries, read
//!   from and written to the `ScoreData.h` header format
//! - **Online alignment**: windowed DTW with wait/step/skip penalties, lost
//!   alignment detection, optional cost damping, progress telemetry
//! - **Sessions**: frame assembly from arbitrary blocks, activity gating,
//!   chroma smoothing, page-turn sinks (serial byte, in-memory)
//! - **Settings**: every tunable loadable from TOML
//!
//! # Quick Start
//!
//! ```rust
//! use pageturner::feature::ChromaExtractor;
//! use pageturner::config::{ExtractorConfig, Settings};
//! use pageturner::io::tone_i16;
//! use pageturner::pipeline::PageTurner;
//! use pageturner::score::ReferenceProfile;
//! use std::sync::Arc;
//!
//! // Reference: A4 then E5, one page boundary between them
//! let mut extractor = ChromaExtractor::new(ExtractorConfig::default()).unwrap();
//! let a4 = tone_i16(440.0, 44100, 4096, 0.5);
//! let e5 = tone_i16(659.26, 44100, 4096, 0.5);
//! let mut frames = vec![extractor.extract(&a4); 10];
//! frames.extend(vec![extractor.extract(&e5); 10]);
//! let profile = Arc::new(ReferenceProfile::from_vectors(&frames, vec![9]).unwrap());
//!
//! let mut turner = PageTurner::new(profile, &Settings::default()).unwrap();
//! let report = turner.process_frame(&a4).unwrap();
//! assert!(report.telemetry.is_running());
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`feature`] | Chroma extraction, activity measures, smoothing |
//! | [`score`] | Reference profiles and the `ScoreData.h` format |
//! | [`tracker`] | Online DTW alignment and page-turn detection |
//! | [`pipeline`] | Frame assembly, sessions, page-turn sinks |
//! | [`config`] | Tunables and TOML settings |
//! | [`io`] | Streaming WAV input, test tones |
//! | [`convert`] | Frequency, pitch class and timing conversions |
//! | [`fft`] | Planned real FFT magnitudes |
//! | [`window`] | Hann window |
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`. Once built, the per-frame path never
//! fails: malformed input degrades to a zero chroma vector or a lost update.
//!
//! # Safety
//!
//! This crate uses `#![forbid(unsafe_code)]`.

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub mod convert;
pub mod feature;
pub mod fft;
pub mod io;
pub mod pipeline;
pub mod score;
pub mod tracker;
pub mod window;
