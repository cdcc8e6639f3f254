//! Configuration parameters for feature extraction, alignment and sessions.
//!
//! Every value is fixed once the component it configures has been built.
//! Defaults are the values the deployed tracker runs with (4096-sample
//! frames at 44.1 kHz, 16-bit sample scale).

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Chroma extraction parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Samples per analysis frame, also the FFT length (default: 4096)
    pub frame_size: usize,

    /// Sample rate of incoming audio in Hz (default: 44100)
    pub sample_rate: u32,

    /// Bins with a magnitude below this are ignored (default: 10.0, raw
    /// 16-bit sample scale after windowing)
    pub noise_floor: f32,

    /// Bins below this frequency are treated as rumble (default: 50.0 Hz)
    pub fmin: f32,

    /// Bins above this frequency are ignored; `None` keeps everything up to
    /// Nyquist (default: None)
    pub fmax: Option<f32>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            frame_size: 4096,
            sample_rate: 44100,
            noise_floor: 10.0,
            fmin: 50.0,
            fmax: None,
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frame_size < 2 {
            return Err(Error::invalid(
                "frame_size",
                self.frame_size,
                "must be at least 2 samples",
            ));
        }
        if self.sample_rate == 0 {
            return Err(Error::invalid("sample_rate", self.sample_rate, "must be positive"));
        }
        if !(self.noise_floor >= 0.0 && self.noise_floor.is_finite()) {
            return Err(Error::invalid(
                "noise_floor",
                self.noise_floor,
                "must be finite and non-negative",
            ));
        }
        if !(self.fmin >= 0.0 && self.fmin.is_finite()) {
            return Err(Error::invalid("fmin", self.fmin, "must be finite and non-negative"));
        }
        if let Some(fmax) = self.fmax {
            if !(fmax > self.fmin) {
                return Err(Error::invalid("fmax", fmax, format!("must exceed fmin ({})", self.fmin)));
            }
        }
        Ok(())
    }
}

/// Online DTW alignment parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Search radius in reference frames around the current position
    /// (default: 100)
    pub radius: usize,

    /// Cost of staying on the same reference frame (default: 2.0)
    pub wait_penalty: f32,

    /// Cost of a 1:1 advance (default: 0.0)
    pub step_penalty: f32,

    /// Cost of advancing two reference frames at once (default: 0.8)
    pub skip_penalty: f32,

    /// Activity level that starts tracking (default: 1500.0, mean absolute
    /// amplitude on the 16-bit scale)
    pub start_threshold: f32,

    /// Frames before a page boundary at which the turn fires (default: 10)
    pub page_turn_offset: usize,

    /// Once every page has turned, tracking finishes when the position is
    /// within this many frames of the last reference frame (default: 4)
    pub finish_margin: usize,

    /// Reference frames at this cosine distance or further from the live
    /// vector are not reachable at all (default: 1.0, i.e. a frame needs
    /// some similarity to be considered). Values above 1.0 admit everything.
    /// Only applies when both vectors carry energy: silence and empty
    /// reference frames stay reachable at distance 1.0.
    pub max_distance: f32,

    /// Optional multiplicative decay in (0, 1] applied to the normalized
    /// cost column after each update (default: None)
    pub damping: Option<f32>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            radius: 100,
            wait_penalty: 2.0,
            step_penalty: 0.0,
            skip_penalty: 0.8,
            start_threshold: 1500.0,
            page_turn_offset: 10,
            finish_margin: 4,
            max_distance: 1.0,
            damping: None,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.radius == 0 {
            return Err(Error::invalid("radius", self.radius, "must be at least 1"));
        }
        for (name, value) in [
            ("wait_penalty", self.wait_penalty),
            ("step_penalty", self.step_penalty),
            ("skip_penalty", self.skip_penalty),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(Error::invalid(name, value, "must be finite and non-negative"));
            }
        }
        if !self.start_threshold.is_finite() {
            return Err(Error::invalid(
                "start_threshold",
                self.start_threshold,
                "must be finite",
            ));
        }
        if !(self.max_distance > 0.0) {
            return Err(Error::invalid(
                "max_distance",
                self.max_distance,
                "must be positive",
            ));
        }
        if let Some(d) = self.damping {
            if !(d > 0.0 && d <= 1.0) {
                return Err(Error::invalid("damping", d, "must lie in (0, 1]"));
            }
        }
        Ok(())
    }
}

/// How the gate signal is computed from a raw frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityMeasure {
    /// Mean absolute sample value
    #[default]
    MeanAbs,
    /// Root mean square of the samples
    Rms,
}

/// Parameters of the frame-driving session loop.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Samples between the starts of consecutive frames. `None` means
    /// back-to-back frames with no overlap (default: None)
    pub hop_length: Option<usize>,

    /// Gate signal used to start tracking (default: MeanAbs)
    pub activity: ActivityMeasure,

    /// Number of chroma vectors averaged before alignment; 1 disables
    /// smoothing (default: 1)
    pub smoothing_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            hop_length: None,
            activity: ActivityMeasure::MeanAbs,
            smoothing_window: 1,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self, frame_size: usize) -> Result<()> {
        if let Some(hop) = self.hop_length {
            if hop == 0 || hop > frame_size {
                return Err(Error::invalid(
                    "hop_length",
                    hop,
                    format!("must lie in 1..={frame_size}"),
                ));
            }
        }
        if self.smoothing_window == 0 {
            return Err(Error::invalid(
                "smoothing_window",
                self.smoothing_window,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Tempo information used to express a reference position as measure/beat.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TempoConfig {
    pub bpm: f32,
    pub beats_per_measure: u32,
    /// Samples between consecutive reference frames
    pub reference_hop: usize,
    /// Sample rate the reference was computed at
    pub sample_rate: u32,
}

impl TempoConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.bpm > 0.0 && self.bpm.is_finite()) {
            return Err(Error::invalid("bpm", self.bpm, "must be positive"));
        }
        if self.beats_per_measure == 0 {
            return Err(Error::invalid("beats_per_measure", 0, "must be positive"));
        }
        if self.reference_hop == 0 || self.sample_rate == 0 {
            return Err(Error::invalid(
                "reference_hop",
                self.reference_hop,
                "hop and sample rate must be positive",
            ));
        }
        Ok(())
    }
}

/// All tunables of a page-turning session, loadable from TOML.
///
/// Every section and field is optional and falls back to its default.
///
/// # Example
/// ```
/// use pageturner::config::Settings;
///
/// let settings = Settings::from_toml_str(
///     r#"
///     [tracker]
///     radius = 50
///     damping = 0.95
///     "#,
/// )
/// .unwrap();
/// assert_eq!(settings.tracker.radius, 50);
/// assert_eq!(settings.extractor.frame_size, 4096);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub extractor: ExtractorConfig,
    pub tracker: TrackerConfig,
    pub session: SessionConfig,
    pub tempo: Option<TempoConfig>,
}

impl Settings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a TOML settings file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.extractor.validate()?;
        self.tracker.validate()?;
        self.session.validate(self.extractor.frame_size)?;
        if let Some(tempo) = &self.tempo {
            tempo.validate()?;
        }
        Ok(())
    }
}
