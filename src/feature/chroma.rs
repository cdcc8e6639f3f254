use crate::config::ExtractorConfig;
use crate::convert::{N_CHROMA, bin_to_hz, hz_to_pitch_class};
use crate::fft::RealFftPlan;
use crate::window;

/// Energy per pitch class, C first.
pub type ChromaVector = [f32; N_CHROMA];

/// Maxima at or below this are treated as "no measurable signal".
pub const NORM_EPSILON: f32 = 1e-3;

/// Euclidean norm of a feature vector.
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale a chroma vector so that its largest element is exactly 1.0.
///
/// Vectors whose maximum does not exceed [`NORM_EPSILON`] are left as they
/// are, so silence stays a zero vector instead of amplified noise.
pub fn normalize_max(chroma: &mut ChromaVector) {
    let max = chroma.iter().copied().fold(0.0f32, f32::max);
    if max > NORM_EPSILON {
        for c in chroma.iter_mut() {
            *c /= max;
        }
    }
}

/// Fold a magnitude spectrum onto the 12 pitch classes.
///
/// # Arguments
/// * `magnitudes` - Magnitude per FFT bin
/// * `bin_classes` - Pitch class per bin, `None` for bins to skip
/// * `noise_floor` - Bins with a magnitude below this are skipped
///
/// # Returns
/// Un-normalized chroma vector
pub fn fold_spectrum(magnitudes: &[f32], bin_classes: &[Option<u8>], noise_floor: f32) -> ChromaVector {
    let mut chroma = [0.0f32; N_CHROMA];
    for (&mag, class) in magnitudes.iter().zip(bin_classes) {
        let Some(class) = class else { continue };
        if mag < noise_floor || !mag.is_finite() {
            continue;
        }
        chroma[*class as usize] += mag;
    }
    chroma
}

/// Converts fixed-length 16-bit audio frames into max-normalized chroma
/// vectors.
///
/// The Hann window, the FFT plan and the bin→pitch-class table are built
/// once; [`extract`](Self::extract) then only windows, transforms and sums.
///
/// # Example
/// ```
/// use pageturner::config::ExtractorConfig;
/// use pageturner::feature::ChromaExtractor;
///
/// let cfg = ExtractorConfig { frame_size: 2048, ..ExtractorConfig::default() };
/// let mut extractor = ChromaExtractor::new(cfg).unwrap();
///
/// // 440 Hz at a healthy level
/// let frame: Vec<i16> = (0..2048)
///     .map(|i| (8000.0 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin()) as i16)
///     .collect();
/// let chroma = extractor.extract(&frame);
/// assert_eq!(chroma[9], 1.0); // A
/// ```
pub struct ChromaExtractor {
    config: ExtractorConfig,
    window: Vec<f32>,
    plan: RealFftPlan,
    bin_classes: Vec<Option<u8>>,
    windowed: Vec<f32>,
    spectrum: Vec<f32>,
}

impl ChromaExtractor {
    /// Build an extractor for the given frame size and sample rate.
    ///
    /// # Errors
    /// Returns `Error::InvalidParameter` if the configuration is invalid.
    pub fn new(config: ExtractorConfig) -> crate::Result<Self> {
        config.validate()?;
        let n = config.frame_size;
        let plan = RealFftPlan::new(n);
        let bin_classes = pitch_class_table(&config);
        Ok(Self {
            window: window::hann_symmetric(n),
            windowed: vec![0.0; n],
            spectrum: vec![0.0; bin_classes.len()],
            plan,
            bin_classes,
            config,
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Samples expected per frame.
    pub fn frame_size(&self) -> usize {
        self.config.frame_size
    }

    /// Compute the chroma vector of one frame.
    ///
    /// Never fails: a silent frame, a frame whose energy sits entirely
    /// under the noise floor, or a frame of the wrong length all yield the
    /// zero vector.
    pub fn extract(&mut self, frame: &[i16]) -> ChromaVector {
        if frame.len() != self.config.frame_size {
            return [0.0; N_CHROMA];
        }
        window::apply_window_i16(frame, &self.window, &mut self.windowed);
        self.plan.magnitudes(&self.windowed, &mut self.spectrum);
        let mut chroma = fold_spectrum(&self.spectrum, &self.bin_classes, self.config.noise_floor);
        normalize_max(&mut chroma);
        chroma
    }
}

/// Pitch class for each of the `frame_size / 2` usable bins.
///
/// DC, bins under `fmin` and bins above `fmax` map to `None`.
fn pitch_class_table(config: &ExtractorConfig) -> Vec<Option<u8>> {
    let n_bins = config.frame_size / 2;
    let fmax = config.fmax.unwrap_or(f32::INFINITY);
    (0..n_bins)
        .map(|bin| {
            let freq = bin_to_hz(bin, config.sample_rate, config.frame_size);
            if bin == 0 || freq < config.fmin || freq > fmax {
                return None;
            }
            hz_to_pitch_class(freq).map(|c| c as u8)
        })
        .collect()
}
