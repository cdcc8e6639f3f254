use num_complex::Complex32;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Cached real-to-complex FFT plan with preallocated buffers.
///
/// Planning and allocation happen once in [`RealFftPlan::new`]; every call
/// to [`RealFftPlan::magnitudes`] then runs without touching the heap, which
/// keeps the per-frame cost to the transform itself.
///
/// # Example
/// ```
/// use pageturner::fft::RealFftPlan;
///
/// let mut plan = RealFftPlan::new(512);
/// let signal = vec![1.0f32; 512];
/// let mut mags = vec![0.0f32; plan.n_bins()];
/// plan.magnitudes(&signal, &mut mags);
/// assert!((mags[0] - 512.0).abs() < 1e-3); // DC bin
/// ```
pub struct RealFftPlan {
    r2c: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    spectrum: Vec<Complex32>,
    scratch: Vec<Complex32>,
    len: usize,
}

impl RealFftPlan {
    /// Create a new plan for real input of length `len`.
    ///
    /// # Arguments
    /// * `len` - Size of the FFT (powers of two are fastest)
    pub fn new(len: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let r2c = planner.plan_fft_forward(len);
        let input = r2c.make_input_vec();
        let spectrum = r2c.make_output_vec();
        let scratch = r2c.make_scratch_vec();
        Self {
            r2c,
            input,
            spectrum,
            scratch,
            len,
        }
    }

    /// Input length this plan was built for.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of non-redundant output bins (`len / 2 + 1`).
    pub fn n_bins(&self) -> usize {
        self.spectrum.len()
    }

    /// Compute the magnitude spectrum of `input` into `out`.
    ///
    /// `input` is copied into the plan's own buffer, so the caller's slice is
    /// left untouched. Only `min(out.len(), n_bins())` bins are written. An
    /// input of the wrong length yields an all-zero spectrum.
    pub fn magnitudes(&mut self, input: &[f32], out: &mut [f32]) {
        if input.len() != self.len || self.len == 0 {
            out.fill(0.0);
            return;
        }
        self.input.copy_from_slice(input);
        if self
            .r2c
            .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)
            .is_err()
        {
            out.fill(0.0);
            return;
        }
        for (o, c) in out.iter_mut().zip(&self.spectrum) {
            *o = c.norm();
        }
    }
}
