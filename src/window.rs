/// Compute a symmetric Hann (raised cosine) window.
///
/// Unlike the periodic variant used for overlap-add resynthesis, the
/// symmetric window reaches zero at both ends, which is what a single
/// isolated analysis frame wants.
///
/// # Arguments
/// * `n` - Window length
///
/// # Returns
/// Hann window of length `n`
///
/// # Example
/// ```
/// use pageturner::window::hann_symmetric;
///
/// let w = hann_symmetric(5);
/// assert_eq!(w.len(), 5);
/// assert!(w[0].abs() < 1e-6);
/// assert!((w[2] - 1.0).abs() < 1e-6);
/// ```
pub fn hann_symmetric(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = (n - 1) as f32;
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / m).cos())
        .collect()
}

/// Multiply 16-bit PCM samples by a window into a float buffer.
///
/// Samples are kept on their integer scale (no division by 32768), so
/// thresholds downstream are expressed in raw sample units.
pub fn apply_window_i16(samples: &[i16], window: &[f32], out: &mut [f32]) {
    for ((o, &s), &w) in out.iter_mut().zip(samples).zip(window) {
        *o = s as f32 * w;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_hann_is_symmetric() {
        let w = hann_symmetric(64);
        for i in 0..32 {
            assert!((w[i] - w[63 - i]).abs() < 1e-6);
        }
        assert_eq!(w[0], 0.0);
    }

    #[test]
    fn degenerate_lengths() {
        assert!(hann_symmetric(0).is_empty());
        assert_eq!(hann_symmetric(1), vec![1.0]);
    }

    #[test]
    fn window_scales_samples() {
        let w = [0.0, 0.5, 1.0];
        let mut out = [0.0f32; 3];
        apply_window_i16(&[100, 100, -100], &w, &mut out);
        assert_eq!(out, [0.0, 50.0, -100.0]);
    }
}
