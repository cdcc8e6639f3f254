/// Get FFT bin frequencies.
///
/// # Arguments
/// * `sr` - Sample rate in Hz
/// * `n_fft` - FFT size
///
/// # Returns
/// Vector of frequency values (Hz) for each FFT bin
///
/// # Example
/// ```
/// use pageturner::convert::fft_frequencies;
///
/// let freqs = fft_frequencies(44100, 4096);
/// assert_eq!(freqs.len(), 2049); // n_fft/2 + 1
/// assert_eq!(freqs[0], 0.0);
/// ```
pub fn fft_frequencies(sr: u32, n_fft: usize) -> Vec<f32> {
    let n_bins = n_fft / 2 + 1;
    (0..n_bins).map(|i| bin_to_hz(i, sr, n_fft)).collect()
}

/// Center frequency (Hz) of a single FFT bin.
pub fn bin_to_hz(bin: usize, sr: u32, n_fft: usize) -> f32 {
    if n_fft == 0 {
        return 0.0;
    }
    bin as f32 * sr as f32 / n_fft as f32
}
