//! Scalar loudness measures used to gate the start of tracking.
//!
//! Both work on raw 16-bit samples and report on that scale, so a start
//! threshold of 1500 means "average deflection of 1500 LSB".

/// Mean absolute sample value of a frame.
///
/// # Example
/// ```
/// use pageturner::feature::mean_abs;
///
/// assert_eq!(mean_abs(&[100, -300, 0, 200]), 150.0);
/// assert_eq!(mean_abs(&[]), 0.0);
/// ```
pub fn mean_abs(frame: &[i16]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: i64 = frame.iter().map(|&s| (s as i64).abs()).sum();
    sum as f32 / frame.len() as f32
}

/// Root-mean-square value of a frame.
pub fn rms(frame: &[i16]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for &s in frame {
        let v = s as f64;
        sum += v * v;
    }
    (sum / frame.len() as f64).sqrt() as f32
}
