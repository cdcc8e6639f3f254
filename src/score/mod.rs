//! The reference ("score") side of the alignment.
//!
//! A [`ReferenceProfile`] is produced offline, loaded once, validated, and
//! then only ever read. Trackers hold it behind an `Arc`, so any number of
//! them can follow the same piece without copying it.

pub mod header;

use crate::convert::N_CHROMA;
use crate::feature::ChromaVector;
use crate::{Error, Result};
use ndarray::{Array2, ArrayView1};

pub use header::{parse_header, read_header, write_header};

/// Immutable reference sequence of chroma vectors with page boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceProfile {
    /// Shape (12, n_frames), one column per reference frame
    frames: Array2<f32>,
    /// Euclidean norm of every column, cached at construction
    magnitudes: Vec<f32>,
    /// Last frame of every page except the final one
    page_boundaries: Vec<usize>,
}

impl ReferenceProfile {
    /// Validate and build a profile from a (12, n_frames) chroma matrix.
    ///
    /// # Errors
    /// * `Error::ShapeMismatch` if the matrix does not have 12 rows
    /// * `Error::EmptyReference` if it has no columns
    /// * `Error::InvalidParameter` if any value is negative or non-finite
    /// * `Error::BoundaryOutOfRange` / `Error::BoundaryNotIncreasing` unless
    ///   `0 < b[0] < b[1] < ... < n_frames`
    pub fn new(frames: Array2<f32>, page_boundaries: Vec<usize>) -> Result<Self> {
        let (rows, n_frames) = frames.dim();
        if rows != N_CHROMA {
            return Err(Error::ShapeMismatch {
                expected: format!("{N_CHROMA} chroma rows"),
                got: format!("{rows} rows"),
            });
        }
        if n_frames == 0 {
            return Err(Error::EmptyReference);
        }
        if let Some(bad) = frames.iter().find(|v| !(**v >= 0.0 && v.is_finite())) {
            return Err(Error::invalid(
                "frames",
                bad,
                "chroma values must be finite and non-negative",
            ));
        }
        validate_boundaries(&page_boundaries, n_frames)?;

        let magnitudes = frames
            .columns()
            .into_iter()
            .map(|col| col.dot(&col).sqrt())
            .collect();

        Ok(Self {
            frames,
            magnitudes,
            page_boundaries,
        })
    }

    /// Build a profile from a slice of per-frame chroma vectors.
    pub fn from_vectors(frames: &[ChromaVector], page_boundaries: Vec<usize>) -> Result<Self> {
        let mut matrix = Array2::<f32>::zeros((N_CHROMA, frames.len()));
        for (j, v) in frames.iter().enumerate() {
            for (k, &x) in v.iter().enumerate() {
                matrix[(k, j)] = x;
            }
        }
        Self::new(matrix, page_boundaries)
    }

    /// Number of reference frames (always at least 1).
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Index of the last reference frame.
    pub fn last_index(&self) -> usize {
        self.len() - 1
    }

    /// The (12, n_frames) chroma matrix.
    pub fn frames(&self) -> &Array2<f32> {
        &self.frames
    }

    /// Chroma column of reference frame `j`.
    ///
    /// # Panics
    /// If `j >= len()`.
    pub fn frame(&self, j: usize) -> ArrayView1<'_, f32> {
        self.frames.column(j)
    }

    /// Copy of reference frame `j` as a chroma vector.
    pub fn frame_vector(&self, j: usize) -> ChromaVector {
        let mut v = [0.0; N_CHROMA];
        for (o, &x) in v.iter_mut().zip(self.frames.column(j).iter()) {
            *o = x;
        }
        v
    }

    /// Cached norm of reference frame `j`.
    pub fn magnitude(&self, j: usize) -> f32 {
        self.magnitudes[j]
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Dot product of a live vector with reference frame `j`.
    pub fn dot(&self, j: usize, live: &ChromaVector) -> f32 {
        self.frames
            .column(j)
            .iter()
            .zip(live)
            .map(|(a, b)| a * b)
            .sum()
    }

    pub fn page_boundaries(&self) -> &[usize] {
        &self.page_boundaries
    }

    /// Number of pages (one more than the number of boundaries).
    pub fn num_pages(&self) -> usize {
        self.page_boundaries.len() + 1
    }

    /// 1-based page a reference position lies on.
    ///
    /// # Example
    /// ```
    /// use pageturner::score::ReferenceProfile;
    ///
    /// let frames = vec![[1.0; 12]; 10];
    /// let profile = ReferenceProfile::from_vectors(&frames, vec![3, 6]).unwrap();
    /// assert_eq!(profile.page_of(0), 1);
    /// assert_eq!(profile.page_of(3), 1);
    /// assert_eq!(profile.page_of(4), 2);
    /// assert_eq!(profile.page_of(9), 3);
    /// ```
    pub fn page_of(&self, position: usize) -> usize {
        self.page_boundaries
            .iter()
            .position(|&b| position <= b)
            .map_or(self.num_pages(), |i| i + 1)
    }
}

/// Check `0 < b[0] < b[1] < ... < len`.
pub fn validate_boundaries(boundaries: &[usize], len: usize) -> Result<()> {
    let mut previous: Option<usize> = None;
    for (index, &boundary) in boundaries.iter().enumerate() {
        if boundary == 0 || boundary >= len {
            return Err(Error::BoundaryOutOfRange {
                index,
                boundary,
                len,
            });
        }
        if let Some(previous) = previous {
            if boundary <= previous {
                return Err(Error::BoundaryNotIncreasing {
                    index,
                    previous,
                    boundary,
                });
            }
        }
        previous = Some(boundary);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(n: usize) -> Vec<ChromaVector> {
        vec![[0.5; N_CHROMA]; n]
    }

    #[test]
    fn caches_magnitudes() {
        let mut frames = flat(3);
        frames[1] = [0.0; N_CHROMA];
        frames[2][0] = 3.0;
        frames[2][1] = 4.0;
        frames[2][2..].fill(0.0);
        let p = ReferenceProfile::from_vectors(&frames, vec![]).unwrap();
        assert!((p.magnitude(0) - 0.5 * 12f32.sqrt()).abs() < 1e-6);
        assert_eq!(p.magnitude(1), 0.0);
        assert!((p.magnitude(2) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_empty() {
        let err = ReferenceProfile::from_vectors(&[], vec![]).unwrap_err();
        assert!(matches!(err, Error::EmptyReference));
    }

    #[test]
    fn rejects_wrong_row_count() {
        let err = ReferenceProfile::new(Array2::zeros((11, 4)), vec![]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn rejects_bad_boundaries() {
        assert!(matches!(
            ReferenceProfile::from_vectors(&flat(10), vec![10]),
            Err(Error::BoundaryOutOfRange { boundary: 10, .. })
        ));
        assert!(matches!(
            ReferenceProfile::from_vectors(&flat(10), vec![0]),
            Err(Error::BoundaryOutOfRange { boundary: 0, .. })
        ));
        assert!(matches!(
            ReferenceProfile::from_vectors(&flat(10), vec![4, 4]),
            Err(Error::BoundaryNotIncreasing { index: 1, .. })
        ));
        assert!(ReferenceProfile::from_vectors(&flat(10), vec![2, 5, 9]).is_ok());
    }

    #[test]
    fn rejects_negative_values() {
        let mut frames = flat(2);
        frames[1][4] = -0.1;
        assert!(ReferenceProfile::from_vectors(&frames, vec![]).is_err());
    }

    #[test]
    fn frame_round_trips() {
        let mut frames = flat(2);
        frames[1][7] = 0.9;
        let p = ReferenceProfile::from_vectors(&frames, vec![1]).unwrap();
        assert_eq!(p.frame_vector(1), frames[1]);
        assert_eq!(p.frame(1)[7], 0.9);
        assert_eq!(p.num_pages(), 2);
        assert_eq!(p.last_index(), 1);
    }
}
