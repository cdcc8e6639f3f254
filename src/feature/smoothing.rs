use super::chroma::ChromaVector;
use crate::convert::N_CHROMA;
use std::collections::VecDeque;

/// Moving average over the most recent chroma vectors.
///
/// Keeps a running sum so each push is O(12) regardless of the window
/// length. A window of 1 passes vectors through unchanged.
#[derive(Debug, Clone)]
pub struct ChromaSmoother {
    history: VecDeque<ChromaVector>,
    sum: [f64; N_CHROMA],
    window: usize,
}

impl ChromaSmoother {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            history: VecDeque::with_capacity(window),
            sum: [0.0; N_CHROMA],
            window,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Add a vector and return the mean of the retained history.
    pub fn push(&mut self, chroma: ChromaVector) -> ChromaVector {
        if self.window == 1 {
            return chroma;
        }
        if self.history.len() == self.window {
            if let Some(old) = self.history.pop_front() {
                for (s, v) in self.sum.iter_mut().zip(old) {
                    *s -= v as f64;
                }
            }
        }
        for (s, v) in self.sum.iter_mut().zip(chroma) {
            *s += v as f64;
        }
        self.history.push_back(chroma);

        let n = self.history.len() as f64;
        let mut mean = [0.0f32; N_CHROMA];
        for (m, s) in mean.iter_mut().zip(self.sum) {
            *m = (s / n).max(0.0) as f32;
        }
        mean
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.sum = [0.0; N_CHROMA];
    }
}
