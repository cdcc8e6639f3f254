//! Online dynamic time warping against a fixed reference.
//!
//! [`AlignmentTracker`] consumes one live chroma vector per update and keeps
//! a single column of accumulated alignment costs over the reference. Only a
//! window of `2 * radius + 1` reference frames around the current position
//! is recomputed per update, so the cost of an update does not depend on
//! the length of the piece.
//!
//! Each update, for every candidate `j` in the window:
//!
//! ```text
//! cost[j] = dist(live, ref[j]) + min(prev[j]   + wait_penalty,
//!                                    prev[j-1] + step_penalty,
//!                                    prev[j-2] + skip_penalty)
//! ```
//!
//! after which the window minimum is subtracted so costs stay bounded over
//! arbitrarily long sessions, and the position moves to that minimum.
//!
//! The tracker does no I/O. Page turns come back as [`PageTurn`] values in
//! the returned [`Step`]; delivering them is the caller's business.

mod cost;
mod telemetry;

pub use cost::CostColumns;
pub use telemetry::Telemetry;

use crate::config::TrackerConfig;
use crate::feature::{ChromaVector, magnitude};
use crate::score::ReferenceProfile;
use std::sync::Arc;

/// Magnitudes at or below this make a cosine distance meaningless.
const MAG_EPSILON: f32 = 1e-9;

/// Lifecycle of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the activity signal to cross the start threshold.
    Idle,
    /// Following the performance.
    Tracking,
    /// Every page has turned and the end of the score was reached.
    Done,
}

/// A crossed page boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTurn {
    /// Index into the profile's page boundaries
    pub boundary_index: usize,
    /// Reference frame of that boundary
    pub boundary: usize,
    /// Position that triggered the turn
    pub position: usize,
    /// 1-based page showing after the turn
    pub page: usize,
}

/// Outcome of one [`AlignmentTracker::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Not started; activity stayed at or below the start threshold.
    Waiting,
    /// Already finished; nothing changed.
    Finished,
    /// No reference frame in the window was reachable. The update was
    /// discarded and the position is unchanged.
    Lost { position: usize },
    /// Normal update.
    Tracked {
        position: usize,
        /// Cost added by this update (the window minimum before normalization)
        step_cost: f32,
        /// Boundaries crossed by this update, in order
        page_turns: Vec<PageTurn>,
    },
}

impl Step {
    /// Position after the update, if the tracker was active.
    pub fn position(&self) -> Option<usize> {
        match self {
            Step::Lost { position } | Step::Tracked { position, .. } => Some(*position),
            Step::Waiting | Step::Finished => None,
        }
    }

    /// Page turns emitted by the update (empty unless `Tracked`).
    pub fn page_turns(&self) -> &[PageTurn] {
        match self {
            Step::Tracked { page_turns, .. } => page_turns,
            _ => &[],
        }
    }
}

/// Online DTW score follower.
///
/// # Example
/// ```
/// use pageturner::config::TrackerConfig;
/// use pageturner::score::ReferenceProfile;
/// use pageturner::tracker::{AlignmentTracker, Phase};
/// use std::sync::Arc;
///
/// // Ten distinct one-hot frames, a page turn after frame 5
/// let frames: Vec<[f32; 12]> = (0..10)
///     .map(|i| {
///         let mut v = [0.0; 12];
///         v[i] = 1.0;
///         v
///     })
///     .collect();
/// let profile = Arc::new(ReferenceProfile::from_vectors(&frames, vec![5]).unwrap());
/// let config = TrackerConfig { page_turn_offset: 1, finish_margin: 0, ..TrackerConfig::default() };
/// let mut tracker = AlignmentTracker::new(profile, config).unwrap();
///
/// let mut turns = 0;
/// for frame in &frames {
///     turns += tracker.update(frame, 5000.0).page_turns().len();
/// }
/// assert_eq!(turns, 1);
/// assert_eq!(tracker.position(), 9);
/// assert_eq!(tracker.phase(), Phase::Done);
/// ```
#[derive(Debug, Clone)]
pub struct AlignmentTracker {
    profile: Arc<ReferenceProfile>,
    config: TrackerConfig,
    columns: CostColumns,
    position: usize,
    next_page: usize,
    phase: Phase,
    last_step_cost: Option<f32>,
}

impl AlignmentTracker {
    /// Build a tracker for a reference profile.
    ///
    /// Both cost columns are allocated here, sized to the reference.
    ///
    /// # Errors
    /// Returns `Error::InvalidParameter` if `config` is invalid.
    pub fn new(profile: Arc<ReferenceProfile>, config: TrackerConfig) -> crate::Result<Self> {
        config.validate()?;
        let columns = CostColumns::new(profile.len());
        Ok(Self {
            profile,
            config,
            columns,
            position: 0,
            next_page: 0,
            phase: Phase::Idle,
            last_step_cost: None,
        })
    }

    /// Return to `Idle` at the start of the score, without reallocating.
    pub fn reset(&mut self) {
        self.columns.reset();
        self.position = 0;
        self.next_page = 0;
        self.phase = Phase::Idle;
        self.last_step_cost = None;
    }

    pub fn profile(&self) -> &Arc<ReferenceProfile> {
        &self.profile
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Reference frame that best explains the audio so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Index of the next page boundary to cross (= turns emitted so far).
    pub fn next_page(&self) -> usize {
        self.next_page
    }

    /// Accumulated costs after the last successful update.
    pub fn active_costs(&self) -> &[Option<f32>] {
        self.columns.active()
    }

    /// Accumulated cost at the current position.
    pub fn cost_at_position(&self) -> Option<f32> {
        self.columns.active()[self.position]
    }

    /// Search window `[lo, hi]` around a position.
    pub fn window(&self, position: usize) -> (usize, usize) {
        let lo = position.saturating_sub(self.config.radius);
        let hi = position
            .saturating_add(self.config.radius)
            .min(self.profile.last_index());
        (lo, hi)
    }

    pub fn telemetry(&self) -> Telemetry {
        let last = self.profile.last_index();
        let progress = if last == 0 {
            if self.is_finished() { 1.0 } else { 0.0 }
        } else {
            (self.position as f32 / last as f32).min(1.0)
        };
        Telemetry {
            phase: self.phase,
            position: self.position,
            current_page: self.profile.page_of(self.position),
            total_pages: self.profile.num_pages(),
            pages_turned: self.next_page,
            score_len: self.profile.len(),
            progress,
            cost: self.cost_at_position(),
            step_cost: self.last_step_cost,
        }
    }

    /// Advance the alignment by one live chroma vector.
    ///
    /// # Arguments
    /// * `live` - Chroma vector of the newest audio frame
    /// * `activity` - Loudness of that frame; only consulted while `Idle`
    pub fn update(&mut self, live: &ChromaVector, activity: f32) -> Step {
        match self.phase {
            Phase::Done => return Step::Finished,
            Phase::Idle => {
                if activity > self.config.start_threshold {
                    // Columns were seeded by `new`/`reset` and untouched since.
                    self.phase = Phase::Tracking;
                } else {
                    return Step::Waiting;
                }
            }
            Phase::Tracking => {}
        }

        let (lo, hi) = self.window(self.position);
        let Some((best, step_cost)) = self.accumulate(live, lo, hi) else {
            let (_, scratch) = self.columns.split();
            scratch.clear();
            return Step::Lost {
                position: self.position,
            };
        };

        {
            let (_, scratch) = self.columns.split();
            scratch.map_finite(lo, hi, |c| c - step_cost);
            if let Some(damping) = self.config.damping {
                scratch.map_finite(lo, hi, |c| c * damping);
            }
        }
        self.columns.swap();

        self.position = best;
        self.last_step_cost = Some(step_cost);
        let page_turns = self.check_pages();

        Step::Tracked {
            position: self.position,
            step_cost,
            page_turns,
        }
    }

    /// Fill the scratch column over `[lo, hi]` and return the index and
    /// value of its minimum, or `None` if nothing in the window is reachable.
    fn accumulate(&mut self, live: &ChromaVector, lo: usize, hi: usize) -> Option<(usize, f32)> {
        let profile = &self.profile;
        let cfg = &self.config;
        let live_mag = magnitude(live);
        let (prev, scratch) = self.columns.split();

        let mut best: Option<(usize, f32)> = None;
        for j in lo..=hi {
            // Silence and empty reference frames sit at distance 1.0 and are
            // never gated, so rests are walked through like any other frame.
            let (dist, reachable) = match cosine_distance(profile, j, live, live_mag) {
                Some(dist) => (dist, dist < cfg.max_distance),
                None => (1.0, true),
            };

            let wait = prev[j].map(|c| c + cfg.wait_penalty);
            let step = j.checked_sub(1).and_then(|i| prev[i]).map(|c| c + cfg.step_penalty);
            let skip = j.checked_sub(2).and_then(|i| prev[i]).map(|c| c + cfg.skip_penalty);
            let from = [wait, step, skip].into_iter().flatten().reduce(f32::min);

            let cost = match from {
                Some(from) if reachable => Some(dist + from),
                _ => None,
            };
            scratch.set(j, cost);

            if let Some(cost) = cost {
                if best.is_none_or(|(_, b)| cost < b) {
                    best = Some((j, cost));
                }
            }
        }
        best
    }

    /// Emit a turn for every boundary the position has come within
    /// `page_turn_offset` of, then check for the end of the score.
    fn check_pages(&mut self) -> Vec<PageTurn> {
        let boundaries = self.profile.page_boundaries();
        let mut turns = Vec::new();
        while let Some(&boundary) = boundaries.get(self.next_page) {
            if self.position < boundary.saturating_sub(self.config.page_turn_offset) {
                break;
            }
            turns.push(PageTurn {
                boundary_index: self.next_page,
                boundary,
                position: self.position,
                page: self.next_page + 2,
            });
            self.next_page += 1;
        }

        if self.next_page >= boundaries.len()
            && self.position.saturating_add(self.config.finish_margin) >= self.profile.last_index()
        {
            self.phase = Phase::Done;
        }
        turns
    }
}

/// `1 - cos(live, ref[j])`, or `None` when either vector is (near) zero.
fn cosine_distance(
    profile: &ReferenceProfile,
    j: usize,
    live: &ChromaVector,
    live_mag: f32,
) -> Option<f32> {
    let ref_mag = profile.magnitude(j);
    if live_mag <= MAG_EPSILON || ref_mag <= MAG_EPSILON {
        return None;
    }
    let similarity = (profile.dot(j, live) / (live_mag * ref_mag)).min(1.0);
    Some(1.0 - similarity)
}
