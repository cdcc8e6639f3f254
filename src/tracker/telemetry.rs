use super::Phase;
use crate::config::TempoConfig;
use crate::convert::{frame_to_time, time_to_measure_beat};

/// Read-only snapshot of a tracker, for logging and progress displays.
///
/// Nothing in here feeds back into the alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub phase: Phase,
    /// Best-matching reference frame
    pub position: usize,
    /// 1-based page the position lies on
    pub current_page: usize,
    pub total_pages: usize,
    /// Page turns emitted so far
    pub pages_turned: usize,
    /// Reference frames in the score
    pub score_len: usize,
    /// Position as a fraction of the score, in [0, 1]
    pub progress: f32,
    /// Accumulated (normalized) cost at the position
    pub cost: Option<f32>,
    /// Cost added by the last successful update, before normalization
    pub step_cost: Option<f32>,
}

impl Telemetry {
    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Position expressed as 1-based `(measure, beat)`.
    pub fn measure_beat(&self, tempo: &TempoConfig) -> (u32, u32) {
        let seconds = frame_to_time(self.position, tempo.sample_rate, tempo.reference_hop);
        time_to_measure_beat(seconds, tempo.bpm, tempo.beats_per_measure)
    }
}

impl std::fmt::Display for Telemetry {
    /// `[=====>    ] pos 412/800 page 2/3 cost 0.37`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const BAR: usize = 20;
        let filled = ((self.progress * BAR as f32) as usize).min(BAR);
        write!(f, "[")?;
        for i in 0..BAR {
            let c = match i.cmp(&filled) {
                std::cmp::Ordering::Less => '=',
                std::cmp::Ordering::Equal => '>',
                std::cmp::Ordering::Greater => ' ',
            };
            write!(f, "{c}")?;
        }
        write!(
            f,
            "] pos {}/{} page {}/{}",
            self.position, self.score_len, self.current_page, self.total_pages
        )?;
        match self.cost {
            Some(cost) => write!(f, " cost {cost:.2}"),
            None => write!(f, " cost --"),
        }
    }
}
