//! Session driver: PCM blocks in, page turns out.
//!
//! The audio source hands over blocks of whatever size it produces.
//! [`FrameAssembler`] cuts them into analysis frames, and [`PageTurner`]
//! runs each frame through chroma extraction and the alignment tracker
//! synchronously. Page turns are handed to a [`PageTurnSink`] chosen by the
//! caller (a serial port, a keyboard emulator, a test vector).
//!
//! Everything runs on the caller's thread. Processing one frame must finish
//! within one frame period or the audio source will drop samples; the cost
//! per frame is one FFT plus one tracker window, independent of the length
//! of the score.

use crate::config::{ActivityMeasure, Settings, TempoConfig};
use crate::feature::{ChromaExtractor, ChromaSmoother, ChromaVector, mean_abs, rms};
use crate::score::ReferenceProfile;
use crate::tracker::{AlignmentTracker, PageTurn, Phase, Step, Telemetry};
use crate::{Error, Result};
use std::io::Write;
use std::sync::Arc;

/// Receives page-turn events from a session.
pub trait PageTurnSink {
    fn turn_page(&mut self, turn: &PageTurn) -> Result<()>;
}

impl PageTurnSink for Vec<PageTurn> {
    fn turn_page(&mut self, turn: &PageTurn) -> Result<()> {
        self.push(*turn);
        Ok(())
    }
}

/// Writes one byte per page turn to a serial-like channel and flushes.
///
/// The receiving end (a keyboard-emulating radio, typically) maps the byte
/// to a "next page" key press.
#[derive(Debug)]
pub struct SerialSink<W: Write> {
    writer: W,
    byte: u8,
}

impl<W: Write> SerialSink<W> {
    /// Sink sending `b'n'` for every turn.
    pub fn new(writer: W) -> Self {
        Self::with_byte(writer, b'n')
    }

    pub fn with_byte(writer: W, byte: u8) -> Self {
        Self { writer, byte }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PageTurnSink for SerialSink<W> {
    fn turn_page(&mut self, _turn: &PageTurn) -> Result<()> {
        self.writer.write_all(&[self.byte])?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Accumulates arbitrary-size sample blocks into fixed-size frames.
///
/// With `hop == frame_size` frames are back to back; a smaller hop yields
/// overlapping frames (a sliding buffer advanced by `hop` samples).
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    buffer: Vec<i16>,
    frame_size: usize,
    hop: usize,
}

impl FrameAssembler {
    /// # Errors
    /// Returns `Error::InvalidParameter` unless `0 < hop <= frame_size`.
    pub fn new(frame_size: usize, hop: usize) -> Result<Self> {
        if frame_size == 0 {
            return Err(Error::invalid("frame_size", frame_size, "must be positive"));
        }
        if hop == 0 || hop > frame_size {
            return Err(Error::invalid(
                "hop_length",
                hop,
                format!("must lie in 1..={frame_size}"),
            ));
        }
        Ok(Self {
            buffer: Vec::with_capacity(frame_size * 2),
            frame_size,
            hop,
        })
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Samples waiting for the next frame to complete.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Append samples and call `on_frame` for every frame that completes.
    ///
    /// Stops at the first error returned by `on_frame`; samples already
    /// appended stay buffered.
    pub fn push<E>(
        &mut self,
        samples: &[i16],
        mut on_frame: impl FnMut(&[i16]) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        self.buffer.extend_from_slice(samples);
        while self.buffer.len() >= self.frame_size {
            let result = on_frame(&self.buffer[..self.frame_size]);
            self.buffer.drain(..self.hop);
            result?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// What happened while processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub step: Step,
    /// Gate signal of the frame
    pub activity: f32,
    /// Chroma vector that was fed to the tracker (after smoothing)
    pub chroma: ChromaVector,
    pub telemetry: Telemetry,
    /// 1-based `(measure, beat)` of the position, when a tempo is configured
    pub measure_beat: Option<(u32, u32)>,
}

impl FrameReport {
    pub fn page_turns(&self) -> &[PageTurn] {
        self.step.page_turns()
    }
}

/// Per-frame work: activity, chroma, smoothing, alignment.
struct FrameProcessor {
    extractor: ChromaExtractor,
    smoother: ChromaSmoother,
    tracker: AlignmentTracker,
    activity: ActivityMeasure,
    tempo: Option<TempoConfig>,
}

impl FrameProcessor {
    fn process(&mut self, frame: &[i16]) -> Result<FrameReport> {
        let expected = self.extractor.frame_size();
        if frame.len() != expected {
            return Err(Error::ShapeMismatch {
                expected: format!("{expected} samples"),
                got: format!("{} samples", frame.len()),
            });
        }

        let activity = match self.activity {
            ActivityMeasure::MeanAbs => mean_abs(frame),
            ActivityMeasure::Rms => rms(frame),
        };
        let phase_before = self.tracker.phase();

        // Nothing to align while idle or done, so skip the FFT.
        let chroma = match phase_before {
            Phase::Done => [0.0; 12],
            Phase::Idle if activity <= self.tracker.config().start_threshold => [0.0; 12],
            _ => {
                let raw = self.extractor.extract(frame);
                self.smoother.push(raw)
            }
        };

        let step = self.tracker.update(&chroma, activity);
        let telemetry = self.tracker.telemetry();

        if phase_before == Phase::Idle && telemetry.is_running() {
            log::info!("tracking started (activity {activity:.1})");
        }
        match &step {
            Step::Lost { position } => {
                log::debug!("alignment lost around frame {position}; update discarded");
            }
            Step::Tracked { page_turns, .. } => {
                for turn in page_turns {
                    log::info!(
                        "page turn to page {}/{} at frame {} (boundary {})",
                        turn.page,
                        telemetry.total_pages,
                        turn.position,
                        turn.boundary
                    );
                }
            }
            Step::Waiting | Step::Finished => {}
        }
        if phase_before != Phase::Done && telemetry.is_finished() {
            log::info!("end of score reached at frame {}", telemetry.position);
        }
        if telemetry.is_running() {
            log::trace!("{telemetry}");
        }

        let measure_beat = self.tempo.as_ref().map(|t| telemetry.measure_beat(t));
        Ok(FrameReport {
            step,
            activity,
            chroma,
            telemetry,
            measure_beat,
        })
    }
}

/// A complete score-following session over one reference profile.
///
/// # Example
/// ```
/// use pageturner::config::Settings;
/// use pageturner::pipeline::PageTurner;
/// use pageturner::score::ReferenceProfile;
/// use std::sync::Arc;
///
/// let frames = vec![[1.0; 12]; 20];
/// let profile = Arc::new(ReferenceProfile::from_vectors(&frames, vec![10]).unwrap());
/// let mut turner = PageTurner::new(profile, &Settings::default()).unwrap();
///
/// // Silence never starts tracking
/// let silence = vec![0i16; 4096];
/// let report = turner.process_frame(&silence).unwrap();
/// assert!(!report.telemetry.is_running());
/// ```
pub struct PageTurner {
    assembler: FrameAssembler,
    processor: FrameProcessor,
}

impl PageTurner {
    /// Build a session from validated settings.
    ///
    /// # Errors
    /// Returns `Error::InvalidParameter` if the settings are invalid.
    pub fn new(profile: Arc<ReferenceProfile>, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let frame_size = settings.extractor.frame_size;
        let hop = settings.session.hop_length.unwrap_or(frame_size);
        Ok(Self {
            assembler: FrameAssembler::new(frame_size, hop)?,
            processor: FrameProcessor {
                extractor: ChromaExtractor::new(settings.extractor.clone())?,
                smoother: ChromaSmoother::new(settings.session.smoothing_window),
                tracker: AlignmentTracker::new(profile, settings.tracker.clone())?,
                activity: settings.session.activity,
                tempo: settings.tempo.clone(),
            },
        })
    }

    pub fn tracker(&self) -> &AlignmentTracker {
        &self.processor.tracker
    }

    pub fn telemetry(&self) -> Telemetry {
        self.processor.tracker.telemetry()
    }

    pub fn is_finished(&self) -> bool {
        self.processor.tracker.is_finished()
    }

    /// Samples per analysis frame.
    pub fn frame_size(&self) -> usize {
        self.assembler.frame_size()
    }

    /// Process exactly one analysis frame.
    ///
    /// # Errors
    /// Returns `Error::ShapeMismatch` if `frame` is not `frame_size()` long.
    pub fn process_frame(&mut self, frame: &[i16]) -> Result<FrameReport> {
        self.processor.process(frame)
    }

    /// Feed a block of samples of any size; `on_frame` sees the report of
    /// every frame the block completes.
    pub fn push_samples(
        &mut self,
        samples: &[i16],
        mut on_frame: impl FnMut(FrameReport) -> Result<()>,
    ) -> Result<()> {
        let Self {
            assembler,
            processor,
        } = self;
        assembler.push(samples, |frame| on_frame(processor.process(frame)?))
    }

    /// Feed a block of samples and deliver any page turns to `sink`.
    ///
    /// Returns the number of turns delivered.
    pub fn push_and_dispatch<S: PageTurnSink + ?Sized>(
        &mut self,
        samples: &[i16],
        sink: &mut S,
    ) -> Result<usize> {
        let mut delivered = 0;
        self.push_samples(samples, |report| {
            for turn in report.page_turns() {
                sink.turn_page(turn)?;
                delivered += 1;
            }
            Ok(())
        })?;
        Ok(delivered)
    }

    /// Stop tracking: back to `Idle` at the start of the score, with the
    /// sample buffer and smoothing history emptied.
    pub fn reset(&mut self) {
        self.processor.tracker.reset();
        self.processor.smoother.clear();
        self.assembler.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembler_back_to_back() {
        let mut a = FrameAssembler::new(4, 4).unwrap();
        let mut frames = Vec::new();
        a.push(&[1, 2, 3], |f| {
            frames.push(f.to_vec());
            Ok::<_, ()>(())
        })
        .unwrap();
        assert!(frames.is_empty());
        a.push(&[4, 5, 6, 7, 8, 9], |f| {
            frames.push(f.to_vec());
            Ok::<_, ()>(())
        })
        .unwrap();
        assert_eq!(frames, vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]]);
        assert_eq!(a.pending(), 1);
    }

    #[test]
    fn assembler_overlapping() {
        let mut a = FrameAssembler::new(4, 2).unwrap();
        let mut frames = Vec::new();
        a.push(&[1, 2, 3, 4, 5, 6, 7], |f| {
            frames.push(f.to_vec());
            Ok::<_, ()>(())
        })
        .unwrap();
        assert_eq!(frames, vec![vec![1, 2, 3, 4], vec![3, 4, 5, 6]]);
        assert_eq!(a.pending(), 3);
    }

    #[test]
    fn assembler_rejects_bad_hop() {
        assert!(FrameAssembler::new(4, 0).is_err());
        assert!(FrameAssembler::new(4, 5).is_err());
    }

    #[test]
    fn serial_sink_writes_one_byte_per_turn() {
        let turn = PageTurn {
            boundary_index: 0,
            boundary: 10,
            position: 8,
            page: 2,
        };
        let mut sink = SerialSink::new(Vec::new());
        sink.turn_page(&turn).unwrap();
        sink.turn_page(&turn).unwrap();
        assert_eq!(sink.into_inner(), b"nn");

        let mut sink = SerialSink::with_byte(Vec::new(), b'>');
        sink.turn_page(&turn).unwrap();
        assert_eq!(sink.into_inner(), b">");
    }
}
