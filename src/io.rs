//! WAV input for offline runs and test signals.
//!
//! The tracker consumes mono 16-bit PCM. [`WavFrames`] streams any WAV file
//! hound can read (integer PCM of any width, or 32-bit float) as mono `i16`
//! blocks, averaging channels and rescaling to the 16-bit range.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Streaming reader yielding mono `i16` blocks from a WAV source.
///
/// Every block holds `block_size` samples except possibly the last.
///
/// # Example
/// ```no_run
/// use pageturner::io::WavFrames;
///
/// let frames = WavFrames::open("performance.wav", 4096).unwrap();
/// println!("{} Hz", frames.spec().sample_rate);
/// for block in frames {
///     let block = block.unwrap();
///     // feed the block to a session
///     # let _ = block;
/// }
/// ```
pub struct WavFrames<R: Read> {
    reader: WavReader<R>,
    block_size: usize,
    channels: usize,
    sample_format: SampleFormat,
    bits_per_sample: u16,
    interleaved: Vec<i32>,
    finished: bool,
}

impl WavFrames<BufReader<File>> {
    /// Open a WAV file for streaming.
    ///
    /// # Errors
    /// Returns `Error::Wav` if the file is missing or not a WAV file, and
    /// `Error::InvalidParameter` for a zero block size.
    pub fn open<P: AsRef<Path>>(path: P, block_size: usize) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("opening {} for streaming", path.display());
        Self::from_reader(WavReader::open(path)?, block_size)
    }
}

impl<R: Read> WavFrames<R> {
    /// Stream from any reader producing WAV bytes.
    pub fn new(source: R, block_size: usize) -> Result<Self> {
        Self::from_reader(WavReader::new(source)?, block_size)
    }

    fn from_reader(reader: WavReader<R>, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::invalid("block_size", block_size, "must be positive"));
        }
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(Error::invalid("channels", spec.channels, "must be positive"));
        }
        log::debug!(
            "wav: {} Hz, {} channel(s), {} bit {:?}",
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample,
            spec.sample_format
        );
        Ok(Self {
            block_size,
            channels: spec.channels as usize,
            sample_format: spec.sample_format,
            bits_per_sample: spec.bits_per_sample,
            interleaved: Vec::with_capacity(block_size * spec.channels as usize),
            finished: false,
            reader,
        })
    }

    pub fn spec(&self) -> AudioSpec {
        let spec = self.reader.spec();
        AudioSpec {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        }
    }

    /// Read up to one block of interleaved samples, already on the 16-bit
    /// scale.
    fn fill(&mut self) -> Result<()> {
        self.interleaved.clear();
        let wanted = self.block_size * self.channels;
        match self.sample_format {
            SampleFormat::Float => {
                for s in self.reader.samples::<f32>().take(wanted) {
                    self.interleaved.push(float_to_i16(s?) as i32);
                }
            }
            SampleFormat::Int => {
                let bits = self.bits_per_sample;
                for s in self.reader.samples::<i32>().take(wanted) {
                    self.interleaved.push(rescale_int(s?, bits));
                }
            }
        }
        Ok(())
    }
}

impl<R: Read> Iterator for WavFrames<R> {
    type Item = Result<Vec<i16>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Err(e) = self.fill() {
            self.finished = true;
            return Some(Err(e));
        }

        let frames = self.interleaved.len() / self.channels;
        if frames < self.block_size {
            self.finished = true;
        }
        if frames == 0 {
            return None;
        }

        let block = self
            .interleaved
            .chunks_exact(self.channels)
            .map(|frame| (frame.iter().sum::<i32>() / self.channels as i32) as i16)
            .collect();
        Some(Ok(block))
    }
}

fn float_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

fn rescale_int(sample: i32, bits: u16) -> i32 {
    match bits {
        0..=15 => sample << (16 - bits),
        16 => sample,
        _ => sample >> (bits.min(32) - 16),
    }
}

/// Read a whole WAV file as mono `i16` samples.
pub fn load_mono_i16<P: AsRef<Path>>(path: P) -> Result<(Vec<i16>, AudioSpec)> {
    let frames = WavFrames::open(path, 1 << 16)?;
    let spec = frames.spec();
    let mut samples = Vec::new();
    for block in frames {
        samples.extend(block?);
    }
    Ok((samples, spec))
}

/// Write mono 16-bit PCM.
pub fn save_mono_i16<P: AsRef<Path>>(path: P, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Generate a pure tone on the 16-bit scale.
///
/// `amplitude` is a fraction of full scale and is clamped to [0, 1].
pub fn tone_i16(frequency: f32, sr: u32, n_samples: usize, amplitude: f32) -> Vec<i16> {
    let peak = amplitude.clamp(0.0, 1.0) * i16::MAX as f32;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sr as f32;
    (0..n_samples)
        .map(|i| (peak * (angular_freq * i as f32).sin()).round() as i16)
        .collect()
}
