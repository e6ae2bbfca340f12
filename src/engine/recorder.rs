//! Engine output to WAV
//!
//! Renders are mono 32-bit float. Time in a recording only moves when the
//! engine is run into it, so the same calls always give the same file.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use super::Engine;

/// Samples pulled from the engine per write
const CHUNK: usize = 1024;

/// Totals of a finished recording
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RecordingStats {
    pub samples: u64,
    pub seconds: f64,
    /// Largest absolute sample
    pub peak: f32,
}

/// Records an engine into a WAV file
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    stats: RecordingStats,
}

impl Recorder {
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let writer = WavWriter::create(path, spec).with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            sample_rate,
            stats: RecordingStats::default(),
        })
    }

    /// Totals so far
    pub fn stats(&self) -> RecordingStats {
        self.stats
    }

    /// Append samples as they are
    pub fn write(&mut self, samples: &[f32]) -> Result<()> {
        for &sample in samples {
            self.writer.write_sample(sample).context("failed to write sample")?;
            self.stats.peak = self.stats.peak.max(sample.abs());
        }
        self.stats.samples += samples.len() as u64;
        self.stats.seconds = self.stats.samples as f64 / self.sample_rate as f64;
        Ok(())
    }

    /// Run `engine` for `length` into the file; returns the samples written
    pub fn record(&mut self, engine: &mut Engine, length: Duration) -> Result<usize> {
        let total = (length.as_secs_f64() * self.sample_rate as f64).round() as usize;
        let mut buffer = [0.0f32; CHUNK];

        let mut written = 0;
        while written < total {
            let chunk = &mut buffer[..(total - written).min(CHUNK)];
            engine.fill_buffer(chunk);
            self.write(chunk)?;
            written += chunk.len();
        }
        Ok(written)
    }

    /// Write the header and close the file
    pub fn finish(self) -> Result<RecordingStats> {
        let stats = self.stats;
        self.writer.finalize().context("failed to finalize WAV file")?;
        Ok(stats)
    }
}
