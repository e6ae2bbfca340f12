//! Offline sequence rendering
//!
//! Plays sequences into a WAV file instead of the sound card. The samples are
//! drawn the same way live sequences draw them, but time advances by writing
//! audio rather than by sleeping, so a seeded render is reproducible.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::PixtoneConfig;
use crate::engine::{Engine, Recorder};
use crate::mapping::ToneMapper;
use crate::sequence::draw_step;
use crate::surface::Surface;

/// Silence kept after the last sequence so notes and reverb can ring out
pub const DEFAULT_TAIL: Duration = Duration::from_millis(1500);

/// Options for a render
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Number of sequences, played back to back
    pub count: usize,
    pub seed: u64,
    pub tail: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            count: 1,
            seed: 0,
            tail: DEFAULT_TAIL,
        }
    }
}

/// What a render produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderReport {
    pub notes: usize,
    pub skipped: usize,
    /// Frequencies in the order they were played
    pub frequencies: Vec<f64>,
    pub samples: u64,
    pub seconds: f64,
    pub peak: f32,
}

/// Seed of a render: the requested one, else the configured pattern seed, else 0
pub fn render_seed(requested: Option<u64>, config: &PixtoneConfig) -> u64 {
    requested.or(config.surface.seed).unwrap_or(0)
}

/// Render `options.count` sequences over `surface` into the WAV at `output`
pub fn render_to_wav(
    config: &PixtoneConfig,
    surface: &dyn Surface,
    output: &Path,
    options: &RenderOptions,
) -> Result<RenderReport> {
    let sample_rate = config.audio.sample_rate;
    let mapping = config.mapping_config()?;
    let mapper = ToneMapper::with_tuning(config.mapping.tuning_hz);
    let interval = Duration::from_millis(config.sequence.interval_ms);

    let mut engine = Engine::new(sample_rate as f64, &config.sound);
    let mut recorder = Recorder::create(output, sample_rate)?;
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut report = RenderReport::default();

    for _ in 0..options.count {
        for _ in 0..config.sequence.sample_count {
            let step = draw_step(surface, &mapping, &mapper, &mut rng);
            match step.frequency.hz() {
                Some(hz) => {
                    engine.trigger_note(hz);
                    report.notes += 1;
                    report.frequencies.push(hz);
                }
                None => report.skipped += 1,
            }
            recorder.record(&mut engine, interval)?;
        }
    }
    recorder.record(&mut engine, options.tail)?;

    let stats = recorder.finish()?;
    report.samples = stats.samples;
    report.seconds = stats.seconds;
    report.peak = stats.peak;

    info!(
        "rendered {} notes ({} skipped), {:.2}s to {:?}",
        report.notes, report.skipped, report.seconds, output
    );
    Ok(report)
}
