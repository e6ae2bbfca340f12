//! Timed bursts of randomly sampled tones
//!
//! A sequence draws a fixed number of uniformly random points from a surface,
//! maps each to a frequency and hands the resolved ones to an emitter, pausing
//! for a fixed interval after every sample. Requests on one player queue up
//! behind each other and never interleave; a running sequence always plays to
//! the end.

mod gate;
mod randomize;

pub use gate::{GateGuard, InteractionGate};
pub use randomize::{randomize, RandomSettings};

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use rand::Rng;
use tokio::sync::Mutex;

use crate::mapping::{EqualTemperament, Frequency, MappingConfig, PitchResolver, SamplePoint, ToneMapper};
use crate::surface::Surface;

/// Samples per sequence
pub const DEFAULT_SAMPLE_COUNT: usize = 4;

/// Pause after each sample
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

/// One random sample and what it mapped to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceStep {
    pub point: SamplePoint,
    pub frequency: Frequency,
}

/// Outcome of a finished sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceReport {
    pub emitted: usize,
    pub skipped: usize,
}

/// Everything a sequence reads, captured when it is requested
#[derive(Clone)]
pub struct SequenceRequest {
    pub surface: Arc<dyn Surface>,
    pub config: MappingConfig,
    pub block_interaction: bool,
}

/// Draw one uniformly random point from `surface` and map it
pub fn draw_step<R, G>(surface: &dyn Surface, config: &MappingConfig, mapper: &ToneMapper<R>, rng: &mut G) -> SequenceStep
where
    R: PitchResolver,
    G: Rng,
{
    let (width, height) = (surface.width(), surface.height());
    let x = rng.gen_range(0..width.max(1));
    let y = rng.gen_range(0..height.max(1));
    let point = SamplePoint::new(x, y, surface.read_pixel(x, y));

    SequenceStep {
        point,
        frequency: mapper.map_to_frequency(&point, width, height, config),
    }
}

/// Plays sequences one at a time
pub struct SequencePlayer<R: PitchResolver = EqualTemperament> {
    mapper: Arc<ToneMapper<R>>,
    lane: Arc<Mutex<()>>,
    gate: InteractionGate,
    sample_count: usize,
    interval: Duration,
}

impl<R: PitchResolver> Clone for SequencePlayer<R> {
    fn clone(&self) -> Self {
        Self {
            mapper: Arc::clone(&self.mapper),
            lane: Arc::clone(&self.lane),
            gate: self.gate.clone(),
            sample_count: self.sample_count,
            interval: self.interval,
        }
    }
}

impl<R: PitchResolver> SequencePlayer<R> {
    pub fn new(mapper: ToneMapper<R>, sample_count: usize, interval: Duration) -> Self {
        Self {
            mapper: Arc::new(mapper),
            lane: Arc::new(Mutex::new(())),
            gate: InteractionGate::new(),
            sample_count,
            interval,
        }
    }

    /// Gate that is blocked while a blocking sequence runs
    pub fn gate(&self) -> &InteractionGate {
        &self.gate
    }

    pub fn mapper(&self) -> &ToneMapper<R> {
        &self.mapper
    }

    /// True while a sequence holds the lane
    pub fn is_playing(&self) -> bool {
        self.lane.try_lock().is_err()
    }

    /// Play one sequence, waiting for any earlier one to finish first
    ///
    /// `emit` receives every resolved frequency. When the request blocks
    /// interaction the gate stays blocked from the first sample until the
    /// wait after the last sample has elapsed.
    pub async fn play<G, F>(&self, request: SequenceRequest, rng: &mut G, mut emit: F) -> SequenceReport
    where
        G: Rng + Send,
        F: FnMut(f64) + Send,
    {
        let _lane = self.lane.lock().await;
        let _guard = request.block_interaction.then(|| self.gate.block());

        debug!(
            "sequence start: {} samples, {}ms apart, mode {}",
            self.sample_count,
            self.interval.as_millis(),
            request.config.mode.label()
        );

        let mut report = SequenceReport::default();
        for _ in 0..self.sample_count {
            let step = draw_step(request.surface.as_ref(), &request.config, &self.mapper, rng);
            match step.frequency {
                Frequency::Hz(hz) => {
                    debug!("sample ({}, {}) -> {:.1} Hz", step.point.x, step.point.y, hz);
                    emit(hz);
                    report.emitted += 1;
                }
                Frequency::Unresolved => {
                    debug!("sample ({}, {}) unresolved, skipped", step.point.x, step.point.y);
                    report.skipped += 1;
                }
            }
            tokio::time::sleep(self.interval).await;
        }

        info!("sequence done: {} emitted, {} skipped", report.emitted, report.skipped);
        report
    }
}

impl Default for SequencePlayer {
    fn default() -> Self {
        Self::new(ToneMapper::default(), DEFAULT_SAMPLE_COUNT, DEFAULT_INTERVAL)
    }
}
