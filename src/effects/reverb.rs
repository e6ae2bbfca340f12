//! Reverb effect: Schroeder-style comb/allpass network
//!
//! The decay time is the RT60 of the tail: each comb's feedback is chosen so
//! its loop loses 60 dB over `decay` seconds.

/// A comb filter delay line with damped feedback
#[derive(Debug, Clone)]
struct CombFilter {
    buffer: Vec<f32>,
    index: usize,
    feedback: f32,
    damp: f32,
    filter_store: f32,
}

impl CombFilter {
    fn new(size: usize, damp: f32) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            index: 0,
            feedback: 0.0,
            damp,
            filter_store: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.index];
        self.filter_store = output * (1.0 - self.damp) + self.filter_store * self.damp;
        self.buffer[self.index] = input + self.filter_store * self.feedback;
        self.index = (self.index + 1) % self.buffer.len();
        output
    }
}

/// An allpass diffuser
#[derive(Debug, Clone)]
struct AllpassFilter {
    buffer: Vec<f32>,
    index: usize,
}

impl AllpassFilter {
    fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            index: 0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let buffered = self.buffer[self.index];
        self.buffer[self.index] = input + buffered * 0.5;
        self.index = (self.index + 1) % self.buffer.len();
        buffered - input
    }
}

// Loop lengths tuned for 44.1 kHz
const COMB_TUNING: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
const ALLPASS_TUNING: [usize; 4] = [556, 441, 341, 225];

const INPUT_GAIN: f32 = 0.015;
const DAMPING: f32 = 0.2;

/// Mono algorithmic reverb with a decay time in seconds
#[derive(Debug, Clone)]
pub struct Reverb {
    combs: Vec<CombFilter>,
    allpasses: Vec<AllpassFilter>,
    sample_rate: f64,
    decay: f64,
    wet: f32,
}

impl Reverb {
    /// Create a reverb with the given decay (seconds) and wet mix
    pub fn new(sample_rate: f64, decay: f64, wet: f64) -> Self {
        let scale = sample_rate / 44100.0;
        let combs = COMB_TUNING
            .iter()
            .map(|&t| CombFilter::new((t as f64 * scale) as usize, DAMPING))
            .collect();
        let allpasses = ALLPASS_TUNING
            .iter()
            .map(|&t| AllpassFilter::new((t as f64 * scale) as usize))
            .collect();

        let mut reverb = Self {
            combs,
            allpasses,
            sample_rate,
            decay: 0.0,
            wet: wet.clamp(0.0, 1.0) as f32,
        };
        reverb.set_decay(decay);
        reverb
    }

    /// Set the RT60 decay time in seconds; zero silences the tail
    pub fn set_decay(&mut self, decay: f64) {
        self.decay = decay.max(0.0);
        for comb in &mut self.combs {
            comb.feedback = if self.decay <= 0.0 {
                0.0
            } else {
                let loop_seconds = comb.buffer.len() as f64 / self.sample_rate;
                10.0_f64.powf(-3.0 * loop_seconds / self.decay).min(0.98) as f32
            };
        }
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Process one sample
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let feed = input * INPUT_GAIN;
        let mut out: f32 = self.combs.iter_mut().map(|c| c.process(feed)).sum();
        for allpass in &mut self.allpasses {
            out = allpass.process(out);
        }
        input * (1.0 - self.wet) + out * self.wet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tail_peak(reverb: &mut Reverb, skip: usize, window: usize) -> f32 {
        for _ in 0..skip {
            reverb.process(0.0);
        }
        (0..window).map(|_| reverb.process(0.0).abs()).fold(0.0, f32::max)
    }

    #[test]
    fn test_dry_passthrough() {
        let mut reverb = Reverb::new(44100.0, 1.5, 0.0);
        assert_eq!(reverb.process(0.5), 0.5);
    }

    #[test]
    fn test_impulse_produces_tail() {
        let mut reverb = Reverb::new(44100.0, 1.5, 1.0);
        reverb.process(1.0);
        assert!(tail_peak(&mut reverb, 0, 5000) > 0.001);
    }

    #[test]
    fn test_longer_decay_rings_longer() {
        let mut short = Reverb::new(44100.0, 0.3, 1.0);
        let mut long = Reverb::new(44100.0, 6.0, 1.0);
        short.process(1.0);
        long.process(1.0);

        let short_late = tail_peak(&mut short, 44100, 4410);
        let long_late = tail_peak(&mut long, 44100, 4410);
        assert!(long_late > short_late * 10.0, "{} vs {}", long_late, short_late);
    }

    #[test]
    fn test_zero_decay_dies_out() {
        let mut dead = Reverb::new(44100.0, 0.0, 1.0);
        let mut live = Reverb::new(44100.0, 2.0, 1.0);
        assert_eq!(dead.decay(), 0.0);
        dead.process(1.0);
        live.process(1.0);

        assert!(tail_peak(&mut dead, 44100, 2000) < 1e-9);
        assert!(tail_peak(&mut live, 44100, 2000) > 1e-5);
    }
}
