//! Amplitude envelopes for plucked notes

/// Shortest stage; keeps the per-sample step finite
const MIN_STAGE_SECONDS: f64 = 0.001;

/// Envelope stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Stage times in seconds and the sustain level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Adsr {
    /// Soft pluck: 100ms in, 200ms down to 30%, 800ms out
    pub const PLUCK: Adsr = Adsr {
        attack: 0.1,
        decay: 0.2,
        sustain: 0.3,
        release: 0.8,
    };

    fn sanitized(self) -> Self {
        Self {
            attack: self.attack.max(MIN_STAGE_SECONDS),
            decay: self.decay.max(MIN_STAGE_SECONDS),
            sustain: self.sustain.clamp(0.0, 1.0),
            release: self.release.max(MIN_STAGE_SECONDS),
        }
    }
}

impl Default for Adsr {
    fn default() -> Self {
        Self::PLUCK
    }
}

/// Linear ADSR envelope advanced one sample at a time
#[derive(Debug, Clone)]
pub struct Envelope {
    shape: Adsr,
    dt: f64,
    stage: EnvelopeStage,
    level: f64,
    /// Level the release started from, so it always lasts `release` seconds
    release_from: f64,
}

impl Envelope {
    pub fn new(sample_rate: f64) -> Self {
        Self::with_shape(Adsr::PLUCK, sample_rate)
    }

    pub fn with_shape(shape: Adsr, sample_rate: f64) -> Self {
        Self {
            shape: shape.sanitized(),
            dt: 1.0 / sample_rate,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            release_from: 0.0,
        }
    }

    pub fn shape(&self) -> Adsr {
        self.shape
    }

    /// Start the attack from wherever the level is now
    pub fn trigger(&mut self) {
        self.stage = EnvelopeStage::Attack;
    }

    pub fn release(&mut self) {
        if matches!(
            self.stage,
            EnvelopeStage::Attack | EnvelopeStage::Decay | EnvelopeStage::Sustain
        ) {
            self.release_from = self.level;
            self.stage = EnvelopeStage::Release;
        }
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Advance one sample and return the new level
    pub fn process(&mut self) -> f64 {
        let Adsr {
            attack,
            decay,
            sustain,
            release,
        } = self.shape;

        (self.level, self.stage) = match self.stage {
            EnvelopeStage::Idle => (0.0, EnvelopeStage::Idle),
            EnvelopeStage::Attack => {
                let level = self.level + self.dt / attack;
                if level >= 1.0 {
                    (1.0, EnvelopeStage::Decay)
                } else {
                    (level, EnvelopeStage::Attack)
                }
            }
            EnvelopeStage::Decay => {
                let level = self.level - (1.0 - sustain) * self.dt / decay;
                if level <= sustain {
                    (sustain, EnvelopeStage::Sustain)
                } else {
                    (level, EnvelopeStage::Decay)
                }
            }
            EnvelopeStage::Sustain => (sustain, EnvelopeStage::Sustain),
            EnvelopeStage::Release => {
                let level = self.level - self.release_from * self.dt / release;
                if level <= 0.0 {
                    (0.0, EnvelopeStage::Idle)
                } else {
                    (level, EnvelopeStage::Release)
                }
            }
        };

        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(env: &mut Envelope, samples: usize) {
        for _ in 0..samples {
            env.process();
        }
    }

    #[test]
    fn test_starts_idle() {
        let mut env = Envelope::new(44100.0);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert!(!env.is_active());
        assert_eq!(env.process(), 0.0);
    }

    #[test]
    fn test_pluck_attack_takes_100ms() {
        let mut env = Envelope::new(1000.0);
        env.trigger();

        run(&mut env, 90);
        assert_eq!(env.stage(), EnvelopeStage::Attack);
        assert!(env.level() > 0.85 && env.level() < 0.95);

        run(&mut env, 20);
        assert_eq!(env.stage(), EnvelopeStage::Decay);
    }

    #[test]
    fn test_pluck_settles_at_sustain() {
        let mut env = Envelope::new(1000.0);
        env.trigger();

        // 100ms attack + 200ms decay
        run(&mut env, 400);

        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert!((env.level() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_release_reaches_silence() {
        let shape = Adsr {
            attack: 0.001,
            decay: 0.001,
            sustain: 0.5,
            release: 0.01,
        };
        let mut env = Envelope::with_shape(shape, 44100.0);
        env.trigger();
        run(&mut env, 200);

        env.release();
        assert_eq!(env.stage(), EnvelopeStage::Release);

        // 10ms is 441 samples
        run(&mut env, 500);
        assert_eq!(env.level(), 0.0);
        assert!(!env.is_active());
    }

    #[test]
    fn test_release_mid_attack_starts_from_current_level() {
        let mut env = Envelope::new(1000.0);
        env.trigger();
        run(&mut env, 50);
        let peak = env.level();

        env.release();
        let next = env.process();
        assert!(next < peak);
        assert!(next > 0.0);
    }

    #[test]
    fn test_release_while_idle_is_ignored() {
        let mut env = Envelope::new(44100.0);
        env.release();
        assert_eq!(env.stage(), EnvelopeStage::Idle);
    }

    #[test]
    fn test_shape_is_sanitized() {
        let env = Envelope::with_shape(
            Adsr {
                attack: 0.0,
                decay: -1.0,
                sustain: 2.0,
                release: 0.0,
            },
            1000.0,
        );
        let shape = env.shape();
        assert_eq!(shape.attack, MIN_STAGE_SECONDS);
        assert_eq!(shape.decay, MIN_STAGE_SECONDS);
        assert_eq!(shape.sustain, 1.0);
    }

    #[test]
    fn test_reset() {
        let mut env = Envelope::new(44100.0);
        env.trigger();
        run(&mut env, 100);

        env.reset();
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert_eq!(env.level(), 0.0);
    }
}
