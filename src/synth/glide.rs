//! Held tone that glides between pitches
//!
//! The continuous voice heard while the pointer is over the picture. Pitch
//! changes ramp exponentially over a short glide, level changes ramp
//! linearly, and release stops the tone at once.

use super::{Oscillator, Voice, Waveform};

/// Lowest and highest frequency the held tone accepts
const MIN_HZ: f64 = 20.0;
const MAX_HZ: f64 = 20000.0;

/// A continuous oscillator with pitch and level ramps
#[derive(Debug, Clone)]
pub struct GlideVoice {
    oscillator: Oscillator,
    sample_rate: f64,

    frequency: f64,
    target_frequency: f64,
    frequency_ratio: f64,
    frequency_steps: usize,

    gain: f64,
    target_gain: f64,
    gain_step: f64,
    gain_steps: usize,

    active: bool,
}

impl GlideVoice {
    /// Start a held tone at `frequency` and linear `gain`
    pub fn new(waveform: Waveform, frequency: f64, gain: f64, sample_rate: f64) -> Self {
        let frequency = frequency.clamp(MIN_HZ, MAX_HZ);
        Self {
            oscillator: Oscillator::new(waveform, frequency, sample_rate),
            sample_rate,
            frequency,
            target_frequency: frequency,
            frequency_ratio: 1.0,
            frequency_steps: 0,
            gain,
            target_gain: gain,
            gain_step: 0.0,
            gain_steps: 0,
            active: true,
        }
    }

    /// Ramp toward `frequency` over `seconds`
    pub fn glide_to(&mut self, frequency: f64, seconds: f64) {
        let target = frequency.clamp(MIN_HZ, MAX_HZ);
        let steps = self.steps_for(seconds);

        self.target_frequency = target;
        self.frequency_steps = steps;
        self.frequency_ratio = (target / self.frequency).powf(1.0 / steps as f64);
    }

    /// Ramp the linear gain toward `gain` over `seconds`
    pub fn ramp_gain(&mut self, gain: f64, seconds: f64) {
        let steps = self.steps_for(seconds);

        self.target_gain = gain.max(0.0);
        self.gain_steps = steps;
        self.gain_step = (self.target_gain - self.gain) / steps as f64;
    }

    /// Frequency the current glide is heading to
    pub fn target_frequency(&self) -> f64 {
        self.target_frequency
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    fn steps_for(&self, seconds: f64) -> usize {
        ((seconds * self.sample_rate).round() as usize).max(1)
    }

    fn advance_ramps(&mut self) {
        if self.frequency_steps > 0 {
            self.frequency_steps -= 1;
            self.frequency = if self.frequency_steps == 0 {
                self.target_frequency
            } else {
                self.frequency * self.frequency_ratio
            };
            self.oscillator.set_frequency(self.frequency);
        }

        if self.gain_steps > 0 {
            self.gain_steps -= 1;
            self.gain = if self.gain_steps == 0 {
                self.target_gain
            } else {
                self.gain + self.gain_step
            };
        }
    }
}

impl Voice for GlideVoice {
    fn frequency(&self) -> f64 {
        self.frequency
    }

    fn set_waveform(&mut self, waveform: Waveform) {
        self.oscillator.set_waveform(waveform);
    }

    fn release(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn process(&mut self) -> f64 {
        if !self.active {
            return 0.0;
        }
        let sample = self.oscillator.generate() * self.gain;
        self.advance_ramps();
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glide_reaches_target() {
        let mut voice = GlideVoice::new(Waveform::Sine, 440.0, 1.0, 1000.0);
        voice.glide_to(880.0, 0.05);

        // 50 samples at 1 kHz
        for _ in 0..25 {
            voice.process();
        }
        let halfway = voice.frequency();
        assert!(halfway > 440.0 && halfway < 880.0);
        // exponential: half way in time is the geometric mean
        assert!((halfway - 622.25).abs() < 1.0, "got {}", halfway);

        for _ in 0..25 {
            voice.process();
        }
        assert_eq!(voice.frequency(), 880.0);
        assert_eq!(voice.target_frequency(), 880.0);
    }

    #[test]
    fn test_retarget_mid_glide() {
        let mut voice = GlideVoice::new(Waveform::Sine, 440.0, 1.0, 1000.0);
        voice.glide_to(880.0, 0.05);
        for _ in 0..10 {
            voice.process();
        }
        voice.glide_to(220.0, 0.05);
        for _ in 0..50 {
            voice.process();
        }
        assert_eq!(voice.frequency(), 220.0);
    }

    #[test]
    fn test_frequency_is_clamped() {
        let mut voice = GlideVoice::new(Waveform::Sine, 5.0, 1.0, 1000.0);
        assert_eq!(voice.frequency(), MIN_HZ);

        voice.glide_to(1e9, 0.001);
        voice.process();
        assert_eq!(voice.frequency(), MAX_HZ);
    }

    #[test]
    fn test_gain_ramp() {
        let mut voice = GlideVoice::new(Waveform::Square, 100.0, 0.0, 1000.0);
        voice.ramp_gain(1.0, 0.1);
        for _ in 0..50 {
            voice.process();
        }
        assert!((voice.gain() - 0.5).abs() < 1e-9);
        for _ in 0..50 {
            voice.process();
        }
        assert_eq!(voice.gain(), 1.0);
    }

    #[test]
    fn test_release_is_immediate() {
        let mut voice = GlideVoice::new(Waveform::Square, 100.0, 1.0, 1000.0);
        assert!(voice.process().abs() > 0.0);

        voice.release();
        assert!(!voice.is_active());
        assert_eq!(voice.process(), 0.0);
    }
}
