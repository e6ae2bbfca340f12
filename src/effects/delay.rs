//! Feedback delay

/// Eighth note at 120 bpm
pub const EIGHTH_NOTE_SECONDS: f64 = 0.25;

/// Mono delay line with feedback and a dry/wet mix
#[derive(Debug, Clone)]
pub struct FeedbackDelay {
    buffer: Vec<f32>,
    write_pos: usize,
    delay_samples: usize,
    feedback: f32,
    wet: f32,
}

impl FeedbackDelay {
    /// Create a delay of `delay_seconds` with the given feedback and wet mix
    pub fn new(sample_rate: f64, delay_seconds: f64, feedback: f64, wet: f64) -> Self {
        let delay_samples = ((delay_seconds * sample_rate) as usize).max(1);
        Self {
            buffer: vec![0.0; delay_samples],
            write_pos: 0,
            delay_samples,
            feedback: feedback.clamp(0.0, 0.99) as f32,
            wet: wet.clamp(0.0, 1.0) as f32,
        }
    }

    /// Eighth-note delay, feedback 0.5, fully dry
    pub fn eighth_note(sample_rate: f64) -> Self {
        Self::new(sample_rate, EIGHTH_NOTE_SECONDS, 0.5, 0.0)
    }

    /// Set the wet mix (0.0 = dry only, 1.0 = echoes only)
    pub fn set_wet(&mut self, wet: f64) {
        self.wet = wet.clamp(0.0, 1.0) as f32;
    }

    pub fn wet(&self) -> f64 {
        self.wet as f64
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Process one sample
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        // The slot about to be overwritten holds the sample from one delay ago
        let delayed = self.buffer[self.write_pos];
        self.buffer[self.write_pos] = input + delayed * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.delay_samples;

        input * (1.0 - self.wet) + delayed * self.wet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_passthrough() {
        let mut delay = FeedbackDelay::eighth_note(44100.0);
        assert_eq!(delay.wet(), 0.0);
        assert_eq!(delay.process(0.5), 0.5);
        assert_eq!(delay.process(-0.25), -0.25);
    }

    #[test]
    fn test_eighth_note_length() {
        let delay = FeedbackDelay::eighth_note(44100.0);
        assert_eq!(delay.delay_samples(), 11025);
    }

    #[test]
    fn test_echo_and_feedback() {
        // 10 samples of delay
        let mut delay = FeedbackDelay::new(1000.0, 0.01, 0.5, 1.0);

        assert_eq!(delay.process(1.0), 0.0);
        for _ in 1..10 {
            assert_eq!(delay.process(0.0), 0.0);
        }
        assert_eq!(delay.process(0.0), 1.0);

        for _ in 1..10 {
            delay.process(0.0);
        }
        assert_eq!(delay.process(0.0), 0.5);
    }

    #[test]
    fn test_wet_is_clamped() {
        let mut delay = FeedbackDelay::eighth_note(1000.0);
        delay.set_wet(3.0);
        assert_eq!(delay.wet(), 1.0);
    }
}
