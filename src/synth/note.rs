//! Trigger-and-release note voice

use super::{Envelope, Oscillator, Voice, Waveform};

/// A single plucked note that releases itself after its hold time
#[derive(Debug, Clone)]
pub struct NoteVoice {
    oscillator: Oscillator,
    envelope: Envelope,
    gain: f64,
    hold_samples: usize,
}

impl NoteVoice {
    /// Trigger a note at `frequency`, held for `hold_seconds` before release
    pub fn new(waveform: Waveform, frequency: f64, gain: f64, hold_seconds: f64, sample_rate: f64) -> Self {
        let mut envelope = Envelope::new(sample_rate);
        envelope.trigger();

        Self {
            oscillator: Oscillator::new(waveform, frequency, sample_rate),
            envelope,
            gain,
            hold_samples: (hold_seconds * sample_rate).round() as usize,
        }
    }
}

impl Voice for NoteVoice {
    fn frequency(&self) -> f64 {
        self.oscillator.frequency()
    }

    fn set_waveform(&mut self, waveform: Waveform) {
        self.oscillator.set_waveform(waveform);
    }

    fn release(&mut self) {
        self.hold_samples = 0;
        self.envelope.release();
    }

    fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    fn process(&mut self) -> f64 {
        if self.hold_samples > 0 {
            self.hold_samples -= 1;
            if self.hold_samples == 0 {
                self.envelope.release();
            }
        }
        let level = self.envelope.process();
        self.oscillator.generate() * level * self.gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_sounds_then_dies() {
        let mut note = NoteVoice::new(Waveform::Square, 100.0, 1.0, 0.25, 1000.0);
        assert!(note.is_active());
        assert_eq!(note.frequency(), 100.0);

        let mut peak = 0.0f64;
        for _ in 0..250 {
            peak = peak.max(note.process().abs());
        }
        assert!(peak > 0.5);

        // released at 250ms; the 800ms release has finished well before 1.5s
        for _ in 0..1250 {
            note.process();
        }
        assert!(!note.is_active());
        assert_eq!(note.process(), 0.0);
    }

    #[test]
    fn test_early_release() {
        let mut note = NoteVoice::new(Waveform::Sine, 220.0, 1.0, 10.0, 1000.0);
        for _ in 0..50 {
            note.process();
        }
        note.release();
        for _ in 0..1000 {
            note.process();
        }
        assert!(!note.is_active());
    }

    #[test]
    fn test_gain_scales_output() {
        let mut loud = NoteVoice::new(Waveform::Square, 100.0, 1.0, 0.25, 1000.0);
        let mut quiet = NoteVoice::new(Waveform::Square, 100.0, 0.25, 0.25, 1000.0);
        for _ in 0..100 {
            let a = loud.process();
            let b = quiet.process();
            assert!((a * 0.25 - b).abs() < 1e-12);
        }
    }
}
