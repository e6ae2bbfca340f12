//! Voice trait for sound generators

use super::Waveform;

/// Trait for voice implementations
pub trait Voice: Send + Sync {
    /// Current oscillator frequency in Hz
    fn frequency(&self) -> f64;

    /// Change the oscillator shape
    fn set_waveform(&mut self, waveform: Waveform);

    /// Release the voice (end a note)
    fn release(&mut self);

    /// Check if the voice still produces sound
    fn is_active(&self) -> bool;

    /// Generate the next sample
    fn process(&mut self) -> f64;
}
