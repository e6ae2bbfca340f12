//! Synthesis for generating audio
//!
//! Contains the oscillator, the envelope and the two voices: the held tone
//! that follows the pointer and the plucked notes of sequence playback.

mod envelope;
mod glide;
mod note;
mod oscillator;
mod voice;

pub use envelope::{Adsr, Envelope, EnvelopeStage};
pub use glide::GlideVoice;
pub use note::NoteVoice;
pub use oscillator::{Oscillator, Waveform};
pub use voice::Voice;

/// Convert decibels to a linear gain factor
pub fn db_to_gain(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}
