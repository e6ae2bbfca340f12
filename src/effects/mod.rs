//! Ambient effects applied to every voice
//!
//! A feedback delay and an algorithmic reverb run in parallel on the voice
//! mix and their outputs are summed.

mod delay;
mod reverb;

pub use delay::FeedbackDelay;
pub use reverb::Reverb;
