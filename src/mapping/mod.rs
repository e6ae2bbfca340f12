//! Mapping system for turning image samples into pitches
//!
//! A sample (pixel colour plus position) becomes a frequency either by
//! brightness or by position on a musical scale.

mod linear;
mod pitch;
mod scale;
mod tone;

pub use linear::LinearMapper;
pub use pitch::{midi_to_frequency, note_to_midi, EqualTemperament, PitchError, PitchResolver};
pub use scale::{Scale, SCALE_CATALOG};
pub use tone::{
    note_index, octave_for, Frequency, MappingConfig, SamplePoint, ToneMapper, ToneMode,
};
