//! Pitch names and their frequencies
//!
//! Note names are a letter `A`-`G` followed by any number of `#` or `b`
//! accidentals. A pitch is a note name plus an octave (`"F#4"`), resolved in
//! twelve-tone equal temperament.

use thiserror::Error;

use super::Scale;

/// Highest MIDI note number a pitch may resolve to
const MIDI_MAX: i32 = 127;

/// MIDI note number of A4
const MIDI_A4: i32 = 69;

/// Errors from scale lookup and pitch resolution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PitchError {
    #[error("unknown scale '{0}'")]
    UnknownScale(String),

    #[error("scale '{0}' has no notes")]
    EmptyScale(String),

    #[error("invalid note name '{0}'")]
    InvalidNote(String),

    #[error("pitch {0} is outside the playable range")]
    OutOfRange(String),
}

/// Looks up scales and turns pitch names into frequencies
pub trait PitchResolver: Send + Sync {
    /// Ordered pitch classes of a named scale
    fn scale(&self, name: &str) -> Result<Scale, PitchError> {
        Scale::from_name(name)
    }

    /// Frequency in Hz of `note` in `octave`
    fn frequency(&self, note: &str, octave: i32) -> Result<f64, PitchError>;
}

/// Twelve-tone equal temperament around a reference A4
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqualTemperament {
    a4_hz: f64,
}

impl EqualTemperament {
    pub fn new(a4_hz: f64) -> Self {
        Self { a4_hz }
    }
}

impl Default for EqualTemperament {
    fn default() -> Self {
        Self::new(440.0)
    }
}

impl PitchResolver for EqualTemperament {
    fn frequency(&self, note: &str, octave: i32) -> Result<f64, PitchError> {
        let midi = note_to_midi(note, octave)?;
        Ok(midi_to_frequency(midi, self.a4_hz))
    }
}

/// Semitone offset of a note name from C, accidentals included
///
/// The result can fall outside `0..12`: `Cb` is -1 and `B#` is 12.
pub(crate) fn pitch_class_offset(note: &str) -> Result<i32, PitchError> {
    let mut chars = note.chars();
    let base = match chars.next() {
        Some('C') => 0,
        Some('D') => 2,
        Some('E') => 4,
        Some('F') => 5,
        Some('G') => 7,
        Some('A') => 9,
        Some('B') => 11,
        _ => return Err(PitchError::InvalidNote(note.to_string())),
    };

    chars.try_fold(base, |acc, c| match c {
        '#' => Ok(acc + 1),
        'b' => Ok(acc - 1),
        _ => Err(PitchError::InvalidNote(note.to_string())),
    })
}

/// MIDI note number of `note` in `octave` (C4 = 60)
pub fn note_to_midi(note: &str, octave: i32) -> Result<i32, PitchError> {
    let offset = pitch_class_offset(note)?;
    let midi = octave
        .checked_add(1)
        .and_then(|o| o.checked_mul(12))
        .and_then(|m| m.checked_add(offset));

    match midi {
        Some(midi) if (0..=MIDI_MAX).contains(&midi) => Ok(midi),
        _ => Err(PitchError::OutOfRange(format!("{}{}", note, octave))),
    }
}

/// Frequency of a MIDI note number for the given A4 reference
pub fn midi_to_frequency(midi: i32, a4_hz: f64) -> f64 {
    a4_hz * 2.0_f64.powf((midi - MIDI_A4) as f64 / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extreme_octaves_are_out_of_range() {
        assert!(matches!(note_to_midi("C", i32::MAX), Err(PitchError::OutOfRange(_))));
        assert!(matches!(note_to_midi("B", i32::MAX / 12), Err(PitchError::OutOfRange(_))));
        assert!(matches!(note_to_midi("Cb", i32::MIN), Err(PitchError::OutOfRange(_))));
    }

    #[test]
    fn test_a4_is_reference() {
        let et = EqualTemperament::default();
        assert_eq!(et.frequency("A", 4).unwrap(), 440.0);
    }

    #[test]
    fn test_middle_c() {
        let et = EqualTemperament::default();
        let hz = et.frequency("C", 4).unwrap();
        assert!((hz - 261.626).abs() < 0.01, "got {}", hz);
    }

    #[test]
    fn test_f4() {
        let et = EqualTemperament::default();
        let hz = et.frequency("F", 4).unwrap();
        assert!((hz - 349.228).abs() < 0.01, "got {}", hz);
    }

    #[test]
    fn test_accidentals_are_enharmonic() {
        let et = EqualTemperament::default();
        let sharp = et.frequency("C#", 4).unwrap();
        let flat = et.frequency("Db", 4).unwrap();
        assert!((sharp - flat).abs() < 1e-9);

        // B#3 is C4, Cb4 is B3
        assert_eq!(note_to_midi("B#", 3).unwrap(), 60);
        assert_eq!(note_to_midi("Cb", 4).unwrap(), 59);
        assert_eq!(note_to_midi("Fbb", 4).unwrap(), 63);
    }

    #[test]
    fn test_custom_tuning() {
        let et = EqualTemperament::new(432.0);
        assert_eq!(et.frequency("A", 4).unwrap(), 432.0);
        assert_eq!(et.frequency("A", 5).unwrap(), 864.0);
    }

    #[test]
    fn test_out_of_range_pitch_fails() {
        let et = EqualTemperament::default();

        assert_eq!(
            et.frequency("Cb", -1),
            Err(PitchError::OutOfRange("Cb-1".to_string()))
        );
        assert!(et.frequency("G#", 9).is_err());
        assert!(et.frequency("G", 9).is_ok());
        assert!(et.frequency("C", -1).is_ok());
    }

    #[test]
    fn test_invalid_note_names() {
        assert!(matches!(note_to_midi("H", 4), Err(PitchError::InvalidNote(_))));
        assert!(matches!(note_to_midi("", 4), Err(PitchError::InvalidNote(_))));
        assert!(matches!(note_to_midi("C4", 4), Err(PitchError::InvalidNote(_))));
    }

    #[test]
    fn test_resolver_scale_lookup() {
        let et = EqualTemperament::default();
        let scale = et.scale("C major").unwrap();
        assert_eq!(scale.len(), 7);
        assert!(matches!(et.scale("nonsense"), Err(PitchError::UnknownScale(_))));
    }
}
