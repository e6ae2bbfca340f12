//! Musical scales as ordered pitch-class names

use super::pitch::{pitch_class_offset, PitchError};

/// Scale names offered for selection and randomization
pub const SCALE_CATALOG: &[&str] = &[
    "C major",
    "A minor",
    "C major pentatonic",
    "A minor pentatonic",
    "D dorian",
    "E phrygian",
    "F lydian",
    "G mixolydian",
    "A harmonic minor",
    "C whole tone",
    "A blues",
    "chromatic",
];

const LETTERS: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];
const LETTER_OFFSETS: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
const FLAT_NAMES: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

/// Interval pattern (semitones from the tonic) for a scale type name
fn intervals_for(kind: &str) -> Option<&'static [i32]> {
    let intervals: &'static [i32] = match kind {
        "major" | "ionian" => &[0, 2, 4, 5, 7, 9, 11],
        "minor" | "aeolian" | "natural minor" => &[0, 2, 3, 5, 7, 8, 10],
        "dorian" => &[0, 2, 3, 5, 7, 9, 10],
        "phrygian" => &[0, 1, 3, 5, 7, 8, 10],
        "lydian" => &[0, 2, 4, 6, 7, 9, 11],
        "mixolydian" => &[0, 2, 4, 5, 7, 9, 10],
        "locrian" => &[0, 1, 3, 5, 6, 8, 10],
        "harmonic minor" => &[0, 2, 3, 5, 7, 8, 11],
        "major pentatonic" | "pentatonic" => &[0, 2, 4, 7, 9],
        "minor pentatonic" => &[0, 3, 5, 7, 10],
        "whole tone" => &[0, 2, 4, 6, 8, 10],
        "blues" => &[0, 3, 5, 6, 7, 10],
        "chromatic" => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        _ => return None,
    };
    Some(intervals)
}

/// Musical scale: a name and its ordered pitch classes
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    name: String,
    notes: Vec<String>,
}

impl Scale {
    /// Create a scale from explicit note names
    pub fn new(name: impl Into<String>, notes: Vec<String>) -> Result<Self, PitchError> {
        let name = name.into();
        if notes.is_empty() {
            return Err(PitchError::EmptyScale(name));
        }
        for note in &notes {
            pitch_class_offset(note)?;
        }
        Ok(Self { name, notes })
    }

    /// Look up a scale by name, e.g. `"A minor"`, `"C major pentatonic"`
    ///
    /// A name without a tonic (`"chromatic"`) is built on C. Underscores are
    /// accepted in place of spaces.
    pub fn from_name(name: &str) -> Result<Self, PitchError> {
        let normalized = name.trim().replace('_', " ");
        let unknown = || PitchError::UnknownScale(name.to_string());

        let (tonic, kind) = match normalized.split_once(' ') {
            Some((first, rest)) if pitch_class_offset(first).is_ok() => {
                (first.to_string(), rest.trim().to_lowercase())
            }
            _ => ("C".to_string(), normalized.to_lowercase()),
        };

        let intervals = intervals_for(&kind).ok_or_else(unknown)?;
        let notes = spell(&tonic, intervals)?;

        Ok(Self {
            name: format!("{} {}", tonic, kind),
            notes,
        })
    }

    /// Get the name of this scale
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pitch-class names in scale order
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Note at `index`, wrapping around the scale length
    pub fn note(&self, index: usize) -> &str {
        &self.notes[index % self.notes.len()]
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            name: "C major".to_string(),
            notes: ["C", "D", "E", "F", "G", "A", "B"].iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// Spell the notes of a scale built on `tonic`
///
/// Seven-note scales use one letter per degree. Other scales use flat names
/// unless the tonic itself is sharp.
fn spell(tonic: &str, intervals: &[i32]) -> Result<Vec<String>, PitchError> {
    let tonic_offset = pitch_class_offset(tonic)?;

    if intervals.len() == LETTERS.len() {
        let first = tonic.chars().next().unwrap_or('C');
        let letter_index = LETTERS.iter().position(|&l| l == first).unwrap_or(0);

        return Ok(intervals
            .iter()
            .enumerate()
            .map(|(degree, interval)| {
                let letter_slot = (letter_index + degree) % LETTERS.len();
                let target = (tonic_offset + interval).rem_euclid(12);
                let mut shift = (target - LETTER_OFFSETS[letter_slot]).rem_euclid(12);
                if shift > 6 {
                    shift -= 12;
                }
                let accidental = if shift >= 0 { "#" } else { "b" };
                let mut name = LETTERS[letter_slot].to_string();
                name.push_str(&accidental.repeat(shift.unsigned_abs() as usize));
                name
            })
            .collect());
    }

    let names = if tonic.contains('#') { &SHARP_NAMES } else { &FLAT_NAMES };
    Ok(intervals
        .iter()
        .enumerate()
        .map(|(degree, interval)| {
            if degree == 0 {
                tonic.to_string()
            } else {
                names[(tonic_offset + interval).rem_euclid(12) as usize].to_string()
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(scale: &Scale) -> Vec<&str> {
        scale.notes().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_c_major() {
        let scale = Scale::from_name("C major").unwrap();
        assert_eq!(scale.name(), "C major");
        assert_eq!(notes(&scale), ["C", "D", "E", "F", "G", "A", "B"]);
        assert_eq!(scale, Scale::default());
    }

    #[test]
    fn test_letter_spelling() {
        let f_major = Scale::from_name("F major").unwrap();
        assert_eq!(notes(&f_major), ["F", "G", "A", "Bb", "C", "D", "E"]);

        let d_major = Scale::from_name("D major").unwrap();
        assert_eq!(notes(&d_major), ["D", "E", "F#", "G", "A", "B", "C#"]);

        let harmonic = Scale::from_name("A harmonic minor").unwrap();
        assert_eq!(notes(&harmonic), ["A", "B", "C", "D", "E", "F", "G#"]);
    }

    #[test]
    fn test_pentatonic_and_blues() {
        let penta = Scale::from_name("A minor pentatonic").unwrap();
        assert_eq!(notes(&penta), ["A", "C", "D", "E", "G"]);

        let blues = Scale::from_name("A blues").unwrap();
        assert_eq!(notes(&blues), ["A", "C", "D", "Eb", "E", "G"]);
    }

    #[test]
    fn test_chromatic_defaults_to_c() {
        let scale = Scale::from_name("chromatic").unwrap();
        assert_eq!(scale.name(), "C chromatic");
        assert_eq!(scale.len(), 12);
        assert_eq!(scale.note(1), "Db");
    }

    #[test]
    fn test_underscore_names() {
        let scale = Scale::from_name("minor_pentatonic").unwrap();
        assert_eq!(scale.name(), "C minor pentatonic");
        assert_eq!(notes(&scale), ["C", "Eb", "F", "G", "Bb"]);
    }

    #[test]
    fn test_unknown_scale() {
        assert!(matches!(Scale::from_name("C nonsense"), Err(PitchError::UnknownScale(_))));
        assert!(matches!(Scale::from_name(""), Err(PitchError::UnknownScale(_))));
    }

    #[test]
    fn test_note_wraps() {
        let scale = Scale::default();
        assert_eq!(scale.note(0), "C");
        assert_eq!(scale.note(7), "C");
        assert_eq!(scale.note(13), "B");
    }

    #[test]
    fn test_custom_scale_must_be_valid() {
        assert!(matches!(Scale::new("none", vec![]), Err(PitchError::EmptyScale(_))));
        assert!(Scale::new("bad", vec!["X".to_string()]).is_err());

        let scale = Scale::new("fifths", vec!["C".to_string(), "G".to_string()]).unwrap();
        assert_eq!(scale.len(), 2);
    }

    #[test]
    fn test_catalog_entries_resolve() {
        for name in SCALE_CATALOG {
            let scale = Scale::from_name(name).unwrap();
            assert!(!scale.is_empty(), "{} is empty", name);
        }
    }
}
