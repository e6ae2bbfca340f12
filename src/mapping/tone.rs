//! Sample-to-frequency mapping
//!
//! Two mappings, picked by [`ToneMode`]:
//!
//! - **By colour**: the mean of the three channels is scaled linearly onto
//!   `min_freq_hz..=max_freq_hz`. Always resolves.
//! - **By coordinate**: the column picks a scale degree, the row picks an
//!   octave (top of the image is `max_octave`), and the resulting pitch name
//!   is resolved through a [`PitchResolver`]. Resolution can fail, in which
//!   case the result is [`Frequency::Unresolved`].

use serde::{Deserialize, Serialize};

use super::{EqualTemperament, LinearMapper, PitchResolver, Scale};
use crate::surface::Rgb;

/// Which property of a sample drives the pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMode {
    /// Overall brightness of the pixel
    #[default]
    #[serde(alias = "colour", alias = "color")]
    ByColor,
    /// Horizontal position picks the note, vertical position the octave
    #[serde(alias = "coordinate")]
    ByCoordinate,
}

impl ToneMode {
    pub fn label(&self) -> &'static str {
        match self {
            ToneMode::ByColor => "colour",
            ToneMode::ByCoordinate => "coordinate",
        }
    }
}

/// Settings the mapper reads on every sample
#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    pub scale: Scale,
    pub mode: ToneMode,
    pub min_octave: i32,
    pub max_octave: i32,
    pub min_freq_hz: f64,
    pub max_freq_hz: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            scale: Scale::default(),
            mode: ToneMode::ByColor,
            min_octave: 2,
            max_octave: 6,
            min_freq_hz: 100.0,
            max_freq_hz: 1000.0,
        }
    }
}

/// A pixel position and the colour read there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePoint {
    pub x: u32,
    pub y: u32,
    pub rgb: Rgb,
}

impl SamplePoint {
    pub fn new(x: u32, y: u32, rgb: Rgb) -> Self {
        Self { x, y, rgb }
    }
}

/// Result of mapping a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frequency {
    /// Target pitch in Hz
    Hz(f64),
    /// No valid pitch; the sounding pitch must stay where it is
    Unresolved,
}

impl Frequency {
    pub fn hz(&self) -> Option<f64> {
        match self {
            Frequency::Hz(hz) => Some(*hz),
            Frequency::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Frequency::Hz(_))
    }
}

/// Scale degree for column `x` of a canvas `width` pixels wide
///
/// `x == width` wraps to degree 0 instead of running off the scale.
pub fn note_index(x: u32, width: u32, scale_len: usize) -> usize {
    if width == 0 || scale_len == 0 {
        return 0;
    }
    let index = ((x as f64 / width as f64) * scale_len as f64).floor() as usize;
    index % scale_len
}

/// Octave for row `y` of a canvas `height` pixels tall
///
/// Row 0 is `max_octave`, row `height` is `min_octave`. Halves round up.
pub fn octave_for(y: u32, height: u32, min_octave: i32, max_octave: i32) -> i32 {
    if height == 0 {
        return max_octave;
    }
    let span = max_octave as f64 - min_octave as f64;
    let raw = max_octave as f64 - (y as f64 / height as f64) * span;
    (raw + 0.5).floor() as i32
}

/// Maps samples to frequencies
#[derive(Debug, Clone, Default)]
pub struct ToneMapper<R: PitchResolver = EqualTemperament> {
    resolver: R,
}

impl ToneMapper {
    /// Equal-tempered mapper tuned to `a4_hz`
    pub fn with_tuning(a4_hz: f64) -> Self {
        Self::new(EqualTemperament::new(a4_hz))
    }
}

impl<R: PitchResolver> ToneMapper<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Map a sample on a `width` x `height` canvas to a frequency
    pub fn map_to_frequency(
        &self,
        point: &SamplePoint,
        width: u32,
        height: u32,
        config: &MappingConfig,
    ) -> Frequency {
        match config.mode {
            ToneMode::ByColor => Frequency::Hz(self.color_to_frequency(point.rgb, config)),
            ToneMode::ByCoordinate => match self.pitch_name(point, width, height, config) {
                Some((note, octave)) => match self.resolver.frequency(&note, octave) {
                    Ok(hz) => Frequency::Hz(hz),
                    Err(_) => Frequency::Unresolved,
                },
                None => Frequency::Unresolved,
            },
        }
    }

    /// Brightness of `rgb` scaled onto the configured frequency band
    pub fn color_to_frequency(&self, rgb: Rgb, config: &MappingConfig) -> f64 {
        LinearMapper::brightness_to_hz(config.min_freq_hz, config.max_freq_hz).map(rgb.brightness())
    }

    /// Note and octave a sample selects in coordinate mode
    ///
    /// `None` for a zero-sized canvas.
    pub fn pitch_name(
        &self,
        point: &SamplePoint,
        width: u32,
        height: u32,
        config: &MappingConfig,
    ) -> Option<(String, i32)> {
        if width == 0 || height == 0 {
            return None;
        }
        let index = note_index(point.x, width, config.scale.len());
        let octave = octave_for(point.y, height, config.min_octave, config.max_octave);
        Some((config.scale.note(index).to_string(), octave))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::PitchError;

    fn coordinate_config() -> MappingConfig {
        MappingConfig {
            mode: ToneMode::ByCoordinate,
            ..MappingConfig::default()
        }
    }

    fn at(x: u32, y: u32) -> SamplePoint {
        SamplePoint::new(x, y, Rgb::new(0, 0, 0))
    }

    #[test]
    fn test_white_maps_to_top_of_band() {
        let mapper: ToneMapper = ToneMapper::default();
        let point = SamplePoint::new(10, 10, Rgb::new(255, 255, 255));
        let freq = mapper.map_to_frequency(&point, 100, 100, &MappingConfig::default());
        assert_eq!(freq, Frequency::Hz(1000.0));
    }

    #[test]
    fn test_black_maps_to_bottom_of_band() {
        let mapper: ToneMapper = ToneMapper::default();
        let point = SamplePoint::new(0, 0, Rgb::new(0, 0, 0));
        let freq = mapper.map_to_frequency(&point, 100, 100, &MappingConfig::default());
        assert_eq!(freq, Frequency::Hz(100.0));
    }

    #[test]
    fn test_colour_mode_is_monotonic_and_bounded() {
        let mapper: ToneMapper = ToneMapper::default();
        let config = MappingConfig::default();

        let mut last = 0.0;
        for level in 0..=255u8 {
            let hz = mapper.color_to_frequency(Rgb::new(level, level, level), &config);
            assert!(hz >= last);
            assert!((config.min_freq_hz..=config.max_freq_hz).contains(&hz));
            last = hz;
        }
    }

    #[test]
    fn test_colour_mode_uses_channel_mean() {
        let mapper: ToneMapper = ToneMapper::default();
        let config = MappingConfig::default();
        // mean of (255, 0, 0) is 85 -> 100 + 85/255 * 900 = 400
        let hz = mapper.color_to_frequency(Rgb::new(255, 0, 0), &config);
        assert!((hz - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_centre_of_canvas_is_f4() {
        let mapper: ToneMapper = ToneMapper::default();
        let config = coordinate_config();

        let point = at(350, 200);
        assert_eq!(
            mapper.pitch_name(&point, 700, 400, &config),
            Some(("F".to_string(), 4))
        );

        let hz = mapper.map_to_frequency(&point, 700, 400, &config).hz().unwrap();
        assert!((hz - 349.228).abs() < 0.01, "got {}", hz);
    }

    #[test]
    fn test_note_index_bounds() {
        for x in 0..700 {
            assert!(note_index(x, 700, 7) < 7);
        }
        assert_eq!(note_index(0, 700, 7), 0);
        assert_eq!(note_index(699, 700, 7), 6);
    }

    #[test]
    fn test_note_index_wraps_at_right_edge() {
        assert_eq!(note_index(700, 700, 7), 0);
        assert_eq!(note_index(5, 0, 7), 0);
    }

    #[test]
    fn test_octave_follows_height() {
        assert_eq!(octave_for(0, 400, 2, 6), 6);
        assert_eq!(octave_for(400, 400, 2, 6), 2);
        assert_eq!(octave_for(200, 400, 2, 6), 4);
        // half way between 3 and 4 rounds up
        assert_eq!(octave_for(200, 400, 2, 5), 4);
        // boundaries sit at half-octave fractions of the height
        assert_eq!(octave_for(49, 400, 2, 6), 6);
        assert_eq!(octave_for(50, 400, 2, 6), 6);
        assert_eq!(octave_for(51, 400, 2, 6), 5);
    }

    #[test]
    fn test_coordinate_mode_ignores_colour() {
        let mapper: ToneMapper = ToneMapper::default();
        let config = coordinate_config();

        let dark = SamplePoint::new(100, 100, Rgb::new(0, 0, 0));
        let bright = SamplePoint::new(100, 100, Rgb::new(255, 255, 255));
        assert_eq!(
            mapper.map_to_frequency(&dark, 700, 400, &config),
            mapper.map_to_frequency(&bright, 700, 400, &config)
        );
    }

    #[test]
    fn test_unresolvable_pitch_is_unresolved() {
        let mapper: ToneMapper = ToneMapper::default();
        let config = MappingConfig {
            scale: Scale::new("flat", vec!["Cb".to_string()]).unwrap(),
            mode: ToneMode::ByCoordinate,
            min_octave: -1,
            max_octave: -1,
            ..MappingConfig::default()
        };

        let freq = mapper.map_to_frequency(&at(0, 0), 10, 10, &config);
        assert_eq!(freq, Frequency::Unresolved);
        assert_eq!(freq.hz(), None);
        assert!(!freq.is_resolved());
    }

    #[test]
    fn test_extreme_octave_range_is_unresolved() {
        let mapper: ToneMapper = ToneMapper::default();
        let config = MappingConfig {
            min_octave: i32::MIN,
            max_octave: i32::MAX,
            ..coordinate_config()
        };

        assert_eq!(octave_for(0, 10, i32::MIN, i32::MAX), i32::MAX);
        assert_eq!(mapper.map_to_frequency(&at(0, 0), 10, 10, &config), Frequency::Unresolved);
        assert_eq!(mapper.map_to_frequency(&at(0, 10), 10, 10, &config), Frequency::Unresolved);
    }

    #[test]
    fn test_zero_sized_canvas_is_unresolved() {
        let mapper: ToneMapper = ToneMapper::default();
        let freq = mapper.map_to_frequency(&at(0, 0), 0, 0, &coordinate_config());
        assert_eq!(freq, Frequency::Unresolved);
    }

    struct Refusing;

    impl PitchResolver for Refusing {
        fn frequency(&self, note: &str, octave: i32) -> Result<f64, PitchError> {
            Err(PitchError::OutOfRange(format!("{}{}", note, octave)))
        }
    }

    #[test]
    fn test_custom_resolver_failure_never_panics() {
        let mapper = ToneMapper::new(Refusing);
        let config = coordinate_config();
        for x in (0..700).step_by(50) {
            assert_eq!(
                mapper.map_to_frequency(&at(x, 10), 700, 400, &config),
                Frequency::Unresolved
            );
        }
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(ToneMode::ByColor.label(), "colour");
        assert_eq!(ToneMode::ByCoordinate.label(), "coordinate");

        let mode: ToneMode = serde_yaml::from_str("colour").unwrap();
        assert_eq!(mode, ToneMode::ByColor);
        let mode: ToneMode = serde_yaml::from_str("by_coordinate").unwrap();
        assert_eq!(mode, ToneMode::ByCoordinate);
    }
}
