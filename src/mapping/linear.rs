//! Linear rescaling between two ranges

use std::ops::RangeInclusive;

/// Largest channel mean a pixel can have
const MAX_BRIGHTNESS: f64 = 255.0;

/// Maps one range onto another along a straight line
///
/// Results are clamped to the output range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMapper {
    in_min: f64,
    in_max: f64,
    out_min: f64,
    out_max: f64,
}

impl LinearMapper {
    pub fn new(input: RangeInclusive<f64>, output: RangeInclusive<f64>) -> Self {
        Self {
            in_min: *input.start(),
            in_max: *input.end(),
            out_min: *output.start(),
            out_max: *output.end(),
        }
    }

    /// Brightness (0-255) to a frequency band in Hz
    pub fn brightness_to_hz(min_hz: f64, max_hz: f64) -> Self {
        Self::new(0.0..=MAX_BRIGHTNESS, min_hz..=max_hz)
    }

    pub fn map(&self, input: f64) -> f64 {
        let in_range = self.in_max - self.in_min;
        // a collapsed input range sits at the middle of the output
        let normalized = if in_range.abs() < f64::EPSILON {
            0.5
        } else {
            (input - self.in_min) / in_range
        };

        let output = self.out_min + normalized * (self.out_max - self.out_min);
        output.clamp(self.out_min.min(self.out_max), self.out_min.max(self.out_max))
    }
}
