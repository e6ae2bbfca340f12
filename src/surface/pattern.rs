//! Procedural pictures
//!
//! Stands in for a photo when none is given: a seeded plasma built from
//! overlapping sine waves, so every seed yields a different but stable image.

use std::f64::consts::{PI, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{PixelSurface, Rgb, Surface, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};

/// Seeded plasma picture
#[derive(Debug, Clone)]
pub struct PatternSurface {
    pixels: PixelSurface,
}

impl PatternSurface {
    /// Plasma at the default canvas size
    pub fn new(seed: u64) -> Self {
        Self::with_size(seed, DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }

    pub fn with_size(seed: u64, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let phase = seed_phases(seed);

        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let nx = x as f64 / width as f64;
                let ny = y as f64 / height as f64;
                pixels.push(plasma_color(nx, ny, &phase));
            }
        }

        Self {
            pixels: PixelSurface::from_parts(width, height, pixels),
        }
    }
}

impl Surface for PatternSurface {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn read_pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels.read_pixel(x, y)
    }
}

/// Four phase offsets derived from the seed
fn seed_phases(seed: u64) -> [f64; 4] {
    let mut rng = StdRng::seed_from_u64(seed);
    [0; 4].map(|_| rng.gen_range(0.0..TAU))
}

/// Plasma intensity in `[0, 1]` at normalized coordinates
fn plasma_wave(nx: f64, ny: f64, phase: &[f64; 4]) -> f64 {
    let x = nx * 6.0;
    let y = ny * 6.0;

    let v1 = (x * 1.5 + phase[0]).sin();
    let v2 = (y * 1.8 + phase[1]).sin();
    let v3 = ((x + y) * 1.2 + phase[2]).sin();
    let v4 = (((x - 3.0).powi(2) + (y - 3.0).powi(2)).sqrt() * 1.8 + phase[3]).cos();

    ((v1 + v2 + v3 + v4) / 4.0 + 1.0) / 2.0
}

fn plasma_color(nx: f64, ny: f64, phase: &[f64; 4]) -> Rgb {
    let t = plasma_wave(nx, ny, phase);
    let channel = |offset: f64| {
        let v = (t * 2.0 * PI + offset).sin() * 0.5 + 0.5;
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };
    Rgb::new(channel(0.0), channel(2.0 * PI / 3.0), channel(4.0 * PI / 3.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_size() {
        let pattern = PatternSurface::with_size(1, 20, 10);
        assert_eq!(pattern.width(), 20);
        assert_eq!(pattern.height(), 10);
    }

    #[test]
    fn test_same_seed_same_picture() {
        let a = PatternSurface::with_size(42, 32, 16);
        let b = PatternSurface::with_size(42, 32, 16);
        for y in 0..16 {
            for x in 0..32 {
                assert_eq!(a.read_pixel(x, y), b.read_pixel(x, y));
            }
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = PatternSurface::with_size(1, 32, 16);
        let b = PatternSurface::with_size(2, 32, 16);
        let differs = (0..16).any(|y| (0..32).any(|x| a.read_pixel(x, y) != b.read_pixel(x, y)));
        assert!(differs);
    }

    #[test]
    fn test_phases_are_seeded_angles() {
        let phases = seed_phases(42);
        assert_eq!(phases, seed_phases(42));
        assert_ne!(phases, seed_phases(43));
        assert!(phases.iter().all(|p| (0.0..TAU).contains(p)));
    }

    #[test]
    fn test_wave_is_normalized() {
        let phase = seed_phases(7);
        for i in 0..50 {
            let v = plasma_wave(i as f64 / 50.0, 1.0 - i as f64 / 50.0, &phase);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_zero_size_is_lifted() {
        let pattern = PatternSurface::with_size(3, 0, 0);
        assert_eq!(pattern.width(), 1);
        assert_eq!(pattern.height(), 1);
    }
}
