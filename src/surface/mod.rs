//! Image surfaces the pointer moves over
//!
//! A surface is a decoded picture with a fixed pixel size. Reads are
//! bounds-safe: coordinates past the edge are clamped onto it.

mod image;
mod pattern;

pub use image::{PixelSurface, SurfaceError};
pub use pattern::PatternSurface;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::info;

/// Default canvas size for generated pictures
pub const DEFAULT_CANVAS_WIDTH: u32 = 2000;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 1157;

/// An 8-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Arithmetic mean of the three channels (0-255)
    pub fn brightness(&self) -> f64 {
        (self.r as f64 + self.g as f64 + self.b as f64) / 3.0
    }

    /// Upper-case `#RRGGBB`
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// A readable picture
pub trait Surface: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Colour at `(x, y)`, clamped onto the picture
    fn read_pixel(&self, x: u32, y: u32) -> Rgb;
}

/// Convert an offset inside a view of `view_len` cells to a canvas coordinate
///
/// `floor(offset * canvas_len / view_len)`, clamped to the last pixel.
pub fn to_canvas(offset: u32, view_len: u32, canvas_len: u32) -> u32 {
    if view_len == 0 || canvas_len == 0 {
        return 0;
    }
    let scaled = (offset as u64 * canvas_len as u64) / view_len as u64;
    (scaled as u32).min(canvas_len - 1)
}

/// The picture to play: the PNG at `image` if given, else a pattern
///
/// A pattern without a `seed` gets a random one.
pub fn open_surface(
    image: Option<&Path>,
    seed: Option<u64>,
    max_dimension: u32,
) -> Result<Arc<dyn Surface>, SurfaceError> {
    match image {
        Some(path) => Ok(Arc::new(PixelSurface::open(path, max_dimension)?)),
        None => {
            let seed = seed.unwrap_or_else(rand::random);
            info!("generating pattern {}", seed);
            Ok(Arc::new(PatternSurface::new(seed)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_is_upper_case() {
        assert_eq!(Rgb::new(255, 10, 171).hex(), "#FF0AAB");
        assert_eq!(Rgb::default().hex(), "#000000");
    }

    #[test]
    fn test_rgb_display() {
        assert_eq!(Rgb::new(1, 22, 255).to_string(), "(1, 22, 255)");
    }

    #[test]
    fn test_brightness() {
        assert_eq!(Rgb::new(0, 0, 0).brightness(), 0.0);
        assert_eq!(Rgb::new(255, 255, 255).brightness(), 255.0);
        assert_eq!(Rgb::new(30, 60, 90).brightness(), 60.0);
    }

    #[test]
    fn test_to_canvas() {
        // 80 cells over a 2000 px canvas
        assert_eq!(to_canvas(0, 80, 2000), 0);
        assert_eq!(to_canvas(40, 80, 2000), 1000);
        assert_eq!(to_canvas(79, 80, 2000), 1975);
        assert_eq!(to_canvas(80, 80, 2000), 1999);
        assert_eq!(to_canvas(3, 0, 2000), 0);
    }

    #[test]
    fn test_open_surface_pattern() {
        let a = open_surface(None, Some(9), 2000).unwrap();
        let b = open_surface(None, Some(9), 2000).unwrap();
        assert_eq!((a.width(), a.height()), (DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT));
        assert_eq!(a.read_pixel(321, 654), b.read_pixel(321, 654));
    }

    #[test]
    fn test_open_surface_missing_file() {
        let result = open_surface(Some(Path::new("/nonexistent/picture.png")), None, 2000);
        assert!(matches!(result, Err(SurfaceError::Io(_))));
    }
}
