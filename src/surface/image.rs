//! Decoded PNG pictures

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info};
use thiserror::Error;

use super::{Rgb, Surface};

/// Errors while loading a picture
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to open image: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode PNG: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("unsupported PNG colour type {0:?}")]
    UnsupportedColor(png::ColorType),

    #[error("image has no pixels")]
    Empty,

    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// An in-memory RGB picture
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelSurface {
    /// Build a surface from row-major pixels
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::Empty);
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(SurfaceError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    /// Caller guarantees non-zero sides and `pixels.len() == width * height`
    pub(super) fn from_parts(width: u32, height: u32, pixels: Vec<Rgb>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self { width, height, pixels }
    }

    /// Build a surface by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgb) -> Result<Self, SurfaceError> {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self::new(width, height, pixels)
    }

    /// Load a PNG file, shrinking it so neither side exceeds `max_dimension`
    pub fn open(path: &Path, max_dimension: u32) -> Result<Self, SurfaceError> {
        let file = File::open(path)?;
        let surface = Self::decode(BufReader::new(file))?;
        info!(
            "loaded {:?} ({}x{})",
            path,
            surface.width(),
            surface.height()
        );
        Ok(surface.fit_within(max_dimension))
    }

    /// Decode PNG data of any colour type into 8-bit RGB
    pub fn decode<R: Read>(reader: R) -> Result<Self, SurfaceError> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(png::Transformations::normalize_to_color8());
        let mut reader = decoder.read_info()?;

        let mut buf = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buf)?;
        let bytes = &buf[..frame.buffer_size()];

        let pixels: Vec<Rgb> = match frame.color_type {
            png::ColorType::Rgb => bytes.chunks_exact(3).map(|p| Rgb::new(p[0], p[1], p[2])).collect(),
            png::ColorType::Rgba => bytes.chunks_exact(4).map(|p| Rgb::new(p[0], p[1], p[2])).collect(),
            png::ColorType::Grayscale => bytes.iter().map(|&v| Rgb::new(v, v, v)).collect(),
            png::ColorType::GrayscaleAlpha => {
                bytes.chunks_exact(2).map(|p| Rgb::new(p[0], p[0], p[0])).collect()
            }
            other => return Err(SurfaceError::UnsupportedColor(other)),
        };

        Self::new(frame.width, frame.height, pixels)
    }

    /// Scale down (never up) so the longer side is at most `max_dimension`
    pub fn fit_within(self, max_dimension: u32) -> Self {
        let longest = self.width.max(self.height);
        if max_dimension == 0 || longest <= max_dimension {
            return self;
        }
        let factor = max_dimension as f64 / longest as f64;
        let width = ((self.width as f64 * factor).round() as u32).max(1);
        let height = ((self.height as f64 * factor).round() as u32).max(1);
        self.resize(width, height)
    }

    /// Nearest-neighbour resample to `width` x `height`
    pub fn resize(&self, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        debug!("resizing {}x{} -> {}x{}", self.width, self.height, width, height);

        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            let src_y = (y as u64 * self.height as u64 / height as u64) as u32;
            for x in 0..width {
                let src_x = (x as u64 * self.width as u64 / width as u64) as u32;
                pixels.push(self.read_pixel(src_x, src_y));
            }
        }
        Self { width, height, pixels }
    }
}

impl Surface for PixelSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn read_pixel(&self, x: u32, y: u32) -> Rgb {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        self.pixels[y * self.width as usize + x]
    }
}
