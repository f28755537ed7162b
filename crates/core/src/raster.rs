//! RGBA8 image buffer.
//!
//! Used for the fractal engine's cached escape-time image and as the backing
//! store of [`PixelSurface`](crate::surface::PixelSurface).

use crate::color::Rgba;
use crate::error::EngineError;

/// Row-major RGBA8 pixel buffer (`width * height * 4` bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Raster {
    /// Creates a raster filled with `color`.
    pub fn new(width: usize, height: usize, color: Rgba) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)?;
        let px = color.to_rgba8();
        let mut pixels = Vec::with_capacity(len);
        for _ in 0..width * height {
            pixels.extend_from_slice(&px);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Overwrites a pixel; out-of-range coordinates are ignored.
    pub fn put_pixel(&mut self, x: usize, y: usize, px: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * 4;
        self.pixels[i..i + 4].copy_from_slice(&px);
    }

    /// Source-over blends `color` onto a pixel.
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        if color.a >= 1.0 {
            self.put_pixel(x, y, color.to_rgba8());
            return;
        }
        if color.a <= 0.0 {
            return;
        }
        if let Some(dst) = self.pixel(x, y) {
            let out = color.over(Rgba::from_rgba8(dst));
            self.put_pixel(x, y, out.to_rgba8());
        }
    }

    /// Mutable rows, for writers that fill the image line by line.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = (usize, &mut [u8])> {
        self.pixels.chunks_exact_mut(self.width * 4).enumerate()
    }

    pub fn fill(&mut self, color: Rgba) {
        let px = color.to_rgba8();
        self.pixels
            .chunks_exact_mut(4)
            .for_each(|chunk| chunk.copy_from_slice(&px));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_with_color() {
        let r = Raster::new(3, 2, Rgba::rgb(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(r.pixels().len(), 3 * 2 * 4);
        assert_eq!(r.pixel(2, 1), Some([255, 0, 0, 255]));
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(Raster::new(0, 4, Rgba::BLACK).is_err());
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut r = Raster::new(2, 2, Rgba::BLACK).unwrap();
        r.put_pixel(5, 5, [1, 2, 3, 4]);
        assert_eq!(r.pixel(5, 5), None);
        assert!(r.pixels().chunks(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn half_alpha_blend_mixes_channels() {
        let mut r = Raster::new(1, 1, Rgba::BLACK).unwrap();
        r.blend_pixel(0, 0, Rgba::new(1.0, 1.0, 1.0, 0.5));
        let [red, _, _, a] = r.pixel(0, 0).unwrap();
        assert!((127..=128).contains(&red));
        assert_eq!(a, 255);
    }

    #[test]
    fn rows_mut_covers_every_row() {
        let mut r = Raster::new(4, 3, Rgba::BLACK).unwrap();
        for (y, row) in r.rows_mut() {
            row[0] = y as u8;
        }
        assert_eq!(r.pixel(0, 2).unwrap()[0], 2);
    }
}
