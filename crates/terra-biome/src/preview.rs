//! Preview images for biome weights and splat maps.

use std::path::Path;

use crate::{SplatMap, WeightMap};

/// Errors raised while encoding or writing a preview.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// The image has no pixels.
    #[error("cannot encode an empty preview")]
    Empty,
    /// PNG encoding failed.
    #[error("failed to encode preview: {0}")]
    Encode(#[from] png::EncodingError),
    /// Writing the file failed.
    #[error("failed to write preview: {0}")]
    Io(#[from] std::io::Error),
}

/// An RGBA preview image, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl PreviewImage {
    /// A transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Grayscale rendering of a weight map; weight 1 is white.
    pub fn from_weights(weights: &WeightMap) -> Self {
        let size = weights.resolution();
        let mut image = Self::new(size, size);
        for y in 0..size {
            for x in 0..size {
                let v = to_byte(weights.get(x, y));
                image.set_pixel(x, y, [v, v, v, 255]);
            }
        }
        image
    }

    /// Blends each biome's color by its splat weight.
    ///
    /// Missing colors render as black; cells no biome claims stay transparent.
    pub fn from_splat(splat: &SplatMap, colors: &[[u8; 3]]) -> Self {
        let size = splat.resolution();
        let mut image = Self::new(size, size);
        for y in 0..size {
            for x in 0..size {
                let weights = splat.weights_at(x, y);
                if weights.iter().all(|w| *w <= 0.0) {
                    continue;
                }
                let mut rgb = [0.0f64; 3];
                for (i, w) in weights.iter().enumerate() {
                    let color = colors.get(i).copied().unwrap_or([0, 0, 0]);
                    for (acc, c) in rgb.iter_mut().zip(color) {
                        *acc += *w * c as f64;
                    }
                }
                image.set_pixel(
                    x,
                    y,
                    [
                        rgb[0].round().clamp(0.0, 255.0) as u8,
                        rgb[1].round().clamp(0.0, 255.0) as u8,
                        rgb[2].round().clamp(0.0, 255.0) as u8,
                        255,
                    ],
                );
            }
        }
        image
    }

    /// Set a single pixel's RGBA value.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let idx = self.index(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Get a pixel's RGBA value.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = self.index(x, y);
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Encodes the image as an 8-bit RGBA PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, PreviewError> {
        if self.width == 0 || self.height == 0 {
            return Err(PreviewError::Empty);
        }

        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(out)
    }

    /// Encodes the image and writes it to `path`.
    pub fn write_png(&self, path: &Path) -> Result<(), PreviewError> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height);
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }
}

fn to_byte(weight: f64) -> u8 {
    (weight.clamp(0.0, 1.0) * 255.0).round() as u8
}
