//! Image data as fetched or as an RGBA pixel buffer

use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("PNG decoding failed: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("Unsupported PNG format: {0}")]
    Unsupported(String),

    #[error("Pixel data has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// RGBA8 pixels, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, value: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        if let Some(px) = self.rgba.get_mut(i..i + 4) {
            px.copy_from_slice(&value);
        }
    }

    /// Decode a PNG into RGBA8
    pub fn decode_png(bytes: &[u8]) -> Result<Self, ImageError> {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;
        let mut buffer = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buffer)?;
        let data = &buffer[..info.buffer_size()];

        let rgba = match info.color_type {
            png::ColorType::Rgba => data.to_vec(),
            png::ColorType::Rgb => {
                let mut rgba = Vec::with_capacity(data.len() / 3 * 4);
                for chunk in data.chunks_exact(3) {
                    rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
                }
                rgba
            }
            png::ColorType::Grayscale => {
                let mut rgba = Vec::with_capacity(data.len() * 4);
                for value in data {
                    rgba.extend_from_slice(&[*value, *value, *value, 255]);
                }
                rgba
            }
            png::ColorType::GrayscaleAlpha => {
                let mut rgba = Vec::with_capacity(data.len() / 2 * 4);
                for chunk in data.chunks_exact(2) {
                    rgba.extend_from_slice(&[chunk[0], chunk[0], chunk[0], chunk[1]]);
                }
                rgba
            }
            other => return Err(ImageError::Unsupported(format!("{:?}", other))),
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            rgba,
        })
    }

    /// Encode as an 8-bit RGBA PNG
    pub fn encode_png(&self) -> Result<Vec<u8>, ImageError> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.rgba.len() != expected {
            return Err(ImageError::BufferSize {
                expected,
                actual: self.rgba.len(),
            });
        }

        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.rgba)?;
            writer.finish()?;
        }
        Ok(out)
    }
}

/// An image as the host delivered it, or as pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Image {
    /// Encoded source bytes (PNG)
    Encoded(Vec<u8>),
    Pixels(PixelBuffer),
}

impl Image {
    pub fn is_pixels(&self) -> bool {
        matches!(self, Image::Pixels(_))
    }

    pub fn into_pixels(self) -> Result<PixelBuffer, ImageError> {
        match self {
            Image::Encoded(bytes) => PixelBuffer::decode_png(&bytes),
            Image::Pixels(pixels) => Ok(pixels),
        }
    }

    pub fn into_encoded(self) -> Result<Vec<u8>, ImageError> {
        match self {
            Image::Encoded(bytes) => Ok(bytes),
            Image::Pixels(pixels) => pixels.encode_png(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_round_trip_preserves_pixels() {
        let mut pixels = PixelBuffer::new(2, 2);
        pixels.set_pixel(1, 0, [255, 0, 0, 255]);
        pixels.set_pixel(0, 1, [0, 0, 255, 128]);

        let decoded = PixelBuffer::decode_png(&pixels.encode_png().unwrap()).unwrap();
        assert_eq!(decoded, pixels);
        assert_eq!(decoded.pixel(1, 0), Some([255, 0, 0, 255]));
        assert_eq!(decoded.pixel(2, 0), None);
    }

    #[test]
    fn test_wrong_buffer_size() {
        let pixels = PixelBuffer {
            width: 4,
            height: 4,
            rgba: vec![0; 3],
        };
        assert!(matches!(
            pixels.encode_png(),
            Err(ImageError::BufferSize { expected: 64, actual: 3 })
        ));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        assert!(Image::Encoded(b"not a png".to_vec()).into_pixels().is_err());
    }
}
