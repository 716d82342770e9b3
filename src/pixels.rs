//! A plain RGBA raster: four bytes per pixel, rows top to bottom, no
//! padding.  Whoever holds one owns it; rendering always produces a
//! new image rather than touching an existing one.

use std::fmt;

use errors::Error;

/// Opaque black, the colour of everything that maps off the source.
pub const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Bytes per pixel.
pub const CHANNELS: usize = 4;

/// An RGBA image.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) pixels: Vec<u8>,
}

fn buffer_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * CHANNELS
}

impl PixelImage {
    /// An image of the given size with every pixel set to `colour`.
    pub fn filled(width: u32, height: u32, colour: [u8; 4]) -> PixelImage {
        let count = (width as usize) * (height as usize);
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&colour);
        }
        PixelImage {
            width,
            height,
            pixels,
        }
    }

    /// Wraps an existing buffer, which must hold exactly
    /// `width * height * 4` bytes.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<PixelImage, Error> {
        let expected = buffer_len(width, height);
        if pixels.len() != expected {
            return Err(Error::BufferSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(PixelImage {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The bytes of one row.
    pub fn row_len(&self) -> usize {
        (self.width as usize) * CHANNELS
    }

    /// True if the image has no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// The raw RGBA bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Gives up the raw RGBA bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    /// The pixel at (x, y), if there is one.
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize) * self.row_len() + (x as usize) * CHANNELS;
        let p = &self.pixels[offset..offset + CHANNELS];
        Some([p[0], p[1], p[2], p[3]])
    }
}

impl fmt::Debug for PixelImage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PixelImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_checks_the_length() {
        assert!(PixelImage::from_raw(2, 2, vec![0; 16]).is_ok());
        assert_eq!(
            PixelImage::from_raw(2, 2, vec![0; 15]),
            Err(Error::BufferSize {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn get_is_row_major() {
        let raw: Vec<u8> = (0..24).collect();
        let img = PixelImage::from_raw(3, 2, raw).unwrap();
        assert_eq!(img.get(0, 0), Some([0, 1, 2, 3]));
        assert_eq!(img.get(2, 0), Some([8, 9, 10, 11]));
        assert_eq!(img.get(0, 1), Some([12, 13, 14, 15]));
        assert_eq!(img.get(3, 0), None);
        assert_eq!(img.get(0, 2), None);
    }

    #[test]
    fn filled() {
        let img = PixelImage::filled(3, 1, BLACK);
        assert_eq!(img.as_raw(), &[0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255][..]);
        assert!(PixelImage::filled(0, 5, BLACK).is_empty());
    }
}
