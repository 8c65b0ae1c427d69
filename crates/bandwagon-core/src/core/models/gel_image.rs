use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Gel image buffer holds {found} pixels but {width}x{height} needs {expected}")]
pub struct GelImageError {
    pub width: usize,
    pub height: usize,
    pub expected: usize,
    pub found: usize,
}

/// A grayscale picture of a real gel lane, drawn next to the simulated bands.
///
/// Pixels are row-major, top row first, `0` black and `255` white.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GelImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl GelImage {
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, GelImageError> {
        let expected = width * height;
        if pixels.len() != expected || expected == 0 {
            return Err(GelImageError {
                width,
                height,
                expected,
                found: pixels.len(),
            });
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

    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks(self.width)
    }
}
