//! Frame: a grid of RGB pixels destined for the panel.
//!
//! Pixels are stored in a contiguous `Vec` in row-major order:
//! `index = y * width + x`. All compositing operates on whole frames
//! of identical dimensions.

use super::color::Rgb;
use crate::error::Result;

/// A grid of RGB pixels representing one panel image.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Contiguous pixel storage (row-major order).
    pixels: Vec<Rgb>,
    /// Panel width in pixels.
    width: u32,
    /// Panel height in pixels.
    height: u32,
}

impl Frame {
    /// Create a new all-black frame with the given dimensions.
    ///
    /// # Panics
    /// Panics if width or height is 0.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgb::BLACK)
    }

    /// Create a frame filled with a solid color.
    ///
    /// # Panics
    /// Panics if width or height is 0.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        assert!(width > 0 && height > 0, "Frame dimensions must be non-zero");
        let size = (width as usize) * (height as usize);
        Self {
            pixels: vec![color; size],
            width,
            height,
        }
    }

    /// Get the frame width.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Get the frame height.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Get the total number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Check if the frame is empty (never true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Get a reference to the underlying pixel slice.
    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Get a mutable reference to the underlying pixel slice.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    /// Convert (x, y) coordinates to a linear index.
    ///
    /// Returns `None` if coordinates are out of bounds.
    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Get the pixel at (x, y).
    ///
    /// Returns `None` if coordinates are out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        self.index_of(x, y).map(|i| self.pixels[i])
    }

    /// Set the pixel at (x, y).
    ///
    /// Returns `false` if coordinates are out of bounds.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Rgb) -> bool {
        if let Some(idx) = self.index_of(x, y) {
            self.pixels[idx] = color;
            true
        } else {
            false
        }
    }

    /// Fill the entire frame with one color.
    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Fill a rectangle, clipped to the frame bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for row in y.min(self.height)..y_end {
            let start = (row as usize) * (self.width as usize) + (x as usize);
            let end = (row as usize) * (self.width as usize) + (x_end as usize);
            self.pixels[start..end].fill(color);
        }
    }

    /// Composite `overlay` onto this frame by per-channel maximum.
    ///
    /// # Panics
    /// Panics if the dimensions differ.
    pub fn composite_max(&self, overlay: &Self) -> Self {
        assert_eq!(
            (self.width, self.height),
            (overlay.width, overlay.height),
            "composite dimensions must match"
        );
        let pixels = self
            .pixels
            .iter()
            .zip(&overlay.pixels)
            .map(|(base, over)| base.lighten(*over))
            .collect();
        Self {
            pixels,
            width: self.width,
            height: self.height,
        }
    }

    /// Per-pixel linear interpolation from `self` toward `other`.
    ///
    /// Bit-exact at the endpoints, like [`Rgb::lerp`].
    ///
    /// # Panics
    /// Panics if the dimensions differ.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "lerp dimensions must match"
        );
        let pixels = self
            .pixels
            .iter()
            .zip(&other.pixels)
            .map(|(a, b)| a.lerp(*b, t))
            .collect();
        Self {
            pixels,
            width: self.width,
            height: self.height,
        }
    }

    /// Copy the frame into an [`image::RgbImage`].
    pub fn to_image(&self) -> image::RgbImage {
        let mut img = image::RgbImage::new(self.width, self.height);
        for (i, pixel) in self.pixels.iter().enumerate() {
            let x = (i % self.width as usize) as u32;
            let y = (i / self.width as usize) as u32;
            img.put_pixel(x, y, image::Rgb([pixel.r, pixel.g, pixel.b]));
        }
        img
    }

    /// Build a frame from an [`image::RgbImage`].
    pub fn from_image(img: &image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| Rgb::new(p[0], p[1], p[2]))
            .collect();
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Encode the frame as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(std::io::Cursor::new(&mut bytes));
        self.to_image().write_with_encoder(encoder)?;
        Ok(bytes)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
