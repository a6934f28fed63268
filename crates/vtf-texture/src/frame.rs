//! Decoded frame buffers.

use crate::{DecodeOptions, Error, Result};

/// Channel layout of a decoded frame. Every channel is 8 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    Rgb,
    Rgba,
}

impl PixelLayout {
    /// Number of channels per pixel.
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// Whether the layout carries an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba)
    }
}

/// One decoded image at full resolution.
///
/// Rows are `stride` bytes apart; the bytes between the last pixel of a row
/// and the next row are padding and stay zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    layout: PixelLayout,
    stride: usize,
    pixels: Vec<u8>,
}

impl Frame {
    /// Allocate a zeroed frame.
    pub fn new(
        width: usize,
        height: usize,
        layout: PixelLayout,
        options: &DecodeOptions,
    ) -> Result<Self> {
        let stride = options.stride_for(width.saturating_mul(layout.channels()));
        let len = stride.saturating_mul(height);

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| Error::ResourceExhaustion { requested: len })?;
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            layout,
            stride,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Number of channels per pixel.
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Distance in bytes between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The whole buffer, row padding included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel bytes of row `y`, without padding.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.pixels[start..start + self.width * self.channels()]
    }

    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.stride;
        let len = self.width * self.channels();
        &mut self.pixels[start..start + len]
    }

    /// Channels of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let channels = self.channels();
        let start = y * self.stride + x * channels;
        &self.pixels[start..start + channels]
    }

    pub(crate) fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        let channels = self.channels();
        let start = y * self.stride + x * channels;
        &mut self.pixels[start..start + channels]
    }

    /// Copy the pixels into a tightly packed buffer.
    pub fn to_packed(&self) -> Vec<u8> {
        let row_bytes = self.width * self.channels();
        if row_bytes == self.stride {
            return self.pixels.clone();
        }

        let mut packed = Vec::with_capacity(row_bytes * self.height);
        for y in 0..self.height {
            packed.extend_from_slice(self.row(y));
        }
        packed
    }

    /// Convert to an [`image::DynamicImage`].
    #[cfg(feature = "image")]
    pub fn to_image(&self) -> image::DynamicImage {
        use image::{DynamicImage, ImageBuffer, Rgb, Rgba};

        let (width, height) = (self.width as u32, self.height as u32);
        match self.layout {
            PixelLayout::Rgb => {
                DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
                    let p = self.pixel(x as usize, y as usize);
                    Rgb([p[0], p[1], p[2]])
                }))
            }
            PixelLayout::Rgba => {
                DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| {
                    let p = self.pixel(x as usize, y as usize);
                    Rgba([p[0], p[1], p[2], p[3]])
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_padding() {
        let mut frame = Frame::new(3, 2, PixelLayout::Rgb, &DecodeOptions::default()).unwrap();
        assert_eq!(frame.stride(), 12);
        assert_eq!(frame.as_bytes().len(), 24);

        frame.row_mut(0).fill(0xAA);
        frame.pixel_mut(2, 1).copy_from_slice(&[1, 2, 3]);

        assert_eq!(frame.pixel(2, 1), &[1, 2, 3]);
        assert_eq!(&frame.as_bytes()[9..12], &[0, 0, 0]);

        let packed = frame.to_packed();
        assert_eq!(packed.len(), 18);
        assert_eq!(&packed[..9], &[0xAA; 9]);
        assert_eq!(&packed[15..], &[1, 2, 3]);
    }

    #[test]
    fn test_packed_rows() {
        let frame = Frame::new(5, 3, PixelLayout::Rgba, &DecodeOptions::packed()).unwrap();
        assert_eq!(frame.stride(), 20);
        assert_eq!(frame.channels(), 4);
        assert!(frame.layout().has_alpha());
        assert_eq!(frame.to_packed(), frame.as_bytes());
    }

    #[test]
    fn test_allocation_failure() {
        let err =
            Frame::new(usize::MAX / 2, 4, PixelLayout::Rgba, &DecodeOptions::packed()).unwrap_err();
        assert!(matches!(err, Error::ResourceExhaustion { .. }));
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_to_image() {
        let mut frame = Frame::new(2, 1, PixelLayout::Rgba, &DecodeOptions::default()).unwrap();
        frame.pixel_mut(1, 0).copy_from_slice(&[9, 8, 7, 6]);

        let image = frame.to_image().to_rgba8();
        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.get_pixel(1, 0).0, [9, 8, 7, 6]);
    }
}
