//! High-resolution image format tags.

use std::fmt;

use crate::dxt::{DXT1_BLOCK_SIZE, DXT5_BLOCK_SIZE};
use crate::frame::PixelLayout;

/// How a format spends bytes on its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Footprint {
    /// Fixed number of bytes per pixel.
    Pixel(usize),
    /// Fixed number of bytes per 4x4 block.
    Block(usize),
}

/// Pixel format tag stored in the VTF header.
///
/// Every value the container defines has a named variant so the set of
/// formats this crate decodes stays auditable. Only the variants for which
/// [`ImageFormat::is_supported`] returns `true` decode; the rest resolve to
/// [`Error::UnsupportedFormat`](crate::Error::UnsupportedFormat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    None,
    Rgba8888,
    Abgr8888,
    Rgb888,
    Bgr888,
    Rgb565,
    I8,
    Ia88,
    P8,
    A8,
    Rgb888Bluescreen,
    Bgr888Bluescreen,
    Argb8888,
    Bgra8888,
    Dxt1,
    Dxt3,
    Dxt5,
    Bgrx8888,
    Bgr565,
    Bgrx5551,
    Bgra4444,
    Dxt1OneBitAlpha,
    Bgra5551,
    Uv88,
    Uvwq8888,
    Rgba16161616F,
    Rgba16161616,
    Uvlx8888,
    /// A tag outside the enumeration.
    Unknown(u32),
}

impl ImageFormat {
    /// Map a raw header value to a format tag.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Rgba8888,
            1 => Self::Abgr8888,
            2 => Self::Rgb888,
            3 => Self::Bgr888,
            4 => Self::Rgb565,
            5 => Self::I8,
            6 => Self::Ia88,
            7 => Self::P8,
            8 => Self::A8,
            9 => Self::Rgb888Bluescreen,
            10 => Self::Bgr888Bluescreen,
            11 => Self::Argb8888,
            12 => Self::Bgra8888,
            13 => Self::Dxt1,
            14 => Self::Dxt3,
            15 => Self::Dxt5,
            16 => Self::Bgrx8888,
            17 => Self::Bgr565,
            18 => Self::Bgrx5551,
            19 => Self::Bgra4444,
            20 => Self::Dxt1OneBitAlpha,
            21 => Self::Bgra5551,
            22 => Self::Uv88,
            23 => Self::Uvwq8888,
            24 => Self::Rgba16161616F,
            25 => Self::Rgba16161616,
            26 => Self::Uvlx8888,
            u32::MAX => Self::None,
            other => Self::Unknown(other),
        }
    }

    /// The raw header value for this tag.
    pub fn raw(self) -> u32 {
        match self {
            Self::Rgba8888 => 0,
            Self::Abgr8888 => 1,
            Self::Rgb888 => 2,
            Self::Bgr888 => 3,
            Self::Rgb565 => 4,
            Self::I8 => 5,
            Self::Ia88 => 6,
            Self::P8 => 7,
            Self::A8 => 8,
            Self::Rgb888Bluescreen => 9,
            Self::Bgr888Bluescreen => 10,
            Self::Argb8888 => 11,
            Self::Bgra8888 => 12,
            Self::Dxt1 => 13,
            Self::Dxt3 => 14,
            Self::Dxt5 => 15,
            Self::Bgrx8888 => 16,
            Self::Bgr565 => 17,
            Self::Bgrx5551 => 18,
            Self::Bgra4444 => 19,
            Self::Dxt1OneBitAlpha => 20,
            Self::Bgra5551 => 21,
            Self::Uv88 => 22,
            Self::Uvwq8888 => 23,
            Self::Rgba16161616F => 24,
            Self::Rgba16161616 => 25,
            Self::Uvlx8888 => 26,
            Self::None => u32::MAX,
            Self::Unknown(raw) => raw,
        }
    }

    /// Storage cost of the format, or `None` if it is not decoded here.
    pub fn footprint(self) -> Option<Footprint> {
        match self {
            Self::Rgba8888 | Self::Abgr8888 | Self::Argb8888 | Self::Bgra8888 => {
                Some(Footprint::Pixel(4))
            }
            Self::Rgb888 | Self::Bgr888 => Some(Footprint::Pixel(3)),
            Self::Rgb565 | Self::Ia88 => Some(Footprint::Pixel(2)),
            Self::I8 | Self::A8 => Some(Footprint::Pixel(1)),
            Self::Dxt1 => Some(Footprint::Block(DXT1_BLOCK_SIZE)),
            Self::Dxt5 => Some(Footprint::Block(DXT5_BLOCK_SIZE)),
            _ => None,
        }
    }

    /// Channel layout of decoded frames, or `None` if the format is unsupported.
    pub fn layout(self) -> Option<PixelLayout> {
        match self {
            Self::Rgb888 | Self::Bgr888 | Self::Rgb565 | Self::I8 => Some(PixelLayout::Rgb),
            Self::Rgba8888
            | Self::Abgr8888
            | Self::Argb8888
            | Self::Bgra8888
            | Self::Ia88
            | Self::A8
            | Self::Dxt1
            | Self::Dxt5 => Some(PixelLayout::Rgba),
            _ => None,
        }
    }

    /// Whether frames in this format can be decoded.
    pub fn is_supported(self) -> bool {
        self.footprint().is_some()
    }

    /// Bytes used by one `width` x `height` slice, or 0 for unsupported formats.
    pub fn image_size(self, width: usize, height: usize) -> usize {
        match self.footprint() {
            Some(Footprint::Pixel(bytes)) => width.saturating_mul(height).saturating_mul(bytes),
            Some(Footprint::Block(bytes)) => width
                .div_ceil(4)
                .saturating_mul(height.div_ceil(4))
                .saturating_mul(bytes),
            None => 0,
        }
    }

    /// Conventional upper-case name of the format.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Rgba8888 => "RGBA8888",
            Self::Abgr8888 => "ABGR8888",
            Self::Rgb888 => "RGB888",
            Self::Bgr888 => "BGR888",
            Self::Rgb565 => "RGB565",
            Self::I8 => "I8",
            Self::Ia88 => "IA88",
            Self::P8 => "P8",
            Self::A8 => "A8",
            Self::Rgb888Bluescreen => "RGB888_BLUESCREEN",
            Self::Bgr888Bluescreen => "BGR888_BLUESCREEN",
            Self::Argb8888 => "ARGB8888",
            Self::Bgra8888 => "BGRA8888",
            Self::Dxt1 => "DXT1",
            Self::Dxt3 => "DXT3",
            Self::Dxt5 => "DXT5",
            Self::Bgrx8888 => "BGRX8888",
            Self::Bgr565 => "BGR565",
            Self::Bgrx5551 => "BGRX5551",
            Self::Bgra4444 => "BGRA4444",
            Self::Dxt1OneBitAlpha => "DXT1_ONEBITALPHA",
            Self::Bgra5551 => "BGRA5551",
            Self::Uv88 => "UV88",
            Self::Uvwq8888 => "UVWQ8888",
            Self::Rgba16161616F => "RGBA16161616F",
            Self::Rgba16161616 => "RGBA16161616",
            Self::Uvlx8888 => "UVLX8888",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.raw())
    }
}
