//! Mipmap addressing inside the high-resolution image data.
//!
//! VTF stores mip levels smallest first. Within a level, every frame is
//! stored in turn, each frame holding its faces and each face its depth
//! slices. The thumbnail sits between the header and this data and is never
//! sized here: the data region is found by measuring it from the end of the
//! file instead.

use tracing::debug;

use crate::format::ImageFormat;
use crate::header::{Texture, VtfHeader};
use crate::{Error, Result};

/// Number of faces per frame. Cube maps are not supported.
pub const FACE_COUNT: usize = 1;

/// A byte range within a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub start: usize,
    pub length: usize,
}

impl Region {
    pub const fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// One past the last byte. Saturates instead of overflowing.
    pub const fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    /// The same range moved forward by `base` bytes.
    pub const fn offset_by(self, base: usize) -> Self {
        Self::new(self.start.saturating_add(base), self.length)
    }

    /// Borrow the bytes of this region, failing if it runs past `data`.
    pub fn slice<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        let end = self.end();
        if end > data.len() {
            return Err(Error::CorruptContainer(format!(
                "bytes {}..{} out of bounds (buffer size: {})",
                self.start,
                end,
                data.len()
            )));
        }
        Ok(&data[self.start..end])
    }
}

/// Computes the size and position of every mip, frame, face and slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipLayout {
    width: u32,
    height: u32,
    depth: u32,
    frames: usize,
    mipmap_count: u32,
    format: ImageFormat,
    header_len: usize,
}

impl MipLayout {
    pub fn new(texture: &Texture) -> Self {
        Self {
            width: u32::from(texture.width),
            height: u32::from(texture.height),
            depth: u32::from(texture.depth),
            frames: usize::from(texture.frames),
            mipmap_count: u32::from(texture.mipmap_count),
            format: texture.format,
            header_len: VtfHeader::fields_len(texture.version_code()),
        }
    }

    /// Number of mip levels.
    pub fn mipmap_count(&self) -> u32 {
        self.mipmap_count
    }

    /// Width, height and depth of a mip level, each at least 1.
    pub fn mip_dimensions(&self, level: u32) -> (usize, usize, usize) {
        let shrink = |value: u32| value.checked_shr(level).unwrap_or(0).max(1) as usize;
        (shrink(self.width), shrink(self.height), shrink(self.depth))
    }

    /// Bytes used by one frame and face of a mip level whose largest level
    /// has the given depth. Unsupported formats occupy 0 bytes.
    pub fn mip_size(&self, level: u32, depth: u32) -> usize {
        let (width, height, _) = self.mip_dimensions(level);
        let mip_depth = depth.checked_shr(level).unwrap_or(0).max(1) as usize;
        self.format
            .image_size(width, height)
            .saturating_mul(mip_depth)
    }

    /// Bytes used by all frames and faces of every level smaller than `level`.
    fn smaller_mips_len(&self, first: u32) -> usize {
        (first..self.mipmap_count)
            .map(|i| self.mip_size(i, self.depth))
            .fold(0usize, usize::saturating_add)
            .saturating_mul(self.frames.saturating_mul(FACE_COUNT))
    }

    /// Offset of a frame, face and slice of a mip level, relative to the
    /// start of the high-resolution data.
    pub fn offset(&self, frame: usize, face: usize, slice: usize, level: u32) -> usize {
        let volume_bytes = self.mip_size(level, self.depth);
        let slice_bytes = self.mip_size(level, 1);

        self.smaller_mips_len(level.saturating_add(1))
            .saturating_add(volume_bytes.saturating_mul(frame * FACE_COUNT + face))
            .saturating_add(slice_bytes.saturating_mul(slice))
    }

    /// The bytes of one frame of a mip level, all depth slices included,
    /// relative to the start of the high-resolution data.
    pub fn frame_region(&self, frame: usize, level: u32) -> Region {
        Region::new(
            self.offset(frame, 0, 0, level),
            self.mip_size(level, self.depth),
        )
    }

    /// Total length of the high-resolution data across all levels and frames.
    pub fn data_len(&self) -> usize {
        self.smaller_mips_len(0)
    }

    /// Locate the high-resolution data in a complete file of `buffer_len`
    /// bytes. The data ends where the file ends.
    pub fn locate(&self, buffer_len: usize) -> Result<Region> {
        let length = self.data_len();
        if length > buffer_len {
            return Err(Error::CorruptContainer(format!(
                "image data needs {length} bytes but the file holds {buffer_len}"
            )));
        }

        let start = buffer_len - length;
        if start < self.header_len {
            return Err(Error::CorruptContainer(format!(
                "image data starting at {start} overlaps the header"
            )));
        }

        debug!(start, length, "located high-resolution image data");
        Ok(Region::new(start, length))
    }
}
