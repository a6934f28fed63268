//! Assembly of decoded frames into an animation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::header::Texture;
use crate::mip::{MipLayout, Region};
use crate::pixel::decode_image;
use crate::{DecodeOptions, Error, Frame, Result};

/// An ordered, looping sequence of decoded frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    texture: Texture,
    frames: Vec<Frame>,
    looping: bool,
}

impl Animation {
    /// Width declared by the container.
    pub fn width(&self) -> usize {
        usize::from(self.texture.width)
    }

    /// Height declared by the container.
    pub fn height(&self) -> usize {
        usize::from(self.texture.height)
    }

    /// The descriptor the frames were decoded from.
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl<'a> IntoIterator for &'a Animation {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Progress of a [`FrameAssembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    HeaderParsed,
    DecodingFrame(usize),
    FrameReady(usize),
    Complete,
    Failed,
}

/// Decodes every frame of a complete VTF buffer in order.
///
/// The header, format and data region are validated when the assembler is
/// created, before any frame is decoded, so a file that is known to be bad
/// never reaches the ready notification.
#[derive(Debug)]
pub struct FrameAssembler<'a> {
    data: &'a [u8],
    texture: Texture,
    layout: MipLayout,
    region: Region,
    options: DecodeOptions,
    state: AssemblyState,
    decoded: Arc<AtomicUsize>,
}

impl<'a> FrameAssembler<'a> {
    /// Parse the header of `data` and locate its image data.
    pub fn new(data: &'a [u8], options: DecodeOptions) -> Result<Self> {
        let texture = Texture::parse(data)?;
        if !texture.format.is_supported() {
            return Err(Error::UnsupportedFormat(texture.format.raw()));
        }

        let layout = MipLayout::new(&texture);
        let region = layout.locate(data.len())?;
        if region.start < texture.header_size as usize {
            warn!(
                start = region.start,
                header_size = texture.header_size,
                "image data starts inside the declared header"
            );
        }

        Ok(Self {
            data,
            texture,
            layout,
            region,
            options,
            state: AssemblyState::HeaderParsed,
            decoded: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn layout(&self) -> &MipLayout {
        &self.layout
    }

    /// Where the high-resolution image data sits in the buffer.
    pub fn region(&self) -> Region {
        self.region
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    /// Shared count of frames decoded so far, readable while assembly runs.
    pub fn progress(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.decoded)
    }

    /// Decode frame `index` at full resolution.
    fn decode_frame(&self, index: usize) -> Result<Frame> {
        let frame_region = self.layout.frame_region(index, 0).offset_by(self.region.start);
        let bytes = frame_region.slice(self.data)?;

        decode_image(
            self.texture.format,
            usize::from(self.texture.width),
            usize::from(self.texture.height),
            bytes,
            &self.options,
        )
    }

    /// Decode all frames in order.
    ///
    /// `on_ready` is called exactly once, with frame 0, as soon as that frame
    /// is decoded and before any later frame is. On error no frames are
    /// returned.
    pub fn assemble<F>(&mut self, on_ready: F) -> Result<Animation>
    where
        F: FnOnce(&Texture, &Frame),
    {
        let result = self.run(on_ready);
        self.state = match result {
            Ok(_) => AssemblyState::Complete,
            Err(_) => AssemblyState::Failed,
        };
        debug!(state = ?self.state, "frame assembly finished");
        result
    }

    fn run<F>(&mut self, on_ready: F) -> Result<Animation>
    where
        F: FnOnce(&Texture, &Frame),
    {
        let count = usize::from(self.texture.frames);
        let mut frames = Vec::new();
        frames
            .try_reserve_exact(count)
            .map_err(|_| Error::ResourceExhaustion {
                requested: count.saturating_mul(std::mem::size_of::<Frame>()),
            })?;

        let mut on_ready = Some(on_ready);
        for index in 0..count {
            self.state = AssemblyState::DecodingFrame(index);
            let frame = self.decode_frame(index)?;
            self.state = AssemblyState::FrameReady(index);
            self.decoded.fetch_add(1, Ordering::Release);
            trace!(index, "frame decoded");

            if let Some(notify) = on_ready.take() {
                notify(&self.texture, &frame);
            }
            frames.push(frame);
        }

        Ok(Animation {
            texture: self.texture,
            frames,
            looping: true,
        })
    }
}

/// Decode a complete VTF file with default options.
pub fn decode(data: &[u8]) -> Result<Animation> {
    decode_with(data, DecodeOptions::default(), |_, _| {})
}

/// Decode a complete VTF file, calling `on_ready` once frame 0 is available.
pub fn decode_with<F>(data: &[u8], options: DecodeOptions, on_ready: F) -> Result<Animation>
where
    F: FnOnce(&Texture, &Frame),
{
    let mut assembler = FrameAssembler::new(data, options)?;
    assembler.assemble(on_ready)
}
