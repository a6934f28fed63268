//! Incremental accumulation of a VTF file.
//!
//! The image data is located by measuring back from the end of the file, so
//! nothing can be decoded until every byte has arrived. [`Loader`] buffers
//! chunks as they come in and decodes once the caller signals the end.

use tracing::{debug, trace};

use crate::animation::decode_with;
use crate::{Animation, DecodeOptions, Error, Frame, Result, Texture};

/// Accumulates a VTF file chunk by chunk.
///
/// # Example
///
/// ```no_run
/// use vtf_texture::Loader;
///
/// let data = std::fs::read("sprite.vtf")?;
///
/// let mut loader = Loader::new()?;
/// for chunk in data.chunks(4096) {
///     loader.push(chunk)?;
/// }
/// let animation = loader.finish()?;
/// println!("{} frames", animation.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct Loader {
    buffer: Vec<u8>,
}

impl Loader {
    /// Bytes reserved up front by [`Loader::new`].
    pub const INITIAL_CAPACITY: usize = 1_000_000;

    /// Create a loader with [`Loader::INITIAL_CAPACITY`] bytes reserved.
    pub fn new() -> Result<Self> {
        Self::with_capacity(Self::INITIAL_CAPACITY)
    }

    /// Create a loader with `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve(capacity)
            .map_err(|_| Error::ResourceExhaustion { requested: capacity })?;
        Ok(Self { buffer })
    }

    /// Number of bytes received so far.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append a chunk of the file.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        self.buffer.try_reserve(chunk.len()).map_err(|_| Error::ResourceExhaustion {
            requested: self.buffer.len().saturating_add(chunk.len()),
        })?;
        self.buffer.extend_from_slice(chunk);
        trace!(received = chunk.len(), buffered = self.buffer.len(), "buffered VTF chunk");
        Ok(())
    }

    /// Decode the accumulated file with default options.
    pub fn finish(self) -> Result<Animation> {
        self.finish_with(DecodeOptions::default(), |_, _| {})
    }

    /// Decode the accumulated file, calling `on_ready` once frame 0 is
    /// available. The buffer is released whether or not decoding succeeds.
    pub fn finish_with<F>(self, options: DecodeOptions, on_ready: F) -> Result<Animation>
    where
        F: FnOnce(&Texture, &Frame),
    {
        debug!(bytes = self.buffer.len(), "decoding buffered VTF file");
        decode_with(&self.buffer, options, on_ready)
    }
}
