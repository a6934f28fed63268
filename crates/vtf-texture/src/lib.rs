//! Valve Texture Format (VTF) decoding.
//!
//! A VTF file holds a fixed header, a low-resolution thumbnail and the
//! high-resolution image data: every mip level, smallest first, each holding
//! every animation frame. This crate validates the header, locates the
//! full-resolution image of each frame and decodes it to 8-bit RGB or RGBA.
//!
//! # Supported Formats
//!
//! - `RGBA8888`, `ABGR8888`, `ARGB8888`, `BGRA8888`
//! - `RGB888`, `BGR888`, `RGB565`
//! - `I8`, `IA88`, `A8`
//! - `DXT1` (including one-bit alpha blocks), `DXT5`
//!
//! Cube maps and volume textures are not supported; only the first face and
//! slice of each frame are decoded.
//!
//! # Example
//!
//! ```no_run
//! use vtf_texture::{decode_with, DecodeOptions};
//!
//! let data = std::fs::read("sprite.vtf")?;
//! let animation = decode_with(&data, DecodeOptions::default(), |texture, first| {
//!     println!("{}x{} {}, first frame ready", texture.width, texture.height, texture.format);
//!     let _ = first.stride();
//! })?;
//!
//! for frame in &animation {
//!     let _rgba = frame.to_packed();
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod animation;
mod error;
mod format;
mod frame;
mod header;
mod loader;
mod mip;
mod options;

pub mod dxt;
pub mod pixel;

pub use animation::{decode, decode_with, Animation, AssemblyState, FrameAssembler};
pub use error::{Error, Result};
pub use format::{Footprint, ImageFormat};
pub use frame::{Frame, PixelLayout};
pub use header::{Texture, VtfHeader};
pub use loader::Loader;
pub use mip::{MipLayout, Region, FACE_COUNT};
pub use options::DecodeOptions;

/// VTF file signature ("VTF\0").
pub const VTF_MAGIC: &[u8; 4] = b"VTF\0";
