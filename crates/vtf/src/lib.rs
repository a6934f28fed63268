//! VTF - Valve Texture Format decoding library.
//!
//! This crate provides a unified interface to the VTF crates.
//!
//! # Crates
//!
//! - [`vtf_common`] - Common utilities (little-endian binary reading)
//! - [`vtf_texture`] - Header parsing, mip addressing and pixel decoding
//!
//! # Example
//!
//! ```no_run
//! use vtf::prelude::*;
//!
//! let data = std::fs::read("materials/sprites/glow.vtf")?;
//!
//! if vtf::is_vtf(&data) {
//!     let animation = decode(&data)?;
//!     println!("{}x{}, {} frames", animation.width(), animation.height(), animation.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use vtf_common as common;
pub use vtf_texture as texture;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use vtf_common::BinaryReader;
    pub use vtf_texture::{
        decode, decode_with, Animation, DecodeOptions, Frame, FrameAssembler, ImageFormat,
        Loader, MipLayout, PixelLayout, Region, Texture,
    };
}

// Re-export commonly used types at the crate root
pub use vtf_texture::{Error, Result};

/// Metadata a host image loader needs to register the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub mime_types: &'static [&'static str],
    pub extensions: &'static [&'static str],
    /// Bytes every file starts with.
    pub signature: &'static [u8],
    pub license: &'static str,
}

/// Registration metadata for VTF.
pub const FORMAT_INFO: FormatInfo = FormatInfo {
    name: "vtf",
    description: "Valve Texture format",
    mime_types: &["image/x-vtf"],
    extensions: &["vtf"],
    signature: vtf_texture::VTF_MAGIC,
    license: "MIT",
};

/// Check if data starts with the VTF signature.
pub fn is_vtf(data: &[u8]) -> bool {
    vtf_texture::Texture::is_vtf(data)
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_info() {
        assert_eq!(FORMAT_INFO.signature, b"VTF\0");
        assert_eq!(FORMAT_INFO.mime_types, &["image/x-vtf"]);
        assert!(FORMAT_INFO.extensions.contains(&"vtf"));
    }

    #[test]
    fn test_is_vtf() {
        assert!(is_vtf(b"VTF\0\x07\0\0\0"));
        assert!(!is_vtf(b"DDS |"));
        assert!(!is_vtf(b"VT"));
    }
}
