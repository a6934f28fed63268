//! Error types for VTF decoding.

use thiserror::Error;

/// Errors that can occur when decoding a VTF file.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad signature, zero frames, truncated header, or image data that does
    /// not fit the buffer.
    #[error("VTF file corrupt or incomplete: {0}")]
    CorruptContainer(String),

    /// The high-resolution image format is not one this decoder implements.
    #[error("unsupported VTF image format {0}")]
    UnsupportedFormat(u32),

    /// A pixel or input buffer could not be allocated.
    #[error("not enough memory: failed to reserve {requested} bytes")]
    ResourceExhaustion { requested: usize },
}

impl From<vtf_common::Error> for Error {
    fn from(err: vtf_common::Error) -> Self {
        Error::CorruptContainer(err.to_string())
    }
}

/// Result type for VTF operations.
pub type Result<T> = std::result::Result<T, Error>;
