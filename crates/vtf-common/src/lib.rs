//! Common utilities for VTF decoding.
//!
//! This crate provides the foundational types shared by the VTF crates:
//!
//! - [`BinaryReader`] - Zero-copy little-endian reading from byte slices
//! - [`Error`] - Errors raised while reading past the end of a buffer or
//!   matching magic bytes

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::BinaryReader;
