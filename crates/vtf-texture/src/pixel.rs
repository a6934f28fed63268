//! Per-format pixel decoding.

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use crate::dxt;
use crate::format::ImageFormat;
use crate::frame::Frame;
use crate::{DecodeOptions, Error, Result};

/// Expand a packed 5:6:5 color to 8 bits per channel.
///
/// Each field is shifted into the high bits and OR-ed with its own top bits
/// shifted down by a full byte width, as Source tools do.
pub fn expand_rgb565(color: u16) -> [u8; 3] {
    let r = (color >> 11) & 31;
    let g = (color >> 5) & 63;
    let b = color & 31;
    [
        ((r << 3) | (r >> 5)) as u8,
        ((g << 2) | (g >> 6)) as u8,
        ((b << 3) | (b >> 5)) as u8,
    ]
}

/// Decode one `width` x `height` image stored in `format`.
///
/// `data` must hold at least one full image; only its first
/// [`ImageFormat::image_size`] bytes are read.
pub fn decode_image(
    format: ImageFormat,
    width: usize,
    height: usize,
    data: &[u8],
    options: &DecodeOptions,
) -> Result<Frame> {
    let layout = format
        .layout()
        .ok_or(Error::UnsupportedFormat(format.raw()))?;

    let needed = format.image_size(width, height);
    if data.len() < needed {
        return Err(Error::CorruptContainer(format!(
            "{format} image of {width}x{height} needs {needed} bytes, got {}",
            data.len()
        )));
    }

    let mut frame = Frame::new(width, height, layout, options)?;
    trace!(%format, width, height, stride = frame.stride(), "decoding image");

    match format {
        ImageFormat::Rgba8888 => unpack::<4>(data, &mut frame, |s, d| d.copy_from_slice(s)),
        ImageFormat::Abgr8888 => unpack::<4>(data, &mut frame, |s, d| {
            d.copy_from_slice(&[s[3], s[2], s[1], s[0]])
        }),
        ImageFormat::Rgb888 => unpack::<3>(data, &mut frame, |s, d| d.copy_from_slice(s)),
        ImageFormat::Bgr888 => unpack::<3>(data, &mut frame, |s, d| {
            d.copy_from_slice(&[s[2], s[1], s[0]])
        }),
        ImageFormat::Rgb565 => unpack::<2>(data, &mut frame, |s, d| {
            d.copy_from_slice(&expand_rgb565(LittleEndian::read_u16(s)))
        }),
        ImageFormat::I8 => unpack::<1>(data, &mut frame, |s, d| d.fill(s[0])),
        ImageFormat::Ia88 => unpack::<2>(data, &mut frame, |s, d| {
            d.copy_from_slice(&[s[0], s[0], s[0], s[1]])
        }),
        ImageFormat::A8 => unpack::<1>(data, &mut frame, |s, d| {
            d.copy_from_slice(&[255, 255, 255, s[0]])
        }),
        ImageFormat::Argb8888 => unpack::<4>(data, &mut frame, |s, d| {
            d.copy_from_slice(&[s[1], s[2], s[3], s[0]])
        }),
        ImageFormat::Bgra8888 => unpack::<4>(data, &mut frame, |s, d| {
            d.copy_from_slice(&[s[2], s[1], s[0], s[3]])
        }),
        ImageFormat::Dxt1 => dxt::decode_dxt1(data, &mut frame)?,
        ImageFormat::Dxt5 => dxt::decode_dxt5(data, &mut frame)?,
        other => return Err(Error::UnsupportedFormat(other.raw())),
    }

    Ok(frame)
}

/// Convert packed `N`-byte source pixels row by row into `frame`.
fn unpack<const N: usize>(data: &[u8], frame: &mut Frame, convert: impl Fn(&[u8], &mut [u8])) {
    let (width, height, channels) = (frame.width(), frame.height(), frame.channels());
    if width == 0 {
        return;
    }

    for (y, src_row) in data.chunks_exact(width * N).take(height).enumerate() {
        let dst_row = frame.row_mut(y);
        for (src, dst) in src_row.chunks_exact(N).zip(dst_row.chunks_exact_mut(channels)) {
            convert(src, dst);
        }
    }
}
