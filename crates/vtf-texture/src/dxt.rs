//! DXT1 and DXT5 block decompression.
//!
//! Both formats encode 4x4 texel blocks. Blocks are stored in raster order
//! across the image and texels in raster order within a block. Blocks that
//! straddle the right or bottom edge are clipped to the image.

use vtf_common::BinaryReader;

use crate::frame::Frame;
use crate::pixel::expand_rgb565;
use crate::Result;

/// Decoded RGBA texels of one block, in raster order.
pub type BlockTexels = [[u8; 4]; 16];

/// Bytes per DXT1 block.
pub const DXT1_BLOCK_SIZE: usize = 8;

/// Bytes per DXT5 block.
pub const DXT5_BLOCK_SIZE: usize = 16;

fn mix(a: u8, b: u8, wa: u16, wb: u16, rounding: u16, divisor: u16) -> u8 {
    ((wa * u16::from(a) + wb * u16::from(b) + rounding) / divisor) as u8
}

/// Read the two endpoint colors and the selector bits of a color sub-block
/// and build its palette.
///
/// With `one_bit_alpha`, a block whose first endpoint is not greater than the
/// second uses three colors plus transparent black.
fn read_color_block(
    reader: &mut BinaryReader<'_>,
    one_bit_alpha: bool,
) -> Result<([[u8; 4]; 4], u32)> {
    let c0 = reader.read_u16()?;
    let c1 = reader.read_u16()?;
    let [r0, g0, b0] = expand_rgb565(c0);
    let [r1, g1, b1] = expand_rgb565(c1);

    let blend = |w0, w1, rounding, divisor| {
        [
            mix(r0, r1, w0, w1, rounding, divisor),
            mix(g0, g1, w0, w1, rounding, divisor),
            mix(b0, b1, w0, w1, rounding, divisor),
            255,
        ]
    };

    let mut palette = [[r0, g0, b0, 255], [r1, g1, b1, 255], [0; 4], [0; 4]];
    if c0 > c1 || !one_bit_alpha {
        palette[2] = blend(4, 2, 3, 6);
        palette[3] = blend(2, 4, 3, 6);
    } else {
        palette[2] = blend(1, 1, 1, 2);
        // palette[3] stays transparent black.
    }

    let selector = reader.read_u32()?;
    Ok((palette, selector))
}

/// Decode one 8-byte DXT1 block.
pub fn decode_dxt1_block(reader: &mut BinaryReader<'_>) -> Result<BlockTexels> {
    let (palette, mut selector) = read_color_block(reader, true)?;

    let mut texels = [[0u8; 4]; 16];
    for texel in &mut texels {
        *texel = palette[(selector & 3) as usize];
        selector >>= 2;
    }
    Ok(texels)
}

/// Build the eight-entry alpha palette of a DXT5 block.
fn alpha_palette(a0: u8, a1: u8) -> [u8; 8] {
    let mut alpha = [a0, a1, 0, 0, 0, 0, 0, 255];
    if a0 > a1 {
        for (i, value) in alpha[2..].iter_mut().enumerate() {
            let w1 = 2 * (i as u16 + 1);
            *value = mix(a0, a1, 14 - w1, w1, 7, 14);
        }
    } else {
        for (i, value) in alpha[2..6].iter_mut().enumerate() {
            let w1 = 2 * (i as u16 + 1);
            *value = mix(a0, a1, 10 - w1, w1, 5, 10);
        }
    }
    alpha
}

/// Decode one 16-byte DXT5 block: an alpha sub-block followed by a color
/// sub-block without the one-bit alpha mode.
pub fn decode_dxt5_block(reader: &mut BinaryReader<'_>) -> Result<BlockTexels> {
    let a0 = reader.read_u8()?;
    let a1 = reader.read_u8()?;
    let alpha = alpha_palette(a0, a1);
    let mut alpha_selector = reader.read_u48()?;

    let mut texels = [[0u8; 4]; 16];
    for texel in &mut texels {
        texel[3] = alpha[(alpha_selector & 7) as usize];
        alpha_selector >>= 3;
    }

    let (palette, mut selector) = read_color_block(reader, false)?;
    for texel in &mut texels {
        let [r, g, b, _] = palette[(selector & 3) as usize];
        texel[..3].copy_from_slice(&[r, g, b]);
        selector >>= 2;
    }
    Ok(texels)
}

/// Decode every block of a mip image into `frame`.
fn decode_blocks(
    data: &[u8],
    frame: &mut Frame,
    decode_block: fn(&mut BinaryReader<'_>) -> Result<BlockTexels>,
) -> Result<()> {
    let (width, height) = (frame.width(), frame.height());
    let mut reader = BinaryReader::new(data);

    for block_y in 0..height.div_ceil(4) {
        for block_x in 0..width.div_ceil(4) {
            let texels = decode_block(&mut reader)?;

            for (i, texel) in texels.iter().enumerate() {
                let x = block_x * 4 + i % 4;
                let y = block_y * 4 + i / 4;
                if x < width && y < height {
                    frame.pixel_mut(x, y).copy_from_slice(texel);
                }
            }
        }
    }
    Ok(())
}

/// Decode a DXT1 mip image into an RGBA frame.
pub fn decode_dxt1(data: &[u8], frame: &mut Frame) -> Result<()> {
    decode_blocks(data, frame, decode_dxt1_block)
}

/// Decode a DXT5 mip image into an RGBA frame.
pub fn decode_dxt5(data: &[u8], frame: &mut Frame) -> Result<()> {
    decode_blocks(data, frame, decode_dxt5_block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelLayout;
    use crate::{DecodeOptions, Error};

    fn dxt1_block(c0: u16, c1: u16, selector: u32) -> Vec<u8> {
        let mut block = Vec::with_capacity(8);
        block.extend_from_slice(&c0.to_le_bytes());
        block.extend_from_slice(&c1.to_le_bytes());
        block.extend_from_slice(&selector.to_le_bytes());
        block
    }

    fn dxt5_block(a0: u8, a1: u8, alpha_selector: u64, c0: u16, c1: u16, selector: u32) -> Vec<u8> {
        let mut block = vec![a0, a1];
        block.extend_from_slice(&alpha_selector.to_le_bytes()[..6]);
        block.extend(dxt1_block(c0, c1, selector));
        block
    }

    fn decode_one(
        block: &[u8],
        decode: fn(&mut BinaryReader<'_>) -> Result<BlockTexels>,
    ) -> BlockTexels {
        let mut reader = BinaryReader::new(block);
        let texels = decode(&mut reader).unwrap();
        assert!(reader.is_empty());
        texels
    }

    #[test]
    fn test_dxt1_opaque_white() {
        let texels = decode_one(&dxt1_block(0xFFFF, 0x0000, 0), decode_dxt1_block);
        let [r, g, b] = expand_rgb565(0xFFFF);
        assert!(texels.iter().all(|t| *t == [r, g, b, 255]));
    }

    #[test]
    fn test_dxt1_four_color_palette() {
        // Texel i selects palette entry i % 4.
        let texels = decode_one(&dxt1_block(0xF800, 0x001F, 0xE4E4_E4E4), decode_dxt1_block);
        assert_eq!(texels[0], [248, 0, 0, 255]);
        assert_eq!(texels[1], [0, 0, 248, 255]);
        assert_eq!(texels[2], [165, 0, 83, 255]);
        assert_eq!(texels[3], [83, 0, 165, 255]);
        assert_eq!(texels[14], texels[2]);
    }

    #[test]
    fn test_dxt1_one_bit_alpha() {
        let texels = decode_one(&dxt1_block(0x0000, 0xFFFF, 0xFFFF_FFFF), decode_dxt1_block);
        assert!(texels.iter().all(|t| *t == [0, 0, 0, 0]));

        let texels = decode_one(&dxt1_block(0x001F, 0xF800, 0xAAAA_AAAA), decode_dxt1_block);
        assert!(texels.iter().all(|t| *t == [124, 0, 124, 255]));
    }

    #[test]
    fn test_dxt5_opaque_alpha() {
        let texels = decode_one(&dxt5_block(255, 0, 0, 0xFFFF, 0, 0), decode_dxt5_block);
        assert!(texels.iter().all(|t| t[3] == 255));
    }

    #[test]
    fn test_dxt5_alpha_palettes() {
        assert_eq!(alpha_palette(255, 0), [255, 0, 219, 182, 146, 109, 73, 36]);
        assert_eq!(alpha_palette(0, 255), [0, 255, 51, 102, 153, 204, 0, 255]);
        assert_eq!(alpha_palette(7, 7), [7, 7, 7, 7, 7, 7, 0, 255]);
    }

    #[test]
    fn test_dxt5_selectors_and_color() {
        // Alpha index 7 for the first texel, 1 for the second, 0 elsewhere.
        let alpha_selector = 0b001_111;
        let texels = decode_one(
            &dxt5_block(0, 255, alpha_selector, 0x0000, 0xF800, 0xFFFF_FFFF),
            decode_dxt5_block,
        );
        assert_eq!(texels[0][3], 255);
        assert_eq!(texels[1][3], 255);
        assert_eq!(texels[2][3], 0);
        // c0 < c1 still interpolates: entry 3 is (2*c0 + 4*c1 + 3) / 6.
        assert_eq!(&texels[5][..3], &[165, 0, 0]);
    }

    #[test]
    fn test_decode_blocks_raster_order() {
        // 8x4 image: a white block followed by a black one.
        let mut data = dxt1_block(0xFFFF, 0x0000, 0);
        data.extend(dxt1_block(0xFFFF, 0x0000, 0x5555_5555));

        let mut frame = Frame::new(8, 4, PixelLayout::Rgba, &DecodeOptions::default()).unwrap();
        decode_dxt1(&data, &mut frame).unwrap();

        assert_eq!(frame.pixel(3, 3), &[248, 252, 248, 255]);
        assert_eq!(frame.pixel(4, 0), &[0, 0, 0, 255]);
        assert_eq!(frame.pixel(7, 3), &[0, 0, 0, 255]);
    }

    #[test]
    fn test_partial_blocks_are_clipped() {
        let data = dxt5_block(128, 128, 0, 0xFFFF, 0, 0);
        let mut frame = Frame::new(2, 1, PixelLayout::Rgba, &DecodeOptions::packed()).unwrap();
        decode_dxt5(&data, &mut frame).unwrap();

        assert_eq!(frame.as_bytes(), &[248, 252, 248, 128, 248, 252, 248, 128]);
    }

    #[test]
    fn test_truncated_data() {
        let data = dxt1_block(0, 0, 0);
        let mut frame = Frame::new(8, 8, PixelLayout::Rgba, &DecodeOptions::default()).unwrap();
        let err = decode_dxt1(&data, &mut frame).unwrap_err();
        assert!(matches!(err, Error::CorruptContainer(_)));
    }
}
