//! VTF header structures.

use tracing::{debug, warn};
use vtf_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::format::ImageFormat;
use crate::{Error, Result, VTF_MAGIC};

/// Fixed-layout VTF file header, as stored on disk.
///
/// Version 7.2 files pad this to 80 bytes; only the fields up to and
/// including `depth` are read.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct VtfHeader {
    /// File signature ("VTF\0").
    pub signature: [u8; 4],
    /// Major and minor version.
    pub version: [u32; 2],
    /// Size of the header on disk, thumbnail excluded.
    pub header_size: u32,
    /// Width of the largest mipmap in pixels.
    pub width: u16,
    /// Height of the largest mipmap in pixels.
    pub height: u16,
    /// Texture flags.
    pub flags: u32,
    /// Number of animation frames.
    pub frames: u16,
    /// First frame of the animation.
    pub first_frame: u16,
    /// Padding before the reflectivity vector.
    pub padding0: [u8; 4],
    /// Reflectivity vector.
    pub reflectivity: [f32; 3],
    /// Padding after the reflectivity vector.
    pub padding1: [u8; 4],
    /// Bumpmap scale.
    pub bumpmap_scale: f32,
    /// High resolution image format tag.
    pub high_res_image_format: u32,
    /// Number of mipmap levels.
    pub mipmap_count: u8,
    /// Thumbnail image format tag (usually DXT1).
    pub low_res_image_format: u32,
    /// Thumbnail width.
    pub low_res_image_width: u8,
    /// Thumbnail height.
    pub low_res_image_height: u8,
    /// Depth of the largest mipmap (7.2 and later).
    pub depth: u16,
}

impl VtfHeader {
    /// Number of bytes occupied by the fixed fields.
    pub const SIZE: usize = std::mem::size_of::<VtfHeader>();

    /// Bytes of fixed fields before 7.2, which ends at the thumbnail height.
    pub const LEGACY_SIZE: usize = 63;

    /// First version that stores a meaningful depth.
    pub const DEPTH_VERSION: u32 = 0x0702;

    /// Combine a major and minor version into one comparable code.
    pub const fn version_code(major: u32, minor: u32) -> u32 {
        major.saturating_mul(256).saturating_add(minor)
    }

    /// Number of fixed-field bytes a header of this version carries.
    pub const fn fields_len(version_code: u32) -> usize {
        if version_code < Self::DEPTH_VERSION {
            Self::LEGACY_SIZE
        } else {
            Self::SIZE
        }
    }
}

/// Validated texture descriptor derived from a [`VtfHeader`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texture {
    /// Major and minor version.
    pub version: (u32, u32),
    /// Header size as declared by the file.
    pub header_size: u32,
    pub width: u16,
    pub height: u16,
    /// Volume depth, always at least 1.
    pub depth: u16,
    /// Number of animation frames, always at least 1.
    pub frames: u16,
    pub first_frame: u16,
    pub flags: u32,
    pub reflectivity: [f32; 3],
    pub bumpmap_scale: f32,
    pub mipmap_count: u8,
    /// Format of the high-resolution image data.
    pub format: ImageFormat,
    /// Format of the thumbnail (never decoded).
    pub low_res_format: ImageFormat,
    pub low_res_width: u8,
    pub low_res_height: u8,
}

impl Texture {
    /// Check if data starts with the VTF signature.
    pub fn is_vtf(data: &[u8]) -> bool {
        data.starts_with(VTF_MAGIC)
    }

    /// Parse and validate the header at the start of `data`.
    ///
    /// Only the signature and the frame count are validated. Depth is forced
    /// to 1 for containers older than 7.2 and when stored as 0. Headers older
    /// than 7.2 only need their first [`VtfHeader::LEGACY_SIZE`] bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        reader.expect_magic(VTF_MAGIC)?;
        let major = reader.read_u32()?;
        let minor = reader.read_u32()?;

        let needed = VtfHeader::fields_len(VtfHeader::version_code(major, minor));
        let available = data.len().min(VtfHeader::SIZE);
        if available < needed {
            return Err(Error::CorruptContainer(format!(
                "version {major}.{minor} header needs {needed} bytes, got {}",
                data.len()
            )));
        }

        // Fields past the end of a short legacy header read as zero.
        let mut raw = [0u8; VtfHeader::SIZE];
        raw[..available].copy_from_slice(&data[..available]);
        let header: VtfHeader = BinaryReader::new(&raw).read_struct()?;
        Self::from_header(&header)
    }

    /// Combined version code, comparable with [`VtfHeader::DEPTH_VERSION`].
    pub fn version_code(&self) -> u32 {
        VtfHeader::version_code(self.version.0, self.version.1)
    }

    /// Validate an already decoded header.
    pub fn from_header(header: &VtfHeader) -> Result<Self> {
        if header.signature != *VTF_MAGIC {
            let signature = header.signature;
            return Err(Error::CorruptContainer(format!(
                "invalid signature {signature:?}"
            )));
        }
        if header.frames == 0 {
            return Err(Error::CorruptContainer("frame count is zero".into()));
        }

        let [major, minor] = header.version;
        let depth = if VtfHeader::version_code(major, minor) < VtfHeader::DEPTH_VERSION {
            1
        } else if header.depth == 0 {
            warn!(major, minor, "depth is zero, treating as 1");
            1
        } else {
            header.depth
        };

        let texture = Self {
            version: (major, minor),
            header_size: header.header_size,
            width: header.width,
            height: header.height,
            depth,
            frames: header.frames,
            first_frame: header.first_frame,
            flags: header.flags,
            reflectivity: header.reflectivity,
            bumpmap_scale: header.bumpmap_scale,
            mipmap_count: header.mipmap_count,
            format: ImageFormat::from_raw(header.high_res_image_format),
            low_res_format: ImageFormat::from_raw(header.low_res_image_format),
            low_res_width: header.low_res_image_width,
            low_res_height: header.low_res_image_height,
        };

        debug!(
            version = ?texture.version,
            width = texture.width,
            height = texture.height,
            depth = texture.depth,
            frames = texture.frames,
            mipmaps = texture.mipmap_count,
            format = %texture.format,
            "parsed VTF header"
        );

        Ok(texture)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use zerocopy::FromZeros;

    /// A 7.2 header with a single RGBA8888 frame and mip.
    pub(crate) fn header(width: u16, height: u16) -> VtfHeader {
        let mut header = VtfHeader::new_zeroed();
        header.signature = *VTF_MAGIC;
        header.version = [7, 2];
        header.header_size = 80;
        header.width = width;
        header.height = height;
        header.frames = 1;
        header.reflectivity = [0.5, 0.5, 0.5];
        header.bumpmap_scale = 1.0;
        header.high_res_image_format = ImageFormat::Rgba8888.raw();
        header.mipmap_count = 1;
        header.low_res_image_format = ImageFormat::Dxt1.raw();
        header.depth = 1;
        header
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(VtfHeader::SIZE, 65);

        let mut header = header(16, 8);
        header.depth = 0x0302;
        header.mipmap_count = 5;
        let bytes = header.as_bytes();
        assert_eq!(&bytes[0..4], b"VTF\0");
        assert_eq!(&bytes[16..18], &16u16.to_le_bytes());
        assert_eq!(&bytes[18..20], &8u16.to_le_bytes());
        assert_eq!(bytes[56], 5);
        assert_eq!(&bytes[63..65], &[0x02, 0x03]);
    }

    #[test]
    fn test_parse_valid() {
        let mut data = header(32, 16).as_bytes().to_vec();
        data.resize(80, 0);

        let texture = Texture::parse(&data).unwrap();
        assert_eq!(texture.version, (7, 2));
        assert_eq!(texture.width, 32);
        assert_eq!(texture.height, 16);
        assert_eq!(texture.frames, 1);
        assert_eq!(texture.depth, 1);
        assert_eq!(texture.format, ImageFormat::Rgba8888);
        assert_eq!(texture.low_res_format, ImageFormat::Dxt1);
        assert_eq!(texture.reflectivity, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_bad_signature() {
        let mut header = header(4, 4);
        header.signature = *b"VTF1";
        let err = Texture::parse(header.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::CorruptContainer(_)));

        assert!(matches!(
            Texture::parse(b"VT").unwrap_err(),
            Error::CorruptContainer(_)
        ));
    }

    #[test]
    fn test_zero_frames() {
        let mut header = header(4, 4);
        header.frames = 0;
        let err = Texture::parse(header.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::CorruptContainer(_)));
    }

    #[test]
    fn test_truncated_header() {
        let bytes = header(4, 4).as_bytes()[..40].to_vec();
        let err = Texture::parse(&bytes).unwrap_err();
        assert!(matches!(err, Error::CorruptContainer(_)));
    }

    #[test]
    fn test_signature_error_names_magic() {
        let mut bytes = header(4, 4).as_bytes().to_vec();
        bytes[..4].copy_from_slice(b"DDS ");
        match Texture::parse(&bytes).unwrap_err() {
            Error::CorruptContainer(message) => assert!(message.contains("magic"), "{message}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_legacy_header_without_depth() {
        let mut header = header(4, 4);
        header.version = [7, 1];
        header.depth = 9;

        let short = &header.as_bytes()[..VtfHeader::LEGACY_SIZE];
        let texture = Texture::parse(short).unwrap();
        assert_eq!(texture.version_code(), 0x0701);
        assert_eq!(texture.depth, 1);
        assert_eq!(texture.low_res_format, ImageFormat::Dxt1);

        assert!(Texture::parse(&short[..VtfHeader::LEGACY_SIZE - 1]).is_err());

        // A 7.2 header must carry the depth field.
        header.version = [7, 2];
        let err = Texture::parse(&header.as_bytes()[..64]).unwrap_err();
        assert!(matches!(err, Error::CorruptContainer(_)));
    }

    #[test]
    fn test_depth_normalization() {
        let mut header = header(4, 4);
        header.depth = 4;
        assert_eq!(Texture::from_header(&header).unwrap().depth, 4);

        header.version = [7, 1];
        assert_eq!(Texture::from_header(&header).unwrap().depth, 1);

        header.version = [7, 2];
        header.depth = 0;
        assert_eq!(Texture::from_header(&header).unwrap().depth, 1);
    }

    #[test]
    fn test_unknown_format_is_not_a_parse_error() {
        let mut header = header(4, 4);
        header.high_res_image_format = 99;
        let texture = Texture::from_header(&header).unwrap();
        assert_eq!(texture.format, ImageFormat::Unknown(99));
    }
}
