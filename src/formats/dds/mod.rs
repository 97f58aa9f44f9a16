//! .dds texture container
//!
//! Spore ships its textures as stock DirectDraw Surface files with one
//! exporter quirk: uncompressed 32-bit RGBA surfaces carry fourCC 0 with
//! pixel flags `RGB|ALPHAPIXELS`, and the rest of the pipeline identifies
//! them by the D3D format code 0x15.

mod reader;
mod writer;

pub use reader::{parse_dds_bytes, read_dds};
pub use writer::{serialize_dds, write_dds};

use crate::error::{Error, Result};
use std::ops::Range;

/// "DDS " magic signature (little-endian)
pub const DDS_SIGNATURE: u32 = 0x2053_4444;

/// Size of the magic plus the header block
pub const HEADER_SIZE: usize = 128;

/// Header flag bits (`DDSD_*`)
pub mod flags {
    pub const CAPS: u32 = 0x1;
    pub const HEIGHT: u32 = 0x2;
    pub const WIDTH: u32 = 0x4;
    pub const PITCH: u32 = 0x8;
    pub const PIXEL_FORMAT: u32 = 0x1000;
    pub const MIPMAP_COUNT: u32 = 0x2_0000;
    pub const LINEAR_SIZE: u32 = 0x8_0000;
    pub const DEPTH: u32 = 0x80_0000;
}

/// Pixel-format flag bits (`DDPF_*`)
pub mod pixel_flags {
    pub const ALPHA_PIXELS: u32 = 0x1;
    pub const FOUR_CC: u32 = 0x4;
    pub const RGB: u32 = 0x40;
}

/// Four-character codes for the supported pixel formats
pub mod four_cc {
    pub const DXT1: u32 = u32::from_le_bytes(*b"DXT1");
    pub const DXT2: u32 = u32::from_le_bytes(*b"DXT2");
    pub const DXT3: u32 = u32::from_le_bytes(*b"DXT3");
    pub const DXT4: u32 = u32::from_le_bytes(*b"DXT4");
    pub const DXT5: u32 = u32::from_le_bytes(*b"DXT5");
    pub const ATI1: u32 = u32::from_le_bytes(*b"ATI1");
    pub const ATI2: u32 = u32::from_le_bytes(*b"ATI2");
    pub const RGBG: u32 = u32::from_le_bytes(*b"RGBG");
    pub const GRGB: u32 = u32::from_le_bytes(*b"GRGB");
    pub const UYVY: u32 = u32::from_le_bytes(*b"UYVY");
    /// `D3DFMT_A8R8G8B8`, the code Spore uses for uncompressed surfaces
    pub const UNCOMPRESSED: u32 = 0x15;
}

/// Pixel formats the mip arithmetic understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Dxt1,
    Dxt2,
    Dxt3,
    Dxt4,
    Dxt5,
    /// Single-channel block compression (BC4)
    Ati1,
    /// Two-channel block compression (BC5)
    Ati2,
    Rgbg,
    Grgb,
    Uyvy,
    /// 32-bit RGBA, tagged 0x15 by the game's exporter
    Uncompressed,
}

impl TextureFormat {
    /// Resolve a format code as stored in Raster files or DDS headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFourCc`] for any code this library cannot
    /// compute mip sizes for.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            four_cc::DXT1 => Ok(Self::Dxt1),
            four_cc::DXT2 => Ok(Self::Dxt2),
            four_cc::DXT3 => Ok(Self::Dxt3),
            four_cc::DXT4 => Ok(Self::Dxt4),
            four_cc::DXT5 => Ok(Self::Dxt5),
            four_cc::ATI1 => Ok(Self::Ati1),
            four_cc::ATI2 => Ok(Self::Ati2),
            four_cc::RGBG => Ok(Self::Rgbg),
            four_cc::GRGB => Ok(Self::Grgb),
            four_cc::UYVY => Ok(Self::Uyvy),
            four_cc::UNCOMPRESSED => Ok(Self::Uncompressed),
            _ => Err(Error::UnsupportedFourCc { four_cc: code }),
        }
    }

    /// The format code stored in Raster headers (0x15 for uncompressed).
    pub fn code(self) -> u32 {
        match self {
            Self::Dxt1 => four_cc::DXT1,
            Self::Dxt2 => four_cc::DXT2,
            Self::Dxt3 => four_cc::DXT3,
            Self::Dxt4 => four_cc::DXT4,
            Self::Dxt5 => four_cc::DXT5,
            Self::Ati1 => four_cc::ATI1,
            Self::Ati2 => four_cc::ATI2,
            Self::Rgbg => four_cc::RGBG,
            Self::Grgb => four_cc::GRGB,
            Self::Uyvy => four_cc::UYVY,
            Self::Uncompressed => four_cc::UNCOMPRESSED,
        }
    }

    /// Bytes per 4x4 block, or `None` for formats that are not
    /// block-compressed.
    pub fn block_size(self) -> Option<usize> {
        match self {
            Self::Dxt1 | Self::Ati1 => Some(8),
            Self::Dxt2 | Self::Dxt3 | Self::Dxt4 | Self::Dxt5 | Self::Ati2 => Some(16),
            _ => None,
        }
    }

    /// Byte size of one mip level of the given dimensions.
    ///
    /// Block-compressed sizes round the dimensions up to a multiple of 4
    /// first, so odd base sizes (25x25 and the like) still land on whole
    /// blocks, with a floor of one block per level.
    pub fn mip_size(self, width: u32, height: u32) -> usize {
        match self.block_size() {
            Some(block) => {
                let blocks_w = (fix_size(width) / 4).max(1) as usize;
                let blocks_h = (fix_size(height) / 4).max(1) as usize;
                blocks_w * blocks_h * block
            }
            None => match self {
                Self::Rgbg | Self::Grgb | Self::Uyvy => width as usize * height as usize * 2,
                // Raster payloads are 8 bits per pixel regardless of the
                // 32-bit mask layout the header advertises.
                _ => width as usize * height as usize,
            },
        }
    }

    /// `pitchOrLinearSize` for the top-level surface.
    ///
    /// Block-compressed formats use the full product form
    /// (`blocks_w * blocks_h * blockSize`) rather than the per-row pitch;
    /// that is what third-party readers of these files expect.
    pub fn linear_size(self, width: u32, height: u32) -> u32 {
        match self.block_size() {
            Some(block) => width.div_ceil(4) * height.div_ceil(4) * block as u32,
            None => match self {
                Self::Rgbg | Self::Grgb | Self::Uyvy => width * height * 2,
                _ => width * height * 4,
            },
        }
    }
}

/// Round a dimension up to the next multiple of 4.
fn fix_size(size: u32) -> u32 {
    size.div_ceil(4) * 4
}

/// The 32-byte pixel-format block nested in a DDS header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdsPixelFormat {
    /// Struct size, 32 in every known file
    pub size: u32,
    pub flags: u32,
    pub four_cc: u32,
    pub rgb_bit_count: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    pub const SIZE: u32 = 32;

    /// The pixel format the game's exporter writes for `format`.
    pub fn for_format(format: TextureFormat) -> Self {
        let (flags, four_cc) = if format == TextureFormat::Uncompressed {
            (pixel_flags::RGB | pixel_flags::ALPHA_PIXELS, 0)
        } else {
            (pixel_flags::FOUR_CC, format.code())
        };
        Self {
            size: Self::SIZE,
            flags,
            four_cc,
            rgb_bit_count: 32,
            r_bit_mask: 0x00FF_0000,
            g_bit_mask: 0x0000_FF00,
            b_bit_mask: 0x0000_00FF,
            a_bit_mask: 0xFF00_0000,
        }
    }

    /// Effective format code. FourCC 0 with flags `RGB|ALPHAPIXELS` resolves
    /// to the uncompressed sentinel 0x15.
    pub fn format_code(&self) -> u32 {
        if self.four_cc == 0 && self.flags == (pixel_flags::RGB | pixel_flags::ALPHA_PIXELS) {
            four_cc::UNCOMPRESSED
        } else {
            self.four_cc
        }
    }

    /// Resolve the effective format code to a [`TextureFormat`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFourCc`] if the code is not supported.
    pub fn format(&self) -> Result<TextureFormat> {
        TextureFormat::from_code(self.format_code())
    }
}

/// The 124-byte header following the "DDS " magic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdsHeader {
    /// Struct size, 0x7C in every known file
    pub size: u32,
    pub flags: u32,
    pub height: u32,
    pub width: u32,
    pub pitch_or_linear_size: u32,
    pub depth: u32,
    pub mip_map_count: u32,
    pub pixel_format: DdsPixelFormat,
    pub caps: u32,
    pub caps2: u32,
    pub caps3: u32,
    pub caps4: u32,
}

impl DdsHeader {
    /// Value of the `size` field
    pub const SIZE: u32 = 0x7C;

    /// Flags the game's exporter sets on every texture
    pub const DEFAULT_FLAGS: u32 = flags::CAPS
        | flags::HEIGHT
        | flags::WIDTH
        | flags::PIXEL_FORMAT
        | flags::MIPMAP_COUNT
        | flags::LINEAR_SIZE;

    /// Dimensions of a mip level: halved per level, floored at 1.
    pub fn mip_dimensions(&self, level: u32) -> (u32, u32) {
        (
            self.width.checked_shr(level).unwrap_or(0).max(1),
            self.height.checked_shr(level).unwrap_or(0).max(1),
        )
    }

    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFourCc`] for formats outside the table.
    pub fn format(&self) -> Result<TextureFormat> {
        self.pixel_format.format()
    }
}

/// A DDS texture: header plus every mip level in one contiguous buffer.
///
/// Mip boundaries are never stored. They are recomputed from the header
/// on each access, so editing the header cannot leave stale offsets behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdsTexture {
    pub header: DdsHeader,
    /// All mip levels, largest first, back to back
    pub data: Vec<u8>,
}

impl DdsTexture {
    /// Build a texture with the header the game's exporter would write.
    ///
    /// `data` must hold every mip level concatenated largest-first.
    pub fn new(
        width: u32,
        height: u32,
        mipmap_count: u32,
        format: TextureFormat,
        data: Vec<u8>,
    ) -> Self {
        let header = DdsHeader {
            size: DdsHeader::SIZE,
            flags: DdsHeader::DEFAULT_FLAGS,
            height,
            width,
            pitch_or_linear_size: format.linear_size(width, height),
            depth: 0,
            mip_map_count: mipmap_count,
            pixel_format: DdsPixelFormat::for_format(format),
            caps: 0,
            caps2: 0,
            caps3: 0,
            caps4: 0,
        };
        Self { header, data }
    }

    pub fn width(&self) -> u32 {
        self.header.width
    }

    pub fn height(&self) -> u32 {
        self.header.height
    }

    pub fn mipmap_count(&self) -> u32 {
        self.header.mip_map_count
    }

    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFourCc`] for formats outside the table.
    pub fn format(&self) -> Result<TextureFormat> {
        self.header.format()
    }

    /// One mip level's bytes, located by the per-format size arithmetic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MipLevelOutOfRange`] if `level` is not below the
    /// header's mip count, [`Error::UnsupportedFourCc`] if the pixel format
    /// is unknown, and [`Error::TextureDataMismatch`] if the data buffer is
    /// shorter than the computed range.
    pub fn mipmap_data(&self, level: u32) -> Result<&[u8]> {
        Ok(&self.data[self.mip_range(level)?])
    }

    fn mip_range(&self, level: u32) -> Result<Range<usize>> {
        if level >= self.header.mip_map_count {
            return Err(Error::MipLevelOutOfRange {
                level,
                count: self.header.mip_map_count,
            });
        }
        let format = self.format()?;
        let mut offset = 0usize;
        for previous in 0..level {
            let (w, h) = self.header.mip_dimensions(previous);
            offset += format.mip_size(w, h);
        }
        let (w, h) = self.header.mip_dimensions(level);
        let end = offset + format.mip_size(w, h);
        if end > self.data.len() {
            return Err(Error::TextureDataMismatch {
                expected: end,
                found: self.data.len(),
            });
        }
        Ok(offset..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full_mip_chain(width: u32, height: u32) -> u32 {
        32 - width.max(height).leading_zeros()
    }

    #[test]
    fn test_block_mip_sizes() {
        assert_eq!(TextureFormat::Dxt1.mip_size(1, 1), 8);
        assert_eq!(TextureFormat::Dxt1.mip_size(3, 3), 8);
        assert_eq!(TextureFormat::Dxt1.mip_size(4, 4), 8);
        assert_eq!(TextureFormat::Dxt1.mip_size(5, 5), 32);
        assert_eq!(TextureFormat::Dxt1.mip_size(17, 17), 200);
        assert_eq!(TextureFormat::Dxt5.mip_size(1, 1), 16);
        assert_eq!(TextureFormat::Dxt5.mip_size(32, 32), 1024);
        assert_eq!(TextureFormat::Rgbg.mip_size(8, 4), 64);
        assert_eq!(TextureFormat::Uncompressed.mip_size(16, 16), 256);
    }

    #[test]
    fn test_linear_size_product_form() {
        // 17x17 DXT1: 5x5 blocks of 8 bytes
        assert_eq!(TextureFormat::Dxt1.linear_size(17, 17), 200);
        assert_eq!(TextureFormat::Dxt5.linear_size(32, 32), 1024);
        assert_eq!(TextureFormat::Uncompressed.linear_size(4, 4), 64);
    }

    #[test]
    fn test_mip_chain_covers_buffer_exactly() {
        let sizes = [1u32, 3, 4, 5, 8, 17, 32];
        for format in [TextureFormat::Dxt1, TextureFormat::Dxt5] {
            for &width in &sizes {
                for &height in &sizes {
                    let mips = full_mip_chain(width, height);
                    let total: usize = (0..mips)
                        .map(|level| {
                            format.mip_size(
                                (width >> level).max(1),
                                (height >> level).max(1),
                            )
                        })
                        .sum();

                    let texture = DdsTexture::new(
                        width,
                        height,
                        mips,
                        format,
                        vec![0u8; total],
                    );

                    // Every level is contiguous with the previous one and the
                    // last level ends exactly at the end of the buffer.
                    let mut expected_start = 0usize;
                    for level in 0..mips {
                        let range = texture.mip_range(level).unwrap();
                        assert_eq!(range.start, expected_start);
                        expected_start = range.end;
                    }
                    assert_eq!(expected_start, total, "{format:?} {width}x{height}");
                }
            }
        }
    }

    #[test]
    fn test_uncompressed_sentinel_resolution() {
        let pf = DdsPixelFormat::for_format(TextureFormat::Uncompressed);
        assert_eq!(pf.four_cc, 0);
        assert_eq!(pf.flags, 0x41);
        assert_eq!(pf.format_code(), four_cc::UNCOMPRESSED);
        assert_eq!(pf.format().unwrap(), TextureFormat::Uncompressed);

        let pf = DdsPixelFormat::for_format(TextureFormat::Dxt5);
        assert_eq!(pf.four_cc, four_cc::DXT5);
        assert_eq!(pf.flags, pixel_flags::FOUR_CC);
    }

    #[test]
    fn test_unsupported_code_reports_hex() {
        let err = TextureFormat::from_code(0x3031_5844).unwrap_err();
        assert!(err.to_string().contains("0x30315844"));
    }

    #[test]
    fn test_mip_level_out_of_range() {
        let texture = DdsTexture::new(4, 4, 1, TextureFormat::Dxt1, vec![0u8; 8]);
        assert!(texture.mipmap_data(0).is_ok());
        assert!(texture.mipmap_data(1).is_err());
    }
}
