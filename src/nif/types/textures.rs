use super::attribute::Link;
use std::fmt::{Debug, Write as _};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelLayout {
    #[default]
    Palettized8, // PIX_LAY_PALETTISED8
    HighColor16, // PIX_LAY_HIGH_COLOR_16
    TrueColor32, // PIX_LAY_TRUE_COLOR_32
    Compressed,  // PIX_LAY_COMPRESSED
    Bumpmap,     // PIX_LAY_BUMPMAP
    Palettized4, // PIX_LAY_PALETTISED4
    Default,     // PIX_LAY_DEFAULT
    Unknown(u32),
}
impl From<u32> for PixelLayout {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Palettized8,
            1 => Self::HighColor16,
            2 => Self::TrueColor32,
            3 => Self::Compressed,
            4 => Self::Bumpmap,
            5 => Self::Palettized4,
            6 => Self::Default,
            _ => Self::Unknown(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MipMapFormat {
    No,  // MIP_FMT_NO
    Yes, // MIP_FMT_YES
    #[default]
    Default, // MIP_FMT_DEFAULT
    Unknown(u32),
}
impl From<u32> for MipMapFormat {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::No,
            1 => Self::Yes,
            2 => Self::Default,
            _ => Self::Unknown(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaFormat {
    #[default]
    None, // ALPHA_NONE
    Binary,  // ALPHA_BINARY
    Smooth,  // ALPHA_SMOOTH
    Default, // ALPHA_DEFAULT
    Unknown(u32),
}
impl From<u32> for AlphaFormat {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Binary,
            2 => Self::Smooth,
            3 => Self::Default,
            _ => Self::Unknown(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    #[default]
    Replace,
    Decal,
    Modulate,
    Hilight,
    Hilight2,
    Unknown(u32),
}
impl From<u32> for ApplyMode {
    fn from(value: u32) -> Self {
        match value {
            0 => ApplyMode::Replace,
            1 => ApplyMode::Decal,
            2 => ApplyMode::Modulate,
            3 => ApplyMode::Hilight,
            4 => ApplyMode::Hilight2,
            other => ApplyMode::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClampMode {
    #[default]
    ClampSClampT,
    ClampSWrapT,
    WrapSClampT,
    WrapSWrapT,
    Unknown(u32),
}
impl From<u32> for ClampMode {
    fn from(value: u32) -> Self {
        match value {
            0 => ClampMode::ClampSClampT,
            1 => ClampMode::ClampSWrapT,
            2 => ClampMode::WrapSClampT,
            3 => ClampMode::WrapSWrapT,
            other => ClampMode::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
    NearestMipNearest,
    NearestMipLinear,
    LinearMipNearest,
    LinearMipLinear,
    Unknown(u32),
}
impl From<u32> for FilterMode {
    fn from(value: u32) -> Self {
        match value {
            0 => FilterMode::Nearest,
            1 => FilterMode::Linear,
            2 => FilterMode::NearestMipNearest,
            3 => FilterMode::NearestMipLinear,
            4 => FilterMode::LinearMipNearest,
            5 => FilterMode::LinearMipLinear,
            other => FilterMode::Unknown(other),
        }
    }
}

/// Extra fields carried by the bump map slot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BumpMapInfo {
    pub luma_scale: f32,
    pub luma_offset: f32,
    pub matrix: [f32; 4], // M11, M12, M21, M22
}

/// One slot of a texturing property. Everything past `is_used` is only on disk
/// when the slot is used. Clamp and filter are kept raw so unknown values survive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureSlot {
    pub is_used: bool,
    pub source: Link,
    pub clamp_mode: u32,
    pub filter_mode: u32,
    pub uv_set: u32,
    pub ps2_l: i16,
    pub ps2_k: i16,
    pub unknown_short: u16,
    pub bump_map: Option<BumpMapInfo>,
}

/// Where an NiSourceTexture gets its pixels from.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    External { file_name: String },
    Internal { unknown_byte: u8, pixel_data: Link },
}

impl Default for TextureSource {
    fn default() -> Self {
        TextureSource::External {
            file_name: String::new(),
        }
    }
}

/// NiTexturingProperty payload that is not an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TexturingData {
    /// Six fixed slots plus however many decals follow.
    pub texture_count: u32,
}

impl TexturingData {
    pub const FIXED_SLOTS: u32 = 6;
    pub const MAX_DECALS: u32 = 4;

    pub fn decal_count(&self) -> usize {
        self.texture_count
            .saturating_sub(Self::FIXED_SLOTS)
            .min(Self::MAX_DECALS) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MipMap {
    pub width: u32,
    pub height: u32,
    pub offset: u32, // into `PixelData::data`
}

/// NiPixelData payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PixelData {
    pub unknown_int: u32,
    pub red_mask: u32,
    pub green_mask: u32,
    pub blue_mask: u32,
    pub alpha_mask: u32,
    pub bits_per_pixel: u32,
    pub unknown_8_bytes: [u8; 8],
    pub unknown_index: i32, // palette
    pub bytes_per_pixel: u32,
    pub mipmaps: Vec<MipMap>,
    pub data: Vec<u8>,
}

impl PixelData {
    /// Masks, formats and the mip table. The image bytes are never dumped.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Unknown Int:  {}\nRed Mask:   0x{:08X}\nGreen Mask: 0x{:08X}\nBlue Mask:  0x{:08X}\nAlpha Mask: 0x{:08X}\nBits Per Pixel:  {}",
            self.unknown_int,
            self.red_mask,
            self.green_mask,
            self.blue_mask,
            self.alpha_mask,
            self.bits_per_pixel
        );
        let _ = writeln!(out, "Unknown 8 Bytes:  {:02X?}", self.unknown_8_bytes);
        let _ = writeln!(
            out,
            "Unknown Index:  {}\nMipmap Count:  {}\nBytes Per Pixel:  {}",
            self.unknown_index,
            self.mipmaps.len(),
            self.bytes_per_pixel
        );
        for (i, mip) in self.mipmaps.iter().enumerate() {
            let _ = writeln!(
                out,
                "Mipmap {}:\n   Width:  {}\n   Height:  {}\n   Offset into Image Data Block:  {}",
                i + 1,
                mip.width,
                mip.height,
                mip.offset
            );
        }
        let _ = writeln!(out, "Image Data:  {} bytes", self.data.len());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decal_count_is_clamped() {
        let count = |texture_count| TexturingData { texture_count }.decal_count();
        assert_eq!(count(0), 0);
        assert_eq!(count(6), 0);
        assert_eq!(count(7), 1);
        assert_eq!(count(12), 4);
    }
}
