// src/nif/parser/texture.rs

use crate::nif::error::{NifError, Result};
use crate::nif::parser::helpers::*;
use crate::nif::types::{AttrList, LinkMap, MipMap, PixelData, TexturingData};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// NiTexturingProperty. The raw texture count sits between the apply mode and the
/// slots, and decides how many decal slots follow the six fixed ones.
pub fn parse_texturing_property(
    data: &mut TexturingData,
    attrs: &mut AttrList,
    r: &mut NifReader<'_>,
) -> Result<()> {
    attrs.read_range(r, "Name", "Apply Mode")?;
    data.texture_count = r.read_u32::<LittleEndian>()?;
    attrs.read_range(r, "Base Texture", "Bump Map Texture")?;
    for i in 0..data.decal_count() {
        let name = format!("Decal {} Texture", i);
        attrs.read_range(r, &name, &name)?;
    }
    Ok(())
}

pub fn write_texturing_property<W: Write>(
    data: &TexturingData,
    attrs: &AttrList,
    out: &mut W,
    links: &LinkMap,
) -> Result<()> {
    attrs.write_range(out, links, "Name", "Apply Mode")?;
    out.write_u32::<LittleEndian>(data.texture_count)?;
    attrs.write_range(out, links, "Base Texture", "Bump Map Texture")?;
    for i in 0..data.decal_count() {
        let name = format!("Decal {} Texture", i);
        attrs.write_range(out, links, &name, &name)?;
    }
    Ok(())
}

pub fn parse_pixel_data(data: &mut PixelData, r: &mut NifReader<'_>) -> Result<()> {
    data.unknown_int = r.read_u32::<LittleEndian>()?;
    data.red_mask = r.read_u32::<LittleEndian>()?;
    data.green_mask = r.read_u32::<LittleEndian>()?;
    data.blue_mask = r.read_u32::<LittleEndian>()?;
    data.alpha_mask = r.read_u32::<LittleEndian>()?;
    data.bits_per_pixel = r.read_u32::<LittleEndian>()?;
    r.read_exact(&mut data.unknown_8_bytes)?;
    data.unknown_index = r.read_i32::<LittleEndian>()?;

    let raw_mips = r.read_u32::<LittleEndian>()?;
    let mip_count = r.check_count(raw_mips, "mipmap")?;
    data.bytes_per_pixel = r.read_u32::<LittleEndian>()?;
    data.mipmaps = read_vec(r, mip_count, |r| {
        Ok(MipMap {
            width: r.read_u32::<LittleEndian>()?,
            height: r.read_u32::<LittleEndian>()?,
            offset: r.read_u32::<LittleEndian>()?,
        })
    })?;

    let data_size = r.read_u32::<LittleEndian>()? as usize;
    if data_size > r.remaining() {
        return Err(NifError::InvalidData(format!(
            "NiPixelData claims {} bytes of image data but only {} remain",
            data_size,
            r.remaining()
        )));
    }
    data.data = vec![0u8; data_size];
    r.read_exact(&mut data.data)?;
    Ok(())
}

pub fn write_pixel_data<W: Write>(data: &PixelData, out: &mut W) -> Result<()> {
    for v in [
        data.unknown_int,
        data.red_mask,
        data.green_mask,
        data.blue_mask,
        data.alpha_mask,
        data.bits_per_pixel,
    ] {
        out.write_u32::<LittleEndian>(v)?;
    }
    out.write_all(&data.unknown_8_bytes)?;
    out.write_i32::<LittleEndian>(data.unknown_index)?;
    out.write_u32::<LittleEndian>(data.mipmaps.len() as u32)?;
    out.write_u32::<LittleEndian>(data.bytes_per_pixel)?;
    for mip in &data.mipmaps {
        out.write_u32::<LittleEndian>(mip.width)?;
        out.write_u32::<LittleEndian>(mip.height)?;
        out.write_u32::<LittleEndian>(mip.offset)?;
    }
    out.write_u32::<LittleEndian>(data.data.len() as u32)?;
    out.write_all(&data.data)?;
    Ok(())
}
