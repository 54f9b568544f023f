use crate::nif::error::Result;
use crate::nif::parser::helpers::*;
use crate::nif::types::{AttrList, LinkMap, TextKey};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Write;

/// NiTextKeyExtraData: the extra-data header attributes, then (time, text) pairs.
pub fn parse_text_key_extra_data(
    keys: &mut Vec<TextKey>,
    attrs: &mut AttrList,
    r: &mut NifReader<'_>,
) -> Result<()> {
    attrs.read_all(r)?;

    let raw_count = r.read_u32::<LittleEndian>()?;
    let count = r.check_count(raw_count, "text key")?;
    *keys = read_vec(r, count, |r| {
        let time = r.read_f32::<LittleEndian>()?;
        let text = read_nif_string(r)?;
        Ok(TextKey { time, text })
    })?;
    Ok(())
}

pub fn write_text_key_extra_data<W: Write>(
    keys: &[TextKey],
    attrs: &AttrList,
    out: &mut W,
    links: &LinkMap,
) -> Result<()> {
    attrs.write_all(out, links)?;
    out.write_u32::<LittleEndian>(keys.len() as u32)?;
    for key in keys {
        out.write_f32::<LittleEndian>(key.time)?;
        write_nif_string(out, &key.text)?;
    }
    Ok(())
}

/// NiVertWeightsExtraData: header attributes, a u16 count, then one weight per vertex.
pub fn parse_vert_weights_extra_data(
    weights: &mut Vec<f32>,
    attrs: &mut AttrList,
    r: &mut NifReader<'_>,
) -> Result<()> {
    attrs.read_all(r)?;
    let count = r.read_u16::<LittleEndian>()? as usize;
    *weights = read_vec(r, count, |r| Ok(r.read_f32::<LittleEndian>()?))?;
    Ok(())
}

pub fn write_vert_weights_extra_data<W: Write>(
    weights: &[f32],
    attrs: &AttrList,
    out: &mut W,
    links: &LinkMap,
) -> Result<()> {
    attrs.write_all(out, links)?;
    out.write_u16::<LittleEndian>(weights.len() as u16)?;
    for w in weights {
        out.write_f32::<LittleEndian>(*w)?;
    }
    Ok(())
}
