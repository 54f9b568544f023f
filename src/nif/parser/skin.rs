use crate::nif::error::Result;
use crate::nif::parser::helpers::*;
use crate::nif::types::{BoneBinding, SkinData};
use bevy_log::warn;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::BTreeMap;
use std::io::Write;

/// NiSkinData. Rotations are stored column by column. Bone handles are attached
/// later from the owning skin instance.
pub fn parse_skin_data(data: &mut SkinData, r: &mut NifReader<'_>) -> Result<()> {
    data.rotation = read_matrix3x3_columns(r)?;
    data.translation = read_vector3(r)?;
    data.scale = r.read_f32::<LittleEndian>()?;

    let raw_count = r.read_u32::<LittleEndian>()?;
    let bone_count = r.check_count(raw_count, "bone")?;
    data.unknown_index = r.read_i32::<LittleEndian>()?;

    data.bindings = read_vec(r, bone_count, parse_bone_binding)?;
    Ok(())
}

fn parse_bone_binding(r: &mut NifReader<'_>) -> Result<BoneBinding> {
    let rotation = read_matrix3x3_columns(r)?;
    let translation = read_vector3(r)?;
    let scale = r.read_f32::<LittleEndian>()?;
    let unknown_floats = read_vector4(r)?.to_array();

    let weight_count = r.read_u16::<LittleEndian>()?;
    let mut weights = BTreeMap::new();
    for _ in 0..weight_count {
        let vertex = r.read_u16::<LittleEndian>()?;
        let weight = r.read_f32::<LittleEndian>()?;
        if weights.insert(vertex, weight).is_some() {
            warn!("Skin binding weights vertex {} twice, keeping the last", vertex);
        }
    }

    Ok(BoneBinding {
        bone: None,
        rotation,
        translation,
        scale,
        unknown_floats,
        weights,
    })
}

pub fn write_skin_data<W: Write>(data: &SkinData, out: &mut W) -> Result<()> {
    write_matrix3x3_columns(out, &data.rotation)?;
    write_vector3(out, data.translation)?;
    out.write_f32::<LittleEndian>(data.scale)?;
    out.write_u32::<LittleEndian>(data.bindings.len() as u32)?;
    out.write_i32::<LittleEndian>(data.unknown_index)?;

    for binding in &data.bindings {
        write_matrix3x3_columns(out, &binding.rotation)?;
        write_vector3(out, binding.translation)?;
        out.write_f32::<LittleEndian>(binding.scale)?;
        for f in binding.unknown_floats {
            out.write_f32::<LittleEndian>(f)?;
        }
        out.write_u16::<LittleEndian>(binding.weights.len() as u16)?;
        for (vertex, weight) in &binding.weights {
            out.write_u16::<LittleEndian>(*vertex)?;
            out.write_f32::<LittleEndian>(*weight)?;
        }
    }
    Ok(())
}
