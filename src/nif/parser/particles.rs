use crate::nif::error::Result;
use crate::nif::parser::helpers::*;
use crate::nif::types::RotatingParticlesData;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bevy_math::Vec4;
use std::io::Write;

fn read_optional<T>(
    r: &mut NifReader<'_>,
    count: usize,
    read_one: impl FnMut(&mut NifReader<'_>) -> Result<T>,
) -> Result<Option<Vec<T>>> {
    if read_bool32(r)? {
        Ok(Some(read_vec(r, count, read_one)?))
    } else {
        Ok(None)
    }
}

fn write_optional<T, W: Write>(
    out: &mut W,
    values: Option<&[T]>,
    mut write_one: impl FnMut(&mut W, &T) -> Result<()>,
) -> Result<()> {
    write_bool32(out, values.is_some())?;
    for v in values.unwrap_or_default() {
        write_one(out, v)?;
    }
    Ok(())
}

pub fn parse_rotating_particles_data(
    data: &mut RotatingParticlesData,
    r: &mut NifReader<'_>,
) -> Result<()> {
    data.vertex_count = r.read_u16::<LittleEndian>()?;
    let count = data.vertex_count as usize;

    data.vertices = read_optional(r, count, read_vector3)?;
    data.unknown_int = r.read_u32::<LittleEndian>()?;
    data.unknown_floats = read_vector4(r)?.to_array();
    data.colors = read_optional(r, count, read_vector4)?;

    data.unknown_int2 = r.read_u32::<LittleEndian>()?;
    data.unknown_short = r.read_u16::<LittleEndian>()?;
    data.active_count = r.read_u16::<LittleEndian>()?;
    data.unknown_float = r.read_f32::<LittleEndian>()?;
    data.unknown_short2 = r.read_u16::<LittleEndian>()?;

    data.sizes = read_optional(r, count, |r| Ok(r.read_f32::<LittleEndian>()?))?;
    data.rotations = read_optional(r, count, read_vector4)?;
    Ok(())
}

pub fn write_rotating_particles_data<W: Write>(
    data: &RotatingParticlesData,
    out: &mut W,
) -> Result<()> {
    out.write_u16::<LittleEndian>(data.vertex_count)?;
    write_optional(out, data.vertices.as_deref(), |out, v| write_vector3(out, *v))?;
    out.write_u32::<LittleEndian>(data.unknown_int)?;
    write_vector4(out, Vec4::from_array(data.unknown_floats))?;
    write_optional(out, data.colors.as_deref(), |out, c| write_vector4(out, *c))?;

    out.write_u32::<LittleEndian>(data.unknown_int2)?;
    out.write_u16::<LittleEndian>(data.unknown_short)?;
    out.write_u16::<LittleEndian>(data.active_count)?;
    out.write_f32::<LittleEndian>(data.unknown_float)?;
    out.write_u16::<LittleEndian>(data.unknown_short2)?;

    write_optional(out, data.sizes.as_deref(), |out, s| {
        out.write_f32::<LittleEndian>(*s)?;
        Ok(())
    })?;
    write_optional(out, data.rotations.as_deref(), |out, q| write_vector4(out, *q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nif::options::NifOptions;
    use bevy_math::Vec3;

    #[test]
    fn absent_arrays_stay_absent() {
        let data = RotatingParticlesData {
            vertex_count: 2,
            vertices: Some(vec![Vec3::ONE, Vec3::NEG_ONE]),
            unknown_floats: [1.0, 2.0, 3.0, 4.0],
            active_count: 2,
            sizes: Some(vec![0.5, 0.25]),
            ..Default::default()
        };
        let mut bytes = Vec::new();
        write_rotating_particles_data(&data, &mut bytes).unwrap();

        let opts = NifOptions::default();
        let mut r = NifReader::new(&bytes, &opts);
        let mut copy = RotatingParticlesData::default();
        parse_rotating_particles_data(&mut copy, &mut r).unwrap();
        assert_eq!(r.remaining(), 0);
        assert_eq!(copy, data);
        assert!(copy.colors.is_none());
    }
}
