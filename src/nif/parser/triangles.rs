use crate::nif::error::{NifError, Result};
use crate::nif::parser::helpers::*;
use crate::nif::types::{AttrList, LinkMap, Triangle, TriShapeData};
use bevy_log::warn;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Write;

pub fn parse_tri_shape_data(
    data: &mut TriShapeData,
    attrs: &mut AttrList,
    r: &mut NifReader<'_>,
) -> Result<()> {
    // 1. Per-vertex arrays, each behind a presence flag
    let vertex_count = r.read_u16::<LittleEndian>()?;
    let len = vertex_count as usize;
    data.set_vertex_count_raw(vertex_count);

    data.vertices = if read_bool32(r)? {
        read_vec(r, len, read_vector3)?
    } else {
        Vec::new()
    };
    data.normals = if read_bool32(r)? {
        read_vec(r, len, read_vector3)?
    } else {
        Vec::new()
    };

    attrs.read_range(r, "Center", "Radius")?;

    data.colors = if read_bool32(r)? {
        read_vec(r, len, read_vector4)?
    } else {
        Vec::new()
    };

    // 2. UV sets: the count survives even when the flag says there is no data
    let uv_set_count = r.read_u16::<LittleEndian>()? as usize;
    let has_uvs = read_bool32(r)?;
    data.uv_sets = if has_uvs {
        let mut sets = Vec::with_capacity(uv_set_count);
        for _ in 0..uv_set_count {
            sets.push(read_vec(r, len, read_vector2)?);
        }
        sets
    } else {
        vec![Vec::new(); uv_set_count]
    };

    // 3. Triangles
    let triangle_count = r.read_u16::<LittleEndian>()? as usize;
    data.triangles = Vec::new();
    if triangle_count > 0 {
        let index_count = r.read_u32::<LittleEndian>()?;
        if index_count as usize != triangle_count * 3 {
            warn!(
                "NiTriShapeData index count ({}) != triangle count ({}) * 3",
                index_count, triangle_count
            );
        }
        data.triangles = read_vec(r, triangle_count, read_triangle)?;
    }

    // 4. Match groups are regenerated on write, only their presence is kept
    let group_count = r.read_u16::<LittleEndian>()?;
    data.match_group_mode = group_count != 0;
    for _ in 0..group_count {
        let members = r.read_u16::<LittleEndian>()?;
        for _ in 0..members {
            r.read_u16::<LittleEndian>()?;
        }
    }
    Ok(())
}

fn read_triangle(r: &mut NifReader<'_>) -> Result<Triangle> {
    Ok([
        r.read_u16::<LittleEndian>()?,
        r.read_u16::<LittleEndian>()?,
        r.read_u16::<LittleEndian>()?,
    ])
}

pub fn write_tri_shape_data<W: Write>(
    data: &TriShapeData,
    attrs: &AttrList,
    out: &mut W,
    links: &LinkMap,
) -> Result<()> {
    out.write_u16::<LittleEndian>(data.vertex_count() as u16)?;

    write_bool32(out, !data.vertices.is_empty())?;
    for v in &data.vertices {
        write_vector3(out, *v)?;
    }
    write_bool32(out, !data.normals.is_empty())?;
    for n in &data.normals {
        write_vector3(out, *n)?;
    }

    attrs.write_range(out, links, "Center", "Radius")?;

    write_bool32(out, !data.colors.is_empty())?;
    for c in &data.colors {
        write_vector4(out, *c)?;
    }

    // one flag covers every set, so either all sets are filled or none are
    out.write_u16::<LittleEndian>(data.uv_sets.len() as u16)?;
    let has_uvs = data.uv_sets.iter().any(|set| !set.is_empty());
    if has_uvs {
        if let Some(set) = data.uv_sets.iter().find(|set| set.len() != data.vertex_count()) {
            return Err(NifError::SizeMismatch {
                what: "UV set vertex count",
                expected: data.vertex_count(),
                actual: set.len(),
            });
        }
    }
    write_bool32(out, has_uvs)?;
    if has_uvs {
        for set in &data.uv_sets {
            for uv in set {
                write_vector2(out, *uv)?;
            }
        }
    }

    out.write_u16::<LittleEndian>(data.triangles.len() as u16)?;
    if !data.triangles.is_empty() {
        out.write_u32::<LittleEndian>(data.triangles.len() as u32 * 3)?;
        for tri in &data.triangles {
            for i in tri {
                out.write_u16::<LittleEndian>(*i)?;
            }
        }
    }

    if data.match_group_mode {
        let groups = data.match_groups();
        out.write_u16::<LittleEndian>(groups.len() as u16)?;
        for group in &groups {
            out.write_u16::<LittleEndian>(group.len() as u16)?;
            for i in group {
                out.write_u16::<LittleEndian>(*i)?;
            }
        }
    } else {
        out.write_u16::<LittleEndian>(0)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nif::options::NifOptions;
    use crate::nif::parser::block_parsers::create_block;
    use crate::nif::types::BlockData;
    use bevy_math::{Vec2, Vec3};

    fn empty_links() -> LinkMap {
        LinkMap::default()
    }

    #[test]
    fn shape_data_round_trips_through_block() {
        let block = create_block("NiTriShapeData").unwrap();
        {
            let mut b = block.borrow_mut();
            let d = b.tri_shape_data_mut().unwrap();
            d.set_vertex_count(3);
            d.set_vertices(vec![Vec3::ZERO, Vec3::X, Vec3::Y]).unwrap();
            d.set_uv_set_count(1);
            d.set_uv_set(0, vec![Vec2::ZERO, Vec2::X, Vec2::Y]).unwrap();
            d.set_triangle_count(1);
            d.set_triangles(vec![[0, 1, 2]]).unwrap();
            d.match_group_mode = true;
        }

        let mut bytes = Vec::new();
        block.borrow().write(&mut bytes, &empty_links()).unwrap();

        let opts = NifOptions::default();
        let mut r = NifReader::new(&bytes, &opts);
        assert_eq!(read_nif_string(&mut r).unwrap(), "NiTriShapeData");
        let copy = create_block("NiTriShapeData").unwrap();
        copy.borrow_mut().read(&mut r).unwrap();
        assert_eq!(r.remaining(), 0);

        let original = block.borrow();
        let copy = copy.borrow();
        assert_eq!(original.data(), copy.data());
        let BlockData::TriShapeData(d) = copy.data() else {
            panic!("wrong payload");
        };
        assert!(d.normals().is_empty());
        assert_eq!(d.triangles(), &[[0, 1, 2]]);
    }

    #[test]
    fn uv_count_survives_without_uv_data() {
        let opts = NifOptions::default();
        let mut raw = Vec::new();
        raw.extend_from_slice(&2u16.to_le_bytes()); // vertices
        raw.extend_from_slice(&0u32.to_le_bytes()); // no positions
        raw.extend_from_slice(&0u32.to_le_bytes()); // no normals
        raw.extend_from_slice(&[0u8; 16]); // center + radius
        raw.extend_from_slice(&0u32.to_le_bytes()); // no colors
        raw.extend_from_slice(&2u16.to_le_bytes()); // two uv sets
        raw.extend_from_slice(&0u32.to_le_bytes()); // but no uv data
        raw.extend_from_slice(&0u16.to_le_bytes()); // no triangles
        raw.extend_from_slice(&0u16.to_le_bytes()); // no match groups

        let block = create_block("NiTriShapeData").unwrap();
        let mut r = NifReader::new(&raw, &opts);
        block.borrow_mut().read(&mut r).unwrap();
        assert_eq!(r.remaining(), 0);
        assert_eq!(block.borrow().tri_shape_data().unwrap().uv_sets().len(), 2);

        let mut out = Vec::new();
        let b = block.borrow();
        write_tri_shape_data(b.tri_shape_data().unwrap(), b.attributes(), &mut out, &empty_links())
            .unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn partially_filled_uv_sets_are_rejected() {
        // two UV sets and no UV data, as read from a file with the flag off
        let block = create_block("NiTriShapeData").unwrap();
        {
            let mut b = block.borrow_mut();
            let d = b.tri_shape_data_mut().unwrap();
            d.set_vertex_count(2);
            d.uv_sets = vec![Vec::new(); 2];
            d.set_uv_set(1, vec![Vec2::ZERO, Vec2::ONE]).unwrap();
        }
        let err = block
            .borrow()
            .write(&mut Vec::new(), &empty_links())
            .unwrap_err();
        assert!(matches!(
            err,
            NifError::SizeMismatch {
                expected: 2,
                actual: 0,
                ..
            }
        ));

        // filling the first set as well makes the shape writable
        {
            let mut b = block.borrow_mut();
            let d = b.tri_shape_data_mut().unwrap();
            d.set_uv_set(0, vec![Vec2::X, Vec2::Y]).unwrap();
        }
        let mut bytes = Vec::new();
        block.borrow().write(&mut bytes, &empty_links()).unwrap();
        let opts = NifOptions::default();
        let mut r = NifReader::new(&bytes, &opts);
        read_nif_string(&mut r).unwrap();
        let copy = create_block("NiTriShapeData").unwrap();
        copy.borrow_mut().read(&mut r).unwrap();
        assert_eq!(copy.borrow().tri_shape_data().unwrap().uv_sets()[1], vec![Vec2::ZERO, Vec2::ONE]);
    }
}
