use crate::nif::error::Result;
use crate::nif::parser::helpers::*;
use crate::nif::types::{MorphData, MorphTarget};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Write;

pub fn parse_morph_data(data: &mut MorphData, r: &mut NifReader<'_>) -> Result<()> {
    let raw_morphs = r.read_u32::<LittleEndian>()?;
    let morph_count = r.check_count(raw_morphs, "morph")?;
    data.vertex_count = r.read_u32::<LittleEndian>()?;
    let vertex_count = r.check_count(data.vertex_count, "morph vertex")?;
    data.relative_targets = r.read_u8()?;

    data.morphs = read_vec(r, morph_count, |r| {
        let keys = read_key_track(r, "morph", TagLayout::Always, true)?;
        let vectors = read_vec(r, vertex_count, read_vector3)?;
        Ok(MorphTarget { keys, vectors })
    })?;
    Ok(())
}

/// Every target is written with exactly `vertex_count` vectors; short ones are
/// padded with zeros.
pub fn write_morph_data<W: Write>(data: &MorphData, out: &mut W) -> Result<()> {
    out.write_u32::<LittleEndian>(data.morphs.len() as u32)?;
    out.write_u32::<LittleEndian>(data.vertex_count)?;
    out.write_u8(data.relative_targets)?;

    let vertex_count = data.vertex_count as usize;
    for morph in &data.morphs {
        write_key_track(out, &morph.keys, TagLayout::Always, true)?;
        for i in 0..vertex_count {
            let v = morph.vectors.get(i).copied().unwrap_or_default();
            write_vector3(out, v)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nif::options::NifOptions;
    use crate::nif::types::{Key, KeyTrack, KeyType};
    use bevy_math::Vec3;

    #[test]
    fn morph_targets_carry_one_vector_per_vertex() {
        let data = MorphData {
            vertex_count: 2,
            relative_targets: 1,
            morphs: vec![
                MorphTarget::default(),
                MorphTarget {
                    keys: KeyTrack {
                        key_type: KeyType::Linear,
                        keys: vec![Key::new(0.0, 0.0), Key::new(1.0, 1.0)],
                    },
                    vectors: vec![Vec3::X, Vec3::Y],
                },
            ],
        };
        let mut bytes = Vec::new();
        write_morph_data(&data, &mut bytes).unwrap();

        let opts = NifOptions::default();
        let mut r = NifReader::new(&bytes, &opts);
        let mut copy = MorphData::default();
        parse_morph_data(&mut copy, &mut r).unwrap();
        assert_eq!(r.remaining(), 0);

        // the empty base target comes back zero-filled
        assert_eq!(copy.morphs[0].vectors, vec![Vec3::ZERO; 2]);
        assert_eq!(copy.morphs[1], data.morphs[1]);
        assert_eq!(copy.relative_targets, 1);
    }

    #[test]
    fn empty_morph_track_tolerates_unusual_tag() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1u32.to_le_bytes()); // morphs
        raw.extend_from_slice(&1u32.to_le_bytes()); // vertices
        raw.push(0);
        raw.extend_from_slice(&0u32.to_le_bytes()); // no keys
        raw.extend_from_slice(&7u32.to_le_bytes()); // tag outside 1..=3
        for f in [1.0f32, 2.0, 3.0] {
            raw.extend_from_slice(&f.to_le_bytes());
        }

        let opts = NifOptions::default();
        let mut r = NifReader::new(&raw, &opts);
        let mut data = MorphData::default();
        parse_morph_data(&mut data, &mut r).unwrap();
        assert_eq!(r.remaining(), 0);
        assert_eq!(data.morphs[0].keys.key_type, KeyType::Unknown(7));
        assert_eq!(data.morphs[0].vectors, vec![Vec3::new(1.0, 2.0, 3.0)]);

        let mut out = Vec::new();
        write_morph_data(&data, &mut out).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn keyed_morph_track_rejects_unusual_tag() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.extend_from_slice(&0u32.to_le_bytes());
        raw.push(0);
        raw.extend_from_slice(&1u32.to_le_bytes()); // one key
        raw.extend_from_slice(&7u32.to_le_bytes());
        raw.extend_from_slice(&[0u8; 32]);

        let opts = NifOptions::default();
        let mut r = NifReader::new(&raw, &opts);
        let err = parse_morph_data(&mut MorphData::default(), &mut r).unwrap_err();
        assert!(matches!(
            err,
            crate::nif::error::NifError::UnsupportedKeyType {
                track: "morph",
                key_type: 7
            }
        ));
    }
}
