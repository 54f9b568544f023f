use crate::nif::error::Result;
use crate::nif::parser::helpers::*;
use crate::nif::types::{Key, KeyframeData, UvData};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Write;

/// NiKeyframeData: rotation, translation and scale tracks. Each tag is only present
/// when its track has keys, and quadratic rotation keys carry no tangents.
pub fn parse_keyframe_data(data: &mut KeyframeData, r: &mut NifReader<'_>) -> Result<()> {
    data.rotations = read_key_track(r, "rotation", TagLayout::WhenKeyed, false)?;
    data.translations = read_key_track(r, "translation", TagLayout::WhenKeyed, true)?;
    data.scales = read_key_track(r, "scale", TagLayout::WhenKeyed, true)?;
    Ok(())
}

pub fn write_keyframe_data<W: Write>(data: &KeyframeData, out: &mut W) -> Result<()> {
    write_key_track(out, &data.rotations, TagLayout::WhenKeyed, false)?;
    write_key_track(out, &data.translations, TagLayout::WhenKeyed, true)?;
    write_key_track(out, &data.scales, TagLayout::WhenKeyed, true)
}

/// NiVisData: (time, visible byte) pairs with no interpolation tag.
pub fn parse_vis_data(keys: &mut Vec<Key<u8>>, r: &mut NifReader<'_>) -> Result<()> {
    let raw_count = r.read_u32::<LittleEndian>()?;
    let count = r.check_count(raw_count, "visibility key")?;
    *keys = read_vec(r, count, |r| {
        let time = r.read_f32::<LittleEndian>()?;
        let visible = r.read_u8()?;
        Ok(Key::new(time, visible))
    })?;
    Ok(())
}

pub fn write_vis_data<W: Write>(keys: &[Key<u8>], out: &mut W) -> Result<()> {
    out.write_u32::<LittleEndian>(keys.len() as u32)?;
    for key in keys {
        out.write_f32::<LittleEndian>(key.time)?;
        out.write_u8(key.value)?;
    }
    Ok(())
}

pub fn parse_uv_data(data: &mut UvData, r: &mut NifReader<'_>) -> Result<()> {
    for group in data.groups.iter_mut() {
        *group = read_key_track(r, "uv", TagLayout::WhenKeyed, true)?;
    }
    Ok(())
}

pub fn write_uv_data<W: Write>(data: &UvData, out: &mut W) -> Result<()> {
    for group in &data.groups {
        write_key_track(out, group, TagLayout::WhenKeyed, true)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nif::error::NifError;
    use crate::nif::options::NifOptions;
    use crate::nif::types::{KeyTrack, KeyType, Tbc};
    use bevy_math::{Quat, Vec3};

    fn round_trip(data: &KeyframeData) -> KeyframeData {
        let mut bytes = Vec::new();
        write_keyframe_data(data, &mut bytes).unwrap();
        let opts = NifOptions::default();
        let mut r = NifReader::new(&bytes, &opts);
        let mut copy = KeyframeData::default();
        parse_keyframe_data(&mut copy, &mut r).unwrap();
        assert_eq!(r.remaining(), 0);
        copy
    }

    #[test]
    fn empty_tracks_write_no_tag() {
        let mut bytes = Vec::new();
        write_keyframe_data(&KeyframeData::default(), &mut bytes).unwrap();
        assert_eq!(bytes, [0u8; 12]);
    }

    #[test]
    fn every_supported_tag_round_trips() {
        for key_type in [KeyType::Linear, KeyType::Quadratic, KeyType::Tbc] {
            let mut rotation = Key::new(0.5, Quat::from_rotation_z(1.0));
            let mut translation = Key::new(0.5, Vec3::new(1.0, 2.0, 3.0));
            match key_type {
                KeyType::Quadratic => {
                    translation.forward_tangent = Some(Vec3::X);
                    translation.backward_tangent = Some(Vec3::Y);
                }
                KeyType::Tbc => {
                    let tbc = Some(Tbc {
                        tension: 0.1,
                        bias: 0.2,
                        continuity: 0.3,
                    });
                    rotation.tbc = tbc;
                    translation.tbc = tbc;
                }
                _ => {}
            }
            let data = KeyframeData {
                rotations: KeyTrack {
                    key_type,
                    keys: vec![rotation],
                },
                translations: KeyTrack {
                    key_type,
                    keys: vec![translation],
                },
                scales: KeyTrack::default(),
            };
            assert_eq!(round_trip(&data), data);
        }
    }

    #[test]
    fn quadratic_rotation_has_no_tangents() {
        let data = KeyframeData {
            rotations: KeyTrack {
                key_type: KeyType::Quadratic,
                keys: vec![Key::new(0.0, Quat::IDENTITY)],
            },
            ..Default::default()
        };
        let mut bytes = Vec::new();
        write_keyframe_data(&data, &mut bytes).unwrap();
        // count, tag, time, quaternion, then two empty tracks
        assert_eq!(bytes.len(), 4 + 4 + 4 + 16 + 8);
    }

    #[test]
    fn xyz_rotation_tag_is_rejected() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.extend_from_slice(&4u32.to_le_bytes());
        raw.extend_from_slice(&[0u8; 64]);
        let opts = NifOptions::default();
        let mut r = NifReader::new(&raw, &opts);
        let err = parse_keyframe_data(&mut KeyframeData::default(), &mut r).unwrap_err();
        assert!(matches!(
            err,
            NifError::UnsupportedKeyType {
                track: "rotation",
                key_type: 4
            }
        ));
    }

    #[test]
    fn vis_keys_are_time_byte_pairs() {
        let keys = vec![Key::new(0.0, 1u8), Key::new(1.5, 0u8)];
        let mut bytes = Vec::new();
        write_vis_data(&keys, &mut bytes).unwrap();
        assert_eq!(bytes.len(), 4 + 2 * 5);

        let opts = NifOptions::default();
        let mut r = NifReader::new(&bytes, &opts);
        let mut copy = Vec::new();
        parse_vis_data(&mut copy, &mut r).unwrap();
        assert_eq!(copy, keys);
    }
}
