// src/nif/parser/helpers.rs

use crate::nif::error::{NifError, Result};
use crate::nif::options::NifOptions;
use crate::nif::types::{Key, KeyTrack, KeyType, KeyValue, Matrix3x3, Tbc};
use bevy_math::{Quat, Vec2, Vec3, Vec4};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use encoding_rs::WINDOWS_1252;
use std::io::{Cursor, Read, Write};

/// Byte cursor over one file plus the limits it is read under.
pub struct NifReader<'a> {
    cursor: Cursor<&'a [u8]>,
    options: &'a NifOptions,
}

impl<'a> NifReader<'a> {
    pub fn new(data: &'a [u8], options: &'a NifOptions) -> Self {
        Self {
            cursor: Cursor::new(data),
            options,
        }
    }

    pub fn options(&self) -> &NifOptions {
        self.options
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }

    /// Rejects counts above the configured array limit.
    pub fn check_count(&self, count: u32, what: &str) -> Result<usize> {
        if count > self.options.max_array_len {
            return Err(NifError::InvalidData(format!(
                "{} count {} exceeds limit {} at offset 0x{:X}",
                what,
                count,
                self.options.max_array_len,
                self.position()
            )));
        }
        Ok(count as usize)
    }
}

impl Read for NifReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

// --- Readers ---

pub fn read_bool32(r: &mut NifReader<'_>) -> Result<bool> {
    Ok(r.read_u32::<LittleEndian>()? != 0)
}

pub fn read_nif_string(r: &mut NifReader<'_>) -> Result<String> {
    let len = r.read_u32::<LittleEndian>()?;
    if len > r.options().max_string_len {
        return Err(NifError::InvalidData(format!(
            "String length too long: {}",
            len
        )));
    }
    if len == 0 {
        return Ok(String::new());
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)?;
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(&buf);
    Ok(text.into_owned())
}

/// Reads a raw link index. `-1` is the null link; anything more negative is malformed.
pub fn read_link_index(r: &mut NifReader<'_>) -> Result<Option<u32>> {
    let index = r.read_i32::<LittleEndian>()?;
    if index < -1 {
        Err(NifError::InvalidData(format!(
            "Invalid link index: {}",
            index
        )))
    } else if index == -1 {
        Ok(None)
    } else {
        Ok(Some(index as u32))
    }
}

pub fn read_vector2(r: &mut NifReader<'_>) -> Result<Vec2> {
    Ok(Vec2::new(
        r.read_f32::<LittleEndian>()?,
        r.read_f32::<LittleEndian>()?,
    ))
}

pub fn read_vector3(r: &mut NifReader<'_>) -> Result<Vec3> {
    Ok(Vec3::new(
        r.read_f32::<LittleEndian>()?,
        r.read_f32::<LittleEndian>()?,
        r.read_f32::<LittleEndian>()?,
    ))
}

pub fn read_vector4(r: &mut NifReader<'_>) -> Result<Vec4> {
    Ok(Vec4::new(
        r.read_f32::<LittleEndian>()?,
        r.read_f32::<LittleEndian>()?,
        r.read_f32::<LittleEndian>()?,
        r.read_f32::<LittleEndian>()?,
    ))
}

/// Row by row.
pub fn read_matrix3x3(r: &mut NifReader<'_>) -> Result<Matrix3x3> {
    let mut m = [[0f32; 3]; 3];
    for row in m.iter_mut() {
        for cell in row.iter_mut() {
            *cell = r.read_f32::<LittleEndian>()?;
        }
    }
    Ok(Matrix3x3(m))
}

/// Column by column, the order skin data uses.
pub fn read_matrix3x3_columns(r: &mut NifReader<'_>) -> Result<Matrix3x3> {
    let mut m = [[0f32; 3]; 3];
    for c in 0..3 {
        for row in m.iter_mut() {
            row[c] = r.read_f32::<LittleEndian>()?;
        }
    }
    Ok(Matrix3x3(m))
}

pub fn read_quat_wxyz(r: &mut NifReader<'_>) -> Result<Quat> {
    let w = r.read_f32::<LittleEndian>()?;
    let x = r.read_f32::<LittleEndian>()?;
    let y = r.read_f32::<LittleEndian>()?;
    let z = r.read_f32::<LittleEndian>()?;
    Ok(Quat::from_xyzw(x, y, z, w))
}

pub fn read_vec<T>(
    r: &mut NifReader<'_>,
    count: usize,
    mut read_one: impl FnMut(&mut NifReader<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(read_one(r)?);
    }
    Ok(values)
}

// --- Writers ---

pub fn write_bool32<W: Write>(out: &mut W, value: bool) -> Result<()> {
    out.write_u32::<LittleEndian>(u32::from(value))?;
    Ok(())
}

pub fn write_nif_string<W: Write>(out: &mut W, value: &str) -> Result<()> {
    let (bytes, _, _) = WINDOWS_1252.encode(value);
    out.write_u32::<LittleEndian>(bytes.len() as u32)?;
    out.write_all(&bytes)?;
    Ok(())
}

pub fn write_link_index<W: Write>(out: &mut W, index: Option<u32>) -> Result<()> {
    let raw = index.map_or(-1, |i| i as i32);
    out.write_i32::<LittleEndian>(raw)?;
    Ok(())
}

pub fn write_vector2<W: Write>(out: &mut W, v: Vec2) -> Result<()> {
    out.write_f32::<LittleEndian>(v.x)?;
    out.write_f32::<LittleEndian>(v.y)?;
    Ok(())
}

pub fn write_vector3<W: Write>(out: &mut W, v: Vec3) -> Result<()> {
    out.write_f32::<LittleEndian>(v.x)?;
    out.write_f32::<LittleEndian>(v.y)?;
    out.write_f32::<LittleEndian>(v.z)?;
    Ok(())
}

pub fn write_vector4<W: Write>(out: &mut W, v: Vec4) -> Result<()> {
    for c in v.to_array() {
        out.write_f32::<LittleEndian>(c)?;
    }
    Ok(())
}

pub fn write_matrix3x3<W: Write>(out: &mut W, m: &Matrix3x3) -> Result<()> {
    for row in m.0.iter() {
        for cell in row.iter() {
            out.write_f32::<LittleEndian>(*cell)?;
        }
    }
    Ok(())
}

pub fn write_matrix3x3_columns<W: Write>(out: &mut W, m: &Matrix3x3) -> Result<()> {
    for c in 0..3 {
        for row in m.0.iter() {
            out.write_f32::<LittleEndian>(row[c])?;
        }
    }
    Ok(())
}

pub fn write_quat_wxyz<W: Write>(out: &mut W, q: Quat) -> Result<()> {
    out.write_f32::<LittleEndian>(q.w)?;
    out.write_f32::<LittleEndian>(q.x)?;
    out.write_f32::<LittleEndian>(q.y)?;
    out.write_f32::<LittleEndian>(q.z)?;
    Ok(())
}

// --- Keys ---

/// Reads one key. `tangents` is false for rotation tracks, whose quadratic keys
/// carry no tangent payload.
pub fn read_key<T: KeyValue>(
    r: &mut NifReader<'_>,
    key_type: KeyType,
    tangents: bool,
) -> Result<Key<T>> {
    let time = r.read_f32::<LittleEndian>()?;
    let value = T::read_value(r)?;
    let mut key = Key::new(time, value);

    match key_type {
        KeyType::Unset | KeyType::Linear | KeyType::Unknown(_) => {}
        KeyType::Quadratic => {
            if tangents {
                key.forward_tangent = Some(T::read_value(r)?);
                key.backward_tangent = Some(T::read_value(r)?);
            }
        }
        KeyType::Tbc => {
            key.tbc = Some(Tbc {
                tension: r.read_f32::<LittleEndian>()?,
                bias: r.read_f32::<LittleEndian>()?,
                continuity: r.read_f32::<LittleEndian>()?,
            });
        }
    }
    Ok(key)
}

pub fn write_key<T: KeyValue, W: Write>(
    out: &mut W,
    key: &Key<T>,
    key_type: KeyType,
    tangents: bool,
) -> Result<()> {
    out.write_f32::<LittleEndian>(key.time)?;
    key.value.write_value(out)?;

    match key_type {
        KeyType::Unset | KeyType::Linear | KeyType::Unknown(_) => {}
        KeyType::Quadratic => {
            if tangents {
                key.forward_tangent
                    .unwrap_or(key.value)
                    .write_value(out)?;
                key.backward_tangent
                    .unwrap_or(key.value)
                    .write_value(out)?;
            }
        }
        KeyType::Tbc => {
            let tbc = key.tbc.unwrap_or_default();
            out.write_f32::<LittleEndian>(tbc.tension)?;
            out.write_f32::<LittleEndian>(tbc.bias)?;
            out.write_f32::<LittleEndian>(tbc.continuity)?;
        }
    }
    Ok(())
}

/// How a track stores its interpolation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagLayout {
    /// Tag follows the count unconditionally (color, float, position, morph tracks).
    Always,
    /// Tag is only present when the count is non-zero (keyframe and UV tracks).
    WhenKeyed,
}

pub fn read_key_track<T: KeyValue>(
    r: &mut NifReader<'_>,
    track: &'static str,
    layout: TagLayout,
    tangents: bool,
) -> Result<KeyTrack<T>> {
    let raw_count = r.read_u32::<LittleEndian>()?;
    let count = r.check_count(raw_count, track)?;
    let key_type = if count > 0 {
        KeyType::from_raw(r.read_u32::<LittleEndian>()?, track)?
    } else if layout == TagLayout::Always {
        // no keys follow, so any tag is harmless
        KeyType::from_raw_unchecked(r.read_u32::<LittleEndian>()?)
    } else {
        KeyType::Unset
    };

    let keys = read_vec(r, count, |r| read_key(r, key_type, tangents))?;
    Ok(KeyTrack { key_type, keys })
}

pub fn write_key_track<T: KeyValue, W: Write>(
    out: &mut W,
    track: &KeyTrack<T>,
    layout: TagLayout,
    tangents: bool,
) -> Result<()> {
    if let (KeyType::Unknown(raw), false) = (track.key_type, track.keys.is_empty()) {
        return Err(NifError::UnsupportedKeyType {
            track: "keyed",
            key_type: raw,
        });
    }
    out.write_u32::<LittleEndian>(track.keys.len() as u32)?;
    if layout == TagLayout::Always || !track.keys.is_empty() {
        out.write_u32::<LittleEndian>(track.key_type.raw())?;
    }
    for key in &track.keys {
        write_key(out, key, track.key_type, tangents)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trips_high_bytes() {
        let opts = NifOptions::default();
        let raw = [3u8, 0, 0, 0, b'a', 0xE9, 0x81];
        let mut r = NifReader::new(&raw, &opts);
        let s = read_nif_string(&mut r).unwrap();

        let mut out = Vec::new();
        write_nif_string(&mut out, &s).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn link_index_rejects_below_minus_one() {
        let opts = NifOptions::default();
        let raw = (-2i32).to_le_bytes();
        let mut r = NifReader::new(&raw, &opts);
        assert!(matches!(
            read_link_index(&mut r),
            Err(NifError::InvalidData(_))
        ));

        let raw = (-1i32).to_le_bytes();
        let mut r = NifReader::new(&raw, &opts);
        assert_eq!(read_link_index(&mut r).unwrap(), None);
    }

    #[test]
    fn column_matrix_transposes_on_disk() {
        let opts = NifOptions::default();
        let m = Matrix3x3([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let mut out = Vec::new();
        write_matrix3x3_columns(&mut out, &m).unwrap();

        let mut r = NifReader::new(&out, &opts);
        let rows = read_matrix3x3(&mut r).unwrap();
        assert_eq!(rows.0[0], [1.0, 4.0, 7.0]);

        let mut r = NifReader::new(&out, &opts);
        assert_eq!(read_matrix3x3_columns(&mut r).unwrap(), m);
    }

    #[test]
    fn count_limit_is_enforced() {
        let opts = NifOptions {
            max_array_len: 2,
            ..Default::default()
        };
        let raw = 3u32.to_le_bytes();
        let mut r = NifReader::new(&raw, &opts);
        let track: Result<KeyTrack<f32>> =
            read_key_track(&mut r, "float", TagLayout::Always, true);
        assert!(matches!(track, Err(NifError::InvalidData(_))));
    }
}
