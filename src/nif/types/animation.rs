use crate::nif::error::{NifError, Result};
use crate::nif::parser::helpers::{
    NifReader, read_quat_wxyz, read_vector3, read_vector4, write_quat_wxyz, write_vector3,
    write_vector4,
};
use bevy_math::{Quat, Vec3, Vec4};
use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt::{Debug, Write as _};
use std::io::Write;

/// Interpolation tag of a key track. The set is closed: anything else makes the
/// record size past the tag unknowable. A track with no keys may still carry an
/// out-of-set tag, kept as `Unknown` so it is written back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyType {
    #[default]
    Unset,
    Linear,
    Quadratic, // value + forward + backward tangent
    Tbc,       // value + tension, bias, continuity
    Unknown(u32),
}

impl KeyType {
    pub fn from_raw(raw: u32, track: &'static str) -> Result<Self> {
        match raw {
            0 => Ok(KeyType::Unset),
            1 => Ok(KeyType::Linear),
            2 => Ok(KeyType::Quadratic),
            3 => Ok(KeyType::Tbc),
            // 4 is XYZ rotation, 5 is constant; neither is understood here
            _ => Err(NifError::UnsupportedKeyType {
                track,
                key_type: raw,
            }),
        }
    }

    /// Like [`KeyType::from_raw`], but keeps an unrecognized tag instead of failing.
    /// Only sound when no keys follow.
    pub fn from_raw_unchecked(raw: u32) -> Self {
        Self::from_raw(raw, "").unwrap_or(KeyType::Unknown(raw))
    }

    pub fn raw(self) -> u32 {
        match self {
            KeyType::Unset => 0,
            KeyType::Linear => 1,
            KeyType::Quadratic => 2,
            KeyType::Tbc => 3,
            KeyType::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tbc {
    pub tension: f32,
    pub bias: f32,
    pub continuity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key<T> {
    pub time: f32,
    pub value: T,
    pub forward_tangent: Option<T>,  // Quadratic
    pub backward_tangent: Option<T>, // Quadratic
    pub tbc: Option<Tbc>,            // TBC
}

impl<T> Key<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self {
            time,
            value,
            forward_tangent: None,
            backward_tangent: None,
            tbc: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyTrack<T> {
    pub key_type: KeyType,
    pub keys: Vec<Key<T>>,
}

impl<T> Default for KeyTrack<T> {
    fn default() -> Self {
        Self {
            key_type: KeyType::Unset,
            keys: Vec::new(),
        }
    }
}

impl<T: KeyValue> KeyTrack<T> {
    pub fn describe(&self, title: &str, verbose: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}:  {}", title, self.keys.len());
        if self.keys.is_empty() {
            return out;
        }
        let _ = writeln!(out, "   Key Type:  {:?}", self.key_type);
        if !verbose {
            out.push_str("   <<Data Not Shown>>\n");
            return out;
        }
        for key in &self.keys {
            let _ = write!(out, "   Time:  {:.3}  Value:  {:?}", key.time, key.value);
            if let (Some(f), Some(b)) = (key.forward_tangent, key.backward_tangent) {
                let _ = write!(out, "  F:  {:?}  B:  {:?}", f, b);
            }
            if let Some(tbc) = key.tbc {
                let _ = write!(
                    out,
                    "  T:  {:.3}  B:  {:.3}  C:  {:.3}",
                    tbc.tension, tbc.bias, tbc.continuity
                );
            }
            out.push('\n');
        }
        out
    }
}

/// A value that can be stored in a key.
pub trait KeyValue: Copy + Debug + PartialEq {
    fn read_value(r: &mut NifReader<'_>) -> Result<Self>;
    fn write_value<W: Write>(&self, out: &mut W) -> Result<()>;
}

impl KeyValue for f32 {
    fn read_value(r: &mut NifReader<'_>) -> Result<Self> {
        Ok(r.read_f32::<LittleEndian>()?)
    }
    fn write_value<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_f32::<LittleEndian>(*self)?;
        Ok(())
    }
}

impl KeyValue for u8 {
    fn read_value(r: &mut NifReader<'_>) -> Result<Self> {
        Ok(r.read_u8()?)
    }
    fn write_value<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_u8(*self)?;
        Ok(())
    }
}

impl KeyValue for Vec3 {
    fn read_value(r: &mut NifReader<'_>) -> Result<Self> {
        read_vector3(r)
    }
    fn write_value<W: Write>(&self, out: &mut W) -> Result<()> {
        write_vector3(out, *self)
    }
}

impl KeyValue for Vec4 {
    fn read_value(r: &mut NifReader<'_>) -> Result<Self> {
        read_vector4(r)
    }
    fn write_value<W: Write>(&self, out: &mut W) -> Result<()> {
        write_vector4(out, *self)
    }
}

impl KeyValue for Quat {
    fn read_value(r: &mut NifReader<'_>) -> Result<Self> {
        read_quat_wxyz(r)
    }
    fn write_value<W: Write>(&self, out: &mut W) -> Result<()> {
        write_quat_wxyz(out, *self)
    }
}

/// NiKeyframeData payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeData {
    pub rotations: KeyTrack<Quat>,
    pub translations: KeyTrack<Vec3>,
    pub scales: KeyTrack<f32>,
}

/// NiUVData payload: U offset, V offset, U tiling, V tiling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UvData {
    pub groups: [KeyTrack<f32>; 4],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphTarget {
    pub keys: KeyTrack<f32>,
    pub vectors: Vec<Vec3>,
}

/// NiMorphData payload. Every target holds one offset per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphData {
    pub vertex_count: u32,
    pub relative_targets: u8,
    pub morphs: Vec<MorphTarget>,
}

impl MorphData {
    pub fn describe(&self, verbose: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Morph Count:  {}\nVert Count:  {}\nRelative Targets:  {}",
            self.morphs.len(),
            self.vertex_count,
            self.relative_targets
        );
        for (i, morph) in self.morphs.iter().enumerate() {
            out.push_str(&morph.keys.describe(&format!("Morph {} Keys", i + 1), verbose));
            if verbose {
                for v in &morph.vectors {
                    let _ = writeln!(out, "   ({:.3}, {:.3}, {:.3})", v.x, v.y, v.z);
                }
            } else if !morph.vectors.is_empty() {
                out.push_str("   Vectors:  <<Data Not Shown>>\n");
            }
        }
        out
    }
}

bitflags! {
    /// NiTimeController flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControllerFlags: u16 {
        const APP_INIT = 0x0001; // unset means APP_TIME
        const REVERSE = 0x0002;  // wins over CLAMP when both are set
        const CLAMP = 0x0004;    // neither REVERSE nor CLAMP means LOOP
        const ACTIVE = 0x0008;
    }
}

impl ControllerFlags {
    pub fn analysis(self) -> String {
        let app = if self.contains(ControllerFlags::APP_INIT) {
            "APP_INIT"
        } else {
            "APP_TIME"
        };
        let cycle = if self.contains(ControllerFlags::REVERSE) {
            "REVERSE"
        } else if self.contains(ControllerFlags::CLAMP) {
            "CLAMP"
        } else {
            "LOOP"
        };
        let active = if self.contains(ControllerFlags::ACTIVE) {
            "enabled"
        } else {
            "disabled"
        };
        format!(
            "   Application Flag:  {}\n   Cycle Type:  {}\n   Active:  {}\n",
            app, cycle, active
        )
    }
}
