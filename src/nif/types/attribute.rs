//! Typed block fields. Every attribute declares one kind from a closed table; the
//! kind decides the on-disk layout, whether the field carries links, and whether
//! those links own their targets.

use super::base::{BoundingBox, Matrix3x3};
use super::block::{BlockRef, LinkMap, WeakBlockRef};
use super::properties::{LightMode, VertexMode};
use super::textures::{
    AlphaFormat, ApplyMode, BumpMapInfo, ClampMode, FilterMode, MipMapFormat, PixelLayout,
    TextureSlot, TextureSource,
};
use crate::nif::error::{NifError, Result};
use crate::nif::parser::helpers::*;
use bevy_math::Vec3;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt::{self, Write as _};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Int,
    Short,
    Byte,
    Float,
    Float3,
    String,
    Link,
    Flags,
    Matrix,
    Properties,
    Children,
    Effects,
    Bones,
    BoundingBox,
    VertMode,
    LightMode,
    Texture,
    BumpMap,
    ApplyMode,
    TexSource,
    PixelLayout,
    MipMapFormat,
    AlphaFormat,
    Parent,
    Root,
}

static ATTR_KINDS: &[(&str, AttrKind)] = &[
    ("int", AttrKind::Int),
    ("short", AttrKind::Short),
    ("byte", AttrKind::Byte),
    ("float", AttrKind::Float),
    ("float3", AttrKind::Float3),
    ("string", AttrKind::String),
    ("link", AttrKind::Link),
    ("flags", AttrKind::Flags),
    ("matrix", AttrKind::Matrix),
    ("properties", AttrKind::Properties),
    ("children", AttrKind::Children),
    ("effects", AttrKind::Effects),
    ("bones", AttrKind::Bones),
    ("bbox", AttrKind::BoundingBox),
    ("vertmode", AttrKind::VertMode),
    ("lightmode", AttrKind::LightMode),
    ("texture", AttrKind::Texture),
    ("bumpmap", AttrKind::BumpMap),
    ("applymode", AttrKind::ApplyMode),
    ("texsource", AttrKind::TexSource),
    ("pixellayout", AttrKind::PixelLayout),
    ("mipmapformat", AttrKind::MipMapFormat),
    ("alphaformat", AttrKind::AlphaFormat),
    ("parent", AttrKind::Parent),
    ("root", AttrKind::Root),
];

impl AttrKind {
    pub fn from_name(name: &str) -> Result<Self> {
        ATTR_KINDS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| NifError::UnknownAttributeKind(name.to_string()))
    }

    pub fn name(self) -> &'static str {
        ATTR_KINDS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map_or("?", |(n, _)| *n)
    }

    pub fn has_links(self) -> bool {
        matches!(
            self,
            AttrKind::Link
                | AttrKind::Properties
                | AttrKind::Children
                | AttrKind::Effects
                | AttrKind::Bones
                | AttrKind::Texture
                | AttrKind::BumpMap
                | AttrKind::TexSource
                | AttrKind::Parent
                | AttrKind::Root
        )
    }

    /// Child links share ownership of their target and make the owner its parent.
    /// Cross references (bones, skeleton root, controller target) are weak.
    pub fn owns_targets(self) -> bool {
        self.has_links() && !matches!(self, AttrKind::Bones | AttrKind::Parent | AttrKind::Root)
    }

    fn default_value(self) -> AttrValue {
        match self {
            AttrKind::Int => AttrValue::Int(0),
            AttrKind::Short => AttrValue::Short(0),
            AttrKind::Byte => AttrValue::Byte(0),
            AttrKind::Float => AttrValue::Float(0.0),
            AttrKind::Float3 => AttrValue::Float3(Vec3::ZERO),
            AttrKind::String => AttrValue::String(String::new()),
            AttrKind::Link | AttrKind::Parent | AttrKind::Root => AttrValue::Link(Link::Null),
            AttrKind::Flags => AttrValue::Flags(0),
            AttrKind::Matrix => AttrValue::Matrix(Matrix3x3::default()),
            AttrKind::Properties | AttrKind::Children | AttrKind::Effects | AttrKind::Bones => {
                AttrValue::LinkGroup(Vec::new())
            }
            AttrKind::BoundingBox => AttrValue::BoundingBox(None),
            AttrKind::VertMode
            | AttrKind::LightMode
            | AttrKind::ApplyMode
            | AttrKind::PixelLayout
            | AttrKind::MipMapFormat
            | AttrKind::AlphaFormat => AttrValue::Mode(0),
            AttrKind::Texture => AttrValue::Texture(TextureSlot::default()),
            AttrKind::BumpMap => AttrValue::Texture(TextureSlot {
                bump_map: Some(BumpMapInfo::default()),
                ..Default::default()
            }),
            AttrKind::TexSource => AttrValue::TexSource(TextureSource::default()),
        }
    }
}

/// A reference to another block: unresolved file index, owning handle, or weak
/// cross reference. Never both an index and a handle.
#[derive(Debug, Clone, Default)]
pub enum Link {
    #[default]
    Null,
    Index(u32),
    Block(BlockRef),
    Weak(WeakBlockRef),
}

impl Link {
    pub fn to(target: Option<&BlockRef>, owning: bool) -> Link {
        match target {
            None => Link::Null,
            Some(b) if owning => Link::Block(b.clone()),
            Some(b) => Link::Weak(b.downgrade()),
        }
    }

    /// The live target, if resolved.
    pub fn target(&self) -> Option<BlockRef> {
        match self {
            Link::Block(b) => Some(b.clone()),
            Link::Weak(w) => w.upgrade(),
            Link::Null | Link::Index(_) => None,
        }
    }

    fn read(r: &mut NifReader<'_>) -> Result<Link> {
        Ok(read_link_index(r)?.map_or(Link::Null, Link::Index))
    }

    fn write<W: Write>(&self, out: &mut W, links: &LinkMap) -> Result<()> {
        let index = match self {
            Link::Null => None,
            Link::Index(i) => Some(*i),
            Link::Block(b) => Some(links.require(b)?),
            Link::Weak(w) => match w.upgrade() {
                Some(b) => Some(links.require(&b)?),
                None => None,
            },
        };
        write_link_index(out, index)
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Link::Index(a), Link::Index(b)) => a == b,
            (Link::Index(_), _) | (_, Link::Index(_)) => false,
            _ => self.target() == other.target(),
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Link::Index(i) => write!(f, "[{}]", i),
            other => match other.target() {
                Some(b) => write!(f, "{}", b),
                None => write!(f, "None"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(u32),
    Short(u16),
    Byte(u8),
    Float(f32),
    Float3(Vec3),
    String(String),
    Link(Link),
    Flags(u16),
    Matrix(Matrix3x3),
    LinkGroup(Vec<Link>),
    BoundingBox(Option<BoundingBox>),
    /// Raw enum word (vertex mode, apply mode, pixel layout, ...).
    Mode(u32),
    Texture(TextureSlot),
    TexSource(TextureSource),
}

#[derive(Debug, Clone)]
pub struct Attr {
    name: String,
    kind: AttrKind,
    value: AttrValue,
}

impl Attr {
    pub fn new(kind: AttrKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            value: kind.default_value(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AttrKind {
        self.kind
    }

    pub fn value(&self) -> &AttrValue {
        &self.value
    }

    /// Replaces the value. Link targets must stay as they are: retargeting goes
    /// through `BlockRef::set_link` so parent edges stay consistent.
    pub fn set(&mut self, value: AttrValue) -> Result<()> {
        let same_shape =
            std::mem::discriminant(&value) == std::mem::discriminant(&self.value);
        if !same_shape || (self.kind.has_links() && value_links(&value) != self.links()) {
            return Err(self.kind_mismatch());
        }
        self.value = value;
        Ok(())
    }

    fn kind_mismatch(&self) -> NifError {
        NifError::AttributeKindMismatch {
            name: self.name.clone(),
        }
    }

    pub fn as_int(&self) -> Result<u32> {
        match self.value {
            AttrValue::Int(v) | AttrValue::Mode(v) => Ok(v),
            AttrValue::Short(v) | AttrValue::Flags(v) => Ok(u32::from(v)),
            AttrValue::Byte(v) => Ok(u32::from(v)),
            _ => Err(self.kind_mismatch()),
        }
    }

    pub fn as_float(&self) -> Result<f32> {
        match self.value {
            AttrValue::Float(v) => Ok(v),
            _ => Err(self.kind_mismatch()),
        }
    }

    pub fn as_float3(&self) -> Result<Vec3> {
        match self.value {
            AttrValue::Float3(v) => Ok(v),
            _ => Err(self.kind_mismatch()),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match &self.value {
            AttrValue::String(s) => Ok(s),
            _ => Err(self.kind_mismatch()),
        }
    }

    pub fn as_matrix(&self) -> Result<Matrix3x3> {
        match self.value {
            AttrValue::Matrix(m) => Ok(m),
            _ => Err(self.kind_mismatch()),
        }
    }

    pub fn as_link(&self) -> Result<Option<BlockRef>> {
        match &self.value {
            AttrValue::Link(l) => Ok(l.target()),
            _ => Err(self.kind_mismatch()),
        }
    }

    /// Live targets of a link group, nulls dropped.
    pub fn as_links(&self) -> Result<Vec<BlockRef>> {
        match &self.value {
            AttrValue::LinkGroup(group) => Ok(group.iter().filter_map(Link::target).collect()),
            _ => Err(self.kind_mismatch()),
        }
    }

    pub fn as_texture(&self) -> Result<&TextureSlot> {
        match &self.value {
            AttrValue::Texture(t) => Ok(t),
            _ => Err(self.kind_mismatch()),
        }
    }

    pub fn as_texture_source(&self) -> Result<&TextureSource> {
        match &self.value {
            AttrValue::TexSource(t) => Ok(t),
            _ => Err(self.kind_mismatch()),
        }
    }

    pub(crate) fn links(&self) -> Vec<&Link> {
        value_links(&self.value)
    }

    pub(crate) fn links_mut(&mut self) -> Vec<&mut Link> {
        match &mut self.value {
            AttrValue::Link(l) => vec![l],
            AttrValue::LinkGroup(group) => group.iter_mut().collect(),
            AttrValue::Texture(slot) if slot.is_used => vec![&mut slot.source],
            AttrValue::TexSource(TextureSource::Internal { pixel_data, .. }) => vec![pixel_data],
            _ => Vec::new(),
        }
    }

    pub(crate) fn link_group_mut(&mut self) -> Result<&mut Vec<Link>> {
        match &mut self.value {
            AttrValue::LinkGroup(group) => Ok(group),
            _ => Err(NifError::AttributeKindMismatch {
                name: self.name.clone(),
            }),
        }
    }

    pub(crate) fn single_link_mut(&mut self) -> Result<&mut Link> {
        match &mut self.value {
            AttrValue::Link(l) => Ok(l),
            AttrValue::Texture(slot) => {
                slot.is_used = true;
                Ok(&mut slot.source)
            }
            AttrValue::TexSource(source) => {
                if let TextureSource::External { .. } = source {
                    *source = TextureSource::Internal {
                        unknown_byte: 0,
                        pixel_data: Link::Null,
                    };
                }
                match source {
                    TextureSource::Internal { pixel_data, .. } => Ok(pixel_data),
                    TextureSource::External { .. } => Err(NifError::AttributeKindMismatch {
                        name: self.name.clone(),
                    }),
                }
            }
            _ => Err(NifError::AttributeKindMismatch {
                name: self.name.clone(),
            }),
        }
    }

    pub fn read(&mut self, r: &mut NifReader<'_>) -> Result<()> {
        self.value = match self.kind {
            AttrKind::Int => AttrValue::Int(r.read_u32::<LittleEndian>()?),
            AttrKind::Short => AttrValue::Short(r.read_u16::<LittleEndian>()?),
            AttrKind::Byte => AttrValue::Byte(r.read_u8()?),
            AttrKind::Float => AttrValue::Float(r.read_f32::<LittleEndian>()?),
            AttrKind::Float3 => AttrValue::Float3(read_vector3(r)?),
            AttrKind::String => AttrValue::String(read_nif_string(r)?),
            AttrKind::Link | AttrKind::Parent | AttrKind::Root => AttrValue::Link(Link::read(r)?),
            AttrKind::Flags => AttrValue::Flags(r.read_u16::<LittleEndian>()?),
            AttrKind::Matrix => AttrValue::Matrix(read_matrix3x3(r)?),
            AttrKind::Properties | AttrKind::Children | AttrKind::Effects | AttrKind::Bones => {
                let raw = r.read_u32::<LittleEndian>()?;
                let count = r.check_count(raw, &self.name)?;
                AttrValue::LinkGroup(read_vec(r, count, Link::read)?)
            }
            AttrKind::BoundingBox => AttrValue::BoundingBox(read_bounding_box(r)?),
            AttrKind::VertMode
            | AttrKind::LightMode
            | AttrKind::ApplyMode
            | AttrKind::PixelLayout
            | AttrKind::MipMapFormat
            | AttrKind::AlphaFormat => AttrValue::Mode(r.read_u32::<LittleEndian>()?),
            AttrKind::Texture => AttrValue::Texture(read_texture_slot(r, false)?),
            AttrKind::BumpMap => AttrValue::Texture(read_texture_slot(r, true)?),
            AttrKind::TexSource => AttrValue::TexSource(read_texture_source(r)?),
        };
        Ok(())
    }

    pub fn write<W: Write>(&self, out: &mut W, links: &LinkMap) -> Result<()> {
        match &self.value {
            AttrValue::Int(v) | AttrValue::Mode(v) => out.write_u32::<LittleEndian>(*v)?,
            AttrValue::Short(v) | AttrValue::Flags(v) => out.write_u16::<LittleEndian>(*v)?,
            AttrValue::Byte(v) => out.write_u8(*v)?,
            AttrValue::Float(v) => out.write_f32::<LittleEndian>(*v)?,
            AttrValue::Float3(v) => write_vector3(out, *v)?,
            AttrValue::String(s) => write_nif_string(out, s)?,
            AttrValue::Link(l) => l.write(out, links)?,
            AttrValue::Matrix(m) => write_matrix3x3(out, m)?,
            AttrValue::LinkGroup(group) => {
                out.write_u32::<LittleEndian>(group.len() as u32)?;
                for link in group {
                    link.write(out, links)?;
                }
            }
            AttrValue::BoundingBox(bbox) => write_bounding_box(out, bbox.as_ref())?,
            AttrValue::Texture(slot) => write_texture_slot(out, slot, links)?,
            AttrValue::TexSource(source) => write_texture_source(out, source, links)?,
        }
        Ok(())
    }

    /// `Name:  value`, one or more lines.
    pub fn as_string(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}:  ", self.name);
        match &self.value {
            AttrValue::Int(v) => {
                let _ = writeln!(out, "{}", v);
            }
            AttrValue::Short(v) => {
                let _ = writeln!(out, "{}", v);
            }
            AttrValue::Byte(v) => {
                let _ = writeln!(out, "{}", v);
            }
            AttrValue::Float(v) => {
                let _ = writeln!(out, "{:.3}", v);
            }
            AttrValue::Float3(v) => {
                let _ = writeln!(out, "({:.3}, {:.3}, {:.3})", v.x, v.y, v.z);
            }
            AttrValue::String(s) => {
                let _ = writeln!(out, "{}", s);
            }
            AttrValue::Link(l) => {
                let _ = writeln!(out, "{}", l);
            }
            AttrValue::Flags(v) => {
                let _ = writeln!(out, "0x{:04X}", v);
            }
            AttrValue::Matrix(m) => {
                let _ = write!(out, "\n{}", m);
            }
            AttrValue::LinkGroup(group) => {
                let _ = writeln!(out, "{}", group.len());
                for link in group {
                    let _ = writeln!(out, "   {}", link);
                }
            }
            AttrValue::BoundingBox(None) => out.push_str("None\n"),
            AttrValue::BoundingBox(Some(b)) => {
                let _ = write!(
                    out,
                    "\n   Unknown Int:  {}\n   Center:  ({:.3}, {:.3}, {:.3})\n   Extent:  ({:.3}, {:.3}, {:.3})\n   Axes:\n{}",
                    b.unknown_int,
                    b.center.x,
                    b.center.y,
                    b.center.z,
                    b.extent.x,
                    b.extent.y,
                    b.extent.z,
                    b.axes
                );
            }
            AttrValue::Mode(raw) => {
                let _ = writeln!(out, "{} ({})", self.mode_name(*raw), raw);
            }
            AttrValue::Texture(slot) => describe_texture_slot(&mut out, slot),
            AttrValue::TexSource(TextureSource::External { file_name }) => {
                let _ = writeln!(out, "External:  {}", file_name);
            }
            AttrValue::TexSource(TextureSource::Internal {
                unknown_byte,
                pixel_data,
            }) => {
                let _ = writeln!(
                    out,
                    "Internal:  {}  (Unknown Byte:  {})",
                    pixel_data, unknown_byte
                );
            }
        }
        out
    }

    fn mode_name(&self, raw: u32) -> String {
        match self.kind {
            AttrKind::VertMode => format!("{:?}", VertexMode::from(raw)),
            AttrKind::LightMode => format!("{:?}", LightMode::from(raw)),
            AttrKind::ApplyMode => format!("{:?}", ApplyMode::from(raw)),
            AttrKind::PixelLayout => format!("{:?}", PixelLayout::from(raw)),
            AttrKind::MipMapFormat => format!("{:?}", MipMapFormat::from(raw)),
            AttrKind::AlphaFormat => format!("{:?}", AlphaFormat::from(raw)),
            _ => String::new(),
        }
    }
}

fn read_bounding_box(r: &mut NifReader<'_>) -> Result<Option<BoundingBox>> {
    if !read_bool32(r)? {
        return Ok(None);
    }
    Ok(Some(BoundingBox {
        unknown_int: r.read_u32::<LittleEndian>()?,
        center: read_vector3(r)?,
        axes: read_matrix3x3(r)?,
        extent: read_vector3(r)?,
    }))
}

fn write_bounding_box<W: Write>(out: &mut W, bbox: Option<&BoundingBox>) -> Result<()> {
    write_bool32(out, bbox.is_some())?;
    if let Some(b) = bbox {
        out.write_u32::<LittleEndian>(b.unknown_int)?;
        write_vector3(out, b.center)?;
        write_matrix3x3(out, &b.axes)?;
        write_vector3(out, b.extent)?;
    }
    Ok(())
}

fn value_links(value: &AttrValue) -> Vec<&Link> {
    match value {
        AttrValue::Link(l) => vec![l],
        AttrValue::LinkGroup(group) => group.iter().collect(),
        AttrValue::Texture(slot) if slot.is_used => vec![&slot.source],
        AttrValue::TexSource(TextureSource::Internal { pixel_data, .. }) => vec![pixel_data],
        _ => Vec::new(),
    }
}

fn read_texture_slot(r: &mut NifReader<'_>, bump_map: bool) -> Result<TextureSlot> {
    let mut slot = TextureSlot {
        is_used: read_bool32(r)?,
        ..Default::default()
    };
    if !slot.is_used {
        return Ok(slot);
    }
    slot.source = Link::read(r)?;
    slot.clamp_mode = r.read_u32::<LittleEndian>()?;
    slot.filter_mode = r.read_u32::<LittleEndian>()?;
    slot.uv_set = r.read_u32::<LittleEndian>()?;
    slot.ps2_l = r.read_i16::<LittleEndian>()?;
    slot.ps2_k = r.read_i16::<LittleEndian>()?;
    slot.unknown_short = r.read_u16::<LittleEndian>()?;
    if bump_map {
        slot.bump_map = Some(BumpMapInfo {
            luma_scale: r.read_f32::<LittleEndian>()?,
            luma_offset: r.read_f32::<LittleEndian>()?,
            matrix: [
                r.read_f32::<LittleEndian>()?,
                r.read_f32::<LittleEndian>()?,
                r.read_f32::<LittleEndian>()?,
                r.read_f32::<LittleEndian>()?,
            ],
        });
    }
    Ok(slot)
}

fn write_texture_slot<W: Write>(out: &mut W, slot: &TextureSlot, links: &LinkMap) -> Result<()> {
    write_bool32(out, slot.is_used)?;
    if !slot.is_used {
        return Ok(());
    }
    slot.source.write(out, links)?;
    out.write_u32::<LittleEndian>(slot.clamp_mode)?;
    out.write_u32::<LittleEndian>(slot.filter_mode)?;
    out.write_u32::<LittleEndian>(slot.uv_set)?;
    out.write_i16::<LittleEndian>(slot.ps2_l)?;
    out.write_i16::<LittleEndian>(slot.ps2_k)?;
    out.write_u16::<LittleEndian>(slot.unknown_short)?;
    if let Some(bump) = &slot.bump_map {
        out.write_f32::<LittleEndian>(bump.luma_scale)?;
        out.write_f32::<LittleEndian>(bump.luma_offset)?;
        for v in bump.matrix {
            out.write_f32::<LittleEndian>(v)?;
        }
    }
    Ok(())
}

fn describe_texture_slot(out: &mut String, slot: &TextureSlot) {
    if !slot.is_used {
        out.push_str("None\n");
        return;
    }
    let _ = write!(
        out,
        "\n   Source:  {}\n   Clamp Mode:  {:?}\n   Filter Mode:  {:?}\n   UV Set:  {}\n   PS2 L:  {}\n   PS2 K:  {}\n   Unknown Short:  {}\n",
        slot.source,
        ClampMode::from(slot.clamp_mode),
        FilterMode::from(slot.filter_mode),
        slot.uv_set,
        slot.ps2_l,
        slot.ps2_k,
        slot.unknown_short
    );
    if let Some(bump) = &slot.bump_map {
        let _ = writeln!(
            out,
            "   Bump Map Luma Scale:  {:.3}\n   Bump Map Luma Offset:  {:.3}\n   Bump Map Matrix:  {:?}",
            bump.luma_scale, bump.luma_offset, bump.matrix
        );
    }
}

fn read_texture_source(r: &mut NifReader<'_>) -> Result<TextureSource> {
    if r.read_u8()? != 0 {
        Ok(TextureSource::External {
            file_name: read_nif_string(r)?,
        })
    } else {
        Ok(TextureSource::Internal {
            unknown_byte: r.read_u8()?,
            pixel_data: Link::read(r)?,
        })
    }
}

fn write_texture_source<W: Write>(
    out: &mut W,
    source: &TextureSource,
    links: &LinkMap,
) -> Result<()> {
    match source {
        TextureSource::External { file_name } => {
            out.write_u8(1)?;
            write_nif_string(out, file_name)?;
        }
        TextureSource::Internal {
            unknown_byte,
            pixel_data,
        } => {
            out.write_u8(0)?;
            out.write_u8(*unknown_byte)?;
            pixel_data.write(out, links)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nif::options::NifOptions;

    fn read_back(kind: AttrKind, bytes: &[u8]) -> Attr {
        let opts = NifOptions::default();
        let mut r = NifReader::new(bytes, &opts);
        let mut attr = Attr::new(kind, "Test");
        attr.read(&mut r).unwrap();
        assert_eq!(r.remaining(), 0);
        attr
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(matches!(
            AttrKind::from_name("cint"),
            Err(NifError::UnknownAttributeKind(k)) if k == "cint"
        ));
        assert_eq!(AttrKind::from_name("bumpmap").unwrap(), AttrKind::BumpMap);
        assert_eq!(AttrKind::BoundingBox.name(), "bbox");
    }

    #[test]
    fn cross_reference_kinds_do_not_own() {
        assert!(AttrKind::Children.owns_targets());
        assert!(AttrKind::TexSource.owns_targets());
        assert!(!AttrKind::Bones.owns_targets());
        assert!(!AttrKind::Root.owns_targets());
        assert!(!AttrKind::Float.has_links());
    }

    #[test]
    fn group_reads_raw_indices() {
        let mut bytes = 3u32.to_le_bytes().to_vec();
        for i in [4i32, -1, 7] {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
        let attr = read_back(AttrKind::Children, &bytes);
        assert_eq!(
            attr.value(),
            &AttrValue::LinkGroup(vec![Link::Index(4), Link::Null, Link::Index(7)])
        );

        let mut out = Vec::new();
        attr.write(&mut out, &LinkMap::default()).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn unused_texture_slot_is_four_bytes() {
        let attr = read_back(AttrKind::BumpMap, &0u32.to_le_bytes());
        assert!(!attr.as_texture().unwrap().is_used);
        assert!(attr.links().is_empty());
    }

    #[test]
    fn set_refuses_other_shapes_and_links() {
        let mut scale = Attr::new(AttrKind::Float, "Scale");
        scale.set(AttrValue::Float(2.0)).unwrap();
        assert_eq!(scale.as_float().unwrap(), 2.0);
        assert!(scale.set(AttrValue::Int(2)).is_err());

        let mut data = Attr::new(AttrKind::Link, "Data");
        assert!(data.set(AttrValue::Link(Link::Index(3))).is_err());
        data.set(AttrValue::Link(Link::Null)).unwrap();

        // slot parameters may change as long as the source stays put
        let mut slot = Attr::new(AttrKind::Texture, "Base Texture");
        slot.set(AttrValue::Texture(TextureSlot {
            clamp_mode: 3,
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(slot.as_texture().unwrap().clamp_mode, 3);
        assert!(slot
            .set(AttrValue::Texture(TextureSlot {
                is_used: true,
                source: Link::Index(0),
                ..Default::default()
            }))
            .is_err());
    }
}
