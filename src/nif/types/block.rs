use super::animation::{ControllerFlags, Key, KeyTrack, KeyframeData, MorphData, UvData};
use super::attribute::{Attr, AttrKind, Link};
use super::base::Matrix4x4;
use super::extra_data::TextKey;
use super::geometry::TriShapeData;
use super::particles::RotatingParticlesData;
use super::skin::SkinData;
use super::textures::{PixelData, TexturingData};
use crate::nif::error::{NifError, Result};
use crate::nif::parser::{self, helpers::NifReader};
use bevy_log::warn;
use bevy_math::{Vec3, Vec4};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::rc::{Rc, Weak};

/// What a block can be asked to do beyond holding attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Scene-graph transforms and a bind position.
    Node,
    /// Time controller flag word and chain.
    Controller,
    TriShapeData,
    SkinInstance,
    SkinData,
}

/// Payload of blocks whose layout is not a plain attribute list.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockData {
    Generic,
    TriShapeData(TriShapeData),
    SkinData(SkinData),
    KeyframeData(KeyframeData),
    ColorData(KeyTrack<Vec4>),
    FloatData(KeyTrack<f32>),
    PosData(KeyTrack<Vec3>),
    VisData(Vec<Key<u8>>),
    UvData(UvData),
    MorphData(MorphData),
    PixelData(PixelData),
    RotatingParticlesData(RotatingParticlesData),
    TextKeys(Vec<TextKey>),
    VertWeights(Vec<f32>),
    Texturing(TexturingData),
}

/// Ordered attributes plus a name index.
#[derive(Debug, Clone, Default)]
pub struct AttrList {
    block_type: &'static str,
    attrs: Vec<Attr>,
    by_name: HashMap<String, usize>,
}

impl AttrList {
    fn new(block_type: &'static str) -> Self {
        Self {
            block_type,
            ..Default::default()
        }
    }

    fn add(&mut self, kind: &str, name: &str) -> Result<()> {
        let kind = AttrKind::from_name(kind)?;
        if self.by_name.contains_key(name) {
            return Err(NifError::DuplicateAttribute {
                block_type: self.block_type.to_string(),
                name: name.to_string(),
            });
        }
        self.by_name.insert(name.to_string(), self.attrs.len());
        self.attrs.push(Attr::new(kind, name));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Attr> {
        self.by_name.get(name).map(|&i| &self.attrs[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Attr> {
        match self.by_name.get(name) {
            Some(&i) => self.attrs.get_mut(i),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.attrs.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Attr> {
        self.attrs.iter_mut()
    }

    pub(crate) fn read_all(&mut self, r: &mut NifReader<'_>) -> Result<()> {
        for attr in self.attrs.iter_mut() {
            attr.read(r)?;
        }
        Ok(())
    }

    pub(crate) fn write_all<W: Write>(&self, out: &mut W, links: &LinkMap) -> Result<()> {
        for attr in &self.attrs {
            attr.write(out, links)?;
        }
        Ok(())
    }

    /// Reads attributes from `first` up to and including `last`, in declared order.
    pub(crate) fn read_range(
        &mut self,
        r: &mut NifReader<'_>,
        first: &str,
        last: &str,
    ) -> Result<()> {
        let (start, end) = self.range(first, last)?;
        for attr in &mut self.attrs[start..=end] {
            attr.read(r)?;
        }
        Ok(())
    }

    pub(crate) fn write_range<W: Write>(
        &self,
        out: &mut W,
        links: &LinkMap,
        first: &str,
        last: &str,
    ) -> Result<()> {
        let (start, end) = self.range(first, last)?;
        for attr in &self.attrs[start..=end] {
            attr.write(out, links)?;
        }
        Ok(())
    }

    fn range(&self, first: &str, last: &str) -> Result<(usize, usize)> {
        let position = |name: &str| {
            self.by_name
                .get(name)
                .copied()
                .ok_or_else(|| NifError::MissingAttribute {
                    block_type: self.block_type.to_string(),
                    name: name.to_string(),
                })
        };
        Ok((position(first)?, position(last)?))
    }
}

pub struct Block {
    pub(crate) block_type: &'static str,
    pub(crate) capabilities: &'static [Capability],
    pub(crate) index: Option<u32>,
    pub(crate) attrs: AttrList,
    pub(crate) data: BlockData,
    parents: Vec<WeakBlockRef>,
    bind_position: Matrix4x4,
}

impl Block {
    pub fn new(
        block_type: &'static str,
        capabilities: &'static [Capability],
        data: BlockData,
    ) -> Self {
        Self {
            block_type,
            capabilities,
            index: None,
            attrs: AttrList::new(block_type),
            data,
            parents: Vec::new(),
            bind_position: Matrix4x4::IDENTITY,
        }
    }

    pub fn block_type(&self) -> &'static str {
        self.block_type
    }

    /// File position the block was read from, or was last written at.
    pub fn index(&self) -> Option<u32> {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: u32) {
        self.index = Some(index);
    }

    pub fn add_attribute(&mut self, kind: &str, name: &str) -> Result<()> {
        self.attrs.add(kind, name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attr> {
        self.attrs.get(name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Attr> {
        self.attrs.get_mut(name)
    }

    pub fn attribute_at(&self, index: usize) -> Result<&Attr> {
        self.attrs.attrs.get(index).ok_or(NifError::IndexOutOfRange {
            index,
            len: self.attrs.len(),
        })
    }

    pub fn attributes(&self) -> &AttrList {
        &self.attrs
    }

    /// Named attribute or a `MissingAttribute` error.
    pub fn require_attribute(&self, name: &str) -> Result<&Attr> {
        self.attrs
            .get(name)
            .ok_or_else(|| NifError::MissingAttribute {
                block_type: self.block_type.to_string(),
                name: name.to_string(),
            })
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.has_capability(capability) {
            Ok(())
        } else {
            Err(NifError::MissingCapability {
                block_type: self.block_type.to_string(),
                capability,
            })
        }
    }

    pub fn data(&self) -> &BlockData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut BlockData {
        &mut self.data
    }

    pub fn tri_shape_data(&self) -> Result<&TriShapeData> {
        match &self.data {
            BlockData::TriShapeData(d) => Ok(d),
            _ => Err(self.missing(Capability::TriShapeData)),
        }
    }

    pub fn tri_shape_data_mut(&mut self) -> Result<&mut TriShapeData> {
        match &mut self.data {
            BlockData::TriShapeData(d) => Ok(d),
            _ => Err(NifError::MissingCapability {
                block_type: self.block_type.to_string(),
                capability: Capability::TriShapeData,
            }),
        }
    }

    pub fn skin_data(&self) -> Result<&SkinData> {
        match &self.data {
            BlockData::SkinData(d) => Ok(d),
            _ => Err(self.missing(Capability::SkinData)),
        }
    }

    pub fn skin_data_mut(&mut self) -> Result<&mut SkinData> {
        match &mut self.data {
            BlockData::SkinData(d) => Ok(d),
            _ => Err(NifError::MissingCapability {
                block_type: self.block_type.to_string(),
                capability: Capability::SkinData,
            }),
        }
    }

    fn missing(&self, capability: Capability) -> NifError {
        NifError::MissingCapability {
            block_type: self.block_type.to_string(),
            capability,
        }
    }

    pub fn bind_position(&self) -> Result<Matrix4x4> {
        self.require(Capability::Node)?;
        Ok(self.bind_position)
    }

    pub fn set_bind_position(&mut self, m: Matrix4x4) -> Result<()> {
        self.require(Capability::Node)?;
        self.bind_position = m;
        Ok(())
    }

    /// Fills the block from `r`. The type name has already been consumed.
    pub fn read(&mut self, r: &mut NifReader<'_>) -> Result<()> {
        parser::read_block_body(self, r)
    }

    /// Writes the type name, then the body.
    pub fn write<W: Write>(&self, out: &mut W, links: &LinkMap) -> Result<()> {
        parser::helpers::write_nif_string(out, self.block_type)?;
        parser::write_block_body(self, out, links)
    }

    /// All link targets in attribute order, first occurrence kept, nulls dropped.
    fn link_targets(&self, filter: impl Fn(AttrKind) -> bool) -> Vec<BlockRef> {
        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for attr in self.attrs.iter().filter(|a| filter(a.kind())) {
            for link in attr.links() {
                if let Some(target) = link.target() {
                    if seen.insert(target.clone()) {
                        targets.push(target);
                    }
                }
            }
        }
        targets
    }

    pub fn as_string(&self, verbose: bool) -> String {
        let mut out = String::new();
        let parent = self.parents.iter().find_map(WeakBlockRef::upgrade);
        match parent {
            Some(p) => {
                let _ = writeln!(out, "Parent:  {}", p);
            }
            None => out.push_str("Parent:  None\n"),
        }
        for attr in self.attrs.iter() {
            out.push_str(&attr.as_string());
        }
        if self.has_capability(Capability::Controller) {
            if let Some(Ok(bits)) = self.attrs.get("Flags").map(Attr::as_int) {
                out.push_str("Flag Analysis:\n");
                out.push_str(&ControllerFlags::from_bits_retain(bits as u16).analysis());
            }
        }
        out.push_str(&describe_data(&self.data, verbose));
        out
    }
}

fn describe_data(data: &BlockData, verbose: bool) -> String {
    match data {
        BlockData::Generic => String::new(),
        BlockData::TriShapeData(d) => d.describe(verbose),
        BlockData::SkinData(d) => d.describe(verbose),
        BlockData::KeyframeData(d) => {
            let mut out = d.rotations.describe("Rotation Keys", verbose);
            out.push_str(&d.translations.describe("Translation Keys", verbose));
            out.push_str(&d.scales.describe("Scale Keys", verbose));
            out
        }
        BlockData::ColorData(track) => track.describe("Color Keys", verbose),
        BlockData::FloatData(track) => track.describe("Float Keys", verbose),
        BlockData::PosData(track) => track.describe("Position Keys", verbose),
        BlockData::VisData(keys) => {
            let mut out = format!("Visibility Keys:  {}\n", keys.len());
            if verbose {
                for key in keys {
                    let _ = writeln!(out, "   Time:  {:.3}  Visible:  {}", key.time, key.value);
                }
            } else if !keys.is_empty() {
                out.push_str("   <<Data Not Shown>>\n");
            }
            out
        }
        BlockData::UvData(d) => {
            let titles = ["U Offset", "V Offset", "U Tiling", "V Tiling"];
            titles
                .iter()
                .zip(d.groups.iter())
                .map(|(title, track)| track.describe(title, verbose))
                .collect()
        }
        BlockData::MorphData(d) => d.describe(verbose),
        BlockData::PixelData(d) => d.describe(),
        BlockData::RotatingParticlesData(d) => d.describe(verbose),
        BlockData::TextKeys(keys) => {
            let mut out = format!("Key Count:  {}\n", keys.len());
            if verbose {
                for key in keys {
                    let _ = writeln!(out, "   Time:  {:.3}  Text:  {}", key.time, key.text);
                }
            } else if !keys.is_empty() {
                out.push_str("   <<Data Not Shown>>\n");
            }
            out
        }
        BlockData::VertWeights(weights) => {
            let mut out = format!("Verts:  {}\n", weights.len());
            if verbose {
                for (i, w) in weights.iter().enumerate() {
                    let _ = writeln!(out, "   {}:  {:.3}", i, w);
                }
            } else if !weights.is_empty() {
                out.push_str("   <<Data Not Shown>>\n");
            }
            out
        }
        BlockData::Texturing(d) => format!("Texture Count:  {}\n", d.texture_count),
    }
}

/// Shared handle to a block. Equality and hashing are by identity.
#[derive(Clone)]
pub struct BlockRef(Rc<RefCell<Block>>);

/// Non-owning handle, used for parent edges and cross references.
#[derive(Clone, Default)]
pub struct WeakBlockRef(Weak<RefCell<Block>>);

impl BlockRef {
    pub fn new(block: Block) -> Self {
        BlockRef(Rc::new(RefCell::new(block)))
    }

    pub fn borrow(&self) -> Ref<'_, Block> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Block> {
        self.0.borrow_mut()
    }

    pub fn downgrade(&self) -> WeakBlockRef {
        WeakBlockRef(Rc::downgrade(&self.0))
    }

    pub fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn block_type(&self) -> &'static str {
        self.borrow().block_type
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.borrow().has_capability(capability)
    }

    /// Every block this one links to.
    pub fn links(&self) -> Vec<BlockRef> {
        self.borrow().link_targets(|_| true)
    }

    /// Targets of owning links only.
    pub fn child_links(&self) -> Vec<BlockRef> {
        self.borrow().link_targets(AttrKind::owns_targets)
    }

    /// Targets of weak cross references only.
    pub fn cross_links(&self) -> Vec<BlockRef> {
        self.borrow()
            .link_targets(|kind| kind.has_links() && !kind.owns_targets())
    }

    /// Turns every raw index into a handle from `table`. Out-of-range indices become
    /// null. Owning links register this block as the target's parent.
    pub fn fix_up_links(&self, table: &[BlockRef]) {
        let children = {
            let mut block = self.borrow_mut();
            let block_type = block.block_type;
            let mut children = Vec::new();
            for attr in block.attrs.iter_mut() {
                let owning = attr.kind().owns_targets();
                let name = attr.name().to_string();
                for link in attr.links_mut() {
                    let Link::Index(i) = *link else { continue };
                    match table.get(i as usize) {
                        Some(target) => {
                            *link = Link::to(Some(target), owning);
                            if owning {
                                children.push(target.clone());
                            }
                        }
                        None => {
                            warn!(
                                "{} '{}' links to block {} but the file has {} blocks",
                                block_type,
                                name,
                                i,
                                table.len()
                            );
                            *link = Link::Null;
                        }
                    }
                }
            }
            children
        };
        for child in children {
            child.add_parent(self);
        }
    }

    /// First recorded parent that is still alive.
    pub fn parent(&self) -> Option<BlockRef> {
        self.borrow().parents.iter().find_map(WeakBlockRef::upgrade)
    }

    pub fn parents(&self) -> Vec<BlockRef> {
        self.borrow()
            .parents
            .iter()
            .filter_map(WeakBlockRef::upgrade)
            .collect()
    }

    pub fn add_parent(&self, parent: &BlockRef) {
        let mut block = self.borrow_mut();
        block.parents.retain(WeakBlockRef::is_alive);
        block.parents.push(parent.downgrade());
    }

    /// Removes one occurrence of `parent`.
    pub fn remove_parent(&self, parent: &BlockRef) {
        let mut block = self.borrow_mut();
        if let Some(pos) = block.parents.iter().position(|p| p.points_to(parent)) {
            block.parents.remove(pos);
        }
    }

    /// Points a single-link attribute at `target`, keeping parent edges in step.
    pub fn set_link(&self, name: &str, target: Option<&BlockRef>) -> Result<()> {
        let (old, owning) = {
            let mut block = self.borrow_mut();
            let block_type = block.block_type;
            let attr = block
                .attrs
                .get_mut(name)
                .ok_or_else(|| NifError::MissingAttribute {
                    block_type: block_type.to_string(),
                    name: name.to_string(),
                })?;
            let owning = attr.kind().owns_targets();
            let link = attr.single_link_mut()?;
            let old = std::mem::replace(link, Link::to(target, owning));
            (old, owning)
        };
        if owning {
            if let Some(old) = old.target() {
                old.remove_parent(self);
            }
            if let Some(target) = target {
                target.add_parent(self);
            }
        }
        Ok(())
    }

    /// Appends `target` to a link group attribute.
    pub fn add_link(&self, name: &str, target: &BlockRef) -> Result<()> {
        let owning = {
            let mut block = self.borrow_mut();
            let block_type = block.block_type;
            let attr = block
                .attrs
                .get_mut(name)
                .ok_or_else(|| NifError::MissingAttribute {
                    block_type: block_type.to_string(),
                    name: name.to_string(),
                })?;
            let owning = attr.kind().owns_targets();
            attr.link_group_mut()?.push(Link::to(Some(target), owning));
            owning
        };
        if owning {
            target.add_parent(self);
        }
        Ok(())
    }

    /// Removes the first occurrence of `target` from a link group attribute.
    pub fn remove_link(&self, name: &str, target: &BlockRef) -> Result<bool> {
        let (removed, owning) = {
            let mut block = self.borrow_mut();
            let block_type = block.block_type;
            let attr = block
                .attrs
                .get_mut(name)
                .ok_or_else(|| NifError::MissingAttribute {
                    block_type: block_type.to_string(),
                    name: name.to_string(),
                })?;
            let owning = attr.kind().owns_targets();
            let group = attr.link_group_mut()?;
            let pos = group
                .iter()
                .position(|l| l.target().as_ref() == Some(target));
            (pos.map(|p| group.remove(p)).is_some(), owning)
        };
        if removed && owning {
            target.remove_parent(self);
        }
        Ok(removed)
    }
}

impl PartialEq for BlockRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for BlockRef {}

impl Hash for BlockRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state);
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(block) => match block.index {
                Some(i) => write!(f, "{} ({})", block.block_type, i),
                None => write!(f, "{}", block.block_type),
            },
            Err(_) => write!(f, "<borrowed block>"),
        }
    }
}

impl fmt::Debug for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockRef({})", self)
    }
}

impl WeakBlockRef {
    pub fn upgrade(&self) -> Option<BlockRef> {
        self.0.upgrade().map(BlockRef)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn points_to(&self, block: &BlockRef) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&block.0))
    }
}

impl PartialEq for WeakBlockRef {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for WeakBlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(b) => write!(f, "Weak({})", b),
            None => write!(f, "Weak(dead)"),
        }
    }
}

/// Block handle to file index, built by the writer before any block is written.
#[derive(Debug, Default)]
pub struct LinkMap {
    indices: HashMap<BlockRef, u32>,
}

impl LinkMap {
    pub fn new(blocks: &[BlockRef]) -> Self {
        Self {
            indices: blocks
                .iter()
                .enumerate()
                .map(|(i, b)| (b.clone(), i as u32))
                .collect(),
        }
    }

    pub fn get(&self, block: &BlockRef) -> Option<u32> {
        self.indices.get(block).copied()
    }

    pub(crate) fn require(&self, block: &BlockRef) -> Result<u32> {
        self.get(block)
            .ok_or_else(|| NifError::UnindexedLink(block.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nif::parser::block_parsers::create_block;

    #[test]
    fn duplicate_and_unknown_attributes_fail() {
        let mut block = Block::new("Test", &[], BlockData::Generic);
        block.add_attribute("float", "Scale").unwrap();
        assert!(matches!(
            block.add_attribute("int", "Scale"),
            Err(NifError::DuplicateAttribute { .. })
        ));
        assert!(matches!(
            block.add_attribute("quaternion", "Spin"),
            Err(NifError::UnknownAttributeKind(_))
        ));
        assert!(block.attribute("Missing").is_none());
        assert!(matches!(
            block.attribute_at(1),
            Err(NifError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert_eq!(block.attribute_at(0).unwrap().name(), "Scale");
    }

    #[test]
    fn missing_range_end_names_the_block() {
        let mut block = Block::new("NiTriShapeData", &[], BlockData::Generic);
        block.add_attribute("float3", "Center").unwrap();
        let opts = crate::nif::options::NifOptions::default();
        let raw = [0u8; 16];
        let mut r = NifReader::new(&raw, &opts);
        let err = block.attrs.read_range(&mut r, "Center", "Radius").unwrap_err();
        assert!(matches!(
            &err,
            NifError::MissingAttribute { block_type, name }
                if block_type == "NiTriShapeData" && name == "Radius"
        ));
        assert!(err.to_string().contains("NiTriShapeData"));
    }

    #[test]
    fn fix_up_resolves_and_nulls_out_of_range() {
        let node = create_block("NiNode").unwrap();
        let child = create_block("NiNode").unwrap();
        {
            let mut b = node.borrow_mut();
            let children = b.attribute_mut("Children").unwrap().link_group_mut().unwrap();
            children.push(Link::Index(1));
            children.push(Link::Index(9));
            children.push(Link::Index(1));
        }
        let table = vec![node.clone(), child.clone()];
        node.fix_up_links(&table);

        assert_eq!(node.links(), vec![child.clone()]);
        let b = node.borrow();
        let group = b.attribute("Children").unwrap().value().clone();
        assert_eq!(
            group,
            super::super::attribute::AttrValue::LinkGroup(vec![
                Link::Block(child.clone()),
                Link::Null,
                Link::Block(child.clone()),
            ])
        );
        drop(b);
        assert_eq!(child.parent(), Some(node.clone()));
        assert_eq!(child.parents().len(), 2);
    }

    #[test]
    fn dropping_last_handle_frees_block_once() {
        let root = create_block("NiNode").unwrap();
        let child = create_block("NiNode").unwrap();
        root.add_link("Children", &child).unwrap();
        let weak_child = child.downgrade();
        let weak_root = root.downgrade();

        // the root owns the child and the child only points back weakly
        assert_eq!(child.strong_count(), 2);
        assert_eq!(root.strong_count(), 1);
        drop(child);
        assert!(weak_child.is_alive());

        drop(root);
        assert!(!weak_root.is_alive());
        assert!(!weak_child.is_alive());
    }

    #[test]
    fn cross_references_do_not_keep_targets_alive() {
        let skin = create_block("NiSkinInstance").unwrap();
        let bone = create_block("NiNode").unwrap();
        skin.add_link("Bones", &bone).unwrap();
        assert_eq!(bone.strong_count(), 1);
        assert!(bone.parent().is_none());
        assert_eq!(skin.cross_links(), vec![bone.clone()]);
        assert!(skin.child_links().is_empty());

        drop(bone);
        assert!(skin.links().is_empty());
    }

    #[test]
    fn set_link_moves_parent_edge() {
        let shape = create_block("NiTriShape").unwrap();
        let first = create_block("NiTriShapeData").unwrap();
        let second = create_block("NiTriShapeData").unwrap();

        shape.set_link("Data", Some(&first)).unwrap();
        assert_eq!(first.parent(), Some(shape.clone()));

        shape.set_link("Data", Some(&second)).unwrap();
        assert!(first.parent().is_none());
        assert_eq!(second.parent(), Some(shape.clone()));

        assert!(matches!(
            shape.set_link("Children", None),
            Err(NifError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn remove_parent_takes_one_occurrence() {
        let parent = create_block("NiNode").unwrap();
        let child = create_block("NiNode").unwrap();
        child.add_parent(&parent);
        child.add_parent(&parent);
        child.remove_parent(&parent);
        assert_eq!(child.parents().len(), 1);
        child.remove_parent(&parent);
        assert!(child.parent().is_none());
    }

    #[test]
    fn capability_is_checked() {
        let data = create_block("NiTriShapeData").unwrap();
        let err = data
            .borrow_mut()
            .set_bind_position(Matrix4x4::IDENTITY)
            .unwrap_err();
        assert!(matches!(
            err,
            NifError::MissingCapability {
                capability: Capability::Node,
                ..
            }
        ));
        assert!(data.borrow().tri_shape_data().is_ok());
        assert!(data.borrow().skin_data().is_err());
    }
}
