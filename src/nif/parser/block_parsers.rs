// src/nif/parser/block_parsers.rs
//
// Static registry of every block type this crate can build, keyed by the type name
// that precedes each block on disk.

use crate::nif::error::{NifError, Result};
use crate::nif::types::*;

type Fields = &'static [(&'static str, &'static str)];

pub struct BlockSchema {
    pub name: &'static str,
    /// (kind, name) runs, concatenated in order.
    pub fields: &'static [Fields],
    pub capabilities: &'static [Capability],
    pub data: fn() -> BlockData,
}

// --- Shared field runs (v4.0.0.2) ---

const OBJECT_NET: Fields = &[
    ("string", "Name"),
    ("link", "Extra Data"),
    ("link", "Controller"),
];

const AV_OBJECT: Fields = &[
    ("flags", "Flags"),
    ("float3", "Translation"),
    ("matrix", "Rotation"),
    ("float", "Scale"),
    ("float3", "Velocity"),
    ("properties", "Properties"),
    ("bbox", "Bounding Box"),
];

const NODE: Fields = &[("children", "Children"), ("effects", "Effects")];

const TRI_SHAPE: Fields = &[("link", "Data"), ("link", "Skin Instance")];

const TIME_CONTROLLER: Fields = &[
    ("link", "Next Controller"),
    ("flags", "Flags"),
    ("float", "Frequency"),
    ("float", "Phase"),
    ("float", "Start Time"),
    ("float", "Stop Time"),
    ("parent", "Target Node"),
];

const DATA_LINK: Fields = &[("link", "Data")];
const FLAGS_ONLY: Fields = &[("flags", "Flags")];
const EXTRA_DATA: Fields = &[("link", "Next Extra Data")];

const TEXTURE_SLOTS: Fields = &[
    ("texture", "Base Texture"),
    ("texture", "Dark Texture"),
    ("texture", "Detail Texture"),
    ("texture", "Gloss Texture"),
    ("texture", "Glow Texture"),
    ("bumpmap", "Bump Map Texture"),
    ("texture", "Decal 0 Texture"),
    ("texture", "Decal 1 Texture"),
    ("texture", "Decal 2 Texture"),
    ("texture", "Decal 3 Texture"),
];

const NODE_CAPS: &[Capability] = &[Capability::Node];
const CONTROLLER_CAPS: &[Capability] = &[Capability::Controller];
const NONE: &[Capability] = &[];

fn generic() -> BlockData {
    BlockData::Generic
}

macro_rules! node {
    ($name:expr) => {
        BlockSchema {
            name: $name,
            fields: &[OBJECT_NET, AV_OBJECT, NODE],
            capabilities: NODE_CAPS,
            data: generic,
        }
    };
}

macro_rules! controller {
    ($name:expr, $fields:expr) => {
        BlockSchema {
            name: $name,
            fields: &[TIME_CONTROLLER, $fields],
            capabilities: CONTROLLER_CAPS,
            data: generic,
        }
    };
}

macro_rules! property {
    ($name:expr, $fields:expr) => {
        BlockSchema {
            name: $name,
            fields: &[OBJECT_NET, $fields],
            capabilities: NONE,
            data: generic,
        }
    };
}

macro_rules! data_block {
    ($name:expr, $fields:expr, $caps:expr, $ctor:expr) => {
        BlockSchema {
            name: $name,
            fields: $fields,
            capabilities: $caps,
            data: $ctor,
        }
    };
}

static BLOCK_SCHEMAS: &[BlockSchema] = &[
    // --- Scene graph ---
    node!("NiNode"),
    node!("NiBillboardNode"),
    node!("NiBSAnimationNode"),
    node!("NiBSParticleNode"),
    node!("RootCollisionNode"),
    node!("AvoidNode"),
    BlockSchema {
        name: "NiTriShape",
        fields: &[OBJECT_NET, AV_OBJECT, TRI_SHAPE],
        capabilities: NODE_CAPS,
        data: generic,
    },
    BlockSchema {
        name: "NiSkinInstance",
        fields: &[&[
            ("link", "Data"),
            ("root", "Skeleton Root"),
            ("bones", "Bones"),
        ]],
        capabilities: &[Capability::SkinInstance],
        data: generic,
    },
    // --- Controllers ---
    controller!("NiKeyframeController", DATA_LINK),
    controller!("NiVisController", DATA_LINK),
    controller!("NiAlphaController", DATA_LINK),
    controller!("NiMaterialColorController", DATA_LINK),
    controller!(
        "NiUVController",
        &[("short", "Unknown Short"), ("link", "Data")]
    ),
    controller!(
        "NiGeomMorpherController",
        &[("link", "Data"), ("byte", "Always Update")]
    ),
    // --- Properties ---
    property!("NiAlphaProperty", &[("flags", "Flags"), ("byte", "Threshold")]),
    property!(
        "NiMaterialProperty",
        &[
            ("flags", "Flags"),
            ("float3", "Ambient Color"),
            ("float3", "Diffuse Color"),
            ("float3", "Specular Color"),
            ("float3", "Emissive Color"),
            ("float", "Glossiness"),
            ("float", "Alpha"),
        ]
    ),
    property!(
        "NiVertexColorProperty",
        &[
            ("flags", "Flags"),
            ("vertmode", "Vertex Mode"),
            ("lightmode", "Lighting Mode"),
        ]
    ),
    property!("NiWireframeProperty", FLAGS_ONLY),
    property!("NiZBufferProperty", FLAGS_ONLY),
    property!("NiSpecularProperty", FLAGS_ONLY),
    property!("NiDitherProperty", FLAGS_ONLY),
    property!("NiShadeProperty", FLAGS_ONLY),
    property!(
        "NiSourceTexture",
        &[
            ("texsource", "Texture Source"),
            ("pixellayout", "Pixel Layout"),
            ("mipmapformat", "Use Mipmaps"),
            ("alphaformat", "Alpha Format"),
            ("byte", "Is Static"),
        ]
    ),
    data_block!(
        "NiTexturingProperty",
        &[
            OBJECT_NET,
            &[("flags", "Flags"), ("applymode", "Apply Mode")],
            TEXTURE_SLOTS,
        ],
        NONE,
        || BlockData::Texturing(TexturingData::default())
    ),
    // --- Extra data ---
    data_block!(
        "NiStringExtraData",
        &[
            EXTRA_DATA,
            &[("int", "Bytes Remaining"), ("string", "String Data")],
        ],
        NONE,
        generic
    ),
    data_block!(
        "NiTextKeyExtraData",
        &[EXTRA_DATA, &[("int", "Unknown Int")]],
        NONE,
        || BlockData::TextKeys(Vec::new())
    ),
    data_block!(
        "NiVertWeightsExtraData",
        &[EXTRA_DATA, &[("int", "Bytes")]],
        NONE,
        || BlockData::VertWeights(Vec::new())
    ),
    // --- Data blocks with hand-written layouts ---
    data_block!(
        "NiTriShapeData",
        &[&[("float3", "Center"), ("float", "Radius")]],
        &[Capability::TriShapeData],
        || BlockData::TriShapeData(TriShapeData::default())
    ),
    data_block!("NiSkinData", &[], &[Capability::SkinData], || {
        BlockData::SkinData(SkinData::default())
    }),
    data_block!("NiKeyframeData", &[], NONE, || BlockData::KeyframeData(
        KeyframeData::default()
    )),
    data_block!("NiColorData", &[], NONE, || BlockData::ColorData(
        KeyTrack::default()
    )),
    data_block!("NiFloatData", &[], NONE, || BlockData::FloatData(
        KeyTrack::default()
    )),
    data_block!("NiPosData", &[], NONE, || BlockData::PosData(
        KeyTrack::default()
    )),
    data_block!("NiVisData", &[], NONE, || BlockData::VisData(Vec::new())),
    data_block!("NiUVData", &[], NONE, || BlockData::UvData(UvData::default())),
    data_block!("NiMorphData", &[], NONE, || BlockData::MorphData(
        MorphData::default()
    )),
    data_block!("NiPixelData", &[], NONE, || BlockData::PixelData(
        PixelData::default()
    )),
    data_block!("NiRotatingParticlesData", &[], NONE, || {
        BlockData::RotatingParticlesData(RotatingParticlesData::default())
    }),
];

pub fn block_schema(type_name: &str) -> Option<&'static BlockSchema> {
    BLOCK_SCHEMAS.iter().find(|s| s.name == type_name)
}

pub fn known_block_types() -> impl Iterator<Item = &'static str> {
    BLOCK_SCHEMAS.iter().map(|s| s.name)
}

/// A fresh block with its attribute list declared and every value defaulted.
pub fn create_block(type_name: &str) -> Result<BlockRef> {
    let schema =
        block_schema(type_name).ok_or_else(|| NifError::UnknownBlockType(type_name.to_string()))?;
    let mut block = Block::new(schema.name, schema.capabilities, (schema.data)());
    for (kind, name) in schema.fields.iter().flat_map(|run| run.iter()) {
        block.add_attribute(kind, name)?;
    }
    Ok(BlockRef::new(block))
}
