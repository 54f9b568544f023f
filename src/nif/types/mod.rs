//! In-memory model of a NIF file: blocks, their attributes, and the payloads of
//! blocks with hand-written layouts.

pub mod animation;
pub mod attribute;
pub mod base;
pub mod block;
pub mod extra_data;
pub mod geometry;
pub mod particles;
pub mod properties;
pub mod skin;
pub mod textures;

pub use animation::{
    ControllerFlags, Key, KeyTrack, KeyType, KeyValue, KeyframeData, MorphData, MorphTarget, Tbc,
    UvData,
};
pub use attribute::{Attr, AttrKind, AttrValue, Link};
pub use base::{BoundingBox, Matrix3x3, Matrix4x4, NifHeader};
pub use block::{AttrList, Block, BlockData, BlockRef, Capability, LinkMap, WeakBlockRef};
pub use extra_data::TextKey;
pub use geometry::{TriShapeData, Triangle};
pub use particles::RotatingParticlesData;
pub use properties::{LightMode, VertexMode};
pub use skin::{BoneBinding, SkinData};
pub use textures::{
    AlphaFormat, ApplyMode, BumpMapInfo, ClampMode, FilterMode, MipMap, MipMapFormat, PixelData,
    PixelLayout, TextureSlot, TextureSource, TexturingData,
};
