// src/nif/parser/mod.rs

pub mod animation;
pub mod block_parsers;
pub mod extra_data;
pub mod helpers;
pub mod morph;
pub mod particles;
pub mod skin;
pub mod start;
pub mod texture;
pub mod triangles;

use crate::nif::error::Result;
use crate::nif::types::{Block, BlockData, LinkMap};
use helpers::{NifReader, TagLayout, read_key_track, write_key_track};
use std::io::Write;

/// Reads everything after the type name. Blocks with a plain attribute list read it
/// in declared order; the rest dispatch on their payload.
pub(crate) fn read_block_body(block: &mut Block, r: &mut NifReader<'_>) -> Result<()> {
    let Block { attrs, data, .. } = block;
    match data {
        BlockData::Generic => attrs.read_all(r),
        BlockData::TriShapeData(d) => triangles::parse_tri_shape_data(d, attrs, r),
        BlockData::SkinData(d) => skin::parse_skin_data(d, r),
        BlockData::KeyframeData(d) => animation::parse_keyframe_data(d, r),
        BlockData::ColorData(track) => {
            *track = read_key_track(r, "color", TagLayout::Always, true)?;
            Ok(())
        }
        BlockData::FloatData(track) => {
            *track = read_key_track(r, "float", TagLayout::Always, true)?;
            Ok(())
        }
        BlockData::PosData(track) => {
            *track = read_key_track(r, "position", TagLayout::Always, true)?;
            Ok(())
        }
        BlockData::VisData(keys) => animation::parse_vis_data(keys, r),
        BlockData::UvData(d) => animation::parse_uv_data(d, r),
        BlockData::MorphData(d) => morph::parse_morph_data(d, r),
        BlockData::PixelData(d) => texture::parse_pixel_data(d, r),
        BlockData::RotatingParticlesData(d) => particles::parse_rotating_particles_data(d, r),
        BlockData::TextKeys(keys) => extra_data::parse_text_key_extra_data(keys, attrs, r),
        BlockData::VertWeights(weights) => {
            extra_data::parse_vert_weights_extra_data(weights, attrs, r)
        }
        BlockData::Texturing(d) => texture::parse_texturing_property(d, attrs, r),
    }
}

/// Mirror of [`read_block_body`].
pub(crate) fn write_block_body<W: Write>(
    block: &Block,
    out: &mut W,
    links: &LinkMap,
) -> Result<()> {
    let attrs = &block.attrs;
    match &block.data {
        BlockData::Generic => attrs.write_all(out, links),
        BlockData::TriShapeData(d) => triangles::write_tri_shape_data(d, attrs, out, links),
        BlockData::SkinData(d) => skin::write_skin_data(d, out),
        BlockData::KeyframeData(d) => animation::write_keyframe_data(d, out),
        BlockData::ColorData(track) => write_key_track(out, track, TagLayout::Always, true),
        BlockData::FloatData(track) => write_key_track(out, track, TagLayout::Always, true),
        BlockData::PosData(track) => write_key_track(out, track, TagLayout::Always, true),
        BlockData::VisData(keys) => animation::write_vis_data(keys, out),
        BlockData::UvData(d) => animation::write_uv_data(d, out),
        BlockData::MorphData(d) => morph::write_morph_data(d, out),
        BlockData::PixelData(d) => texture::write_pixel_data(d, out),
        BlockData::RotatingParticlesData(d) => particles::write_rotating_particles_data(d, out),
        BlockData::TextKeys(keys) => extra_data::write_text_key_extra_data(keys, attrs, out, links),
        BlockData::VertWeights(weights) => {
            extra_data::write_vert_weights_extra_data(weights, attrs, out, links)
        }
        BlockData::Texturing(d) => texture::write_texturing_property(d, attrs, out, links),
    }
}
