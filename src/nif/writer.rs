// src/nif/writer.rs

use crate::nif::error::Result;
use crate::nif::options::NifOptions;
use crate::nif::parser::helpers::write_link_index;
use crate::nif::types::{BlockRef, LinkMap};
use bevy_log::debug;
use byteorder::{LittleEndian, WriteBytesExt};
use std::collections::HashSet;
use std::io::Write;

/// File order for the graph under `roots`: depth-first preorder over owning links,
/// then every cross-reference target that was not reached that way (with its own
/// owned subtree).
pub fn enumerate_blocks(roots: &[BlockRef]) -> Vec<BlockRef> {
    extend_block_order(Vec::new(), roots)
}

/// Keeps `existing` in its current order and appends whatever it or `roots` reach
/// that is not already listed, in the order [`enumerate_blocks`] would use.
pub fn extend_block_order(existing: Vec<BlockRef>, roots: &[BlockRef]) -> Vec<BlockRef> {
    let mut seen: HashSet<BlockRef> = existing.iter().cloned().collect();
    let mut order = existing;

    let listed = order.len();
    for i in 0..listed {
        for child in order[i].child_links() {
            visit(&child, &mut seen, &mut order);
        }
    }
    for root in roots {
        visit(root, &mut seen, &mut order);
    }

    let mut i = 0;
    while i < order.len() {
        for target in order[i].cross_links() {
            visit(&target, &mut seen, &mut order);
        }
        i += 1;
    }
    order
}

fn visit(start: &BlockRef, seen: &mut HashSet<BlockRef>, order: &mut Vec<BlockRef>) {
    let mut stack = vec![start.clone()];
    while let Some(block) = stack.pop() {
        if !seen.insert(block.clone()) {
            continue;
        }
        let children = block.child_links();
        order.push(block);
        stack.extend(children.into_iter().rev());
    }
}

/// Writes header, blocks and footer. `blocks` are written first and in the given
/// order; blocks reachable from them or from `roots` follow. Every written block
/// gets its file index.
pub fn write_nif<W: Write>(
    out: &mut W,
    blocks: &[BlockRef],
    roots: &[BlockRef],
) -> Result<Vec<BlockRef>> {
    let blocks = extend_block_order(blocks.to_vec(), roots);
    let links = LinkMap::new(&blocks);
    let options = NifOptions::default();

    out.write_all(options.header_line().as_bytes())?;
    out.write_all(b"\n")?;
    out.write_u32::<LittleEndian>(options.version)?;
    out.write_u32::<LittleEndian>(blocks.len() as u32)?;

    for (i, block) in blocks.iter().enumerate() {
        block.borrow_mut().set_index(i as u32);
        debug!("Writing block {}: {}", i, block.block_type());
        block.borrow().write(out, &links)?;
    }

    out.write_u32::<LittleEndian>(roots.len() as u32)?;
    for root in roots {
        write_link_index(out, links.get(root))?;
    }
    Ok(blocks)
}
