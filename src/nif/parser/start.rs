use crate::nif::error::{NifError, Result};
use crate::nif::loader::Nif;
use crate::nif::options::{NIF_HEADER_PREFIX, NifOptions};
use crate::nif::parser::block_parsers::create_block;
use crate::nif::parser::helpers::*;
use crate::nif::skeleton::bind_skins;
use crate::nif::types::*;
use bevy_log::{debug, warn};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

const MAX_HEADER_LINE: usize = 128;

// --- Main Parsing Function ---
pub fn parse_nif_start(data: &[u8], options: &NifOptions) -> Result<Nif> {
    let mut r = NifReader::new(data, options);

    // 1. Header line, up to and excluding '\n'
    let mut header_bytes = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if r.read(&mut byte)? == 0 {
            return Err(NifError::InvalidData("EOF in header".to_string()));
        }
        if byte[0] == b'\n' {
            break;
        }
        header_bytes.push(byte[0]);
        if header_bytes.len() > MAX_HEADER_LINE {
            return Err(NifError::InvalidData("Header too long".to_string()));
        }
    }
    let version_string = String::from_utf8_lossy(&header_bytes)
        .trim_end_matches('\r')
        .to_string();
    if !version_string.starts_with(NIF_HEADER_PREFIX) {
        return Err(NifError::InvalidData("Not a NIF file".to_string()));
    }

    // 2. File version
    let file_version = r.read_u32::<LittleEndian>()?;
    if file_version != options.version {
        if options.strict_version {
            return Err(NifError::InvalidData(format!(
                "Expected version 0x{:08X}, found 0x{:08X}",
                options.version, file_version
            )));
        }
        warn!(
            "Expected version 0x{:08X}, found 0x{:08X}; reading anyway",
            options.version, file_version
        );
    }

    // 3. Block count
    let num_blocks = r.read_u32::<LittleEndian>()?;
    let block_count = r.check_count(num_blocks, "block")?;
    let header = NifHeader {
        version_string,
        file_version,
        num_blocks,
    };

    // --- Block Reading Loop ---
    let mut blocks: Vec<BlockRef> = Vec::with_capacity(block_count);
    for i in 0..num_blocks {
        let offset = r.position();
        let type_name = read_nif_string(&mut r)?;
        debug!("Block {} at 0x{:X}: {}", i, offset, type_name);

        let block = create_block(&type_name)?;
        {
            let mut b = block.borrow_mut();
            b.set_index(i);
            b.read(&mut r)?;
        }
        blocks.push(block);
    }

    // Every block exists now, so indices can become handles
    for block in &blocks {
        block.fix_up_links(&blocks);
    }

    let roots = read_footer(&mut r, &blocks)?;
    if r.remaining() > 0 {
        warn!("{} trailing bytes after the footer", r.remaining());
    }

    if options.resolve_skins {
        bind_skins(&blocks)?;
    }

    Ok(Nif {
        header,
        blocks,
        roots,
    })
}

/// Root indices. Files that stop right after the last block get the first block as
/// their only root.
fn read_footer(r: &mut NifReader<'_>, blocks: &[BlockRef]) -> Result<Vec<BlockRef>> {
    if r.remaining() < 4 {
        warn!("No footer found, using the first block as the root");
        return Ok(blocks.first().cloned().into_iter().collect());
    }

    let raw_count = r.read_u32::<LittleEndian>()?;
    let count = r.check_count(raw_count, "root")?;
    let mut roots = Vec::with_capacity(count);
    for _ in 0..count {
        match read_link_index(r)? {
            Some(i) => match blocks.get(i as usize) {
                Some(block) => roots.push(block.clone()),
                None => warn!(
                    "Footer names root {} but the file has {} blocks",
                    i,
                    blocks.len()
                ),
            },
            None => warn!("Footer lists a null root"),
        }
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn header(version: u32, blocks: u32) -> Vec<u8> {
        let mut out = NifOptions::default().header_line().into_bytes();
        out.push(b'\n');
        out.write_u32::<LittleEndian>(version).unwrap();
        out.write_u32::<LittleEndian>(blocks).unwrap();
        out
    }

    fn push_node(out: &mut Vec<u8>, children: &[i32]) {
        write_nif_string(out, "NiNode").unwrap();
        write_nif_string(out, "node").unwrap();
        out.extend_from_slice(&(-1i32).to_le_bytes()); // extra data
        out.extend_from_slice(&(-1i32).to_le_bytes()); // controller
        out.extend_from_slice(&0u16.to_le_bytes()); // flags
        out.extend_from_slice(&[0u8; 12]); // translation
        for v in [1.0f32, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&1.0f32.to_le_bytes()); // scale
        out.extend_from_slice(&[0u8; 12]); // velocity
        out.extend_from_slice(&0u32.to_le_bytes()); // properties
        out.extend_from_slice(&0u32.to_le_bytes()); // no bounding box
        out.extend_from_slice(&(children.len() as u32).to_le_bytes());
        for c in children {
            out.extend_from_slice(&c.to_le_bytes());
        }
        out.extend_from_slice(&0u32.to_le_bytes()); // effects
    }

    #[test]
    fn missing_footer_uses_first_block() {
        let mut raw = header(0x0400_0002, 2);
        push_node(&mut raw, &[1, 5]);
        push_node(&mut raw, &[]);

        let nif = parse_nif_start(&raw, &NifOptions::default()).unwrap();
        assert_eq!(nif.blocks.len(), 2);
        assert_eq!(nif.roots, vec![nif.blocks[0].clone()]);
        // index 5 is out of range and resolves to null
        assert_eq!(nif.blocks[0].links(), vec![nif.blocks[1].clone()]);
        assert_eq!(nif.blocks[1].parent(), Some(nif.blocks[0].clone()));
    }

    #[test]
    fn version_mismatch_is_lenient_unless_strict() {
        let mut raw = header(0x0303_000D, 1);
        push_node(&mut raw, &[]);
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.extend_from_slice(&0i32.to_le_bytes());

        assert!(parse_nif_start(&raw, &NifOptions::default()).is_ok());
        let strict = NifOptions {
            strict_version: true,
            ..Default::default()
        };
        assert!(matches!(
            parse_nif_start(&raw, &strict),
            Err(NifError::InvalidData(_))
        ));
    }

    #[test]
    fn bad_header_and_unknown_block_fail() {
        assert!(matches!(
            parse_nif_start(b"Gamebryo File Format\n", &NifOptions::default()),
            Err(NifError::InvalidData(_))
        ));

        let mut raw = header(0x0400_0002, 1);
        write_nif_string(&mut raw, "NiCamera").unwrap();
        assert!(matches!(
            parse_nif_start(&raw, &NifOptions::default()),
            Err(NifError::UnknownBlockType(name)) if name == "NiCamera"
        ));
    }
}
