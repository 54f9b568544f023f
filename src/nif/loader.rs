// src/nif/loader.rs
use crate::nif::error::Result;
use crate::nif::options::{NIF_VERSION_4_0_0_2, NifOptions};
use crate::nif::parser::start::parse_nif_start;
use crate::nif::types::{BlockRef, NifHeader};
use crate::nif::writer::{enumerate_blocks, write_nif};
use std::fmt::Write as _;
use std::path::Path;

/// A loaded (or assembled) file: the header it was read with, every block in file
/// order, and the footer roots.
#[derive(Debug, Clone)]
pub struct Nif {
    pub header: NifHeader,
    /// Owns every block; dropping the `Nif` frees the whole graph.
    pub blocks: Vec<BlockRef>,
    pub roots: Vec<BlockRef>,
}

impl Nif {
    /// Wraps an in-memory graph. `blocks` is filled in write order.
    pub fn new(roots: Vec<BlockRef>) -> Self {
        let blocks = enumerate_blocks(&roots);
        let header = NifHeader {
            version_string: NifOptions::default().header_line(),
            file_version: NIF_VERSION_4_0_0_2,
            num_blocks: blocks.len() as u32,
        };
        Self {
            header,
            blocks,
            roots,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with(data, &NifOptions::default())
    }

    pub fn from_bytes_with(data: &[u8], options: &NifOptions) -> Result<Self> {
        parse_nif_start(data, options)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &NifOptions::default())
    }

    pub fn load_with(path: impl AsRef<Path>, options: &NifOptions) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes_with(&bytes, options)
    }

    /// Serializes `blocks` in their current order, followed by anything they or the
    /// roots link to that is not listed yet.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        write_nif(&mut out, &self.blocks, &self.roots)?;
        Ok(out)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Blocks of the given type, in file order.
    pub fn blocks_of_type<'a>(&'a self, block_type: &'a str) -> impl Iterator<Item = &'a BlockRef> {
        self.blocks
            .iter()
            .filter(move |b| b.block_type() == block_type)
    }

    pub fn as_string(&self, verbose: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}\nVersion:  0x{:08X}\nBlocks:  {}",
            self.header.version_string,
            self.header.file_version,
            self.blocks.len()
        );
        for (i, block) in self.blocks.iter().enumerate() {
            let _ = writeln!(out, "====[ {} | {} ]====", i, block.block_type());
            out.push_str(&block.borrow().as_string(verbose));
        }
        let roots: Vec<String> = self.roots.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "Roots:  {}", roots.join(", "));
        out
    }
}
