//! Reader and writer for NetImmerse 4.0.0.2 (`.nif`) files.
//!
//! A file is loaded into a graph of reference-counted blocks ([`BlockRef`]). Owning
//! links keep their targets alive; parent edges and cross references (bones, skeleton
//! root, controller targets) are weak.
//!
//! ```no_run
//! use nif_graph::Nif;
//!
//! let nif = Nif::load("meshes/b/B_N_Dark Elf_M_Skins.nif")?;
//! for shape in nif.blocks_of_type("NiTriShape") {
//!     println!("{}", shape.world_transform()?);
//! }
//! nif.save("out.nif")?;
//! # Ok::<(), nif_graph::NifError>(())
//! ```

pub mod nif;

pub use nif::error::{NifError, Result};
pub use nif::loader::Nif;
pub use nif::options::{NIF_VERSION_4_0_0_2, NifOptions};
pub use nif::parser::block_parsers::{create_block, known_block_types};
pub use nif::types::*;
