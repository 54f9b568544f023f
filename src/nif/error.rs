use std::io::Error as IoError;
use thiserror::Error;

// --- Error Type ---
#[derive(Debug, Error)]
pub enum NifError {
    #[error("IO Error: {0}")]
    Io(#[from] IoError),
    /// Malformed bytes: bad header, negative link index, sanity limit exceeded.
    #[error("Invalid Data: {0}")]
    InvalidData(String),
    /// No constructor is registered for this block type name.
    #[error("Unknown Block Type: {0}")]
    UnknownBlockType(String),
    #[error("Unknown Attribute Kind: {0}")]
    UnknownAttributeKind(String),
    #[error("Duplicate Attribute '{name}' on {block_type}")]
    DuplicateAttribute { block_type: String, name: String },
    /// An interpolation tag outside the closed set; the record size past it is unknown.
    #[error("Unsupported key type {key_type} in {track}")]
    UnsupportedKeyType { track: &'static str, key_type: u32 },
    #[error("Array length {actual} does not match {what} {expected}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Block {block_type} does not provide the {capability:?} capability")]
    MissingCapability {
        block_type: String,
        capability: super::types::Capability,
    },
    #[error("Attribute '{name}' not found on {block_type}")]
    MissingAttribute { block_type: String, name: String },
    #[error("{0} has no parent")]
    MissingParent(String),
    #[error("Attribute '{name}' is not of the expected kind")]
    AttributeKindMismatch { name: String },
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// A link target was not part of the block table being written.
    #[error("Link target {0} is not part of the written graph")]
    UnindexedLink(String),
}

// Define a crate-wide Result type alias
pub type Result<T> = std::result::Result<T, NifError>;
