// src/nif/mod.rs

pub mod error;
pub mod loader;
pub mod options;
pub mod parser;
pub mod scene;
pub mod skeleton;
pub mod types;
pub mod writer;
