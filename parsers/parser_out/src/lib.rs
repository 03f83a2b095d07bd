//! Decoder for JMAE `.out` files.
//!
//! The output file is read first: it carries the scalar case parameters,
//! the paths of the AV, surface and kill files, and the component role
//! lists (invulnerable, blast, direct hit) the other decoders validate
//! against. The matrix and detail files sit next to it with the same stem.

mod models;
mod parser;

pub use models::{BlastShape, BlastVolume, CaseFiles, CaseMetadata};
pub use parser::OutputDecoder;
