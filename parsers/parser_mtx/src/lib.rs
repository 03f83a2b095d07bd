//! Decoder for JMAE matrix (`.mtx`) files: the range × deflection grid of
//! kill probabilities for one kill definition.

mod models;
mod parser;

pub use models::MatrixGrid;
pub use parser::MatrixDecoder;
