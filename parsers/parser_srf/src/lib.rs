//! Decoder for JMAE target surface files.
//!
//! A surface file is a list of quadrilaterals, four vertices and a name
//! each. The decoder keeps the vertices in file order and tracks the
//! bounding box as it goes.

mod models;
mod parser;

pub use models::{SurfaceBounds, SurfaceMesh};
pub use parser::SurfaceDecoder;
