//! Decoder for JMAE AV (vulnerable area) files.
//!
//! An AV file lists the target components and, per component table, the
//! fragment vulnerable area and exposure probability for every declared
//! azimuth, elevation, fragment mass and striking velocity.

mod models;
mod parser;

pub use models::{AvData, Component, TableIndex, TableMode, TableShape, VulnerableAreaTables};
pub use parser::AvDecoder;
