//! Decoder for full-detail JMAE `.dtl` files.
//!
//! Only the full-detail variant carries fragmentation zones, so a file is
//! validated before it is read. The trace is keyed by (burst point index,
//! azimuth); component PKs are picked from the column matching each
//! component's role.

mod models;
mod parser;

pub use models::{BurstKey, BurstRecord, DetailTrace, FragZone};
pub use parser::DetailDecoder;
