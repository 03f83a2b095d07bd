//! Loading of JMAE munition vulnerability-assessment cases.
//!
//! A case is one output file plus the AV, surface, matrix, kill definition
//! and detail files it refers to. Each file has its own decoder crate under
//! `parsers/`; this crate ties them together into a [`CaseModel`] and scans
//! directories of cases.

pub mod loader;
pub mod scanner;
pub mod types;
pub mod utils;

pub use loader::CaseLoader;
pub use scanner::{collect_output_files, scan_case, scan_cases};
pub use types::{
    CaseLoaderConfig,
    CaseModel,
    CaseOutcome,
    CaseScanResult,
    CaseStatus,
    CaseSummary,
    ScanConfig,
};

pub use parser_common::{DecodeError, ErrorKind, FileRole};
