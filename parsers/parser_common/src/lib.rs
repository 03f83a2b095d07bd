//! Shared plumbing for the JMAE case file decoders.
//!
//! Every decoder in the workspace reads a line-oriented text file in a single
//! pass. This crate holds the pieces they have in common:
//! - [`LineReader`] - a line cursor that tracks physical line numbers
//! - [`LineDispatcher`] - keyword-prefix routing of lines to handlers
//! - [`DecodeError`] - the error taxonomy every decoder reports with
//! - token helpers for whitespace/colon delimited records
//! - component-role sets used to cross-validate files against each other

mod dispatch;
mod error;
mod reader;
mod roles;
mod tokens;

pub use dispatch::{Flow, Handler, LineDispatcher};
pub use error::{Coordinate, DecodeError, ErrorKind, FileRole, TableField};
pub use reader::LineReader;
pub use roles::{ComponentId, ComponentRoles, IdSet, PkSource};
pub use tokens::{field, parse_f64, parse_int, split_fields};

/// Result type for decoding operations
pub type Result<T> = std::result::Result<T, DecodeError>;
