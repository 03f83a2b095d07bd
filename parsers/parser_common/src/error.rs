use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The role a file plays within a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    Output,
    VulnerableArea,
    Surface,
    Matrix,
    KillDefinition,
    Detail,
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileRole::Output => write!(f, "output"),
            FileRole::VulnerableArea => write!(f, "AV"),
            FileRole::Surface => write!(f, "target surface"),
            FileRole::Matrix => write!(f, "matrix"),
            FileRole::KillDefinition => write!(f, "kill definition"),
            FileRole::Detail => write!(f, "detail"),
        }
    }
}

/// A value inside an AV table that can be validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableField {
    Azimuth,
    Elevation,
    Mass,
    VulnerableArea,
    ExposureProbability,
}

impl fmt::Display for TableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableField::Azimuth => write!(f, "azimuth"),
            TableField::Elevation => write!(f, "elevation"),
            TableField::Mass => write!(f, "mass"),
            TableField::VulnerableArea => write!(f, "fragment AV"),
            TableField::ExposureProbability => write!(f, "fragment PE"),
        }
    }
}

/// 1-based location of a cell inside the AV tables.
///
/// Mass and velocity are only present when the failing value sits below the
/// table header level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coordinate {
    pub component: usize,
    pub azimuth: usize,
    pub elevation: usize,
    pub mass: Option<usize>,
    pub velocity: Option<usize>,
}

impl Coordinate {
    pub fn new(component: usize, azimuth: usize, elevation: usize) -> Self {
        Self {
            component,
            azimuth,
            elevation,
            mass: None,
            velocity: None,
        }
    }

    pub fn with_mass(self, mass: usize) -> Self {
        Self { mass: Some(mass), ..self }
    }

    pub fn with_velocity(self, velocity: usize) -> Self {
        Self { velocity: Some(velocity), ..self }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "component {}, azimuth {}, elevation {}",
            self.component, self.azimuth, self.elevation
        )?;
        if let Some(mass) = self.mass {
            write!(f, ", mass {}", mass)?;
        }
        if let Some(velocity) = self.velocity {
            write!(f, ", velocity {}", velocity)?;
        }
        Ok(())
    }
}

/// Broad classification of a [`DecodeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A sentinel, count or block terminator is missing or malformed
    Structural,
    /// A value disagrees with one declared earlier
    CrossReference,
    /// A value violates a physical bound
    Range,
    /// A referenced file does not exist
    MissingResource,
    /// The file could not be opened or read
    Io,
}

/// Error raised while decoding a case file.
///
/// Decoding stops at the first error; line numbers are 1-based physical lines.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: read failed: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {message}")]
    Structural { line: usize, message: String },

    #[error("{} is not a full-detail file: no fragmentation section found", .path.display())]
    NotFullDetail { path: PathBuf },

    #[error("line {line}: {field} value {found} didn't match declared {field} {expected}: {at}")]
    TableMismatch {
        line: usize,
        field: TableField,
        at: Coordinate,
        expected: f64,
        found: f64,
    },

    #[error("line {line}: {message}")]
    CrossReference { line: usize, message: String },

    #[error("line {line}: bad {field} {value}: {at}")]
    OutOfRange {
        line: usize,
        field: TableField,
        at: Coordinate,
        value: f64,
    },

    #[error("couldn't find {role} file: {}", .path.display())]
    MissingFile { role: FileRole, path: PathBuf },
}

impl DecodeError {
    pub fn structural(line: usize, message: impl Into<String>) -> Self {
        DecodeError::Structural {
            line,
            message: message.into(),
        }
    }

    pub fn cross_reference(line: usize, message: impl Into<String>) -> Self {
        DecodeError::CrossReference {
            line,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Open { .. } | DecodeError::Read { .. } => ErrorKind::Io,
            DecodeError::Structural { .. } | DecodeError::NotFullDetail { .. } => {
                ErrorKind::Structural
            }
            DecodeError::TableMismatch { .. } | DecodeError::CrossReference { .. } => {
                ErrorKind::CrossReference
            }
            DecodeError::OutOfRange { .. } => ErrorKind::Range,
            DecodeError::MissingFile { .. } => ErrorKind::MissingResource,
        }
    }

    /// Physical line where the problem was detected, when there is one
    pub fn line(&self) -> Option<usize> {
        match self {
            DecodeError::Read { line, .. }
            | DecodeError::Structural { line, .. }
            | DecodeError::TableMismatch { line, .. }
            | DecodeError::CrossReference { line, .. }
            | DecodeError::OutOfRange { line, .. } => Some(*line),
            DecodeError::Open { .. }
            | DecodeError::NotFullDetail { .. }
            | DecodeError::MissingFile { .. } => None,
        }
    }
}
