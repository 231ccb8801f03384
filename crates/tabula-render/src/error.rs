//! Error types for table rendering.
//!
//! This module provides [`TableError`], the single error type returned by every
//! public operation in the crate. Variants fall into three families, exposed
//! through [`TableError::kind`]:
//!
//! - **Configuration**: the style configuration is unknown, unreadable,
//!   incomplete or inconsistent. Never retried.
//! - **DataShape**: the dataset or the request does not match (wrong row
//!   length, unknown column). The caller must fix its input.
//! - **RenderIo**: the image could not be produced or written. The caller may
//!   retry with a different path.
//!
//! Nothing in the crate swallows these errors. The one tolerated failure, a
//! missing palette tone for a static color, is logged instead (see
//! [`PaletteStore::lookup`](crate::palette::PaletteStore::lookup)).

use std::path::PathBuf;

use thiserror::Error;

/// Broad classification of a [`TableError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown layout, missing field, missing palette with no fallback.
    Configuration,
    /// Mismatched rows, unknown columns, unparseable input data.
    DataShape,
    /// Directory creation, file write or image encoding failure.
    RenderIo,
}

/// Error type for all table rendering operations.
#[derive(Debug, Error)]
pub enum TableError {
    /// The requested layout is not registered.
    #[error("unknown layout '{0}'")]
    UnknownLayout(String),

    /// A layout or palette source could not be parsed into a typed value.
    #[error("invalid configuration in {origin}: {message}")]
    InvalidConfig { origin: String, message: String },

    /// Layout `extends` references form a cycle.
    #[error("cycle detected in layout extends: {}", path.join(" -> "))]
    ExtendsCycle { path: Vec<String> },

    /// A layouts directory or one of its files could not be read.
    #[error("cannot read configuration from {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A palette/tone combination is required and no fallback applies.
    #[error("palette '{palette}' has no usable tone '{tone}'")]
    MissingPalette { palette: String, tone: String },

    /// Two columns share the same name.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// A row does not have exactly one value per column.
    #[error("row {row} has {found} values, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A column referenced by the request is absent from the dataset.
    #[error("column '{0}' is not present in the dataset")]
    UnknownColumn(String),

    /// Input data could not be turned into a dataset.
    #[error("invalid input data: {0}")]
    InvalidData(String),

    /// The output directory or file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scene could not be turned into image bytes.
    #[error("failed to encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },
}

impl TableError {
    /// Returns the family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TableError::UnknownLayout(_)
            | TableError::InvalidConfig { .. }
            | TableError::ExtendsCycle { .. }
            | TableError::ConfigIo { .. }
            | TableError::MissingPalette { .. } => ErrorKind::Configuration,
            TableError::DuplicateColumn(_)
            | TableError::RowLength { .. }
            | TableError::UnknownColumn(_)
            | TableError::InvalidData(_) => ErrorKind::DataShape,
            TableError::Io { .. } | TableError::Encode { .. } => ErrorKind::RenderIo,
        }
    }

    pub(crate) fn config(origin: impl Into<String>, message: impl ToString) -> Self {
        TableError::InvalidConfig {
            origin: origin.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn config_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TableError::ConfigIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TableError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        TableError::InvalidData(err.to_string())
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::InvalidData(err.to_string())
    }
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
