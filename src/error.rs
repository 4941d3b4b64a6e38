use thiserror::Error;

use crate::data::loader::FileFormat;

/// Errors raised by the explorer core.
///
/// None of them is fatal to a session: the caller reports the message and
/// keeps whatever state it computed before.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExplorerError {
    /// The bytes could not be parsed as the declared format.
    #[error("failed to load {format} data: {message}")]
    Load { format: FileFormat, message: String },

    /// The file extension / format tag is not one we read.
    #[error("unsupported file format: '{0}' (expected csv, xlsx or json)")]
    UnsupportedFormat(String),

    /// The requested analysis cannot run on the selected columns.
    #[error("analysis failed: {0}")]
    Analysis(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// A user selection does not fit the column it targets.
    #[error("invalid selection for column '{column}': {message}")]
    InvalidSelection { column: String, message: String },

    /// The table could not be serialised for download.
    #[error("export failed: {0}")]
    Export(String),

    /// Columns of unequal length or duplicate names.
    #[error("invalid table: {0}")]
    InvalidTable(String),
}

impl ExplorerError {
    pub(crate) fn load(format: FileFormat, err: impl std::fmt::Display) -> Self {
        ExplorerError::Load {
            format,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
