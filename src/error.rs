//! Error types for loading and pricing sales data.
//!
//! There are two kinds of failure:
//!
//! * [`LoadError`] is fatal. A catalogue or sales file that can't be read or
//!   parsed stops the run before any report is produced.
//! * [`RecordError`] is not. It describes why a single sale couldn't be
//!   priced, and is carried inline in the report as data.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// A failure to load one of the input files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The path does not exist, or could not be read.
    #[error("cannot read {}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The content is not valid JSON, or does not have the expected shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(err.to_string())
    }
}

/// Reads the whole file at `path` as text.
///
/// A file that exists but isn't valid UTF-8 is malformed, not missing.
pub(crate) fn read_input(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::InvalidData => {
            LoadError::MalformedInput(format!("{}: {source}", path.display()))
        }
        _ => LoadError::FileNotFound {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// The reason a single sale was excluded from the total.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum RecordError {
    #[error("malformed sale record")]
    MalformedRecord,

    #[error("missing product identifier")]
    MissingProduct,

    #[error("invalid quantity")]
    InvalidQuantity,

    #[error("identifier not found in catalogue")]
    UnknownProduct,
}
