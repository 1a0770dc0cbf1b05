use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CountingError {
    #[error("Can't read file {path:?}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A reference listing line that can't be turned into a feature. Fatal for the listing.
    #[error("Malformed input on line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    /// A single alignment record that can't be parsed. Callers skip these.
    #[error("Malformed alignment record: {0}")]
    MalformedRecord(String),

    #[error("Unsupported input, expected a .sam alignment file: {0:?}")]
    UnsupportedInput(PathBuf),

    #[error("Got {files} alignment files but {names} sample names")]
    SampleNameMismatch { files: usize, names: usize },

    #[error("Index out of bounds: row {row}, col {col}")]
    IndexOutOfBounds { row: usize, col: usize },

    #[error("Can't build thread pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CountingResult<T> = std::result::Result<T, CountingError>;
