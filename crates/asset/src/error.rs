use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by asset loading. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("mesh contained no triangles")]
    Empty,
}

pub type Result<T> = std::result::Result<T, AssetError>;
