use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write image")]
    Write(#[source] std::io::Error),

    /// Payload does not fit the target size and oversized payloads are rejected.
    #[error("payload is {len} bytes, larger than the {target} byte target")]
    PayloadTooLarge { len: usize, target: usize },

    #[error("firmware image of {size} bytes cannot fit in the {capacity} byte firmware area")]
    FirmwareTooLarge { size: u64, capacity: u64 },

    #[error("firmware image is empty")]
    EmptyImage,

    #[error("{} is not a file", path.display())]
    NotAFile { path: PathBuf },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
        Error::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
