use nix::errno::Errno;
use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not allocate the converter: {0}")]
    Alloc(#[from] TryReserveError),
    #[error("device: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// The negative errno a C caller would have seen.
    pub fn errno(&self) -> i32 {
        match self {
            Error::Alloc(_) => -(Errno::ENOMEM as i32),
            Error::Io(error) => -error.raw_os_error().unwrap_or(Errno::EIO as i32),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
