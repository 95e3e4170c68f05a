use std::path::PathBuf;

use thiserror::Error;

use super::status::NativeError;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("input file [{}] does not exist", .0.display())]
    InputMissing(PathBuf),

    #[error("output file [{}] already exists", .0.display())]
    OutputExists(PathBuf),

    #[error("path [{}] cannot be passed to libraw", .0.display())]
    InvalidPath(PathBuf),

    #[error("failed to open input file [{}]: {source}", path.display())]
    Open { path: PathBuf, source: NativeError },

    #[error("failed to unpack file [{}]: {source}", path.display())]
    Unpack { path: PathBuf, source: NativeError },

    #[error("no embedded thumbnail in [{}]: {source}", path.display())]
    NoThumbnail { path: PathBuf, source: NativeError },

    #[error("unpacking thumbnail from [{}] failed: {source}", path.display())]
    UnpackThumbnail { path: PathBuf, source: NativeError },

    #[error("failed to process file [{}]: {source}", path.display())]
    Process { path: PathBuf, source: NativeError },

    #[error("failed to build in-memory image for [{}]: {source}", path.display())]
    MemImage { path: PathBuf, source: NativeError },

    #[error("writing [{}] failed: {source}", path.display())]
    Write { path: PathBuf, source: NativeError },

    #[error("unsupported processed image: {0}")]
    UnsupportedImage(String),

    #[error("processed image declares {declared} bytes, expected {expected}")]
    BlockSize { declared: u64, expected: u64 },

    #[error("synthesized pixel map failed to decode: {0}")]
    InvariantViolation(#[source] image::ImageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DecodeError {
    pub fn is_missing_thumbnail(&self) -> bool {
        matches!(self, DecodeError::NoThumbnail { .. })
    }

    /// The native status behind a stage failure, if any.
    pub fn native(&self) -> Option<&NativeError> {
        match self {
            DecodeError::Open { source, .. }
            | DecodeError::Unpack { source, .. }
            | DecodeError::NoThumbnail { source, .. }
            | DecodeError::UnpackThumbnail { source, .. }
            | DecodeError::Process { source, .. }
            | DecodeError::MemImage { source, .. }
            | DecodeError::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
