// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

use std::io;

use thiserror::Error;

/// Everything that can go wrong while reading a WAD archive.
///
/// None of these are transient: they describe either a source that
/// could not be read at all or bytes that do not form a valid archive.
#[derive(Error, Debug)]
pub enum WadError {
    /// The underlying file or stream could not be opened or read.
    #[error("source unavailable: {0}")]
    SourceUnavailable(#[from] io::Error),

    /// Bad magic, short header, bad entry type or unreadable redirection.
    #[error("invalid WAD file: {0}")]
    InvalidFile(String),

    /// The magic matched but the major version is not one we decode.
    #[error("unsupported WAD major version {0}")]
    UnsupportedVersion(u8),

    /// A typed read asked for more bytes than remain in the source.
    #[error("unexpected end of data: wanted {wanted} bytes at offset {offset}")]
    UnexpectedEndOfData { offset: u64, wanted: usize },
}

pub type Result<T> = std::result::Result<T, WadError>;

pub(crate) fn invalid<S: Into<String>>(msg: S) -> WadError {
    WadError::InvalidFile(msg.into())
}
