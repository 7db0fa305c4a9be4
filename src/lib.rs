// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Reader for `RW` WAD archives, major version 3.
//!
//! Only the header and the entry table are decoded. Entry payloads stay
//! where they are; compressed bodies are never inflated here.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;

pub mod archive;
pub mod cursor;
pub mod error;

pub use archive::{
    Archive, ChecksumKind, Entry, EntryType, Magic, ENTRY_SIZE, HEADER_SIZE, MAGIC,
    SIGNATURE_SIZE, SUPPORTED_MAJOR_VERSION,
};
pub use cursor::ByteCursor;
pub use error::{Result, WadError};

/// Read header and entry table from the given WAD file.
/// Return an error indicator on general WAD file format errors.  The
/// contents of entries is not checked, only the consistency of the
/// header and entry table.
pub fn read_archive<P: AsRef<Path>>(wad_filename: P) -> Result<Archive> {
    let path = wad_filename.as_ref();
    debug!("reading {}", path.display());
    let f = File::open(path)?;
    Archive::from_reader(BufReader::new(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_unavailable() {
        let path = std::env::temp_dir().join("rwad-unit-does-not-exist.wad");
        assert!(matches!(read_archive(&path), Err(WadError::SourceUnavailable(_))));
    }
}
