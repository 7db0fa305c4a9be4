// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Header and entry table of version 3 `RW` WAD archives.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//!   0     2  magic "RW"
//!   2     1  major version (3)
//!   3     1  minor version
//!   4   256  signature
//! 260     8  checksum (i64)
//! 268     4  entry count (u32)
//! 272  N*32  entry table
//! ```
//!
//! Entry payloads are not touched. The one exception is the path string of
//! a redirection entry, which lives at the entry's data offset.

use std::fmt;
use std::io::{Read, Seek};

use log::{debug, trace};

use crate::cursor::ByteCursor;
use crate::error::{invalid, Result, WadError};

pub const MAGIC: &[u8; 2] = b"RW";
pub const SUPPORTED_MAJOR_VERSION: u8 = 3;
pub const SIGNATURE_SIZE: usize = 256;
pub const HEADER_SIZE: u64 = 272;
pub const ENTRY_SIZE: u64 = 32;

/// The four leading bytes, `RW{major}{minor}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Magic {
    pub prefix: [u8; 2],
    pub major: u8,
    pub minor: u8,
}

impl Magic {
    pub fn parse(bytes: &[u8]) -> Result<Magic> {
        match *bytes {
            [a, b, major, minor, ..] => Ok(Magic { prefix: [a, b], major, minor }),
            _ => Err(invalid(format!("magic needs 4 bytes, got {}", bytes.len()))),
        }
    }

    /// The prefix as text. Fails on non-ASCII bytes.
    pub fn prefix_str(&self) -> Result<&str> {
        if !self.prefix.is_ascii() {
            return Err(invalid("magic prefix is not ASCII"));
        }
        std::str::from_utf8(&self.prefix).map_err(|_| invalid("magic prefix is not ASCII"))
    }

    pub fn is_wad(&self) -> bool {
        &self.prefix == MAGIC
    }

    /// Prefix first, then major version. The minor version is free.
    pub fn check(&self) -> Result<()> {
        check_prefix(&self.prefix)?;
        check_major(self.major)
    }
}

fn check_prefix(prefix: &[u8; 2]) -> Result<()> {
    if prefix != MAGIC {
        return Err(invalid("invalid WAD tag"));
    }
    Ok(())
}

fn check_major(major: u8) -> Result<()> {
    if major != SUPPORTED_MAJOR_VERSION {
        return Err(WadError::UnsupportedVersion(major));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Uncompressed,
    GzipCompressed,
    FileRedirection,
    ZstdCompressed,
    ZstdChunked,
}

impl EntryType {
    pub fn from_u8(raw: u8) -> Option<EntryType> {
        match raw {
            0 => Some(EntryType::Uncompressed),
            1 => Some(EntryType::GzipCompressed),
            2 => Some(EntryType::FileRedirection),
            3 => Some(EntryType::ZstdCompressed),
            4 => Some(EntryType::ZstdChunked),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            EntryType::Uncompressed => 0,
            EntryType::GzipCompressed => 1,
            EntryType::FileRedirection => 2,
            EntryType::ZstdCompressed => 3,
            EntryType::ZstdChunked => 4,
        }
    }

    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            EntryType::GzipCompressed | EntryType::ZstdCompressed | EntryType::ZstdChunked
        )
    }
}

impl TryFrom<u8> for EntryType {
    type Error = WadError;

    fn try_from(raw: u8) -> Result<EntryType> {
        EntryType::from_u8(raw).ok_or_else(|| invalid(format!("unknown entry type {}", raw)))
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryType::Uncompressed => "uncompressed",
            EntryType::GzipCompressed => "gzip",
            EntryType::FileRedirection => "redirection",
            EntryType::ZstdCompressed => "zstd",
            EntryType::ZstdChunked => "zstd-chunked",
        };
        f.pad(name)
    }
}

/// Algorithm behind an entry's 8 checksum bytes. Version 3 files do not
/// record it, so every entry gets the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumKind {
    #[default]
    Xxh3,
}

/// One record of the entry table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Hash of the resource path. Not unique, see `is_duplicated`.
    pub hash: u64,
    /// Absolute offset of the payload, or of the path string for a
    /// redirection entry.
    pub data_offset: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub kind: EntryType,
    pub is_duplicated: bool,
    pub first_subchunk_index: u16,
    pub checksum: [u8; 8],
    pub checksum_kind: ChecksumKind,
    /// Target path, set only for `EntryType::FileRedirection`.
    pub file_redirection: Option<String>,
}

impl Entry {
    fn decode<R: Read + Seek>(cursor: &mut ByteCursor<R>, index: usize) -> Result<Entry> {
        let hash = cursor.read_u64()?;
        let data_offset = cursor.read_u32()?;
        let compressed_size = cursor.read_u32()?;
        let uncompressed_size = cursor.read_u32()?;
        let raw_type = cursor.read_u8()?;
        let kind = EntryType::from_u8(raw_type)
            .ok_or_else(|| invalid(format!("entry {}: unknown entry type {}", index, raw_type)))?;
        let is_duplicated = cursor.read_bool()?;
        let first_subchunk_index = cursor.read_u16()?;
        let checksum = cursor.read_array::<8>()?;

        let file_redirection = if kind == EntryType::FileRedirection {
            let path = cursor
                .with_position(u64::from(data_offset), read_redirection)
                .map_err(|e| match e {
                    WadError::UnexpectedEndOfData { offset, wanted } => invalid(format!(
                        "entry {}: redirection truncated, wanted {} bytes at offset {}",
                        index, wanted, offset
                    )),
                    WadError::InvalidFile(msg) => invalid(format!("entry {}: {}", index, msg)),
                    e => e,
                })?;
            debug!("entry {} ({:016x}) redirects to {}", index, hash, path);
            Some(path)
        } else {
            None
        };

        trace!(
            "entry {}: {:016x} {} at {} ({} -> {} bytes)",
            index,
            hash,
            kind,
            data_offset,
            compressed_size,
            uncompressed_size
        );

        Ok(Entry {
            hash,
            data_offset,
            compressed_size,
            uncompressed_size,
            kind,
            is_duplicated,
            first_subchunk_index,
            checksum,
            checksum_kind: ChecksumKind::Xxh3,
            file_redirection,
        })
    }
}

/// Length-prefixed ASCII path at the cursor's position.
fn read_redirection<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<String> {
    let len = cursor.read_i32()?;
    let len = usize::try_from(len)
        .map_err(|_| invalid(format!("negative redirection length {}", len)))?;
    let bytes = cursor.read_bytes(len)?;
    if !bytes.is_ascii() {
        return Err(invalid("redirection path is not ASCII"));
    }
    String::from_utf8(bytes).map_err(|_| invalid("redirection path is not ASCII"))
}

/// A decoded archive: header fields plus the entry table in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    major: u8,
    minor: u8,
    signature: [u8; SIGNATURE_SIZE],
    checksum: i64,
    entries: Vec<Entry>,
}

impl Archive {
    /// Decode an archive starting at the cursor's position. Offsets stored
    /// in entries are taken as absolute positions in the source.
    ///
    /// Either the whole header and entry table decode or an error is
    /// returned; there is no partial result.
    pub fn decode<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Archive> {
        let source_len = cursor.source_len()?;
        let available = source_len.saturating_sub(cursor.position());
        if available < HEADER_SIZE {
            return Err(invalid(format!(
                "{} bytes available, header needs {}",
                available, HEADER_SIZE
            )));
        }

        check_prefix(&cursor.read_array::<2>()?)?;
        let major = cursor.read_u8()?;
        check_major(major)?;
        let minor = cursor.read_u8()?;

        let signature = cursor.read_array::<SIGNATURE_SIZE>()?;
        let checksum = cursor.read_i64()?;
        let entry_count = cursor.read_u32()?;
        debug!(
            "WAD {}.{}: {} entries, checksum {:016x}",
            major, minor, entry_count, checksum
        );

        // Reserve no more than the rest of the source can hold.
        let room = source_len.saturating_sub(cursor.position()) / ENTRY_SIZE;
        let capacity = u64::from(entry_count).min(room);
        let mut entries = Vec::with_capacity(capacity as usize);
        for index in 0..entry_count as usize {
            entries.push(Entry::decode(cursor, index)?);
        }

        Ok(Archive { major, minor, signature, checksum, entries })
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Archive> {
        let mut cursor = ByteCursor::new(reader)?;
        Archive::decode(&mut cursor)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Archive> {
        Archive::decode(&mut ByteCursor::from_bytes(bytes))
    }

    pub fn major_version(&self) -> u8 {
        self.major
    }

    pub fn minor_version(&self) -> u8 {
        self.minor
    }

    pub fn magic(&self) -> Magic {
        Magic { prefix: *MAGIC, major: self.major, minor: self.minor }
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.signature
    }

    pub fn checksum(&self) -> i64 {
        self.checksum
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry with the given path hash.
    pub fn find(&self, hash: u64) -> Option<&Entry> {
        self.entries.iter().find(|e| e.hash == hash)
    }

    pub fn redirections(&self) -> impl Iterator<Item = (&Entry, &str)> {
        self.entries
            .iter()
            .filter_map(|e| e.file_redirection.as_deref().map(|path| (e, path)))
    }
}

impl TryFrom<&[u8]> for Archive {
    type Error = WadError;

    fn try_from(bytes: &[u8]) -> Result<Archive> {
        Archive::from_bytes(bytes)
    }
}
