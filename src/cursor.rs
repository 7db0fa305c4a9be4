// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Little-endian typed reads over a seekable byte source.

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Result, WadError};

/// Sequential reader with an explicit absolute position.
///
/// The position is tracked here rather than queried from the source, so
/// error values can name the offset a failed read started at. One cursor
/// must not be shared between concurrent decodes.
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
    pos: u64,
}

impl<'a> ByteCursor<io::Cursor<&'a [u8]>> {
    /// Wrap an in-memory buffer.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        ByteCursor { inner: io::Cursor::new(bytes), pos: 0 }
    }
}

impl<R: Read + Seek> ByteCursor<R> {
    /// Wrap a source, taking its current position as the starting point.
    pub fn new(mut inner: R) -> Result<Self> {
        let pos = inner.stream_position()?;
        Ok(ByteCursor { inner, pos })
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Move to an absolute offset. Offsets past the end are accepted; the
    /// next read reports the shortage.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        self.pos = self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Total length of the source. The read position is left untouched.
    pub fn source_len(&mut self) -> Result<u64> {
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(self.pos))?;
        Ok(end)
    }

    /// Run `f` with the cursor at `offset`, then put the cursor back where it
    /// was. The old position is restored even when `f` fails.
    pub fn with_position<T, F>(&mut self, offset: u64, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved = self.pos;
        self.seek(offset)?;
        let result = f(self);
        let restored = self.seek(saved);
        let value = result?;
        restored?;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_with(1, |r| r.read_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_with(2, |r| r.read_u16::<LittleEndian>())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_with(4, |r| r.read_u32::<LittleEndian>())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_with(8, |r| r.read_u64::<LittleEndian>())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_with(4, |r| r.read_i32::<LittleEndian>())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_with(8, |r| r.read_i64::<LittleEndian>())
    }

    /// Any nonzero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.read_with(N, |r| {
            let mut buf = [0u8; N];
            r.read_exact(&mut buf)?;
            Ok(buf)
        })
    }

    /// Read exactly `n` bytes. The buffer grows with what the source
    /// actually delivers, so a bogus length cannot force a huge allocation.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        self.read_with(n, |r| {
            let mut buf = Vec::new();
            r.by_ref().take(n as u64).read_to_end(&mut buf)?;
            if buf.len() < n {
                return Err(io::ErrorKind::UnexpectedEof.into());
            }
            Ok(buf)
        })
    }

    fn read_with<T, F>(&mut self, wanted: usize, f: F) -> Result<T>
    where
        F: FnOnce(&mut R) -> io::Result<T>,
    {
        match f(&mut self.inner) {
            Ok(value) => {
                self.pos += wanted as u64;
                Ok(value)
            }
            Err(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                // a partial read may have moved the source
                self.inner.seek(SeekFrom::Start(self.pos))?;
                Err(WadError::UnexpectedEndOfData { offset: self.pos, wanted })
            }
            Err(e) => Err(e.into()),
        }
    }
}
