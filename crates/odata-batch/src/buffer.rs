//! Fixed-capacity lookahead buffer over a byte source.
//!
//! Layout
//! - `bytes[..read_position]` is stale, already consumed data.
//! - `bytes[read_position..read_position + len]` is valid, unconsumed data.
//! - the remainder is free space for the next refill.
//!
//! A refill moves the bytes still relevant to an in-flight partial match
//! (`preserve_from..`) to offset 0 and reads once from the source into the
//! free space. The source may return fewer bytes than requested; callers scan
//! again and refill again until a scan is conclusive.

use std::io::{ErrorKind, Read};

use crate::error::{InternalError, ReaderError};

#[derive(Debug)]
pub struct LookaheadBuffer {
    bytes: Box<[u8]>,
    read_position: usize,
    len: usize,
    exhausted: bool,
    at_line_start: bool,
}

impl Default for LookaheadBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LookaheadBuffer {
    pub const DEFAULT_CAPACITY: usize = 8000;

    /// Smallest capacity the batch stream will use. One boundary line of a
    /// maximal (70 byte) boundary plus dashes and terminators always fits.
    pub const MIN_CAPACITY: usize = 128;

    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "lookahead buffer capacity must be non-zero");
        Self {
            bytes: vec![0; capacity].into_boxed_slice(),
            read_position: 0,
            len: 0,
            exhausted: false,
            at_line_start: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Offset of the first unconsumed byte.
    #[inline]
    #[must_use]
    pub fn read_position(&self) -> usize {
        self.read_position
    }

    /// Number of unconsumed bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset one past the last valid byte.
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.read_position + self.len
    }

    /// `true` once a refill read zero bytes from the source.
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// `true` if the byte before the read position is a line terminator, or
    /// nothing has been consumed yet.
    #[inline]
    #[must_use]
    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    /// The whole buffer; offsets reported by the scanners index into this.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.end()]
    }

    /// The unconsumed bytes.
    #[inline]
    #[must_use]
    pub fn unread(&self) -> &[u8] {
        &self.bytes[self.read_position..self.end()]
    }

    /// Unconsumed bytes up to (excluding) absolute offset `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is outside the valid bytes.
    #[inline]
    #[must_use]
    pub fn unread_until(&self, position: usize) -> &[u8] {
        &self.bytes[self.read_position..position]
    }

    /// Consumes bytes up to absolute offset `position`. No I/O.
    pub fn skip_to(&mut self, position: usize) -> Result<(), InternalError> {
        let end = self.end();
        if position < self.read_position || position > end {
            return Err(InternalError::SkipPastEnd { position, end });
        }
        if position > self.read_position {
            self.at_line_start = matches!(self.bytes[position - 1], b'\r' | b'\n');
        }
        self.len = end - position;
        self.read_position = position;
        Ok(())
    }

    /// Consumes a `len` byte preamble such as a byte-order mark. The read
    /// position still counts as the start of a line afterwards.
    pub fn skip_preamble(&mut self, len: usize) -> Result<(), InternalError> {
        let at_line_start = self.at_line_start;
        self.skip_to(self.read_position + len)?;
        self.at_line_start = at_line_start;
        Ok(())
    }

    /// Discards everything before `preserve_from`, moves the remaining valid
    /// bytes to offset 0 and reads once from `source` into the free space.
    ///
    /// Returns `true` iff the source yielded zero bytes (end of stream).
    pub fn refill<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
        preserve_from: usize,
    ) -> Result<bool, ReaderError> {
        self.skip_to(preserve_from)
            .map_err(|_| InternalError::InvalidPreserveOffset {
                offset: preserve_from,
                start: self.read_position,
                end: self.end(),
            })?;
        if self.len == self.capacity() {
            return Err(InternalError::BufferFull(self.capacity()).into());
        }

        if self.read_position > 0 {
            self.bytes
                .copy_within(self.read_position..self.read_position + self.len, 0);
            self.read_position = 0;
        }

        let read = loop {
            match source.read(&mut self.bytes[self.len..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        };
        self.len += read;
        if read == 0 {
            self.exhausted = true;
        }
        log::trace!(
            "refill: read {read} bytes, {} buffered, exhausted={}",
            self.len,
            self.exhausted
        );
        Ok(read == 0)
    }
}
