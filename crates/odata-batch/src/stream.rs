//! Byte-level reads over a batch payload.
//!
//! `BatchStream` owns the source, the lookahead buffer and the boundary
//! stack. Every operation follows the same loop: scan the buffered bytes,
//! consume what the scan proved safe, and refill preserving any partial
//! candidate until the scan is conclusive or the source is exhausted.

use std::io::Read;

use crate::{
    buffer::LookaheadBuffer,
    encoding::{BatchEncoding, detect_bom},
    error::{Expected, FormatError, InternalError, ReaderError},
    scanner::{BoundaryStack, ScanResult},
};

/// Outcome of [`BatchStream::skip_to_boundary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryHit {
    pub is_end: bool,
    pub is_parent: bool,
}

#[derive(Debug)]
pub struct BatchStream<R> {
    source: R,
    buffer: LookaheadBuffer,
    boundaries: BoundaryStack,
    encoding: BatchEncoding,
    encoding_checked: bool,
}

impl<R: Read> BatchStream<R> {
    #[must_use]
    pub fn new(
        source: R,
        batch_boundary: impl Into<String>,
        encoding: BatchEncoding,
        capacity: usize,
    ) -> Self {
        Self {
            source,
            buffer: LookaheadBuffer::with_capacity(capacity.max(LookaheadBuffer::MIN_CAPACITY)),
            boundaries: BoundaryStack::new(batch_boundary),
            encoding,
            encoding_checked: false,
        }
    }

    #[must_use]
    pub fn boundaries(&self) -> &BoundaryStack {
        &self.boundaries
    }

    pub fn push_boundary(&mut self, boundary: impl Into<String>) {
        self.boundaries.push(boundary);
    }

    pub fn pop_boundary(&mut self) -> Option<String> {
        self.boundaries.pop()
    }

    #[must_use]
    pub fn encoding(&self) -> BatchEncoding {
        self.encoding
    }

    #[must_use]
    pub fn buffer(&self) -> &LookaheadBuffer {
        &self.buffer
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    /// Rejects encodings the scanners cannot handle and consumes a leading
    /// byte-order mark. Runs once, before the first scan.
    pub fn prepare_encoding(&mut self) -> Result<(), ReaderError> {
        if self.encoding_checked {
            return Ok(());
        }
        self.encoding.ensure_scannable()?;
        while self.buffer.len() < 4 && !self.buffer.is_exhausted() {
            self.fill(self.buffer.read_position())?;
        }
        if let Some(bom) = detect_bom(self.buffer.unread()) {
            bom.encoding.ensure_scannable()?;
            log::debug!("skipping {} byte-order mark", bom.encoding.name());
            self.encoding = bom.encoding;
            self.buffer.skip_preamble(bom.len)?;
        }
        self.encoding_checked = true;
        Ok(())
    }

    fn fill(&mut self, preserve_from: usize) -> Result<bool, ReaderError> {
        self.buffer.refill(&mut self.source, preserve_from)
    }

    /// Refills keeping the partial delimiter that starts at `start`.
    fn fill_for_delimiter(&mut self, start: usize) -> Result<(), ReaderError> {
        let preserved = self.buffer.end() - start;
        if preserved == self.buffer.capacity() {
            return Err(FormatError::BoundaryLineTooLong(self.buffer.capacity()).into());
        }
        self.fill(start)?;
        Ok(())
    }

    /// Reads one line, excluding its terminator.
    ///
    /// Returns `None` if the stream is exhausted before any byte is read. A
    /// final line without terminator is returned as is.
    pub fn read_line(&mut self) -> Result<Option<String>, ReaderError> {
        self.prepare_encoding()?;
        let mut line = Vec::new();
        loop {
            match self.buffer.scan_for_line_end() {
                ScanResult::Match(end) => {
                    line.extend_from_slice(self.buffer.unread_until(end.start));
                    self.buffer.skip_to(end.end)?;
                    return Ok(Some(self.encoding.decode(&line)?));
                }
                ScanResult::PartialMatch { start } => {
                    line.extend_from_slice(self.buffer.unread_until(start));
                    self.buffer.skip_to(start)?;
                    self.fill(start)?;
                }
                ScanResult::NoMatch => {
                    let end = self.buffer.end();
                    line.extend_from_slice(self.buffer.unread());
                    self.buffer.skip_to(end)?;
                    if self.buffer.is_exhausted() {
                        if line.is_empty() {
                            return Ok(None);
                        }
                        return Ok(Some(self.encoding.decode(&line)?));
                    }
                    self.fill(end)?;
                }
            }
        }
    }

    /// Copies up to `count` bytes into `target[offset..]`, stopping where the
    /// next delimiter begins. Returns `0` once the read position is at a
    /// delimiter. Short counts are normal.
    pub fn read_with_delimiter(
        &mut self,
        target: &mut [u8],
        offset: usize,
        count: usize,
    ) -> Result<usize, ReaderError> {
        check_target(target, offset, count)?;
        self.prepare_encoding()?;
        let mut copied = 0;
        while copied < count {
            let remaining = count - copied;
            match self.buffer.scan_for_boundary(&self.boundaries, remaining) {
                ScanResult::Match(delimiter) => {
                    copied += self.copy_until(target, offset + copied, delimiter.start)?;
                    return Ok(copied);
                }
                ScanResult::PartialMatch { start } => {
                    copied += self.copy_until(target, offset + copied, start)?;
                    if copied > 0 {
                        return Ok(copied);
                    }
                    self.fill_for_delimiter(start)?;
                }
                ScanResult::NoMatch => {
                    let end = self.buffer.end().min(self.buffer.read_position() + remaining);
                    copied += self.copy_until(target, offset + copied, end)?;
                    if self.buffer.is_empty() {
                        if self.buffer.is_exhausted() {
                            if copied > 0 {
                                return Ok(copied);
                            }
                            return Err(ReaderError::UnexpectedEndOfInput(Expected::OperationBody));
                        }
                        let end = self.buffer.end();
                        self.fill(end)?;
                    }
                }
            }
        }
        Ok(copied)
    }

    /// Copies exactly `count` bytes into `target[offset..]`, ignoring
    /// delimiters.
    pub fn read_with_length(
        &mut self,
        target: &mut [u8],
        offset: usize,
        count: usize,
    ) -> Result<usize, ReaderError> {
        check_target(target, offset, count)?;
        self.prepare_encoding()?;
        let mut copied = 0;
        while copied < count {
            if self.buffer.is_empty() {
                if self.buffer.is_exhausted() {
                    return Err(InternalError::ShortRead {
                        expected: count,
                        read: copied,
                    }
                    .into());
                }
                let end = self.buffer.end();
                self.fill(end)?;
                continue;
            }
            let n = (count - copied).min(self.buffer.len());
            let end = self.buffer.read_position() + n;
            copied += self.copy_until(target, offset + copied, end)?;
        }
        Ok(copied)
    }

    /// Discards exactly `count` bytes, ignoring delimiters.
    pub fn skip_exact(&mut self, count: usize) -> Result<(), ReaderError> {
        self.prepare_encoding()?;
        let mut skipped = 0;
        while skipped < count {
            if self.buffer.is_empty() {
                if self.buffer.is_exhausted() {
                    return Err(ReaderError::UnexpectedEndOfInput(Expected::OperationBody));
                }
                let end = self.buffer.end();
                self.fill(end)?;
                continue;
            }
            let n = (count - skipped).min(self.buffer.len());
            self.buffer.skip_to(self.buffer.read_position() + n)?;
            skipped += n;
        }
        Ok(())
    }

    /// Discards bytes up to and including the next delimiter.
    ///
    /// A parent delimiter is left in place so it can be found again once the
    /// nested scope has been closed. Returns `None` if the stream ends first.
    pub fn skip_to_boundary(&mut self) -> Result<Option<BoundaryHit>, ReaderError> {
        self.prepare_encoding()?;
        loop {
            match self.buffer.scan_for_boundary(&self.boundaries, usize::MAX) {
                ScanResult::Match(delimiter) => {
                    let to = if delimiter.is_parent {
                        delimiter.start
                    } else {
                        delimiter.end
                    };
                    self.buffer.skip_to(to)?;
                    log::trace!(
                        "delimiter: end={} parent={} depth={}",
                        delimiter.is_end,
                        delimiter.is_parent,
                        self.boundaries.depth()
                    );
                    return Ok(Some(BoundaryHit {
                        is_end: delimiter.is_end,
                        is_parent: delimiter.is_parent,
                    }));
                }
                ScanResult::PartialMatch { start } => {
                    self.buffer.skip_to(start)?;
                    self.fill_for_delimiter(start)?;
                }
                ScanResult::NoMatch => {
                    let end = self.buffer.end();
                    self.buffer.skip_to(end)?;
                    if self.buffer.is_exhausted() {
                        return Ok(None);
                    }
                    self.fill(end)?;
                }
            }
        }
    }

    fn copy_until(
        &mut self,
        target: &mut [u8],
        at: usize,
        position: usize,
    ) -> Result<usize, ReaderError> {
        let bytes = self.buffer.unread_until(position);
        let n = bytes.len();
        target[at..at + n].copy_from_slice(bytes);
        self.buffer.skip_to(position)?;
        Ok(n)
    }
}

fn check_target(target: &[u8], offset: usize, count: usize) -> Result<(), InternalError> {
    match offset.checked_add(count) {
        Some(end) if end <= target.len() => Ok(()),
        _ => Err(InternalError::TargetTooSmall {
            len: target.len(),
            offset,
            count,
        }),
    }
}
