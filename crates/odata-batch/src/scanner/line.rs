use bstr::ByteSlice;

use super::ScanResult;
use crate::buffer::LookaheadBuffer;

/// Byte span `start..end` of a `\r\n`, `\r` or `\n` terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEnd {
    pub start: usize,
    pub end: usize,
}

/// Finds the first terminator at or after `from` in `bytes`.
///
/// A `\r` in the last position is only partial: the next refill may supply
/// the `\n` of a `\r\n`. Once the source is exhausted it stands alone.
pub(crate) fn scan_line_end(bytes: &[u8], from: usize, exhausted: bool) -> ScanResult<LineEnd> {
    let Some(offset) = bytes[from..].find_byteset(b"\r\n") else {
        return ScanResult::NoMatch;
    };
    let start = from + offset;
    if bytes[start] == b'\n' {
        return ScanResult::Match(LineEnd {
            start,
            end: start + 1,
        });
    }
    match bytes.get(start + 1) {
        Some(b'\n') => ScanResult::Match(LineEnd {
            start,
            end: start + 2,
        }),
        Some(_) => ScanResult::Match(LineEnd {
            start,
            end: start + 1,
        }),
        None if exhausted => ScanResult::Match(LineEnd {
            start,
            end: start + 1,
        }),
        None => ScanResult::PartialMatch { start },
    }
}

impl LookaheadBuffer {
    /// Scans the unconsumed bytes for the next line terminator.
    #[must_use]
    pub fn scan_for_line_end(&self) -> ScanResult<LineEnd> {
        scan_line_end(self.bytes(), self.read_position(), self.is_exhausted())
    }
}
