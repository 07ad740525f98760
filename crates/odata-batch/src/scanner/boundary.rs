use super::{ScanResult, line::scan_line_end};
use crate::buffer::LookaheadBuffer;

/// Active boundaries, batch boundary at the bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryStack {
    boundaries: Vec<String>,
}

impl BoundaryStack {
    #[must_use]
    pub fn new(batch_boundary: impl Into<String>) -> Self {
        Self {
            boundaries: vec![batch_boundary.into()],
        }
    }

    pub fn push(&mut self, boundary: impl Into<String>) {
        self.boundaries.push(boundary.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.boundaries.pop()
    }

    #[must_use]
    pub fn innermost(&self) -> Option<&str> {
        self.boundaries.last().map(String::as_str)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.boundaries.len()
    }

    /// Boundaries from innermost to outermost.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.boundaries.iter().rev().map(String::as_str)
    }
}

/// A located delimiter line.
///
/// `start` is the leading line terminator (or the `--` when the delimiter
/// sits at the start of a line already), `end` is one past its trailing
/// terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryMatch {
    pub start: usize,
    pub end: usize,
    /// The delimiter carries the closing `--`.
    pub is_end: bool,
    /// The delimiter belongs to an enclosing scope, not the innermost one.
    pub is_parent: bool,
}

impl LookaheadBuffer {
    /// Scans the unconsumed bytes for a delimiter of any boundary in
    /// `boundaries`, trying the innermost first at every candidate position.
    ///
    /// Only candidates starting within `max_scan_len` bytes of the read
    /// position are considered; confirming a candidate may look further.
    #[must_use]
    pub fn scan_for_boundary(
        &self,
        boundaries: &BoundaryStack,
        max_scan_len: usize,
    ) -> ScanResult<BoundaryMatch> {
        if max_scan_len == 0 {
            return ScanResult::NoMatch;
        }
        let bytes = self.bytes();
        let origin = self.read_position();
        let window_end = origin.saturating_add(max_scan_len);
        let exhausted = self.is_exhausted();

        if self.at_line_start() {
            match match_delimiter(bytes, origin, origin, boundaries, exhausted) {
                ScanResult::NoMatch => {}
                found => return found,
            }
        }

        let mut from = origin;
        loop {
            match scan_line_end(bytes, from, exhausted) {
                ScanResult::NoMatch => return ScanResult::NoMatch,
                ScanResult::PartialMatch { start } => {
                    return if start < window_end {
                        ScanResult::PartialMatch { start }
                    } else {
                        ScanResult::NoMatch
                    };
                }
                ScanResult::Match(line_end) => {
                    if line_end.start >= window_end {
                        return ScanResult::NoMatch;
                    }
                    match match_delimiter(bytes, line_end.start, line_end.end, boundaries, exhausted)
                    {
                        ScanResult::NoMatch => from = line_end.end,
                        found => return found,
                    }
                }
            }
        }
    }
}

/// Tests every boundary, innermost first, for a delimiter whose dashes begin
/// at `dashes_at`. `start` is where the delimiter (including any leading
/// terminator) begins.
fn match_delimiter(
    bytes: &[u8],
    start: usize,
    dashes_at: usize,
    boundaries: &BoundaryStack,
    exhausted: bool,
) -> ScanResult<BoundaryMatch> {
    for (depth, boundary) in boundaries.iter().enumerate() {
        match match_boundary(bytes, dashes_at, boundary.as_bytes(), exhausted) {
            ScanResult::NoMatch => {}
            ScanResult::PartialMatch { .. } => return ScanResult::PartialMatch { start },
            ScanResult::Match((end, is_end)) => {
                return ScanResult::Match(BoundaryMatch {
                    start,
                    end,
                    is_end,
                    is_parent: depth > 0,
                });
            }
        }
    }
    ScanResult::NoMatch
}

/// Matches `--boundary[--][ \t]*` followed by a terminator or the end of the
/// stream. On success yields the offset past the terminator and whether the
/// end form was seen.
fn match_boundary(
    bytes: &[u8],
    at: usize,
    boundary: &[u8],
    exhausted: bool,
) -> ScanResult<(usize, bool)> {
    let partial = if exhausted {
        ScanResult::NoMatch
    } else {
        ScanResult::PartialMatch { start: at }
    };

    let rest = &bytes[at..];
    let prefix_len = 2 + boundary.len();
    let available = rest.len().min(prefix_len);
    let same = rest[..available]
        .iter()
        .zip(b"--".iter().chain(boundary))
        .all(|(a, b)| a == b);
    if !same {
        return ScanResult::NoMatch;
    }
    if available < prefix_len {
        return partial;
    }

    let mut pos = at + prefix_len;
    let mut is_end = false;
    match (bytes.get(pos), bytes.get(pos + 1)) {
        (Some(b'-'), Some(b'-')) => {
            is_end = true;
            pos += 2;
        }
        (Some(b'-'), Some(_)) => return ScanResult::NoMatch,
        (Some(b'-'), None) => return partial,
        _ => {}
    }

    while matches!(bytes.get(pos), Some(b' ' | b'\t')) {
        pos += 1;
    }

    match bytes.get(pos) {
        None if exhausted => ScanResult::Match((pos, is_end)),
        None => partial,
        Some(b'\n') => ScanResult::Match((pos + 1, is_end)),
        Some(b'\r') => match bytes.get(pos + 1) {
            Some(b'\n') => ScanResult::Match((pos + 2, is_end)),
            Some(_) => ScanResult::Match((pos + 1, is_end)),
            None if exhausted => ScanResult::Match((pos + 1, is_end)),
            None => partial,
        },
        Some(_) => ScanResult::NoMatch,
    }
}
