//! Scanners over the lookahead buffer.
//!
//! Both scanners are pure: they inspect [`LookaheadBuffer::bytes`] from the
//! read position and report absolute offsets, never consuming or refilling.
//! The caller decides what to consume and from where to refill.
//!
//! A scan has three outcomes:
//! - [`ScanResult::NoMatch`]: the pattern is provably absent from the
//!   examined bytes.
//! - [`ScanResult::PartialMatch`]: a candidate starts at `start` but the
//!   buffered bytes end before it can be confirmed or refuted. The caller
//!   must refill preserving everything from `start`, then scan again.
//! - [`ScanResult::Match`]: the pattern was located.
//!
//! A boundary scan never reports `NoMatch` while a candidate could still be
//! completed by bytes that have not arrived yet.
//!
//! [`LookaheadBuffer::bytes`]: crate::buffer::LookaheadBuffer::bytes

mod boundary;
mod line;


pub use boundary::{BoundaryMatch, BoundaryStack};
pub use line::LineEnd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult<M> {
    NoMatch,
    PartialMatch { start: usize },
    Match(M),
}

impl<M> ScanResult<M> {
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, ScanResult::Match(_))
    }
}
