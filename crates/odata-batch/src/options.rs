use crate::buffer::LookaheadBuffer;

/// Whether the batch carries requests (client to service) or responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PayloadKind {
    #[default]
    Request,
    Response,
}

/// Configuration options for the batch reader.
///
/// The quota ceilings are owned by the host; the reader only checks them.
///
/// # Examples
///
/// ```rust
/// use odata_batch::{PayloadKind, ReaderOptions};
///
/// let options = ReaderOptions {
///     payload_kind: PayloadKind::Response,
///     max_operations_per_changeset: 10,
///     ..Default::default()
/// };
/// assert_eq!(options.max_parts_per_batch, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReaderOptions {
    /// Whether operations are parsed as requests or responses.
    ///
    /// # Default
    ///
    /// [`PayloadKind::Request`]
    pub payload_kind: PayloadKind,

    /// Maximum number of top-level parts in the batch. An operation outside
    /// a changeset and a whole changeset each count as one part.
    ///
    /// # Default
    ///
    /// `100`
    pub max_parts_per_batch: usize,

    /// Maximum number of operations in a single changeset.
    ///
    /// # Default
    ///
    /// `1000`
    pub max_operations_per_changeset: usize,

    /// Capacity of the lookahead buffer in bytes. Values below
    /// [`LookaheadBuffer::MIN_CAPACITY`] are raised to it.
    ///
    /// # Default
    ///
    /// [`LookaheadBuffer::DEFAULT_CAPACITY`]
    pub buffer_capacity: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            payload_kind: PayloadKind::Request,
            max_parts_per_batch: 100,
            max_operations_per_changeset: 1000,
            buffer_capacity: LookaheadBuffer::DEFAULT_CAPACITY,
        }
    }
}
