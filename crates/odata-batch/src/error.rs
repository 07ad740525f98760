use thiserror::Error;

use crate::reader::ReaderState;

/// Any failure surfaced by the batch reader.
///
/// Every error is terminal: the reader moves to [`ReaderState::Exception`]
/// and refuses further reads.
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("batch format error: {0}")]
    Format(#[from] FormatError),
    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
    #[error("unexpected end of input while reading {0}")]
    UnexpectedEndOfInput(Expected),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReaderError {
    /// Returns the format error, if this is one.
    #[must_use]
    pub fn as_format(&self) -> Option<&FormatError> {
        match self {
            ReaderError::Format(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the internal error, if this is one.
    #[must_use]
    pub fn as_internal(&self) -> Option<&InternalError> {
        match self {
            ReaderError::Internal(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unexpected_end(&self) -> bool {
        matches!(self, ReaderError::UnexpectedEndOfInput(_))
    }
}

/// The structurally required element that was still open when input ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    PartHeaders,
    MessageLine,
    HttpHeaders,
    OperationBody,
    ChangeSetEnd,
    BatchEnd,
}

impl core::fmt::Display for Expected {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Expected::PartHeaders => "part headers",
            Expected::MessageLine => "request or status line",
            Expected::HttpHeaders => "operation headers",
            Expected::OperationBody => "operation body",
            Expected::ChangeSetEnd => "changeset end boundary",
            Expected::BatchEnd => "batch end boundary",
        })
    }
}

/// Malformed payload. Each variant is a stable identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("missing Content-Type header")]
    MissingContentType,
    #[error("invalid content type '{0}'")]
    InvalidContentType(String),
    #[error("multipart content type has no boundary parameter")]
    MissingBoundary,
    #[error("multipart content type has more than one boundary parameter")]
    DuplicateBoundary,
    #[error("invalid boundary '{0}'")]
    InvalidBoundary(String),
    #[error("missing Content-Transfer-Encoding header")]
    MissingContentTransferEncoding,
    #[error("invalid Content-Transfer-Encoding '{0}', expected 'binary'")]
    InvalidContentTransferEncoding(String),
    #[error("duplicate header '{0}'")]
    DuplicateHeader(String),
    #[error("header '{0}' matches more than one header case-insensitively")]
    AmbiguousHeader(String),
    #[error("invalid header line '{0}'")]
    InvalidHeaderLine(String),
    #[error("invalid request line '{0}'")]
    InvalidRequestLine(String),
    #[error("invalid response line '{0}'")]
    InvalidResponseLine(String),
    #[error("unsupported HTTP version '{0}'")]
    UnsupportedHttpVersion(String),
    #[error("invalid status code '{0}'")]
    InvalidStatusCode(String),
    #[error("invalid HTTP method '{0}'")]
    InvalidHttpMethod(String),
    #[error("HTTP method '{0}' is not allowed inside a changeset")]
    MethodNotAllowedInChangeSet(String),
    #[error("changesets cannot be nested")]
    NestedChangeSet,
    #[error("multi-byte encodings are not supported: {0}")]
    MultiByteEncodingNotSupported(String),
    #[error("unsupported charset '{0}'")]
    UnsupportedCharset(String),
    #[error("line is not valid {0} text")]
    InvalidText(&'static str),
    #[error("invalid Content-Length '{0}'")]
    InvalidContentLength(String),
    #[error("boundary line does not fit in a {0} byte buffer")]
    BoundaryLineTooLong(usize),
    #[error("the number of parts in the batch exceeds the maximum of {0}")]
    MaxPartsPerBatchExceeded(usize),
    #[error("the number of operations in a changeset exceeds the maximum of {0}")]
    MaxOperationsPerChangeSetExceeded(usize),
    #[error("duplicate Content-ID '{0}' in changeset")]
    DuplicateContentId(String),
}

/// Contract violation by the caller or by the reader itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    #[error("preserve offset {offset} outside of buffered bytes {start}..{end}")]
    InvalidPreserveOffset {
        offset: usize,
        start: usize,
        end: usize,
    },
    #[error("cannot skip to {position}, buffered bytes end at {end}")]
    SkipPastEnd { position: usize, end: usize },
    #[error("buffer of {0} bytes is full, cannot refill")]
    BufferFull(usize),
    #[error("target of {len} bytes cannot hold {count} bytes at offset {offset}")]
    TargetTooSmall {
        len: usize,
        offset: usize,
        count: usize,
    },
    #[error("expected {expected} bytes but the stream ended after {read}")]
    ShortRead { expected: usize, read: usize },
    #[error("read is not permitted in state {0:?}")]
    ReadInState(ReaderState),
    #[error("no operation is available in state {0:?}")]
    NoOperation(ReaderState),
    #[error("operation message was already created")]
    OperationAlreadyCreated,
    #[error("operation is a {0}, not the requested message kind")]
    WrongPayloadKind(&'static str),
}
