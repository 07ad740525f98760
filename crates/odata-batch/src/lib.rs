//! A streaming, single-pass reader for OData `multipart/mixed` batch
//! payloads.
//!
//! The reader pulls bytes from any [`std::io::Read`] source through a fixed
//! lookahead buffer, finds boundary delimiters and line terminators across
//! arbitrary read seams, and surfaces the batch as a sequence of states:
//! changeset starts and ends, and operations whose bodies are exposed as
//! bounded readers.

#![allow(missing_docs)]

mod buffer;
mod content_type;
mod encoding;
mod error;
mod headers;
mod message_line;
mod operation;
mod options;
mod part;
mod reader;
mod stream;

pub mod chunk_utils;
pub mod scanner;

#[cfg(test)]
mod tests;

pub use buffer::LookaheadBuffer;
pub use content_type::{
    BatchContentType, ContentType, is_valid_boundary, parse_content_type,
};
pub use encoding::{BatchEncoding, ByteOrderMark, detect_bom};
pub use error::{Expected, FormatError, InternalError, ReaderError};
pub use headers::PartHeaders;
pub use message_line::{
    HTTP_VERSION, HttpMethod, MessageLine, RequestLine, StatusLine, parse_request_line,
    parse_status_line,
};
pub use operation::{OperationBody, OperationRequest, OperationResponse};
pub use options::{PayloadKind, ReaderOptions};
pub use part::{OperationPart, Part, PartHeaderReader};
pub use reader::{BatchReader, ReaderState};
pub use stream::{BatchStream, BoundaryHit};
