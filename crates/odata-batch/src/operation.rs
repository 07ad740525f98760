//! Operations surfaced by the batch reader.

use std::io::{self, Read};

use crate::{
    error::{Expected, InternalError, ReaderError},
    headers::PartHeaders,
    message_line::HttpMethod,
    reader::ReaderState,
    stream::BatchStream,
};

/// A request embedded in a batch request payload.
#[derive(Debug)]
pub struct OperationRequest<'a, R> {
    pub method: HttpMethod,
    /// As written; `$n` Content-ID references are not resolved.
    pub url: String,
    pub headers: PartHeaders,
    pub content_id: Option<String>,
    pub body: OperationBody<'a, R>,
}

/// A response embedded in a batch response payload.
#[derive(Debug)]
pub struct OperationResponse<'a, R> {
    pub status_code: u16,
    pub reason: String,
    pub headers: PartHeaders,
    pub content_id: Option<String>,
    pub body: OperationBody<'a, R>,
}

/// The body of the current operation.
///
/// Yields the bytes up to the next delimiter, or exactly `Content-Length`
/// bytes when the operation declared one. A stream that ends before the
/// declared length is unexpected end of input. Bytes left unread are skipped by
/// the next [`BatchReader::read`](crate::BatchReader::read). Any failure puts
/// the reader into [`ReaderState::Exception`].
#[derive(Debug)]
pub struct OperationBody<'a, R> {
    stream: &'a mut BatchStream<R>,
    state: &'a mut ReaderState,
    remaining: &'a mut Option<usize>,
    done: bool,
}

impl<'a, R: Read> OperationBody<'a, R> {
    pub(crate) fn new(
        stream: &'a mut BatchStream<R>,
        state: &'a mut ReaderState,
        remaining: &'a mut Option<usize>,
    ) -> Self {
        Self {
            stream,
            state,
            remaining,
            done: false,
        }
    }

    /// Declared `Content-Length` bytes not yet read, if any was declared.
    #[must_use]
    pub fn remaining_length(&self) -> Option<usize> {
        *self.remaining
    }

    /// Reads into `buf`, reporting failures as [`ReaderError`].
    pub fn read_body(&mut self, buf: &mut [u8]) -> Result<usize, ReaderError> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }
        let result = match *self.remaining {
            Some(0) => Ok(0),
            Some(n) => {
                let count = n.min(buf.len());
                self.stream
                    .read_with_length(buf, 0, count)
                    .inspect(|&read| *self.remaining = Some(n - read))
                    .map_err(|e| match e {
                        ReaderError::Internal(InternalError::ShortRead { .. }) => {
                            ReaderError::UnexpectedEndOfInput(Expected::OperationBody)
                        }
                        e => e,
                    })
            }
            None => {
                let len = buf.len();
                self.stream.read_with_delimiter(buf, 0, len)
            }
        };
        match result {
            Ok(0) => {
                self.done = true;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) => {
                log::debug!("operation body failed: {e}");
                *self.state = ReaderState::Exception;
                self.done = true;
                Err(e)
            }
        }
    }

    /// Reads the rest of the body.
    pub fn read_to_vec(&mut self) -> Result<Vec<u8>, ReaderError> {
        let mut body = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            match self.read_body(&mut chunk)? {
                0 => return Ok(body),
                n => body.extend_from_slice(&chunk[..n]),
            }
        }
    }
}

impl<R: Read> Read for OperationBody<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_body(buf).map_err(|e| match e {
            ReaderError::Io(e) => e,
            e => io::Error::other(e),
        })
    }
}
