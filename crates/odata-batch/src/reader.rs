//! The batch reader state machine.
//!
//! ```text
//! Initial -> BatchStart -> { Operation | ChangeSetStart Operation* ChangeSetEnd }* -> BatchEnd -> Completed
//! ```
//!
//! Every failure moves the reader to `Exception`, which like `Completed` is
//! terminal.

use std::io::Read;

use crate::{
    content_type::BatchContentType,
    error::{Expected, FormatError, InternalError, ReaderError},
    message_line::MessageLine,
    operation::{OperationBody, OperationRequest, OperationResponse},
    options::{PayloadKind, ReaderOptions},
    part::{OperationPart, Part, PartHeaderReader},
    stream::BatchStream,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReaderState {
    /// Nothing has been read yet.
    Initial,
    /// The payload is open; no part has been read.
    BatchStart,
    /// A changeset was opened; its boundary is now the innermost one.
    ChangeSetStart,
    /// An operation's headers were read; its body follows.
    Operation,
    /// The current changeset was closed, explicitly or by a delimiter of the
    /// batch.
    ChangeSetEnd,
    /// The batch end delimiter was read.
    BatchEnd,
    Completed,
    Exception,
}

/// A pull reader over one batch payload.
///
/// # Examples
///
/// ```rust
/// use odata_batch::{BatchReader, ReaderOptions, ReaderState};
///
/// let payload = b"--batch_1\r\n\
///     Content-Type: application/http\r\n\
///     Content-Transfer-Encoding: binary\r\n\
///     \r\n\
///     GET http://x/y HTTP/1.1\r\n\
///     \r\n\
///     --batch_1--";
/// let mut reader = BatchReader::from_content_type(
///     &payload[..],
///     "multipart/mixed; boundary=batch_1",
///     ReaderOptions::default(),
/// )?;
///
/// let mut urls = Vec::new();
/// while reader.read()? {
///     if reader.state() == ReaderState::Operation {
///         urls.push(reader.operation_request()?.url);
///     }
/// }
/// assert_eq!(urls, ["http://x/y"]);
/// # Ok::<(), odata_batch::ReaderError>(())
/// ```
#[derive(Debug)]
pub struct BatchReader<R> {
    stream: BatchStream<R>,
    options: ReaderOptions,
    state: ReaderState,
    parts_in_batch: usize,
    operations_in_changeset: usize,
    changeset_content_ids: Vec<String>,
    pending: Option<OperationPart>,
    body_remaining: Option<usize>,
}

impl<R: Read> BatchReader<R> {
    #[must_use]
    pub fn new(source: R, content_type: BatchContentType, options: ReaderOptions) -> Self {
        Self {
            stream: BatchStream::new(
                source,
                content_type.boundary,
                content_type.encoding,
                options.buffer_capacity,
            ),
            options,
            state: ReaderState::Initial,
            parts_in_batch: 0,
            operations_in_changeset: 0,
            changeset_content_ids: Vec::new(),
            pending: None,
            body_remaining: None,
        }
    }

    /// Creates a reader from the `Content-Type` header of the batch message.
    pub fn from_content_type(
        source: R,
        content_type: &str,
        options: ReaderOptions,
    ) -> Result<Self, ReaderError> {
        Ok(Self::new(source, BatchContentType::parse(content_type)?, options))
    }

    #[must_use]
    pub fn state(&self) -> ReaderState {
        self.state
    }

    #[must_use]
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn in_changeset(&self) -> bool {
        self.stream.boundaries().depth() > 1
    }

    /// Advances to the next state. Returns `false` once the batch has been
    /// read completely.
    pub fn read(&mut self) -> Result<bool, ReaderError> {
        let result = self.step();
        match &result {
            Ok(_) => log::debug!("batch reader state: {:?}", self.state),
            Err(e) => {
                log::debug!("batch reader failed in state {:?}: {e}", self.state);
                self.state = ReaderState::Exception;
            }
        }
        result
    }

    fn step(&mut self) -> Result<bool, ReaderError> {
        match self.state {
            ReaderState::Initial => {
                self.stream.prepare_encoding()?;
                self.state = ReaderState::BatchStart;
            }
            ReaderState::BatchStart | ReaderState::ChangeSetStart | ReaderState::Operation => {
                self.next_part()?;
            }
            ReaderState::ChangeSetEnd => {
                self.stream.pop_boundary();
                self.operations_in_changeset = 0;
                self.changeset_content_ids.clear();
                self.next_part()?;
            }
            ReaderState::BatchEnd => {
                self.state = ReaderState::Completed;
                return Ok(false);
            }
            ReaderState::Completed | ReaderState::Exception => {
                return Err(InternalError::ReadInState(self.state).into());
            }
        }
        Ok(true)
    }

    fn next_part(&mut self) -> Result<(), ReaderError> {
        self.pending = None;
        if let Some(n) = self.body_remaining.take() {
            self.stream.skip_exact(n)?;
        }

        let in_changeset = self.in_changeset();
        let Some(hit) = self.stream.skip_to_boundary()? else {
            let expected = if in_changeset {
                Expected::ChangeSetEnd
            } else {
                Expected::BatchEnd
            };
            return Err(ReaderError::UnexpectedEndOfInput(expected));
        };
        if hit.is_end || hit.is_parent {
            self.state = if in_changeset {
                ReaderState::ChangeSetEnd
            } else {
                ReaderState::BatchEnd
            };
            return Ok(());
        }

        let part = PartHeaderReader::new(&mut self.stream)
            .read_part(self.options.payload_kind, in_changeset)?;
        match part {
            Part::ChangeSet { boundary } => {
                if in_changeset {
                    return Err(FormatError::NestedChangeSet.into());
                }
                self.count_batch_part()?;
                log::trace!("changeset opened with boundary {boundary:?}");
                self.stream.push_boundary(boundary);
                self.operations_in_changeset = 0;
                self.changeset_content_ids.clear();
                self.state = ReaderState::ChangeSetStart;
            }
            Part::Operation(operation) => {
                self.count_operation(in_changeset, operation.content_id.as_deref())?;
                self.body_remaining = operation.content_length;
                self.pending = Some(operation);
                self.state = ReaderState::Operation;
            }
        }
        Ok(())
    }

    /// Changeset members count against the changeset ceiling only; a
    /// changeset as a whole is one batch part.
    fn count_operation(
        &mut self,
        in_changeset: bool,
        content_id: Option<&str>,
    ) -> Result<(), FormatError> {
        if !in_changeset {
            return self.count_batch_part();
        }
        self.operations_in_changeset += 1;
        if self.operations_in_changeset > self.options.max_operations_per_changeset {
            return Err(FormatError::MaxOperationsPerChangeSetExceeded(
                self.options.max_operations_per_changeset,
            ));
        }
        if let Some(id) = content_id {
            if self.changeset_content_ids.iter().any(|seen| seen == id) {
                return Err(FormatError::DuplicateContentId(id.to_string()));
            }
            self.changeset_content_ids.push(id.to_string());
        }
        Ok(())
    }

    fn count_batch_part(&mut self) -> Result<(), FormatError> {
        self.parts_in_batch += 1;
        if self.parts_in_batch > self.options.max_parts_per_batch {
            return Err(FormatError::MaxPartsPerBatchExceeded(
                self.options.max_parts_per_batch,
            ));
        }
        Ok(())
    }

    /// Takes the operation surfaced by the last `read`.
    fn take_operation(&mut self, kind: PayloadKind) -> Result<OperationPart, InternalError> {
        if self.state != ReaderState::Operation {
            return Err(InternalError::NoOperation(self.state));
        }
        if self.options.payload_kind != kind {
            return Err(InternalError::WrongPayloadKind(match self.options.payload_kind {
                PayloadKind::Request => "request",
                PayloadKind::Response => "response",
            }));
        }
        self.pending.take().ok_or(InternalError::OperationAlreadyCreated)
    }

    fn fail<T>(&mut self, e: impl Into<ReaderError>) -> Result<T, ReaderError> {
        let e = e.into();
        log::debug!("batch reader failed in state {:?}: {e}", self.state);
        self.state = ReaderState::Exception;
        Err(e)
    }

    /// The current operation of a request payload. Available once per
    /// operation, in state [`ReaderState::Operation`].
    pub fn operation_request(&mut self) -> Result<OperationRequest<'_, R>, ReaderError> {
        let operation = match self.take_operation(PayloadKind::Request) {
            Ok(operation) => operation,
            Err(e) => return self.fail(e),
        };
        let line = match operation.line {
            MessageLine::Request(line) => line,
            other => return self.fail(InternalError::WrongPayloadKind(other.kind())),
        };
        let Self {
            stream,
            state,
            body_remaining,
            ..
        } = self;
        Ok(OperationRequest {
            method: line.method,
            url: line.url,
            headers: operation.headers,
            content_id: operation.content_id,
            body: OperationBody::new(stream, state, body_remaining),
        })
    }

    /// The current operation of a response payload. Available once per
    /// operation, in state [`ReaderState::Operation`].
    pub fn operation_response(&mut self) -> Result<OperationResponse<'_, R>, ReaderError> {
        let operation = match self.take_operation(PayloadKind::Response) {
            Ok(operation) => operation,
            Err(e) => return self.fail(e),
        };
        let line = match operation.line {
            MessageLine::Response(line) => line,
            other => return self.fail(InternalError::WrongPayloadKind(other.kind())),
        };
        let Self {
            stream,
            state,
            body_remaining,
            ..
        } = self;
        Ok(OperationResponse {
            status_code: line.status_code,
            reason: line.reason,
            headers: operation.headers,
            content_id: operation.content_id,
            body: OperationBody::new(stream, state, body_remaining),
        })
    }

    pub fn into_inner(self) -> R {
        self.stream.into_inner()
    }
}
