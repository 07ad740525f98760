//! Headers of a MIME part and the HTTP message embedded in it.

use std::io::Read;

use crate::{
    content_type::parse_content_type,
    error::{Expected, FormatError, ReaderError},
    headers::PartHeaders,
    message_line::{MessageLine, parse_request_line, parse_status_line},
    options::PayloadKind,
    stream::BatchStream,
};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";
pub const CONTENT_ID: &str = "Content-ID";
pub const CONTENT_LENGTH: &str = "Content-Length";

/// What a part opened by a start delimiter turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    ChangeSet { boundary: String },
    Operation(OperationPart),
}

/// An operation part read up to the start of its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPart {
    /// Headers of the MIME part itself.
    pub mime_headers: PartHeaders,
    pub line: MessageLine,
    /// Headers of the embedded HTTP message.
    pub headers: PartHeaders,
    pub content_id: Option<String>,
    pub content_length: Option<usize>,
}

/// Reads what follows a start delimiter: the part headers and, for an
/// operation, the embedded message line and HTTP headers.
pub struct PartHeaderReader<'a, R> {
    stream: &'a mut BatchStream<R>,
}

impl<'a, R: Read> PartHeaderReader<'a, R> {
    pub fn new(stream: &'a mut BatchStream<R>) -> Self {
        Self { stream }
    }

    /// Reads `Name: Value` lines up to the first empty line.
    pub fn read_headers(&mut self, expected: Expected) -> Result<PartHeaders, ReaderError> {
        let mut headers = PartHeaders::new();
        loop {
            let line = self
                .stream
                .read_line()?
                .ok_or(ReaderError::UnexpectedEndOfInput(expected))?;
            if line.is_empty() {
                return Ok(headers);
            }
            let (name, value) = split_header_line(&line)?;
            headers.insert(name, value)?;
        }
    }

    pub fn read_part(
        &mut self,
        payload_kind: PayloadKind,
        in_changeset: bool,
    ) -> Result<Part, ReaderError> {
        let mime_headers = self.read_headers(Expected::PartHeaders)?;
        let value = mime_headers
            .get(CONTENT_TYPE)?
            .ok_or(FormatError::MissingContentType)?;
        let content_type = parse_content_type(value)
            .ok_or_else(|| FormatError::InvalidContentType(value.to_string()))?;

        if content_type.is_mime_type("multipart", "mixed") {
            let boundary = content_type.boundary()?.to_string();
            return Ok(Part::ChangeSet { boundary });
        }
        if !content_type.is_mime_type("application", "http") {
            return Err(FormatError::InvalidContentType(value.to_string()).into());
        }
        match mime_headers.get(CONTENT_TRANSFER_ENCODING)? {
            None => return Err(FormatError::MissingContentTransferEncoding.into()),
            Some(cte) if !cte.eq_ignore_ascii_case("binary") => {
                return Err(FormatError::InvalidContentTransferEncoding(cte.to_string()).into());
            }
            Some(_) => {}
        }

        let line = self.read_message_line()?;
        let line = match payload_kind {
            PayloadKind::Request => MessageLine::Request(parse_request_line(&line, in_changeset)?),
            PayloadKind::Response => MessageLine::Response(parse_status_line(&line)?),
        };
        let headers = self.read_headers(Expected::HttpHeaders)?;

        let content_id = match mime_headers.get(CONTENT_ID)? {
            Some(id) => Some(id.to_string()),
            None => headers.get(CONTENT_ID)?.map(str::to_string),
        };
        let content_length = headers
            .get(CONTENT_LENGTH)?
            .map(|v| {
                v.parse::<usize>()
                    .map_err(|_| FormatError::InvalidContentLength(v.to_string()))
            })
            .transpose()?;

        Ok(Part::Operation(OperationPart {
            mime_headers,
            line,
            headers,
            content_id,
            content_length,
        }))
    }

    /// First non-empty line after the part headers.
    fn read_message_line(&mut self) -> Result<String, ReaderError> {
        loop {
            match self.stream.read_line()? {
                Some(line) if line.is_empty() => {}
                Some(line) => return Ok(line),
                None => return Err(ReaderError::UnexpectedEndOfInput(Expected::MessageLine)),
            }
        }
    }
}

fn split_header_line(line: &str) -> Result<(&str, &str), FormatError> {
    let invalid = || FormatError::InvalidHeaderLine(line.to_string());
    let (name, value) = line.split_once(':').ok_or_else(invalid)?;
    let name = name.trim_end();
    if name.is_empty() || name.starts_with([' ', '\t']) {
        return Err(invalid());
    }
    Ok((name, value.trim()))
}
