use std::io::Read;

use crate::{
    BatchReader, HttpMethod, PayloadKind, ReaderError, ReaderOptions, ReaderState,
    chunk_utils::ChunkedReader,
};

mod parse_good;

/// One observable step of a batch read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Item {
    BatchStart,
    ChangeSetStart,
    Request {
        method: HttpMethod,
        url: String,
        content_id: Option<String>,
        body: Vec<u8>,
    },
    Response {
        status_code: u16,
        content_id: Option<String>,
        body: Vec<u8>,
    },
    ChangeSetEnd,
    BatchEnd,
}

pub(crate) fn request(method: HttpMethod, url: &str, body: &[u8]) -> Item {
    Item::Request {
        method,
        url: url.to_string(),
        content_id: None,
        body: body.to_vec(),
    }
}

/// An operation part with `\r\n` line endings.
pub(crate) fn request_part(boundary: &str, line: &str, headers: &[&str], body: &str) -> String {
    let mut part = format!(
        "--{boundary}\r\nContent-Type: application/http\r\nContent-Transfer-Encoding: binary\r\n\r\n{line}\r\n"
    );
    for header in headers {
        part.push_str(header);
        part.push_str("\r\n");
    }
    part.push_str("\r\n");
    part.push_str(body);
    part.push_str("\r\n");
    part
}

pub(crate) fn changeset_open(boundary: &str, changeset: &str) -> String {
    format!("--{boundary}\r\nContent-Type: multipart/mixed; boundary={changeset}\r\n\r\n")
}

pub(crate) fn new_reader(
    payload: &[u8],
    chunk_size: usize,
    options: ReaderOptions,
) -> BatchReader<ChunkedReader<'_>> {
    BatchReader::from_content_type(
        ChunkedReader::new(payload, chunk_size),
        "multipart/mixed; boundary=batch",
        options,
    )
    .unwrap()
}

/// Drives `reader` to completion. With `read_bodies` unset, operations are
/// not opened and their bodies are skipped by the reader.
pub(crate) fn read_items<R: Read>(
    reader: &mut BatchReader<R>,
    read_bodies: bool,
) -> Result<Vec<Item>, ReaderError> {
    let mut items = Vec::new();
    while reader.read()? {
        let item = match reader.state() {
            ReaderState::BatchStart => Item::BatchStart,
            ReaderState::ChangeSetStart => Item::ChangeSetStart,
            ReaderState::ChangeSetEnd => Item::ChangeSetEnd,
            ReaderState::BatchEnd => Item::BatchEnd,
            ReaderState::Operation if !read_bodies => continue,
            ReaderState::Operation => match reader.options().payload_kind {
                PayloadKind::Request => {
                    let mut op = reader.operation_request()?;
                    Item::Request {
                        method: op.method,
                        url: op.url.clone(),
                        content_id: op.content_id.clone(),
                        body: op.body.read_to_vec()?,
                    }
                }
                PayloadKind::Response => {
                    let mut op = reader.operation_response()?;
                    Item::Response {
                        status_code: op.status_code,
                        content_id: op.content_id.clone(),
                        body: op.body.read_to_vec()?,
                    }
                }
            },
            state => unreachable!("read returned true in state {state:?}"),
        };
        items.push(item);
    }
    Ok(items)
}

pub(crate) fn read_payload(payload: &str, chunk_size: usize) -> Result<Vec<Item>, ReaderError> {
    read_items(
        &mut new_reader(payload.as_bytes(), chunk_size, ReaderOptions::default()),
        true,
    )
}
