#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use odata_batch::{
    BatchReader, PayloadKind, ReaderOptions, ReaderState, chunk_utils::ChunkedReader,
};

#[derive(Debug, Arbitrary)]
struct Input {
    response: bool,
    capacity: u16,
    /// Read sizes cycled by the source; zero entries read one byte.
    sizes: Vec<u8>,
    /// Body read sizes; zero drops the operation without reading its body.
    body_reads: Vec<u8>,
    payload: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let Input {
        response,
        capacity,
        sizes,
        body_reads,
        payload,
    } = input;
    let payload_kind = if response {
        PayloadKind::Response
    } else {
        PayloadKind::Request
    };
    let sizes = if sizes.is_empty() {
        vec![1]
    } else {
        sizes.into_iter().map(usize::from).collect()
    };
    let options = ReaderOptions {
        payload_kind,
        buffer_capacity: usize::from(capacity),
        ..Default::default()
    };
    let Ok(mut reader) = BatchReader::from_content_type(
        ChunkedReader::with_sizes(&payload, sizes),
        "multipart/mixed; boundary=batch",
        options,
    ) else {
        return;
    };

    let mut body_reads = body_reads.into_iter().cycle();
    let mut buf = [0u8; 256];
    loop {
        match reader.read() {
            Ok(true) => {}
            Ok(false) => {
                assert_eq!(reader.state(), ReaderState::Completed);
                break;
            }
            Err(_) => {
                assert_eq!(reader.state(), ReaderState::Exception);
                assert!(reader.read().is_err());
                break;
            }
        }
        if reader.state() != ReaderState::Operation {
            continue;
        }
        let step = usize::from(body_reads.next().unwrap_or(0));
        if step == 0 {
            continue;
        }
        let mut body = match payload_kind {
            PayloadKind::Request => match reader.operation_request() {
                Ok(op) => op.body,
                Err(_) => break,
            },
            PayloadKind::Response => match reader.operation_response() {
                Ok(op) => op.body,
                Err(_) => break,
            },
        };
        let step = step.min(buf.len());
        loop {
            match body.read_body(&mut buf[..step]) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
    }
});
