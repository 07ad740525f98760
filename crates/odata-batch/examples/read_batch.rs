//! Reads an OData batch payload from a file (or stdin) and prints one line
//! per reader state, followed by the headers and body size of each operation.
//!
//! Run with
//!
//! ```bash
//! cargo run -p odata-batch --example read_batch -- \
//!     'multipart/mixed; boundary=batch_1' request.txt
//! ```
//!
//! Pass `--response` before the content type to read a response batch. Set
//! `RUST_LOG=debug` to see why a malformed payload was rejected.
#![allow(missing_docs)]

use std::{
    error::Error,
    fs::File,
    io::{self, Read},
};

use odata_batch::{BatchReader, PayloadKind, ReaderOptions, ReaderState};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1).peekable();
    let payload_kind = if args.next_if(|a| a == "--response").is_some() {
        PayloadKind::Response
    } else {
        PayloadKind::Request
    };
    let content_type = args
        .next()
        .ok_or("usage: read_batch [--response] <content-type> [file]")?;
    let source: Box<dyn Read> = match args.next() {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };

    let options = ReaderOptions {
        payload_kind,
        ..Default::default()
    };
    let mut reader = BatchReader::from_content_type(source, &content_type, options)?;

    while reader.read()? {
        if reader.state() != ReaderState::Operation {
            println!("{:?}", reader.state());
            continue;
        }
        match payload_kind {
            PayloadKind::Request => {
                let mut op = reader.operation_request()?;
                println!("{} {}", op.method, op.url);
                for (name, value) in op.headers.iter() {
                    println!("    {name}: {value}");
                }
                println!("    ({} body bytes)", op.body.read_to_vec()?.len());
            }
            PayloadKind::Response => {
                let mut op = reader.operation_response()?;
                println!("{} {}", op.status_code, op.reason);
                for (name, value) in op.headers.iter() {
                    println!("    {name}: {value}");
                }
                println!("    ({} body bytes)", op.body.read_to_vec()?.len());
            }
        }
    }
    Ok(())
}
