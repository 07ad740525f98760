#![allow(missing_docs)]
#![allow(dead_code)]

use core::fmt::Write;
use std::io::Read;

use odata_batch::{BatchReader, PartHeaders, PayloadKind, ReaderState};

pub const REQUEST_CONTENT_TYPE: &str =
    "multipart/mixed; boundary=batch_36522ad7-fc75-4b56-8c71-56071383e77b";

pub const REQUEST: &str = r#"--batch_36522ad7-fc75-4b56-8c71-56071383e77b
Content-Type: application/http
Content-Transfer-Encoding: binary

GET Customers('ALFKI') HTTP/1.1
Host: host

--batch_36522ad7-fc75-4b56-8c71-56071383e77b
Content-Type: multipart/mixed; boundary=changeset_77162fcd-b8da-41ac-a9f8-9357efbbd621

--changeset_77162fcd-b8da-41ac-a9f8-9357efbbd621
Content-Type: application/http
Content-Transfer-Encoding: binary
Content-ID: 1

POST Customers HTTP/1.1
Host: host
Content-Type: application/json

{"CustomerID":"NEWCO","CompanyName":"New Company"}
--changeset_77162fcd-b8da-41ac-a9f8-9357efbbd621
Content-Type: application/http
Content-Transfer-Encoding: binary
Content-ID: 2

PATCH $1 HTTP/1.1
Host: host
Content-Type: application/json
Content-Length: 30

{"CompanyName":"Renamed Inc."}
--changeset_77162fcd-b8da-41ac-a9f8-9357efbbd621--

--batch_36522ad7-fc75-4b56-8c71-56071383e77b
Content-Type: application/http
Content-Transfer-Encoding: binary

GET Products?$top=2 HTTP/1.1
Host: host

--batch_36522ad7-fc75-4b56-8c71-56071383e77b--
"#;

pub const RESPONSE_CONTENT_TYPE: &str = "multipart/mixed; boundary=batchresponse_1";

pub const RESPONSE: &str = r#"--batchresponse_1
Content-Type: application/http
Content-Transfer-Encoding: binary

HTTP/1.1 200 OK
Content-Type: application/json;odata=minimalmetadata

{"CustomerID":"ALFKI"}
--batchresponse_1
Content-Type: multipart/mixed; boundary=changesetresponse_1

--changesetresponse_1
Content-Type: application/http
Content-Transfer-Encoding: binary
Content-ID: 1

HTTP/1.1 201 Created
Location: Customers('NEWCO')

--changesetresponse_1
Content-Type: application/http
Content-Transfer-Encoding: binary
Content-ID: 2

HTTP/1.1 204 No Content

--changesetresponse_1--
--batchresponse_1--
"#;

/// The payload with `\r\n` line endings, as sent on the wire.
pub fn crlf(payload: &str) -> Vec<u8> {
    payload.replace('\n', "\r\n").into_bytes()
}

fn render_headers(out: &mut String, headers: &PartHeaders) {
    for (name, value) in headers.iter() {
        writeln!(out, "  {name}: {value}").unwrap();
    }
}

fn render_content_id(content_id: Option<&str>) -> String {
    content_id.map_or_else(String::new, |id| format!(" [Content-ID {id}]"))
}

/// Reads the whole batch and renders one block per state. Errors end the
/// rendering with an `error:` line.
pub fn render<R: Read>(reader: &mut BatchReader<R>) -> String {
    let mut out = String::new();
    loop {
        match reader.read() {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                writeln!(out, "error: {e}").unwrap();
                break;
            }
        }
        if reader.state() != ReaderState::Operation {
            writeln!(out, "{:?}", reader.state()).unwrap();
            continue;
        }
        let body = match reader.options().payload_kind {
            PayloadKind::Request => {
                let mut op = reader.operation_request().unwrap();
                let id = render_content_id(op.content_id.as_deref());
                writeln!(out, "{} {}{id}", op.method, op.url).unwrap();
                render_headers(&mut out, &op.headers);
                op.body.read_to_vec()
            }
            PayloadKind::Response => {
                let mut op = reader.operation_response().unwrap();
                let id = render_content_id(op.content_id.as_deref());
                writeln!(out, "{} {}{id}", op.status_code, op.reason).unwrap();
                render_headers(&mut out, &op.headers);
                op.body.read_to_vec()
            }
        };
        match body {
            Ok(body) => writeln!(out, "  body: {:?}", String::from_utf8_lossy(&body)).unwrap(),
            Err(e) => {
                writeln!(out, "error: {e}").unwrap();
                break;
            }
        }
    }
    out
}
