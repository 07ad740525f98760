use std::io::Read;

use super::*;
use crate::{BatchContentType, BatchEncoding, InternalError};

const SINGLE_GET: &str = "--batch_1\r\n\
    Content-Type: application/http\r\n\
    Content-Transfer-Encoding: binary\r\n\
    \r\n\
    GET http://x/y HTTP/1.1\r\n\
    \r\n\
    --batch_1--";

#[test]
fn single_query_end_to_end() {
    for chunk in 1..=SINGLE_GET.len() {
        let mut reader = BatchReader::from_content_type(
            ChunkedReader::new(SINGLE_GET.as_bytes(), chunk),
            "multipart/mixed; boundary=batch_1",
            ReaderOptions::default(),
        )
        .unwrap();
        let mut states = vec![reader.state()];
        let mut urls = Vec::new();
        while reader.read().unwrap() {
            states.push(reader.state());
            if reader.state() == ReaderState::Operation {
                let mut op = reader.operation_request().unwrap();
                assert_eq!(op.method, HttpMethod::Get);
                assert!(op.body.read_to_vec().unwrap().is_empty());
                urls.push(op.url);
            }
        }
        states.push(reader.state());
        assert_eq!(
            states,
            [
                ReaderState::Initial,
                ReaderState::BatchStart,
                ReaderState::Operation,
                ReaderState::BatchEnd,
                ReaderState::Completed,
            ],
            "chunk size {chunk}"
        );
        assert_eq!(urls, ["http://x/y"]);
        assert!(matches!(
            reader.read(),
            Err(ReaderError::Internal(InternalError::ReadInState(ReaderState::Completed)))
        ));
    }
}

#[test]
fn changeset_between_queries() {
    let payload = [
        request_part("batch", "GET Customers HTTP/1.1", &[], ""),
        changeset_open("batch", "cs_1"),
        request_part(
            "cs_1",
            "POST Customers HTTP/1.1",
            &["Content-ID: 1", "Content-Type: application/json"],
            "{\"Name\":\"A\"}",
        ),
        request_part("cs_1", "PATCH $1 HTTP/1.1", &[], "{\"Name\":\"B\"}"),
        "--cs_1--\r\n".to_string(),
        request_part("batch", "GET Orders HTTP/1.1", &[], ""),
        "--batch--\r\n".to_string(),
    ]
    .concat();

    assert_eq!(
        read_payload(&payload, 7).unwrap(),
        [
            Item::BatchStart,
            request(HttpMethod::Get, "Customers", b""),
            Item::ChangeSetStart,
            Item::Request {
                method: HttpMethod::Post,
                url: "Customers".into(),
                content_id: Some("1".into()),
                body: b"{\"Name\":\"A\"}".to_vec(),
            },
            request(HttpMethod::Patch, "$1", b"{\"Name\":\"B\"}"),
            Item::ChangeSetEnd,
            request(HttpMethod::Get, "Orders", b""),
            Item::BatchEnd,
        ]
    );
}

#[test]
fn batch_delimiter_closes_open_changeset() {
    let payload = [
        changeset_open("batch", "cs"),
        request_part("cs", "DELETE Customers(1) HTTP/1.1", &[], ""),
        "--batch--".to_string(),
    ]
    .concat();

    assert_eq!(
        read_payload(&payload, 3).unwrap(),
        [
            Item::BatchStart,
            Item::ChangeSetStart,
            request(HttpMethod::Delete, "Customers(1)", b""),
            Item::ChangeSetEnd,
            Item::BatchEnd,
        ]
    );
}

#[test]
fn changeset_closed_by_next_batch_part() {
    let payload = [
        changeset_open("batch", "cs"),
        request_part("cs", "PUT A HTTP/1.1", &[], "a"),
        request_part("batch", "GET B HTTP/1.1", &[], ""),
        "--batch--".to_string(),
    ]
    .concat();

    assert_eq!(
        read_payload(&payload, 5).unwrap(),
        [
            Item::BatchStart,
            Item::ChangeSetStart,
            request(HttpMethod::Put, "A", b"a"),
            Item::ChangeSetEnd,
            request(HttpMethod::Get, "B", b""),
            Item::BatchEnd,
        ]
    );
}

#[test]
fn empty_batch_and_empty_changeset() {
    assert_eq!(
        read_payload("--batch--", 1).unwrap(),
        [Item::BatchStart, Item::BatchEnd]
    );
    let payload = [changeset_open("batch", "cs"), "--cs--\r\n--batch--\r\n".to_string()].concat();
    assert_eq!(
        read_payload(&payload, 2).unwrap(),
        [
            Item::BatchStart,
            Item::ChangeSetStart,
            Item::ChangeSetEnd,
            Item::BatchEnd,
        ]
    );
}

#[test]
fn preamble_and_epilogue_are_ignored() {
    let payload = [
        "This is a preamble.\r\n--batch-not-a-delimiter\r\n".to_string(),
        request_part("batch", "GET A HTTP/1.1", &[], ""),
        "--batch--\r\nThis is an epilogue.\r\n--batch\r\n".to_string(),
    ]
    .concat();
    assert_eq!(
        read_payload(&payload, 4).unwrap(),
        [
            Item::BatchStart,
            request(HttpMethod::Get, "A", b""),
            Item::BatchEnd,
        ]
    );
}

#[test]
fn bare_lf_and_cr_line_endings() {
    let lf = "--batch\nContent-Type: application/http\nContent-Transfer-Encoding: binary\n\n\
              POST A HTTP/1.1\n\nline 1\nline 2\n--batch--\n";
    let cr = lf.replace('\n', "\r");
    for payload in [lf.to_string(), cr] {
        for chunk in [1, 2, 3, 64] {
            let items = read_payload(&payload, chunk).unwrap();
            let body = if payload.contains('\r') {
                b"line 1\rline 2".as_slice()
            } else {
                b"line 1\nline 2".as_slice()
            };
            assert_eq!(
                items,
                [
                    Item::BatchStart,
                    request(HttpMethod::Post, "A", body),
                    Item::BatchEnd,
                ],
                "chunk size {chunk}"
            );
        }
    }
}

#[test]
fn body_may_contain_dashes_and_similar_boundaries() {
    let body = "--\r\n--batc\r\n--batch2\r\n --batch\r\n-";
    let payload = [
        request_part("batch", "POST A HTTP/1.1", &[], body),
        "--batch--".to_string(),
    ]
    .concat();
    assert_eq!(
        read_payload(&payload, 3).unwrap(),
        [
            Item::BatchStart,
            request(HttpMethod::Post, "A", body.as_bytes()),
            Item::BatchEnd,
        ]
    );
}

#[test]
fn content_length_body_may_contain_delimiter() {
    let body = "x\r\n--batch\r\ny";
    let payload = [
        request_part(
            "batch",
            "POST A HTTP/1.1",
            &[&format!("Content-Length: {}", body.len())],
            body,
        ),
        "--batch--".to_string(),
    ]
    .concat();
    for chunk in [1, 4, 100] {
        assert_eq!(
            read_payload(&payload, chunk).unwrap(),
            [
                Item::BatchStart,
                request(HttpMethod::Post, "A", body.as_bytes()),
                Item::BatchEnd,
            ]
        );
        let mut reader = new_reader(payload.as_bytes(), chunk, ReaderOptions::default());
        assert_eq!(
            read_items(&mut reader, false).unwrap(),
            [Item::BatchStart, Item::BatchEnd]
        );
    }
}

#[test]
fn unread_bodies_are_skipped() {
    let payload = [
        request_part("batch", "POST A HTTP/1.1", &[], &"0123456789".repeat(100)),
        request_part("batch", "POST B HTTP/1.1", &[], "b"),
        "--batch--".to_string(),
    ]
    .concat();
    let mut reader = new_reader(payload.as_bytes(), 13, ReaderOptions::default());
    assert!(reader.read().unwrap());
    assert!(reader.read().unwrap());
    {
        let mut op = reader.operation_request().unwrap();
        assert_eq!(op.url, "A");
        let mut prefix = [0u8; 5];
        op.body.read_exact(&mut prefix).unwrap();
        assert_eq!(&prefix, b"01234");
    }
    assert!(reader.read().unwrap());
    let mut op = reader.operation_request().unwrap();
    assert_eq!(op.url, "B");
    let mut body = String::new();
    op.body.read_to_string(&mut body).unwrap();
    assert_eq!(body, "b");
}

#[test]
fn response_payload() {
    let payload = "--batch\r\n\
        Content-Type: application/http\r\n\
        Content-Transfer-Encoding: binary\r\n\
        \r\n\
        HTTP/1.1 200 OK\r\n\
        Content-Type: application/json\r\n\
        \r\n\
        {\"value\":[]}\r\n\
        --batch\r\n\
        Content-Type: multipart/mixed; boundary=cs\r\n\
        \r\n\
        --cs\r\n\
        Content-Type: application/http\r\n\
        Content-Transfer-Encoding: binary\r\n\
        Content-ID: 1\r\n\
        \r\n\
        HTTP/1.1 204 No Content\r\n\
        \r\n\
        \r\n\
        --cs--\r\n\
        --batch--\r\n";
    let mut reader = new_reader(
        payload.as_bytes(),
        9,
        ReaderOptions {
            payload_kind: PayloadKind::Response,
            ..Default::default()
        },
    );
    assert_eq!(
        read_items(&mut reader, true).unwrap(),
        [
            Item::BatchStart,
            Item::Response {
                status_code: 200,
                content_id: None,
                body: b"{\"value\":[]}".to_vec(),
            },
            Item::ChangeSetStart,
            Item::Response {
                status_code: 204,
                content_id: Some("1".into()),
                body: Vec::new(),
            },
            Item::ChangeSetEnd,
            Item::BatchEnd,
        ]
    );
}

#[test]
fn utf8_byte_order_mark_is_skipped() {
    let payload = format!("\u{feff}{SINGLE_GET}");
    let mut reader = BatchReader::new(
        ChunkedReader::new(payload.as_bytes(), 2),
        BatchContentType::new("batch_1").unwrap(),
        ReaderOptions::default(),
    );
    assert_eq!(
        read_items(&mut reader, true).unwrap(),
        [
            Item::BatchStart,
            request(HttpMethod::Get, "http://x/y", b""),
            Item::BatchEnd,
        ]
    );
}

#[test]
fn latin1_header_text() {
    let payload = b"--batch\r\n\
        Content-Type: application/http\r\n\
        Content-Transfer-Encoding: binary\r\n\
        \r\n\
        GET Stra\xdfe HTTP/1.1\r\n\
        \r\n\
        --batch--";
    let mut reader = BatchReader::from_content_type(
        &payload[..],
        "multipart/mixed; boundary=batch; charset=iso-8859-1",
        ReaderOptions::default(),
    )
    .unwrap();
    assert_eq!(
        read_items(&mut reader, true).unwrap(),
        [
            Item::BatchStart,
            request(HttpMethod::Get, "Stra\u{df}e", b""),
            Item::BatchEnd,
        ]
    );
    assert_eq!(
        BatchContentType::parse("multipart/mixed; boundary=b; charset=latin1")
            .unwrap()
            .encoding,
        BatchEncoding::Latin1
    );
}

#[test]
fn small_buffer_capacity_is_raised() {
    let payload = [
        request_part("batch", "POST A HTTP/1.1", &[], &"z".repeat(1000)),
        "--batch--".to_string(),
    ]
    .concat();
    let mut reader = new_reader(
        payload.as_bytes(),
        64,
        ReaderOptions {
            buffer_capacity: 1,
            ..Default::default()
        },
    );
    let items = read_items(&mut reader, true).unwrap();
    assert_eq!(items[1], request(HttpMethod::Post, "A", "z".repeat(1000).as_bytes()));
}
