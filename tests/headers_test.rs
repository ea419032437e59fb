use email_metadata::*;
use std::io::Cursor;

fn names(headers: &RawHeaders) -> Vec<&str> {
    headers.iter().map(|h| h.name.as_str()).collect()
}

#[test]
fn test_headers_in_order() {
    let headers = read_headers(b"From: a@x.com\r\nTo: b@y.com\r\nSubject: Hi\r\n\r\nbody");

    assert_eq!(names(&headers), vec!["From", "To", "Subject"]);
    assert_eq!(headers.get("subject").unwrap().value, b"Hi");
    assert!(headers.boundary_reached);
    assert!(!headers.truncated);
}

#[test]
fn test_stops_at_blank_line() {
    let headers = read_headers(b"Subject: Hi\n\nX-Not-A-Header: in body\n");

    assert_eq!(headers.len(), 1);
    assert!(headers.get("x-not-a-header").is_none());
    assert_eq!(headers.bytes_read, b"Subject: Hi\n\n".len());
}

#[test]
fn test_folding_collapses_to_single_space() {
    let headers = read_headers(b"Subject: one   \r\n \t  two\r\n\tthree\r\n\r\n");

    assert_eq!(headers.get("Subject").unwrap().value_str(), Some("one two three"));
}

#[test]
fn test_folded_empty_value() {
    let headers = read_headers(b"To:\r\n a@x.com\r\n\r\n");

    assert_eq!(headers.get("to").unwrap().value_str(), Some("a@x.com"));
}

#[test]
fn test_empty_value_kept() {
    let headers = read_headers(b"Subject:\r\nFrom: a@x.com\r\n\r\n");

    assert_eq!(headers.len(), 2);
    assert!(headers.get("subject").unwrap().value.is_empty());
}

#[test]
fn test_duplicates_all_exposed() {
    let headers = read_headers(b"Received: one\r\nReceived: two\r\nreceived: three\r\n\r\n");

    let values: Vec<&str> = headers
        .get_all("Received")
        .filter_map(HeaderField::value_str)
        .collect();
    assert_eq!(values, vec!["one", "two", "three"]);
    assert_eq!(headers.get("received").unwrap().value_str(), Some("one"));
}

#[test]
fn test_non_ascii_bytes_pass_through() {
    let headers = read_headers(b"Subject: caf\xe9\r\n\r\n");

    let subject = headers.get("subject").unwrap();
    assert_eq!(subject.value, b"caf\xe9");
    assert!(subject.value_str().is_none());
}

#[test]
fn test_truncated_without_terminator() {
    let headers = read_headers(b"From: a@x.com\r\nSubject: cut here");

    assert_eq!(headers.len(), 2);
    assert!(!headers.boundary_reached);
    assert!(headers.is_constructed());
}

#[test]
fn test_empty_input_not_constructed() {
    let headers = read_headers(b"");

    assert!(headers.is_empty());
    assert!(!headers.is_constructed());
}

#[test]
fn test_boundary_only_is_constructed() {
    let headers = read_headers(b"\r\n");

    assert!(headers.is_empty());
    assert!(headers.is_constructed());
}

#[test]
fn test_malformed_line_and_its_continuation_skipped() {
    let headers = read_headers(b"From: a@x.com\r\nthis is junk\r\n continued junk\r\nTo: b@y.com\r\n\r\n");

    assert_eq!(names(&headers), vec!["From", "To"]);
    assert_eq!(headers.get("from").unwrap().value_str(), Some("a@x.com"));
}

#[test]
fn test_mbox_envelope_line_skipped() {
    let headers = read_headers(b"From sender@x.com Mon Jan  1 10:00:00 2020\nFrom: a@x.com\n\n");

    assert_eq!(names(&headers), vec!["From"]);
    assert_eq!(headers.get("from").unwrap().value_str(), Some("a@x.com"));
}

#[test]
fn test_space_before_colon_tolerated() {
    let headers = read_headers(b"Subject : spaced\r\n\r\n");

    assert_eq!(headers.get("subject").unwrap().value_str(), Some("spaced"));
}

#[test]
fn test_byte_order_mark_stripped() {
    let headers = read_headers(b"\xEF\xBB\xBFSubject: bom\r\n\r\n");

    assert_eq!(headers.get("subject").unwrap().value_str(), Some("bom"));
}

#[test]
fn test_stream_reader_matches_slice_reader() {
    let raw = b"From: a@x.com\r\nTo: b@y.com,\r\n c@z.com\r\n\r\nbody\r\n";

    let streamed = read_headers_from(Cursor::new(&raw[..]), DEFAULT_MAX_HEADER_BYTES).unwrap();

    assert_eq!(streamed, read_headers(raw));
}

#[test]
fn test_stream_reader_does_not_consume_body() {
    let raw = b"Subject: Hi\r\n\r\nbody bytes";
    let mut cursor = Cursor::new(&raw[..]);

    let headers = read_headers_from(&mut cursor, DEFAULT_MAX_HEADER_BYTES).unwrap();

    assert_eq!(headers.len(), 1);
    assert_eq!(cursor.position(), 15);
}

#[test]
fn test_stream_reader_budget() {
    let raw = b"Subject: Hi\r\nX-Long: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n\r\n";

    let headers = read_headers_from(Cursor::new(&raw[..]), 20).unwrap();

    assert!(headers.truncated);
    assert_eq!(names(&headers), vec!["Subject"]);
    assert!(headers.bytes_read <= 20);
}
