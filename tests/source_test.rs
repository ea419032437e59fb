use email_metadata::*;
use std::io::Write;
use std::path::PathBuf;

const MESSAGE: &[u8] = b"From: A <a@x.com>\r\nSubject: On disk\r\n\r\nbody\r\n";

fn message_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MESSAGE).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_extract_from_plain_path() {
    let file = message_file();
    let location = file.path().to_str().unwrap();

    let record = extract_from_uri(location).unwrap();

    assert_eq!(record.subject.as_deref(), Some("On disk"));
    assert_eq!(record.from.unwrap().address(), Some("a@x.com"));
}

#[test]
fn test_extract_from_file_uri() {
    let file = message_file();
    let uri = format!("file://{}", file.path().to_str().unwrap());

    let record = extract_from_uri(&uri).unwrap();

    assert_eq!(record.subject.as_deref(), Some("On disk"));
}

#[test]
fn test_file_uri_percent_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my message.eml");
    std::fs::write(&path, MESSAGE).unwrap();
    let uri = format!("file://{}/my%20message.eml", dir.path().to_str().unwrap());

    let record = extract_from_uri(&uri).unwrap();

    assert_eq!(record.subject.as_deref(), Some("On disk"));
}

#[test]
fn test_missing_file_is_source_unavailable() {
    let err = extract_from_uri("/definitely/not/here.eml").unwrap_err();
    assert!(matches!(err, ParseError::SourceUnavailable { .. }));
}

#[test]
fn test_empty_file_is_not_a_message() {
    let file = tempfile::NamedTempFile::new().unwrap();

    let err = extract_from_uri(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, ParseError::NotAMessage(_)));
}

#[test]
fn test_resolve_location() {
    assert_eq!(resolve_location("/tmp/a.eml").unwrap(), PathBuf::from("/tmp/a.eml"));
    assert_eq!(resolve_location("relative/a.eml").unwrap(), PathBuf::from("relative/a.eml"));
    assert_eq!(
        resolve_location("file:///tmp/a%20b.eml").unwrap(),
        PathBuf::from("/tmp/a b.eml")
    );
    assert_eq!(
        resolve_location("file://localhost/tmp/a.eml").unwrap(),
        PathBuf::from("/tmp/a.eml")
    );
}

#[test]
fn test_unsupported_locations() {
    for location in ["", "http://example.com/a.eml", "imap://host/INBOX/1", "file://remote/a.eml"] {
        assert!(
            matches!(resolve_location(location), Err(ParseError::InvalidLocation(_))),
            "{location}"
        );
    }
}

struct FixedSource(&'static [u8]);

impl MessageSource for FixedSource {
    type Reader = &'static [u8];

    fn open(&self, _location: &str) -> Result<Self::Reader> {
        Ok(self.0)
    }
}

#[test]
fn test_custom_source() {
    let extractor = Extractor::default();

    let record = extractor
        .extract_location(&FixedSource(MESSAGE), "memory://one")
        .unwrap();

    assert_eq!(record.subject.as_deref(), Some("On disk"));
}
