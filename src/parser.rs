//! Message metadata extraction

use crate::address::{decode_address_list_with, decode_single_address_with};
use crate::config::ExtractorConfig;
use crate::date::normalize_date_with_pivot;
use crate::error::{ParseError, Result};
use crate::headers::{RawHeaders, read_headers_from};
use crate::references::{decode_message_id, decode_references};
use crate::source::{FileSource, MessageSource};
use crate::text::decode_unstructured;
use crate::types::{ContactRef, MessageRecord, Role};
use chrono::{DateTime, Utc};
use std::io::{BufReader, Read};
use tracing::debug;

/// MIME types this extractor understands
pub const SUPPORTED_MIME_TYPES: &[&str] = &["message/rfc822"];

const MEMORY_LOCATION: &str = "<memory>";

/// Extract metadata from raw message bytes with the default configuration
pub fn extract_message(raw: &[u8]) -> Result<MessageRecord> {
    Extractor::default().extract_bytes(raw)
}

/// Extract metadata from a stream with the default configuration
pub fn extract_from_reader<R: Read>(reader: R) -> Result<MessageRecord> {
    Extractor::default().extract_reader(reader)
}

/// Extract metadata from a `file://` URI or path with the default configuration
pub fn extract_from_uri(location: &str) -> Result<MessageRecord> {
    Extractor::default().extract_location(&FileSource, location)
}

/// Stateless extractor holding only its configuration.
///
/// One value can serve any number of extractions, from any number of
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn extract_bytes(&self, raw: &[u8]) -> Result<MessageRecord> {
        self.read_and_assemble(raw, MEMORY_LOCATION)
    }

    pub fn extract_reader<R: Read>(&self, reader: R) -> Result<MessageRecord> {
        self.read_and_assemble(reader, MEMORY_LOCATION)
    }

    /// Open `location` through `source`, read its headers and assemble the
    /// record. The stream is dropped before this returns.
    pub fn extract_location<S: MessageSource>(
        &self,
        source: &S,
        location: &str,
    ) -> Result<MessageRecord> {
        let reader = source.open(location)?;
        self.read_and_assemble(reader, location)
    }

    fn read_and_assemble<R: Read>(&self, reader: R, location: &str) -> Result<MessageRecord> {
        let headers = read_headers_from(BufReader::new(reader), self.config.max_header_bytes)
            .map_err(|e| ParseError::source_unavailable(location, e))?;

        let record = self.assemble(&headers)?;

        debug!(
            location,
            headers = headers.len(),
            message_id = record.message_id.as_deref().unwrap_or("-"),
            "Extracted message metadata"
        );

        Ok(record)
    }

    /// Build a record from an already-read header block.
    ///
    /// Fails only when the block shows no message structure at all.
    pub fn assemble(&self, headers: &RawHeaders) -> Result<MessageRecord> {
        if !headers.is_constructed() {
            return Err(ParseError::NotAMessage(
                "no header fields and no end of header block".into(),
            ));
        }

        let words = self.config.decode_encoded_words;

        Ok(MessageRecord {
            message_id: extract_message_id(headers),
            subject: extract_subject(headers, words),
            sent_date: extract_date(headers, self.config.two_digit_year_pivot),
            in_reply_to: extract_references(headers, "in-reply-to"),
            references: extract_references(headers, "references"),
            from: extract_single(headers, Role::From, words),
            to: extract_list(headers, Role::To, words),
            cc: extract_list(headers, Role::Cc, words),
            bcc: extract_list(headers, Role::Bcc, words),
            reply_to: extract_single(headers, Role::ReplyTo, words),
        })
    }
}

fn extract_single(headers: &RawHeaders, role: Role, decode_words: bool) -> Option<ContactRef> {
    let header = headers.get(role.header())?;
    let contact = decode_single_address_with(&header.value, decode_words);
    if contact.is_none() {
        debug!(header = role.header(), value = %header.value_lossy(), "Dropping address field");
    }
    contact
}

fn extract_list(headers: &RawHeaders, role: Role, decode_words: bool) -> Vec<ContactRef> {
    headers
        .get(role.header())
        .map(|h| decode_address_list_with(&h.value, decode_words))
        .unwrap_or_default()
}

fn extract_references(headers: &RawHeaders, name: &str) -> Vec<String> {
    headers
        .get(name)
        .map(|h| decode_references(&h.value))
        .unwrap_or_default()
}

fn extract_message_id(headers: &RawHeaders) -> Option<String> {
    let header = headers.get("message-id")?;
    let id = decode_message_id(&header.value);
    if id.is_none() {
        debug!(value = %header.value_lossy(), "Dropping Message-ID");
    }
    id
}

fn extract_subject(headers: &RawHeaders, decode_words: bool) -> Option<String> {
    headers
        .get("subject")
        .and_then(|h| decode_unstructured(&h.value, decode_words))
}

fn extract_date(headers: &RawHeaders, pivot: u16) -> Option<DateTime<Utc>> {
    let header = headers.get("date")?;
    let Some(value) = header.value_str() else {
        debug!("Dropping Date that is not valid UTF-8");
        return None;
    };
    normalize_date_with_pivot(value, pivot)
}
