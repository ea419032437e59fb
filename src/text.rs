//! Header text decoding: UTF-8 validation and RFC 2047 encoded words

use tracing::debug;

/// Decode an unstructured header value such as `Subject`.
///
/// Returns `None` when the raw bytes are not valid UTF-8, when an encoded
/// word decodes to invalid text, or when nothing but whitespace is left.
#[must_use]
pub fn decode_unstructured(raw: &[u8], decode_words: bool) -> Option<String> {
    let Ok(text) = std::str::from_utf8(raw) else {
        debug!("Dropping header text that is not valid UTF-8");
        return None;
    };

    let decoded = if decode_words {
        decode_text(text)?
    } else {
        text.to_string()
    };

    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Decode RFC 2047 encoded words (`=?charset?B|Q?...?=`) into UTF-8.
///
/// Text without encoded words comes back unchanged. Words in unknown
/// charsets are left as written. If a charset conversion produces
/// replacement characters the whole text is rejected, so garbage never
/// reaches the record.
#[must_use]
pub fn decode_text(text: &str) -> Option<String> {
    if !text.contains("=?") {
        return Some(text.to_string());
    }

    // mailparse decodes encoded words while reading a header, so wrap the
    // text in a synthetic one
    let line: String = text
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    let header = format!("X: {line}\r\n");

    let value = match mailparse::parse_header(header.as_bytes()) {
        Ok((parsed, _)) => parsed.get_value(),
        Err(e) => {
            debug!(error = %e, "Could not decode encoded words");
            return None;
        }
    };

    if value.contains(char::REPLACEMENT_CHARACTER) && !text.contains(char::REPLACEMENT_CHARACTER) {
        debug!(raw = %text, "Encoded word did not decode to valid text");
        return None;
    }

    Some(value)
}
