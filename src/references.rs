//! Message-ID list decoding for `In-Reply-To`, `References` and `Message-ID`

use tracing::trace;

/// Decode a list of message identifiers.
///
/// Identifiers come back without angle brackets or whitespace, in the order
/// they appear, duplicates kept. Comments, quoted strings and plain words
/// (the "Joe's message of ..." phrases some clients write) are skipped; a
/// bare `local@domain` token without brackets is accepted. Broken tokens
/// are skipped one by one.
#[must_use]
pub fn decode_references(raw: impl AsRef<[u8]>) -> Vec<String> {
    let input = raw.as_ref();
    let mut ids = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        match input[pos] {
            b'<' => {
                let start = pos + 1;
                let Some(offset) = input[start..].iter().position(|&b| b == b'>' || b == b'<') else {
                    trace!("Unterminated message id, stopping");
                    break;
                };
                let end = start + offset;
                if input[end] == b'<' {
                    trace!("Skipping message id without closing bracket");
                    pos = end;
                    continue;
                }
                push_id(&mut ids, &input[start..end]);
                pos = end + 1;
            }
            b'(' => pos = skip_comment(input, pos + 1),
            b'"' => pos = skip_quoted(input, pos + 1),
            b if b.is_ascii_whitespace() || b == b',' || b == b'>' => pos += 1,
            _ => {
                let start = pos;
                while pos < input.len() && !ends_word(input[pos]) {
                    pos += 1;
                }
                let word = &input[start..pos];
                if is_bare_id(word) {
                    push_id(&mut ids, word);
                } else {
                    trace!(word = %String::from_utf8_lossy(word), "Skipping non-identifier word");
                }
            }
        }
    }

    ids
}

/// Decode a `Message-ID` value.
///
/// The first identifier is used. A value with no recognizable identifier
/// but otherwise printable text is kept as written, trimmed; empty or
/// non-UTF-8 values are absent.
#[must_use]
pub fn decode_message_id(raw: impl AsRef<[u8]>) -> Option<String> {
    let text = std::str::from_utf8(raw.as_ref()).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    decode_references(text).into_iter().next().or_else(|| {
        let bare = text.trim_start_matches('<').trim_end_matches('>').trim();
        (!bare.is_empty()).then(|| bare.to_string())
    })
}

fn push_id(ids: &mut Vec<String>, bytes: &[u8]) {
    let cleaned: Vec<u8> = bytes.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
    if cleaned.is_empty() {
        return;
    }
    match String::from_utf8(cleaned) {
        Ok(id) => ids.push(id),
        Err(_) => trace!("Skipping message id that is not valid UTF-8"),
    }
}

const fn ends_word(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'<' | b'(' | b'"' | b',')
}

fn is_bare_id(word: &[u8]) -> bool {
    word.iter()
        .position(|&b| b == b'@')
        .is_some_and(|at| at > 0 && at + 1 < word.len())
}

fn skip_comment(input: &[u8], mut pos: usize) -> usize {
    let mut depth = 1usize;
    while pos < input.len() {
        match input[pos] {
            b'\\' => pos += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return pos + 1;
                }
            }
            _ => {}
        }
        pos += 1;
    }
    input.len()
}

fn skip_quoted(input: &[u8], mut pos: usize) -> usize {
    while pos < input.len() {
        match input[pos] {
            b'\\' => pos += 1,
            b'"' => return pos + 1,
            _ => {}
        }
        pos += 1;
    }
    input.len()
}
