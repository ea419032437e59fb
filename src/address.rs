//! Address list decoding
//!
//! Handles the forms found in real `From`/`To`/`Cc`/`Bcc`/`Reply-To`
//! values: `Name <addr>`, bare `addr`, `addr (Name)`, quoted and encoded
//! display names, and groups (`team: a@x, b@y;`), which are flattened into
//! their members. The tokenizer works on bytes so that 8-bit junk in one
//! entry only costs that entry.

use crate::text::decode_text;
use crate::types::{ContactRef, EmailAddress};
use tracing::debug;

/// Decode an address field into contacts, in order.
///
/// Entries that do not yield an address are skipped; a value with no usable
/// entry gives an empty list.
#[must_use]
pub fn decode_address_list(raw: impl AsRef<[u8]>) -> Vec<ContactRef> {
    decode_address_list_with(raw.as_ref(), true)
}

/// Decode a single-mailbox field such as `From` or `Reply-To`.
///
/// The field is only used when it decodes to exactly one contact; an
/// ambiguous multi-address value is discarded as a whole.
#[must_use]
pub fn decode_single_address(raw: impl AsRef<[u8]>) -> Option<ContactRef> {
    single(decode_address_list_with(raw.as_ref(), true))
}

pub(crate) fn decode_single_address_with(raw: &[u8], decode_words: bool) -> Option<ContactRef> {
    single(decode_address_list_with(raw, decode_words))
}

fn single(mut contacts: Vec<ContactRef>) -> Option<ContactRef> {
    if contacts.len() > 1 {
        debug!(count = contacts.len(), "Discarding single-address field holding several addresses");
        return None;
    }
    contacts.pop()
}

pub(crate) fn decode_address_list_with(raw: &[u8], decode_words: bool) -> Vec<ContactRef> {
    let mut contacts = Vec::new();
    let mut entry = Entry::default();
    let mut in_group = false;

    for Lexed { token, spaced } in tokenize(raw) {
        match token {
            Token::Atom(bytes) => entry.push_fragment(bytes, bytes, spaced),
            Token::Quoted { text, raw } => {
                let mut spec = Vec::with_capacity(raw.len() + 2);
                spec.push(b'"');
                spec.extend_from_slice(raw);
                spec.push(b'"');
                entry.push_fragment(&text, &spec, spaced);
            }
            Token::Comment(text) => {
                entry.comments.push(text);
                entry.after_comment = true;
            }
            Token::Angle(inner) => {
                if entry.angle.is_none() {
                    entry.angle = Some(inner.to_vec());
                }
                entry.joinable = false;
            }
            Token::Comma => entry.flush_into(&mut contacts, decode_words),
            Token::Colon if !in_group && entry.angle.is_none() => {
                // group display name is not kept
                in_group = true;
                entry = Entry::default();
            }
            Token::Colon => {}
            Token::Semicolon => {
                entry.flush_into(&mut contacts, decode_words);
                in_group = false;
            }
        }
    }
    entry.flush_into(&mut contacts, decode_words);

    contacts
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Atom(&'a [u8]),
    /// Quoted string: unescaped content and the content as written
    Quoted { text: Vec<u8>, raw: &'a [u8] },
    /// Unescaped content of a comment, nested parentheses kept
    Comment(Vec<u8>),
    /// Raw content between `<` and `>`
    Angle(&'a [u8]),
    Comma,
    Colon,
    Semicolon,
}

struct Lexed<'a> {
    token: Token<'a>,
    /// Whitespace came before the token
    spaced: bool,
}

fn tokenize(input: &[u8]) -> Vec<Lexed<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut spaced = false;

    while pos < input.len() {
        let token = match input[pos] {
            b' ' | b'\t' | b'\r' | b'\n' | b'>' => {
                spaced = true;
                pos += 1;
                continue;
            }
            b',' => {
                pos += 1;
                Token::Comma
            }
            b':' => {
                pos += 1;
                Token::Colon
            }
            b';' => {
                pos += 1;
                Token::Semicolon
            }
            b'"' => {
                let start = pos + 1;
                let (text, end, next) = read_quoted(input, start);
                pos = next;
                Token::Quoted {
                    text,
                    raw: &input[start..end],
                }
            }
            b'(' => {
                let (text, next) = read_comment(input, pos + 1);
                pos = next;
                Token::Comment(text)
            }
            b'<' => {
                let start = pos + 1;
                let end = input[start..]
                    .iter()
                    .position(|&b| b == b'>')
                    .map_or(input.len(), |i| start + i);
                pos = (end + 1).min(input.len());
                Token::Angle(&input[start..end])
            }
            _ => {
                let start = pos;
                while pos < input.len() && !is_special(input[pos]) {
                    pos += 1;
                }
                Token::Atom(&input[start..pos])
            }
        };
        tokens.push(Lexed { token, spaced });
        spaced = false;
    }

    tokens
}

const fn is_special(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'\t' | b'\r' | b'\n' | b',' | b':' | b';' | b'"' | b'(' | b'<' | b'>'
    )
}

/// Read a quoted string body starting after the opening quote. Returns the
/// unescaped text, the end of the body and the position after the closing
/// quote. An unterminated string runs to the end of the input.
fn read_quoted(input: &[u8], mut pos: usize) -> (Vec<u8>, usize, usize) {
    let mut text = Vec::new();
    while pos < input.len() {
        match input[pos] {
            b'\\' if pos + 1 < input.len() => {
                text.push(input[pos + 1]);
                pos += 2;
            }
            b'"' => return (text, pos, pos + 1),
            b => {
                text.push(b);
                pos += 1;
            }
        }
    }
    (text, pos, pos)
}

/// Read a comment body starting after the opening parenthesis
fn read_comment(input: &[u8], mut pos: usize) -> (Vec<u8>, usize) {
    let mut text = Vec::new();
    let mut depth = 1usize;
    while pos < input.len() {
        match input[pos] {
            b'\\' if pos + 1 < input.len() => {
                text.push(input[pos + 1]);
                pos += 2;
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return (text, pos + 1);
                }
            }
            _ => {}
        }
        text.push(input[pos]);
        pos += 1;
    }
    (text, pos)
}

/// A word built from adjacent atoms and quoted strings
#[derive(Debug, Default)]
struct Word {
    /// Text as shown in a display name
    display: Vec<u8>,
    /// Text as written in an addr-spec (quoted parts keep their quotes and
    /// quoted-pairs)
    spec: Vec<u8>,
}

/// One comma-separated entry being accumulated
#[derive(Debug, Default)]
struct Entry {
    words: Vec<Word>,
    comments: Vec<Vec<u8>>,
    angle: Option<Vec<u8>>,
    joinable: bool,
    /// The last token was a comment
    after_comment: bool,
}

impl Entry {
    fn push_fragment(&mut self, display: &[u8], spec: &[u8], spaced: bool) {
        match self.words.last_mut() {
            Some(word) if self.joinable && !spaced => {
                // a comment inside a word (`bob(home)@x.com`) is not a name
                if self.after_comment {
                    self.comments.pop();
                }
                word.display.extend_from_slice(display);
                word.spec.extend_from_slice(spec);
            }
            _ => self.words.push(Word {
                display: display.to_vec(),
                spec: spec.to_vec(),
            }),
        }
        self.joinable = true;
        self.after_comment = false;
    }

    fn is_blank(&self) -> bool {
        self.words.is_empty() && self.comments.is_empty() && self.angle.is_none()
    }

    fn flush_into(&mut self, contacts: &mut Vec<ContactRef>, decode_words: bool) {
        let entry = std::mem::take(self);
        if entry.is_blank() {
            return;
        }
        match entry.finish(decode_words) {
            Some(contact) => contacts.push(contact),
            None => debug!("Skipping address entry without a usable address"),
        }
    }

    fn finish(self, decode_words: bool) -> Option<ContactRef> {
        let (address, phrase) = match self.angle {
            Some(inner) => (clean_angle_addr(&inner)?, phrase_text(&self.words)),
            None => match self.words.as_slice() {
                [only] if is_addr_spec(&only.spec) => (String::from_utf8(only.spec.clone()).ok()?, None),
                _ => return None,
            },
        };

        let full_name = phrase
            .or_else(|| self.comments.iter().find_map(|c| non_blank(c)))
            .and_then(|name| display_name(&name, decode_words));

        Some(ContactRef::new(full_name, EmailAddress::new(address)))
    }
}

fn phrase_text(words: &[Word]) -> Option<Vec<u8>> {
    if words.is_empty() {
        return None;
    }
    let joined = words
        .iter()
        .map(|w| w.display.as_slice())
        .collect::<Vec<_>>()
        .join(&b' ');
    non_blank(&joined)
}

fn non_blank(bytes: &[u8]) -> Option<Vec<u8>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(bytes.to_vec())
    }
}

/// Turn display-name bytes into text; invalid UTF-8 drops the name
fn display_name(bytes: &[u8], decode_words: bool) -> Option<String> {
    let Ok(text) = std::str::from_utf8(bytes) else {
        debug!("Dropping display name that is not valid UTF-8");
        return None;
    };
    let decoded = if decode_words {
        decode_text(text)?
    } else {
        text.to_string()
    };
    let name = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() { None } else { Some(name) }
}

/// Clean the content of `<...>`: whitespace and comments outside quotes are
/// dropped and an obsolete source route (`@a,@b:`) is removed. Quoted-pairs
/// are kept as written, matching the bare addr-spec form. Leftover brackets
/// or list separators mean the brackets were never closed.
fn clean_angle_addr(inner: &[u8]) -> Option<String> {
    let mut cleaned = Vec::with_capacity(inner.len());
    let mut quoted = false;
    let mut pos = 0;
    while pos < inner.len() {
        match inner[pos] {
            b'\\' if quoted && pos + 1 < inner.len() => {
                cleaned.extend_from_slice(&inner[pos..pos + 2]);
                pos += 2;
                continue;
            }
            b'"' => {
                quoted = !quoted;
                cleaned.push(b'"');
            }
            b'(' if !quoted => {
                let (_, next) = read_comment(inner, pos + 1);
                pos = next;
                continue;
            }
            b if b.is_ascii_whitespace() && !quoted => {}
            b => cleaned.push(b),
        }
        pos += 1;
    }

    let addr = if cleaned.first() == Some(&b'@') {
        let colon = cleaned.iter().rposition(|&b| b == b':')?;
        &cleaned[colon + 1..]
    } else {
        &cleaned[..]
    };

    if addr.is_empty() || addr.iter().any(|b| matches!(b, b'<' | b',' | b';')) {
        return None;
    }
    std::str::from_utf8(addr).ok().map(str::to_string)
}

fn is_addr_spec(spec: &[u8]) -> bool {
    spec.iter()
        .rposition(|&b| b == b'@')
        .is_some_and(|at| at > 0 && at + 1 < spec.len())
}
