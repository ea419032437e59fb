//! Header block reader
//!
//! Turns a byte stream into `(name, value)` pairs in header order. Folded
//! lines are joined and the folding whitespace collapses to a single space.
//! Reading stops at the first empty line, so the body is never consumed.
//! Values stay as raw bytes: UTF-8 validation belongs to the decoders.

use std::borrow::Cow;
use std::io::{BufRead, Read};
use tracing::{trace, warn};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// One unfolded header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    /// Header name as written in the message
    pub name: String,

    /// Unfolded value bytes, leading whitespace removed
    pub value: Vec<u8>,
}

impl HeaderField {
    /// Case-insensitive name comparison
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// The value if it is valid UTF-8
    #[must_use]
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }

    /// The value with invalid sequences replaced, for logging
    #[must_use]
    pub fn value_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }
}

/// The header block of one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHeaders {
    /// Every header in order of appearance, duplicates included
    pub fields: Vec<HeaderField>,

    /// An empty line terminated the block
    pub boundary_reached: bool,

    /// Reading stopped early (read error or byte budget)
    pub truncated: bool,

    /// Bytes consumed from the input, boundary line included
    pub bytes_read: usize,
}

impl RawHeaders {
    /// First occurrence of a header, by case-insensitive name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HeaderField> {
        self.fields.iter().find(|h| h.is(name))
    }

    /// All occurrences of a header, in order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a HeaderField> + 'a {
        self.fields.iter().filter(move |h| h.is(name))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeaderField> {
        self.fields.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether anything resembling a message was found: at least one header,
    /// or an empty line marking the end of an (empty) header block.
    #[must_use]
    pub const fn is_constructed(&self) -> bool {
        !self.fields.is_empty() || self.boundary_reached
    }
}

impl<'a> IntoIterator for &'a RawHeaders {
    type Item = &'a HeaderField;
    type IntoIter = std::slice::Iter<'a, HeaderField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Read the header block of an in-memory message
#[must_use]
pub fn read_headers(raw: &[u8]) -> RawHeaders {
    let mut block = HeaderBlock::default();
    for line in raw.split_inclusive(|&b| b == b'\n') {
        block.headers.bytes_read += line.len();
        if block.push_line(line) == Line::Boundary {
            break;
        }
    }
    block.finish()
}

/// Read the header block from a stream, consuming at most `max_bytes`.
///
/// A read error before any byte arrived is returned as is. Later errors,
/// and running out of budget, end the block early with `truncated` set.
pub fn read_headers_from<R: BufRead>(mut reader: R, max_bytes: usize) -> std::io::Result<RawHeaders> {
    let mut block = HeaderBlock::default();
    let mut line = Vec::new();

    loop {
        let remaining = max_bytes.saturating_sub(block.headers.bytes_read);
        if remaining == 0 {
            warn!(max_bytes, "Header block exceeds read budget, truncating");
            block.headers.truncated = true;
            break;
        }

        line.clear();
        let limit = u64::try_from(remaining).unwrap_or(u64::MAX);
        let read = match (&mut reader).take(limit).read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if block.headers.bytes_read == 0 => return Err(e),
            Err(e) => {
                warn!(error = %e, "Read failed inside header block, keeping what was read");
                block.headers.truncated = true;
                break;
            }
        };
        block.headers.bytes_read += read;

        if read == remaining && !line.ends_with(b"\n") {
            warn!(max_bytes, "Header line cut by read budget, truncating");
            block.headers.truncated = true;
            break;
        }

        if block.push_line(&line) == Line::Boundary {
            break;
        }
    }

    Ok(block.finish())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Header,
    Boundary,
}

/// Line-at-a-time accumulator shared by the slice and stream readers
#[derive(Default)]
struct HeaderBlock {
    headers: RawHeaders,
    lines_seen: usize,
    /// Continuation lines attach to the last header only if the line
    /// before them was accepted
    can_fold: bool,
}

impl HeaderBlock {
    fn push_line(&mut self, line: &[u8]) -> Line {
        let mut line = line.strip_suffix(b"\n").unwrap_or(line);
        line = line.strip_suffix(b"\r").unwrap_or(line);
        if self.lines_seen == 0 {
            line = line.strip_prefix(UTF8_BOM).unwrap_or(line);
        }
        self.lines_seen += 1;

        if line.is_empty() {
            self.headers.boundary_reached = true;
            return Line::Boundary;
        }

        if is_wsp(line[0]) {
            self.unfold(line);
            return Line::Header;
        }

        match split_field(line) {
            Some((name, value)) => {
                self.headers.fields.push(HeaderField {
                    name: name.to_string(),
                    value: value.to_vec(),
                });
                self.can_fold = true;
            }
            None if self.headers.fields.is_empty() && line.starts_with(b"From ") => {
                trace!("Skipping mbox envelope line");
                self.can_fold = false;
            }
            None => {
                trace!(line = %String::from_utf8_lossy(line), "Skipping malformed header line");
                self.can_fold = false;
            }
        }
        Line::Header
    }

    fn unfold(&mut self, line: &[u8]) {
        let rest = trim_start(line);
        if !self.can_fold {
            trace!("Skipping continuation line with nothing to continue");
            return;
        }
        if rest.is_empty() {
            return;
        }
        if let Some(last) = self.headers.fields.last_mut() {
            let end = trim_end(&last.value).len();
            last.value.truncate(end);
            if !last.value.is_empty() {
                last.value.push(b' ');
            }
            last.value.extend_from_slice(rest);
        }
    }

    fn finish(self) -> RawHeaders {
        self.headers
    }
}

/// Split `Name: value`. Names are printable ASCII without colons; obsolete
/// whitespace between the name and the colon is tolerated.
fn split_field(line: &[u8]) -> Option<(&str, &[u8])> {
    let colon = line.iter().position(|&b| b == b':')?;
    let name = trim_end(&line[..colon]);
    if name.is_empty() || !name.iter().all(|&b| (33..=126).contains(&b)) {
        return None;
    }
    let name = std::str::from_utf8(name).ok()?;
    Some((name, trim_start(&line[colon + 1..])))
}

const fn is_wsp(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn trim_start(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_wsp(b)).unwrap_or(bytes.len());
    &bytes[start..]
}

fn trim_end(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| !is_wsp(b)).map_or(0, |i| i + 1);
    &bytes[..end]
}
