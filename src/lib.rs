// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

//! Email Metadata Extraction
//!
//! Reads the header block of an RFC 822 message and turns it into a
//! structured record of addressing and threading metadata: sender and
//! recipients, subject, message identifiers, reply chains and a normalized
//! send date.
//!
//! # Features
//!
//! - Lenient header reading: folding, duplicates, 8-bit bytes, truncation
//! - Address lists with quoted and RFC 2047 encoded display names and groups
//! - `In-Reply-To` / `References` decoding that keeps order and duplicates
//! - Date normalization to UTC with two-digit year handling
//! - A deduplicated entity graph (messages, contacts, email addresses)
//!
//! Malformed fields never fail an extraction; they are left out of the
//! record. Only an unreadable source or input with no header structure at
//! all is an error.
//!
//! # Example
//!
//! ```rust
//! use email_metadata::extract_message;
//!
//! let raw = b"From: A <a@x.com>\r\nTo: b@y.com\r\nSubject: Hi\r\n\r\nbody";
//! let record = extract_message(raw).unwrap();
//!
//! println!("From: {:?}", record.from);
//! println!("Addresses: {}", record.to_graph().email_addresses().count());
//! ```

mod address;
mod config;
mod date;
mod error;
mod graph;
mod headers;
mod parser;
mod references;
mod source;
mod text;
mod types;

pub use address::{decode_address_list, decode_single_address};
pub use config::{DEFAULT_MAX_HEADER_BYTES, DEFAULT_YEAR_PIVOT, ExtractorConfig};
pub use date::{format_canonical, normalize_date, normalize_date_with_pivot};
pub use error::{ParseError, Result};
pub use graph::{Edge, MessageGraph, Node, NodeId, Relation, Term, Triple};
pub use headers::{HeaderField, RawHeaders, read_headers, read_headers_from};
pub use parser::{
    Extractor, SUPPORTED_MIME_TYPES, extract_from_reader, extract_from_uri, extract_message,
};
pub use references::{decode_message_id, decode_references};
pub use source::{FileSource, MessageSource, resolve_location};
pub use text::{decode_text, decode_unstructured};
pub use types::*;
