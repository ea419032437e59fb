//! Core types for extracted message metadata

use crate::graph::MessageGraph;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Addressing and threading metadata of one message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message-ID without angle brackets
    pub message_id: Option<String>,

    /// Decoded subject line
    pub subject: Option<String>,

    /// Send date, normalized to UTC
    pub sent_date: Option<DateTime<Utc>>,

    /// In-Reply-To message IDs, in header order, duplicates kept
    pub in_reply_to: Vec<String>,

    /// References message IDs, in header order, duplicates kept
    pub references: Vec<String>,

    /// Sender, only when the From header holds exactly one mailbox
    pub from: Option<ContactRef>,

    /// Primary recipients
    pub to: Vec<ContactRef>,

    /// CC recipients
    pub cc: Vec<ContactRef>,

    /// BCC recipients
    pub bcc: Vec<ContactRef>,

    /// Reply-To, only when the header holds exactly one mailbox
    pub reply_to: Option<ContactRef>,
}

impl MessageRecord {
    /// Every contact with its role, in From, To, Cc, Bcc, Reply-To order
    pub fn contacts(&self) -> impl Iterator<Item = (Role, &ContactRef)> {
        let from = self.from.iter().map(|c| (Role::From, c));
        let to = self.to.iter().map(|c| (Role::To, c));
        let cc = self.cc.iter().map(|c| (Role::Cc, c));
        let bcc = self.bcc.iter().map(|c| (Role::Bcc, c));
        let reply_to = self.reply_to.iter().map(|c| (Role::ReplyTo, c));
        from.chain(to).chain(cc).chain(bcc).chain(reply_to)
    }

    /// Distinct email addresses in order of first appearance
    #[must_use]
    pub fn email_addresses(&self) -> Vec<&EmailAddress> {
        let mut seen = HashSet::new();
        self.contacts()
            .filter_map(|(_, contact)| contact.email_address.as_ref())
            .filter(|address| seen.insert(address.as_str()))
            .collect()
    }

    /// Whether the message has no metadata at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.message_id.is_none()
            && self.subject.is_none()
            && self.sent_date.is_none()
            && self.in_reply_to.is_empty()
            && self.references.is_empty()
            && self.contacts().next().is_none()
    }

    /// Build the deduplicated entity graph for this record
    #[must_use]
    pub fn to_graph(&self) -> MessageGraph {
        MessageGraph::from_record(self)
    }
}

/// A contact as named in one address field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRef {
    /// Display name (e.g., "John Doe")
    pub full_name: Option<String>,

    /// Mailbox address
    pub email_address: Option<EmailAddress>,
}

impl ContactRef {
    pub fn new(full_name: Option<String>, email_address: EmailAddress) -> Self {
        Self {
            full_name,
            email_address: Some(email_address),
        }
    }

    /// The address string, if any
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.email_address.as_ref().map(EmailAddress::as_str)
    }
}

impl fmt::Display for ContactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.full_name, &self.email_address) {
            (Some(name), Some(address)) => write!(f, "{name} <{address}>"),
            (None, Some(address)) => write!(f, "{address}"),
            (Some(name), None) => write!(f, "{name}"),
            (None, None) => Ok(()),
        }
    }
}

/// Email address, identified by its exact string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the last `@`, or the whole address when there is none
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.rsplit_once('@').map_or(&self.0, |(local, _)| local)
    }

    /// Part after the last `@`
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.0.rsplit_once('@').map(|(_, domain)| domain)
    }

    /// `mailto:` IRI naming this address
    #[must_use]
    pub fn uri(&self) -> String {
        match self.0.rsplit_once('@') {
            Some((local, domain)) => format!(
                "mailto:{}@{}",
                urlencoding::encode(local),
                urlencoding::encode(domain)
            ),
            None => format!("mailto:{}", urlencoding::encode(&self.0)),
        }
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EmailAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// The field a contact was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    From,
    To,
    Cc,
    Bcc,
    ReplyTo,
}

impl Role {
    /// Header the role is read from
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::From => "From",
            Self::To => "To",
            Self::Cc => "Cc",
            Self::Bcc => "Bcc",
            Self::ReplyTo => "Reply-To",
        }
    }

    /// Whether the role takes at most one contact
    #[must_use]
    pub const fn is_single(self) -> bool {
        matches!(self, Self::From | Self::ReplyTo)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::From => "from",
            Self::To => "to",
            Self::Cc => "cc",
            Self::Bcc => "bcc",
            Self::ReplyTo => "replyTo",
        };
        write!(f, "{name}")
    }
}
