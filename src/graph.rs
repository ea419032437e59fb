//! Entity graph built from a [`MessageRecord`]
//!
//! One message node, one contact node per address-field occurrence, one
//! email-address node per distinct address, and one stub message node per
//! `In-Reply-To` identifier. The graph can be walked directly, serialized
//! with serde, or flattened to triples in the Nepomuk message ontology.

use crate::date::format_canonical;
use crate::types::{MessageRecord, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Index of a node in [`MessageGraph::nodes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// A graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Node {
    /// The extracted message itself
    Message {
        message_id: Option<String>,
        subject: Option<String>,
        sent_date: Option<DateTime<Utc>>,
    },
    /// One occurrence of a contact in an address field
    Contact { full_name: Option<String> },
    /// A distinct email address
    EmailAddress { address: String },
    /// A message known only by its identifier
    MessageStub { message_id: String },
}

/// Edge label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    From,
    To,
    Cc,
    Bcc,
    ReplyTo,
    InReplyTo,
    HasEmailAddress,
}

impl Relation {
    /// Ontology predicate for this relation
    #[must_use]
    pub const fn predicate(self) -> &'static str {
        match self {
            Self::From => "nmo:from",
            Self::To => "nmo:to",
            Self::Cc => "nmo:cc",
            Self::Bcc => "nmo:bcc",
            Self::ReplyTo => "nmo:replyTo",
            Self::InReplyTo => "nmo:inReplyTo",
            Self::HasEmailAddress => "nco:hasEmailAddress",
        }
    }
}

impl From<Role> for Relation {
    fn from(role: Role) -> Self {
        match role {
            Role::From => Self::From,
            Role::To => Self::To,
            Role::Cc => Self::Cc,
            Role::Bcc => Self::Bcc,
            Role::ReplyTo => Self::ReplyTo,
        }
    }
}

/// Directed, labelled edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub relation: Relation,
    pub target: NodeId,
}

/// Nodes and edges of one extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl MessageGraph {
    /// The message node is always first
    pub const MESSAGE: NodeId = NodeId(0);

    /// Build the graph, sharing one email-address node per distinct address
    #[must_use]
    pub fn from_record(record: &MessageRecord) -> Self {
        let mut builder = GraphBuilder::new(record);

        for (role, contact) in record.contacts() {
            let contact_id = builder.add(Node::Contact {
                full_name: contact.full_name.clone(),
            });
            builder.link(Self::MESSAGE, role.into(), contact_id);

            if let Some(address) = &contact.email_address {
                let address_id = builder.address(address.as_str());
                builder.link(contact_id, Relation::HasEmailAddress, address_id);
            }
        }

        for message_id in &record.in_reply_to {
            let stub = builder.add(Node::MessageStub {
                message_id: message_id.clone(),
            });
            builder.link(Self::MESSAGE, Relation::InReplyTo, stub);
        }

        builder.finish()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Targets of the edges leaving `source` with the given relation
    #[must_use]
    pub fn targets(&self, source: NodeId, relation: Relation) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter(|e| e.source == source && e.relation == relation)
            .map(|e| e.target)
            .collect()
    }

    /// Email-address nodes with their ids
    pub fn email_addresses(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.nodes.iter().enumerate().filter_map(|(i, node)| match node {
            Node::EmailAddress { address } => Some((NodeId(i), address.as_str())),
            _ => None,
        })
    }

    /// Address node a contact points to
    #[must_use]
    pub fn address_of(&self, contact: NodeId) -> Option<NodeId> {
        self.targets(contact, Relation::HasEmailAddress).first().copied()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Flatten to triples, naming the message with `message_iri`.
    ///
    /// Contacts and reply stubs become blank nodes; email addresses are
    /// named by their `mailto:` IRI.
    #[must_use]
    pub fn to_triples(&self, message_iri: &str) -> Vec<Triple> {
        let mut triples = Vec::new();

        for (index, node) in self.nodes.iter().enumerate() {
            let subject = self.term_for(NodeId(index), message_iri);
            match node {
                Node::Message {
                    message_id,
                    subject: message_subject,
                    sent_date,
                } => {
                    triples.push(Triple::typed(subject.clone(), "nmo:Message"));
                    if let Some(id) = message_id {
                        triples.push(Triple::literal(subject.clone(), "nmo:messageId", id));
                    }
                    if let Some(text) = message_subject {
                        triples.push(Triple::literal(subject.clone(), "nmo:messageSubject", text));
                    }
                    if let Some(date) = sent_date {
                        triples.push(Triple::literal(subject, "nmo:sentDate", &format_canonical(date)));
                    }
                }
                Node::Contact { full_name } => {
                    triples.push(Triple::typed(subject.clone(), "nco:Contact"));
                    if let Some(name) = full_name {
                        triples.push(Triple::literal(subject, "nco:fullname", name));
                    }
                }
                Node::EmailAddress { address } => {
                    triples.push(Triple::typed(subject.clone(), "nco:EmailAddress"));
                    triples.push(Triple::literal(subject, "nco:emailAddress", address));
                }
                Node::MessageStub { message_id } => {
                    triples.push(Triple::typed(subject.clone(), "nmo:Message"));
                    triples.push(Triple::literal(subject, "nmo:messageId", message_id));
                }
            }
        }

        for edge in &self.edges {
            triples.push(Triple {
                subject: self.term_for(edge.source, message_iri),
                predicate: edge.relation.predicate(),
                object: self.term_for(edge.target, message_iri),
            });
        }

        triples
    }

    fn term_for(&self, id: NodeId, message_iri: &str) -> Term {
        match self.node(id) {
            Some(Node::Message { .. }) => Term::Iri(message_iri.to_string()),
            Some(Node::EmailAddress { address }) => {
                Term::Iri(crate::types::EmailAddress::new(address.as_str()).uri())
            }
            Some(Node::MessageStub { .. }) => Term::Blank(format!("m{}", id.0)),
            Some(Node::Contact { .. }) | None => Term::Blank(format!("c{}", id.0)),
        }
    }
}

struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    addresses: HashMap<String, NodeId>,
}

impl GraphBuilder {
    fn new(record: &MessageRecord) -> Self {
        Self {
            nodes: vec![Node::Message {
                message_id: record.message_id.clone(),
                subject: record.subject.clone(),
                sent_date: record.sent_date,
            }],
            edges: Vec::new(),
            addresses: HashMap::new(),
        }
    }

    fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn address(&mut self, address: &str) -> NodeId {
        if let Some(id) = self.addresses.get(address) {
            return *id;
        }
        let id = self.add(Node::EmailAddress {
            address: address.to_string(),
        });
        self.addresses.insert(address.to_string(), id);
        id
    }

    fn link(&mut self, source: NodeId, relation: Relation, target: NodeId) {
        self.edges.push(Edge {
            source,
            relation,
            target,
        });
    }

    fn finish(self) -> MessageGraph {
        MessageGraph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

/// Subject or object of a triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Term {
    /// Absolute IRI
    Iri(String),
    /// Prefixed ontology name such as `nmo:Message`
    Name(&'static str),
    /// Blank node label
    Blank(String),
    /// String literal
    Literal(String),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::Name(name) => write!(f, "{name}"),
            Self::Blank(label) => write!(f, "_:{label}"),
            Self::Literal(text) => {
                f.write_str("\"")?;
                for c in text.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

/// One statement about the message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: &'static str,
    pub object: Term,
}

impl Triple {
    fn typed(subject: Term, class: &'static str) -> Self {
        Self {
            subject,
            predicate: "rdf:type",
            object: Term::Name(class),
        }
    }

    fn literal(subject: Term, predicate: &'static str, value: &str) -> Self {
        Self {
            subject,
            predicate,
            object: Term::Literal(value.to_string()),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
