use email_metadata::*;

fn contact_nodes(graph: &MessageGraph, relation: Relation) -> Vec<NodeId> {
    graph.targets(MessageGraph::MESSAGE, relation)
}

fn full_name(graph: &MessageGraph, id: NodeId) -> Option<&str> {
    match graph.node(id) {
        Some(Node::Contact { full_name }) => full_name.as_deref(),
        _ => None,
    }
}

#[test]
fn test_same_address_shares_one_node() {
    let raw = b"From: Me <a@x.com>\r\n\
                To: Alice <a@x.com>\r\n\
                Cc: A. <a@x.com>, b@y.com\r\n\
                \r\n";
    let graph = extract_message(raw).unwrap().to_graph();

    let addresses: Vec<&str> = graph.email_addresses().map(|(_, a)| a).collect();
    assert_eq!(addresses, vec!["a@x.com", "b@y.com"]);

    let to = contact_nodes(&graph, Relation::To);
    let cc = contact_nodes(&graph, Relation::Cc);
    assert_eq!(to.len(), 1);
    assert_eq!(cc.len(), 2);
    assert_ne!(to[0], cc[0]);
    assert_eq!(graph.address_of(to[0]), graph.address_of(cc[0]));
    assert_eq!(full_name(&graph, to[0]), Some("Alice"));
    assert_eq!(full_name(&graph, cc[0]), Some("A."));
}

#[test]
fn test_to_and_cc_same_address() {
    let raw = b"To: a@x.com\r\nCc: a@x.com\r\n\r\n";
    let graph = extract_message(raw).unwrap().to_graph();

    assert_eq!(graph.email_addresses().count(), 1);
    let to = contact_nodes(&graph, Relation::To);
    let cc = contact_nodes(&graph, Relation::Cc);
    assert_eq!(to.len(), 1);
    assert_eq!(cc.len(), 1);
    assert_ne!(to[0], cc[0]);
    assert_eq!(graph.address_of(to[0]), graph.address_of(cc[0]));
}

#[test]
fn test_quoted_local_part_shares_one_node() {
    let raw = b"To: \"a\\\"b\"@x.com\r\nCc: B <\"a\\\"b\"@x.com>\r\n\r\n";
    let graph = extract_message(raw).unwrap().to_graph();

    let addresses: Vec<&str> = graph.email_addresses().map(|(_, a)| a).collect();
    assert_eq!(addresses, vec![r#""a\"b"@x.com"#]);
}

#[test]
fn test_addresses_are_case_sensitive() {
    let raw = b"To: a@x.com, A@x.com\r\n\r\n";
    let graph = extract_message(raw).unwrap().to_graph();

    assert_eq!(graph.email_addresses().count(), 2);
}

#[test]
fn test_message_node_first() {
    let raw = b"Subject: Hi\r\nMessage-ID: <1@x>\r\n\r\n";
    let graph = extract_message(raw).unwrap().to_graph();

    match graph.node(MessageGraph::MESSAGE) {
        Some(Node::Message {
            message_id,
            subject,
            sent_date,
        }) => {
            assert_eq!(message_id.as_deref(), Some("1@x"));
            assert_eq!(subject.as_deref(), Some("Hi"));
            assert!(sent_date.is_none());
        }
        other => panic!("unexpected first node: {other:?}"),
    }
}

#[test]
fn test_in_reply_to_stubs() {
    let raw = b"In-Reply-To: <a@1> <b@2>\r\n\r\n";
    let graph = extract_message(raw).unwrap().to_graph();

    let stubs: Vec<&str> = contact_nodes(&graph, Relation::InReplyTo)
        .into_iter()
        .filter_map(|id| match graph.node(id) {
            Some(Node::MessageStub { message_id }) => Some(message_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(stubs, vec!["a@1", "b@2"]);
}

#[test]
fn test_roles_on_edges() {
    let raw = b"From: f@x.com\r\n\
                To: t@x.com\r\n\
                Cc: c@x.com\r\n\
                Bcc: b@x.com\r\n\
                Reply-To: r@x.com\r\n\
                \r\n";
    let graph = extract_message(raw).unwrap().to_graph();

    for relation in [
        Relation::From,
        Relation::To,
        Relation::Cc,
        Relation::Bcc,
        Relation::ReplyTo,
    ] {
        assert_eq!(contact_nodes(&graph, relation).len(), 1, "{relation:?}");
    }
    assert_eq!(graph.email_addresses().count(), 5);
}

#[test]
fn test_triples() {
    let raw = b"From: A <a@x.com>\r\n\
                Subject: Hi \"there\"\r\n\
                Message-ID: <1@x>\r\n\
                Date: Mon, 1 Jan 2020 10:00:00 +0000\r\n\
                In-Reply-To: <p@x>\r\n\
                \r\n";
    let graph = extract_message(raw).unwrap().to_graph();

    let lines: Vec<String> = graph
        .to_triples("file:///mail/1.eml")
        .iter()
        .map(ToString::to_string)
        .collect();

    let expected = [
        "<file:///mail/1.eml> rdf:type nmo:Message .",
        "<file:///mail/1.eml> nmo:messageId \"1@x\" .",
        "<file:///mail/1.eml> nmo:messageSubject \"Hi \\\"there\\\"\" .",
        "<file:///mail/1.eml> nmo:sentDate \"2020-01-01T10:00:00Z\" .",
        "_:c1 rdf:type nco:Contact .",
        "_:c1 nco:fullname \"A\" .",
        "<mailto:a@x.com> rdf:type nco:EmailAddress .",
        "<mailto:a@x.com> nco:emailAddress \"a@x.com\" .",
        "_:m3 rdf:type nmo:Message .",
        "_:m3 nmo:messageId \"p@x\" .",
        "<file:///mail/1.eml> nmo:from _:c1 .",
        "_:c1 nco:hasEmailAddress <mailto:a@x.com> .",
        "<file:///mail/1.eml> nmo:inReplyTo _:m3 .",
    ];
    assert_eq!(lines, expected);
}

#[test]
fn test_json_rendering() {
    let raw = b"From: A <a@x.com>\r\nMessage-ID: <1@x>\r\n\r\n";
    let graph = extract_message(raw).unwrap().to_graph();

    let json = graph.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["nodes"][0]["type"], "message");
    assert_eq!(value["nodes"][0]["messageId"], "1@x");
    assert_eq!(value["nodes"][1]["type"], "contact");
    assert_eq!(value["nodes"][1]["fullName"], "A");
    assert_eq!(value["nodes"][2]["type"], "emailAddress");
    assert_eq!(value["edges"][0]["relation"], "from");

    let back: MessageGraph = serde_json::from_str(&json).unwrap();
    assert_eq!(back, graph);
}

#[test]
fn test_empty_record_graph() {
    let graph = MessageRecord::default().to_graph();

    assert_eq!(graph.nodes.len(), 1);
    assert!(graph.edges.is_empty());
}
