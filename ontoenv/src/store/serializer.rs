//! Turtle 1.1 and N-Triples serializers for [`Document`]s.
//!
//! Turtle output groups statements by subject and abbreviates IRIs in the
//! well-known namespaces; N-Triples output is one absolute triple per line.

use crate::model::{iris, Document, Node};

const PREFIXES: &[(&str, &str)] = &[
    ("owl", iris::OWL),
    ("rdf", iris::RDF),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", iris::XSD),
    ("sh", iris::SH),
];

/// Serializes a document to a Turtle string.
#[must_use]
pub fn to_turtle(doc: &Document) -> String {
    let mut out = String::with_capacity(64 * doc.len() + 256);

    for (prefix, ns) in PREFIXES {
        out.push_str(&format!("@prefix {prefix}: <{ns}> .\n"));
    }
    out.push('\n');

    let mut current: Option<&Node> = None;
    for statement in doc.iter() {
        if current == Some(&statement.subject) {
            out.push_str(" ;\n");
        } else {
            if current.is_some() {
                out.push_str(" .\n\n");
            }
            out.push_str(&turtle_term(&statement.subject));
            out.push('\n');
            current = Some(&statement.subject);
        }
        let predicate = if statement.predicate == iris::RDF_TYPE {
            "a".to_string()
        } else {
            turtle_iri(&statement.predicate)
        };
        out.push_str(&format!("  {} {}", predicate, turtle_term(&statement.object)));
    }
    if current.is_some() {
        out.push_str(" .\n");
    }

    out
}

/// Serializes a document to an N-Triples string.
#[must_use]
pub fn to_ntriples(doc: &Document) -> String {
    let mut out = String::with_capacity(96 * doc.len());
    for statement in doc.iter() {
        out.push_str(&format!(
            "{} <{}> {} .\n",
            term(&statement.subject),
            escape_iri(&statement.predicate),
            term(&statement.object)
        ));
    }
    out
}

/// N-Triples form of a single node.
pub(crate) fn term(node: &Node) -> String {
    match node {
        Node::Iri(iri) => format!("<{}>", escape_iri(iri)),
        Node::Blank(id) => format!("_:{id}"),
        Node::Literal(lit) => {
            let quoted = format!("\"{}\"", escape_string(&lit.lexical));
            match (&lit.language, &lit.datatype) {
                (Some(lang), _) => format!("{quoted}@{lang}"),
                (None, Some(dt)) if dt != iris::XSD_STRING => {
                    format!("{quoted}^^<{}>", escape_iri(dt))
                }
                _ => quoted,
            }
        }
    }
}

fn turtle_term(node: &Node) -> String {
    match node {
        Node::Iri(iri) => turtle_iri(iri),
        Node::Literal(lit) => match (&lit.language, &lit.datatype) {
            (None, Some(dt)) if dt != iris::XSD_STRING => {
                format!("\"{}\"^^{}", escape_string(&lit.lexical), turtle_iri(dt))
            }
            _ => term(node),
        },
        Node::Blank(_) => term(node),
    }
}

/// Abbreviates an IRI to `prefix:local` when the local part is a plain name.
fn turtle_iri(iri: &str) -> String {
    for (prefix, ns) in PREFIXES {
        if let Some(local) = iri.strip_prefix(ns) {
            let plain = local
                .chars()
                .next()
                .map(|c| c.is_ascii_alphabetic())
                .unwrap_or(false)
                && local
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if plain {
                return format!("{prefix}:{local}");
            }
        }
    }
    format!("<{}>", escape_iri(iri))
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_iri(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len());
    for c in iri.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | '\u{0}'..='\u{20}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            _ => out.push(c),
        }
    }
    out
}
