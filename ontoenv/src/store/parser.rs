//! RDF parsing on top of the sophia toolkit.
//!
//! Each format's sophia parser feeds a single conversion routine that turns
//! sophia terms into [`Node`]s. Blank node labels are rewritten with a
//! caller-supplied prefix so that two parses never share a blank node.

use std::convert::Infallible;

use sophia_api::source::{StreamError, TripleSource};
use sophia_api::term::{Term, TermKind};
use sophia_api::triple::Triple;

use super::RdfFormat;
use crate::model::{Document, Literal, Node, Statement};

/// Parses `bytes` in `format`, labelling blank nodes `<bnode_prefix><label>`.
///
/// # Errors
///
/// Returns the parser diagnostic if the input is not well-formed.
pub fn parse(bytes: &[u8], format: RdfFormat, bnode_prefix: &str) -> Result<Document, String> {
    match format {
        RdfFormat::Turtle => collect(
            sophia_turtle::parser::turtle::parse_bufread(bytes),
            bnode_prefix,
        ),
        RdfFormat::NTriples => {
            collect(sophia_turtle::parser::nt::parse_bufread(bytes), bnode_prefix)
        }
        RdfFormat::RdfXml => collect(sophia_xml::parser::parse_bufread(bytes), bnode_prefix),
    }
}

fn collect<S: TripleSource>(mut source: S, bnode_prefix: &str) -> Result<Document, String> {
    let mut doc = Document::new();
    let result = source.try_for_each_triple(|t| -> Result<(), Infallible> {
        let subject = node_from(t.s(), bnode_prefix);
        let predicate = t.p().iri().map(|iri| iri.as_str().to_string());
        let object = node_from(t.o(), bnode_prefix);
        if let (Some(subject), Some(predicate), Some(object)) = (subject, predicate, object) {
            doc.insert(Statement {
                subject,
                predicate,
                object,
            });
        }
        Ok(())
    });
    match result {
        Ok(()) => Ok(doc),
        Err(StreamError::SourceError(e)) => Err(e.to_string()),
        Err(StreamError::SinkError(never)) => match never {},
    }
}

/// Converts one sophia term. Quoted triples and variables have no counterpart.
fn node_from<T: Term>(term: T, bnode_prefix: &str) -> Option<Node> {
    match term.kind() {
        TermKind::Iri => term.iri().map(|iri| Node::Iri(iri.as_str().to_string())),
        TermKind::BlankNode => term
            .bnode_id()
            .map(|id| Node::Blank(format!("{bnode_prefix}{}", id.as_str()))),
        TermKind::Literal => {
            let lexical = term.lexical_form()?.to_string();
            let language = term.language_tag().map(|tag| tag.as_str().to_string());
            let datatype = if language.is_some() {
                None
            } else {
                term.datatype().map(|dt| dt.as_str().to_string())
            };
            Some(Node::Literal(Literal {
                lexical,
                datatype,
                language,
            }))
        }
        _ => None,
    }
}
