//! Core document model types.
//!
//! A [`Document`] is the parsed, in-memory form of an ontology file: an
//! ordered set of [`Statement`]s. Merging two documents is set union, so a
//! statement contributed by several imports appears once.

use std::collections::BTreeSet;
use std::fmt;

/// A literal value with its optional datatype and language tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    /// Lexical form, unescaped.
    pub lexical: String,
    /// Full IRI of the datatype, or `None` for a language-tagged string.
    pub datatype: Option<String>,
    /// BCP 47 language tag.
    pub language: Option<String>,
}

/// A term in subject or object position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Node {
    /// An IRI reference.
    Iri(String),
    /// A blank node label, unique within one document.
    Blank(String),
    /// A literal.
    Literal(Literal),
}

impl Node {
    /// Builds an IRI node.
    pub fn iri(iri: impl Into<String>) -> Self {
        Node::Iri(iri.into())
    }

    /// Builds a plain `xsd:string` literal node.
    pub fn string(lexical: impl Into<String>) -> Self {
        Node::Literal(Literal {
            lexical: lexical.into(),
            datatype: Some(iris::XSD_STRING.to_string()),
            language: None,
        })
    }

    /// Returns the IRI if this node is one.
    #[must_use]
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Node::Iri(iri) => Some(iri),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::store::serializer::term(self))
    }
}

/// A single subject-predicate-object statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Statement {
    /// Subject (never a literal in well-formed input).
    pub subject: Node,
    /// Full IRI of the predicate.
    pub predicate: String,
    /// Object.
    pub object: Node,
}

impl Statement {
    /// Builds a statement.
    pub fn new(subject: Node, predicate: impl Into<String>, object: Node) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

/// A parsed ontology document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    statements: BTreeSet<Statement>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a statement. Returns `false` if it was already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        self.statements.insert(statement)
    }

    /// Unions every statement of `other` into this document.
    pub fn merge(&mut self, other: Document) {
        self.statements.extend(other.statements);
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if the document holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Iterates statements in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    /// Returns true if the exact statement is present.
    #[must_use]
    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    /// Iterates the objects of every statement with the given predicate.
    pub fn objects<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.statements
            .iter()
            .filter(move |s| s.predicate == predicate)
            .map(|s| &s.object)
    }

    /// Returns the IRIs named by `owl:imports` statements, deduplicated.
    #[must_use]
    pub fn imports(&self) -> Vec<String> {
        let unique: BTreeSet<&str> = self
            .objects(iris::OWL_IMPORTS)
            .filter_map(Node::as_iri)
            .collect();
        unique.into_iter().map(str::to_string).collect()
    }

    /// Returns every IRI subject declared `a owl:Ontology`, deduplicated.
    #[must_use]
    pub fn ontology_subjects(&self) -> Vec<String> {
        let unique: BTreeSet<&str> = self
            .statements
            .iter()
            .filter(|s| {
                s.predicate == iris::RDF_TYPE && s.object.as_iri() == Some(iris::OWL_ONTOLOGY)
            })
            .filter_map(|s| s.subject.as_iri())
            .collect();
        unique.into_iter().map(str::to_string).collect()
    }

    /// Removes every statement with the given predicate and returns how many went.
    pub fn remove_predicate(&mut self, predicate: &str) -> usize {
        let before = self.statements.len();
        self.statements.retain(|s| s.predicate != predicate);
        before - self.statements.len()
    }

    /// Rewrites statements with `predicate` through `f`, re-inserting the result.
    ///
    /// Statements for which `f` returns `None` are left untouched.
    pub fn rewrite<F>(&mut self, predicate: &str, mut f: F) -> usize
    where
        F: FnMut(&Statement) -> Option<Statement>,
    {
        let rewritten: Vec<(Statement, Statement)> = self
            .statements
            .iter()
            .filter(|s| s.predicate == predicate)
            .filter_map(|s| f(s).map(|new| (s.clone(), new)))
            .collect();
        let count = rewritten.len();
        for (old, new) in rewritten {
            self.statements.remove(&old);
            self.statements.insert(new);
        }
        count
    }
}

impl FromIterator<Statement> for Document {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = Statement;
    type IntoIter = std::collections::btree_set::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

/// Standard IRI constants used by the resolver and flattener.
pub mod iris {
    /// OWL namespace.
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
    /// RDF namespace.
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// XSD namespace.
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    /// SHACL namespace.
    pub const SH: &str = "http://www.w3.org/ns/shacl#";

    /// `rdf:type`.
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `owl:Ontology`.
    pub const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
    /// `owl:imports`.
    pub const OWL_IMPORTS: &str = "http://www.w3.org/2002/07/owl#imports";
    /// `sh:prefixes`: points a shape or ontology at its prefix declaration block.
    pub const SH_PREFIXES: &str = "http://www.w3.org/ns/shacl#prefixes";
    /// `sh:declare`: attaches one prefix declaration to its block.
    pub const SH_DECLARE: &str = "http://www.w3.org/ns/shacl#declare";
    /// `xsd:string`.
    pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}
