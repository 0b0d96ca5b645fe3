//! Core RDF model types.
//!
//! A [`Term`] is an IRI, a blank node, or a literal; a [`Triple`] is an
//! ordered (subject, predicate, object) statement over terms. All string
//! payloads are reference-counted, so cloning a term or a triple never
//! copies text.

use std::fmt;
use std::sync::Arc;

use crate::error::GraphError;
use crate::vocab::{rdf, xsd};

/// An absolute IRI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Iri(Arc<str>);

impl Iri {
    /// Creates an IRI from its absolute string form.
    pub fn new(iri: impl AsRef<str>) -> Self {
        Self(Arc::from(iri.as_ref()))
    }

    /// Returns the IRI string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// A blank node label, without the `_:` prefix.
///
/// Labels are only meaningful inside the graph that produced them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlankId(Arc<str>);

impl BlankId {
    /// Creates a blank node identifier from a label.
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// Returns the label (without `_:`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// A literal: lexical form plus either a language tag or a datatype.
///
/// Constructors normalise the representation so that equal literals compare
/// equal: language tags are lower-cased, `xsd:string` is the implicit
/// datatype of a plain literal and is never stored, and a language-tagged
/// literal never carries a datatype.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    lexical: Arc<str>,
    language: Option<Arc<str>>,
    datatype: Option<Iri>,
}

impl Literal {
    /// A plain (`xsd:string`) literal.
    pub fn simple(lexical: impl AsRef<str>) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            language: None,
            datatype: None,
        }
    }

    /// A language-tagged string.
    pub fn lang(lexical: impl AsRef<str>, language: impl AsRef<str>) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            language: Some(Arc::from(language.as_ref().to_ascii_lowercase().as_str())),
            datatype: None,
        }
    }

    /// A typed literal. `xsd:string` and `rdf:langString` collapse to a plain literal.
    pub fn typed(lexical: impl AsRef<str>, datatype: Iri) -> Self {
        let datatype = match datatype.as_str() {
            xsd::STRING | rdf::LANG_STRING => None,
            _ => Some(datatype),
        };
        Self {
            lexical: Arc::from(lexical.as_ref()),
            language: None,
            datatype,
        }
    }

    /// The lexical form.
    #[must_use]
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    /// The normalised (lower-case) language tag, if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The explicit datatype, if any. Plain literals return `None`.
    #[must_use]
    pub fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }
}

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// A named resource.
    Iri(Iri),
    /// A graph-local anonymous resource.
    Blank(BlankId),
    /// A literal value.
    Literal(Literal),
}

impl Term {
    /// Shorthand for `Term::Iri(Iri::new(iri))`.
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Iri::new(iri))
    }

    /// Shorthand for `Term::Blank(BlankId::new(label))`.
    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::Blank(BlankId::new(label))
    }

    /// Shorthand for a plain string literal.
    pub fn string(lexical: impl AsRef<str>) -> Self {
        Term::Literal(Literal::simple(lexical))
    }

    /// True for IRIs and blank nodes, the terms allowed in subject position.
    #[must_use]
    pub fn is_resource(&self) -> bool {
        matches!(self, Term::Iri(_) | Term::Blank(_))
    }

    /// True for blank nodes.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    /// True for IRIs.
    #[must_use]
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    /// The blank node label, if this is a blank node.
    #[must_use]
    pub fn as_blank(&self) -> Option<&BlankId> {
        match self {
            Term::Blank(b) => Some(b),
            _ => None,
        }
    }

    /// The IRI, if this is an IRI.
    #[must_use]
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(i) => Some(i),
            _ => None,
        }
    }

    /// True if this term is the IRI `iri`.
    #[must_use]
    pub fn is(&self, iri: &str) -> bool {
        matches!(self, Term::Iri(i) if i.as_str() == iri)
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<BlankId> for Term {
    fn from(id: BlankId) -> Self {
        Term::Blank(id)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

/// An RDF statement.
///
/// Invariant: the subject is an IRI or blank node and the predicate is an
/// IRI. [`Triple::try_new`] checks it; [`Triple::new`] is for callers that
/// already hold terms of the right kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    /// Subject.
    pub s: Term,
    /// Predicate.
    pub p: Term,
    /// Object.
    pub o: Term,
}

impl Triple {
    /// Builds a triple without validating term positions.
    #[must_use]
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        debug_assert!(s.is_resource() && p.is_iri());
        Self { s, p, o }
    }

    /// Builds a triple, rejecting literal subjects and non-IRI predicates.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidTriple`] when a term is in a position it
    /// may not occupy.
    pub fn try_new(s: Term, p: Term, o: Term) -> Result<Self, GraphError> {
        if !s.is_resource() {
            return Err(GraphError::InvalidTriple(format!(
                "subject must be an IRI or blank node: {s:?}"
            )));
        }
        if !p.is_iri() {
            return Err(GraphError::InvalidTriple(format!(
                "predicate must be an IRI: {p:?}"
            )));
        }
        Ok(Self { s, p, o })
    }

    /// The same statement with subject and object exchanged, when the object
    /// may stand in subject position.
    #[must_use]
    pub fn flipped(&self) -> Option<Triple> {
        self.o
            .is_resource()
            .then(|| Triple::new(self.o.clone(), self.p.clone(), self.s.clone()))
    }

    /// True if subject or object is a blank node.
    #[must_use]
    pub fn has_blank(&self) -> bool {
        self.s.is_blank() || self.o.is_blank()
    }
}
