//! Serializers for in-memory graphs.
//!
//! - **Turtle** ([`turtle`]): prefixed, subject-grouped output for people and RDF tooling
//! - **N-Triples** ([`ntriples`]): one sorted line per triple, used for line-set comparison

pub mod ntriples;
pub mod turtle;
