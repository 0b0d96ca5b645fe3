//! IRIs of the W3C vocabularies the engine rewrites or serializes.

/// RDF namespace.
pub mod rdf {
    /// Namespace IRI.
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// `rdf:type`
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `rdf:first`
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    /// `rdf:rest`
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    /// `rdf:nil`
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    /// `rdf:List`
    pub const LIST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#List";
    /// `rdf:langString`
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// RDF Schema namespace.
pub mod rdfs {
    /// Namespace IRI.
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    /// `rdfs:label`
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    /// `rdfs:comment`
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
    /// `rdfs:subClassOf`
    pub const SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
}

/// OWL 2 namespace.
pub mod owl {
    /// Namespace IRI.
    pub const NS: &str = "http://www.w3.org/2002/07/owl#";
    /// `owl:Class`
    pub const CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
    /// `owl:Restriction`
    pub const RESTRICTION: &str = "http://www.w3.org/2002/07/owl#Restriction";
    /// `owl:unionOf`
    pub const UNION_OF: &str = "http://www.w3.org/2002/07/owl#unionOf";
    /// `owl:intersectionOf`
    pub const INTERSECTION_OF: &str = "http://www.w3.org/2002/07/owl#intersectionOf";
    /// `owl:oneOf`
    pub const ONE_OF: &str = "http://www.w3.org/2002/07/owl#oneOf";
    /// `owl:members`
    pub const MEMBERS: &str = "http://www.w3.org/2002/07/owl#members";
    /// `owl:disjointUnionOf`
    pub const DISJOINT_UNION_OF: &str = "http://www.w3.org/2002/07/owl#disjointUnionOf";
    /// `owl:propertyChainAxiom`
    pub const PROPERTY_CHAIN_AXIOM: &str = "http://www.w3.org/2002/07/owl#propertyChainAxiom";
    /// `owl:hasKey`
    pub const HAS_KEY: &str = "http://www.w3.org/2002/07/owl#hasKey";
    /// `owl:equivalentClass`
    pub const EQUIVALENT_CLASS: &str = "http://www.w3.org/2002/07/owl#equivalentClass";
    /// `owl:equivalentProperty`
    pub const EQUIVALENT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#equivalentProperty";
    /// `owl:sameAs`
    pub const SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
    /// `owl:disjointWith`
    pub const DISJOINT_WITH: &str = "http://www.w3.org/2002/07/owl#disjointWith";
    /// `owl:onProperty`
    pub const ON_PROPERTY: &str = "http://www.w3.org/2002/07/owl#onProperty";
    /// `owl:someValuesFrom`
    pub const SOME_VALUES_FROM: &str = "http://www.w3.org/2002/07/owl#someValuesFrom";
}

/// XML Schema datatypes.
pub mod xsd {
    /// Namespace IRI.
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    /// `xsd:string`
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    /// `xsd:integer`
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    /// `xsd:boolean`
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
}
