//! # Result Rows
//!
//! The tabular payload returned by the graph-query endpoint
//! (SPARQL 1.1 Query Results JSON) and its reduction to `RawRow`s.
//!
//! JSON decoding itself happens in the transport layer. The document type is
//! shape-strict at the top level (a document without `results.bindings`
//! fails to decode) and reduction is lenient per row: a row missing
//! the subject binding is still produced here and dropped later by the
//! deduplicator.

use crate::primitives::{VAR_DESCRIPTION, VAR_PERSON, VAR_PERSON_LABEL};
use crate::registry::Relation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// Kind of an RDF term in a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermKind {
    /// An IRI.
    Uri,
    /// A plain or language-tagged literal.
    Literal,
    /// A typed literal (older result serializers).
    TypedLiteral,
    /// A blank node.
    Bnode,
}

/// One bound value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Term kind.
    #[serde(rename = "type")]
    pub kind: TermKind,
    /// Lexical value.
    pub value: String,
    /// Language tag of a literal.
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Datatype IRI of a typed literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl Term {
    /// An IRI term.
    #[must_use]
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Uri,
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    /// A language-tagged literal.
    #[must_use]
    pub fn literal(value: impl Into<String>, lang: Option<&str>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            lang: lang.map(str::to_string),
            datatype: None,
        }
    }
}

/// Result header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultHead {
    /// Projected variable names.
    #[serde(default)]
    pub vars: Vec<String>,
}

/// Result body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBody {
    /// One map per solution, variable name to term.
    pub bindings: Vec<BTreeMap<String, Term>>,
}

/// A complete SPARQL JSON results document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResults {
    /// Header.
    #[serde(default)]
    pub head: ResultHead,
    /// Solutions.
    pub results: ResultBody,
}

impl QueryResults {
    /// Reduce every binding to a `RawRow`, preserving order.
    #[must_use]
    pub fn into_rows(self) -> Vec<RawRow> {
        self.results
            .bindings
            .into_iter()
            .map(RawRow::from_binding)
            .collect()
    }
}

// =============================================================================
// RAW ROW
// =============================================================================

/// A related entity bound on a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedBinding {
    /// Entity IRI.
    pub uri: String,
    /// Localized label, if bound.
    pub label: Option<String>,
}

/// One solution of the search query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    /// Subject IRI; rows without it are malformed.
    pub person: Option<String>,
    /// Localized subject label.
    pub person_label: Option<String>,
    /// Localized description.
    pub description: Option<String>,
    /// Optional related entities, keyed by relation.
    pub related: BTreeMap<Relation, RelatedBinding>,
}

impl RawRow {
    /// Row for a subject with no optional bindings.
    #[must_use]
    pub fn subject(uri: impl Into<String>, label: Option<&str>) -> Self {
        Self {
            person: Some(uri.into()),
            person_label: label.map(str::to_string),
            ..Self::default()
        }
    }

    /// Builder-style related binding.
    #[must_use]
    pub fn with_related(mut self, relation: Relation, uri: &str, label: Option<&str>) -> Self {
        self.related.insert(
            relation,
            RelatedBinding {
                uri: uri.to_string(),
                label: label.map(str::to_string),
            },
        );
        self
    }

    /// Builder-style description.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Reduce one binding map.
    ///
    /// Only IRIs count as entity identities; a literal or blank node in an
    /// entity position is treated as unbound.
    #[must_use]
    pub fn from_binding(mut binding: BTreeMap<String, Term>) -> Self {
        let mut take_uri = |var: &str| {
            binding
                .remove(var)
                .filter(|t| t.kind == TermKind::Uri && !t.value.is_empty())
                .map(|t| t.value)
        };
        let person = take_uri(VAR_PERSON);

        let mut related = BTreeMap::new();
        for relation in Relation::ALL {
            if let Some(uri) = take_uri(relation.variable()) {
                related.insert(relation, RelatedBinding { uri, label: None });
            }
        }

        let mut take_text = |var: &str| {
            binding
                .remove(var)
                .filter(|t| t.kind != TermKind::Bnode)
                .map(|t| t.value)
        };
        let person_label = take_text(VAR_PERSON_LABEL);
        let description = take_text(VAR_DESCRIPTION);
        for relation in Relation::ALL {
            let label = take_text(relation.label_variable());
            if let Some(entry) = related.get_mut(&relation) {
                entry.label = label;
            }
        }

        Self {
            person,
            person_label,
            description,
            related,
        }
    }

    /// Related binding for one relation.
    #[must_use]
    pub fn related(&self, relation: Relation) -> Option<&RelatedBinding> {
        self.related.get(&relation)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "head": {"vars": ["person", "personLabel", "description", "birthPlace", "birthPlaceLabel"]},
        "results": {"bindings": [
            {
                "person": {"type": "uri", "value": "http://www.wikidata.org/entity/Q1"},
                "personLabel": {"type": "literal", "xml:lang": "en", "value": "Ann Griffiths"},
                "description": {"type": "literal", "xml:lang": "en", "value": "Welsh hymn writer"},
                "birthPlace": {"type": "uri", "value": "http://www.wikidata.org/entity/Q12"},
                "birthPlaceLabel": {"type": "literal", "xml:lang": "en", "value": "Llanfihangel-yng-Ngwynfa"}
            },
            {
                "personLabel": {"type": "literal", "value": "orphan"}
            }
        ]}
    }"#;

    #[test]
    fn decodes_standard_document() {
        let results: QueryResults = serde_json::from_str(SAMPLE).expect("decode");
        assert_eq!(results.head.vars.len(), 5);
        let rows = results.into_rows();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(
            first.person.as_deref(),
            Some("http://www.wikidata.org/entity/Q1")
        );
        assert_eq!(first.person_label.as_deref(), Some("Ann Griffiths"));
        assert_eq!(first.description.as_deref(), Some("Welsh hymn writer"));
        let birth = first.related(Relation::BirthPlace).expect("birth place");
        assert_eq!(birth.label.as_deref(), Some("Llanfihangel-yng-Ngwynfa"));
        assert!(first.related(Relation::Occupation).is_none());
    }

    #[test]
    fn row_without_subject_is_kept_unidentified() {
        let rows = serde_json::from_str::<QueryResults>(SAMPLE)
            .expect("decode")
            .into_rows();
        assert!(rows[1].person.is_none());
    }

    #[test]
    fn missing_bindings_is_a_decode_failure() {
        let result = serde_json::from_str::<QueryResults>(r#"{"head": {"vars": []}}"#);
        assert!(result.is_err());
        let result = serde_json::from_str::<QueryResults>(r#"{"boolean": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn literal_in_subject_position_is_unbound() {
        let mut binding = BTreeMap::new();
        binding.insert(VAR_PERSON.to_string(), Term::literal("not an iri", None));
        let row = RawRow::from_binding(binding);
        assert!(row.person.is_none());
    }

    #[test]
    fn related_label_without_entity_is_ignored() {
        let mut binding = BTreeMap::new();
        binding.insert(
            VAR_PERSON.to_string(),
            Term::uri("http://www.wikidata.org/entity/Q1"),
        );
        binding.insert(
            "occupationLabel".to_string(),
            Term::literal("poet", Some("en")),
        );
        let row = RawRow::from_binding(binding);
        assert!(row.related.is_empty());
    }
}
