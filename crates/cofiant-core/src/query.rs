//! # Query Builder
//!
//! Pure translation of (selection snapshot, page, language) into SPARQL text.
//!
//! - Deterministic: the same triple always yields byte-identical text
//! - Constraints follow the registry's declared order
//! - Absent facets contribute nothing (open world, not filtered out)
//! - Every embedded value has passed `EntityId` or registry validation

use crate::pagination::Page;
use crate::primitives::{
    INSTANCE_OF, PERSON_CLASS, QUERY_PREFIXES, VAR_DESCRIPTION, VAR_PERSON, VAR_PERSON_LABEL,
    VAR_RELATED,
};
use crate::registry::{FacetKind, FacetRegistry, Relation};
use crate::selection::{FacetValue, RelationChoice, SelectionSnapshot};
use crate::{CofiantError, Language};

/// One search invocation's inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Frozen selection.
    pub selection: SelectionSnapshot,
    /// Requested page.
    pub page: Page,
    /// Response language.
    pub language: Language,
}

impl SearchRequest {
    /// Bundle the inputs of one search.
    #[must_use]
    pub fn new(selection: SelectionSnapshot, page: Page, language: Language) -> Self {
        Self {
            selection,
            page,
            language,
        }
    }

    /// Build the query text for this request.
    pub fn to_query(&self) -> Result<String, CofiantError> {
        build_query(&self.selection, self.page, self.language)
    }
}

/// Build the SPARQL query for a selection.
///
/// Fails only with `SelectionEmpty`: an unconstrained search is never built.
pub fn build_query(
    selection: &SelectionSnapshot,
    page: Page,
    language: Language,
) -> Result<String, CofiantError> {
    if selection.is_empty() {
        return Err(CofiantError::SelectionEmpty);
    }

    let mut query = String::with_capacity(1024);

    for (prefix, iri) in QUERY_PREFIXES {
        query.push_str(&format!("PREFIX {prefix}: <{iri}>\n"));
    }

    query.push_str(&format!("SELECT DISTINCT ?{VAR_PERSON} ?{VAR_PERSON_LABEL} ?{VAR_DESCRIPTION}"));
    for relation in Relation::ALL {
        query.push_str(&format!(
            " ?{} ?{}",
            relation.variable(),
            relation.label_variable()
        ));
    }
    query.push_str(" WHERE {\n");

    // Base constraint: the subject is a person.
    query.push_str(&format!(
        "  ?{VAR_PERSON} wdt:{INSTANCE_OF} wd:{PERSON_CLASS} .\n"
    ));

    for definition in FacetRegistry::standard().iter() {
        let Some(value) = selection.get(definition.key) else {
            continue;
        };
        match (&definition.kind, value) {
            (FacetKind::Single { predicate }, FacetValue::Entity(id)) => {
                query.push_str(&format!("  ?{VAR_PERSON} wdt:{predicate} wd:{id} .\n"));
            }
            (FacetKind::Union { members }, FacetValue::Relation(RelationChoice::Any)) => {
                for (i, member) in members.iter().enumerate() {
                    let lead = if i == 0 { "  " } else { "  UNION " };
                    query.push_str(&format!(
                        "{lead}{{ ?{VAR_PERSON} wdt:{} ?{VAR_RELATED} . }}\n",
                        member.predicate
                    ));
                }
            }
            (FacetKind::Union { .. }, FacetValue::Relation(RelationChoice::Token(member))) => {
                query.push_str(&format!(
                    "  ?{VAR_PERSON} wdt:{} ?{VAR_RELATED} .\n",
                    member.predicate
                ));
            }
            // Shapes are checked by `Selection::set`; a mismatch cannot be
            // expressed as a constraint and is left out.
            _ => {}
        }
    }

    for relation in Relation::ALL {
        query.push_str(&format!(
            "  OPTIONAL {{ ?{VAR_PERSON} wdt:{} ?{} . }}\n",
            relation.predicate(),
            relation.variable()
        ));
    }
    query.push_str(&format!(
        "  OPTIONAL {{ ?{VAR_PERSON} schema:description ?{VAR_DESCRIPTION} . FILTER(LANG(?{VAR_DESCRIPTION}) = \"{}\") }}\n",
        language.code()
    ));
    query.push_str(&format!(
        "  SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"{},{}\" . }}\n",
        language.code(),
        language.other().code()
    ));
    query.push_str("}\n");

    query.push_str(&format!("ORDER BY LCASE(STR(?{VAR_PERSON_LABEL}))\n"));
    query.push_str(&format!("LIMIT {}\n", page.limit()));
    query.push_str(&format!("OFFSET {}\n", page.offset()));

    Ok(query)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FacetKey;
    use crate::selection::Selection;

    fn snapshot(pairs: &[(FacetKey, &str)]) -> SelectionSnapshot {
        let mut selection = Selection::new();
        for (key, raw) in pairs {
            selection.set_raw(*key, raw).expect("set");
        }
        selection.snapshot()
    }

    #[test]
    fn empty_selection_builds_nothing() {
        let result = build_query(&Selection::new().snapshot(), Page::first(24), Language::En);
        assert!(matches!(result, Err(CofiantError::SelectionEmpty)));
    }

    #[test]
    fn limit_and_offset_use_lookahead() {
        let q = build_query(
            &snapshot(&[(FacetKey::Gender, "Q2")]),
            Page::first(24),
            Language::En,
        )
        .expect("query");
        assert!(q.contains("LIMIT 25\n"));
        assert!(q.contains("OFFSET 0\n"));
        assert!(q.contains("?person wdt:P21 wd:Q2 ."));
    }

    #[test]
    fn constraints_follow_declared_order() {
        let q = build_query(
            &snapshot(&[(FacetKey::BirthPlace, "Q12"), (FacetKey::Occupation, "Q77")]),
            Page::new(2, 24).expect("page"),
            Language::En,
        )
        .expect("query");
        let occupation = q.find("wdt:P106 wd:Q77").expect("occupation constraint");
        let birth = q.find("wdt:P19 wd:Q12").expect("birth place constraint");
        assert!(occupation < birth);
        assert!(q.contains("OFFSET 24\n"));
    }

    #[test]
    fn absent_facets_add_no_constraint() {
        let q = build_query(
            &snapshot(&[(FacetKey::Gender, "Q2")]),
            Page::first(24),
            Language::En,
        )
        .expect("query");
        assert!(!q.contains(" wd:Q77"));
        assert!(!q.contains("?related"));
        // Display relations are optional bindings, never filters.
        assert!(q.contains("OPTIONAL { ?person wdt:P106 ?occupation . }"));
    }

    #[test]
    fn union_sentinel_emits_every_member() {
        let q = build_query(
            &snapshot(&[(FacetKey::Relation, "any")]),
            Page::first(24),
            Language::En,
        )
        .expect("query");
        assert_eq!(q.matches("?related . }").count(), 6);
        assert_eq!(q.matches("UNION").count(), 5);
        assert!(q.contains("{ ?person wdt:P22 ?related . }"));
        assert!(q.contains("UNION { ?person wdt:P1038 ?related . }"));
    }

    #[test]
    fn single_relation_token_emits_one_pattern() {
        let q = build_query(
            &snapshot(&[(FacetKey::Relation, "spouse")]),
            Page::first(24),
            Language::En,
        )
        .expect("query");
        assert!(q.contains("  ?person wdt:P26 ?related .\n"));
        assert!(!q.contains("UNION"));
    }

    #[test]
    fn language_drives_description_and_labels() {
        let q = build_query(
            &snapshot(&[(FacetKey::Gender, "Q2")]),
            Page::first(24),
            Language::Cy,
        )
        .expect("query");
        assert!(q.contains("FILTER(LANG(?description) = \"cy\")"));
        assert!(q.contains("wikibase:language \"cy,en\""));
    }

    #[test]
    fn ordering_is_case_insensitive_label() {
        let q = build_query(
            &snapshot(&[(FacetKey::Gender, "Q2")]),
            Page::first(24),
            Language::En,
        )
        .expect("query");
        assert!(q.contains("ORDER BY LCASE(STR(?personLabel))"));
    }

    #[test]
    fn request_builds_identical_text() {
        let request = SearchRequest::new(
            snapshot(&[(FacetKey::Occupation, "Q77")]),
            Page::first(24),
            Language::En,
        );
        assert_eq!(
            request.to_query().expect("first"),
            request.to_query().expect("second")
        );
    }
}
