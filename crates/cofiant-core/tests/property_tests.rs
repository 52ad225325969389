//! # Property-Based Tests
//!
//! Invariants of the search pipeline checked with proptest.

use cofiant_core::{
    FacetKey, Language, Page, RawRow, Relation, Selection, build_query, dedupe, dropped_count,
    extract_entity_id, process, project_graph, project_list, window,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;

const WD: &str = "http://www.wikidata.org/entity/";

// =============================================================================
// STRATEGIES
// =============================================================================

/// A row with a subject from a small id pool (so repeats are common), or
/// with no subject at all.
fn raw_row() -> impl Strategy<Value = RawRow> {
    (
        prop::option::weighted(0.9, 1u32..30),
        prop::option::of(1u32..8),
        prop::option::of(1u32..8),
        prop::option::of("[a-zA-Z ]{0,12}"),
    )
        .prop_map(|(subject, occupation, birth, label)| {
            let Some(q) = subject else {
                return RawRow::default();
            };
            let mut row = RawRow::subject(format!("{WD}Q{q}"), label.as_deref());
            if let Some(o) = occupation {
                row = row.with_related(Relation::Occupation, &format!("{WD}Q{}", 1000 + o), None);
            }
            if let Some(b) = birth {
                row = row.with_related(Relation::BirthPlace, &format!("{WD}Q{}", 2000 + b), Some("p"));
            }
            row
        })
}

fn selection() -> impl Strategy<Value = Selection> {
    (
        prop::option::of(1u32..100),
        prop::option::of(1u32..100),
        prop::option::of(1u32..100),
        prop::option::of(prop::sample::select(vec![
            "any", "father", "mother", "spouse", "sibling", "child", "relative",
        ])),
    )
        .prop_map(|(gender, occupation, birth, relation)| {
            let mut selection = Selection::new();
            if let Some(g) = gender {
                selection.set_raw(FacetKey::Gender, &format!("Q{g}")).expect("gender");
            }
            if let Some(o) = occupation {
                selection
                    .set_raw(FacetKey::Occupation, &format!("Q{o}"))
                    .expect("occupation");
            }
            if let Some(b) = birth {
                selection
                    .set_raw(FacetKey::BirthPlace, &format!("Q{b}"))
                    .expect("birth place");
            }
            if let Some(r) = relation {
                selection.set_raw(FacetKey::Relation, r).expect("relation");
            }
            selection
        })
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Deduplicated rows never share a subject id and never lack one.
    #[test]
    fn dedupe_output_is_unique(rows in vec(raw_row(), 0..80)) {
        let kept = dedupe(rows);
        let mut ids = BTreeSet::new();
        for row in &kept {
            let uri = row.person.as_deref().expect("subject present");
            prop_assert!(ids.insert(extract_entity_id(uri)));
        }
    }

    /// Dedupe keeps the first occurrence of each subject, in input order.
    #[test]
    fn dedupe_is_stable(rows in vec(raw_row(), 0..80)) {
        let kept = dedupe(rows.clone());
        let mut seen = BTreeSet::new();
        let expected: Vec<_> = rows
            .into_iter()
            .filter(|row| row.person.as_deref().is_some_and(|uri| seen.insert(extract_entity_id(uri))))
            .collect();
        prop_assert_eq!(kept, expected);
    }

    /// Kept and dropped rows account for every input row.
    #[test]
    fn dedupe_kept_plus_dropped_is_input(rows in vec(raw_row(), 0..80)) {
        let total = rows.len();
        let dropped = dropped_count(&rows);
        prop_assert_eq!(dedupe(rows).len() + dropped, total);
    }

    /// has-more holds exactly when deduplicated rows exceed the page size.
    #[test]
    fn has_more_law(rows in vec(raw_row(), 0..80), size in 1usize..40) {
        let deduped = dedupe(rows);
        let count = deduped.len();
        let page = window(deduped, size);
        prop_assert_eq!(page.has_more(), count > size);
    }

    /// List length is min(deduplicated count, page size).
    #[test]
    fn list_length_is_bounded(rows in vec(raw_row(), 0..80), size in 1usize..40) {
        let deduped = dedupe(rows);
        let count = deduped.len();
        let page = window(deduped, size);
        prop_assert_eq!(project_list(page.list_rows()).len(), count.min(size));
    }

    /// The full pipeline reports the same visible count as the list.
    #[test]
    fn summary_matches_list(rows in vec(raw_row(), 0..80), size in 1usize..40) {
        let outcome = process(rows, Page::first(size), Language::En);
        let summary = outcome.summary();
        prop_assert!(summary.visible_count <= size);
        prop_assert_eq!(summary.page_index, 1);
    }

    /// Graph nodes are unique and every edge end is a node.
    #[test]
    fn graph_is_referentially_intact(rows in vec(raw_row(), 0..80)) {
        let graph = project_graph(&dedupe(rows));
        let ids: BTreeSet<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        prop_assert_eq!(ids.len(), graph.nodes.len());
        for edge in &graph.edges {
            prop_assert!(ids.contains(edge.source.as_str()));
            prop_assert!(ids.contains(edge.target.as_str()));
        }
    }

    /// Same inputs produce byte-identical queries.
    #[test]
    fn query_is_deterministic(selection in selection(), index in 1u32..50, cy in any::<bool>()) {
        let language = if cy { Language::Cy } else { Language::En };
        let page = Page::new(index, 24).expect("page");
        let snapshot = selection.snapshot();
        let a = build_query(&snapshot, page, language);
        let b = build_query(&selection.snapshot(), page, language);
        match (a, b) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => prop_assert!(selection.is_empty()),
            _ => prop_assert!(false, "results differ"),
        }
    }

    /// A single-valued constraint appears iff its facet is selected.
    #[test]
    fn constraints_only_for_present_facets(selection in selection()) {
        prop_assume!(!selection.is_empty());
        let query = build_query(&selection.snapshot(), Page::first(24), Language::En)
            .expect("query");
        prop_assert_eq!(
            query.contains("?person wdt:P21 wd:"),
            selection.get(FacetKey::Gender).is_some()
        );
        prop_assert_eq!(
            query.contains("?person wdt:P106 wd:"),
            selection.get(FacetKey::Occupation).is_some()
        );
        prop_assert_eq!(
            query.contains("?person wdt:P19 wd:"),
            selection.get(FacetKey::BirthPlace).is_some()
        );
        prop_assert_eq!(
            query.contains("?related"),
            selection.get(FacetKey::Relation).is_some()
        );
        prop_assert!(!query.contains("?person wdt:P20 wd:"));
    }

    /// Extracted ids are either a clean tail or the full input.
    #[test]
    fn extracted_id_is_tail_or_whole(uri in "[a-z:/#._0-9A-Z-]{0,40}") {
        let id = extract_entity_id(&uri);
        prop_assert!(id == uri || (cofiant_core::is_identifier(&id) && uri.contains(id.as_str())));
    }
}
