//! # Deduplicator
//!
//! The endpoint returns one row per combination of optional bindings, so a
//! person with two occupations arrives twice. Rows collapse to the first
//! occurrence per subject identity, and rows without a subject are dropped
//! silently.
//!
//! Runs on the full lookahead set, before the page window is cut.

use crate::projection::extract_entity_id;
use crate::rows::RawRow;
use std::collections::BTreeSet;

/// Remove rows without a subject and every later repeat of a subject.
///
/// Identity is the extracted entity id, so two IRIs with the same tail
/// identifier count as one subject. Order of the kept rows is preserved.
#[must_use]
pub fn dedupe(rows: Vec<RawRow>) -> Vec<RawRow> {
    let mut seen = BTreeSet::new();
    rows.into_iter()
        .filter(|row| match row.person.as_deref() {
            Some(uri) => seen.insert(extract_entity_id(uri)),
            None => false,
        })
        .collect()
}

/// Number of rows `dedupe` would drop.
#[must_use]
pub fn dropped_count(rows: &[RawRow]) -> usize {
    let mut seen = BTreeSet::new();
    rows.iter()
        .filter(|row| match row.person.as_deref() {
            Some(uri) => !seen.insert(extract_entity_id(uri)),
            None => true,
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Relation;

    const WD: &str = "http://www.wikidata.org/entity/";

    #[test]
    fn keeps_first_occurrence() {
        let rows = vec![
            RawRow::subject(format!("{WD}Q1"), Some("A"))
                .with_related(Relation::Occupation, &format!("{WD}Q49757"), Some("poet")),
            RawRow::subject(format!("{WD}Q2"), Some("B")),
            RawRow::subject(format!("{WD}Q1"), Some("A"))
                .with_related(Relation::Occupation, &format!("{WD}Q36180"), Some("writer")),
        ];
        let kept = dedupe(rows);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].person.as_deref(), Some("http://www.wikidata.org/entity/Q1"));
        assert_eq!(
            kept[0]
                .related(Relation::Occupation)
                .and_then(|b| b.label.as_deref()),
            Some("poet")
        );
        assert_eq!(kept[1].person.as_deref(), Some("http://www.wikidata.org/entity/Q2"));
    }

    #[test]
    fn drops_rows_without_subject() {
        let rows = vec![
            RawRow::default(),
            RawRow::subject(format!("{WD}Q1"), None),
            RawRow::default(),
        ];
        assert_eq!(dropped_count(&rows), 2);
        let kept = dedupe(rows);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn identity_is_the_extracted_id() {
        let rows = vec![
            RawRow::subject(format!("{WD}Q1"), None),
            RawRow::subject("https://www.wikidata.org/wiki/Q1", None),
        ];
        assert_eq!(dedupe(rows).len(), 1);
    }

    #[test]
    fn dropped_count_matches_dedupe() {
        let rows = vec![
            RawRow::subject(format!("{WD}Q1"), None),
            RawRow::default(),
            RawRow::subject(format!("{WD}Q2"), None),
            RawRow::subject(format!("{WD}Q1"), Some("again")),
        ];
        let dropped = dropped_count(&rows);
        assert_eq!(dropped, 2);
        assert_eq!(dedupe(rows).len(), 4 - dropped);
    }

    #[test]
    fn empty_input() {
        assert!(dedupe(Vec::new()).is_empty());
    }
}
