//! # Local Facet Index
//!
//! Preloaded lookup lists, one per `ListKey`, used for client-side
//! autocomplete without a network round trip.
//!
//! Lists are loaded once per session (the app layer reads them from JSON
//! files or a packed bundle, see `formats`) and never mutated afterwards, so
//! lookups can run interleaved with an in-flight search.

use crate::primitives::{AUTOCOMPLETE_LIMIT, MIN_QUERY_CHARS, MIN_QUERY_CHARS_LARGE};
use crate::registry::{FacetKey, ListKey};
use crate::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// ENTRIES
// =============================================================================

/// One entry of a local list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetEntry {
    /// Entity identifier (or relation token for the relations list).
    pub id: String,
    /// English label.
    pub label_en: String,
    /// Welsh label.
    pub label_cy: String,
    /// Optional English description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc_en: Option<String>,
    /// Optional Welsh description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc_cy: Option<String>,
}

impl FacetEntry {
    /// Label in the given language.
    #[must_use]
    pub fn label(&self, language: Language) -> &str {
        match language {
            Language::En => &self.label_en,
            Language::Cy => &self.label_cy,
        }
    }

    /// Description in the given language, if any.
    #[must_use]
    pub fn description(&self, language: Language) -> Option<&str> {
        match language {
            Language::En => self.desc_en.as_deref(),
            Language::Cy => self.desc_cy.as_deref(),
        }
    }
}

// =============================================================================
// SUGGESTIONS
// =============================================================================

/// Result of an autocomplete lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestions<'a> {
    /// Input too short: no list is shown. Not an error.
    Closed,
    /// Matching entries in list order (possibly none).
    Open(Vec<&'a FacetEntry>),
}

impl<'a> Suggestions<'a> {
    /// Entries of an open list; empty when closed.
    #[must_use]
    pub fn entries(&self) -> &[&'a FacetEntry] {
        match self {
            Suggestions::Closed => &[],
            Suggestions::Open(entries) => entries,
        }
    }

    /// Whether the list is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Suggestions::Open(_))
    }
}

// =============================================================================
// INDEX
// =============================================================================

/// Immutable collection of local lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFacetIndex {
    lists: BTreeMap<ListKey, Vec<FacetEntry>>,
}

impl LocalFacetIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style list insertion, used while loading.
    #[must_use]
    pub fn with_list(mut self, key: ListKey, entries: Vec<FacetEntry>) -> Self {
        self.lists.insert(key, entries);
        self
    }

    /// Entries of one list (empty if the list was never loaded).
    #[must_use]
    pub fn list(&self, key: ListKey) -> &[FacetEntry] {
        self.lists.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate loaded lists in key order.
    pub fn lists(&self) -> impl Iterator<Item = (ListKey, &[FacetEntry])> {
        self.lists.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Total number of entries across all lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    /// Whether no entries are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find an entry by id in a facet's backing list.
    #[must_use]
    pub fn find(&self, facet: FacetKey, id: &str) -> Option<&FacetEntry> {
        self.list(facet.definition().list)
            .iter()
            .find(|entry| entry.id == id)
    }

    /// Autocomplete lookup.
    ///
    /// Returns `Closed` when the trimmed input is shorter than the facet's
    /// minimum, otherwise up to `AUTOCOMPLETE_LIMIT` entries whose label in
    /// `language` contains the input, compared case-insensitively.
    #[must_use]
    pub fn autocomplete(&self, text: &str, facet: FacetKey, language: Language) -> Suggestions<'_> {
        let list = facet.definition().list;
        let needle = text.trim();
        if needle.chars().count() < min_query_chars(list) {
            return Suggestions::Closed;
        }

        let needle = needle.to_lowercase();
        let matches = self
            .list(list)
            .iter()
            .filter(|entry| entry.label(language).to_lowercase().contains(&needle))
            .take(AUTOCOMPLETE_LIMIT)
            .collect();
        Suggestions::Open(matches)
    }
}

/// Minimum input length for a list.
#[must_use]
pub const fn min_query_chars(list: ListKey) -> usize {
    if list.is_large() {
        MIN_QUERY_CHARS_LARGE
    } else {
        MIN_QUERY_CHARS
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, en: &str, cy: &str) -> FacetEntry {
        FacetEntry {
            id: id.to_string(),
            label_en: en.to_string(),
            label_cy: cy.to_string(),
            desc_en: None,
            desc_cy: None,
        }
    }

    fn sample_index() -> LocalFacetIndex {
        LocalFacetIndex::new()
            .with_list(
                ListKey::Places,
                vec![
                    entry("Q10690", "Cardiff", "Caerdydd"),
                    entry("Q234178", "Aberystwyth", "Aberystwyth"),
                    entry("Q213154", "Swansea", "Abertawe"),
                ],
            )
            .with_list(
                ListKey::Occupations,
                vec![
                    entry("Q36180", "writer", "llenor"),
                    entry("Q49757", "poet", "bardd"),
                ],
            )
    }

    #[test]
    fn short_input_closes_large_lists() {
        let index = sample_index();
        let result = index.autocomplete("a", FacetKey::BirthPlace, Language::En);
        assert_eq!(result, Suggestions::Closed);
        assert!(result.entries().is_empty());
    }

    #[test]
    fn single_char_opens_small_lists() {
        let index = sample_index();
        let result = index.autocomplete("p", FacetKey::Occupation, Language::En);
        assert!(result.is_open());
        assert_eq!(result.entries().len(), 1);
        assert_eq!(result.entries()[0].id, "Q49757");
    }

    #[test]
    fn empty_input_is_closed() {
        let index = sample_index();
        assert!(!index.autocomplete("  ", FacetKey::Occupation, Language::En).is_open());
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let index = sample_index();
        let result = index.autocomplete("ABER", FacetKey::DeathPlace, Language::Cy);
        let ids: Vec<_> = result.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["Q234178", "Q213154"]);
    }

    #[test]
    fn language_selects_label_field() {
        let index = sample_index();
        let en = index.autocomplete("llen", FacetKey::Occupation, Language::En);
        let cy = index.autocomplete("llen", FacetKey::Occupation, Language::Cy);
        assert!(en.entries().is_empty());
        assert_eq!(cy.entries().len(), 1);
    }

    #[test]
    fn results_capped_at_limit() {
        let entries = (0..100)
            .map(|i| entry(&format!("Q{i}"), &format!("poet {i}"), "bardd"))
            .collect();
        let index = LocalFacetIndex::new().with_list(ListKey::Occupations, entries);
        let result = index.autocomplete("poet", FacetKey::Occupation, Language::En);
        assert_eq!(result.entries().len(), AUTOCOMPLETE_LIMIT);
        assert_eq!(result.entries()[0].id, "Q0");
    }

    #[test]
    fn missing_list_yields_open_empty() {
        let index = LocalFacetIndex::new();
        let result = index.autocomplete("ma", FacetKey::Gender, Language::En);
        assert_eq!(result, Suggestions::Open(Vec::new()));
    }

    #[test]
    fn find_uses_backing_list() {
        let index = sample_index();
        assert!(index.find(FacetKey::BirthPlace, "Q10690").is_some());
        assert!(index.find(FacetKey::Occupation, "Q10690").is_none());
    }

    #[test]
    fn entry_deserializes_without_descriptions() {
        let json = r#"{"id":"Q6581072","label_en":"female","label_cy":"benyw"}"#;
        let e: FacetEntry = serde_json::from_str(json).expect("parse");
        assert_eq!(e.label(Language::Cy), "benyw");
        assert_eq!(e.description(Language::En), None);
    }
}
