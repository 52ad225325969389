//! # Pipeline Primitives
//!
//! Hardcoded constants of the Cofiant search pipeline.
//!
//! These are compiled into the binary and immutable at runtime. The page size
//! may be overridden by configuration; everything else is fixed.

/// Number of records shown per page.
///
/// The query always asks for `PAGE_SIZE + 1` rows: the extra row is the
/// lookahead that decides whether a further page exists.
pub const PAGE_SIZE: usize = 24;

/// Maximum number of autocomplete suggestions returned for one lookup.
pub const AUTOCOMPLETE_LIMIT: usize = 40;

/// Minimum input length (in characters) before a lookup opens.
pub const MIN_QUERY_CHARS: usize = 1;

/// Minimum input length for large lists (place-type facets).
pub const MIN_QUERY_CHARS_LARGE: usize = 2;

// =============================================================================
// GRAPH VOCABULARY
// =============================================================================

/// Predicate binding a subject to its class.
pub const INSTANCE_OF: &str = "P31";

/// The root "person" class every result must belong to.
pub const PERSON_CLASS: &str = "Q5";

/// Prefix declarations emitted at the top of every query.
pub const QUERY_PREFIXES: &[(&str, &str)] = &[
    ("wd", "http://www.wikidata.org/entity/"),
    ("wdt", "http://www.wikidata.org/prop/direct/"),
    ("schema", "http://schema.org/"),
    ("wikibase", "http://wikiba.se/ontology#"),
    ("bd", "http://www.bigdata.com/rdf#"),
];

// =============================================================================
// QUERY VARIABLES
// =============================================================================

/// Primary subject variable.
pub const VAR_PERSON: &str = "person";

/// Localized label of the subject.
pub const VAR_PERSON_LABEL: &str = "personLabel";

/// Localized description of the subject.
pub const VAR_DESCRIPTION: &str = "description";

/// Shared variable bound by the union facet's patterns.
pub const VAR_RELATED: &str = "related";

// =============================================================================
// INPUT LIMITS
// =============================================================================

/// Largest page size accepted from configuration.
pub const MAX_PAGE_SIZE: usize = 500;

/// Largest page index accepted; keeps offsets far from overflow.
pub const MAX_PAGE_INDEX: u32 = 100_000;

// =============================================================================
// PACKED INDEX FORMAT
// =============================================================================

/// Magic bytes of a packed facet index bundle.
pub const MAGIC_BYTES: &[u8; 4] = b"CFIX";

/// Current packed index format version.
pub const FORMAT_VERSION: u8 = 1;

/// Largest packed bundle accepted for decoding (64 MiB).
pub const MAX_BUNDLE_SIZE: usize = 64 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookahead_page_fits_limits() {
        assert!(PAGE_SIZE < MAX_PAGE_SIZE);
        assert!(MIN_QUERY_CHARS < MIN_QUERY_CHARS_LARGE);
    }
}
