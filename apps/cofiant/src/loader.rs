//! # Facet List Loader
//!
//! File I/O for the local facet index. The index comes either from a
//! directory holding one JSON array per list (`<list>.json`), or from a
//! packed `.bin` bundle written by `pack-index`.
//!
//! A missing list file yields an empty list; the relation list falls back to
//! the built-in token labels.

use cofiant_core::primitives::MAX_BUNDLE_SIZE;
use cofiant_core::registry::RELATION_MEMBERS;
use cofiant_core::{
    CofiantError, FacetEntry, LocalFacetIndex, ListKey, UNION_SENTINEL, index_from_bytes,
    index_to_bytes,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of one JSON list file (32 MB).
const MAX_LIST_FILE_SIZE: u64 = 32 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), CofiantError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CofiantError::Io(format!("Cannot read file metadata: {e}")))?;

    if metadata.len() > max_size {
        return Err(CofiantError::Serialization(format!(
            "File size {} bytes exceeds maximum allowed {max_size} bytes",
            metadata.len()
        )));
    }
    Ok(())
}

/// Validate an output path: the parent directory must exist.
pub fn validate_output_path(path: &Path) -> Result<PathBuf, CofiantError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        CofiantError::Io(format!(
            "Invalid output directory '{}': {e}",
            parent.display()
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(CofiantError::Io(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| CofiantError::Io("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// BUILT-IN RELATION LABELS
// =============================================================================

fn relation_entry(id: &str, en: &str, cy: &str) -> FacetEntry {
    FacetEntry {
        id: id.to_string(),
        label_en: en.to_string(),
        label_cy: cy.to_string(),
        desc_en: None,
        desc_cy: None,
    }
}

/// Relation list used when no `relations.json` is present.
pub fn builtin_relations() -> Vec<FacetEntry> {
    let mut entries = vec![relation_entry(
        UNION_SENTINEL,
        "any relation",
        "unrhyw berthynas",
    )];
    entries.extend(
        RELATION_MEMBERS
            .iter()
            .map(|member| relation_entry(member.token, member.label_en, member.label_cy)),
    );
    entries
}

// =============================================================================
// LOADING
// =============================================================================

/// Load the facet index from a list directory or a packed bundle.
///
/// A path that does not exist gives an index holding only the built-in
/// relation list, so searching still works without autocomplete data.
pub fn load_index(path: &Path) -> Result<LocalFacetIndex, CofiantError> {
    if path.is_file() {
        return load_bundle(path);
    }
    if !path.exists() {
        tracing::warn!(
            "Facet lists not found at '{}'; autocomplete will be limited",
            path.display()
        );
        return Ok(LocalFacetIndex::new().with_list(ListKey::Relations, builtin_relations()));
    }
    load_list_dir(path)
}

/// Load every `<list>.json` in a directory.
pub fn load_list_dir(dir: &Path) -> Result<LocalFacetIndex, CofiantError> {
    let mut index = LocalFacetIndex::new();
    for key in ListKey::ALL {
        let file = dir.join(format!("{}.json", key.file_stem()));
        let entries = if file.is_file() {
            read_list(&file)?
        } else if key == ListKey::Relations {
            builtin_relations()
        } else {
            tracing::warn!("Missing facet list '{}'", file.display());
            Vec::new()
        };
        tracing::debug!(list = %key, entries = entries.len(), "Loaded facet list");
        index = index.with_list(key, entries);
    }
    Ok(index)
}

fn read_list(file: &Path) -> Result<Vec<FacetEntry>, CofiantError> {
    validate_file_size(file, MAX_LIST_FILE_SIZE)?;
    let text = std::fs::read_to_string(file)
        .map_err(|e| CofiantError::Io(format!("Cannot read '{}': {e}", file.display())))?;
    serde_json::from_str(&text).map_err(|e| {
        CofiantError::Serialization(format!("Invalid facet list '{}': {e}", file.display()))
    })
}

/// Load a packed bundle.
pub fn load_bundle(path: &Path) -> Result<LocalFacetIndex, CofiantError> {
    validate_file_size(path, MAX_BUNDLE_SIZE as u64)?;
    let bytes = std::fs::read(path)
        .map_err(|e| CofiantError::Io(format!("Cannot read '{}': {e}", path.display())))?;
    let index = index_from_bytes(&bytes)?;
    tracing::info!(
        "Loaded packed facet index '{}' ({} entries, blake3 {})",
        path.display(),
        index.len(),
        cofiant_core::bundle_digest(&bytes)
    );
    Ok(index)
}

/// Write a packed bundle. Returns its BLAKE3 digest.
pub fn write_bundle(index: &LocalFacetIndex, path: &Path) -> Result<String, CofiantError> {
    let output = validate_output_path(path)?;
    let bytes = index_to_bytes(index)?;
    std::fs::write(&output, &bytes)
        .map_err(|e| CofiantError::Io(format!("Cannot write '{}': {e}", output.display())))?;
    Ok(cofiant_core::bundle_digest(&bytes))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cofiant_core::{FacetKey, Language};

    const PLACES: &str = r#"[
        {"id": "Q10690", "label_en": "Cardiff", "label_cy": "Caerdydd", "desc_en": "capital of Wales"},
        {"id": "Q23051", "label_en": "Swansea", "label_cy": "Abertawe"}
    ]"#;

    #[test]
    fn list_dir_loads_present_lists() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("places.json"), PLACES).expect("write");

        let index = load_index(dir.path()).expect("load");
        assert_eq!(index.list(ListKey::Places).len(), 2);
        assert!(index.list(ListKey::Genders).is_empty());
        assert_eq!(index.list(ListKey::Relations).len(), 7);

        let hits = index.autocomplete("caer", FacetKey::BirthPlace, Language::Cy);
        assert_eq!(hits.entries().len(), 1);
    }

    #[test]
    fn malformed_list_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("genders.json"), "{not json").expect("write");
        assert!(matches!(
            load_index(dir.path()),
            Err(CofiantError::Serialization(_))
        ));
    }

    #[test]
    fn missing_path_gives_builtin_relations_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let index = load_index(&dir.path().join("absent")).expect("load");
        assert_eq!(index.len(), 7);
        let hits = index.autocomplete("tad", FacetKey::Relation, Language::Cy);
        assert_eq!(hits.entries()[0].id, "father");
    }

    #[test]
    fn builtin_relations_follow_registry_labels() {
        let entries = builtin_relations();
        assert_eq!(entries[0].id, UNION_SENTINEL);
        assert_eq!(entries.len(), RELATION_MEMBERS.len() + 1);
        for (entry, member) in entries[1..].iter().zip(RELATION_MEMBERS) {
            assert_eq!(entry.id, member.token);
            assert_eq!(entry.label_en, member.label_en);
            assert_eq!(entry.label_cy, member.label_cy);
        }
        let sibling = entries.iter().find(|e| e.id == "sibling").expect("sibling");
        assert_eq!(sibling.label(Language::Cy), "brawd neu chwaer");
    }

    #[test]
    fn bundle_written_then_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("places.json"), PLACES).expect("write");
        let index = load_list_dir(dir.path()).expect("load");

        let bundle = dir.path().join("lists.bin");
        let digest = write_bundle(&index, &bundle).expect("write");
        assert_eq!(digest.len(), 64);

        let restored = load_index(&bundle).expect("load bundle");
        assert_eq!(restored, index);
    }

    #[test]
    fn output_dir_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("lists.bin");
        assert!(validate_output_path(&path).is_err());
    }
}
