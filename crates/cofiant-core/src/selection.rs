//! # Facet Selection State
//!
//! The user's current choice per facet.
//!
//! A `Selection` is the live, mutable state; `snapshot()` freezes it into a
//! `SelectionSnapshot` that exactly one query is built from. Mutating the
//! live state afterwards never reaches an in-flight search.

use crate::registry::{FacetDefinition, FacetKey, FacetKind, RelationMember};
use crate::{CofiantError, EntityId};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Boundary spelling of the union sentinel.
pub const UNION_SENTINEL: &str = "any";

// =============================================================================
// VALUES
// =============================================================================

/// Choice for the multi-valued relation facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationChoice {
    /// One predicate of the closed set.
    Token(&'static RelationMember),
    /// Union sentinel: any predicate of the closed set.
    Any,
}

/// A chosen facet value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FacetValue {
    /// A single entity (single-valued facets).
    Entity(EntityId),
    /// A relation choice (union facet).
    Relation(RelationChoice),
}

impl FacetValue {
    /// Parse a boundary string for the given facet.
    ///
    /// Single-valued facets take an entity id. The union facet takes a
    /// relation token or the `any` sentinel.
    pub fn parse(definition: &FacetDefinition, raw: &str) -> Result<Self, CofiantError> {
        match definition.kind {
            FacetKind::Single { .. } => EntityId::parse(raw).map(FacetValue::Entity),
            FacetKind::Union { .. } => {
                if raw.trim().eq_ignore_ascii_case(UNION_SENTINEL) {
                    return Ok(FacetValue::Relation(RelationChoice::Any));
                }
                definition
                    .member(raw)
                    .map(|m| FacetValue::Relation(RelationChoice::Token(m)))
                    .ok_or_else(|| CofiantError::InvalidValue {
                        facet: definition.key.to_string(),
                        value: raw.to_string(),
                    })
            }
        }
    }

    /// Whether this value's shape is legal for the facet.
    #[must_use]
    pub fn fits(&self, definition: &FacetDefinition) -> bool {
        match (self, &definition.kind) {
            (FacetValue::Entity(_), FacetKind::Single { .. }) => true,
            (FacetValue::Relation(RelationChoice::Any), FacetKind::Union { .. }) => true,
            (FacetValue::Relation(RelationChoice::Token(m)), FacetKind::Union { members }) => {
                members.iter().any(|candidate| candidate == *m)
            }
            _ => false,
        }
    }
}

impl fmt::Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetValue::Entity(id) => write!(f, "{id}"),
            FacetValue::Relation(RelationChoice::Token(m)) => f.write_str(m.token),
            FacetValue::Relation(RelationChoice::Any) => f.write_str(UNION_SENTINEL),
        }
    }
}

// =============================================================================
// LIVE SELECTION
// =============================================================================

/// Mutable per-facet selection. Absent keys are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    values: BTreeMap<FacetKey, FacetValue>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a facet value, rejecting shapes the facet does not accept.
    pub fn set(&mut self, key: FacetKey, value: FacetValue) -> Result<(), CofiantError> {
        if !value.fits(key.definition()) {
            return Err(CofiantError::InvalidValue {
                facet: key.to_string(),
                value: value.to_string(),
            });
        }
        self.values.insert(key, value);
        Ok(())
    }

    /// Parse a boundary string and set it.
    pub fn set_raw(&mut self, key: FacetKey, raw: &str) -> Result<(), CofiantError> {
        let value = FacetValue::parse(key.definition(), raw)?;
        self.set(key, value)
    }

    /// Build a selection from boundary strings.
    ///
    /// The first invalid pair fails the whole build.
    pub fn try_from_raw<'a, I>(pairs: I) -> Result<Self, CofiantError>
    where
        I: IntoIterator<Item = (FacetKey, &'a str)>,
    {
        let mut selection = Self::new();
        for (key, raw) in pairs {
            selection.set_raw(key, raw)?;
        }
        Ok(selection)
    }

    /// Unset one facet.
    pub fn clear(&mut self, key: FacetKey) {
        self.values.remove(&key);
    }

    /// Unset every facet.
    pub fn clear_all(&mut self) {
        self.values.clear();
    }

    /// Current value of a facet.
    #[must_use]
    pub fn get(&self, key: FacetKey) -> Option<&FacetValue> {
        self.values.get(&key)
    }

    /// Whether no facet has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of constrained facets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Freeze the current state.
    #[must_use]
    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            values: Arc::new(self.values.clone()),
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Immutable selection used to build one query. Cheap to clone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    values: Arc<BTreeMap<FacetKey, FacetValue>>,
}

impl SelectionSnapshot {
    /// Value of a facet.
    #[must_use]
    pub fn get(&self, key: FacetKey) -> Option<&FacetValue> {
        self.values.get(&key)
    }

    /// Whether no facet has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Present values in declared facet order.
    pub fn iter(&self) -> impl Iterator<Item = (FacetKey, &FacetValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Rebuild a live selection with the same values.
    #[must_use]
    pub fn to_selection(&self) -> Selection {
        Selection {
            values: (*self.values).clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str) -> FacetValue {
        FacetValue::Entity(EntityId::parse(id).expect("id"))
    }

    #[test]
    fn set_and_clear() {
        let mut selection = Selection::new();
        assert!(selection.is_empty());

        selection.set(FacetKey::Gender, entity("Q6581097")).expect("set");
        selection.set(FacetKey::Occupation, entity("Q49757")).expect("set");
        assert_eq!(selection.len(), 2);

        selection.clear(FacetKey::Gender);
        assert!(selection.get(FacetKey::Gender).is_none());
        assert_eq!(selection.len(), 1);

        selection.clear_all();
        assert!(selection.is_empty());
    }

    #[test]
    fn entity_value_rejected_on_union_facet() {
        let mut selection = Selection::new();
        let result = selection.set(FacetKey::Relation, entity("Q1"));
        assert!(matches!(result, Err(CofiantError::InvalidValue { .. })));
    }

    #[test]
    fn sentinel_rejected_on_single_facet() {
        let mut selection = Selection::new();
        let result = selection.set(FacetKey::Occupation, FacetValue::Relation(RelationChoice::Any));
        assert!(result.is_err());

        // "any" is a valid identifier shape, so it parses as an entity here
        selection.set_raw(FacetKey::Occupation, "any").expect("set");
        assert!(matches!(
            selection.get(FacetKey::Occupation),
            Some(FacetValue::Entity(_))
        ));
    }

    #[test]
    fn union_facet_accepts_sentinel_and_tokens() {
        let mut selection = Selection::new();
        selection.set_raw(FacetKey::Relation, "ANY").expect("sentinel");
        assert_eq!(
            selection.get(FacetKey::Relation),
            Some(&FacetValue::Relation(RelationChoice::Any))
        );

        selection.set_raw(FacetKey::Relation, "mother").expect("token");
        assert_eq!(
            selection.get(FacetKey::Relation).map(ToString::to_string),
            Some("mother".to_string())
        );

        assert!(selection.set_raw(FacetKey::Relation, "P25").is_err());
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let mut selection = Selection::new();
        selection.set(FacetKey::Gender, entity("Q2")).expect("set");
        let snapshot = selection.snapshot();

        selection.set(FacetKey::Gender, entity("Q3")).expect("set");
        selection.set(FacetKey::BirthPlace, entity("Q12")).expect("set");

        assert_eq!(snapshot.get(FacetKey::Gender), Some(&entity("Q2")));
        assert!(snapshot.get(FacetKey::BirthPlace).is_none());
    }

    #[test]
    fn try_from_raw_fails_on_first_invalid_pair() {
        let selection = Selection::try_from_raw([
            (FacetKey::Gender, "Q6581072"),
            (FacetKey::Relation, "spouse"),
        ])
        .expect("valid pairs");
        assert_eq!(selection.len(), 2);

        let result = Selection::try_from_raw([
            (FacetKey::Gender, "Q6581072"),
            (FacetKey::Relation, "cousin"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn snapshot_iterates_in_declared_order() {
        let mut selection = Selection::new();
        selection.set(FacetKey::BirthPlace, entity("Q12")).expect("set");
        selection.set(FacetKey::Occupation, entity("Q77")).expect("set");
        let keys: Vec<_> = selection.snapshot().iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![FacetKey::Occupation, FacetKey::BirthPlace]);
    }
}
