//! # Facet Registry
//!
//! Static description of every supported facet.
//!
//! The registry is a table, not a dispatcher: each `FacetKey` maps to one
//! `FacetDefinition` holding its graph predicate(s) and the local list that
//! backs its autocomplete. Call sites look the descriptor up once and read
//! its fields; nothing branches on facet name strings.
//!
//! ## Declared Order
//!
//! | Key | Kind | Predicate | Local list |
//! |-----|------|-----------|------------|
//! | gender | single | P21 | genders |
//! | occupation | single | P106 | occupations |
//! | education | single | P69 | institutions |
//! | birthPlace | single | P19 | places |
//! | deathPlace | single | P20 | places |
//! | relation | union | P22 P25 P26 P3373 P40 P1038 | relations |
//!
//! Query constraints are emitted in this order.

use crate::CofiantError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// FACET KEYS
// =============================================================================

/// Identifying key of a facet. Discriminants follow the declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacetKey {
    /// Gender of the subject.
    Gender = 0,
    /// Occupation of the subject.
    Occupation = 1,
    /// Place of education.
    Education = 2,
    /// Place of birth.
    BirthPlace = 3,
    /// Place of death.
    DeathPlace = 4,
    /// Family relation (multi-valued union facet).
    Relation = 5,
}

impl FacetKey {
    /// All keys in declared order.
    pub const ALL: [FacetKey; 6] = [
        FacetKey::Gender,
        FacetKey::Occupation,
        FacetKey::Education,
        FacetKey::BirthPlace,
        FacetKey::DeathPlace,
        FacetKey::Relation,
    ];

    /// Boundary name of the facet.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Occupation => "occupation",
            Self::Education => "education",
            Self::BirthPlace => "birthPlace",
            Self::DeathPlace => "deathPlace",
            Self::Relation => "relation",
        }
    }

    /// The static descriptor of this facet.
    #[must_use]
    pub fn definition(self) -> &'static FacetDefinition {
        &FACETS[self as usize]
    }
}

impl fmt::Display for FacetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FacetKey {
    type Err = CofiantError;

    /// Accepts `birthPlace`, `birth_place`, `birth-place` and `birthplace`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        FacetKey::ALL
            .into_iter()
            .find(|key| key.name().to_ascii_lowercase() == folded)
            .ok_or_else(|| CofiantError::UnknownFacet(s.to_string()))
    }
}

// =============================================================================
// LOCAL LISTS
// =============================================================================

/// Name of a preloaded local lookup list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKey {
    /// Gender values.
    Genders,
    /// Occupations.
    Occupations,
    /// Educational institutions.
    Institutions,
    /// Places (shared by birth and death place).
    Places,
    /// Relation tokens of the union facet.
    Relations,
}

impl ListKey {
    /// All lists.
    pub const ALL: [ListKey; 5] = [
        ListKey::Genders,
        ListKey::Occupations,
        ListKey::Institutions,
        ListKey::Places,
        ListKey::Relations,
    ];

    /// File stem of the list on disk (`<stem>.json`).
    #[must_use]
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::Genders => "genders",
            Self::Occupations => "occupations",
            Self::Institutions => "institutions",
            Self::Places => "places",
            Self::Relations => "relations",
        }
    }

    /// Large lists need a longer prefix before autocomplete opens.
    #[must_use]
    pub const fn is_large(self) -> bool {
        matches!(self, Self::Places)
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

// =============================================================================
// FACET DEFINITIONS
// =============================================================================

/// One predicate of the union facet's closed set.
#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RelationMember {
    /// Selection token (`father`, `spouse`, ...).
    pub token: &'static str,
    /// Graph predicate id.
    pub predicate: &'static str,
    /// English label.
    pub label_en: &'static str,
    /// Welsh label.
    pub label_cy: &'static str,
}

/// How a facet constrains the subject.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FacetKind {
    /// Binds the subject through one predicate to the chosen entity.
    Single {
        /// Graph predicate id.
        predicate: &'static str,
    },
    /// Binds the subject through one (or any) of a closed predicate set.
    Union {
        /// The closed predicate set, in emission order.
        members: &'static [RelationMember],
    },
}

/// Immutable descriptor of a facet.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct FacetDefinition {
    /// Identifying key.
    pub key: FacetKey,
    /// Constraint shape.
    #[serde(flatten)]
    pub kind: FacetKind,
    /// Backing local list.
    pub list: ListKey,
}

impl FacetDefinition {
    /// Resolve a relation token within this facet's closed set.
    ///
    /// Always `None` for single-valued facets.
    #[must_use]
    pub fn member(&self, token: &str) -> Option<&'static RelationMember> {
        match self.kind {
            FacetKind::Union { members } => members
                .iter()
                .find(|m| m.token.eq_ignore_ascii_case(token.trim())),
            FacetKind::Single { .. } => None,
        }
    }

    /// Whether this is the multi-valued union facet.
    #[must_use]
    pub const fn is_union(&self) -> bool {
        matches!(self.kind, FacetKind::Union { .. })
    }
}

/// Closed predicate set of the relation facet.
pub const RELATION_MEMBERS: &[RelationMember] = &[
    RelationMember {
        token: "father",
        predicate: "P22",
        label_en: "father",
        label_cy: "tad",
    },
    RelationMember {
        token: "mother",
        predicate: "P25",
        label_en: "mother",
        label_cy: "mam",
    },
    RelationMember {
        token: "spouse",
        predicate: "P26",
        label_en: "spouse",
        label_cy: "priod",
    },
    RelationMember {
        token: "sibling",
        predicate: "P3373",
        label_en: "sibling",
        label_cy: "brawd neu chwaer",
    },
    RelationMember {
        token: "child",
        predicate: "P40",
        label_en: "child",
        label_cy: "plentyn",
    },
    RelationMember {
        token: "relative",
        predicate: "P1038",
        label_en: "relative",
        label_cy: "perthynas",
    },
];

const OCCUPATION_PREDICATE: &str = "P106";
const EDUCATION_PREDICATE: &str = "P69";
const BIRTH_PLACE_PREDICATE: &str = "P19";
const DEATH_PLACE_PREDICATE: &str = "P20";

/// The facet table, indexed by `FacetKey` discriminant.
static FACETS: [FacetDefinition; 6] = [
    FacetDefinition {
        key: FacetKey::Gender,
        kind: FacetKind::Single { predicate: "P21" },
        list: ListKey::Genders,
    },
    FacetDefinition {
        key: FacetKey::Occupation,
        kind: FacetKind::Single {
            predicate: OCCUPATION_PREDICATE,
        },
        list: ListKey::Occupations,
    },
    FacetDefinition {
        key: FacetKey::Education,
        kind: FacetKind::Single {
            predicate: EDUCATION_PREDICATE,
        },
        list: ListKey::Institutions,
    },
    FacetDefinition {
        key: FacetKey::BirthPlace,
        kind: FacetKind::Single {
            predicate: BIRTH_PLACE_PREDICATE,
        },
        list: ListKey::Places,
    },
    FacetDefinition {
        key: FacetKey::DeathPlace,
        kind: FacetKind::Single {
            predicate: DEATH_PLACE_PREDICATE,
        },
        list: ListKey::Places,
    },
    FacetDefinition {
        key: FacetKey::Relation,
        kind: FacetKind::Union {
            members: RELATION_MEMBERS,
        },
        list: ListKey::Relations,
    },
];

// =============================================================================
// DISPLAY RELATIONS
// =============================================================================

/// The four related-entity fields requested (optionally) for every subject.
///
/// They drive both the optional bindings of the query and the edge types of
/// the graph projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    /// Occupation.
    Occupation,
    /// Place of education.
    Education,
    /// Place of birth.
    BirthPlace,
    /// Place of death.
    DeathPlace,
}

impl Relation {
    /// All relations in emission order.
    pub const ALL: [Relation; 4] = [
        Relation::Occupation,
        Relation::Education,
        Relation::BirthPlace,
        Relation::DeathPlace,
    ];

    /// The facet sharing this relation's predicate.
    #[must_use]
    pub const fn facet(self) -> FacetKey {
        match self {
            Self::Occupation => FacetKey::Occupation,
            Self::Education => FacetKey::Education,
            Self::BirthPlace => FacetKey::BirthPlace,
            Self::DeathPlace => FacetKey::DeathPlace,
        }
    }

    /// Graph predicate id, shared with the facet of the same name.
    #[must_use]
    pub const fn predicate(self) -> &'static str {
        match self {
            Self::Occupation => OCCUPATION_PREDICATE,
            Self::Education => EDUCATION_PREDICATE,
            Self::BirthPlace => BIRTH_PLACE_PREDICATE,
            Self::DeathPlace => DEATH_PLACE_PREDICATE,
        }
    }

    /// Query variable bound to the related entity.
    #[must_use]
    pub const fn variable(self) -> &'static str {
        match self {
            Self::Occupation => "occupation",
            Self::Education => "education",
            Self::BirthPlace => "birthPlace",
            Self::DeathPlace => "deathPlace",
        }
    }

    /// Query variable bound to the related entity's label.
    #[must_use]
    pub const fn label_variable(self) -> &'static str {
        match self {
            Self::Occupation => "occupationLabel",
            Self::Education => "educationLabel",
            Self::BirthPlace => "birthPlaceLabel",
            Self::DeathPlace => "deathPlaceLabel",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variable())
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Read-only view over the facet table.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacetRegistry;

impl FacetRegistry {
    /// The standard registry.
    #[must_use]
    pub const fn standard() -> Self {
        Self
    }

    /// Descriptor for a key.
    #[must_use]
    pub fn definition(&self, key: FacetKey) -> &'static FacetDefinition {
        key.definition()
    }

    /// Descriptor for a boundary name.
    pub fn lookup(&self, name: &str) -> Result<&'static FacetDefinition, CofiantError> {
        name.parse::<FacetKey>().map(FacetKey::definition)
    }

    /// All descriptors in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &'static FacetDefinition> {
        FACETS.iter()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_key() {
        for key in FacetKey::ALL {
            assert_eq!(key.definition().key, key);
        }
    }

    #[test]
    fn iteration_follows_declared_order() {
        let keys: Vec<_> = FacetRegistry::standard().iter().map(|d| d.key).collect();
        assert_eq!(keys, FacetKey::ALL.to_vec());
    }

    #[test]
    fn facet_names_roundtrip() {
        for key in FacetKey::ALL {
            assert_eq!(key.name().parse::<FacetKey>().expect("parse"), key);
        }
        assert_eq!(
            "birth_place".parse::<FacetKey>().expect("parse"),
            FacetKey::BirthPlace
        );
        assert!(matches!(
            "eyeColour".parse::<FacetKey>(),
            Err(CofiantError::UnknownFacet(_))
        ));
    }

    #[test]
    fn place_facets_share_the_large_list() {
        assert_eq!(FacetKey::BirthPlace.definition().list, ListKey::Places);
        assert_eq!(FacetKey::DeathPlace.definition().list, ListKey::Places);
        assert!(ListKey::Places.is_large());
        assert!(!ListKey::Occupations.is_large());
    }

    #[test]
    fn only_relation_facet_is_union() {
        for def in FacetRegistry::standard().iter() {
            assert_eq!(def.is_union(), def.key == FacetKey::Relation);
        }
    }

    #[test]
    fn relation_member_lookup() {
        let def = FacetKey::Relation.definition();
        assert_eq!(def.member("Spouse").map(|m| m.predicate), Some("P26"));
        assert!(def.member("cousin").is_none());
        assert!(FacetKey::Gender.definition().member("father").is_none());
    }

    #[test]
    fn display_relations_reuse_facet_predicates() {
        assert_eq!(Relation::Occupation.predicate(), "P106");
        assert_eq!(Relation::Education.predicate(), "P69");
        assert_eq!(Relation::BirthPlace.predicate(), "P19");
        assert_eq!(Relation::DeathPlace.predicate(), "P20");
    }

    #[test]
    fn display_relation_predicates_match_their_facets() {
        for relation in Relation::ALL {
            assert_eq!(
                relation.facet().definition().kind,
                FacetKind::Single {
                    predicate: relation.predicate()
                }
            );
        }
    }
}
