//! # Core Type Definitions
//!
//! This module contains the shared types of the Cofiant search pipeline:
//! - Identifiers (`EntityId`)
//! - Response language (`Language`)
//! - Error types (`CofiantError`)
//!
//! ## Identifier Safety
//!
//! `EntityId` only admits ASCII alphanumerics, `_` and `-` with a leading
//! letter. User-chosen facet values are embedded into query text, so this is
//! the single gate that keeps selections from injecting query syntax.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// ENTITY IDENTIFIER
// =============================================================================

/// Identifier of an entity in the knowledge graph (e.g. `Q5`, `Q1490`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Parse and validate an identifier.
    pub fn parse(raw: &str) -> Result<Self, CofiantError> {
        let trimmed = raw.trim();
        if is_identifier(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(CofiantError::InvalidIdentifier(raw.to_string()))
        }
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EntityId {
    type Error = CofiantError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Check the identifier shape shared by facet values and URI tail segments.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}

// =============================================================================
// LANGUAGE
// =============================================================================

/// The two supported response languages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Welsh.
    Cy,
}

impl Language {
    /// BCP 47 language tag.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Cy => "cy",
        }
    }

    /// The fallback language for label lookups.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::En => Self::Cy,
            Self::Cy => Self::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CofiantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "cy" => Ok(Self::Cy),
            other => Err(CofiantError::Config(format!("Unsupported language: {other}"))),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Cofiant system.
///
/// - No silent failures (malformed rows are the one documented exception)
/// - Use `Result<T, CofiantError>` for fallible operations
/// - No retries: every error is terminal for the invocation that raised it
#[derive(Debug, Error)]
pub enum CofiantError {
    /// No facet has a value; the search is not executed.
    #[error("No facet selected")]
    SelectionEmpty,

    /// The transport call failed or the endpoint answered with a non-success status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint answered but the payload is not a tabular result set.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A facet key that is not in the registry.
    #[error("Unknown facet: {0}")]
    UnknownFacet(String),

    /// A value that is not a valid identifier.
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A value whose shape does not fit the facet it was set on.
    #[error("Invalid value {value:?} for facet {facet}")]
    InvalidValue {
        /// The facet name.
        facet: String,
        /// The rejected value.
        value: String,
    },

    /// "Previous" requested on the first page.
    #[error("Already on the first page")]
    NoPreviousPage,

    /// "Next" requested when the last search reported no further page.
    #[error("No further page")]
    NoNextPage,

    /// A page change or re-run was requested before any search ran.
    #[error("No previous search to continue")]
    NoPreviousSearch,

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_accepts_wikibase_ids() {
        assert_eq!(EntityId::parse("Q77").expect("parse").as_str(), "Q77");
        assert_eq!(EntityId::parse(" Q12 ").expect("parse").as_str(), "Q12");
    }

    #[test]
    fn entity_id_rejects_query_syntax() {
        for raw in ["", "Q1 .", "Q1}", "wd:Q1", "1Q", "Q1\"", "?x"] {
            assert!(
                matches!(EntityId::parse(raw), Err(CofiantError::InvalidIdentifier(_))),
                "{raw:?} must be rejected"
            );
        }
    }

    #[test]
    fn entity_id_deserialization_validates() {
        let ok: Result<EntityId, _> = serde_json::from_str("\"Q2\"");
        assert!(ok.is_ok());
        let bad: Result<EntityId, _> = serde_json::from_str("\"Q2 } UNION\"");
        assert!(bad.is_err());
    }

    #[test]
    fn language_fallback_is_the_other_language() {
        assert_eq!(Language::En.other(), Language::Cy);
        assert_eq!(Language::Cy.other(), Language::En);
    }

    #[test]
    fn language_parses_case_insensitively() {
        assert_eq!("CY".parse::<Language>().expect("parse"), Language::Cy);
        assert!("fr".parse::<Language>().is_err());
    }
}
