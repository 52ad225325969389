//! # cofiant-core
//!
//! The faceted search pipeline of Cofiant - THE LOGIC.
//!
//! This crate turns facet selections into a paginated, deduplicated result
//! set rendered as a list and as a relationship graph:
//!
//! ```text
//! Selection -> Query Builder -> (transport, app layer) -> Deduplicator
//!           -> Pagination -> Result Projector -> Renderer
//! ```
//!
//! The local facet index feeds autocomplete only; it never touches the
//! query path.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Is pure: every operation is a function of its inputs
//! - Has NO async, NO network, NO logging side effects
//! - Never formats output; presentation lives behind `Renderer`
//! - Owns no ambient state; `SearchSession` is held by the caller

// =============================================================================
// MODULES
// =============================================================================

pub mod capability;
pub mod dedupe;
pub mod formats;
pub mod index;
pub mod outcome;
pub mod pagination;
pub mod primitives;
pub mod projection;
pub mod query;
pub mod registry;
pub mod rows;
pub mod selection;
pub mod session;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CofiantError, EntityId, Language, is_identifier};

// =============================================================================
// RE-EXPORTS: Facets
// =============================================================================

pub use index::{FacetEntry, LocalFacetIndex, Suggestions, min_query_chars};
pub use registry::{
    FacetDefinition, FacetKey, FacetKind, FacetRegistry, ListKey, Relation, RelationMember,
};
pub use selection::{FacetValue, RelationChoice, Selection, SelectionSnapshot, UNION_SENTINEL};

// =============================================================================
// RE-EXPORTS: Search Pipeline
// =============================================================================

pub use dedupe::{dedupe, dropped_count};
pub use outcome::{ErrorKind, Renderer, SearchOutcome, Summary, process};
pub use pagination::{Page, PageWindow, Pagination, window};
pub use projection::{
    GraphEdge, GraphNode, NodeCategory, ResultGraph, ResultRecord, extract_entity_id,
    project_graph, project_list,
};
pub use query::{SearchRequest, build_query};
pub use rows::{QueryResults, RawRow, RelatedBinding, Term, TermKind};
pub use session::{SearchSession, SearchStep, SearchTicket};

// =============================================================================
// RE-EXPORTS: Capabilities & Formats
// =============================================================================

pub use capability::{
    CapabilityError, CapabilityReport, FallbackPolicy, RenderCapabilities, ViewMode, resolve_view,
};
pub use formats::{BundleHeader, index_checksum, index_from_bytes, index_to_bytes};

#[cfg(feature = "crypto-hash")]
pub use formats::{bundle_digest, verify_bundle_digest};
