//! # Result Projector
//!
//! Two independent, side-effect-free transforms over the same deduplicated
//! rows:
//!
//! - **List**: one `ResultRecord` per row.
//! - **Graph**: a typed multigraph with one node per distinct entity id and
//!   one edge per (row, present relation).
//!
//! Both use `extract_entity_id` for identity, so a subject that appears in
//! the list and the graph carries the same id in both.

use crate::registry::Relation;
use crate::rows::RawRow;
use crate::types::is_identifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// IDENTIFIER EXTRACTION
// =============================================================================

/// Stable display identifier of an entity IRI.
///
/// The trailing segment after the last `/` or `#` is used when it looks like
/// an identifier (leading ASCII letter, then alphanumerics, `_` or `-`);
/// otherwise the full IRI is returned unchanged.
#[must_use]
pub fn extract_entity_id(uri: &str) -> String {
    let tail = uri
        .trim_end_matches('/')
        .rsplit(['/', '#'])
        .next()
        .unwrap_or_default();
    if is_identifier(tail) {
        tail.to_string()
    } else {
        uri.to_string()
    }
}

// =============================================================================
// LIST PROJECTION
// =============================================================================

/// One entry of the list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Entity identifier.
    pub id: String,
    /// Label to display (falls back to the identifier).
    pub display_label: String,
    /// Localized description (empty if unbound).
    pub description: String,
}

/// Project rows into list records. Rows without a subject are skipped.
#[must_use]
pub fn project_list(rows: &[RawRow]) -> Vec<ResultRecord> {
    rows.iter()
        .filter_map(|row| {
            let uri = row.person.as_deref()?;
            let id = extract_entity_id(uri);
            Some(ResultRecord {
                display_label: row.person_label.clone().unwrap_or_else(|| id.clone()),
                description: row.description.clone().unwrap_or_default(),
                id,
            })
        })
        .collect()
}

// =============================================================================
// GRAPH PROJECTION
// =============================================================================

/// Role of a node in the result graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeCategory {
    /// A search result.
    Subject,
    /// An occupation.
    Occupation,
    /// A place of education.
    Education,
    /// A place of birth.
    BirthPlace,
    /// A place of death.
    DeathPlace,
}

impl From<Relation> for NodeCategory {
    fn from(relation: Relation) -> Self {
        match relation {
            Relation::Occupation => Self::Occupation,
            Relation::Education => Self::Education,
            Relation::BirthPlace => Self::BirthPlace,
            Relation::DeathPlace => Self::DeathPlace,
        }
    }
}

/// A node of the result graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Entity identifier (node identity).
    pub id: String,
    /// First-seen label.
    pub label: String,
    /// First-seen category.
    pub category: NodeCategory,
}

/// A typed edge from a subject to a related entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Subject node id.
    pub source: String,
    /// Related node id.
    pub target: String,
    /// Relation type.
    pub relation: Relation,
}

/// Nodes and edges of one search, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultGraph {
    /// Distinct nodes.
    pub nodes: Vec<GraphNode>,
    /// Edges; parallel edges are kept.
    pub edges: Vec<GraphEdge>,
}

impl ResultGraph {
    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges ending at a node.
    #[must_use]
    pub fn in_degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.target == id).count()
    }
}

/// Accumulates nodes with first-seen-wins identity.
#[derive(Debug, Default)]
struct GraphBuilder {
    graph: ResultGraph,
    seen: BTreeSet<String>,
}

impl GraphBuilder {
    fn ensure_node(&mut self, id: &str, label: Option<&str>, category: NodeCategory) {
        if !self.seen.insert(id.to_string()) {
            return;
        }
        self.graph.nodes.push(GraphNode {
            id: id.to_string(),
            label: label.unwrap_or(id).to_string(),
            category,
        });
    }

    fn finish(self) -> ResultGraph {
        self.graph
    }
}

/// Project rows into a typed multigraph.
///
/// Rows without a subject are skipped. An entity that is the relation target
/// of several subjects collapses into one node with several incoming edges.
#[must_use]
pub fn project_graph(rows: &[RawRow]) -> ResultGraph {
    let mut builder = GraphBuilder::default();

    for row in rows {
        let Some(uri) = row.person.as_deref() else {
            continue;
        };
        let subject = extract_entity_id(uri);
        builder.ensure_node(&subject, row.person_label.as_deref(), NodeCategory::Subject);

        for relation in Relation::ALL {
            let Some(binding) = row.related(relation) else {
                continue;
            };
            let target = extract_entity_id(&binding.uri);
            builder.ensure_node(&target, binding.label.as_deref(), relation.into());
            builder.graph.edges.push(GraphEdge {
                source: subject.clone(),
                target,
                relation,
            });
        }
    }

    builder.finish()
}

// =============================================================================
// TESTS
// =============================================================================
