//! # Terminal Output
//!
//! Text and JSON adapters for `SearchOutcome`. The text renderer draws one
//! view (list or graph), then the summary, then any message.

use cofiant_core::{
    CapabilityReport, ErrorKind, FallbackPolicy, GraphEdge, GraphNode, Renderer, ResultRecord,
    SearchOutcome, ViewMode, resolve_view,
};
use std::collections::BTreeMap;

/// Collects the text rendering of one outcome.
#[derive(Debug)]
pub struct TextRenderer {
    view: ViewMode,
    lines: Vec<String>,
}

impl TextRenderer {
    pub fn new(view: ViewMode) -> Self {
        Self {
            view,
            lines: Vec::new(),
        }
    }

    /// The rendered text.
    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

impl Renderer for TextRenderer {
    fn on_list_results(&mut self, records: &[ResultRecord]) {
        if self.view != ViewMode::List {
            return;
        }
        for (i, record) in records.iter().enumerate() {
            let mut line = format!("{:>3}. {} ({})", i + 1, record.display_label, record.id);
            if !record.description.is_empty() {
                line.push_str(" - ");
                line.push_str(&record.description);
            }
            self.lines.push(line);
        }
    }

    fn on_graph_results(&mut self, nodes: &[GraphNode], edges: &[GraphEdge]) {
        if self.view != ViewMode::Graph || nodes.is_empty() {
            return;
        }
        let labels: BTreeMap<&str, &str> = nodes
            .iter()
            .map(|node| (node.id.as_str(), node.label.as_str()))
            .collect();
        let label = |id: &str| labels.get(id).copied().unwrap_or_default().to_string();

        self.lines
            .push(format!("Graph: {} nodes, {} edges", nodes.len(), edges.len()));
        for edge in edges {
            self.lines.push(format!(
                "  {} ({}) -[{}]-> {} ({})",
                label(&edge.source),
                edge.source,
                edge.relation,
                label(&edge.target),
                edge.target
            ));
        }
    }

    fn on_summary(&mut self, visible_count: usize, has_more: bool, page_index: u32) {
        if visible_count == 0 {
            return;
        }
        let more = if has_more { ", more available" } else { "" };
        self.lines
            .push(format!("Page {page_index}: {visible_count} shown{more}"));
    }

    fn on_error(&mut self, kind: ErrorKind, message: &str) {
        if kind.is_failure() {
            self.lines.push(format!("Error: {message}"));
        } else {
            self.lines.push(message.to_string());
        }
    }
}

/// Pick the view to draw, falling back to what the host supports.
pub fn choose_view(report: &CapabilityReport, requested: ViewMode) -> ViewMode {
    match resolve_view(report, requested, FallbackPolicy::Fallback) {
        Ok(view) => {
            if view != requested {
                tracing::info!("View '{requested}' unavailable, showing '{view}'");
            }
            view
        }
        Err(e) => {
            tracing::warn!("{e}; showing the list view");
            ViewMode::List
        }
    }
}

/// Render an outcome as text or pretty JSON.
pub fn format_outcome(outcome: &SearchOutcome, view: ViewMode, json_mode: bool) -> String {
    if json_mode {
        return serde_json::to_string_pretty(outcome).unwrap_or_default();
    }
    let mut renderer = TextRenderer::new(view);
    outcome.render(&mut renderer);
    renderer.finish()
}

// =============================================================================
// TESTS
// =============================================================================
