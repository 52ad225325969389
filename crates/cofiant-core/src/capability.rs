//! # Render Capabilities
//!
//! Which result views the host can actually draw, reported once at startup.
//!
//! The core never switches views on its own. `RenderCapabilities::detect`
//! returns a `CapabilityReport`; the caller picks a `FallbackPolicy` and asks
//! `resolve_view` what to show.
//!
//! | Policy | Requested view unavailable |
//! |--------|----------------------------|
//! | `Fallback` | first available view |
//! | `Strict` | `ViewUnavailable` |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// VIEW MODE
// =============================================================================

/// A result view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Flat list of records.
    #[default]
    List,
    /// Node/edge relationship graph.
    Graph,
}

impl ViewMode {
    /// All views, preferred first.
    pub const ALL: [ViewMode; 2] = [ViewMode::List, ViewMode::Graph];

    /// Boundary name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Graph => "graph",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewMode {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(Self::List),
            "graph" => Ok(Self::Graph),
            other => Err(CapabilityError::UnknownView(other.to_string())),
        }
    }
}

// =============================================================================
// DETECTION
// =============================================================================

/// Errors of view resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The view name is not recognized.
    #[error("Unknown view: {0}")]
    UnknownView(String),

    /// The requested view cannot be drawn and the policy forbids fallback.
    #[error("View {0} is not available")]
    ViewUnavailable(ViewMode),

    /// No view at all can be drawn.
    #[error("No result view is available")]
    NothingAvailable,
}

/// Host facts the report is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderCapabilities {
    /// A text or record list can be drawn.
    pub list: bool,
    /// A graph renderer is present.
    pub graph: bool,
}

impl Default for RenderCapabilities {
    fn default() -> Self {
        Self {
            list: true,
            graph: true,
        }
    }
}

impl RenderCapabilities {
    /// Build the report for a host.
    ///
    /// `graph_renderer` is whatever the host knows about its optional graph
    /// library; the list view is always drawable.
    #[must_use]
    pub fn detect(graph_renderer: bool) -> CapabilityReport {
        Self {
            list: true,
            graph: graph_renderer,
        }
        .report()
    }

    /// Report for these exact facts.
    #[must_use]
    pub fn report(self) -> CapabilityReport {
        let available = ViewMode::ALL
            .into_iter()
            .filter(|view| self.supports(*view))
            .collect();
        CapabilityReport {
            capabilities: self,
            available,
        }
    }

    /// Whether a view can be drawn.
    #[must_use]
    pub const fn supports(self, view: ViewMode) -> bool {
        match view {
            ViewMode::List => self.list,
            ViewMode::Graph => self.graph,
        }
    }
}

/// Startup capability report handed to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityReport {
    /// Detected facts.
    pub capabilities: RenderCapabilities,
    /// Drawable views, preferred first.
    pub available: Vec<ViewMode>,
}

impl CapabilityReport {
    /// Whether a view can be drawn.
    #[must_use]
    pub fn supports(&self, view: ViewMode) -> bool {
        self.capabilities.supports(view)
    }

    /// Preferred drawable view.
    #[must_use]
    pub fn preferred(&self) -> Option<ViewMode> {
        self.available.first().copied()
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// What to do when the requested view cannot be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Use the preferred drawable view instead.
    #[default]
    Fallback,
    /// Report the requested view as unavailable.
    Strict,
}

/// Decide which view to draw.
pub fn resolve_view(
    report: &CapabilityReport,
    requested: ViewMode,
    policy: FallbackPolicy,
) -> Result<ViewMode, CapabilityError> {
    if report.supports(requested) {
        return Ok(requested);
    }
    match policy {
        FallbackPolicy::Strict => Err(CapabilityError::ViewUnavailable(requested)),
        FallbackPolicy::Fallback => report.preferred().ok_or(CapabilityError::NothingAvailable),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_host_draws_what_is_asked() {
        let report = RenderCapabilities::detect(true);
        assert_eq!(report.available, vec![ViewMode::List, ViewMode::Graph]);
        assert_eq!(
            resolve_view(&report, ViewMode::Graph, FallbackPolicy::Strict),
            Ok(ViewMode::Graph)
        );
    }

    #[test]
    fn missing_graph_falls_back_to_list() {
        let report = RenderCapabilities::detect(false);
        assert_eq!(
            resolve_view(&report, ViewMode::Graph, FallbackPolicy::Fallback),
            Ok(ViewMode::List)
        );
    }

    #[test]
    fn strict_policy_reports_the_gap() {
        let report = RenderCapabilities::detect(false);
        assert_eq!(
            resolve_view(&report, ViewMode::Graph, FallbackPolicy::Strict),
            Err(CapabilityError::ViewUnavailable(ViewMode::Graph))
        );
    }

    #[test]
    fn nothing_drawable() {
        let report = RenderCapabilities {
            list: false,
            graph: false,
        }
        .report();
        assert_eq!(
            resolve_view(&report, ViewMode::List, FallbackPolicy::Fallback),
            Err(CapabilityError::NothingAvailable)
        );
    }

    #[test]
    fn view_names_round_trip_through_from_str() {
        for view in ViewMode::ALL {
            assert_eq!(view.name().parse::<ViewMode>(), Ok(view));
        }
        assert!("map".parse::<ViewMode>().is_err());
    }
}
