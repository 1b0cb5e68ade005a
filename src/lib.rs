//! Ownership Explorer
//!
//! Filtering and shareholder-aggregation engine for a company ownership
//! network: a bipartite graph of companies and shareholders whose links carry
//! share counts and ownership percentages.
//!
//! # Architecture
//!
//! The store is loaded once and is read-only afterwards. Every change to the
//! selection state runs a fresh, pure pipeline pass:
//!
//! - `rollup`: one row per shareholder name across the selected companies
//! - `filter`: percentage threshold, top-N or manual shareholder selection,
//!   degree annotations for node sizing
//! - `merge`: session-scoped collapsing of shareholders into virtual nodes
//!
//! The pass yields a referentially complete `{nodes, links}` value for the
//! rendering layer.
//!
//! ## Example Usage
//!
//! ```rust
//! use ownership_explorer::{ExplorerConfig, GraphStore, NodeId, Session, TopN};
//! use std::sync::Arc;
//!
//! let store = GraphStore::from_json_str(r#"{
//!     "nodes": [
//!         {"id": 1, "node_type": "company", "ticker": "A", "name": "Alpha", "total_shares": 10000},
//!         {"id": 10, "node_type": "shareholder", "name": "X"},
//!         {"id": 11, "node_type": "shareholder", "name": "Y"}
//!     ],
//!     "links": [
//!         {"source": 10, "target": 1, "shares": 1000, "percentage": 10},
//!         {"source": 11, "target": 1, "shares": 2000, "percentage": 20}
//!     ]
//! }"#).unwrap();
//!
//! let mut session = Session::new(Arc::new(store), ExplorerConfig::default());
//! session.selection_mut().set_top_n(TopN::Unbounded);
//! session.create_merge("Group1", vec![NodeId::from("10"), NodeId::from("11")]).unwrap();
//!
//! let view = session.view();
//! assert_eq!(view.graph.links.len(), 1);
//! assert_eq!(view.graph.links[0].shares, 3000.0);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod details;
pub mod filter;
pub mod graph;
pub mod merge;
pub mod rollup;
pub mod search;
pub mod selection;
pub mod session;

// Re-export main types for convenience
pub use config::{ConfigError, ExplorerConfig};
pub use details::{NodeDetails, company_details, merged_breakdown, node_details, shareholder_details};
pub use filter::{filter_graph, TopN};
pub use graph::{
    Company, FilteredGraph, FxIndexSet, GraphStatistics, GraphStore, Link, LinkContribution,
    LoadError, LoadResult, Node, NodeId, NodeKind, Shareholder, ViewLink, ViewNode,
};
pub use merge::{
    apply_merges, create_merge, MergeError, MergeGroup, MergeGroupId, MergeRegistry, MergeResult,
};
pub use rollup::{rollup, top_influential, Holding, InfluentialShareholder, Rollup, RollupEntry};
pub use search::{filter_by_search, highlight_match, highlight_match_with, HighlightMarker, MatchMode};
pub use selection::Selection;
pub use session::{Session, View, ViewCommand, ViewStatistics};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
