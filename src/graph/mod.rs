//! Ownership graph data model
//!
//! This module implements the bipartite company/shareholder graph:
//! - Company and shareholder nodes with type-specific fields
//! - Directed ownership links (shareholder -> company) with shares and percentage
//! - A read-only in-memory store with O(1) id lookups and adjacency lists
//! - The render-ready `FilteredGraph` produced by each pipeline pass

pub mod link;
pub mod node;
pub mod store;
pub mod types;
pub mod view;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;

/// Insertion-ordered map keyed with the fast non-cryptographic hasher
pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Insertion-ordered set keyed with the fast non-cryptographic hasher
pub type FxIndexSet<K> = IndexSet<K, FxBuildHasher>;

// Re-export main types
pub use link::Link;
pub use node::{Company, Node, NodeKind, Shareholder};
pub use store::{GraphStatistics, GraphStore, LoadError, LoadResult};
pub use types::NodeId;
pub use view::{FilteredGraph, LinkContribution, ViewLink, ViewNode};
