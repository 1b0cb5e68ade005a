//! Graph filter engine
//!
//! Turns the canonical store plus the selection controls into the node/link
//! subset to render. The pass runs in a fixed order:
//!
//! 1. keep links into selected companies (empty selection yields an empty graph)
//! 2. drop links under `min_percentage` when the threshold is positive
//! 3. count a provisional degree per shareholder, used only for top-N ranking
//! 4. manual mode keeps selected shareholders; automatic mode keeps the top N
//!    by provisional degree (ties keep first-encountered order)
//! 5. recount degree on the surviving links; this final degree sizes nodes
//! 6. emit every shareholder and company referenced by a surviving link
//!
//! Companies without a surviving link are dropped even when selected.

use crate::graph::{FilteredGraph, FxIndexMap, FxIndexSet, GraphStore, Link, NodeId, NodeKind, ViewLink, ViewNode};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use tracing::debug;

/// How many shareholders automatic mode keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TopNRepr", into = "TopNRepr")]
pub enum TopN {
    Limit(NonZeroUsize),
    Unbounded,
}

impl TopN {
    /// `None` for zero
    pub fn new(limit: usize) -> Option<Self> {
        NonZeroUsize::new(limit).map(TopN::Limit)
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            TopN::Limit(n) => Some(n.get()),
            TopN::Unbounded => None,
        }
    }
}

impl Default for TopN {
    fn default() -> Self {
        TopN::Limit(NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN))
    }
}

impl From<NonZeroUsize> for TopN {
    fn from(n: NonZeroUsize) -> Self {
        TopN::Limit(n)
    }
}

impl fmt::Display for TopN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopN::Limit(n) => write!(f, "{}", n),
            TopN::Unbounded => write!(f, "all"),
        }
    }
}

impl FromStr for TopN {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "all" | "unbounded" | "inf" | "infinity" => Ok(TopN::Unbounded),
            other => other
                .parse::<usize>()
                .ok()
                .and_then(TopN::new)
                .ok_or_else(|| format!("top-N must be a positive integer or \"all\", got {:?}", s)),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TopNRepr {
    Count(usize),
    Keyword(String),
}

impl TryFrom<TopNRepr> for TopN {
    type Error = String;

    fn try_from(repr: TopNRepr) -> Result<Self, Self::Error> {
        match repr {
            TopNRepr::Count(n) => TopN::new(n).ok_or_else(|| "top-N must be positive".to_string()),
            TopNRepr::Keyword(s) => s.parse(),
        }
    }
}

impl From<TopN> for TopNRepr {
    fn from(top_n: TopN) -> Self {
        match top_n {
            TopN::Limit(n) => TopNRepr::Count(n.get()),
            TopN::Unbounded => TopNRepr::Keyword("all".to_string()),
        }
    }
}

/// Count links per source id, in first-encountered order
fn degrees<'a>(links: &[&'a Link]) -> FxIndexMap<&'a NodeId, usize> {
    let mut counts: FxIndexMap<&NodeId, usize> = FxIndexMap::default();
    for link in links {
        *counts.entry(&link.source).or_insert(0) += 1;
    }
    counts
}

/// Compute the subgraph to render for the given selection
pub fn filter_graph(
    store: &GraphStore,
    selected_companies: &FxIndexSet<NodeId>,
    selected_shareholders: &FxIndexSet<NodeId>,
    top_n: TopN,
    min_percentage: f64,
) -> FilteredGraph {
    if selected_companies.is_empty() {
        return FilteredGraph::default();
    }

    let mut skipped_links = 0;
    let mut links: Vec<&Link> = Vec::new();
    for link in store.links() {
        if !selected_companies.contains(&link.target) {
            continue;
        }
        if !store.resolves(link) {
            skipped_links += 1;
            continue;
        }
        links.push(link);
    }

    if min_percentage > 0.0 {
        links.retain(|link| link.percentage >= min_percentage);
    }

    let provisional = degrees(&links);

    if !selected_shareholders.is_empty() {
        links.retain(|link| selected_shareholders.contains(&link.source));
        debug!(
            "Manual mode: {} selected shareholders, {} links",
            selected_shareholders.len(),
            links.len()
        );
    } else {
        let mut ranked: Vec<(&NodeId, usize)> = provisional.iter().map(|(id, n)| (*id, *n)).collect();
        // Stable: equal degrees keep first-encountered order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let keep = top_n.limit().unwrap_or(ranked.len());
        let top: FxHashSet<&NodeId> = ranked.into_iter().take(keep).map(|(id, _)| id).collect();

        let before = links.len();
        links.retain(|link| top.contains(&link.source));
        debug!(
            "Auto mode: top {} of {} shareholders, links {} -> {}",
            top_n,
            provisional.len(),
            before,
            links.len()
        );
    }

    let degree = degrees(&links);
    let company_ids: FxHashSet<&NodeId> = links.iter().map(|link| &link.target).collect();

    let mut seen: FxHashSet<&NodeId> = FxHashSet::default();
    let mut nodes = Vec::with_capacity(degree.len() + company_ids.len());
    for node in store.nodes() {
        let view = match &node.kind {
            NodeKind::Shareholder { .. } => match degree.get(&node.id) {
                Some(&count) => ViewNode::shareholder(node.clone(), count),
                None => continue,
            },
            NodeKind::Company { .. } if company_ids.contains(&node.id) => ViewNode::company(node.clone()),
            NodeKind::Company { .. } => continue,
        };
        if seen.insert(&node.id) {
            nodes.push(view);
        }
    }

    let graph = FilteredGraph {
        nodes,
        links: links.into_iter().map(ViewLink::from).collect(),
        skipped_links,
    };

    debug!(
        "Filtered graph: {} nodes ({} shareholders, {} companies), {} links, {} skipped",
        graph.nodes.len(),
        graph.shareholder_count(),
        graph.company_count(),
        graph.links.len(),
        skipped_links
    );

    graph
}
