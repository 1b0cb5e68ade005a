//! Per-node detail views
//!
//! Companies list their largest holders, shareholders list their holdings,
//! and merged virtual nodes list the per-company breakdown of their members.

use crate::graph::{FilteredGraph, GraphStore, LinkContribution, NodeId};
use crate::merge::MergeGroupId;
use crate::rollup::Holding;
use serde::Serialize;

/// Name shown for a holder that does not resolve
pub const UNKNOWN_HOLDER: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HolderRow {
    pub shareholder: NodeId,
    pub name: String,
    pub shares: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetails {
    pub id: NodeId,
    pub ticker: String,
    pub name: String,
    pub total_shares: f64,
    /// Largest holders by shares, descending
    pub holders: Vec<HolderRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareholderDetails {
    pub id: NodeId,
    pub name: String,
    pub shareholder_id: Option<NodeId>,
    /// All holdings by percentage, descending
    pub holdings: Vec<Holding>,
}

/// Combined holding of a merged node in one company
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub company: NodeId,
    pub shares: f64,
    pub percentage: f64,
    pub contributions: Vec<LinkContribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedBreakdown {
    pub id: NodeId,
    pub name: String,
    pub group: MergeGroupId,
    pub rows: Vec<BreakdownRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeDetails {
    Company(CompanyDetails),
    Shareholder(ShareholderDetails),
    Merged(MergedBreakdown),
}

pub fn company_details(store: &GraphStore, id: &str, limit: usize) -> Option<CompanyDetails> {
    let company = store.company(id)?;

    let mut holders: Vec<HolderRow> = store
        .links_for_company(id)
        .map(|link| HolderRow {
            shareholder: link.source.clone(),
            name: store
                .shareholder(link.source.as_str())
                .map(|s| s.name.clone())
                .unwrap_or_else(|| UNKNOWN_HOLDER.to_string()),
            shares: link.shares,
            percentage: link.percentage,
        })
        .collect();
    holders.sort_by(|a, b| b.shares.total_cmp(&a.shares));
    holders.truncate(limit);

    Some(CompanyDetails {
        id: company.id.clone(),
        ticker: company.ticker.clone(),
        name: company.name.clone(),
        total_shares: company.total_shares,
        holders,
    })
}

/// Holdings whose company does not resolve are left out
pub fn shareholder_details(store: &GraphStore, id: &str) -> Option<ShareholderDetails> {
    let holder = store.shareholder(id)?;

    let mut holdings: Vec<Holding> = store
        .links_for_shareholder(id)
        .filter_map(|link| {
            let company = store.company(link.target.as_str())?;
            Some(Holding {
                company: company.id.clone(),
                ticker: company.ticker.clone(),
                name: company.name.clone(),
                shares: link.shares,
                percentage: link.percentage,
            })
        })
        .collect();
    holdings.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

    Some(ShareholderDetails {
        id: holder.id.clone(),
        name: holder.name.clone(),
        shareholder_id: holder.shareholder_id.clone(),
        holdings,
    })
}

/// Breakdown of a merged virtual node in an already merged graph
pub fn merged_breakdown(graph: &FilteredGraph, id: &str) -> Option<MergedBreakdown> {
    let node = graph.node(id).filter(|n| n.merged)?;
    let group = node.merge_group?;

    let rows = graph
        .links
        .iter()
        .filter(|link| link.source.as_str() == id)
        .map(|link| BreakdownRow {
            company: link.target.clone(),
            shares: link.shares,
            percentage: link.percentage,
            contributions: link.contributions(),
        })
        .collect();

    Some(MergedBreakdown {
        id: node.node.id.clone(),
        name: node.node.name().to_string(),
        group,
        rows,
    })
}

/// Details for any node id: store records first, then merged nodes in `graph`
pub fn node_details(
    store: &GraphStore,
    graph: &FilteredGraph,
    id: &str,
    holder_limit: usize,
) -> Option<NodeDetails> {
    if let Some(details) = company_details(store, id, holder_limit) {
        return Some(NodeDetails::Company(details));
    }
    if let Some(details) = shareholder_details(store, id) {
        return Some(NodeDetails::Shareholder(details));
    }
    merged_breakdown(graph, id).map(NodeDetails::Merged)
}
