//! Shareholder rollup engine
//!
//! Aggregates the holders of the selected companies into one row per
//! shareholder. Rows are keyed by display **name**, not id: two ids sharing a
//! name fold into one row. `percentage` is taken from the first link seen for
//! a name and never updated, so it is only meaningful for shareholders that
//! hold exactly one selected company.
//!
//! [`top_influential`] is the id-keyed companion ranking used by the
//! "most influential" listing.

use crate::graph::{FxIndexMap, FxIndexSet, GraphStore, NodeId};
use indexmap::map::Entry;
use serde::Serialize;
use tracing::debug;

/// One aggregated shareholder row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupEntry {
    /// Id of the first shareholder seen under this name
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "shareholderId", skip_serializing_if = "Option::is_none")]
    pub shareholder_id: Option<NodeId>,
    /// Sum across selected companies
    pub shares: f64,
    /// From the first link seen only
    pub percentage: f64,
    /// Tickers held, in processing order
    pub companies: Vec<String>,
}

/// Result of a rollup pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rollup {
    pub entries: Vec<RollupEntry>,

    /// Links skipped because an endpoint did not resolve
    #[serde(skip)]
    pub skipped_links: usize,
}

impl Rollup {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RollupEntry> {
        self.entries.iter()
    }

    /// Entry ids, in rank order
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.entries.iter().map(|e| &e.id)
    }
}

impl<'a> IntoIterator for &'a Rollup {
    type Item = &'a RollupEntry;
    type IntoIter = std::slice::Iter<'a, RollupEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Aggregate all holders of the selected companies
///
/// Companies are processed in selection order and links in source order.
/// The result is sorted by accumulated shares, descending; ties keep
/// processing order.
pub fn rollup(store: &GraphStore, selected_companies: &FxIndexSet<NodeId>) -> Rollup {
    let mut by_name: FxIndexMap<&str, RollupEntry> = FxIndexMap::default();
    let mut skipped_links = 0;

    for company_id in selected_companies {
        let Some(company) = store.company(company_id.as_str()) else {
            skipped_links += store.links_for_company(company_id.as_str()).count();
            continue;
        };

        for link in store.links_for_company(company_id.as_str()) {
            let Some(holder) = store.shareholder(link.source.as_str()) else {
                skipped_links += 1;
                continue;
            };

            match by_name.entry(holder.name.as_str()) {
                Entry::Occupied(mut slot) => {
                    let entry = slot.get_mut();
                    entry.shares += link.shares;
                    entry.companies.push(company.ticker.clone());
                }
                Entry::Vacant(slot) => {
                    slot.insert(RollupEntry {
                        id: holder.id.clone(),
                        name: holder.name.clone(),
                        shareholder_id: holder.shareholder_id.clone(),
                        shares: link.shares,
                        percentage: link.percentage,
                        companies: vec![company.ticker.clone()],
                    });
                }
            }
        }
    }

    let mut entries: Vec<RollupEntry> = by_name.into_values().collect();
    entries.sort_by(|a, b| b.shares.total_cmp(&a.shares));

    debug!(
        "Rollup over {} companies: {} shareholders, {} skipped links",
        selected_companies.len(),
        entries.len(),
        skipped_links
    );

    Rollup {
        entries,
        skipped_links,
    }
}

/// A single holding of a shareholder in a company
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub company: NodeId,
    pub ticker: String,
    pub name: String,
    pub shares: f64,
    pub percentage: f64,
}

/// Shareholder ranked by how many selected companies it holds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluentialShareholder {
    pub id: NodeId,
    pub name: String,
    pub company_count: usize,
    pub total_shares: f64,
    pub holdings: Vec<Holding>,
}

/// Rank holders of the selected companies by company count
///
/// Grouped by shareholder id, links visited in source order, sorted by
/// `company_count` descending (ties keep first-encountered order) and cut to
/// `limit`.
pub fn top_influential(
    store: &GraphStore,
    selected_companies: &FxIndexSet<NodeId>,
    limit: usize,
) -> Vec<InfluentialShareholder> {
    if selected_companies.is_empty() {
        return Vec::new();
    }

    let mut by_id: FxIndexMap<&NodeId, InfluentialShareholder> = FxIndexMap::default();
    for link in store.links() {
        if !selected_companies.contains(&link.target) {
            continue;
        }
        let (Some(holder), Some(company)) = (
            store.shareholder(link.source.as_str()),
            store.company(link.target.as_str()),
        ) else {
            continue;
        };

        let row = by_id
            .entry(&link.source)
            .or_insert_with(|| InfluentialShareholder {
                id: holder.id.clone(),
                name: holder.name.clone(),
                company_count: 0,
                total_shares: 0.0,
                holdings: Vec::new(),
            });
        row.company_count += 1;
        row.total_shares += link.shares;
        row.holdings.push(Holding {
            company: company.id.clone(),
            ticker: company.ticker.clone(),
            name: company.name.clone(),
            shares: link.shares,
            percentage: link.percentage,
        });
    }

    let mut ranked: Vec<InfluentialShareholder> = by_id.into_values().collect();
    ranked.sort_by(|a, b| b.company_count.cmp(&a.company_count));
    ranked.truncate(limit);
    ranked
}
