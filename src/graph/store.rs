//! In-memory ownership graph storage
//!
//! The store is built once from the source document and is read-only
//! afterwards, so it can be shared behind an `Arc` by every derived
//! computation.

use super::link::Link;
use super::node::{Company, Node, NodeKind, Record, Shareholder};
use super::{FxIndexMap, NodeId};
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while loading the source dataset
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Malformed graph document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read graph document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Graph document lacks a top-level `{0}` sequence")]
    MissingSequence(&'static str),

    #[error("Node {index} has no recognized node_type (found {found:?})")]
    UnrecognizedNodeType { index: usize, found: Option<String> },

    #[error("Node {index} is malformed: {source}")]
    InvalidNode {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Link {index} is malformed: {source}")]
    InvalidLink {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Dataset-wide counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStatistics {
    pub companies: usize,
    pub shareholders: usize,
    pub relations: usize,
    pub dangling_links: usize,
}

/// In-memory ownership graph
///
/// Indices:
/// - companies: NodeId -> Company (load order preserved)
/// - shareholders: NodeId -> Shareholder (load order preserved)
/// - by_company: company id -> link positions (incoming adjacency)
/// - by_shareholder: shareholder id -> link positions (outgoing adjacency)
#[derive(Debug, Default)]
pub struct GraphStore {
    /// Node sequence as it appeared in the source
    nodes: Vec<Node>,

    /// Link sequence as it appeared in the source
    links: Vec<Link>,

    companies: FxIndexMap<NodeId, Company>,

    shareholders: FxIndexMap<NodeId, Shareholder>,

    by_company: FxHashMap<NodeId, Vec<usize>>,

    by_shareholder: FxHashMap<NodeId, Vec<usize>>,

    /// Links whose source is not a shareholder or whose target is not a company
    dangling_links: usize,
}

impl GraphStore {
    /// Build a store from already-decoded nodes and links
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        let mut companies = FxIndexMap::default();
        let mut shareholders = FxIndexMap::default();

        for node in &nodes {
            match Record::from(node) {
                Record::Company(c) => {
                    companies.insert(c.id.clone(), c);
                }
                Record::Shareholder(s) => {
                    shareholders.insert(s.id.clone(), s);
                }
            }
        }

        let mut by_company: FxHashMap<NodeId, Vec<usize>> = FxHashMap::default();
        let mut by_shareholder: FxHashMap<NodeId, Vec<usize>> = FxHashMap::default();
        let mut dangling_links = 0;

        for (idx, link) in links.iter().enumerate() {
            by_company.entry(link.target.clone()).or_default().push(idx);
            by_shareholder.entry(link.source.clone()).or_default().push(idx);

            if !shareholders.contains_key(link.source.as_str())
                || !companies.contains_key(link.target.as_str())
            {
                dangling_links += 1;
            }
        }

        if dangling_links > 0 {
            warn!(
                "{} of {} links reference unknown or mistyped endpoints and will be skipped",
                dangling_links,
                links.len()
            );
        }

        GraphStore {
            nodes,
            links,
            companies,
            shareholders,
            by_company,
            by_shareholder,
            dangling_links,
        }
    }

    /// Load a store from a parsed source document
    ///
    /// Fails if `nodes` or `links` is not a top-level sequence, or if a node
    /// lacks a recognized `node_type`.
    pub fn load(document: Value) -> LoadResult<Self> {
        let Value::Object(mut root) = document else {
            return Err(LoadError::MissingSequence("nodes"));
        };

        let raw_nodes = match root.remove("nodes") {
            Some(Value::Array(items)) => items,
            _ => return Err(LoadError::MissingSequence("nodes")),
        };
        let raw_links = match root.remove("links") {
            Some(Value::Array(items)) => items,
            _ => return Err(LoadError::MissingSequence("links")),
        };

        let mut nodes = Vec::with_capacity(raw_nodes.len());
        for (index, raw) in raw_nodes.into_iter().enumerate() {
            let found = raw.get("node_type").and_then(Value::as_str);
            if !found.is_some_and(|t| NodeKind::TYPE_NAMES.contains(&t)) {
                return Err(LoadError::UnrecognizedNodeType {
                    index,
                    found: raw.get("node_type").map(|t| t.to_string()),
                });
            }
            let node = serde_json::from_value(raw)
                .map_err(|source| LoadError::InvalidNode { index, source })?;
            nodes.push(node);
        }

        let mut links = Vec::with_capacity(raw_links.len());
        for (index, raw) in raw_links.into_iter().enumerate() {
            let link = serde_json::from_value(raw)
                .map_err(|source| LoadError::InvalidLink { index, source })?;
            links.push(link);
        }

        let store = Self::new(nodes, links);
        info!(
            "Loaded ownership graph: {} companies, {} shareholders, {} links",
            store.company_count(),
            store.shareholder_count(),
            store.link_count()
        );
        Ok(store)
    }

    pub fn from_json_str(json: &str) -> LoadResult<Self> {
        Self::load(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> LoadResult<Self> {
        Self::load(serde_json::from_reader(reader)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> LoadResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// All nodes in source order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All links in source order
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn company(&self, id: &str) -> Option<&Company> {
        self.companies.get(id)
    }

    pub fn shareholder(&self, id: &str) -> Option<&Shareholder> {
        self.shareholders.get(id)
    }

    /// Companies in load order
    pub fn companies(&self) -> impl Iterator<Item = &Company> {
        self.companies.values()
    }

    /// Shareholders in load order
    pub fn shareholders(&self) -> impl Iterator<Item = &Shareholder> {
        self.shareholders.values()
    }

    /// Links targeting `company_id`, in source order
    pub fn links_for_company<'a>(&'a self, company_id: &str) -> impl Iterator<Item = &'a Link> + 'a {
        self.by_company
            .get(company_id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.links[idx])
    }

    /// Links held by `shareholder_id`, in source order
    pub fn links_for_shareholder<'a>(
        &'a self,
        shareholder_id: &str,
    ) -> impl Iterator<Item = &'a Link> + 'a {
        self.by_shareholder
            .get(shareholder_id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.links[idx])
    }

    /// True when the link's source is a shareholder and its target a company
    pub fn resolves(&self, link: &Link) -> bool {
        self.shareholders.contains_key(link.source.as_str())
            && self.companies.contains_key(link.target.as_str())
    }

    pub fn company_count(&self) -> usize {
        self.companies.len()
    }

    pub fn shareholder_count(&self) -> usize {
        self.shareholders.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn dangling_link_count(&self) -> usize {
        self.dangling_links
    }

    pub fn statistics(&self) -> GraphStatistics {
        GraphStatistics {
            companies: self.company_count(),
            shareholders: self.shareholder_count(),
            relations: self.link_count(),
            dangling_links: self.dangling_links,
        }
    }
}
