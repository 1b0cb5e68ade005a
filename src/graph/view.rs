//! Render-ready graph values
//!
//! [`FilteredGraph`] is the single data shape handed to the rendering layer.
//! It is rebuilt from scratch on every pass and owns its nodes and links.

use super::link::Link;
use super::node::{Node, NodeKind};
use super::types::NodeId;
use crate::merge::{MergeGroup, MergeGroupId};
use rustc_hash::FxHashSet;
use serde::Serialize;

/// A node annotated for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewNode {
    #[serde(flatten)]
    pub node: Node,

    /// Degree in the current view (shareholder nodes only)
    #[serde(rename = "edgeCount", skip_serializing_if = "Option::is_none")]
    pub edge_count: Option<usize>,

    /// Set on the virtual node standing in for a merge group
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub merged: bool,

    #[serde(rename = "mergeGroup", skip_serializing_if = "Option::is_none")]
    pub merge_group: Option<MergeGroupId>,
}

impl ViewNode {
    pub fn company(node: Node) -> Self {
        ViewNode {
            node,
            edge_count: None,
            merged: false,
            merge_group: None,
        }
    }

    pub fn shareholder(node: Node, edge_count: usize) -> Self {
        ViewNode {
            node,
            edge_count: Some(edge_count),
            merged: false,
            merge_group: None,
        }
    }

    /// Virtual shareholder node standing in for every member of `group`
    pub fn merged(group: &MergeGroup, edge_count: usize) -> Self {
        ViewNode {
            node: Node {
                id: group.virtual_node_id(),
                kind: NodeKind::Shareholder {
                    name: group.name.clone(),
                    shareholder_id: None,
                },
            },
            edge_count: Some(edge_count),
            merged: true,
            merge_group: Some(group.id),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.node.id
    }
}

/// One constituent link folded into a merged link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkContribution {
    /// Original shareholder id
    #[serde(rename = "source")]
    pub shareholder: NodeId,
    pub shares: f64,
    pub percentage: f64,
}

/// A link in the current view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewLink {
    pub source: NodeId,
    pub target: NodeId,
    pub shares: f64,
    pub percentage: f64,

    /// Per-shareholder breakdown, populated only on merged links
    #[serde(rename = "originalLinks", skip_serializing_if = "Vec::is_empty")]
    pub original_links: Vec<LinkContribution>,
}

impl ViewLink {
    /// The contributions this link stands for: its breakdown when merged,
    /// otherwise the link itself.
    pub fn contributions(&self) -> Vec<LinkContribution> {
        if self.original_links.is_empty() {
            vec![LinkContribution {
                shareholder: self.source.clone(),
                shares: self.shares,
                percentage: self.percentage,
            }]
        } else {
            self.original_links.clone()
        }
    }
}

impl From<&Link> for ViewLink {
    fn from(link: &Link) -> Self {
        ViewLink {
            source: link.source.clone(),
            target: link.target.clone(),
            shares: link.shares,
            percentage: link.percentage,
            original_links: Vec::new(),
        }
    }
}

/// Node/link subset selected for rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilteredGraph {
    pub nodes: Vec<ViewNode>,
    pub links: Vec<ViewLink>,

    /// Links dropped because an endpoint did not resolve
    #[serde(skip)]
    pub skipped_links: usize,
}

impl FilteredGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&ViewNode> {
        self.nodes.iter().find(|n| n.node.id.as_str() == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Number of links whose source is `id`
    pub fn degree_of(&self, id: &str) -> usize {
        self.links.iter().filter(|l| l.source.as_str() == id).count()
    }

    /// Link endpoints that have no node in the view
    ///
    /// Always empty for graphs produced by the filter and merge engines.
    pub fn missing_endpoints(&self) -> Vec<&NodeId> {
        let present: FxHashSet<&str> = self.nodes.iter().map(|n| n.node.id.as_str()).collect();
        let mut missing = Vec::new();
        for link in &self.links {
            for endpoint in [&link.source, &link.target] {
                if !present.contains(endpoint.as_str()) {
                    missing.push(endpoint);
                }
            }
        }
        missing
    }

    pub fn shareholder_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.node.is_shareholder()).count()
    }

    pub fn company_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.node.is_company()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_node_serialization() {
        let value = serde_json::to_value(ViewNode::shareholder(Node::shareholder("10", "X"), 2)).unwrap();
        assert_eq!(value["edgeCount"], 2);
        assert_eq!(value["node_type"], "shareholder");
        assert!(value.get("merged").is_none());

        let value = serde_json::to_value(ViewNode::company(Node::company("1", "A", "Alpha", 1.0))).unwrap();
        assert!(value.get("edgeCount").is_none());
    }

    #[test]
    fn test_missing_endpoints() {
        let graph = FilteredGraph {
            nodes: vec![ViewNode::company(Node::company("1", "A", "Alpha", 1.0))],
            links: vec![ViewLink::from(&Link::new("10", "1", 5.0, 1.0))],
            skipped_links: 0,
        };

        assert_eq!(graph.missing_endpoints(), vec![&NodeId::from("10")]);
        assert_eq!(graph.degree_of("10"), 1);
    }

    #[test]
    fn test_plain_link_contributes_itself() {
        let link = ViewLink::from(&Link::new("10", "1", 5.0, 1.0));
        let parts = link.contributions();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].shareholder.as_str(), "10");
    }
}
