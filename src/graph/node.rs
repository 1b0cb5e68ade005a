//! Company and shareholder nodes
//!
//! A node is immutable once loaded. Per-pass annotations such as degree live
//! on [`ViewNode`](super::view::ViewNode), never on the canonical record.

use super::types::{number_or_zero, NodeId};
use serde::{Deserialize, Serialize};

/// A node in the ownership graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Type-specific payload, tagged by `node_type` on the wire
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// The two node types of the bipartite ownership graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_type", rename_all = "lowercase")]
pub enum NodeKind {
    Company {
        #[serde(default)]
        ticker: String,
        #[serde(default)]
        name: String,
        #[serde(default, deserialize_with = "number_or_zero")]
        total_shares: f64,
    },
    Shareholder {
        #[serde(default)]
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shareholder_id: Option<NodeId>,
    },
}

impl NodeKind {
    /// Wire names accepted in the `node_type` field
    pub const TYPE_NAMES: [&'static str; 2] = ["company", "shareholder"];
}

impl Node {
    /// Create a company node
    pub fn company(
        id: impl Into<NodeId>,
        ticker: impl Into<String>,
        name: impl Into<String>,
        total_shares: f64,
    ) -> Self {
        Node {
            id: id.into(),
            kind: NodeKind::Company {
                ticker: ticker.into(),
                name: name.into(),
                total_shares,
            },
        }
    }

    /// Create a shareholder node without an external registry id
    pub fn shareholder(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            kind: NodeKind::Shareholder {
                name: name.into(),
                shareholder_id: None,
            },
        }
    }

    pub fn is_company(&self) -> bool {
        matches!(self.kind, NodeKind::Company { .. })
    }

    pub fn is_shareholder(&self) -> bool {
        matches!(self.kind, NodeKind::Shareholder { .. })
    }

    /// Display name of the node
    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Company { name, .. } | NodeKind::Shareholder { name, .. } => name,
        }
    }

    /// Ticker, for company nodes
    pub fn ticker(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Company { ticker, .. } => Some(ticker),
            NodeKind::Shareholder { .. } => None,
        }
    }
}

/// Company record held in the store's company index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    pub id: NodeId,
    pub ticker: String,
    pub name: String,
    pub total_shares: f64,
}

/// Shareholder record held in the store's shareholder index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shareholder {
    pub id: NodeId,
    pub name: String,
    pub shareholder_id: Option<NodeId>,
}

/// Index record for a node, split by type
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Record {
    Company(Company),
    Shareholder(Shareholder),
}

impl From<&Node> for Record {
    fn from(node: &Node) -> Self {
        match &node.kind {
            NodeKind::Company {
                ticker,
                name,
                total_shares,
            } => Record::Company(Company {
                id: node.id.clone(),
                ticker: ticker.clone(),
                name: name.clone(),
                total_shares: *total_shares,
            }),
            NodeKind::Shareholder {
                name,
                shareholder_id,
            } => Record::Shareholder(Shareholder {
                id: node.id.clone(),
                name: name.clone(),
                shareholder_id: shareholder_id.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_company() {
        let node: Node = serde_json::from_str(
            r#"{"id": 1, "node_type": "company", "ticker": "ABC", "name": "Abc PLC", "total_shares": 5000}"#,
        )
        .unwrap();

        assert!(node.is_company());
        assert_eq!(node.id.as_str(), "1");
        assert_eq!(node.ticker(), Some("ABC"));
        assert_eq!(node.name(), "Abc PLC");
        match node.kind {
            NodeKind::Company { total_shares, .. } => assert_eq!(total_shares, 5000.0),
            _ => panic!("expected company"),
        }
    }

    #[test]
    fn test_decode_shareholder() {
        let node: Node = serde_json::from_str(
            r#"{"id": "s-10", "node_type": "shareholder", "name": "Fund X", "shareholder_id": 991}"#,
        )
        .unwrap();

        assert!(node.is_shareholder());
        assert_eq!(node.ticker(), None);
        match node.kind {
            NodeKind::Shareholder { shareholder_id, .. } => {
                assert_eq!(shareholder_id, Some(NodeId::from("991")))
            }
            _ => panic!("expected shareholder"),
        }
    }

    #[test]
    fn test_serialize_keeps_node_type_tag() {
        let value = serde_json::to_value(Node::shareholder("10", "X")).unwrap();
        assert_eq!(value["node_type"], "shareholder");
        assert_eq!(value["id"], "10");
        assert!(value.get("shareholder_id").is_none());
    }

    #[test]
    fn test_record_split() {
        match Record::from(&Node::company("1", "A", "Alpha", 10.0)) {
            Record::Company(c) => assert_eq!(c.ticker, "A"),
            Record::Shareholder(_) => panic!("expected company record"),
        }
    }
}
