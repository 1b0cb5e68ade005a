//! Ownership links
//!
//! A link is directed from a shareholder to a company and carries the held
//! share count and the percentage of the company's total shares.

use super::types::{deserialize_endpoint, number_or_zero, NodeId};
use serde::{Deserialize, Serialize};

/// A directed ownership link (shareholder -> company)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Shareholder node id
    #[serde(deserialize_with = "deserialize_endpoint")]
    pub source: NodeId,

    /// Company node id
    #[serde(deserialize_with = "deserialize_endpoint")]
    pub target: NodeId,

    /// Number of shares held
    #[serde(default, deserialize_with = "number_or_zero")]
    pub shares: f64,

    /// Percentage (0-100) of the company's total shares
    #[serde(default, deserialize_with = "number_or_zero")]
    pub percentage: f64,
}

impl Link {
    pub fn new(
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        shares: f64,
        percentage: f64,
    ) -> Self {
        Link {
            source: source.into(),
            target: target.into(),
            shares,
            percentage,
        }
    }
}
