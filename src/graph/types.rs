//! Core type definitions for the ownership graph

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique identifier for a node
///
/// Source datasets emit ids either as strings or as integers; both decode to
/// the same textual form so `1` and `"1"` name the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id.to_string())
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(s) => NodeId(s),
            Repr::Unsigned(n) => NodeId(n.to_string()),
            Repr::Signed(n) => NodeId(n.to_string()),
        })
    }
}

/// Decode a link endpoint that is either a bare id or a record carrying `id`
pub(crate) fn deserialize_endpoint<'de, D>(deserializer: D) -> Result<NodeId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Endpoint {
        Bare(NodeId),
        Record { id: NodeId },
    }

    Ok(match Endpoint::deserialize(deserializer)? {
        Endpoint::Bare(id) => id,
        Endpoint::Record { id } => id,
    })
}

/// Missing and `null` quantities read as zero
pub(crate) fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}
