//! Session-scoped shareholder merging
//!
//! A merge group collapses two or more shareholder ids into one virtual node
//! under a user-supplied name. Groups live only for the session.
//!
//! Groups form a partition refinement over shareholder ids: an id belongs to
//! at most one active group. [`MergeRegistry`] enforces this through its
//! member -> group mapping. The free function [`apply_merges`] accepts an
//! arbitrary slice of groups and expects the caller to uphold the same
//! precondition; on overlap the first group listing an id wins.

use crate::graph::{FilteredGraph, FxIndexMap, LinkContribution, NodeId, ViewLink, ViewNode};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::fmt;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Prefix of virtual node ids
pub const MERGED_NODE_PREFIX: &str = "merged:";

/// Errors raised when creating or deleting merge groups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("Merge name must not be blank")]
    BlankName,

    #[error("A merge needs at least 2 distinct shareholders, got {count}")]
    TooFewMembers { count: usize },

    #[error("Shareholder {shareholder} already belongs to merge group {group}")]
    AlreadyMerged {
        shareholder: NodeId,
        group: MergeGroupId,
    },

    #[error("Merge group {0} not found")]
    UnknownGroup(MergeGroupId),
}

pub type MergeResult<T> = Result<T, MergeError>;

/// Unique identifier for a merge group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MergeGroupId(Uuid);

impl MergeGroupId {
    pub fn new() -> Self {
        MergeGroupId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MergeGroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MergeGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named set of shareholders shown as one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeGroup {
    pub id: MergeGroupId,
    pub name: String,
    #[serde(rename = "shareholderIds")]
    pub shareholder_ids: Vec<NodeId>,
}

impl MergeGroup {
    /// Id of the virtual node that replaces the members
    pub fn virtual_node_id(&self) -> NodeId {
        NodeId::from(format!("{}{}", MERGED_NODE_PREFIX, self.id))
    }

    pub fn contains(&self, shareholder: &str) -> bool {
        self.shareholder_ids.iter().any(|id| id.as_str() == shareholder)
    }
}

/// Validate and build a new merge group
///
/// The name is trimmed and must not be blank. Duplicate ids are dropped
/// (first occurrence kept) and at least two distinct ids must remain.
pub fn create_merge(
    name: &str,
    shareholder_ids: impl IntoIterator<Item = NodeId>,
) -> MergeResult<MergeGroup> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MergeError::BlankName);
    }

    let mut seen = FxHashSet::default();
    let members: Vec<NodeId> = shareholder_ids
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect();
    if members.len() < 2 {
        return Err(MergeError::TooFewMembers {
            count: members.len(),
        });
    }

    Ok(MergeGroup {
        id: MergeGroupId::new(),
        name: name.to_string(),
        shareholder_ids: members,
    })
}

/// Active merge groups of a session
///
/// Keeps a member -> group mapping so membership checks are O(1) and the
/// disjointness of groups is enforced on creation.
#[derive(Debug, Clone, Default)]
pub struct MergeRegistry {
    groups: FxIndexMap<MergeGroupId, MergeGroup>,
    membership: FxHashMap<NodeId, MergeGroupId>,
}

impl MergeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group; fails without side effects on invalid input or when a
    /// member already belongs to another group
    pub fn create(
        &mut self,
        name: &str,
        shareholder_ids: impl IntoIterator<Item = NodeId>,
    ) -> MergeResult<&MergeGroup> {
        let group = create_merge(name, shareholder_ids)?;

        for member in &group.shareholder_ids {
            if let Some(existing) = self.membership.get(member) {
                return Err(MergeError::AlreadyMerged {
                    shareholder: member.clone(),
                    group: *existing,
                });
            }
        }

        for member in &group.shareholder_ids {
            self.membership.insert(member.clone(), group.id);
        }
        debug!(
            "Created merge group {} ({:?}) with {} members",
            group.id,
            group.name,
            group.shareholder_ids.len()
        );

        let id = group.id;
        Ok(&*self.groups.entry(id).or_insert(group))
    }

    /// Remove a group; its members show individually again on the next pass
    pub fn delete(&mut self, id: MergeGroupId) -> MergeResult<MergeGroup> {
        let group = self
            .groups
            .shift_remove(&id)
            .ok_or(MergeError::UnknownGroup(id))?;
        for member in &group.shareholder_ids {
            self.membership.remove(member);
        }
        debug!("Deleted merge group {} ({:?})", group.id, group.name);
        Ok(group)
    }

    pub fn get(&self, id: MergeGroupId) -> Option<&MergeGroup> {
        self.groups.get(&id)
    }

    /// Group the shareholder belongs to, if any
    pub fn group_of(&self, shareholder: &str) -> Option<&MergeGroup> {
        self.membership
            .get(shareholder)
            .and_then(|id| self.groups.get(id))
    }

    /// Groups in creation order
    pub fn groups(&self) -> impl Iterator<Item = &MergeGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Collapse every active group in `graph`
    pub fn apply(&self, graph: FilteredGraph) -> FilteredGraph {
        let owners: FxHashMap<&NodeId, &MergeGroup> = self
            .membership
            .iter()
            .filter_map(|(member, id)| self.groups.get(id).map(|group| (member, group)))
            .collect();
        collapse(graph, &owners)
    }
}

/// Collapse each group's members in `graph` into one virtual node
///
/// Links from members are redirected to the virtual node; links that then
/// share a (virtual source, target) pair are combined by summing `shares` and
/// `percentage`, and each constituent is kept in `original_links`. The
/// virtual node's `edge_count` is the number of combined links it sources.
/// Shareholders outside every group pass through unchanged.
pub fn apply_merges(graph: FilteredGraph, groups: &[MergeGroup]) -> FilteredGraph {
    let mut owners: FxHashMap<&NodeId, &MergeGroup> = FxHashMap::default();
    for group in groups {
        for member in &group.shareholder_ids {
            owners.entry(member).or_insert(group);
        }
    }
    collapse(graph, &owners)
}

fn collapse(graph: FilteredGraph, owners: &FxHashMap<&NodeId, &MergeGroup>) -> FilteredGraph {
    if owners.is_empty() {
        return graph;
    }

    let FilteredGraph {
        nodes,
        links,
        skipped_links,
    } = graph;

    let mut merged_links: Vec<ViewLink> = Vec::with_capacity(links.len());
    let mut combined: FxHashMap<(NodeId, NodeId), usize> = FxHashMap::default();
    let mut virtual_degree: FxHashMap<MergeGroupId, usize> = FxHashMap::default();

    for link in links {
        let Some(group) = owners.get(&link.source) else {
            merged_links.push(link);
            continue;
        };

        let contributions = link.contributions();
        let virtual_id = group.virtual_node_id();
        match combined.entry((virtual_id.clone(), link.target.clone())) {
            Entry::Occupied(slot) => {
                let existing = &mut merged_links[*slot.get()];
                existing.shares += link.shares;
                existing.percentage += link.percentage;
                existing.original_links.extend(contributions);
            }
            Entry::Vacant(slot) => {
                slot.insert(merged_links.len());
                *virtual_degree.entry(group.id).or_insert(0) += 1;
                merged_links.push(ViewLink {
                    source: virtual_id,
                    target: link.target,
                    shares: link.shares,
                    percentage: link.percentage,
                    original_links: contributions,
                });
            }
        }
    }

    let mut emitted: FxHashSet<MergeGroupId> = FxHashSet::default();
    let mut merged_nodes = Vec::with_capacity(nodes.len());
    for node in nodes {
        match owners.get(node.id()) {
            Some(group) if node.node.is_shareholder() => {
                if emitted.insert(group.id) {
                    let degree = virtual_degree.get(&group.id).copied().unwrap_or(0);
                    merged_nodes.push(ViewNode::merged(group, degree));
                }
            }
            _ => merged_nodes.push(node),
        }
    }

    debug!(
        "Applied {} merge groups: {} nodes, {} links",
        emitted.len(),
        merged_nodes.len(),
        merged_links.len()
    );

    FilteredGraph {
        nodes: merged_nodes,
        links: merged_links,
        skipped_links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Link, Node};

    fn ids(values: &[&str]) -> Vec<NodeId> {
        values.iter().map(|v| NodeId::from(*v)).collect()
    }

    fn graph() -> FilteredGraph {
        FilteredGraph {
            nodes: vec![
                ViewNode::company(Node::company("1", "A", "Alpha", 10_000.0)),
                ViewNode::company(Node::company("2", "B", "Beta", 10_000.0)),
                ViewNode::shareholder(Node::shareholder("10", "X"), 2),
                ViewNode::shareholder(Node::shareholder("11", "Y"), 1),
                ViewNode::shareholder(Node::shareholder("12", "Z"), 1),
            ],
            links: vec![
                ViewLink::from(&Link::new("10", "1", 1000.0, 10.0)),
                ViewLink::from(&Link::new("10", "2", 500.0, 5.0)),
                ViewLink::from(&Link::new("11", "1", 2000.0, 20.0)),
                ViewLink::from(&Link::new("12", "2", 50.0, 0.5)),
            ],
            skipped_links: 0,
        }
    }

    #[test]
    fn test_create_merge_validation() {
        assert_eq!(create_merge("   ", ids(&["10", "11"])), Err(MergeError::BlankName));
        assert_eq!(
            create_merge("G", ids(&["10"])),
            Err(MergeError::TooFewMembers { count: 1 })
        );
        assert_eq!(
            create_merge("G", ids(&["10", "10"])),
            Err(MergeError::TooFewMembers { count: 1 })
        );

        let group = create_merge("  Group1 ", ids(&["10", "11"])).unwrap();
        assert_eq!(group.name, "Group1");
        assert_eq!(group.shareholder_ids, ids(&["10", "11"]));
        assert!(group.virtual_node_id().as_str().starts_with(MERGED_NODE_PREFIX));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = create_merge("G", ids(&["10", "11"])).unwrap();
        let b = create_merge("G", ids(&["10", "11"])).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_apply_merges_combines_links() {
        let group = create_merge("Group1", ids(&["10", "11"])).unwrap();
        let virtual_id = group.virtual_node_id();
        let merged = apply_merges(graph(), std::slice::from_ref(&group));

        assert!(merged.missing_endpoints().is_empty());
        assert!(!merged.contains_node("10"));
        assert!(!merged.contains_node("11"));
        assert!(merged.contains_node("12"));

        let node = merged.node(virtual_id.as_str()).unwrap();
        assert!(node.merged);
        assert_eq!(node.merge_group, Some(group.id));
        assert_eq!(node.node.name(), "Group1");
        assert_eq!(node.edge_count, Some(2));

        let to_a = merged
            .links
            .iter()
            .find(|l| l.source == virtual_id && l.target.as_str() == "1")
            .unwrap();
        assert_eq!(to_a.shares, 3000.0);
        assert_eq!(to_a.percentage, 30.0);
        let parts: Vec<(&str, f64)> = to_a
            .original_links
            .iter()
            .map(|c| (c.shareholder.as_str(), c.shares))
            .collect();
        assert_eq!(parts, vec![("10", 1000.0), ("11", 2000.0)]);

        assert_eq!(merged.links.len(), 3);
    }

    #[test]
    fn test_no_groups_passes_through() {
        assert_eq!(apply_merges(graph(), &[]), graph());
    }

    #[test]
    fn test_registry_enforces_disjoint_groups() {
        let mut registry = MergeRegistry::new();
        let first = registry.create("G1", ids(&["10", "11"])).unwrap().id;

        let err = registry.create("G2", ids(&["12", "11"])).unwrap_err();
        assert_eq!(
            err,
            MergeError::AlreadyMerged {
                shareholder: NodeId::from("11"),
                group: first,
            }
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.group_of("12").is_none());
        assert_eq!(registry.group_of("11").unwrap().id, first);
    }

    #[test]
    fn test_registry_delete_restores_members() {
        let mut registry = MergeRegistry::new();
        let id = registry.create("G1", ids(&["10", "11"])).unwrap().id;

        let deleted = registry.delete(id).unwrap();
        assert_eq!(deleted.name, "G1");
        assert!(registry.is_empty());
        assert!(registry.group_of("10").is_none());
        assert_eq!(registry.apply(graph()), graph());
        assert_eq!(registry.delete(id), Err(MergeError::UnknownGroup(id)));

        // Members are free to join a new group
        assert!(registry.create("G2", ids(&["10", "12"])).is_ok());
    }

    #[test]
    fn test_registry_apply_leaves_other_groups() {
        let mut registry = MergeRegistry::new();
        registry.create("G1", ids(&["10", "11"])).unwrap();
        let second = registry.create("G2", ids(&["12", "404"])).unwrap().id;

        let merged = registry.apply(graph());
        assert_eq!(merged.nodes.iter().filter(|n| n.merged).count(), 2);

        registry.delete(second).unwrap();
        let merged = registry.apply(graph());
        assert_eq!(merged.nodes.iter().filter(|n| n.merged).count(), 1);
        assert!(merged.contains_node("12"));
    }
}
