//! Explorer session
//!
//! Ties the read-only store to the mutable session state (selection and merge
//! groups) and runs the rollup -> filter -> merge pipeline. Every call to
//! [`Session::view`] recomputes from scratch; a caller that triggers a new
//! pass before consuming the previous one just drops the stale value.
//!
//! The rendering layer can attach a command channel to receive view
//! commands such as zoom reset.

use crate::config::ExplorerConfig;
use crate::details::{node_details, NodeDetails};
use crate::filter::filter_graph;
use crate::graph::{Company, FilteredGraph, GraphStore, NodeId};
use crate::merge::{MergeGroup, MergeGroupId, MergeRegistry, MergeResult};
use crate::rollup::{rollup, top_influential, InfluentialShareholder, Rollup, RollupEntry};
use crate::search::{filter_by_search, highlight_match_with};
use crate::selection::Selection;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Commands sent from the host to the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    ResetZoom,
}

/// Dataset totals and visible counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewStatistics {
    pub companies: usize,
    pub shareholders: usize,
    pub relations: usize,
    pub visible_nodes: usize,
    pub visible_links: usize,
}

/// Output of one pipeline pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub rollup: Rollup,
    pub graph: FilteredGraph,
    pub stats: ViewStatistics,
}

pub struct Session {
    store: Arc<GraphStore>,
    config: ExplorerConfig,
    selection: Selection,
    merges: MergeRegistry,
    view_commands: Option<UnboundedSender<ViewCommand>>,
}

impl Session {
    /// Start a session over a loaded store with the initial selection
    pub fn new(store: Arc<GraphStore>, config: ExplorerConfig) -> Self {
        let selection = Selection::initial(&store, &config);
        Session {
            store,
            config,
            selection,
            merges: MergeRegistry::new(),
            view_commands: None,
        }
    }

    /// Start a session with a view command channel attached
    pub fn with_view_commands(
        store: Arc<GraphStore>,
        config: ExplorerConfig,
    ) -> (Self, UnboundedReceiver<ViewCommand>) {
        let (tx, rx) = unbounded_channel();
        let mut session = Self::new(store, config);
        session.view_commands = Some(tx);
        (session, rx)
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn merges(&self) -> &MergeRegistry {
        &self.merges
    }

    pub fn create_merge(
        &mut self,
        name: &str,
        shareholder_ids: impl IntoIterator<Item = NodeId>,
    ) -> MergeResult<MergeGroupId> {
        self.merges.create(name, shareholder_ids).map(|group| group.id)
    }

    pub fn delete_merge(&mut self, id: MergeGroupId) -> MergeResult<MergeGroup> {
        self.merges.delete(id)
    }

    pub fn rollup(&self) -> Rollup {
        rollup(&self.store, self.selection.companies())
    }

    /// Filtered graph before merge groups are applied
    pub fn filtered_graph(&self) -> FilteredGraph {
        filter_graph(
            &self.store,
            self.selection.companies(),
            self.selection.shareholders(),
            self.selection.top_n(),
            self.selection.min_percentage(),
        )
    }

    /// Filtered graph with merge groups applied
    pub fn graph(&self) -> FilteredGraph {
        self.merges.apply(self.filtered_graph())
    }

    /// Run the full pipeline
    pub fn view(&self) -> View {
        let rollup = self.rollup();
        let graph = self.graph();
        let totals = self.store.statistics();

        let stats = ViewStatistics {
            companies: totals.companies,
            shareholders: totals.shareholders,
            relations: totals.relations,
            visible_nodes: graph.nodes.len(),
            visible_links: graph.links.len(),
        };
        debug!(
            "View: {} rollup rows, {} nodes, {} links",
            rollup.len(),
            stats.visible_nodes,
            stats.visible_links
        );

        View { rollup, graph, stats }
    }

    pub fn top_influential(&self) -> Vec<InfluentialShareholder> {
        top_influential(
            &self.store,
            self.selection.companies(),
            self.config.top_influential_limit,
        )
    }

    /// Details for a company, shareholder or merged node in the current view
    pub fn details(&self, id: &str) -> Option<NodeDetails> {
        node_details(&self.store, &self.graph(), id, self.config.details_holder_limit)
    }

    pub fn select_all_companies(&mut self) {
        self.selection.select_all_companies(&self.store);
    }

    /// Select every shareholder in the current rollup
    pub fn select_all_shareholders(&mut self) {
        let rolled = self.rollup();
        self.selection.select_all_shareholders(&rolled);
    }

    /// Companies whose ticker or name matches `term`
    pub fn search_companies(&self, term: &str) -> Vec<&Company> {
        filter_by_search(
            self.store.companies(),
            term,
            self.selection.match_mode(),
            |c| format!("{} {}", c.ticker, c.name),
        )
    }

    /// Rollup rows whose name matches `term`
    pub fn search_shareholders(&self, term: &str) -> Vec<RollupEntry> {
        filter_by_search(
            self.rollup().entries,
            term,
            self.selection.match_mode(),
            |e| e.name.clone(),
        )
    }

    /// Highlight `term` in `text` using the session's match mode and marker
    pub fn highlight(&self, text: &str, term: &str) -> String {
        highlight_match_with(text, term, self.selection.match_mode(), &self.config.highlight)
    }

    /// Ask the rendering layer to reset its zoom
    ///
    /// Returns false when no channel is attached or the receiver is gone.
    pub fn reset_view(&self) -> bool {
        match &self.view_commands {
            Some(tx) => tx.send(ViewCommand::ResetZoom).is_ok(),
            None => false,
        }
    }
}
