//! User selection state
//!
//! Holds the controls that drive each pipeline pass. An empty shareholder
//! selection means automatic top-N mode; any selected shareholder switches to
//! manual mode.

use crate::config::ExplorerConfig;
use crate::filter::TopN;
use crate::graph::{FxIndexSet, GraphStore, NodeId};
use crate::rollup::Rollup;
use crate::search::MatchMode;

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    companies: FxIndexSet<NodeId>,
    shareholders: FxIndexSet<NodeId>,
    top_n: TopN,
    min_percentage: f64,
    match_mode: MatchMode,
    min_percentage_ceiling: f64,
}

impl Selection {
    /// Empty selection with the configured defaults
    pub fn new(config: &ExplorerConfig) -> Self {
        Selection {
            companies: FxIndexSet::default(),
            shareholders: FxIndexSet::default(),
            top_n: config.default_top_n,
            min_percentage: 0.0,
            match_mode: MatchMode::Substring,
            min_percentage_ceiling: config.min_percentage_ceiling,
        }
    }

    /// Selection right after load: the first company is pre-selected when
    /// the config asks for it
    pub fn initial(store: &GraphStore, config: &ExplorerConfig) -> Self {
        let mut selection = Self::new(config);
        if config.select_first_company {
            if let Some(first) = store.companies().next() {
                selection.companies.insert(first.id.clone());
            }
        }
        selection
    }

    pub fn companies(&self) -> &FxIndexSet<NodeId> {
        &self.companies
    }

    pub fn shareholders(&self) -> &FxIndexSet<NodeId> {
        &self.shareholders
    }

    pub fn top_n(&self) -> TopN {
        self.top_n
    }

    pub fn min_percentage(&self) -> f64 {
        self.min_percentage
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn is_manual(&self) -> bool {
        !self.shareholders.is_empty()
    }

    /// Returns true if the company is selected afterwards
    pub fn toggle_company(&mut self, id: impl Into<NodeId>) -> bool {
        toggle(&mut self.companies, id.into())
    }

    pub fn select_all_companies(&mut self, store: &GraphStore) {
        self.companies = store.companies().map(|c| c.id.clone()).collect();
    }

    /// Clears the shareholder selection too
    pub fn clear_companies(&mut self) {
        self.companies.clear();
        self.shareholders.clear();
    }

    /// Add a company without toggling; returns false if already selected
    pub fn select_company(&mut self, id: impl Into<NodeId>) -> bool {
        self.companies.insert(id.into())
    }

    /// Add a shareholder without toggling; returns false if already selected
    pub fn select_shareholder(&mut self, id: impl Into<NodeId>) -> bool {
        self.shareholders.insert(id.into())
    }

    /// Returns true if the shareholder is selected afterwards
    pub fn toggle_shareholder(&mut self, id: impl Into<NodeId>) -> bool {
        toggle(&mut self.shareholders, id.into())
    }

    /// Select every shareholder listed in `rollup`
    pub fn select_all_shareholders(&mut self, rollup: &Rollup) {
        self.shareholders = rollup.ids().cloned().collect();
    }

    pub fn clear_shareholders(&mut self) {
        self.shareholders.clear();
    }

    pub fn set_top_n(&mut self, top_n: TopN) {
        self.top_n = top_n;
    }

    /// Clamped to `0..=ceiling`; NaN resets to 0
    ///
    /// A negative or NaN ceiling acts as 0.
    pub fn set_min_percentage(&mut self, value: f64) {
        let ceiling = self.min_percentage_ceiling.max(0.0);
        self.min_percentage = if value.is_nan() {
            0.0
        } else {
            value.max(0.0).min(ceiling)
        };
    }

    pub fn set_match_mode(&mut self, mode: MatchMode) {
        self.match_mode = mode;
    }
}

fn toggle(set: &mut FxIndexSet<NodeId>, id: NodeId) -> bool {
    if set.shift_remove(&id) {
        false
    } else {
        set.insert(id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Link, Node};
    use crate::rollup::rollup;

    fn store() -> GraphStore {
        GraphStore::new(
            vec![
                Node::company("1", "A", "Alpha", 1.0),
                Node::company("2", "B", "Beta", 1.0),
                Node::shareholder("10", "X"),
                Node::shareholder("11", "Y"),
            ],
            vec![Link::new("10", "1", 5.0, 1.0), Link::new("11", "1", 9.0, 2.0)],
        )
    }

    #[test]
    fn test_initial_selects_first_company() {
        let selection = Selection::initial(&store(), &ExplorerConfig::default());
        let ids: Vec<&str> = selection.companies().iter().map(|c| c.as_str()).collect();
        assert_eq!(ids, vec!["1"]);

        let config = ExplorerConfig {
            select_first_company: false,
            ..ExplorerConfig::default()
        };
        assert!(Selection::initial(&store(), &config).companies().is_empty());
    }

    #[test]
    fn test_toggles() {
        let mut selection = Selection::new(&ExplorerConfig::default());
        assert!(selection.toggle_company("2"));
        assert!(selection.toggle_company("1"));
        assert!(!selection.toggle_company("2"));
        assert_eq!(selection.companies().len(), 1);

        assert!(!selection.is_manual());
        selection.toggle_shareholder("10");
        assert!(selection.is_manual());
        selection.clear_companies();
        assert!(selection.companies().is_empty());
        assert!(!selection.is_manual());
    }

    #[test]
    fn test_select_all() {
        let store = store();
        let mut selection = Selection::new(&ExplorerConfig::default());
        selection.select_all_companies(&store);
        assert_eq!(selection.companies().len(), 2);

        let rolled = rollup(&store, selection.companies());
        selection.select_all_shareholders(&rolled);
        let ids: Vec<&str> = selection.shareholders().iter().map(|s| s.as_str()).collect();
        assert_eq!(ids, vec!["11", "10"]);

        selection.clear_shareholders();
        assert!(selection.shareholders().is_empty());
    }

    #[test]
    fn test_min_percentage_clamped() {
        let mut selection = Selection::new(&ExplorerConfig::default());
        selection.set_min_percentage(75.0);
        assert_eq!(selection.min_percentage(), 50.0);
        selection.set_min_percentage(-3.0);
        assert_eq!(selection.min_percentage(), 0.0);
        selection.set_min_percentage(f64::NAN);
        assert_eq!(selection.min_percentage(), 0.0);
        selection.set_min_percentage(12.5);
        assert_eq!(selection.min_percentage(), 12.5);
    }

    #[test]
    fn test_min_percentage_with_unvalidated_ceiling() {
        for ceiling in [-1.0, f64::NAN] {
            let config = ExplorerConfig {
                min_percentage_ceiling: ceiling,
                ..ExplorerConfig::default()
            };
            let mut selection = Selection::new(&config);
            selection.set_min_percentage(5.0);
            assert_eq!(selection.min_percentage(), 0.0);
            selection.set_min_percentage(-5.0);
            assert_eq!(selection.min_percentage(), 0.0);
        }
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut selection = Selection::new(&ExplorerConfig::default());
        assert!(selection.select_company("1"));
        assert!(!selection.select_company("1"));
        assert_eq!(selection.companies().len(), 1);

        assert!(selection.select_shareholder("10"));
        assert!(!selection.select_shareholder("10"));
        assert_eq!(selection.shareholders().len(), 1);
        assert!(selection.is_manual());
    }
}
