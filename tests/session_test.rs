use ownership_explorer::{
    ExplorerConfig, GraphStore, MatchMode, MergeError, NodeDetails, NodeId, Session, TopN,
    ViewCommand,
};
use std::sync::Arc;

fn store() -> Arc<GraphStore> {
    let store = GraphStore::from_json_str(
        r#"{
            "nodes": [
                {"id": 1, "node_type": "company", "ticker": "AAA", "name": "Alpha Holdings", "total_shares": 10000},
                {"id": 2, "node_type": "company", "ticker": "BBB", "name": "Beta Mining", "total_shares": 10000},
                {"id": 10, "node_type": "shareholder", "name": "Xavier Fund"},
                {"id": 11, "node_type": "shareholder", "name": "Yarra Trust"},
                {"id": 12, "node_type": "shareholder", "name": "Zed Capital"}
            ],
            "links": [
                {"source": 10, "target": 1, "shares": 1000, "percentage": 10},
                {"source": 10, "target": 2, "shares": 500, "percentage": 5},
                {"source": 11, "target": 1, "shares": 2000, "percentage": 20},
                {"source": 12, "target": 2, "shares": 4000, "percentage": 40}
            ]
        }"#,
    )
    .unwrap();
    Arc::new(store)
}

#[test]
fn test_first_company_selected_on_load() {
    let session = Session::new(store(), ExplorerConfig::default());
    let view = session.view();

    assert_eq!(session.selection().companies().len(), 1);
    assert_eq!(view.rollup.len(), 2);
    assert_eq!(view.graph.company_count(), 1);
    assert_eq!(view.stats.relations, 4);
    assert_eq!(view.stats.visible_links, 2);
}

#[test]
fn test_negative_ceiling_does_not_panic() {
    let config = ExplorerConfig {
        min_percentage_ceiling: -1.0,
        ..ExplorerConfig::default()
    };
    assert!(config.validate().is_err());

    let mut session = Session::new(store(), config);
    session.selection_mut().set_min_percentage(5.0);
    assert_eq!(session.selection().min_percentage(), 0.0);
    assert_eq!(session.view().stats.visible_links, 2);
}

#[test]
fn test_selection_drives_view() {
    let mut session = Session::new(store(), ExplorerConfig::default());
    session.select_all_companies();
    session.selection_mut().set_top_n(TopN::new(1).unwrap());

    let view = session.view();
    assert_eq!(view.graph.shareholder_count(), 1);
    assert!(view.graph.contains_node("10"));

    session.selection_mut().set_min_percentage(30.0);
    let view = session.view();
    assert_eq!(view.graph.links.len(), 1);
    assert!(view.graph.contains_node("12"));

    session.selection_mut().set_min_percentage(0.0);
    session.selection_mut().toggle_shareholder("11");
    let view = session.view();
    assert_eq!(view.graph.links.len(), 1);
    assert_eq!(view.graph.links[0].source.as_str(), "11");

    session.selection_mut().clear_companies();
    assert!(session.view().graph.is_empty());
    assert!(session.view().rollup.is_empty());
}

#[test]
fn test_select_all_shareholders_from_rollup() {
    let mut session = Session::new(store(), ExplorerConfig::default());
    session.select_all_companies();
    session.select_all_shareholders();

    assert!(session.selection().is_manual());
    assert_eq!(session.selection().shareholders().len(), 3);
    assert_eq!(session.view().graph.links.len(), 4);
}

#[test]
fn test_merge_lifecycle() {
    let mut session = Session::new(store(), ExplorerConfig::default());
    session.select_all_companies();
    session.selection_mut().set_top_n(TopN::Unbounded);

    let id = session
        .create_merge("Funds", vec![NodeId::from("10"), NodeId::from("11")])
        .unwrap();
    assert_eq!(
        session.create_merge(" ", vec![NodeId::from("10"), NodeId::from("12")]),
        Err(MergeError::BlankName)
    );
    assert_eq!(session.merges().len(), 1);

    let view = session.view();
    assert_eq!(view.graph.shareholder_count(), 2);
    let virtual_id = session.merges().get(id).unwrap().virtual_node_id();
    match session.details(virtual_id.as_str()) {
        Some(NodeDetails::Merged(breakdown)) => {
            assert_eq!(breakdown.name, "Funds");
            assert_eq!(breakdown.rows.len(), 2);
        }
        other => panic!("expected merged details, got {other:?}"),
    }

    session.delete_merge(id).unwrap();
    assert_eq!(session.view().graph.shareholder_count(), 3);
    assert!(session.details(virtual_id.as_str()).is_none());
}

#[test]
fn test_details_for_records() {
    let session = Session::new(store(), ExplorerConfig::default());

    match session.details("1") {
        Some(NodeDetails::Company(company)) => {
            assert_eq!(company.ticker, "AAA");
            assert_eq!(company.holders[0].name, "Yarra Trust");
        }
        other => panic!("expected company details, got {other:?}"),
    }
    match session.details("10") {
        Some(NodeDetails::Shareholder(holder)) => assert_eq!(holder.holdings.len(), 2),
        other => panic!("expected shareholder details, got {other:?}"),
    }
    assert!(session.details("404").is_none());
}

#[test]
fn test_top_influential() {
    let mut session = Session::new(store(), ExplorerConfig::default());
    session.select_all_companies();

    let ranking = session.top_influential();
    assert_eq!(ranking[0].name, "Xavier Fund");
    assert_eq!(ranking[0].company_count, 2);
    assert_eq!(ranking[0].total_shares, 1500.0);
    assert_eq!(ranking.len(), 3);
}

#[test]
fn test_search_and_highlight() {
    let mut session = Session::new(store(), ExplorerConfig::default());
    session.select_all_companies();

    let hits = session.search_companies("bbb");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Beta Mining");
    assert_eq!(session.search_shareholders("trust").len(), 1);
    assert_eq!(session.search_shareholders("").len(), 3);

    session.selection_mut().set_match_mode(MatchMode::Regex);
    assert_eq!(session.search_shareholders("(fund|capital)$").len(), 2);
    // Invalid patterns fall back to substring matching
    assert_eq!(session.search_shareholders("(").len(), 0);
    assert_eq!(
        session.highlight("Alpha Holdings", "l"),
        "A<mark>l</mark>pha Ho<mark>l</mark>dings"
    );
}

#[tokio::test]
async fn test_reset_view_reaches_receiver() {
    let (session, mut rx) = Session::with_view_commands(store(), ExplorerConfig::default());

    assert!(session.reset_view());
    assert_eq!(rx.recv().await, Some(ViewCommand::ResetZoom));
}
