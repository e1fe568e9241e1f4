//! Tests for VisibilityService: expand, collapse, overflow folding and link cache upkeep

use std::sync::Arc;

use rstest::{fixture, rstest};

use sankey_tree::application::services::VisibilityService;
use sankey_tree::domain::{Action, LinkKey, Snapshot, SourceRecord, TreeBuilder};
use sankey_tree::infrastructure::traits::{InMemoryLinkCache, LinkCache};

fn engine_from(json: &str, cache: Arc<InMemoryLinkCache>) -> VisibilityService {
    let record: SourceRecord = serde_json::from_str(json).expect("valid source record");
    let store = TreeBuilder::new().build(&record).expect("consistent record");
    VisibilityService::new(store, cache)
}

#[fixture]
fn traces() -> VisibilityService {
    engine_from(
        include_str!("resources/traces.json"),
        Arc::new(InMemoryLinkCache::new()),
    )
}

#[fixture]
fn wide() -> VisibilityService {
    engine_from(
        include_str!("resources/wide.json"),
        Arc::new(InMemoryLinkCache::new()),
    )
}

/// Every visible link must connect two visible nodes.
fn assert_consistent(engine: &VisibilityService) {
    let store = engine.store();
    for link in store.links().iter().filter(|l| l.is_visible) {
        let source = store.node(link.source).expect("live source");
        let target = store.node(link.target).expect("live target");
        assert!(
            source.is_visible && target.is_visible,
            "visible link {} -> {} has a hidden endpoint",
            source.name,
            target.name
        );
    }
}

fn others(engine: &VisibilityService) -> usize {
    engine.store().nodes().filter(|(_, n)| n.synthetic).count()
}

#[rstest]
fn given_fresh_store_when_revealing_initial_then_shows_root_and_children(
    mut traces: VisibilityService,
) {
    let snapshot = traces.reveal_initial(None);

    assert_eq!(
        snapshot.node_names(),
        ["Traces", "Completed", "Error", "Abandoned"]
    );
    assert_eq!(snapshot.links.len(), 3);
    assert!(snapshot.link("Traces", "Error").is_some());
    assert_eq!(others(&traces), 0);
}

#[rstest]
fn given_configured_root_when_revealing_initial_then_expands_only_that_node(
    mut traces: VisibilityService,
) {
    let snapshot = traces.reveal_initial(Some("Error"));

    assert_eq!(
        snapshot.node_names(),
        ["Error", "Timeout", "Internal Error"]
    );
}

#[rstest]
fn given_visible_child_when_expanding_then_adds_its_children(mut traces: VisibilityService) {
    traces.reveal_initial(None);

    let snapshot = traces.expand("Completed");

    assert!(snapshot.contains_node("Met SLA"));
    assert!(snapshot.contains_node("Not Met SLA"));
    assert_eq!(snapshot.link("Completed", "Met SLA").unwrap().value, 8000.0);
    assert!(!snapshot.contains_node("High Priority"));
    assert_consistent(&traces);
}

#[rstest]
fn given_more_children_than_limit_when_expanding_then_folds_rest_into_other(
    mut wide: VisibilityService,
) {
    let snapshot = wide.expand("Root");

    assert_eq!(snapshot.node_names(), ["Root", "c1", "Other"]);
    assert_eq!(snapshot.link("Root", "c1").unwrap().value, 1.0);
    assert_eq!(snapshot.link("Root", "Other").unwrap().value, 14.0);
    assert!(snapshot.find("Other").unwrap().synthetic);
    assert_consistent(&wide);
}

#[rstest]
#[case::at_limit(5, 6)]
#[case::above_limit(9, 6)]
fn given_limit_not_exceeded_when_expanding_then_shows_every_child(
    #[case] limit: usize,
    #[case] expected_nodes: usize,
) {
    let mut engine = engine_from(
        include_str!("resources/wide.json"),
        Arc::new(InMemoryLinkCache::new()),
    )
    .with_fan_out_limit(limit);

    let snapshot = engine.expand("Root");

    assert_eq!(snapshot.nodes.len(), expected_nodes);
    assert!(!snapshot.contains_node("Other"));
}

#[test]
fn given_zero_limit_when_configuring_then_raises_to_one() {
    let engine = engine_from(
        include_str!("resources/wide.json"),
        Arc::new(InMemoryLinkCache::new()),
    )
    .with_fan_out_limit(0);

    assert_eq!(engine.fan_out_limit(), 1);
}

#[rstest]
fn given_expanded_overflow_when_expanding_again_then_keeps_single_other(
    mut wide: VisibilityService,
) {
    let first = wide.expand("Root");
    let second = wide.expand("Root");

    assert_eq!(others(&wide), 1);
    assert_eq!(first, second);
    assert_eq!(second.link("Root", "Other").unwrap().value, 14.0);
}

#[rstest]
fn given_overflow_when_collapsing_then_deletes_other_and_its_links(
    mut wide: VisibilityService,
) {
    wide.expand("Root");

    let snapshot = wide.collapse("Root");

    assert_eq!(snapshot.node_names(), ["Root"]);
    assert!(snapshot.links.is_empty());
    assert_eq!(others(&wide), 0);
    assert_eq!(wide.store().len(), 6);
    assert_eq!(wide.store().links().len(), 5);
}

#[rstest]
fn given_collapsed_overflow_when_expanding_again_then_recreates_other(
    mut wide: VisibilityService,
) {
    wide.expand("Root");
    wide.collapse("Root");

    let snapshot = wide.expand("Root");

    assert_eq!(others(&wide), 1);
    assert_eq!(snapshot.link("Root", "Other").unwrap().value, 14.0);
}

#[rstest]
fn given_expanded_child_when_collapsing_then_restores_previous_snapshot(
    mut traces: VisibilityService,
) {
    let before = traces.reveal_initial(None);
    traces.expand("Completed");

    let after = traces.collapse("Completed");

    assert_eq!(before, after);
}

#[rstest]
fn given_deep_expansion_when_collapsing_root_then_hides_whole_subtree(
    mut traces: VisibilityService,
) {
    traces.reveal_initial(None);
    traces.expand("Completed");
    traces.expand("Met SLA");

    let collapsed = traces.collapse("Traces");
    assert_eq!(collapsed.node_names(), ["Traces"]);
    assert!(collapsed.links.is_empty());

    // Grandchildren stay hidden on the next expand
    let reopened = traces.expand("Traces");
    assert_eq!(reopened.nodes.len(), 4);
    assert!(!reopened.contains_node("Met SLA"));
    assert_consistent(&traces);
}

#[rstest]
fn given_collapsed_node_when_collapsing_again_then_nothing_changes(
    mut traces: VisibilityService,
) {
    traces.reveal_initial(None);
    let once = traces.collapse("Error");
    let twice = traces.collapse("Error");

    assert_eq!(once, twice);
}

#[rstest]
#[case::expand("expand")]
#[case::collapse("collapse")]
#[case::toggle("toggle")]
fn given_unknown_name_when_acting_then_snapshot_is_unchanged(
    mut traces: VisibilityService,
    #[case] verb: &str,
) {
    let before = traces.reveal_initial(None);
    let action: Action = format!("{verb}:Nope").parse().unwrap();

    let after = traces.apply(&action);

    assert_eq!(before, after);
}

#[rstest]
fn given_different_casing_when_expanding_then_finds_node(mut traces: VisibilityService) {
    traces.reveal_initial(None);

    let snapshot = traces.expand("completed");

    assert!(snapshot.contains_node("Met SLA"));
}

#[rstest]
fn given_child_when_toggling_twice_then_expands_then_collapses(mut traces: VisibilityService) {
    let initial = traces.reveal_initial(None);

    traces.toggle("Error");
    assert!(traces.is_expanded("Error"));

    let after = traces.toggle("Error");
    assert!(!traces.is_expanded("Error"));
    assert_eq!(initial, after);
}

#[rstest]
fn given_expanded_root_when_toggling_then_root_stays_open(mut traces: VisibilityService) {
    let initial = traces.reveal_initial(None);

    let after = traces.toggle("Traces");

    assert_eq!(initial, after);
    assert!(traces.is_expanded("Traces"));
}

#[rstest]
fn given_action_sequence_when_applying_then_visible_set_stays_consistent(
    mut traces: VisibilityService,
) {
    traces.reveal_initial(None);
    let actions = [
        "expand:Completed",
        "expand:Met SLA",
        "toggle:Abandoned",
        "collapse:Completed",
        "expand:Not Met SLA",
        "toggle:Abandoned",
        "collapse:Traces",
        "expand:Traces",
    ];

    for raw in actions {
        let action: Action = raw.parse().unwrap();
        let snapshot = traces.apply(&action);
        assert_consistent(&traces);
        assert_eq!(snapshot, Snapshot::project(traces.store()));
    }
}

#[test]
fn given_rendered_links_when_collapsing_then_cache_forgets_hidden_ones() {
    let cache = Arc::new(InMemoryLinkCache::new());
    let mut engine = engine_from(include_str!("resources/traces.json"), Arc::clone(&cache));
    engine.reveal_initial(None);
    let snapshot = engine.expand("Completed");
    for link in &snapshot.links {
        cache.remember(&link.key);
    }
    assert_eq!(cache.len(), 5);

    engine.collapse("Completed");

    assert!(!cache.contains(&LinkKey::new("Completed", "Met SLA")));
    assert!(!cache.contains(&LinkKey::new("Completed", "Not Met SLA")));
    assert!(cache.contains(&LinkKey::new("Traces", "Completed")));
    assert_eq!(cache.len(), 3);
}

#[test]
fn given_forgotten_link_when_reexpanding_then_it_enters_again() {
    let cache = Arc::new(InMemoryLinkCache::new());
    let mut engine = engine_from(include_str!("resources/traces.json"), Arc::clone(&cache));
    for link in &engine.reveal_initial(None).links {
        cache.remember(&link.key);
    }
    engine.collapse("Traces");

    let snapshot = engine.expand("Traces");

    let entering: Vec<String> = snapshot
        .entering_links(|key| cache.contains(key))
        .map(|l| l.key.to_string())
        .collect();
    assert_eq!(
        entering,
        ["Traces--Completed", "Traces--Error", "Traces--Abandoned"]
    );
}

#[test]
fn given_non_ascii_name_in_other_case_when_expanding_then_finds_node() {
    let mut engine = engine_from(
        r#"{"Traces": 10, "Traces.État": 6, "Traces.Error": 4, "État.Ok": 6}"#,
        Arc::new(InMemoryLinkCache::new()),
    );
    engine.reveal_initial(None);

    let snapshot = engine.expand("état");

    assert_eq!(snapshot.node_names(), ["Traces", "État", "Error", "Ok"]);
    assert_eq!(snapshot.link("ÉTAT", "ok").unwrap().value, 6.0);
    assert!(engine.is_expanded("ÉTAT"));
}

#[rstest]
fn given_mid_level_expansion_when_collapsing_it_then_siblings_stay_untouched(
    mut traces: VisibilityService,
) {
    traces.reveal_initial(None);
    traces.expand("Error");
    traces.expand("Completed");
    traces.expand("Met SLA");

    let snapshot = traces.collapse("Completed");

    assert!(snapshot.contains_node("Traces"));
    assert!(snapshot.contains_node("Completed"));
    assert!(snapshot.contains_node("Abandoned"));
    assert!(snapshot.contains_node("Timeout"));
    assert!(snapshot.link("Error", "Internal Error").is_some());
    assert!(snapshot.link("Traces", "Completed").is_some());
    assert!(!snapshot.contains_node("Met SLA"));
    assert!(!snapshot.contains_node("High Priority"));
    assert!(!traces.is_expanded("Completed"));
    assert_consistent(&traces);
}

#[test]
fn given_nested_overflow_when_collapsing_ancestor_then_deletes_other() {
    let mut engine = engine_from(
        r#"{"Top": 15, "Top.Root": 15, "Root.c1": 1, "Root.c2": 2, "Root.c3": 3, "Root.c4": 4, "Root.c5": 5}"#,
        Arc::new(InMemoryLinkCache::new()),
    );
    engine.reveal_initial(None);
    engine.expand("Root");
    assert_eq!(others(&engine), 1);

    let snapshot = engine.collapse("Top");

    assert_eq!(others(&engine), 0);
    assert_eq!(snapshot.node_names(), ["Top"]);
    assert_eq!(engine.store().len(), 7);
    assert_eq!(engine.store().links().len(), 6);
    assert_consistent(&engine);
}
