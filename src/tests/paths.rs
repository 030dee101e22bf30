//! Tests for path aggregates and the risk profile

use super::helpers::*;
use crate::{
    compute::ComputeGraph,
    config::EngineConfig,
    index::TreeIndex,
    paths::{legacy_path_value, path_cost, path_probability, path_value, risk_profile},
    properties::NodeKind,
    valuation::compute_node_values_with,
};
use test_log::test;

fn valued_investment() -> (ComputeGraph, ComputeGraph, TreeIndex) {
    let raw = investment_tree();
    let index = TreeIndex::build(&raw);
    let valued = compute_node_values_with(raw.clone(), &index, &EngineConfig::default()).graph;
    (raw, valued, index)
}

#[test]
fn test_path_probability() {
    let (_, valued, index) = valued_investment();
    assert_close(path_probability("boom", &valued, &index), 0.6);
    assert_close(path_probability("bust", &valued, &index), 0.4);
    assert_eq!(path_probability("skip", &valued, &index), Some(0.0));
    assert_eq!(path_probability("build", &valued, &index), Some(1.0));
}

#[test]
fn test_root_has_no_path_probability() {
    let (_, valued, index) = valued_investment();
    assert_eq!(path_probability("invest", &valued, &index), None);
    assert_eq!(path_probability("not-a-node", &valued, &index), None);
}

#[test]
fn test_undetermined_segment_invalidates_path() {
    // Before valuation the decision edges carry no probability.
    let (raw, _, index) = valued_investment();
    assert_eq!(path_probability("boom", &raw, &index), None);
    assert_eq!(path_probability("skip", &raw, &index), None);
}

#[test]
fn test_path_cost() {
    let (raw, _, index) = valued_investment();
    assert_eq!(path_cost("invest", &raw, &index), Some(5.0));
    assert_eq!(path_cost("build", &raw, &index), Some(25.0));
    assert_eq!(path_cost("bust", &raw, &index), Some(27.0));
    assert_eq!(path_cost("boom", &raw, &index), Some(25.0));
    assert_eq!(path_cost("nope", &raw, &index), None);
}

#[test]
fn test_path_value_implementations_agree_on_leaves() {
    let (raw, valued, index) = valued_investment();
    for leaf in ["boom", "bust", "skip"] {
        assert_eq!(
            legacy_path_value(leaf, &raw, &index),
            path_value(leaf, &valued),
            "{leaf}"
        );
    }
    assert_eq!(path_value("bust", &valued), Some(-17.0));
    // Inner nodes carry no raw value of their own.
    assert_eq!(legacy_path_value("build", &raw, &index), None);
}

#[test]
fn test_risk_profile() {
    let (_, valued, index) = valued_investment();
    let profile = risk_profile(&valued, &index);
    let nodes = profile
        .points
        .iter()
        .map(|p| p.node.as_str())
        .collect::<Vec<_>>();
    assert_eq!(nodes, vec!["bust", "skip", "boom"]);
    assert_close(Some(profile.points[0].cumulative), 0.4);
    assert_close(Some(profile.points[1].cumulative), 0.4);
    assert_close(Some(profile.points[2].cumulative), 1.0);
    assert_close(Some(profile.total_probability()), 1.0);
    assert_close(Some(profile.expected_value()), 38.2);
    assert_close(valued.value("invest"), profile.expected_value());
}

#[test]
fn test_risk_profile_skips_undetermined_outcomes() {
    let graph = fan(NodeKind::Chance, &[(Some(5.0), Some(0.5)), (None, Some(0.5))]);
    let index = TreeIndex::build(&graph);
    let valued = compute_node_values_with(graph, &index, &EngineConfig::default()).graph;
    let profile = risk_profile(&valued, &index);
    assert_eq!(profile.points.len(), 1);
    assert_eq!(profile.points[0].node, "c0");
    assert_eq!(profile.total_probability(), 0.5);
}

#[test]
fn test_parent_walk_stops_on_cycle() {
    let mut graph = ComputeGraph::default();
    for id in ["a", "b"] {
        graph.insert_node(node(id, NodeKind::Chance, None, Some(1.0)));
    }
    graph
        .insert_edge(edge("ab", "a", "b", Some(1.0)))
        .insert_edge(edge("ba", "b", "a", Some(1.0)));
    let index = TreeIndex::build(&graph);
    assert_eq!(path_probability("a", &graph, &index), None);
    assert_eq!(path_cost("b", &graph, &index), None);
    assert!(risk_profile(&graph, &index).is_empty());
}
