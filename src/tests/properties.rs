//! Property tests over randomly shaped single-root trees

use crate::{
    compute::{ComputeEdge, ComputeGraph, ComputeNode},
    config::EngineConfig,
    index::TreeIndex,
    paths::{legacy_path_value, path_value, risk_profile},
    properties::NodeKind,
    valuation::compute_node_values_with,
};
use proptest::{prelude::*, sample::Index};
use std::collections::BTreeMap;

type Shape = (Index, Option<f64>, Option<f64>, bool, f64);

fn shapes() -> impl Strategy<Value = Vec<Shape>> {
    proptest::collection::vec(
        (
            any::<Index>(),
            proptest::option::weighted(0.85, -1000.0..1000.0f64),
            proptest::option::weighted(0.5, 0.0..50.0f64),
            any::<bool>(),
            0.01..1.0f64,
        ),
        1..30,
    )
}

/// Node `i` hangs off a node `< i`; sibling probabilities are normalized to sum to 1.
fn build(shape: &[Shape]) -> ComputeGraph {
    let id = |i: usize| format!("n{i:02}");
    let parents = shape
        .iter()
        .enumerate()
        .map(|(i, (parent, ..))| (i > 0).then(|| parent.index(i)))
        .collect::<Vec<_>>();
    let mut weight_totals = BTreeMap::<usize, f64>::new();
    for (i, parent) in parents.iter().enumerate() {
        if let Some(parent) = parent {
            *weight_totals.entry(*parent).or_default() += shape[i].4;
        }
    }

    let mut graph = ComputeGraph::default();
    for (i, (_, value, cost, decision, weight)) in shape.iter().enumerate() {
        let kind = if !weight_totals.contains_key(&i) {
            NodeKind::Terminal
        } else if *decision {
            NodeKind::Decision
        } else {
            NodeKind::Chance
        };
        graph.insert_node(ComputeNode {
            value: *value,
            cost: *cost,
            ..ComputeNode::new(&id(i), kind)
        });
        if let Some(parent) = parents[i] {
            let probability = weight / weight_totals[&parent];
            graph.insert_edge(ComputeEdge::new(
                &format!("e{i:02}"),
                &id(parent),
                &id(i),
                Some(probability),
            ));
        }
    }
    graph
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6
}

proptest! {
    #[test]
    fn path_value_definitions_agree(shape in shapes()) {
        let raw = build(&shape);
        let index = TreeIndex::build(&raw);
        let valued = compute_node_values_with(raw.clone(), &index, &EngineConfig::default()).graph;
        for id in raw.nodes.keys().filter(|id| index.is_leaf(id)) {
            match (legacy_path_value(id, &raw, &index), path_value(id, &valued)) {
                (Some(legacy), Some(canonical)) => prop_assert!(
                    close(legacy, canonical),
                    "{}: legacy {} vs engine {}", id, legacy, canonical
                ),
                (None, None) => {}
                (legacy, canonical) => prop_assert!(
                    false,
                    "{}: legacy {:?} vs engine {:?}", id, legacy, canonical
                ),
            }
        }
    }

    #[test]
    fn valuation_is_idempotent(shape in shapes()) {
        let raw = build(&shape);
        let index = TreeIndex::build(&raw);
        let config = EngineConfig::default();
        let first = compute_node_values_with(raw.clone(), &index, &config);
        let second = compute_node_values_with(raw, &index, &config);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn decisions_pick_the_best_child(shape in shapes()) {
        let raw = build(&shape);
        let index = TreeIndex::build(&raw);
        let valued = compute_node_values_with(raw.clone(), &index, &EngineConfig::default()).graph;
        for node in valued.nodes.values().filter(|n| n.kind == NodeKind::Decision) {
            let children = index.children(&node.id);
            let best = children
                .iter()
                .filter_map(|(_, child)| valued.value(child))
                .fold(f64::NEG_INFINITY, f64::max);
            if best == f64::NEG_INFINITY {
                continue;
            }
            let winners = children
                .iter()
                .filter(|(_, child)| valued.value(child).is_some_and(|v| (v - best).abs() <= 1e-10))
                .count();
            let mut mass = 0.0;
            for (edge, _) in children {
                let p = valued.probability(edge);
                prop_assert!(p == Some(0.0) || p == Some(1.0 / winners as f64));
                mass += p.unwrap_or(0.0);
            }
            prop_assert!(close(mass, 1.0));
            let value = valued.value(&node.id);
            prop_assert!(value.is_some_and(|v| close(v, best)), "{:?} vs {}", value, best);
        }
    }

    #[test]
    fn missing_children_make_parent_unknown(shape in shapes()) {
        let raw = build(&shape);
        let index = TreeIndex::build(&raw);
        let valued = compute_node_values_with(raw, &index, &EngineConfig::default()).graph;
        for node in valued.nodes.values().filter(|n| !index.is_leaf(&n.id)) {
            if index.child_nodes(&node.id).all(|child| valued.value(child).is_none()) {
                prop_assert_eq!(node.value, None);
            }
        }
    }

    #[test]
    fn risk_profile_matches_root_value(shape in shapes()) {
        let raw = build(&shape);
        let index = TreeIndex::build(&raw);
        let valued = compute_node_values_with(raw, &index, &EngineConfig::default()).graph;
        if let (Some(root), false) = (valued.value("n00"), index.is_leaf("n00")) {
            let profile = risk_profile(&valued, &index);
            prop_assert!(
                close(profile.expected_value(), root),
                "profile {} vs root {}", profile.expected_value(), root
            );
        }
    }
}
