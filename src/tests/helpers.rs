//! Shared test utilities for valuation testing

use crate::{
    compute::{ComputeEdge, ComputeGraph, ComputeNode},
    properties::NodeKind,
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

pub fn node(id: &str, kind: NodeKind, value: Option<f64>, cost: Option<f64>) -> ComputeNode {
    ComputeNode {
        value,
        cost,
        ..ComputeNode::new(id, kind)
    }
}

pub fn terminal(id: &str, value: f64) -> ComputeNode {
    ComputeNode::new(id, NodeKind::Terminal).with_value(value)
}

pub fn edge(id: &str, source: &str, target: &str, probability: Option<f64>) -> ComputeEdge {
    ComputeEdge::new(id, source, target, probability)
}

/// A root of `kind` with one terminal child per `(value, probability)` pair. Children are named
/// `c0`, `c1`, ... and their edges `e0`, `e1`, ...
pub fn fan(kind: NodeKind, children: &[(Option<f64>, Option<f64>)]) -> ComputeGraph {
    init_logging();
    let mut graph = ComputeGraph::default();
    graph.insert_node(ComputeNode::new("root", kind));
    for (i, (value, probability)) in children.iter().enumerate() {
        let child = format!("c{i}");
        graph
            .insert_node(node(&child, NodeKind::Terminal, *value, None))
            .insert_edge(edge(&format!("e{i}"), "root", &child, *probability));
    }
    graph
}

/// Investment example used across the path tests:
///
/// ```text
/// invest (decision, cost 5)
///   ├─ e-build ─> build (chance, cost 20)
///   │               ├─ e-boom (0.6) ─> boom (100)
///   │               └─ e-bust (0.4) ─> bust (10, cost 2)
///   └─ e-skip ──> skip (terminal 30)
/// ```
pub fn investment_tree() -> ComputeGraph {
    init_logging();
    let mut graph = ComputeGraph::default();
    graph
        .insert_node(node("invest", NodeKind::Decision, None, Some(5.0)))
        .insert_node(node("build", NodeKind::Chance, None, Some(20.0)))
        .insert_node(terminal("boom", 100.0))
        .insert_node(node("bust", NodeKind::Terminal, Some(10.0), Some(2.0)))
        .insert_node(terminal("skip", 30.0))
        .insert_edge(edge("e-build", "invest", "build", None))
        .insert_edge(edge("e-skip", "invest", "skip", None))
        .insert_edge(edge("e-boom", "build", "boom", Some(0.6)))
        .insert_edge(edge("e-bust", "build", "bust", Some(0.4)));
    graph
}

pub fn assert_close(actual: Option<f64>, expected: f64) {
    match actual {
        Some(actual) => assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        ),
        None => panic!("expected {expected}, got None"),
    }
}
