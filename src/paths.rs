//! Per-node aggregates along the unique path from a root, plus the terminal risk profile.
//!
//! Every query here walks parent links through a [`TreeIndex`], so it costs O(depth). Walks stop
//! (and answer `None`) if they meet a node twice, which only happens on cyclic data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{compute::ComputeGraph, index::TreeIndex, properties::NodeId};

/// Ancestors of `node`, nearest first, each with the edge leading down from it.
fn ancestry<'a>(node: &'a str, index: &'a TreeIndex) -> Option<Vec<(&'a str, &'a str)>> {
    let mut seen = BTreeSet::from([node]);
    let mut chain = Vec::new();
    let mut current = node;
    while let (Some(parent), Some(edge)) = (index.parent(current), index.parent_edge(current)) {
        if !seen.insert(parent.as_str()) {
            tracing::warn!("Parent chain of {} loops back through {}", node, parent);
            return None;
        }
        chain.push((parent.as_str(), edge.as_str()));
        current = parent.as_str();
    }
    Some(chain)
}

/// Product of the edge probabilities between `node` and its root.
///
/// `None` when `node` is a root (it has no path probability, which is not the same as 1), or
/// when any edge on the way is undetermined.
pub fn path_probability(node: &str, graph: &ComputeGraph, index: &TreeIndex) -> Option<f64> {
    let chain = ancestry(node, index)?;
    if chain.is_empty() {
        return None;
    }
    chain.iter().try_fold(1.0, |acc, (_, edge)| {
        graph.probability(edge).map(|p| acc * p)
    })
}

/// The node's own cost plus the costs of all its ancestors, read from an unvalued graph.
pub fn path_cost(node: &str, graph: &ComputeGraph, index: &TreeIndex) -> Option<f64> {
    let own = graph.node(node)?.own_cost();
    let chain = ancestry(node, index)?;
    Some(
        chain
            .iter()
            .filter_map(|(ancestor, _)| graph.node(ancestor))
            .fold(own, |acc, ancestor| acc + ancestor.own_cost()),
    )
}

/// Value of `node` net of every cost on its path, as computed by the engine.
pub fn path_value(node: &str, valued: &ComputeGraph) -> Option<f64> {
    valued.value(node)
}

/// Value of `node` net of every cost on its path, recomputed from the raw (unvalued) graph by
/// subtracting [`path_cost`] from the node's own value. Agrees with [`path_value`] for leaves.
pub fn legacy_path_value(node: &str, raw: &ComputeGraph, index: &TreeIndex) -> Option<f64> {
    let value = raw.value(node)?;
    Some(value - path_cost(node, raw, index)?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPoint {
    pub node: NodeId,
    /// Outcome value, net of costs.
    pub value: f64,
    /// Probability of reaching this outcome from its root.
    pub probability: f64,
    /// Probability of an outcome worth at most `value`, within this profile.
    pub cumulative: f64,
}

/// Distribution of terminal outcomes: what a risk histogram is drawn from.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub points: Vec<RiskPoint>,
}

impl RiskProfile {
    /// Sum of value × probability over all outcomes.
    pub fn expected_value(&self) -> f64 {
        self.points.iter().map(|p| p.value * p.probability).sum()
    }

    pub fn total_probability(&self) -> f64 {
        self.points.iter().map(|p| p.probability).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Collect every reachable leaf that has both a value and a path probability, sorted by value
/// (ties by node id).
pub fn risk_profile(valued: &ComputeGraph, index: &TreeIndex) -> RiskProfile {
    let mut points = valued
        .nodes
        .values()
        .filter(|node| !node.kind.is_ornamental() && index.is_leaf(&node.id))
        .filter_map(|node| {
            let value = node.value?;
            let probability = path_probability(&node.id, valued, index)?;
            Some(RiskPoint {
                node: node.id.clone(),
                value,
                probability,
                cumulative: 0.0,
            })
        })
        .collect::<Vec<_>>();
    points.sort_by(|a, b| a.value.total_cmp(&b.value).then_with(|| a.node.cmp(&b.node)));

    let mut running = 0.0;
    for point in points.iter_mut() {
        running += point.probability;
        point.cumulative = running;
    }
    RiskProfile { points }
}
