use std::collections::BTreeSet;

use crate::{
    compute::{ComputeGraph, ComputeNode},
    config::{DecisionFallback, EngineConfig},
    index::TreeIndex,
    properties::{EdgeId, NodeKind},
};

use super::ValuationDiagnostic;

/// A valued graph plus everything that kept parts of it from getting a number.
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub graph: ComputeGraph,
    pub diagnostics: Vec<ValuationDiagnostic>,
}

impl Valuation {
    pub fn warnings(&self) -> impl Iterator<Item = &ValuationDiagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    pub fn diagnostics_for<'a>(
        &'a self,
        node: &'a str,
    ) -> impl Iterator<Item = &'a ValuationDiagnostic> + 'a {
        self.diagnostics
            .iter()
            .filter(move |d| d.node().is_some_and(|n| n == node))
    }

    /// True when the children of `node` were valued but their probabilities do not sum to 1.
    pub fn has_incomplete_probabilities(&self, node: &str) -> bool {
        self.diagnostics_for(node)
            .any(|d| matches!(d, ValuationDiagnostic::IncompleteProbabilities { .. }))
    }
}

/// Value `graph` with a freshly built index and the default configuration.
pub fn compute_node_values(graph: ComputeGraph) -> Valuation {
    let index = TreeIndex::build(&graph);
    compute_node_values_with(graph, &index, &EngineConfig::default())
}

/// Value every tree in `graph`, backward from the leaves.
///
/// Leaves take their own value less the cumulative cost of the path leading to them (their own
/// cost included). Every other node takes the probability-weighted sum of its children, or
/// `None` when the probabilities used do not add up to 1. Decision nodes first overwrite their
/// outgoing probabilities so that all weight sits on the best child, split evenly on ties.
///
/// The graph is consumed and returned; `index` must have been built from the same structure.
pub fn compute_node_values_with(
    mut graph: ComputeGraph,
    index: &TreeIndex,
    config: &EngineConfig,
) -> Valuation {
    let mut diagnostics = Vec::new();

    for (edge, missing) in index.dangling() {
        tracing::warn!("Edge {} references missing node {}, skipping it", edge, missing);
        diagnostics.push(ValuationDiagnostic::DanglingEdge {
            edge: edge.clone(),
            missing: missing.clone(),
        });
    }
    for (edge, node) in index.conflicting() {
        tracing::warn!(
            "Edge {} would give node {} a second parent, skipping it",
            edge,
            node
        );
        diagnostics.push(ValuationDiagnostic::ConflictingParent {
            edge: edge.clone(),
            node: node.clone(),
        });
    }

    if index.roots().is_empty() {
        tracing::warn!(
            "No root nodes found among {} nodes, leaving values untouched. Cycles: {:?}",
            graph.nodes.len(),
            index.cycles()
        );
        diagnostics.push(ValuationDiagnostic::NoRoots {
            cycles: index.cycles().to_vec(),
        });
        return Valuation { graph, diagnostics };
    }

    let visited = {
        let mut engine = Engine {
            graph: &mut graph,
            index,
            config,
            diagnostics: &mut diagnostics,
            visited: BTreeSet::new(),
        };
        for root in index.roots() {
            let cost = engine
                .graph
                .nodes
                .get(root)
                .map(ComputeNode::own_cost)
                .unwrap_or(0.0);
            engine.evaluate(root, cost);
        }
        engine.visited
    };

    let unreachable = graph
        .nodes
        .values()
        .filter(|node| !node.kind.is_ornamental() && !visited.contains(&node.id))
        .map(|node| node.id.clone())
        .collect::<Vec<_>>();
    if !unreachable.is_empty() {
        tracing::warn!("Nodes unreachable from any root: {:?}", unreachable);
        diagnostics.push(ValuationDiagnostic::UnreachableNodes(unreachable));
    }

    Valuation { graph, diagnostics }
}

struct Engine<'a> {
    graph: &'a mut ComputeGraph,
    index: &'a TreeIndex,
    config: &'a EngineConfig,
    diagnostics: &'a mut Vec<ValuationDiagnostic>,
    visited: BTreeSet<String>,
}

impl Engine<'_> {
    /// Post-order evaluation of the subtree under `id`. `cumulative_cost` already includes the
    /// node's own cost.
    fn evaluate(&mut self, id: &str, cumulative_cost: f64) -> Option<f64> {
        let Some(node) = self.graph.nodes.get(id) else {
            tracing::warn!("Index refers to node {} which is not in the graph", id);
            return None;
        };
        let kind = node.kind;
        let prior_costs = cumulative_cost - node.own_cost();
        self.visited.insert(id.to_string());

        let index = self.index;
        let children = index.children(id);
        if children.is_empty() {
            let node = self.graph.nodes.get_mut(id)?;
            node.prior_costs = Some(prior_costs);
            return match node.value {
                Some(value) => {
                    let net = value - cumulative_cost;
                    node.value = Some(net);
                    Some(net)
                }
                None => {
                    tracing::debug!("Leaf {} has no value", id);
                    self.diagnostics
                        .push(ValuationDiagnostic::MissingValue { node: id.to_string() });
                    None
                }
            };
        }

        let mut outcomes: Vec<(&EdgeId, Option<f64>)> = Vec::with_capacity(children.len());
        for (edge, child) in children {
            let child_cost = self
                .graph
                .nodes
                .get(child)
                .map(ComputeNode::own_cost)
                .unwrap_or(0.0);
            outcomes.push((edge, self.evaluate(child, cumulative_cost + child_cost)));
        }

        match kind {
            NodeKind::Decision => self.choose(id, &outcomes),
            NodeKind::Chance | NodeKind::Terminal => {}
            NodeKind::Note | NodeKind::Ghost => {}
        }

        let mut weighted = 0.0;
        let mut mass = 0.0;
        for (edge, value) in outcomes.iter() {
            let Some(value) = value else { continue };
            let Some(probability) = self.graph.edges.get(*edge).and_then(|e| e.probability) else {
                continue;
            };
            weighted += value * probability;
            mass += probability;
        }

        let value = if self.config.approx_eq(mass, 1.0) {
            Some(weighted)
        } else {
            tracing::debug!("Probabilities below {} sum to {}, value unknown", id, mass);
            self.diagnostics
                .push(ValuationDiagnostic::IncompleteProbabilities {
                    node: id.to_string(),
                    sum: mass,
                });
            None
        };

        if let Some(node) = self.graph.nodes.get_mut(id) {
            node.value = value;
            node.prior_costs = Some(prior_costs);
        }
        value
    }

    /// Put all probability on the best valued children, split evenly among ties.
    fn choose(&mut self, id: &str, outcomes: &[(&EdgeId, Option<f64>)]) {
        let best = outcomes
            .iter()
            .filter_map(|(_, value)| *value)
            .fold(None, |best: Option<f64>, value| {
                Some(best.map_or(value, |b| b.max(value)))
            });

        let Some(best) = best else {
            tracing::debug!("Decision {} has no valued option", id);
            self.diagnostics
                .push(ValuationDiagnostic::UnresolvedDecision { node: id.to_string() });
            if self.config.decision_fallback == DecisionFallback::Clear {
                for (edge, _) in outcomes {
                    if let Some(edge) = self.graph.edges.get_mut(*edge) {
                        edge.probability = None;
                    }
                }
            }
            return;
        };

        let is_best = |value: &Option<f64>| {
            value.is_some_and(|value| self.config.approx_eq(value, best))
        };
        let winners = outcomes.iter().filter(|(_, value)| is_best(value)).count();
        let share = 1.0 / winners as f64;
        for (edge, value) in outcomes {
            let probability = if is_best(value) { share } else { 0.0 };
            if let Some(edge) = self.graph.edges.get_mut(*edge) {
                edge.probability = Some(probability);
            }
        }
    }
}
