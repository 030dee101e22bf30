//! One recompute, end to end: formulas → [`ComputeGraph`] → [`TreeIndex`] → [`Valuation`].
//!
//! An [`Evaluator`] is meant to live as long as the editing session. It owns the resolver, the
//! engine configuration and the [`IndexCache`], so consecutive edits that leave the structure
//! alone (same [`Revision`]) reuse the same index. Each call to [`Evaluator::evaluate`] derives a
//! fresh graph from the persisted tree; nothing is carried over between calls except the index.

use serde::{Deserialize, Serialize};
use std::{fmt::Write, sync::Arc};

use crate::{
    compute::ComputeGraph,
    config::EngineConfig,
    error::PayoffError,
    expression::{ExpressionResolver, FormulaResolver},
    index::{IndexCache, Revision, TreeIndex},
    paths::{self, RiskProfile},
    properties::{DecisionTree, EdgeId, NodeId, NodeKind},
    valuation::{compute_node_values_with, Valuation, ValuationDiagnostic},
};

/// Shown wherever a number is undetermined.
pub const UNKNOWN: &str = "???";

#[derive(Debug)]
pub struct Evaluator<R = FormulaResolver> {
    resolver: R,
    config: EngineConfig,
    cache: IndexCache,
}

impl Evaluator<FormulaResolver> {
    pub fn new(config: EngineConfig) -> Self {
        Evaluator::with_resolver(FormulaResolver, config)
    }
}

impl Default for Evaluator<FormulaResolver> {
    fn default() -> Self {
        Evaluator::new(EngineConfig::default())
    }
}

impl<R: ExpressionResolver> Evaluator<R> {
    pub fn with_resolver(resolver: R, config: EngineConfig) -> Self {
        Evaluator {
            resolver,
            config,
            cache: IndexCache::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// `revision` must change whenever nodes or edges are added, removed or reconnected.
    pub fn evaluate(&self, tree: &DecisionTree, revision: Revision) -> TreeEvaluation {
        let raw = ComputeGraph::from_tree(tree, &self.resolver);
        let index = self.cache.get_or_build(revision, &raw);
        let valuation = compute_node_values_with(raw.clone(), &index, &self.config);
        tracing::debug!(
            "Evaluated {} nodes / {} edges at {:?} with {} diagnostics",
            raw.nodes.len(),
            raw.edges.len(),
            revision,
            valuation.diagnostics.len()
        );
        TreeEvaluation {
            raw,
            valuation,
            index,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeEvaluation {
    raw: ComputeGraph,
    valuation: Valuation,
    index: Arc<TreeIndex>,
}

impl TreeEvaluation {
    /// The resolved graph before valuation.
    pub fn raw(&self) -> &ComputeGraph {
        &self.raw
    }

    pub fn graph(&self) -> &ComputeGraph {
        &self.valuation.graph
    }

    pub fn index(&self) -> &TreeIndex {
        &self.index
    }

    pub fn diagnostics(&self) -> &[ValuationDiagnostic] {
        &self.valuation.diagnostics
    }

    pub fn node_value(&self, node: &str) -> Option<f64> {
        self.graph().value(node)
    }

    pub fn edge_probability(&self, edge: &str) -> Option<f64> {
        self.graph().probability(edge)
    }

    pub fn has_incomplete_probabilities(&self, node: &str) -> bool {
        self.valuation.has_incomplete_probabilities(node)
    }

    pub fn path_probability(&self, node: &str) -> Option<f64> {
        paths::path_probability(node, self.graph(), &self.index)
    }

    pub fn path_cost(&self, node: &str) -> Option<f64> {
        paths::path_cost(node, &self.raw, &self.index)
    }

    pub fn path_value(&self, node: &str) -> Option<f64> {
        paths::path_value(node, self.graph())
    }

    pub fn risk_profile(&self) -> RiskProfile {
        paths::risk_profile(self.graph(), &self.index)
    }

    pub fn report(&self) -> EvaluationReport {
        EvaluationReport {
            nodes: self
                .graph()
                .nodes
                .values()
                .filter(|node| !node.kind.is_ornamental())
                .map(|node| NodeReport {
                    id: node.id.clone(),
                    kind: node.kind,
                    value: node.value,
                    prior_costs: node.prior_costs,
                    path_probability: self.path_probability(&node.id),
                    incomplete: self.has_incomplete_probabilities(&node.id),
                })
                .collect(),
            edges: self
                .graph()
                .edges
                .values()
                .filter(|edge| !edge.kind.is_ornamental())
                .map(|edge| EdgeReport {
                    id: edge.id.clone(),
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    probability: edge.probability,
                })
                .collect(),
            diagnostics: self.diagnostics().iter().map(|d| d.to_string()).collect(),
            risk_profile: self.risk_profile(),
        }
    }

    /// Plain-text summary, one line per node then one per edge.
    pub fn render_table(&self) -> Result<String, PayoffError> {
        let fmt = |value: Option<f64>| value.map_or(UNKNOWN.to_string(), |v| format!("{v:.4}"));
        let report = self.report();
        let mut out = String::new();
        writeln!(
            out,
            "{:<20} {:<9} {:>14} {:>10}",
            "node", "kind", "value", "path p"
        )?;
        for node in report.nodes.iter() {
            let marker = if node.incomplete { " !" } else { "" };
            writeln!(
                out,
                "{:<20} {:<9} {:>14} {:>10}{}",
                node.id,
                node.kind.to_string(),
                fmt(node.value),
                fmt(node.path_probability),
                marker
            )?;
        }
        writeln!(out)?;
        writeln!(out, "{:<20} {:<20} {:<20} {:>10}", "edge", "from", "to", "p")?;
        for edge in report.edges.iter() {
            writeln!(
                out,
                "{:<20} {:<20} {:<20} {:>10}",
                edge.id,
                edge.source,
                edge.target,
                fmt(edge.probability)
            )?;
        }
        if !report.diagnostics.is_empty() {
            writeln!(out)?;
            for diagnostic in report.diagnostics.iter() {
                writeln!(out, "- {diagnostic}")?;
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeReport {
    pub id: NodeId,
    pub kind: NodeKind,
    pub value: Option<f64>,
    pub prior_costs: Option<f64>,
    pub path_probability: Option<f64>,
    /// Children valued, but their probabilities do not sum to 1.
    pub incomplete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeReport {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub probability: Option<f64>,
}

/// Serializable snapshot of a [`TreeEvaluation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub nodes: Vec<NodeReport>,
    pub edges: Vec<EdgeReport>,
    pub diagnostics: Vec<String>,
    pub risk_profile: RiskProfile,
}
