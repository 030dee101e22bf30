//! The engine-facing numeric model and the adapter that produces it.
//!
//! A [`ComputeGraph`] is derived state: it is rebuilt from a persisted
//! [`crate::properties::DecisionTree`] on every recompute by resolving each node's value and cost
//! formulas and each edge's probability formula. An unset or unparsable formula becomes `None`,
//! which the engine treats as "undetermined" rather than zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    expression::ExpressionResolver,
    properties::{
        DecisionTree, EdgeId, EdgeKind, NodeId, NodeKind, TreeEdge, TreeNode, Variable,
        VariableScope,
    },
};

/// Resolved variables, partitioned by the formulas they are visible to.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variables {
    value: BTreeMap<String, f64>,
    cost: BTreeMap<String, f64>,
    probability: BTreeMap<String, f64>,
}

impl Variables {
    /// Resolve variables in declaration order. Each one sees the variables of its own scope that
    /// were resolved before it; one that does not resolve is left out.
    pub fn resolve<R: ExpressionResolver + ?Sized>(variables: &[Variable], resolver: &R) -> Self {
        let mut resolved = Variables::default();
        for variable in variables {
            match resolver.resolve(&variable.expr, resolved.scope(variable.scope)) {
                Some(value) => resolved.insert(variable.scope, &variable.name, value),
                None => tracing::debug!(
                    "Variable {} ({:?}) did not resolve from {:?}",
                    variable.name,
                    variable.scope,
                    variable.expr
                ),
            }
        }
        resolved
    }

    pub fn scope(&self, scope: VariableScope) -> &BTreeMap<String, f64> {
        match scope {
            VariableScope::Value => &self.value,
            VariableScope::Cost => &self.cost,
            VariableScope::Probability => &self.probability,
        }
    }

    pub fn insert(&mut self, scope: VariableScope, name: &str, value: f64) {
        let map = match scope {
            VariableScope::Value => &mut self.value,
            VariableScope::Cost => &mut self.cost,
            VariableScope::Probability => &mut self.probability,
        };
        map.insert(name.to_string(), value);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Outcome value. After valuation this is the node's expected value, net of costs.
    pub value: Option<f64>,
    pub cost: Option<f64>,
    /// Cumulative cost of the node's ancestors, excluding its own cost. Set by the engine.
    pub prior_costs: Option<f64>,
}

impl ComputeNode {
    pub fn new(id: &str, kind: NodeKind) -> Self {
        ComputeNode {
            id: id.to_string(),
            kind,
            value: None,
            cost: None,
            prior_costs: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    /// The cost as it enters arithmetic: unset counts as zero.
    pub fn own_cost(&self) -> f64 {
        self.cost.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    pub probability: Option<f64>,
}

impl ComputeEdge {
    pub fn new(id: &str, source: &str, target: &str, probability: Option<f64>) -> Self {
        ComputeEdge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            kind: EdgeKind::Structural,
            probability,
        }
    }
}

pub fn to_compute_node<R: ExpressionResolver + ?Sized>(
    node: &TreeNode,
    variables: &Variables,
    resolver: &R,
) -> ComputeNode {
    let resolve = |expr: &Option<String>, scope: VariableScope| {
        expr.as_deref()
            .and_then(|expr| resolver.resolve(expr, variables.scope(scope)))
    };
    ComputeNode {
        id: node.id.clone(),
        kind: node.kind,
        value: resolve(&node.value_expr, VariableScope::Value),
        cost: resolve(&node.cost_expr, VariableScope::Cost),
        prior_costs: None,
    }
}

pub fn to_compute_edge<R: ExpressionResolver + ?Sized>(
    edge: &TreeEdge,
    variables: &Variables,
    resolver: &R,
) -> ComputeEdge {
    ComputeEdge {
        id: edge.id.clone(),
        source: edge.source.clone(),
        target: edge.target.clone(),
        kind: edge.kind,
        probability: edge.probability_expr.as_deref().and_then(|expr| {
            resolver.resolve(expr, variables.scope(VariableScope::Probability))
        }),
    }
}

/// Nodes and edges keyed by id. Iteration order is id order, which is what makes child
/// ordering (and therefore tie handling) reproducible.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeGraph {
    pub nodes: BTreeMap<NodeId, ComputeNode>,
    pub edges: BTreeMap<EdgeId, ComputeEdge>,
}

impl ComputeGraph {
    pub fn from_tree<R: ExpressionResolver + ?Sized>(tree: &DecisionTree, resolver: &R) -> Self {
        let variables = Variables::resolve(&tree.variables, resolver);
        let mut graph = ComputeGraph::default();
        for (key, node) in tree.nodes.iter() {
            if *key != node.id {
                tracing::warn!("Node stored under {} has id {}, using the id", key, node.id);
            }
            graph.insert_node(to_compute_node(node, &variables, resolver));
        }
        for (key, edge) in tree.edges.iter() {
            if *key != edge.id {
                tracing::warn!("Edge stored under {} has id {}, using the id", key, edge.id);
            }
            graph.insert_edge(to_compute_edge(edge, &variables, resolver));
        }
        graph
    }

    pub fn insert_node(&mut self, node: ComputeNode) -> &mut Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    pub fn insert_edge(&mut self, edge: ComputeEdge) -> &mut Self {
        self.edges.insert(edge.id.clone(), edge);
        self
    }

    pub fn node(&self, id: &str) -> Option<&ComputeNode> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&ComputeEdge> {
        self.edges.get(id)
    }

    pub fn value(&self, id: &str) -> Option<f64> {
        self.nodes.get(id).and_then(|n| n.value)
    }

    pub fn probability(&self, id: &str) -> Option<f64> {
        self.edges.get(id).and_then(|e| e.probability)
    }
}
