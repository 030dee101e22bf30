//! Non-fatal conditions met while valuing a tree.
//!
//! The engine never fails. Anything that keeps a node or edge from getting a number is reported
//! as a [`ValuationDiagnostic`] next to the (partially) valued graph, so a consumer can show a
//! placeholder and a warning marker instead of a wrong figure.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::properties::{EdgeId, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValuationDiagnostic {
    /// Every value-bearing node has a parent, so there is nowhere to start. Lists the cycles
    /// responsible, if any.
    NoRoots { cycles: Vec<Vec<NodeId>> },
    /// An edge names a node that does not exist. Its contribution is skipped.
    DanglingEdge { edge: EdgeId, missing: NodeId },
    /// A second incoming edge to a node that already has a parent. Skipped.
    ConflictingParent { edge: EdgeId, node: NodeId },
    /// A leaf without a value.
    MissingValue { node: NodeId },
    /// The usable child probabilities of a node do not add up to 1.
    IncompleteProbabilities { node: NodeId, sum: f64 },
    /// A decision node none of whose children has a value.
    UnresolvedDecision { node: NodeId },
    /// Nodes not reachable from any root, left as they were.
    UnreachableNodes(Vec<NodeId>),
}

impl ValuationDiagnostic {
    /// Structural problems with the input, as opposed to a tree that is merely unfinished.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ValuationDiagnostic::NoRoots { .. }
                | ValuationDiagnostic::DanglingEdge { .. }
                | ValuationDiagnostic::ConflictingParent { .. }
                | ValuationDiagnostic::UnreachableNodes(_)
        )
    }

    /// The node a per-node diagnostic is about.
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            ValuationDiagnostic::ConflictingParent { node, .. }
            | ValuationDiagnostic::MissingValue { node }
            | ValuationDiagnostic::IncompleteProbabilities { node, .. }
            | ValuationDiagnostic::UnresolvedDecision { node } => Some(node),
            ValuationDiagnostic::NoRoots { .. }
            | ValuationDiagnostic::DanglingEdge { .. }
            | ValuationDiagnostic::UnreachableNodes(_) => None,
        }
    }
}

impl Display for ValuationDiagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValuationDiagnostic::NoRoots { cycles } if cycles.is_empty() => {
                write!(f, "no root nodes found")
            }
            ValuationDiagnostic::NoRoots { cycles } => {
                write!(f, "no root nodes found, cycles: {cycles:?}")
            }
            ValuationDiagnostic::DanglingEdge { edge, missing } => {
                write!(f, "edge {edge} references missing node {missing}")
            }
            ValuationDiagnostic::ConflictingParent { edge, node } => {
                write!(f, "edge {edge} is a second parent link into node {node}")
            }
            ValuationDiagnostic::MissingValue { node } => write!(f, "node {node} has no value"),
            ValuationDiagnostic::IncompleteProbabilities { node, sum } => {
                write!(f, "probabilities below node {node} sum to {sum}, not 1")
            }
            ValuationDiagnostic::UnresolvedDecision { node } => {
                write!(f, "decision node {node} has no valued option")
            }
            ValuationDiagnostic::UnreachableNodes(nodes) => {
                write!(f, "nodes unreachable from any root: {nodes:?}")
            }
        }
    }
}
