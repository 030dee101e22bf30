//! Valuation module: expected values for decision trees.
//!
//! # Module Organization
//!
//! - [`engine`]: backward propagation of values and costs, decision optimization
//! - [`diagnostic`]: non-fatal conditions reported alongside the result
//!
//! ```rust
//! use payoff_core::{
//!     compute::{ComputeEdge, ComputeGraph, ComputeNode},
//!     properties::NodeKind,
//!     valuation::compute_node_values,
//! };
//!
//! let mut graph = ComputeGraph::default();
//! graph
//!     .insert_node(ComputeNode::new("root", NodeKind::Chance))
//!     .insert_node(ComputeNode::new("a", NodeKind::Terminal).with_value(10.0))
//!     .insert_node(ComputeNode::new("b", NodeKind::Terminal).with_value(20.0))
//!     .insert_edge(ComputeEdge::new("ra", "root", "a", Some(0.5)))
//!     .insert_edge(ComputeEdge::new("rb", "root", "b", Some(0.5)));
//!
//! let valuation = compute_node_values(graph);
//! assert_eq!(valuation.graph.value("root"), Some(15.0));
//! ```

mod diagnostic;
mod engine;


pub use diagnostic::ValuationDiagnostic;
pub use engine::{compute_node_values, compute_node_values_with, Valuation};
