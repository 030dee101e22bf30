//! # payoff-core
//!
//! Expected-value rollback for decision trees.
//!
//! ## Overview
//!
//! A decision tree is authored as a [`properties::DecisionTree`]: decision, chance and terminal
//! nodes joined by structural edges, with payoffs, costs and probabilities written as small
//! formulas (`"$1,200"`, `"35%"`, `"1 - p_success"`). Each recompute turns that persisted tree
//! into a numeric [`compute::ComputeGraph`], indexes its structure, and rolls values back from
//! the leaves:
//!
//! - **Chance** nodes take the probability-weighted sum of their children, but only when the
//!   child probabilities add up to 1.
//! - **Decision** nodes pick their best child, rewriting their outgoing edge probabilities so the
//!   winner (or winners, on a tie) carries all the mass.
//! - Costs accumulate down each path and are subtracted once, at the leaves.
//!
//! Anything undetermined stays `None` and propagates upward instead of being read as zero.
//!
//! ## Architecture
//!
//! - **[`expression`]**: formula normalization and evaluation (`ExpressionResolver` trait)
//! - **[`compute`]**: the numeric graph adapter, derived from a persisted tree
//! - **[`index`]**: children/parent maps, root detection, cycle reporting and the revision cache
//! - **[`valuation`]**: the rollback engine and its diagnostics
//! - **[`paths`]**: path probability, path cost, path value and the risk profile
//! - **[`evaluator`]**: all of the above as one call, with a serializable report
//! - **[`config`]**: engine tolerances and policies, loadable from TOML
//!
//! ## Quick Start
//!
//! ```rust
//! use payoff_core::{
//!     evaluator::Evaluator,
//!     index::Revision,
//!     properties::{DecisionTree, NodeKind, TreeEdge, TreeNode},
//! };
//!
//! let mut tree = DecisionTree::default();
//! tree.add_node(TreeNode::new("bet?", NodeKind::Decision))
//!     .add_node(TreeNode::new("coin", NodeKind::Chance).with_cost("10"))
//!     .add_node(TreeNode::new("heads", NodeKind::Terminal).with_value("$50"))
//!     .add_node(TreeNode::new("tails", NodeKind::Terminal).with_value("0"))
//!     .add_node(TreeNode::new("pass", NodeKind::Terminal).with_value("0"))
//!     .add_edge(TreeEdge::new("take", "bet?", "coin"))
//!     .add_edge(TreeEdge::new("decline", "bet?", "pass"))
//!     .add_edge(TreeEdge::new("h", "coin", "heads").with_probability("50%"))
//!     .add_edge(TreeEdge::new("t", "coin", "tails").with_probability("50%"));
//!
//! let evaluation = Evaluator::default().evaluate(&tree, Revision(1));
//! assert_eq!(evaluation.node_value("coin"), Some(15.0));
//! assert_eq!(evaluation.node_value("bet?"), Some(15.0));
//! assert_eq!(evaluation.edge_probability("take"), Some(1.0));
//! assert_eq!(evaluation.edge_probability("decline"), Some(0.0));
//! ```
//!
//! Per-call control over the index and configuration is available through
//! [`valuation::compute_node_values_with`].

pub mod compute;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod index;
pub mod paths;
pub mod properties;
#[cfg(test)]
mod tests;
pub mod valuation;

pub use error::*;
