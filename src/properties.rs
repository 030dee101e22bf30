/// [crate::properties] contains the persisted shape of a decision tree: the nodes, edges and
/// variables an editor stores, each carrying formula strings rather than resolved numbers.
pub use enumset::EnumSet;
use enumset::*;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    fs::read_to_string,
    path::Path,
};

use crate::error::PayoffError;

pub type NodeId = String;
pub type EdgeId = String;

/// The role a node plays in a tree. `Note` and `Ghost` are ornamental: they are drawn by an
/// editor but never take part in valuation.
#[derive(Debug, Default, Serialize, Deserialize, PartialOrd, Ord, Hash, EnumSetType)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Decision,
    #[default]
    Chance,
    Terminal,
    Note,
    Ghost,
}

impl NodeKind {
    pub const ORNAMENTAL: EnumSet<NodeKind> = enum_set!(NodeKind::Note | NodeKind::Ghost);

    pub fn is_ornamental(&self) -> bool {
        NodeKind::ORNAMENTAL.contains(*self)
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Decision => "decision",
            NodeKind::Chance => "chance",
            NodeKind::Terminal => "terminal",
            NodeKind::Note => "note",
            NodeKind::Ghost => "ghost",
        };
        write!(f, "{name}")
    }
}

/// Structural edges form the tree. Arrows are free-floating annotation connectors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Structural,
    Arrow,
}

impl EdgeKind {
    pub fn is_ornamental(&self) -> bool {
        matches!(self, EdgeKind::Arrow)
    }
}

/// Which formulas a variable is visible to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableScope {
    Value,
    Cost,
    Probability,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_expr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_expr: Option<String>,
}

impl TreeNode {
    pub fn new(id: &str, kind: NodeKind) -> Self {
        TreeNode {
            id: id.to_string(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, expr: &str) -> Self {
        self.value_expr = Some(expr.to_string());
        self
    }

    pub fn with_cost(mut self, expr: &str) -> Self {
        self.cost_expr = Some(expr.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_expr: Option<String>,
}

impl TreeEdge {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        TreeEdge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            ..Default::default()
        }
    }

    pub fn with_probability(mut self, expr: &str) -> Self {
        self.probability_expr = Some(expr.to_string());
        self
    }

    pub fn arrow(mut self) -> Self {
        self.kind = EdgeKind::Arrow;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub scope: VariableScope,
    pub expr: String,
}

impl Variable {
    pub fn new(name: &str, scope: VariableScope, expr: &str) -> Self {
        Variable {
            name: name.to_string(),
            scope,
            expr: expr.to_string(),
        }
    }
}

/// A persisted decision tree. Maps are keyed (and therefore iterated) by id.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionTree {
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, TreeNode>,
    #[serde(default)]
    pub edges: BTreeMap<EdgeId, TreeEdge>,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl DecisionTree {
    pub fn add_node(&mut self, node: TreeNode) -> &mut Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    pub fn add_edge(&mut self, edge: TreeEdge) -> &mut Self {
        self.edges.insert(edge.id.clone(), edge);
        self
    }

    pub fn add_variable(&mut self, variable: Variable) -> &mut Self {
        self.variables.push(variable);
        self
    }

    /// Read a tree from a `.json` or `.toml` file, chosen by extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<DecisionTree, PayoffError> {
        let path = path.as_ref();
        tracing::debug!("Reading decision tree from {:?}", path);
        let content = read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("toml") => Ok(toml::from_str(&content)?),
            other => Err(PayoffError::Serialization(format!(
                "Unsupported tree file extension {other:?} for {path:?}, expected .json or .toml"
            ))),
        }
    }
}
