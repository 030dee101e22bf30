//! Basic usage example for payoff-core
//!
//! This example demonstrates:
//! - Building a DecisionTree with formula-valued nodes and edges
//! - Saving it to disk and loading it back
//! - Evaluating it and reading values, path probabilities and the risk profile
//! - Re-evaluating after an edit
//!
//! Run with: cargo run --example basic_usage

use payoff_core::{
    evaluator::Evaluator,
    index::Revision,
    properties::{DecisionTree, NodeKind, TreeEdge, TreeNode, Variable, VariableScope},
    PayoffError,
};
use tempfile::TempDir;

fn main() -> Result<(), PayoffError> {
    // Set up logging to see what's happening
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== payoff Basic Usage Example ===\n");

    // 1. Build a tree
    println!("1. Building a litigation tree...");
    let mut tree = DecisionTree::default();
    tree.add_variable(Variable::new("award", VariableScope::Value, "$1,000,000"))
        .add_variable(Variable::new("p_win", VariableScope::Probability, "40%"))
        .add_node(TreeNode::new("settle?", NodeKind::Decision))
        .add_node(TreeNode::new("settle", NodeKind::Terminal).with_value("$350,000"))
        .add_node(TreeNode::new("trial", NodeKind::Chance).with_cost("$60,000"))
        .add_node(TreeNode::new("win", NodeKind::Terminal).with_value("award"))
        .add_node(TreeNode::new("lose", NodeKind::Terminal).with_value("0"))
        .add_edge(TreeEdge::new("accept", "settle?", "settle"))
        .add_edge(TreeEdge::new("litigate", "settle?", "trial"))
        .add_edge(TreeEdge::new("verdict_for", "trial", "win").with_probability("p_win"))
        .add_edge(TreeEdge::new("verdict_against", "trial", "lose").with_probability("1 - p_win"));

    // 2. Round-trip through a file
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("litigation.json");
    std::fs::write(&path, serde_json::to_string_pretty(&tree)?)?;
    println!("2. Saved tree to {path:?}");
    let tree = DecisionTree::from_path(&path)?;

    // 3. Evaluate
    println!("3. Evaluating...\n");
    let evaluator = Evaluator::default();
    let mut revision = Revision(1);
    let evaluation = evaluator.evaluate(&tree, revision);
    print!("{}", evaluation.render_table()?);

    // 4. Risk profile
    println!("\n4. Risk profile:");
    let profile = evaluation.risk_profile();
    for point in profile.points.iter() {
        println!(
            "   {:<8} {:>12.2}  p={:.2}  cum={:.2}",
            point.node, point.value, point.probability, point.cumulative
        );
    }
    println!("   expected value: {:.2}", profile.expected_value());

    // 5. A better offer arrives; only a formula changes, so the revision stays.
    println!("\n5. Raising the settlement offer...");
    let mut tree = tree;
    if let Some(node) = tree.nodes.get_mut("settle") {
        node.value_expr = Some("$400,000".to_string());
    }
    let evaluation = evaluator.evaluate(&tree, revision);
    println!(
        "   accept: {:?}, litigate: {:?}",
        evaluation.edge_probability("accept"),
        evaluation.edge_probability("litigate")
    );

    // 6. Structural edit: add a mediation option, which needs a new revision.
    println!("\n6. Adding mediation...");
    tree.add_node(TreeNode::new("mediate", NodeKind::Terminal).with_value("$400,000 - 5,000"))
        .add_edge(TreeEdge::new("mediation", "settle?", "mediate"));
    revision = revision.next();
    let evaluation = evaluator.evaluate(&tree, revision);
    println!(
        "   best value: {:?}, roots: {:?}",
        evaluation.node_value("settle?"),
        evaluation.index().roots()
    );

    println!("\n=== Example Complete ===");
    Ok(())
}
