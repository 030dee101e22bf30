//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::PathBuf;
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Oil wildcatter tree as JSON: drill (cost 70k) into a 3-way chance node, or sell the lease.
///
/// Expected rollback: dry -70k, wet 50k, soaking 200k, drill 0.5*-70 + 0.3*50 + 0.2*200 = 20k,
/// which beats selling at 10k.
#[allow(dead_code)]
pub const WILDCATTER_JSON: &str = r#"{
    "variables": [
        {"name": "drill_cost", "scope": "cost", "expr": "$70,000"},
        {"name": "p_dry", "scope": "probability", "expr": "50%"}
    ],
    "nodes": {
        "drill?": {"id": "drill?", "kind": "decision"},
        "well": {"id": "well", "kind": "chance", "cost_expr": "drill_cost"},
        "dry": {"id": "dry", "kind": "terminal", "value_expr": "0"},
        "wet": {"id": "wet", "kind": "terminal", "value_expr": "$120,000"},
        "soaking": {"id": "soaking", "kind": "terminal", "value_expr": "$270,000"},
        "sell": {"id": "sell", "kind": "terminal", "value_expr": "$10,000"},
        "sticky": {"id": "sticky", "kind": "note", "label": "survey pending"}
    },
    "edges": {
        "drill": {"id": "drill", "source": "drill?", "target": "well"},
        "sell_lease": {"id": "sell_lease", "source": "drill?", "target": "sell"},
        "p1": {"id": "p1", "source": "well", "target": "dry", "probability_expr": "p_dry"},
        "p2": {"id": "p2", "source": "well", "target": "wet", "probability_expr": "30%"},
        "p3": {"id": "p3", "source": "well", "target": "soaking", "probability_expr": "1 - p_dry - 0.3"},
        "pin": {"id": "pin", "source": "sticky", "target": "well", "kind": "arrow"}
    }
}"#;

/// A two-outcome gamble in TOML form.
#[allow(dead_code)]
pub const GAMBLE_TOML: &str = r#"
[[variables]]
name = "stake"
scope = "cost"
expr = "25"

[nodes.play]
id = "play"
kind = "chance"
cost_expr = "stake"

[nodes.win]
id = "win"
kind = "terminal"
value_expr = "100"

[nodes.lose]
id = "lose"
kind = "terminal"
value_expr = "0"

[edges.w]
id = "w"
source = "play"
target = "win"
probability_expr = "1/4"

[edges.l]
id = "l"
source = "play"
target = "lose"
probability_expr = "3/4"
"#;

/// Write `content` to `<temp_dir>/<name>` and return the path.
#[allow(dead_code)]
pub fn write_fixture(temp_dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp_dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[allow(dead_code)]
pub fn assert_close(actual: Option<f64>, expected: f64) {
    match actual {
        Some(actual) => assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        ),
        None => panic!("expected {expected}, got None"),
    }
}
