//! payoff CLI tool
//!
//! Command-line interface for rolling back decision trees with payoff-core.
//!
//! ## Commands
//!
//! - `evaluate <tree>`: Value every node and print the results as a table or JSON
//! - `profile <tree>`: Print the terminal outcome distribution
//!
//! Trees are read from `.json` or `.toml` files. Engine settings (comparison tolerance, decision
//! fallback) come from an optional TOML file passed with `--config`.

use clap::{Parser, Subcommand, ValueEnum};
use payoff_core::{
    config::EngineConfig, evaluator::Evaluator, index::Revision, properties::DecisionTree,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "payoff")]
#[command(author, version, about = "Expected-value rollback for decision trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Value every node of a tree
    Evaluate {
        /// Path to the tree file (.json or .toml)
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Engine configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the distribution of terminal outcomes
    Profile {
        /// Path to the tree file (.json or .toml)
        path: PathBuf,

        /// Engine configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, payoff_core::PayoffError> {
    match path {
        Some(path) => EngineConfig::from_toml_path(path),
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            path,
            format,
            config,
        } => {
            let evaluator = Evaluator::new(load_config(config.as_deref())?);
            let tree = DecisionTree::from_path(&path)?;
            let evaluation = evaluator.evaluate(&tree, Revision::default());
            for warning in evaluation.diagnostics().iter().filter(|d| d.is_warning()) {
                tracing::warn!("{}", warning);
            }
            match format {
                Format::Table => print!("{}", evaluation.render_table()?),
                Format::Json => println!("{}", serde_json::to_string_pretty(&evaluation.report())?),
            }
            Ok(())
        }

        Commands::Profile { path, config } => {
            let evaluator = Evaluator::new(load_config(config.as_deref())?);
            let tree = DecisionTree::from_path(&path)?;
            let profile = evaluator.evaluate(&tree, Revision::default()).risk_profile();
            if profile.is_empty() {
                println!("No valued outcomes in {}", path.display());
                return Ok(());
            }
            println!("{:<20} {:>14} {:>10} {:>10}", "outcome", "value", "p", "cum p");
            for point in profile.points.iter() {
                println!(
                    "{:<20} {:>14.4} {:>10.4} {:>10.4}",
                    point.node, point.value, point.probability, point.cumulative
                );
            }
            println!();
            println!("expected value: {:.4}", profile.expected_value());
            println!("total probability: {:.4}", profile.total_probability());
            Ok(())
        }
    }
}
