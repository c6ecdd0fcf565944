//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for task results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Consensus summary, merged result and per-model scores
    Full,
    /// Only the merged result
    Result,
    /// JSON output
    Json,
}

/// CLI arguments for nutri-quorum
#[derive(Parser, Debug)]
#[command(name = "nutri-quorum")]
#[command(author, version, about = "Multi-model consensus for nutrition agents")]
#[command(long_about = r#"
nutri-quorum asks several inference models the same nutrition question
and reconciles their answers into one result with a confidence score.

Tasks: recipe_generation, food_detection, nutrition_validation,
profile_analysis, meal_plan_generation, coaching

Configuration files are loaded from (in priority order):
1. --config <path>                         Explicit config file
2. NUTRI_QUORUM_<SECTION>__<KEY>           Environment variables
3. ./nutri-quorum.toml                     Project-level config
4. ~/.config/nutri-quorum/config.toml      Global config

Example:
  nutri-quorum run nutrition_validation --input meal.json
  echo '{"ingredients":["rice","chicken"]}' | nutri-quorum run recipe_generation --solo
  nutri-quorum validate food_detection --responses recorded.json
  nutri-quorum fallback profile_analysis --input profile.json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory for daily-rolling log files
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and the effective config, then exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a task against the configured models and print the consensus
    Run {
        /// Task type tag (e.g. nutrition_validation)
        task: String,

        /// JSON input file ("-" or omitted reads stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Models to fan out to (can be specified multiple times)
        #[arg(short, long, value_name = "MODEL")]
        model: Vec<String>,

        /// Ask a single model instead of the ensemble
        #[arg(long)]
        solo: bool,

        /// Minimum number of responses for a valid consensus
        #[arg(long, value_name = "N")]
        min_agreement: Option<usize>,
    },

    /// Validate recorded agent responses (JSON array) offline
    Validate {
        /// Task type tag; unknown tags merge by highest confidence
        task: String,

        /// JSON file holding an array of agent responses ("-" reads stdin)
        #[arg(short, long, value_name = "FILE")]
        responses: Option<PathBuf>,

        /// Minimum number of responses for a valid consensus
        #[arg(long, value_name = "N")]
        min_agreement: Option<usize>,
    },

    /// Print the rule-based result for a task without calling any model
    Fallback {
        /// Task type tag
        task: String,

        /// JSON input file ("-" or omitted reads stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
}
