// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;
pub mod logging;
pub mod prompt;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Structured JSON output
    Json,
}

/// Modelsync - Apply YAML table models to a relational database
///
/// Reads one YAML model per table, compares it with the live database
/// and applies the DDL needed to make the database match.
#[derive(Parser, Debug)]
#[command(name = "modelsync")]
#[command(author = "Modelsync Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Apply YAML table models to a relational database")]
#[command(long_about = "Modelsync - Apply YAML table models to a relational database

Describe each table in its own YAML model file and let modelsync bring
the live database in line with it.

Modelsync helps you:
  • Create missing tables and add new columns
  • Change column types when the model changes
  • Drop columns and tables only with --force or your confirmation
  • Validate models before touching the database

Supported databases: PostgreSQL, MySQL, SQLite")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Create a project directory with config.yaml
  2. Add one YAML model file per table
  3. Check the models:             modelsync validate ./project
  4. Apply them to the database:    modelsync build ./project

For detailed help on each command, use: modelsync <command> --help")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text or json)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile the database with the models of a project
    ///
    /// Creates missing tables, adds new columns and alters changed column
    /// types. Column drops and primary key or auto increment changes are
    /// destructive: they run only with --force or after confirmation.
    ///
    /// EXAMPLES:
    ///   # Apply models
    ///   modelsync build ./project
    ///
    ///   # Also drop columns that are no longer modeled
    ///   modelsync build ./project --force
    ///
    ///   # Drop tables that have no model
    ///   modelsync build ./project --drop-tables --force
    Build {
        /// Project directory containing config.yaml and model files
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,

        /// Apply destructive changes without confirmation
        #[arg(short, long)]
        force: bool,

        /// Drop live tables that are not defined by any model
        #[arg(long)]
        drop_tables: bool,
    },

    /// Drop every table defined by the models of a project
    ///
    /// EXAMPLES:
    ///   # Drop with confirmation
    ///   modelsync drop ./project
    ///
    ///   # Drop without confirmation
    ///   modelsync drop ./project --force
    Drop {
        /// Project directory containing config.yaml and model files
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,

        /// Drop without confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the config and model files without connecting
    ///
    /// EXAMPLES:
    ///   modelsync validate ./project
    Validate {
        /// Project directory containing config.yaml and model files
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,
    },
}
