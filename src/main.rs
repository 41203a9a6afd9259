use anyhow::{Context, Result};
use clap::Parser;
use colored::control as color_control;
use modelsync::cli::commands::build::{BuildCommand, BuildCommandHandler};
use modelsync::cli::commands::drop::{DropCommand, DropCommandHandler};
use modelsync::cli::commands::validate::{ValidateCommand, ValidateCommandHandler};
use modelsync::cli::commands::TableFailures;
use modelsync::cli::logging::init_logging;
use modelsync::cli::prompt::interactive_confirmation;
use modelsync::cli::{Cli, Commands};
use std::process;

fn main() {
    sqlx::any::install_default_drivers();

    // CLIをパースして実行
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    // 照合と適用は逐次実行のため、シングルスレッドのランタイムを使う
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")
        .unwrap_or_else(|e| {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        });

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            // 一部のテーブルが失敗した場合も結果は表示する
            if let Some(failures) = e.downcast_ref::<TableFailures>() {
                println!("{}", failures.output);
            }
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<String> {
    match cli.command {
        Commands::Build {
            project_dir,
            force,
            drop_tables,
        } => {
            let mut handler = BuildCommandHandler::new();
            if !force {
                handler = handler.with_confirmation(interactive_confirmation());
            }
            let command = BuildCommand {
                project_dir,
                force,
                drop_tables,
                format: cli.format,
            };
            handler.execute(&command).await
        }

        Commands::Drop { project_dir, force } => {
            let mut handler = DropCommandHandler::new();
            if !force {
                handler = handler.with_confirmation(interactive_confirmation());
            }
            let command = DropCommand {
                project_dir,
                force,
                format: cli.format,
            };
            handler.execute(&command).await
        }

        Commands::Validate { project_dir } => {
            let handler = ValidateCommandHandler::new();
            let command = ValidateCommand {
                project_dir,
                format: cli.format,
            };
            handler.execute(&command)
        }
    }
}
