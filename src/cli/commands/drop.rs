// dropコマンドハンドラー
//
// プロジェクトのモデルで定義されたすべてのテーブルを削除します。
// --force が無い場合はテーブルごとに確認し、承認されなかったものは保留として報告します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::build::progress_bar;
use crate::cli::commands::table_outcome::{OutcomeSummary, TableOutcome};
use crate::cli::commands::{render_output, CommandOutput, TableFailures};
use crate::cli::OutputFormat;
use crate::core::confirmation::Confirmation;
use crate::core::model::TableRef;
use crate::services::schema_executor::SchemaExecutor;
use crate::services::schema_reconciler::SchemaReconciler;
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// dropコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct DropOutput {
    /// データベース方言
    pub dialect: String,
    /// テーブルごとの結果
    pub tables: Vec<TableOutcome>,
    /// サマリー
    pub summary: OutcomeSummary,
}

impl CommandOutput for DropOutput {
    fn to_text(&self) -> String {
        let mut text = format!("=== Drop ({}) ===\n", self.dialect);
        for outcome in &self.tables {
            text.push_str(&outcome.to_text());
        }
        text.push('\n');
        text.push_str(&self.summary.to_text());
        text
    }
}

/// dropコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct DropCommand {
    /// プロジェクトディレクトリ
    pub project_dir: PathBuf,
    /// 確認なしで削除
    pub force: bool,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// dropコマンドハンドラー
#[derive(Default)]
pub struct DropCommandHandler {
    confirmation: Option<Box<dyn Confirmation>>,
}

impl std::fmt::Debug for DropCommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropCommandHandler")
            .field("interactive", &self.confirmation.is_some())
            .finish()
    }
}

impl DropCommandHandler {
    /// 新しいDropCommandHandlerを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 削除の確認を設定
    pub fn with_confirmation(mut self, confirmation: Box<dyn Confirmation>) -> Self {
        self.confirmation = Some(confirmation);
        self
    }

    /// dropコマンドを実行
    ///
    /// # Arguments
    ///
    /// * `command` - dropコマンドのパラメータ
    ///
    /// # Returns
    ///
    /// 成功時は削除結果、いずれかの削除が失敗した場合は TableFailures
    pub async fn execute(&mut self, command: &DropCommand) -> Result<String> {
        let context = CommandContext::load(&command.project_dir)?;
        let connection = context.connect().await?;

        let dialect = context.dialect();
        let reconciler = SchemaReconciler::new(dialect);
        let executor = SchemaExecutor::new(dialect);

        let tables: Vec<TableRef> = context
            .project
            .table_refs(connection.default_schema())
            .map(|(table, _)| table)
            .collect();
        let progress = progress_bar(tables.len() as u64, &command.format);

        let mut outcomes = Vec::new();
        for mut plan in reconciler.plan_drop_tables(&tables, command.force) {
            progress.set_message(plan.table.to_string());
            if let Some(confirmation) = self.confirmation.as_mut() {
                progress.suspend(|| {
                    plan.approve_pending(|action| confirmation.confirm(&action.to_string()));
                });
            }
            let report = executor.apply(&connection, &plan.actions).await;
            outcomes.push(TableOutcome::from_plan(plan, report));
            progress.inc(1);
        }
        progress.finish_and_clear();
        connection.close().await;

        let summary = OutcomeSummary::from_outcomes(&outcomes);
        info!(
            tables = summary.tables,
            dropped = summary.applied,
            pending = summary.pending,
            "Drop finished"
        );

        let output = DropOutput {
            dialect: dialect.to_string(),
            tables: outcomes,
            summary,
        };
        let rendered = render_output(&output, &command.format)?;
        if output.summary.failed > 0 {
            return Err(TableFailures {
                output: rendered,
                failed: output.summary.failed,
            }
            .into());
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database_introspector::create_introspector;
    use crate::cli::commands::build::{BuildCommand, BuildCommandHandler};
    use crate::core::config::Dialect;
    use crate::core::confirmation::FixedAnswer;
    use std::fs;
    use tempfile::TempDir;

    async fn built_project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("app.db");
        fs::write(
            temp_dir.path().join("config.yaml"),
            format!("database:\n  connection: sqlite://{}\n", db_path.display()),
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("users.yaml"),
            "columns:\n  - name: id\n    type: integer\n    primary_key: true\n",
        )
        .unwrap();

        BuildCommandHandler::new()
            .execute(&BuildCommand {
                project_dir: temp_dir.path().to_path_buf(),
                force: false,
                drop_tables: false,
                format: OutputFormat::Json,
            })
            .await
            .unwrap();
        temp_dir
    }

    async fn live_tables(dir: &std::path::Path) -> Vec<String> {
        let context = CommandContext::load(dir).unwrap();
        let connection = context.connect().await.unwrap();
        let tables = create_introspector(Dialect::SQLite)
            .list_tables(connection.pool(), None)
            .await
            .unwrap();
        connection.close().await;
        tables
    }

    fn command(dir: &std::path::Path, force: bool) -> DropCommand {
        DropCommand {
            project_dir: dir.to_path_buf(),
            force,
            format: OutputFormat::Json,
        }
    }

    #[tokio::test]
    async fn test_drop_without_force_or_confirmation_keeps_tables() {
        let temp_dir = built_project().await;

        let output = DropCommandHandler::new()
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();
        let output: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(output["summary"]["pending"], 1);
        assert_eq!(live_tables(temp_dir.path()).await, vec!["users"]);
    }

    #[tokio::test]
    async fn test_drop_declined_keeps_tables() {
        let temp_dir = built_project().await;

        DropCommandHandler::new()
            .with_confirmation(Box::new(FixedAnswer::never()))
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();

        assert_eq!(live_tables(temp_dir.path()).await, vec!["users"]);
    }

    #[tokio::test]
    async fn test_drop_with_force_is_repeatable() {
        let temp_dir = built_project().await;

        let output = DropCommandHandler::new()
            .execute(&command(temp_dir.path(), true))
            .await
            .unwrap();
        let output: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(output["summary"]["applied"], 1);
        assert!(live_tables(temp_dir.path()).await.is_empty());

        // DROP TABLE IF EXISTS のため2回目も成功する
        DropCommandHandler::new()
            .execute(&command(temp_dir.path(), true))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_drop_with_confirmation() {
        let temp_dir = built_project().await;

        DropCommandHandler::new()
            .with_confirmation(Box::new(FixedAnswer::always()))
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();

        assert!(live_tables(temp_dir.path()).await.is_empty());
    }
}
