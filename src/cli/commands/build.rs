// buildコマンドハンドラー
//
// プロジェクトのモデルとデータベースを照合し、差分を適用します。
// - テーブルごとにイントロスペクション → 照合 → 確認 → 適用
// - 失敗はテーブル単位で記録し、次のテーブルへ進む
// - --drop-tables 指定時はモデルにないテーブルを削除

use crate::adapters::database::DatabaseConnection;
use crate::adapters::database_introspector::{create_introspector, DatabaseIntrospector};
use crate::cli::command_context::CommandContext;
use crate::cli::commands::table_outcome::{OutcomeSummary, TableOutcome};
use crate::cli::commands::{render_output, CommandOutput, TableFailures};
use crate::cli::OutputFormat;
use crate::core::confirmation::Confirmation;
use crate::core::error::DatabaseError;
use crate::core::model::TableRef;
use crate::core::schema_diff::ReconcilePlan;
use crate::services::schema_executor::SchemaExecutor;
use crate::services::schema_reconciler::SchemaReconciler;
use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// buildコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutput {
    /// データベース方言
    pub dialect: String,
    /// テーブルごとの結果
    pub tables: Vec<TableOutcome>,
    /// サマリー
    pub summary: OutcomeSummary,
    /// テーブルに属さないエラー
    pub errors: Vec<String>,
}

impl BuildOutput {
    /// 失敗を含むかどうか
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0 || !self.errors.is_empty()
    }
}

impl CommandOutput for BuildOutput {
    fn to_text(&self) -> String {
        let mut text = format!("=== Build ({}) ===\n", self.dialect);
        for outcome in &self.tables {
            text.push_str(&outcome.to_text());
        }
        for error in &self.errors {
            text.push_str(&format!("{} {}\n", "✗".red().bold(), error));
        }
        text.push('\n');
        text.push_str(&self.summary.to_text());
        text
    }
}

/// buildコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct BuildCommand {
    /// プロジェクトディレクトリ
    pub project_dir: PathBuf,
    /// 破壊的変更を確認なしで適用
    pub force: bool,
    /// モデルにないテーブルを削除
    pub drop_tables: bool,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// buildコマンドハンドラー
#[derive(Default)]
pub struct BuildCommandHandler {
    confirmation: Option<Box<dyn Confirmation>>,
}

impl std::fmt::Debug for BuildCommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildCommandHandler")
            .field("interactive", &self.confirmation.is_some())
            .finish()
    }
}

impl BuildCommandHandler {
    /// 新しいBuildCommandHandlerを作成
    ///
    /// 確認を設定しない場合、破壊的変更は保留として報告されます。
    pub fn new() -> Self {
        Self::default()
    }

    /// 保留中の破壊的変更に使う確認を設定
    pub fn with_confirmation(mut self, confirmation: Box<dyn Confirmation>) -> Self {
        self.confirmation = Some(confirmation);
        self
    }

    /// buildコマンドを実行
    ///
    /// # Arguments
    ///
    /// * `command` - buildコマンドのパラメータ
    ///
    /// # Returns
    ///
    /// 成功時はテーブルごとの結果。いずれかのテーブルが失敗した場合は
    /// 出力を保持した TableFailures
    pub async fn execute(&mut self, command: &BuildCommand) -> Result<String> {
        // 設定・モデルのエラーは接続前に検出する
        let context = CommandContext::load(&command.project_dir)?;
        let connection = context.connect().await?;

        let output = self.run(&context, &connection, command).await;
        connection.close().await;

        let rendered = render_output(&output, &command.format)?;
        if output.has_failures() {
            return Err(TableFailures {
                output: rendered,
                failed: output.summary.failed,
            }
            .into());
        }
        Ok(rendered)
    }

    /// 接続済みのデータベースに対して照合・適用を行う
    async fn run(
        &mut self,
        context: &CommandContext,
        connection: &DatabaseConnection,
        command: &BuildCommand,
    ) -> BuildOutput {
        let dialect = context.dialect();
        let introspector = create_introspector(dialect);
        let reconciler = SchemaReconciler::new(dialect);
        let executor = SchemaExecutor::new(dialect);

        let tables: Vec<_> = context
            .project
            .table_refs(connection.default_schema())
            .collect();
        let progress = progress_bar(tables.len() as u64, &command.format);

        let mut outcomes = Vec::new();
        let mut errors = Vec::new();

        for (table, spec) in &tables {
            progress.set_message(table.to_string());

            let live = match introspector
                .inspect(connection.pool(), table.schema.as_deref(), &table.name)
                .await
            {
                Ok(live) => live,
                Err(e) => {
                    error!(table = %table, error = %e, "Inspection failed");
                    outcomes.push(TableOutcome::inspection_failed(table.clone(), &e));
                    progress.inc(1);
                    continue;
                }
            };

            let mut plan = reconciler.reconcile(table, spec, live.as_deref(), command.force);
            for unresolved in &plan.unresolved {
                warn!(table = %table, column = %unresolved.column, "{}", unresolved);
            }
            debug!(
                table = %table,
                actions = plan.actions.len(),
                pending = plan.pending.len(),
                "Reconciled table"
            );

            self.confirm_pending(&mut plan, &progress);
            let report = executor.apply(connection, &plan.actions).await;
            outcomes.push(TableOutcome::from_plan(plan, report));
            progress.inc(1);
        }

        if command.drop_tables {
            let modeled: Vec<TableRef> = tables.iter().map(|(table, _)| table.clone()).collect();
            match self
                .drop_unmodeled_tables(
                    introspector.as_ref(),
                    &reconciler,
                    &executor,
                    connection,
                    &modeled,
                    command.force,
                    &progress,
                )
                .await
            {
                Ok(dropped) => outcomes.extend(dropped),
                Err(e) => {
                    error!(error = %e, "Failed to list tables");
                    errors.push(format!("Failed to list tables for --drop-tables: {}", e));
                }
            }
        }

        progress.finish_and_clear();

        let summary = OutcomeSummary::from_outcomes(&outcomes);
        info!(
            tables = summary.tables,
            applied = summary.applied,
            pending = summary.pending,
            failed = summary.failed,
            "Build finished"
        );

        BuildOutput {
            dialect: dialect.to_string(),
            tables: outcomes,
            summary,
            errors,
        }
    }

    /// モデルに定義されていないテーブルを削除
    #[allow(clippy::too_many_arguments)]
    async fn drop_unmodeled_tables(
        &mut self,
        introspector: &dyn DatabaseIntrospector,
        reconciler: &SchemaReconciler,
        executor: &SchemaExecutor,
        connection: &DatabaseConnection,
        modeled: &[TableRef],
        force: bool,
        progress: &ProgressBar,
    ) -> Result<Vec<TableOutcome>, DatabaseError> {
        let schema = connection.default_schema();
        let live_tables = introspector.list_tables(connection.pool(), schema).await?;

        let unmodeled: Vec<TableRef> = live_tables
            .into_iter()
            .map(|name| TableRef::new(schema.map(str::to_string), name))
            .filter(|table| !modeled.contains(table))
            .collect();
        debug!(count = unmodeled.len(), "Found tables without a model");

        let mut outcomes = Vec::new();
        for mut plan in reconciler.plan_drop_tables(&unmodeled, force) {
            self.confirm_pending(&mut plan, progress);
            let report = executor.apply(connection, &plan.actions).await;
            outcomes.push(TableOutcome::from_plan(plan, report));
        }
        Ok(outcomes)
    }

    /// 保留中の破壊的アクションを1つずつ確認
    fn confirm_pending(&mut self, plan: &mut ReconcilePlan, progress: &ProgressBar) {
        if plan.pending.is_empty() {
            return;
        }
        let Some(confirmation) = self.confirmation.as_mut() else {
            return;
        };
        progress.suspend(|| {
            plan.approve_pending(|action| confirmation.confirm(&action.to_string()));
        });
    }
}

/// テーブル単位のプログレスバー
///
/// テキスト出力かつstderrが端末の場合のみ表示します。
pub(crate) fn progress_bar(len: u64, format: &OutputFormat) -> ProgressBar {
    if *format != OutputFormat::Text || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::confirmation::FixedAnswer;
    use std::fs;
    use tempfile::TempDir;

    fn write_project(dir: &std::path::Path, models: &[(&str, &str)]) {
        let db_path = dir.join("app.db");
        fs::write(
            dir.join("config.yaml"),
            format!("database:\n  connection: sqlite://{}\n", db_path.display()),
        )
        .unwrap();
        for (name, content) in models {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    fn command(dir: &std::path::Path, force: bool) -> BuildCommand {
        BuildCommand {
            project_dir: dir.to_path_buf(),
            force,
            drop_tables: false,
            format: OutputFormat::Json,
        }
    }

    const USERS: &str = "columns:\n  - name: id\n    type: integer\n    primary_key: true\n  - name: name\n    type: string\n    length: 100\n";
    const USERS_WITHOUT_NAME: &str =
        "name: users\ncolumns:\n  - name: id\n    type: integer\n    primary_key: true\n";

    #[tokio::test]
    async fn test_build_creates_table_then_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        write_project(temp_dir.path(), &[("users.yaml", USERS)]);

        let mut handler = BuildCommandHandler::new();
        let first = handler
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();
        let first: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert_eq!(first["summary"]["applied"], 1);
        assert_eq!(
            first["tables"][0]["results"][0]["action"]["action"],
            "create_table"
        );

        let second = handler
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();
        let second: serde_json::Value = serde_json::from_str(&second).unwrap();
        assert_eq!(second["summary"]["applied"], 0);
        assert_eq!(second["tables"][0]["results"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_build_withholds_drop_without_confirmation() {
        let temp_dir = TempDir::new().unwrap();
        write_project(temp_dir.path(), &[("users.yaml", USERS)]);
        BuildCommandHandler::new()
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();

        fs::write(temp_dir.path().join("users.yaml"), USERS_WITHOUT_NAME).unwrap();

        let output = BuildCommandHandler::new()
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();
        let output: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(output["summary"]["pending"], 1);
        assert_eq!(
            output["tables"][0]["pending"][0]["action"],
            "drop_column"
        );
    }

    #[tokio::test]
    async fn test_build_applies_confirmed_drop() {
        let temp_dir = TempDir::new().unwrap();
        write_project(temp_dir.path(), &[("users.yaml", USERS)]);
        BuildCommandHandler::new()
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();

        fs::write(temp_dir.path().join("users.yaml"), USERS_WITHOUT_NAME).unwrap();

        let output = BuildCommandHandler::new()
            .with_confirmation(Box::new(FixedAnswer::always()))
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();
        let output: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(output["summary"]["pending"], 0);
        assert_eq!(output["summary"]["applied"], 1);
        assert_eq!(
            output["tables"][0]["results"][0]["action"]["action"],
            "drop_column"
        );
    }

    #[tokio::test]
    async fn test_build_reports_failure_with_output() {
        let temp_dir = TempDir::new().unwrap();
        write_project(temp_dir.path(), &[("users.yaml", USERS)]);
        BuildCommandHandler::new()
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();

        // SQLiteでは型変更を表現できない
        fs::write(
            temp_dir.path().join("users.yaml"),
            "columns:\n  - name: id\n    type: integer\n    primary_key: true\n  - name: name\n    type: text\n",
        )
        .unwrap();

        let err = BuildCommandHandler::new()
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap_err();
        let failures = err.downcast_ref::<TableFailures>().unwrap();
        assert_eq!(failures.failed, 1);

        let output: serde_json::Value = serde_json::from_str(&failures.output).unwrap();
        assert_eq!(output["tables"][0]["results"][0]["status"], "failed");
        assert_eq!(output["tables"][0]["results"][0]["kind"], "unsupported");
    }

    #[tokio::test]
    async fn test_build_drop_tables_removes_unmodeled_table() {
        let temp_dir = TempDir::new().unwrap();
        write_project(
            temp_dir.path(),
            &[
                ("users.yaml", USERS),
                (
                    "orders.yaml",
                    "columns:\n  - name: id\n    type: integer\n    primary_key: true\n",
                ),
            ],
        );
        BuildCommandHandler::new()
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();

        fs::remove_file(temp_dir.path().join("orders.yaml")).unwrap();
        let mut drop_command = command(temp_dir.path(), true);
        drop_command.drop_tables = true;

        let output = BuildCommandHandler::new()
            .execute(&drop_command)
            .await
            .unwrap();
        let output: serde_json::Value = serde_json::from_str(&output).unwrap();
        let tables = output["tables"].as_array().unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1]["table"]["name"], "orders");
        assert_eq!(tables[1]["results"][0]["action"]["action"], "drop_table");
        assert_eq!(tables[1]["results"][0]["status"], "applied");
    }

    #[tokio::test]
    async fn test_build_drop_tables_keeps_model_with_schema_on_sqlite() {
        let temp_dir = TempDir::new().unwrap();
        write_project(
            temp_dir.path(),
            &[(
                "users.yaml",
                "schema: crm\ncolumns:\n  - name: id\n    type: integer\n    primary_key: true\n",
            )],
        );
        BuildCommandHandler::new()
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();

        let mut drop_command = command(temp_dir.path(), true);
        drop_command.drop_tables = true;
        let output = BuildCommandHandler::new()
            .execute(&drop_command)
            .await
            .unwrap();
        let output: serde_json::Value = serde_json::from_str(&output).unwrap();
        let tables = output["tables"].as_array().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0]["table"]["name"], "users");
        assert!(tables[0]["table"]["schema"].is_null());
        assert_eq!(output["summary"]["applied"], 0);

        // テーブルが残っていれば再作成されない
        let again = BuildCommandHandler::new()
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap();
        let again: serde_json::Value = serde_json::from_str(&again).unwrap();
        assert_eq!(again["summary"]["applied"], 0);
    }

    #[tokio::test]
    async fn test_build_aborts_on_model_error_before_connecting() {
        let temp_dir = TempDir::new().unwrap();
        write_project(
            temp_dir.path(),
            &[(
                "users.yaml",
                "columns:\n  - name: id\n    type: varchar\n",
            )],
        );

        let err = BuildCommandHandler::new()
            .execute(&command(temp_dir.path(), false))
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<TableFailures>().is_none());
        assert!(!temp_dir.path().join("app.db").exists());
    }
}
