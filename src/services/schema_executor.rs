// スキーマ適用サービス
//
// DDLアクションをテーブル単位のトランザクションで適用し、結果をApplyReportにまとめます。
// あるテーブルでアクションが失敗した場合、そのテーブルの変更はロールバックし、
// 後続のアクションはスキップして次のテーブルへ進みます。

use crate::adapters::database::DatabaseConnection;
use crate::adapters::sql_generator::{create_sql_generator, SqlGenerator};
use crate::core::apply_report::{ActionResult, ActionStatus, ApplyReport, TableReport};
use crate::core::config::Dialect;
use crate::core::error::DatabaseError;
use crate::core::model::TableRef;
use crate::core::schema_diff::DiffAction;
use chrono::Utc;
use sqlx::{Any, Transaction};
use tracing::{debug, error, info, warn};

/// スキーマ適用サービス
pub struct SchemaExecutor {
    generator: Box<dyn SqlGenerator>,
}

impl std::fmt::Debug for SchemaExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaExecutor")
            .field("dialect", &self.generator.dialect())
            .finish()
    }
}

impl SchemaExecutor {
    /// 新しいSchemaExecutorを作成
    pub fn new(dialect: Dialect) -> Self {
        Self {
            generator: create_sql_generator(dialect),
        }
    }

    /// アクションを適用
    ///
    /// アクションは与えられた順序のまま、テーブルごとにまとめて適用します。
    ///
    /// # Arguments
    ///
    /// * `connection` - データベース接続
    /// * `actions` - 適用順に並んだアクション
    ///
    /// # Returns
    ///
    /// テーブルごとの適用結果
    pub async fn apply(&self, connection: &DatabaseConnection, actions: &[DiffAction]) -> ApplyReport {
        let mut report = ApplyReport::new();

        for (table, batch) in group_by_table(actions) {
            report.tables.push(self.apply_table(connection, table, &batch).await);
        }

        report
    }

    /// 1テーブル分のアクションを1つのトランザクションで適用
    async fn apply_table(
        &self,
        connection: &DatabaseConnection,
        table: TableRef,
        actions: &[&DiffAction],
    ) -> TableReport {
        let started_at = Utc::now();
        let mut report = TableReport::new(table);

        let mut tx = match connection.pool().begin().await {
            Ok(tx) => tx,
            Err(e) => {
                let failure = DatabaseError::Transaction {
                    message: format!("failed to begin transaction: {}", e),
                };
                error!(table = %report.table, error = %failure, "Could not start transaction");
                record_failure(&mut report, actions, 0, &failure);
                report.duration_ms = (Utc::now() - started_at).num_milliseconds();
                return report;
            }
        };

        for (index, action) in actions.iter().enumerate() {
            if let Err(failure) = self.apply_action(&mut tx, action).await {
                error!(
                    table = %report.table,
                    action = action.kind(),
                    column = action.column_name().unwrap_or("-"),
                    error = %failure,
                    "Action failed, rolling back table"
                );
                if let Err(e) = tx.rollback().await {
                    warn!(table = %report.table, error = %e, "Rollback failed");
                }
                record_failure(&mut report, actions, index, &failure);
                report.duration_ms = (Utc::now() - started_at).num_milliseconds();
                return report;
            }
            debug!(table = %report.table, action = %action, "Action executed");
        }

        match tx.commit().await {
            Ok(()) => {
                for action in actions {
                    info!(table = %report.table, action = %action, "Applied");
                    report.results.push(ActionResult {
                        action: (*action).clone(),
                        status: ActionStatus::Applied,
                    });
                }
            }
            Err(e) => {
                let failure = DatabaseError::Transaction {
                    message: format!("failed to commit transaction: {}", e),
                };
                error!(table = %report.table, error = %failure, "Commit failed");
                // 最後のアクションを失敗として扱い、それ以前はロールバック済みとする
                record_failure(&mut report, actions, actions.len().saturating_sub(1), &failure);
            }
        }

        report.duration_ms = (Utc::now() - started_at).num_milliseconds();
        report
    }

    /// 1アクション分のSQL文をトランザクション内で実行
    async fn apply_action(
        &self,
        tx: &mut Transaction<'static, Any>,
        action: &DiffAction,
    ) -> Result<(), DatabaseError> {
        let statements = self.generator.generate_statements(action)?;

        for statement in statements {
            debug!(sql = %statement, "Executing statement");
            sqlx::query(&statement)
                .execute(&mut **tx)
                .await
                .map_err(|e| DatabaseError::Execution {
                    message: e.to_string(),
                    sql: Some(statement.clone()),
                })?;
        }

        Ok(())
    }
}

/// 失敗したアクションの位置を基準に結果を記録
///
/// 先行アクションはロールバック済み、失敗したアクションは失敗、後続はスキップとします。
fn record_failure(
    report: &mut TableReport,
    actions: &[&DiffAction],
    failed_index: usize,
    failure: &DatabaseError,
) {
    for (index, action) in actions.iter().enumerate() {
        let status = match index.cmp(&failed_index) {
            std::cmp::Ordering::Less => ActionStatus::RolledBack,
            std::cmp::Ordering::Equal => ActionStatus::Failed {
                kind: failure.kind(),
                message: failure.to_string(),
            },
            std::cmp::Ordering::Greater => ActionStatus::Skipped,
        };
        report.results.push(ActionResult {
            action: (*action).clone(),
            status,
        });
    }
}

/// アクションをテーブルごとにまとめる（テーブルの初出順、テーブル内の順序は保持）
fn group_by_table(actions: &[DiffAction]) -> Vec<(TableRef, Vec<&DiffAction>)> {
    let mut groups: Vec<(TableRef, Vec<&DiffAction>)> = Vec::new();

    for action in actions {
        match groups.iter_mut().find(|(table, _)| table == action.table()) {
            Some((_, batch)) => batch.push(action),
            None => groups.push((action.table().clone(), vec![action])),
        }
    }

    groups
}
