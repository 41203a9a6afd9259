// スキーマ照合サービス
//
// モデルのテーブル定義（あるべき姿）とDB上のカラム（現在の姿）を比較し、
// 差分を解消するための順序付きDDLアクションを生成します。
// I/Oは行わず、破壊的なアクションは force が無ければ保留にします。

use crate::adapters::type_mapping::TypeMappingService;
use crate::core::config::Dialect;
use crate::core::error::ReconcileError;
use crate::core::model::{LiveColumn, TableRef, TableSpec};
use crate::core::schema_diff::{sort_actions, AlterRisk, DiffAction, ReconcilePlan};
use std::collections::HashSet;

/// スキーマ照合サービス
#[derive(Debug, Clone)]
pub struct SchemaReconciler {
    type_mapping: TypeMappingService,
}

impl SchemaReconciler {
    /// 新しいSchemaReconcilerを作成
    pub fn new(dialect: Dialect) -> Self {
        Self {
            type_mapping: TypeMappingService::new(dialect),
        }
    }

    /// テーブル定義とDB上のカラムを照合
    ///
    /// # Arguments
    ///
    /// * `table` - スキーマ解決済みのテーブル参照
    /// * `desired` - モデルのテーブル定義
    /// * `actual` - DB上のカラム（テーブルが存在しない場合は None）
    /// * `force` - 破壊的なアクション（カラム削除・非互換な変更）を含めるかどうか
    ///
    /// # Returns
    ///
    /// 追加 → 変更 → 削除 の順に並んだアクションと、保留・比較不能なカラム
    pub fn reconcile(
        &self,
        table: &TableRef,
        desired: &TableSpec,
        actual: Option<&[LiveColumn]>,
        force: bool,
    ) -> ReconcilePlan {
        let mut plan = ReconcilePlan::new(table.clone());

        let Some(actual) = actual else {
            plan.actions.push(DiffAction::CreateTable {
                table: table.clone(),
                spec: desired.clone(),
            });
            return plan;
        };

        let mut candidates = Vec::new();

        // カラム名のみで比較し、位置は考慮しない
        for column in &desired.columns {
            let Some(live) = actual.iter().find(|live| live.name == column.name) else {
                candidates.push(DiffAction::AddColumn {
                    table: table.clone(),
                    column: column.clone(),
                });
                continue;
            };

            let Some(types_match) = self.type_mapping.types_match(column, live) else {
                plan.unresolved.push(ReconcileError {
                    table: table.to_string(),
                    column: column.name.clone(),
                    live_type: live.db_type.clone(),
                    desired_type: self.type_mapping.expected_storage_type(column),
                });
                continue;
            };

            let flags_changed = column.primary_key != live.primary_key
                || column.auto_increment != live.auto_increment;
            if types_match && !flags_changed {
                continue;
            }

            candidates.push(DiffAction::AlterColumnType {
                table: table.clone(),
                column_name: column.name.clone(),
                new_type: self.type_mapping.expected_storage_type(column),
                column: column.clone(),
                previous: live.clone(),
                risk: if flags_changed {
                    AlterRisk::Incompatible
                } else {
                    AlterRisk::Compatible
                },
            });
        }

        let desired_names: HashSet<&str> =
            desired.columns.iter().map(|c| c.name.as_str()).collect();
        for live in actual {
            if !desired_names.contains(live.name.as_str()) {
                candidates.push(DiffAction::DropColumn {
                    table: table.clone(),
                    column_name: live.name.clone(),
                });
            }
        }

        for action in candidates {
            if action.is_destructive() && !force {
                plan.pending.push(action);
            } else {
                plan.actions.push(action);
            }
        }

        sort_actions(&mut plan.actions);
        sort_actions(&mut plan.pending);
        plan
    }

    /// テーブル削除の照合結果を作成
    ///
    /// テーブルごとに1つの DropTable を生成し、force が無ければ保留にします。
    pub fn plan_drop_tables(&self, tables: &[TableRef], force: bool) -> Vec<ReconcilePlan> {
        tables
            .iter()
            .map(|table| {
                let mut plan = ReconcilePlan::new(table.clone());
                let action = DiffAction::DropTable {
                    table: table.clone(),
                };
                if force {
                    plan.actions.push(action);
                } else {
                    plan.pending.push(action);
                }
                plan
            })
            .collect()
    }
}
