// スキーマ差分ドメインモデル
//
// モデルとDBの差分を解消するためのDDLアクションと、
// 1テーブル分の照合結果（ReconcilePlan）を表現します。

use crate::core::error::ReconcileError;
use crate::core::model::{ColumnSpec, LiveColumn, TableRef, TableSpec};
use serde::Serialize;
use std::fmt;

/// 型変更のリスク分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlterRisk {
    /// 型・長さのみの変更
    Compatible,
    /// プライマリキー・自動増分フラグの変更（専用DDLが必要）
    Incompatible,
}

/// DDLアクション
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DiffAction {
    /// テーブル作成
    CreateTable { table: TableRef, spec: TableSpec },
    /// カラム追加
    AddColumn { table: TableRef, column: ColumnSpec },
    /// カラム型変更
    AlterColumnType {
        table: TableRef,
        column_name: String,
        /// 変更後の型（対象方言での表記。例: `VARCHAR(200)`）
        new_type: String,
        /// 変更後のカラム定義
        column: ColumnSpec,
        /// 変更前のカラム
        previous: LiveColumn,
        risk: AlterRisk,
    },
    /// カラム削除
    DropColumn { table: TableRef, column_name: String },
    /// テーブル削除
    DropTable { table: TableRef },
}

impl DiffAction {
    /// 対象テーブル
    pub fn table(&self) -> &TableRef {
        match self {
            DiffAction::CreateTable { table, .. }
            | DiffAction::AddColumn { table, .. }
            | DiffAction::AlterColumnType { table, .. }
            | DiffAction::DropColumn { table, .. }
            | DiffAction::DropTable { table } => table,
        }
    }

    /// 適用順序（小さいほど先に適用）
    ///
    /// 作成 → 追加 → 変更 → 削除 の順に並べます。
    pub fn order(&self) -> u8 {
        match self {
            DiffAction::CreateTable { .. } => 0,
            DiffAction::AddColumn { .. } => 1,
            DiffAction::AlterColumnType { .. } => 2,
            DiffAction::DropColumn { .. } => 3,
            DiffAction::DropTable { .. } => 4,
        }
    }

    /// 破壊的なアクションかどうか（force または確認が必要）
    pub fn is_destructive(&self) -> bool {
        match self {
            DiffAction::DropColumn { .. } | DiffAction::DropTable { .. } => true,
            DiffAction::AlterColumnType { risk, .. } => *risk == AlterRisk::Incompatible,
            DiffAction::CreateTable { .. } | DiffAction::AddColumn { .. } => false,
        }
    }

    /// アクション種別の短い名前
    pub fn kind(&self) -> &'static str {
        match self {
            DiffAction::CreateTable { .. } => "create_table",
            DiffAction::AddColumn { .. } => "add_column",
            DiffAction::AlterColumnType { .. } => "alter_column_type",
            DiffAction::DropColumn { .. } => "drop_column",
            DiffAction::DropTable { .. } => "drop_table",
        }
    }

    /// 対象カラム名
    pub fn column_name(&self) -> Option<&str> {
        match self {
            DiffAction::AddColumn { column, .. } => Some(&column.name),
            DiffAction::AlterColumnType { column_name, .. }
            | DiffAction::DropColumn { column_name, .. } => Some(column_name),
            DiffAction::CreateTable { .. } | DiffAction::DropTable { .. } => None,
        }
    }
}

impl fmt::Display for DiffAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffAction::CreateTable { table, spec } => {
                write!(f, "create table {} ({} columns)", table, spec.columns.len())
            }
            DiffAction::AddColumn { table, column } => {
                write!(f, "add column {}.{}", table, column.name)
            }
            DiffAction::AlterColumnType {
                table,
                column_name,
                new_type,
                column,
                previous,
                risk,
            } => {
                let label = match risk {
                    AlterRisk::Compatible => "alter column",
                    AlterRisk::Incompatible => "alter column (incompatible)",
                };
                write!(
                    f,
                    "{} {}.{}: {} -> {}",
                    label, table, column_name, previous.db_type, new_type
                )?;

                let mut flags = Vec::new();
                if column.primary_key != previous.primary_key {
                    flags.push(if column.primary_key {
                        "add primary key"
                    } else {
                        "drop primary key"
                    });
                }
                if column.auto_increment != previous.auto_increment {
                    flags.push(if column.auto_increment {
                        "add auto_increment"
                    } else {
                        "drop auto_increment"
                    });
                }
                if !flags.is_empty() {
                    write!(f, " [{}]", flags.join(", "))?;
                }
                Ok(())
            }
            DiffAction::DropColumn { table, column_name } => {
                write!(f, "drop column {}.{}", table, column_name)
            }
            DiffAction::DropTable { table } => write!(f, "drop table {}", table),
        }
    }
}

/// 1テーブル分の照合結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan {
    /// 対象テーブル
    pub table: TableRef,
    /// 適用するアクション（作成 → 追加 → 変更 → 削除 の順）
    pub actions: Vec<DiffAction>,
    /// force なしのため保留された破壊的アクション
    pub pending: Vec<DiffAction>,
    /// 比較できなかったカラム
    pub unresolved: Vec<ReconcileError>,
}

impl ReconcilePlan {
    /// 空の照合結果を作成
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            actions: Vec::new(),
            pending: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    /// 差分が無いかどうか
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.pending.is_empty() && self.unresolved.is_empty()
    }

    /// 保留中のアクションを承認して適用対象に移す
    ///
    /// 適用順序を保つため、承認後にアクションを並べ直します。
    pub fn approve_pending<F>(&mut self, mut approve: F)
    where
        F: FnMut(&DiffAction) -> bool,
    {
        let pending = std::mem::take(&mut self.pending);
        for action in pending {
            if approve(&action) {
                self.actions.push(action);
            } else {
                self.pending.push(action);
            }
        }
        sort_actions(&mut self.actions);
    }
}

/// アクションを適用順序に並べる（同じ種別内の順序は保持）
pub fn sort_actions(actions: &mut [DiffAction]) {
    actions.sort_by_key(|action| action.order());
}
