// 適用レポート
//
// Executorがテーブル単位で記録する、各アクションの適用結果を表現します。

use crate::core::error::ErrorKind;
use crate::core::model::TableRef;
use crate::core::schema_diff::DiffAction;
use serde::Serialize;

/// アクションの適用状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionStatus {
    /// 適用済み（コミット済み）
    Applied,
    /// 実行されたが、同じテーブルの後続アクションの失敗によりロールバックされた
    RolledBack,
    /// 失敗
    Failed { kind: ErrorKind, message: String },
    /// 同じテーブルの先行アクションが失敗したため未実行
    Skipped,
}

/// 1アクション分の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub action: DiffAction,
    #[serde(flatten)]
    pub status: ActionStatus,
}

/// 1テーブル分の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: TableRef,
    pub results: Vec<ActionResult>,
    /// 実行時間（ミリ秒）
    pub duration_ms: i64,
}

impl TableReport {
    /// 新しいテーブル結果を作成
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            results: Vec::new(),
            duration_ms: 0,
        }
    }

    /// 失敗したアクションがあるかどうか
    pub fn has_failure(&self) -> bool {
        self.results
            .iter()
            .any(|r| matches!(r.status, ActionStatus::Failed { .. }))
    }

    /// 適用済みのアクション
    pub fn applied(&self) -> Vec<&DiffAction> {
        self.filter(|status| matches!(status, ActionStatus::Applied))
    }

    /// 失敗したアクション
    pub fn failed(&self) -> Vec<&DiffAction> {
        self.filter(|status| matches!(status, ActionStatus::Failed { .. }))
    }

    /// スキップされたアクション
    pub fn skipped(&self) -> Vec<&DiffAction> {
        self.filter(|status| matches!(status, ActionStatus::Skipped))
    }

    /// ロールバックされたアクション
    pub fn rolled_back(&self) -> Vec<&DiffAction> {
        self.filter(|status| matches!(status, ActionStatus::RolledBack))
    }

    fn filter<F>(&self, predicate: F) -> Vec<&DiffAction>
    where
        F: Fn(&ActionStatus) -> bool,
    {
        self.results
            .iter()
            .filter(|r| predicate(&r.status))
            .map(|r| &r.action)
            .collect()
    }
}

/// 適用レポート
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub tables: Vec<TableReport>,
}

impl ApplyReport {
    /// 空のレポートを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 失敗したテーブルがあるかどうか
    pub fn has_failures(&self) -> bool {
        self.tables.iter().any(TableReport::has_failure)
    }

    /// 指定テーブルの結果を取得
    pub fn table(&self, table: &TableRef) -> Option<&TableReport> {
        self.tables.iter().find(|t| &t.table == table)
    }

    /// 適用済みアクション数
    pub fn applied_count(&self) -> usize {
        self.tables.iter().map(|t| t.applied().len()).sum()
    }
}
