// テーブル単位の実行結果
//
// build / drop コマンドが1テーブルごとに記録する照合・適用結果と、そのテキスト表示です。

use crate::core::apply_report::{ActionResult, ActionStatus, ApplyReport};
use crate::core::error::{DatabaseError, ErrorKind, ReconcileError};
use crate::core::model::TableRef;
use crate::core::schema_diff::{DiffAction, ReconcilePlan};
use colored::Colorize;
use serde::Serialize;

/// 照合前に発生したテーブル単位の失敗
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableFailure {
    pub kind: ErrorKind,
    pub message: String,
}

/// 1テーブル分の結果
#[derive(Debug, Clone, Serialize)]
pub struct TableOutcome {
    /// 対象テーブル
    pub table: TableRef,
    /// 適用結果
    pub results: Vec<ActionResult>,
    /// 確認待ちの破壊的アクション
    pub pending: Vec<DiffAction>,
    /// 比較できなかったカラム
    pub unresolved: Vec<ReconcileError>,
    /// イントロスペクションの失敗
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<TableFailure>,
    /// 実行時間（ミリ秒）
    pub duration_ms: i64,
}

impl TableOutcome {
    /// 照合結果と適用レポートから作成
    pub fn from_plan(plan: ReconcilePlan, report: ApplyReport) -> Self {
        let table_report = report
            .tables
            .into_iter()
            .find(|t| t.table == plan.table);
        let (results, duration_ms) = table_report
            .map(|t| (t.results, t.duration_ms))
            .unwrap_or_default();

        Self {
            table: plan.table,
            results,
            pending: plan.pending,
            unresolved: plan.unresolved,
            failure: None,
            duration_ms,
        }
    }

    /// イントロスペクションに失敗したテーブル
    pub fn inspection_failed(table: TableRef, error: &DatabaseError) -> Self {
        Self {
            table,
            results: Vec::new(),
            pending: Vec::new(),
            unresolved: Vec::new(),
            failure: Some(TableFailure {
                kind: ErrorKind::Inspection,
                message: error.to_string(),
            }),
            duration_ms: 0,
        }
    }

    /// 失敗を含むかどうか
    pub fn has_failure(&self) -> bool {
        self.failure.is_some()
            || self
                .results
                .iter()
                .any(|r| matches!(r.status, ActionStatus::Failed { .. }))
    }

    /// 適用済みアクション数
    pub fn applied_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == ActionStatus::Applied)
            .count()
    }

    /// 何も変更・報告がないかどうか
    pub fn is_unchanged(&self) -> bool {
        self.failure.is_none()
            && self.results.is_empty()
            && self.pending.is_empty()
            && self.unresolved.is_empty()
    }

    /// テキスト表示
    pub fn to_text(&self) -> String {
        let mut text = String::new();

        if let Some(failure) = &self.failure {
            text.push_str(&format!(
                "{} {}: {} failed: {}\n",
                "✗".red().bold(),
                self.table,
                failure.kind,
                failure.message
            ));
            return text;
        }

        if self.is_unchanged() {
            text.push_str(&format!(
                "{} {}: up to date\n",
                "=".dimmed(),
                self.table
            ));
            return text;
        }

        let header = if self.has_failure() {
            format!("{} {}: failed, changes rolled back", "✗".red().bold(), self.table)
        } else if self.applied_count() > 0 {
            format!(
                "{} {}: {} change(s) applied ({}ms)",
                "✓".green().bold(),
                self.table,
                self.applied_count(),
                self.duration_ms
            )
        } else {
            format!("{} {}: no changes applied", "!".yellow().bold(), self.table)
        };
        text.push_str(&header);
        text.push('\n');

        for result in &self.results {
            let line = match &result.status {
                ActionStatus::Applied => format!("    {} {}", "+".green(), result.action),
                ActionStatus::RolledBack => {
                    format!("    {} {} (rolled back)", "↺".yellow(), result.action)
                }
                ActionStatus::Failed { kind, message } => format!(
                    "    {} {} ({}: {})",
                    "✗".red(),
                    result.action,
                    kind,
                    message
                ),
                ActionStatus::Skipped => {
                    format!("    {} {} (skipped)", "-".dimmed(), result.action)
                }
            };
            text.push_str(&line);
            text.push('\n');
        }

        if !self.pending.is_empty() {
            text.push_str(&format!(
                "    {}\n",
                "Pending, requires --force or confirmation:".yellow()
            ));
            for action in &self.pending {
                text.push_str(&format!("      {}\n", action));
            }
        }

        for error in &self.unresolved {
            text.push_str(&format!("    {} {}\n", "?".yellow(), error));
        }

        text
    }
}

/// 結果のサマリー
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeSummary {
    pub tables: usize,
    pub applied: usize,
    pub pending: usize,
    pub unresolved: usize,
    pub failed: usize,
}

impl OutcomeSummary {
    /// テーブル結果を集計
    pub fn from_outcomes(outcomes: &[TableOutcome]) -> Self {
        Self {
            tables: outcomes.len(),
            applied: outcomes.iter().map(TableOutcome::applied_count).sum(),
            pending: outcomes.iter().map(|o| o.pending.len()).sum(),
            unresolved: outcomes.iter().map(|o| o.unresolved.len()).sum(),
            failed: outcomes.iter().filter(|o| o.has_failure()).count(),
        }
    }

    /// テキスト表示
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "{} table(s), {} change(s) applied",
            self.tables, self.applied
        );
        if self.pending > 0 {
            text.push_str(&format!(", {} pending", self.pending));
        }
        if self.unresolved > 0 {
            text.push_str(&format!(", {} unresolved", self.unresolved));
        }
        if self.failed > 0 {
            text.push_str(&format!(", {} failed", self.failed));
        }
        text
    }
}
