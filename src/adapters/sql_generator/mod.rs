// SQL生成アダプター
//
// 照合結果のDDLアクションから各データベース方言用のDDL文を生成するアダプター層。

pub mod mysql;
pub mod postgres;
pub mod sqlite;

use crate::adapters::sql_quote::{quote_columns, quote_identifier, quote_table};
use crate::adapters::type_mapping::TypeMappingService;
use crate::core::config::Dialect;
use crate::core::error::DatabaseError;
use crate::core::model::{ColumnSpec, LiveColumn, TableRef, TableSpec};
use crate::core::schema_diff::DiffAction;

pub use mysql::MySqlSqlGenerator;
pub use postgres::PostgresSqlGenerator;
pub use sqlite::SqliteSqlGenerator;

/// SQLジェネレータートレイト
///
/// 各データベース方言用のSQLジェネレーターが実装すべきインターフェース。
/// 共通の構文は既定実装で提供し、方言ごとの差分のみを上書きします。
pub trait SqlGenerator: Send + Sync {
    /// 型マッピングサービス
    fn type_mapping(&self) -> &TypeMappingService;

    /// データベース方言
    fn dialect(&self) -> Dialect {
        self.type_mapping().dialect()
    }

    /// カラム定義のSQL文字列を生成
    ///
    /// プライマリキーはテーブル制約として別に出力します。
    fn generate_column_definition(&self, column: &ColumnSpec) -> String {
        let mut parts = vec![
            quote_identifier(self.dialect(), &column.name),
            self.type_mapping().column_definition_type(column),
        ];

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        parts.join(" ")
    }

    /// テーブル制約として出力するプライマリキー定義
    fn generate_primary_key(&self, spec: &TableSpec) -> Option<String> {
        let columns = spec.primary_key_columns();
        if columns.is_empty() {
            None
        } else {
            Some(format!(
                "PRIMARY KEY ({})",
                quote_columns(self.dialect(), &columns)
            ))
        }
    }

    /// CREATE TABLE文を生成
    ///
    /// # Arguments
    ///
    /// * `table` - スキーマ解決済みのテーブル参照
    /// * `spec` - テーブル定義
    ///
    /// # Returns
    ///
    /// CREATE TABLE文のSQL文字列
    fn generate_create_table(&self, table: &TableRef, spec: &TableSpec) -> String {
        let mut elements: Vec<String> = spec
            .columns
            .iter()
            .map(|column| format!("    {}", self.generate_column_definition(column)))
            .collect();

        if let Some(primary_key) = self.generate_primary_key(spec) {
            elements.push(format!("    {}", primary_key));
        }

        format!(
            "CREATE TABLE {} (\n{}\n)",
            quote_table(self.dialect(), table),
            elements.join(",\n")
        )
    }

    /// テーブル定義がこの方言で作成できるかを確認
    fn check_create_table(&self, _table: &TableRef, _spec: &TableSpec) -> Result<(), DatabaseError> {
        Ok(())
    }

    /// ADD COLUMN文を生成
    ///
    /// プライマリキーのカラムを追加する場合は制約の追加も行います。
    fn generate_add_column(
        &self,
        table: &TableRef,
        column: &ColumnSpec,
    ) -> Result<Vec<String>, DatabaseError> {
        let mut statements = vec![format!(
            "ALTER TABLE {} ADD COLUMN {}",
            quote_table(self.dialect(), table),
            self.generate_column_definition(column)
        )];

        if column.primary_key {
            statements.push(format!(
                "ALTER TABLE {} ADD PRIMARY KEY ({})",
                quote_table(self.dialect(), table),
                quote_identifier(self.dialect(), &column.name)
            ));
        }

        Ok(statements)
    }

    /// DROP COLUMN文を生成
    fn generate_drop_column(&self, table: &TableRef, column_name: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            quote_table(self.dialect(), table),
            quote_identifier(self.dialect(), column_name)
        )
    }

    /// DROP TABLE文を生成
    fn generate_drop_table(&self, table: &TableRef) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_table(self.dialect(), table))
    }

    /// カラム型・プライマリキー・自動増分の変更文を生成
    ///
    /// # Arguments
    ///
    /// * `table` - 対象テーブル
    /// * `column` - 変更後のカラム定義
    /// * `previous` - 変更前のカラム
    ///
    /// # Returns
    ///
    /// 順に実行するSQL文、または方言で表現できない場合は DatabaseError::Unsupported
    fn generate_alter_column_type(
        &self,
        table: &TableRef,
        column: &ColumnSpec,
        previous: &LiveColumn,
    ) -> Result<Vec<String>, DatabaseError>;

    /// DDLアクションを実行するSQL文を生成
    fn generate_statements(&self, action: &DiffAction) -> Result<Vec<String>, DatabaseError> {
        match action {
            DiffAction::CreateTable { table, spec } => {
                self.check_create_table(table, spec)?;
                Ok(vec![self.generate_create_table(table, spec)])
            }
            DiffAction::AddColumn { table, column } => self.generate_add_column(table, column),
            DiffAction::AlterColumnType {
                table,
                column,
                previous,
                ..
            } => self.generate_alter_column_type(table, column, previous),
            DiffAction::DropColumn { table, column_name } => {
                Ok(vec![self.generate_drop_column(table, column_name)])
            }
            DiffAction::DropTable { table } => Ok(vec![self.generate_drop_table(table)]),
        }
    }
}

/// 変更前後のカラムの差分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnChange {
    /// 型（長さを含む）が変わるかどうか
    pub type_changed: bool,
    /// プライマリキーの追加
    pub primary_key_added: bool,
    /// プライマリキーの削除
    pub primary_key_removed: bool,
    /// 自動増分の追加
    pub auto_increment_added: bool,
    /// 自動増分の削除
    pub auto_increment_removed: bool,
}

impl ColumnChange {
    /// 変更内容を判定
    pub fn detect(mapping: &TypeMappingService, column: &ColumnSpec, previous: &LiveColumn) -> Self {
        Self {
            type_changed: mapping.types_match(column, previous) != Some(true),
            primary_key_added: column.primary_key && !previous.primary_key,
            primary_key_removed: !column.primary_key && previous.primary_key,
            auto_increment_added: column.auto_increment && !previous.auto_increment,
            auto_increment_removed: !column.auto_increment && previous.auto_increment,
        }
    }
}

/// 方言に応じたSQLジェネレーターを作成
pub fn create_sql_generator(dialect: Dialect) -> Box<dyn SqlGenerator> {
    match dialect {
        Dialect::PostgreSQL => Box::new(PostgresSqlGenerator::new()),
        Dialect::MySQL => Box::new(MySqlSqlGenerator::new()),
        Dialect::SQLite => Box::new(SqliteSqlGenerator::new()),
    }
}
