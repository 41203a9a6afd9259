// SQLite用SQLジェネレーター
//
// DDLアクションからSQLite用のDDL文を生成します。
// SQLiteはスキーマを扱わず、ALTER TABLE でカラム型や制約を変更できません。

use crate::adapters::sql_generator::SqlGenerator;
use crate::adapters::sql_quote::quote_identifier_sqlite;
use crate::adapters::type_mapping::TypeMappingService;
use crate::core::config::Dialect;
use crate::core::error::DatabaseError;
use crate::core::model::{ColumnSpec, LiveColumn, TableRef, TableSpec};

/// SQLite用SQLジェネレーター
#[derive(Debug, Clone)]
pub struct SqliteSqlGenerator {
    type_mapping: TypeMappingService,
}

impl SqliteSqlGenerator {
    /// 新しいSqliteSqlGeneratorを作成
    pub fn new() -> Self {
        Self {
            type_mapping: TypeMappingService::new(Dialect::SQLite),
        }
    }

    fn unsupported(message: String) -> DatabaseError {
        DatabaseError::Unsupported {
            dialect: Dialect::SQLite.to_string(),
            message,
        }
    }
}

impl Default for SqliteSqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlGenerator for SqliteSqlGenerator {
    fn type_mapping(&self) -> &TypeMappingService {
        &self.type_mapping
    }

    /// 自動増分カラムは `INTEGER PRIMARY KEY AUTOINCREMENT` としてインラインで定義する
    fn generate_column_definition(&self, column: &ColumnSpec) -> String {
        let mut parts = vec![
            quote_identifier_sqlite(&column.name),
            self.type_mapping.column_definition_type(column),
        ];

        if column.auto_increment && column.primary_key {
            parts.push("PRIMARY KEY AUTOINCREMENT".to_string());
        } else if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        parts.join(" ")
    }

    fn generate_primary_key(&self, spec: &TableSpec) -> Option<String> {
        let columns = spec.primary_key_columns();
        let inline = spec
            .columns
            .iter()
            .any(|column| column.primary_key && column.auto_increment);
        if columns.is_empty() || inline {
            return None;
        }

        let quoted = columns
            .iter()
            .map(|c| quote_identifier_sqlite(c))
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("PRIMARY KEY ({})", quoted))
    }

    /// `AUTOINCREMENT` は単一カラムの `INTEGER PRIMARY KEY` にしか付けられない
    fn check_create_table(&self, table: &TableRef, spec: &TableSpec) -> Result<(), DatabaseError> {
        let primary_key = spec.primary_key_columns();
        if primary_key.len() > 1 {
            if let Some(column) = spec.columns.iter().find(|c| c.auto_increment) {
                return Err(Self::unsupported(format!(
                    "auto_increment column '{}' cannot be part of composite primary key ({}) on table '{}'",
                    column.name,
                    primary_key.join(", "),
                    table
                )));
            }
        }
        Ok(())
    }

    fn generate_add_column(
        &self,
        table: &TableRef,
        column: &ColumnSpec,
    ) -> Result<Vec<String>, DatabaseError> {
        if column.primary_key {
            return Err(Self::unsupported(format!(
                "cannot add primary key column '{}' to existing table '{}'",
                column.name, table
            )));
        }

        Ok(vec![format!(
            "ALTER TABLE {} ADD COLUMN {}",
            quote_identifier_sqlite(&table.name),
            self.generate_column_definition(column)
        )])
    }

    fn generate_alter_column_type(
        &self,
        table: &TableRef,
        column: &ColumnSpec,
        previous: &LiveColumn,
    ) -> Result<Vec<String>, DatabaseError> {
        Err(Self::unsupported(format!(
            "cannot alter column '{}' of table '{}' from {} to {}",
            column.name,
            table,
            previous.db_type,
            self.type_mapping.column_definition_type(column)
        )))
    }
}
