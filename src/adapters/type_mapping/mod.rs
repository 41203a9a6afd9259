// 型マッピングサービス
//
// 方言に依存しない共通インターフェースで ConcreteType <-> SQL型文字列 の
// 双方向変換を一元管理します。モデルとDBのカラム型の比較もここで行います。

pub mod common;
mod mysql_mapper;
mod postgres_mapper;
mod sqlite_mapper;

pub use mysql_mapper::MySqlTypeMapper;
pub use postgres_mapper::PostgresTypeMapper;
pub use sqlite_mapper::SqliteTypeMapper;

use crate::core::config::Dialect;
use crate::core::logical_type::ConcreteType;
use crate::core::model::{ColumnSpec, LiveColumn};

/// 方言固有の型マッピング
///
/// 各データベース方言固有の型変換ロジックを提供するトレイト。
pub trait TypeMapper: Send + Sync {
    /// SQL型文字列から ConcreteType へパース
    ///
    /// # Arguments
    /// * `sql_type` - データベースから取得した型宣言（長さ・精度を含む）
    ///
    /// # Returns
    /// 変換された ConcreteType、比較できない型の場合は None
    fn parse_sql_type(&self, sql_type: &str) -> Option<ConcreteType>;

    /// ConcreteType から SQL型文字列へ変換
    fn format_sql_type(&self, column_type: &ConcreteType) -> String;

    /// DBに実際に格納される型
    ///
    /// 方言の制約で宣言と異なる型になる場合に上書きします。
    fn storage_type(&self, column_type: &ConcreteType, _auto_increment: bool) -> ConcreteType {
        column_type.clone()
    }

    /// カラム定義に書く型（PostgreSQLの SERIAL など）
    fn column_definition_type(&self, column_type: &ConcreteType, auto_increment: bool) -> String {
        self.format_sql_type(&self.storage_type(column_type, auto_increment))
    }
}

/// 型マッピングサービス
///
/// 方言に依存しない共通インターフェースで型変換を提供します。
pub struct TypeMappingService {
    dialect: Dialect,
    mapper: Box<dyn TypeMapper>,
}

impl Clone for TypeMappingService {
    fn clone(&self) -> Self {
        Self::new(self.dialect)
    }
}

impl std::fmt::Debug for TypeMappingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMappingService")
            .field("dialect", &self.dialect)
            .finish()
    }
}

impl TypeMappingService {
    /// 新しいTypeMappingServiceを作成
    pub fn new(dialect: Dialect) -> Self {
        let mapper: Box<dyn TypeMapper> = match dialect {
            Dialect::PostgreSQL => Box::new(PostgresTypeMapper),
            Dialect::MySQL => Box::new(MySqlTypeMapper),
            Dialect::SQLite => Box::new(SqliteTypeMapper),
        };
        Self { dialect, mapper }
    }

    /// 方言を取得
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// ConcreteType -> SQL型文字列
    pub fn to_sql_type(&self, column_type: &ConcreteType) -> String {
        self.mapper.format_sql_type(column_type)
    }

    /// カラム定義に書く型
    pub fn column_definition_type(&self, column: &ColumnSpec) -> String {
        self.mapper
            .column_definition_type(&column.column_type, column.auto_increment)
    }

    /// モデルのカラムがDB上で持つべき型（比較用の正規形）
    pub fn expected_storage_type(&self, column: &ColumnSpec) -> String {
        self.mapper.format_sql_type(
            &self
                .mapper
                .storage_type(&column.column_type, column.auto_increment),
        )
    }

    /// DB上の型宣言を比較用の正規形に変換
    ///
    /// 比較できない型（方言固有型など）の場合は None を返します。
    pub fn normalize_live_type(&self, db_type: &str) -> Option<String> {
        self.mapper
            .parse_sql_type(db_type)
            .map(|parsed| self.mapper.format_sql_type(&parsed))
    }

    /// モデルとDBのカラム型が一致するかどうか
    ///
    /// # Returns
    /// 一致すれば `Some(true)`、不一致なら `Some(false)`、
    /// DB側の型を解釈できない場合は `None`
    pub fn types_match(&self, column: &ColumnSpec, live: &LiveColumn) -> Option<bool> {
        self.normalize_live_type(&live.db_type)
            .map(|normalized| normalized == self.expected_storage_type(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logical_type::LogicalType;

    fn column(logical: LogicalType, length: Option<u32>) -> ColumnSpec {
        let concrete = logical.to_concrete(length, None).unwrap();
        let mut column = ColumnSpec::new("c", logical, concrete);
        column.length = length;
        column
    }

    #[test]
    fn test_new_service() {
        for dialect in [Dialect::PostgreSQL, Dialect::MySQL, Dialect::SQLite] {
            assert_eq!(TypeMappingService::new(dialect).dialect(), dialect);
        }
    }

    #[test]
    fn test_types_match_postgres_aliases() {
        let service = TypeMappingService::new(Dialect::PostgreSQL);

        let name = column(LogicalType::String, Some(100));
        assert_eq!(
            service.types_match(&name, &LiveColumn::new("c", "character varying(100)", true)),
            Some(true)
        );
        assert_eq!(
            service.types_match(&name, &LiveColumn::new("c", "character varying(50)", true)),
            Some(false)
        );

        // datetime と timestamp は同じ格納型
        let created = column(LogicalType::Datetime, None);
        assert_eq!(
            service.types_match(
                &created,
                &LiveColumn::new("c", "timestamp without time zone", true)
            ),
            Some(true)
        );
    }

    #[test]
    fn test_types_match_opaque_live_type() {
        let service = TypeMappingService::new(Dialect::PostgreSQL);
        let payload = column(LogicalType::Text, None);
        assert_eq!(
            service.types_match(&payload, &LiveColumn::new("c", "jsonb", true)),
            None
        );
    }

    #[test]
    fn test_types_match_mysql_display_width() {
        let service = TypeMappingService::new(Dialect::MySQL);
        let id = column(LogicalType::Integer, None);
        assert_eq!(
            service.types_match(&id, &LiveColumn::new("c", "int(11)", false)),
            Some(true)
        );
        let flag = column(LogicalType::Boolean, None);
        assert_eq!(
            service.types_match(&flag, &LiveColumn::new("c", "tinyint(1)", true)),
            Some(true)
        );
    }

    #[test]
    fn test_sqlite_auto_increment_bigint_matches_integer() {
        let service = TypeMappingService::new(Dialect::SQLite);
        let mut id = column(LogicalType::Bigint, None);
        id.primary_key = true;
        id.auto_increment = true;

        assert_eq!(service.expected_storage_type(&id), "INTEGER");
        assert_eq!(
            service.types_match(&id, &LiveColumn::new("id", "INTEGER", false)),
            Some(true)
        );
    }

    #[test]
    fn test_column_definition_type() {
        let postgres = TypeMappingService::new(Dialect::PostgreSQL);
        let mut id = column(LogicalType::Integer, None);
        id.auto_increment = true;
        assert_eq!(postgres.column_definition_type(&id), "SERIAL");
        assert_eq!(postgres.expected_storage_type(&id), "INTEGER");

        let mysql = TypeMappingService::new(Dialect::MySQL);
        assert_eq!(mysql.column_definition_type(&id), "INT");
    }
}
