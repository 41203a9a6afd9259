// SQLite用型マッパー
//
// SQLiteは宣言された型文字列をそのまま保持するため、
// CREATE TABLE で書いた型名を読み戻して比較します。

use super::common::{format_common_sql_type, numeric_from_args, split_type_args, varchar_from_args};
use super::TypeMapper;
use crate::core::logical_type::ConcreteType;

/// SQLite用型マッパー
pub struct SqliteTypeMapper;

impl TypeMapper for SqliteTypeMapper {
    fn parse_sql_type(&self, sql_type: &str) -> Option<ConcreteType> {
        let (base, args) = split_type_args(sql_type)?;

        match (base.as_str(), args.as_slice()) {
            ("integer" | "int", []) => Some(ConcreteType::Integer),
            ("bigint", []) => Some(ConcreteType::BigInteger),
            ("smallint", []) => Some(ConcreteType::SmallInteger),
            ("varchar" | "character varying", args) => varchar_from_args(args),
            ("text", []) => Some(ConcreteType::Text),
            ("float", []) => Some(ConcreteType::Float),
            ("real", []) => Some(ConcreteType::Real),
            ("double" | "double precision", []) => Some(ConcreteType::Double),
            ("numeric" | "decimal", args) => numeric_from_args(args),
            ("datetime", []) => Some(ConcreteType::DateTime),
            ("timestamp", []) => Some(ConcreteType::Timestamp),
            ("time", []) => Some(ConcreteType::Time),
            ("date", []) => Some(ConcreteType::Date),
            ("blob", []) => Some(ConcreteType::LargeBinary),
            ("boolean", []) => Some(ConcreteType::Boolean),
            _ => None,
        }
    }

    fn format_sql_type(&self, column_type: &ConcreteType) -> String {
        if let Some(sql) = format_common_sql_type(column_type) {
            return sql;
        }

        match column_type {
            ConcreteType::Float => "FLOAT".to_string(),
            ConcreteType::Real => "REAL".to_string(),
            ConcreteType::Double => "DOUBLE".to_string(),
            ConcreteType::Numeric {
                precision: Some(precision),
                scale,
            } => format!("NUMERIC({}, {})", precision, scale.unwrap_or(0)),
            ConcreteType::Numeric { precision: None, .. } => "NUMERIC".to_string(),
            ConcreteType::DateTime => "DATETIME".to_string(),
            ConcreteType::Timestamp => "TIMESTAMP".to_string(),
            ConcreteType::LargeBinary => "BLOB".to_string(),
            _ => "TEXT".to_string(),
        }
    }

    /// AUTOINCREMENT は `INTEGER PRIMARY KEY` にしか付けられない
    fn storage_type(&self, column_type: &ConcreteType, auto_increment: bool) -> ConcreteType {
        if auto_increment && column_type.is_integer() {
            ConcreteType::Integer
        } else {
            column_type.clone()
        }
    }
}
