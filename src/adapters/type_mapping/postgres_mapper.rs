// PostgreSQL用型マッパー

use super::common::{format_common_sql_type, numeric_from_args, split_type_args, varchar_from_args};
use super::TypeMapper;
use crate::core::logical_type::ConcreteType;

/// PostgreSQL用型マッパー
pub struct PostgresTypeMapper;

impl TypeMapper for PostgresTypeMapper {
    fn parse_sql_type(&self, sql_type: &str) -> Option<ConcreteType> {
        let (base, args) = split_type_args(sql_type)?;

        match (base.as_str(), args.as_slice()) {
            ("integer" | "int" | "int4" | "serial" | "serial4", []) => Some(ConcreteType::Integer),
            ("bigint" | "int8" | "bigserial" | "serial8", []) => Some(ConcreteType::BigInteger),
            ("smallint" | "int2" | "smallserial" | "serial2", []) => {
                Some(ConcreteType::SmallInteger)
            }
            ("character varying" | "varchar", args) => varchar_from_args(args),
            ("text", []) => Some(ConcreteType::Text),
            ("real" | "float4", []) => Some(ConcreteType::Real),
            ("double precision" | "float8", []) => Some(ConcreteType::Double),
            ("numeric" | "decimal", args) => numeric_from_args(args),
            ("timestamp without time zone" | "timestamp", []) => Some(ConcreteType::Timestamp),
            ("time without time zone" | "time", []) => Some(ConcreteType::Time),
            ("date", []) => Some(ConcreteType::Date),
            ("bytea", []) => Some(ConcreteType::LargeBinary),
            ("boolean" | "bool", []) => Some(ConcreteType::Boolean),
            // timestamptz, json, uuid, ユーザー定義型などは比較対象外
            _ => None,
        }
    }

    fn format_sql_type(&self, column_type: &ConcreteType) -> String {
        if let Some(sql) = format_common_sql_type(column_type) {
            return sql;
        }

        match column_type {
            ConcreteType::Float | ConcreteType::Double => "DOUBLE PRECISION".to_string(),
            ConcreteType::Real => "REAL".to_string(),
            ConcreteType::Numeric {
                precision: Some(precision),
                scale,
            } => format!("NUMERIC({}, {})", precision, scale.unwrap_or(0)),
            ConcreteType::Numeric { precision: None, .. } => "NUMERIC".to_string(),
            ConcreteType::DateTime | ConcreteType::Timestamp => "TIMESTAMP".to_string(),
            ConcreteType::LargeBinary => "BYTEA".to_string(),
            _ => "TEXT".to_string(),
        }
    }

    fn column_definition_type(&self, column_type: &ConcreteType, auto_increment: bool) -> String {
        if auto_increment {
            match column_type {
                ConcreteType::BigInteger => return "BIGSERIAL".to_string(),
                ConcreteType::SmallInteger => return "SMALLSERIAL".to_string(),
                ConcreteType::Integer => return "SERIAL".to_string(),
                _ => {}
            }
        }
        self.format_sql_type(column_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_information_schema_types() {
        let mapper = PostgresTypeMapper;
        assert_eq!(
            mapper.parse_sql_type("character varying(100)"),
            Some(ConcreteType::String { length: 100 })
        );
        assert_eq!(mapper.parse_sql_type("integer"), Some(ConcreteType::Integer));
        assert_eq!(
            mapper.parse_sql_type("timestamp without time zone"),
            Some(ConcreteType::Timestamp)
        );
        assert_eq!(
            mapper.parse_sql_type("numeric(10,2)"),
            Some(ConcreteType::Numeric {
                precision: Some(10),
                scale: Some(2)
            })
        );
    }

    #[test]
    fn test_parse_opaque_types() {
        let mapper = PostgresTypeMapper;
        assert_eq!(mapper.parse_sql_type("jsonb"), None);
        assert_eq!(mapper.parse_sql_type("timestamp with time zone"), None);
        assert_eq!(mapper.parse_sql_type("USER-DEFINED"), None);
        // 長さなしの varchar は無制限のため比較しない
        assert_eq!(mapper.parse_sql_type("character varying"), None);
    }

    #[test]
    fn test_format_sql_type() {
        let mapper = PostgresTypeMapper;
        assert_eq!(
            mapper.format_sql_type(&ConcreteType::Unicode { length: 50 }),
            "VARCHAR(50)"
        );
        assert_eq!(mapper.format_sql_type(&ConcreteType::Float), "DOUBLE PRECISION");
        assert_eq!(mapper.format_sql_type(&ConcreteType::DateTime), "TIMESTAMP");
        assert_eq!(mapper.format_sql_type(&ConcreteType::LargeBinary), "BYTEA");
        assert_eq!(
            mapper.format_sql_type(&ConcreteType::Numeric {
                precision: Some(12),
                scale: None
            }),
            "NUMERIC(12, 0)"
        );
    }

    #[test]
    fn test_serial_column_definition() {
        let mapper = PostgresTypeMapper;
        assert_eq!(
            mapper.column_definition_type(&ConcreteType::Integer, true),
            "SERIAL"
        );
        assert_eq!(
            mapper.column_definition_type(&ConcreteType::BigInteger, true),
            "BIGSERIAL"
        );
        assert_eq!(
            mapper.column_definition_type(&ConcreteType::Integer, false),
            "INTEGER"
        );
    }
}
