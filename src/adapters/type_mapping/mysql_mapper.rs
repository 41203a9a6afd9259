// MySQL用型マッパー

use super::common::{format_common_sql_type, numeric_from_args, split_type_args, varchar_from_args};
use super::TypeMapper;
use crate::core::logical_type::ConcreteType;

/// MySQL用型マッパー
pub struct MySqlTypeMapper;

impl TypeMapper for MySqlTypeMapper {
    fn parse_sql_type(&self, sql_type: &str) -> Option<ConcreteType> {
        let (base, args) = split_type_args(sql_type)?;

        // 整数型の表示幅（int(11) など）は型の一部として扱わない
        match (base.as_str(), args.as_slice()) {
            ("tinyint" | "bool" | "boolean", [1]) | ("bool" | "boolean", []) => {
                Some(ConcreteType::Boolean)
            }
            ("int" | "integer", _) => Some(ConcreteType::Integer),
            ("bigint", _) => Some(ConcreteType::BigInteger),
            ("smallint", _) => Some(ConcreteType::SmallInteger),
            ("varchar", args) => varchar_from_args(args),
            ("text", []) => Some(ConcreteType::Text),
            ("float", []) => Some(ConcreteType::Float),
            ("double" | "real" | "double precision", []) => Some(ConcreteType::Double),
            ("decimal" | "numeric", args) => numeric_from_args(args),
            ("datetime", []) => Some(ConcreteType::DateTime),
            ("timestamp", []) => Some(ConcreteType::Timestamp),
            ("time", []) => Some(ConcreteType::Time),
            ("date", []) => Some(ConcreteType::Date),
            ("blob", []) => Some(ConcreteType::LargeBinary),
            _ => None,
        }
    }

    fn format_sql_type(&self, column_type: &ConcreteType) -> String {
        match column_type {
            ConcreteType::Integer => "INT".to_string(),
            ConcreteType::Float => "FLOAT".to_string(),
            ConcreteType::Real | ConcreteType::Double => "DOUBLE".to_string(),
            ConcreteType::Numeric { precision, scale } => format!(
                "DECIMAL({}, {})",
                precision.unwrap_or(10),
                scale.unwrap_or(0)
            ),
            ConcreteType::DateTime => "DATETIME".to_string(),
            ConcreteType::Timestamp => "TIMESTAMP".to_string(),
            ConcreteType::LargeBinary => "BLOB".to_string(),
            other => format_common_sql_type(other).unwrap_or_else(|| "TEXT".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_type() {
        let mapper = MySqlTypeMapper;
        assert_eq!(mapper.parse_sql_type("int(11)"), Some(ConcreteType::Integer));
        assert_eq!(mapper.parse_sql_type("int"), Some(ConcreteType::Integer));
        assert_eq!(mapper.parse_sql_type("tinyint(1)"), Some(ConcreteType::Boolean));
        assert_eq!(
            mapper.parse_sql_type("varchar(100)"),
            Some(ConcreteType::String { length: 100 })
        );
        assert_eq!(
            mapper.parse_sql_type("decimal(10,0)"),
            Some(ConcreteType::Numeric {
                precision: Some(10),
                scale: Some(0)
            })
        );
    }

    #[test]
    fn test_parse_opaque_types() {
        let mapper = MySqlTypeMapper;
        assert_eq!(mapper.parse_sql_type("int(10) unsigned"), None);
        assert_eq!(mapper.parse_sql_type("enum('a','b')"), None);
        assert_eq!(mapper.parse_sql_type("json"), None);
        assert_eq!(mapper.parse_sql_type("tinyint(4)"), None);
    }

    #[test]
    fn test_format_sql_type() {
        let mapper = MySqlTypeMapper;
        assert_eq!(mapper.format_sql_type(&ConcreteType::Integer), "INT");
        assert_eq!(
            mapper.format_sql_type(&ConcreteType::Numeric {
                precision: None,
                scale: None
            }),
            "DECIMAL(10, 0)"
        );
        assert_eq!(mapper.format_sql_type(&ConcreteType::LargeBinary), "BLOB");
        assert_eq!(mapper.format_sql_type(&ConcreteType::Boolean), "BOOLEAN");
    }
}
