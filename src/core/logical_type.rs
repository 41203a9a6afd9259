// 論理型と具体型
//
// モデルファイルで使用する固定語彙の論理型（integer, string など）と、
// それを変換した具体型を定義します。論理型は閉じた列挙型として扱い、
// 語彙外の型名は TypeError::UnknownType になります。

use crate::core::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 文字列型の長さが省略された場合の既定値
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// 論理型
///
/// モデルファイルの `type` に指定できる語彙です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    Integer,
    Bigint,
    Smallint,
    String,
    Text,
    Float,
    Real,
    Double,
    Decimal,
    Numeric,
    Datetime,
    Timestamp,
    Time,
    Date,
    Binary,
    LargeBinary,
    Boolean,
    Unicode,
    UnicodeText,
}

/// 語彙と論理型の対応表
const MAPPING_TABLE: [(&str, LogicalType); 19] = [
    ("integer", LogicalType::Integer),
    ("bigint", LogicalType::Bigint),
    ("smallint", LogicalType::Smallint),
    ("string", LogicalType::String),
    ("text", LogicalType::Text),
    ("float", LogicalType::Float),
    ("real", LogicalType::Real),
    ("double", LogicalType::Double),
    ("decimal", LogicalType::Decimal),
    ("numeric", LogicalType::Numeric),
    ("datetime", LogicalType::Datetime),
    ("timestamp", LogicalType::Timestamp),
    ("time", LogicalType::Time),
    ("date", LogicalType::Date),
    ("binary", LogicalType::Binary),
    ("large_binary", LogicalType::LargeBinary),
    ("boolean", LogicalType::Boolean),
    ("unicode", LogicalType::Unicode),
    ("unicode_text", LogicalType::UnicodeText),
];

impl LogicalType {
    /// サポートする型名の一覧
    pub fn vocabulary() -> Vec<&'static str> {
        MAPPING_TABLE.iter().map(|(name, _)| *name).collect()
    }

    /// 型名
    pub fn name(&self) -> &'static str {
        MAPPING_TABLE
            .iter()
            .find(|(_, logical)| logical == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    /// 整数系の型かどうか（auto_increment を許可する型）
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            LogicalType::Integer | LogicalType::Bigint | LogicalType::Smallint
        )
    }

    /// 具体型へ変換
    ///
    /// # Arguments
    ///
    /// * `length` - 文字列型の長さ、または数値型の精度
    /// * `scale` - 数値型の小数点以下桁数
    ///
    /// # Errors
    ///
    /// - 長さが0の場合
    /// - 精度なしでスケールが指定された場合
    /// - スケールが精度を超える場合
    pub fn to_concrete(
        &self,
        length: Option<u32>,
        scale: Option<u32>,
    ) -> Result<ConcreteType, TypeError> {
        if length == Some(0) {
            return Err(TypeError::InvalidLength {
                type_name: self.name().to_string(),
                message: "length must be greater than 0".to_string(),
            });
        }

        let concrete = match self {
            LogicalType::Integer => ConcreteType::Integer,
            LogicalType::Bigint => ConcreteType::BigInteger,
            LogicalType::Smallint => ConcreteType::SmallInteger,
            LogicalType::String => ConcreteType::String {
                length: length.unwrap_or(DEFAULT_STRING_LENGTH),
            },
            LogicalType::Text => ConcreteType::Text,
            LogicalType::Float => ConcreteType::Float,
            LogicalType::Real => ConcreteType::Real,
            LogicalType::Double => ConcreteType::Double,
            LogicalType::Decimal | LogicalType::Numeric => {
                match (length, scale) {
                    (None, Some(_)) => {
                        return Err(TypeError::MissingLength {
                            type_name: self.name().to_string(),
                        })
                    }
                    (Some(precision), Some(scale)) if scale > precision => {
                        return Err(TypeError::InvalidLength {
                            type_name: self.name().to_string(),
                            message: format!(
                                "scale {} exceeds precision {}",
                                scale, precision
                            ),
                        })
                    }
                    _ => {}
                }
                ConcreteType::Numeric {
                    precision: length,
                    scale,
                }
            }
            LogicalType::Datetime => ConcreteType::DateTime,
            LogicalType::Timestamp => ConcreteType::Timestamp,
            LogicalType::Time => ConcreteType::Time,
            LogicalType::Date => ConcreteType::Date,
            LogicalType::Binary | LogicalType::LargeBinary => ConcreteType::LargeBinary,
            LogicalType::Boolean => ConcreteType::Boolean,
            LogicalType::Unicode => ConcreteType::Unicode {
                length: length.unwrap_or(DEFAULT_STRING_LENGTH),
            },
            LogicalType::UnicodeText => ConcreteType::UnicodeText,
        };

        Ok(concrete)
    }
}

impl FromStr for LogicalType {
    type Err = TypeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized = name.trim().to_ascii_lowercase();
        MAPPING_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == normalized)
            .map(|(_, logical)| *logical)
            .ok_or_else(|| TypeError::UnknownType {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 具体型
///
/// 方言ごとのSQL型へ変換される前の、方言非依存の型記述子です。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConcreteType {
    Integer,
    BigInteger,
    SmallInteger,
    String {
        length: u32,
    },
    Text,
    Float,
    Real,
    Double,
    Numeric {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    DateTime,
    Timestamp,
    Time,
    Date,
    LargeBinary,
    Boolean,
    Unicode {
        length: u32,
    },
    UnicodeText,
}

impl ConcreteType {
    /// 整数系の型かどうか
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ConcreteType::Integer | ConcreteType::BigInteger | ConcreteType::SmallInteger
        )
    }
}

/// 論理型名を具体型へ変換
///
/// # Arguments
///
/// * `logical_type` - モデルファイルに書かれた型名
/// * `length` - 文字列型の長さ、または数値型の精度
///
/// # Errors
///
/// 語彙外の型名の場合は TypeError::UnknownType
pub fn map_type(logical_type: &str, length: Option<u32>) -> Result<ConcreteType, TypeError> {
    logical_type.parse::<LogicalType>()?.to_concrete(length, None)
}
