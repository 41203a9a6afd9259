// 共通型フォーマットロジック
//
// 複数の方言で共通する ConcreteType → SQL型文字列 の変換と、
// DBから取得した型宣言の分解を提供します。

use crate::core::logical_type::ConcreteType;

/// 共通SQL型のフォーマット
///
/// 複数の方言で同一の出力となる型変換を行います。
/// 方言固有の変換が必要な場合は `None` を返します。
pub fn format_common_sql_type(column_type: &ConcreteType) -> Option<String> {
    match column_type {
        ConcreteType::Integer => Some("INTEGER".to_string()),
        ConcreteType::BigInteger => Some("BIGINT".to_string()),
        ConcreteType::SmallInteger => Some("SMALLINT".to_string()),
        ConcreteType::String { length } | ConcreteType::Unicode { length } => {
            Some(format!("VARCHAR({})", length))
        }
        ConcreteType::Text | ConcreteType::UnicodeText => Some("TEXT".to_string()),
        ConcreteType::Time => Some("TIME".to_string()),
        ConcreteType::Date => Some("DATE".to_string()),
        ConcreteType::Boolean => Some("BOOLEAN".to_string()),
        _ => None,
    }
}

/// 型宣言を基本名と引数に分解
///
/// `character varying(100)` → (`character varying`, [100])
/// `NUMERIC(10, 2)` → (`numeric`, [10, 2])
///
/// 基本名は小文字化します。括弧の後に修飾子が続く場合（`int(10) unsigned` など）や
/// 引数が数値でない場合は `None` を返します。
pub fn split_type_args(sql_type: &str) -> Option<(String, Vec<u32>)> {
    let trimmed = sql_type.trim();
    let Some(open) = trimmed.find('(') else {
        return Some((normalize_base(trimmed), Vec::new()));
    };

    let close = trimmed.rfind(')')?;
    if close < open || !trimmed[close + 1..].trim().is_empty() {
        return None;
    }

    let args = trimmed[open + 1..close]
        .split(',')
        .map(|arg| arg.trim().parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;

    Some((normalize_base(&trimmed[..open]), args))
}

/// 基本名を小文字化し、連続する空白を1つにまとめる
fn normalize_base(base: &str) -> String {
    base.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// NUMERIC/DECIMAL の引数から具体型を作成
pub fn numeric_from_args(args: &[u32]) -> Option<ConcreteType> {
    match args {
        [] => Some(ConcreteType::Numeric {
            precision: None,
            scale: None,
        }),
        [precision] => Some(ConcreteType::Numeric {
            precision: Some(*precision),
            scale: Some(0),
        }),
        [precision, scale] => Some(ConcreteType::Numeric {
            precision: Some(*precision),
            scale: Some(*scale),
        }),
        _ => None,
    }
}

/// 可変長文字列の引数から具体型を作成（長さ必須）
pub fn varchar_from_args(args: &[u32]) -> Option<ConcreteType> {
    match args {
        [length] => Some(ConcreteType::String { length: *length }),
        _ => None,
    }
}
