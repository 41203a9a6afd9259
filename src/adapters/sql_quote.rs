// SQL識別子クォートユーティリティ
//
// 各データベース方言用の識別子クォート関数を提供します。
// type_mapping、database_introspector、sql_generator から使用される共有モジュールです。

use crate::core::config::Dialect;
use crate::core::model::TableRef;

/// PostgreSQL用識別子クォート（ダブルクォート）
///
/// 識別子内のダブルクォートは二重にエスケープします。
///
/// # Examples
/// ```
/// use modelsync::adapters::sql_quote::quote_identifier_postgres;
/// assert_eq!(quote_identifier_postgres("users"), r#""users""#);
/// assert_eq!(quote_identifier_postgres(r#"table"name"#), r#""table""name""#);
/// ```
pub fn quote_identifier_postgres(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// MySQL用識別子クォート（バッククォート）
///
/// 識別子内のバッククォートは二重にエスケープします。
///
/// # Examples
/// ```
/// use modelsync::adapters::sql_quote::quote_identifier_mysql;
/// assert_eq!(quote_identifier_mysql("users"), "`users`");
/// assert_eq!(quote_identifier_mysql("table`name"), "`table``name`");
/// ```
pub fn quote_identifier_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// SQLite用識別子クォート（ダブルクォート）
pub fn quote_identifier_sqlite(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// 方言に応じた識別子クォート
pub fn quote_identifier(dialect: Dialect, name: &str) -> String {
    match dialect {
        Dialect::PostgreSQL => quote_identifier_postgres(name),
        Dialect::MySQL => quote_identifier_mysql(name),
        Dialect::SQLite => quote_identifier_sqlite(name),
    }
}

/// スキーマ修飾付きのテーブル名
///
/// SQLiteはスキーマを扱わないため、テーブル名のみをクォートします。
pub fn quote_table(dialect: Dialect, table: &TableRef) -> String {
    match (&table.schema, dialect) {
        (Some(schema), Dialect::PostgreSQL | Dialect::MySQL) => format!(
            "{}.{}",
            quote_identifier(dialect, schema),
            quote_identifier(dialect, &table.name)
        ),
        _ => quote_identifier(dialect, &table.name),
    }
}

/// カラム名リストをクォートしてカンマ区切りで結合
pub fn quote_columns(dialect: Dialect, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(dialect, c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SQL文字列リテラル（シングルクォートをエスケープ）
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_per_dialect() {
        assert_eq!(quote_identifier(Dialect::PostgreSQL, "a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_identifier(Dialect::MySQL, "a`b"), "`a``b`");
        assert_eq!(quote_identifier(Dialect::SQLite, "users"), "\"users\"");
    }

    #[test]
    fn test_quote_table_with_schema() {
        let table = TableRef::new(Some("public".to_string()), "users");
        assert_eq!(
            quote_table(Dialect::PostgreSQL, &table),
            r#""public"."users""#
        );
        assert_eq!(quote_table(Dialect::MySQL, &table), "`public`.`users`");
        // SQLiteはスキーマを無視
        assert_eq!(quote_table(Dialect::SQLite, &table), r#""users""#);
    }

    #[test]
    fn test_quote_columns() {
        assert_eq!(
            quote_columns(Dialect::PostgreSQL, &["user_id", "group_id"]),
            r#""user_id", "group_id""#
        );
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("public"), "'public'");
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
    }
}
