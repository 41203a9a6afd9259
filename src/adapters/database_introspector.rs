// データベースイントロスペクター
//
// データベースから既存テーブルのカラム情報を取得するための抽象化レイヤー。
// 各方言固有のINFORMATION_SCHEMA/PRAGMAクエリを実装します。

use crate::adapters::sql_quote::quote_identifier_sqlite;
use crate::core::config::Dialect;
use crate::core::error::DatabaseError;
use crate::core::model::LiveColumn;
use async_trait::async_trait;
use sqlx::{AnyPool, Row};

/// データベーススキーマ取得インターフェース
///
/// 各データベース方言固有のイントロスペクション処理を抽象化します。
/// `schema` が None の場合は方言の既定（PostgreSQLは public、MySQLは接続中のデータベース）を使います。
#[async_trait]
pub trait DatabaseIntrospector: Send + Sync {
    /// テーブルが存在するかどうか
    async fn table_exists(
        &self,
        pool: &AnyPool,
        schema: Option<&str>,
        table_name: &str,
    ) -> Result<bool, DatabaseError>;

    /// スキーマ内のテーブル名一覧を取得
    async fn list_tables(
        &self,
        pool: &AnyPool,
        schema: Option<&str>,
    ) -> Result<Vec<String>, DatabaseError>;

    /// カラム情報を定義順に取得
    async fn get_columns(
        &self,
        pool: &AnyPool,
        schema: Option<&str>,
        table_name: &str,
    ) -> Result<Vec<LiveColumn>, DatabaseError>;

    /// テーブルのカラム情報を取得（テーブルが存在しない場合は None）
    async fn inspect(
        &self,
        pool: &AnyPool,
        schema: Option<&str>,
        table_name: &str,
    ) -> Result<Option<Vec<LiveColumn>>, DatabaseError> {
        if !self.table_exists(pool, schema, table_name).await? {
            return Ok(None);
        }
        self.get_columns(pool, schema, table_name).await.map(Some)
    }
}

/// PostgreSQL用イントロスペクター
pub struct PostgresIntrospector;

/// MySQL用イントロスペクター
pub struct MySqlIntrospector;

/// SQLite用イントロスペクター
pub struct SqliteIntrospector;

/// 方言に応じたイントロスペクターを作成
pub fn create_introspector(dialect: Dialect) -> Box<dyn DatabaseIntrospector> {
    match dialect {
        Dialect::PostgreSQL => Box::new(PostgresIntrospector),
        Dialect::MySQL => Box::new(MySqlIntrospector),
        Dialect::SQLite => Box::new(SqliteIntrospector),
    }
}

/// クエリ失敗をDatabaseErrorに変換
fn query_error(sql: &str, error: sqlx::Error) -> DatabaseError {
    DatabaseError::Execution {
        message: format!("failed to inspect table: {}", error),
        sql: Some(sql.trim().to_string()),
    }
}

// =============================================================================
// PostgreSQL イントロスペクター実装
// =============================================================================

impl PostgresIntrospector {
    /// information_schema の列情報から長さ・精度付きの型宣言を組み立てる
    fn compose_db_type(
        data_type: &str,
        char_max_length: Option<i32>,
        numeric_precision: Option<i32>,
        numeric_scale: Option<i32>,
    ) -> String {
        match data_type {
            "character varying" | "character" => match char_max_length {
                Some(length) => format!("{}({})", data_type, length),
                None => data_type.to_string(),
            },
            "numeric" => match (numeric_precision, numeric_scale) {
                (Some(precision), Some(scale)) => format!("numeric({},{})", precision, scale),
                (Some(precision), None) => format!("numeric({})", precision),
                _ => data_type.to_string(),
            },
            _ => data_type.to_string(),
        }
    }
}

#[async_trait]
impl DatabaseIntrospector for PostgresIntrospector {
    async fn table_exists(
        &self,
        pool: &AnyPool,
        schema: Option<&str>,
        table_name: &str,
    ) -> Result<bool, DatabaseError> {
        let sql = r#"
            SELECT COUNT(*)
            FROM information_schema.tables
            WHERE table_schema = $1 AND table_name = $2
        "#;

        let row = sqlx::query(sql)
            .bind(schema.unwrap_or("public"))
            .bind(table_name)
            .fetch_one(pool)
            .await
            .map_err(|e| query_error(sql, e))?;
        let count: i64 = row.try_get(0).map_err(|e| query_error(sql, e))?;

        Ok(count > 0)
    }

    async fn list_tables(
        &self,
        pool: &AnyPool,
        schema: Option<&str>,
    ) -> Result<Vec<String>, DatabaseError> {
        let sql = r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = $1 AND table_type = 'BASE TABLE'
            ORDER BY table_name
        "#;

        let rows = sqlx::query(sql)
            .bind(schema.unwrap_or("public"))
            .fetch_all(pool)
            .await
            .map_err(|e| query_error(sql, e))?;

        rows.iter()
            .map(|row| row.try_get::<String, _>(0))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| query_error(sql, e))
    }

    async fn get_columns(
        &self,
        pool: &AnyPool,
        schema: Option<&str>,
        table_name: &str,
    ) -> Result<Vec<LiveColumn>, DatabaseError> {
        let schema = schema.unwrap_or("public");

        // information_schema のドメイン型は Any ドライバーで扱えないため明示的にキャストする
        let sql = r#"
            SELECT
                column_name::text,
                data_type::text,
                is_nullable::text,
                column_default::text,
                character_maximum_length::int4,
                numeric_precision::int4,
                numeric_scale::int4,
                is_identity::text
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
        "#;

        let rows = sqlx::query(sql)
            .bind(schema)
            .bind(table_name)
            .fetch_all(pool)
            .await
            .map_err(|e| query_error(sql, e))?;

        let pk_sql = r#"
            SELECT a.attname::text
            FROM pg_index i
            JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
            JOIN pg_class c ON c.oid = i.indrelid
            JOIN pg_namespace n ON n.oid = c.relnamespace
            WHERE i.indisprimary
                AND n.nspname = $1
                AND c.relname = $2
        "#;

        let pk_rows = sqlx::query(pk_sql)
            .bind(schema)
            .bind(table_name)
            .fetch_all(pool)
            .await
            .map_err(|e| query_error(pk_sql, e))?;
        let pk_columns = pk_rows
            .iter()
            .map(|row| row.try_get::<String, _>(0))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| query_error(pk_sql, e))?;

        rows.iter()
            .map(|row| -> Result<LiveColumn, sqlx::Error> {
                let name: String = row.try_get(0)?;
                let data_type: String = row.try_get(1)?;
                let is_nullable: String = row.try_get(2)?;
                let default_value: Option<String> = row.try_get(3)?;
                let is_identity: Option<String> = row.try_get(7)?;

                let db_type = Self::compose_db_type(
                    &data_type,
                    row.try_get(4)?,
                    row.try_get(5)?,
                    row.try_get(6)?,
                );
                let auto_increment = default_value
                    .as_deref()
                    .is_some_and(|default| default.starts_with("nextval("))
                    || is_identity.as_deref() == Some("YES");

                Ok(LiveColumn {
                    primary_key: pk_columns.contains(&name),
                    name,
                    db_type,
                    nullable: is_nullable == "YES",
                    auto_increment,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| query_error(sql, e))
    }
}

// =============================================================================
// MySQL イントロスペクター実装
// =============================================================================

impl MySqlIntrospector {
    /// スキーマ条件（未指定の場合は接続中のデータベース）
    fn schema_condition(schema: Option<&str>) -> &'static str {
        if schema.is_some() {
            "TABLE_SCHEMA = ?"
        } else {
            "TABLE_SCHEMA = DATABASE()"
        }
    }
}

#[async_trait]
impl DatabaseIntrospector for MySqlIntrospector {
    async fn table_exists(
        &self,
        pool: &AnyPool,
        schema: Option<&str>,
        table_name: &str,
    ) -> Result<bool, DatabaseError> {
        let sql = format!(
            "SELECT COUNT(*) FROM information_schema.TABLES WHERE {} AND TABLE_NAME = ?",
            Self::schema_condition(schema)
        );

        let mut query = sqlx::query(&sql);
        if let Some(schema) = schema {
            query = query.bind(schema);
        }
        let row = query
            .bind(table_name)
            .fetch_one(pool)
            .await
            .map_err(|e| query_error(&sql, e))?;
        let count: i64 = row.try_get(0).map_err(|e| query_error(&sql, e))?;

        Ok(count > 0)
    }

    async fn list_tables(
        &self,
        pool: &AnyPool,
        schema: Option<&str>,
    ) -> Result<Vec<String>, DatabaseError> {
        let sql = format!(
            "SELECT CAST(TABLE_NAME AS CHAR) FROM information_schema.TABLES WHERE {} AND TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_NAME",
            Self::schema_condition(schema)
        );

        let mut query = sqlx::query(&sql);
        if let Some(schema) = schema {
            query = query.bind(schema);
        }
        let rows = query
            .fetch_all(pool)
            .await
            .map_err(|e| query_error(&sql, e))?;

        rows.iter()
            .map(|row| row.try_get::<String, _>(0))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| query_error(&sql, e))
    }

    async fn get_columns(
        &self,
        pool: &AnyPool,
        schema: Option<&str>,
        table_name: &str,
    ) -> Result<Vec<LiveColumn>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR),
                CAST(COLUMN_TYPE AS CHAR),
                CAST(IS_NULLABLE AS CHAR),
                CAST(COLUMN_KEY AS CHAR),
                CAST(EXTRA AS CHAR)
            FROM information_schema.COLUMNS
            WHERE {} AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#,
            Self::schema_condition(schema)
        );

        let mut query = sqlx::query(&sql);
        if let Some(schema) = schema {
            query = query.bind(schema);
        }
        let rows = query
            .bind(table_name)
            .fetch_all(pool)
            .await
            .map_err(|e| query_error(&sql, e))?;

        rows.iter()
            .map(|row| -> Result<LiveColumn, sqlx::Error> {
                let is_nullable: String = row.try_get(2)?;
                let column_key: String = row.try_get(3)?;
                let extra: String = row.try_get(4)?;

                Ok(LiveColumn {
                    name: row.try_get(0)?,
                    db_type: row.try_get(1)?,
                    nullable: is_nullable == "YES",
                    primary_key: column_key == "PRI",
                    auto_increment: extra.to_ascii_lowercase().contains("auto_increment"),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| query_error(&sql, e))
    }
}

// =============================================================================
// SQLite イントロスペクター実装
// =============================================================================

#[async_trait]
impl DatabaseIntrospector for SqliteIntrospector {
    async fn table_exists(
        &self,
        pool: &AnyPool,
        _schema: Option<&str>,
        table_name: &str,
    ) -> Result<bool, DatabaseError> {
        let sql = "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?";

        let row = sqlx::query(sql)
            .bind(table_name)
            .fetch_one(pool)
            .await
            .map_err(|e| query_error(sql, e))?;
        let count: i64 = row.try_get(0).map_err(|e| query_error(sql, e))?;

        Ok(count > 0)
    }

    async fn list_tables(
        &self,
        pool: &AnyPool,
        _schema: Option<&str>,
    ) -> Result<Vec<String>, DatabaseError> {
        let sql = r#"
            SELECT name
            FROM sqlite_master
            WHERE type = 'table'
                AND name NOT LIKE 'sqlite_%'
            ORDER BY name
        "#;

        let rows = sqlx::query(sql)
            .fetch_all(pool)
            .await
            .map_err(|e| query_error(sql, e))?;

        rows.iter()
            .map(|row| row.try_get::<String, _>(0))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| query_error(sql, e))
    }

    async fn get_columns(
        &self,
        pool: &AnyPool,
        _schema: Option<&str>,
        table_name: &str,
    ) -> Result<Vec<LiveColumn>, DatabaseError> {
        let sql = format!("PRAGMA table_info({})", quote_identifier_sqlite(table_name));
        let rows = sqlx::query(&sql)
            .fetch_all(pool)
            .await
            .map_err(|e| query_error(&sql, e))?;

        let mut columns = rows
            .iter()
            .map(|row| -> Result<LiveColumn, sqlx::Error> {
                let not_null: i64 = row.try_get(3)?;
                let pk: i64 = row.try_get(5)?;
                let mut column = LiveColumn::new(
                    row.try_get::<String, _>(1)?,
                    row.try_get::<String, _>(2)?,
                    not_null == 0,
                );
                column.primary_key = pk > 0;
                Ok(column)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| query_error(&sql, e))?;

        // AUTOINCREMENT は単一の INTEGER PRIMARY KEY にのみ付与できる
        let ddl_sql = "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?";
        let ddl: Option<String> = sqlx::query(ddl_sql)
            .bind(table_name)
            .fetch_optional(pool)
            .await
            .map_err(|e| query_error(ddl_sql, e))?
            .map(|row| row.try_get::<Option<String>, _>(0))
            .transpose()
            .map_err(|e| query_error(ddl_sql, e))?
            .flatten();

        let has_autoincrement = ddl
            .as_deref()
            .is_some_and(|ddl| ddl.to_ascii_uppercase().contains("AUTOINCREMENT"));
        let pk_count = columns.iter().filter(|c| c.primary_key).count();
        if has_autoincrement && pk_count == 1 {
            for column in columns.iter_mut().filter(|c| c.primary_key) {
                column.auto_increment = column.db_type.eq_ignore_ascii_case("INTEGER");
            }
        }

        Ok(columns)
    }
}
