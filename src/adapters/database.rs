// データベース接続アダプター
//
// SQLxのAnyドライバーを使用したデータベース接続の管理を行います。
// PostgreSQL、MySQL、SQLiteに対応した統一されたインターフェースを提供します。

use crate::adapters::connection_string::{redact_password, to_sqlx_url};
use crate::core::config::{DatabaseSettings, Dialect};
use crate::core::error::DatabaseError;
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Row};
use std::time::Duration;
use tracing::debug;

/// データベース接続
///
/// 1回の実行で使用する接続プールと方言、既定スキーマを保持します。
/// 照合と適用は逐次実行のため、プールの接続数は1です。
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: AnyPool,
    dialect: Dialect,
    default_schema: Option<String>,
}

impl DatabaseConnection {
    /// データベースに接続
    ///
    /// # Arguments
    ///
    /// * `dialect` - データベース方言
    /// * `settings` - データベース接続設定
    /// * `default_schema` - 設定ファイルから解決した既定スキーマ
    ///
    /// # Returns
    ///
    /// 接続済みのDatabaseConnection、またはDatabaseError::Connection
    pub async fn connect(
        dialect: Dialect,
        settings: &DatabaseSettings,
        default_schema: Option<String>,
    ) -> Result<Self, DatabaseError> {
        sqlx::any::install_default_drivers();

        let url = to_sqlx_url(dialect, &settings.connection);
        debug!(
            dialect = %dialect,
            uri = %redact_password(&settings.connection),
            "Connecting to database"
        );

        let pool = Self::pool_options(settings.timeout_secs())
            .connect(&url)
            .await
            .map_err(|e| DatabaseError::Connection {
                message: format!(
                    "failed to connect to {}",
                    redact_password(&settings.connection)
                ),
                cause: e.to_string(),
            })?;

        let connection = Self::from_pool(pool, dialect, default_schema);
        connection.test_connection().await?;
        connection.resolve_default_schema().await
    }

    /// 既存の接続プールから作成
    pub fn from_pool(pool: AnyPool, dialect: Dialect, default_schema: Option<String>) -> Self {
        let default_schema = if dialect.supports_schemas() {
            default_schema
        } else {
            None
        };
        Self {
            pool,
            dialect,
            default_schema,
        }
    }

    /// 接続プール
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// データベース方言
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// 既定スキーマ
    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    /// 接続テストを実行
    pub async fn test_connection(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::Connection {
                message: "connection test failed".to_string(),
                cause: e.to_string(),
            })
    }

    /// 接続プールを閉じる
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// プールオプションを作成
    fn pool_options(timeout_secs: u64) -> AnyPoolOptions {
        AnyPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(timeout_secs))
    }

    /// MySQLでスキーマ未指定の場合、接続中のデータベースを既定スキーマにする
    async fn resolve_default_schema(mut self) -> Result<Self, DatabaseError> {
        if self.dialect != Dialect::MySQL || self.default_schema.is_some() {
            return Ok(self);
        }

        let row = sqlx::query("SELECT CAST(DATABASE() AS CHAR) AS name")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::Connection {
                message: "failed to resolve current database".to_string(),
                cause: e.to_string(),
            })?;
        self.default_schema = row.try_get::<Option<String>, _>("name").ok().flatten();
        Ok(self)
    }
}
