// 設定ファイル管理
//
// プロジェクトの設定ファイル（YAML形式）の型定義と検証、
// 接続URIからのデータベース方言の判定を行います。

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// データベース方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(rename = "postgresql")]
    PostgreSQL,
    #[serde(rename = "mysql")]
    MySQL,
    #[serde(rename = "sqlite")]
    SQLite,
}

impl Dialect {
    /// 接続URIのスキームから方言を判定
    pub fn from_connection_uri(uri: &str) -> Result<Self, ConfigError> {
        let scheme = uri
            .split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .ok_or_else(|| ConfigError::UnsupportedScheme {
                uri: crate::adapters::connection_string::redact_password(uri),
            })?;

        match scheme.as_str() {
            "postgres" | "postgresql" => Ok(Dialect::PostgreSQL),
            "mysql" | "mariadb" => Ok(Dialect::MySQL),
            "sqlite" => Ok(Dialect::SQLite),
            _ => Err(ConfigError::UnsupportedScheme {
                uri: crate::adapters::connection_string::redact_password(uri),
            }),
        }
    }

    /// 方言ごとの既定スキーマ
    ///
    /// MySQLは接続中のデータベースを使うため None を返します。
    /// SQLiteはスキーマを扱いません。
    pub fn default_schema(&self) -> Option<&'static str> {
        match self {
            Dialect::PostgreSQL => Some("public"),
            Dialect::MySQL | Dialect::SQLite => None,
        }
    }

    /// スキーマ修飾をサポートするかどうか
    pub fn supports_schemas(&self) -> bool {
        !matches!(self, Dialect::SQLite)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::PostgreSQL => write!(f, "postgresql"),
            Dialect::MySQL => write!(f, "mysql"),
            Dialect::SQLite => write!(f, "sqlite"),
        }
    }
}

/// プロジェクト設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// データベース接続設定
    pub database: DatabaseSettings,

    /// モデルファイルのテンプレート変数
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

impl Config {
    /// 接続URIから判定した方言
    pub fn dialect(&self) -> Result<Dialect, ConfigError> {
        Dialect::from_connection_uri(&self.database.connection)
    }

    /// 実際に使用する既定スキーマ
    ///
    /// 設定ファイルの `database.schema` を優先し、無ければ方言の既定値を使います。
    pub fn default_schema(&self) -> Result<Option<String>, ConfigError> {
        let dialect = self.dialect()?;
        if !dialect.supports_schemas() {
            return Ok(None);
        }
        Ok(self
            .database
            .schema
            .clone()
            .filter(|schema| !schema.trim().is_empty())
            .or_else(|| dialect.default_schema().map(str::to_string)))
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;

        for key in self.context.keys() {
            if key.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    message: "context keys must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// std::str::FromStrトレイトの実装
impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })
    }
}

/// データベース接続設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSettings {
    /// 接続URI（postgresql://, mysql://, sqlite://）
    pub connection: String,

    /// 対象スキーマ
    #[serde(default)]
    pub schema: Option<String>,

    /// 接続タイムアウト（秒）
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl DatabaseSettings {
    /// 既定の接続タイムアウト（秒）
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// 接続タイムアウト（秒）
    pub fn timeout_secs(&self) -> u64 {
        self.timeout.unwrap_or(Self::DEFAULT_TIMEOUT_SECS)
    }

    /// Validate database settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "database.connection is not specified".to_string(),
            });
        }

        Dialect::from_connection_uri(&self.connection)?;

        if self.timeout == Some(0) {
            return Err(ConfigError::Invalid {
                message: "database.timeout must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
