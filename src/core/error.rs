// エラー型定義
//
// アプリケーション全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、ConfigError, ModelError, TypeError, DatabaseError, ReconcileError を定義します。

use serde::Serialize;
use thiserror::Error;

/// 設定エラー
///
/// 設定ファイルの探索・読み込み・検証時に発生するエラーを表現します。
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Project directory not found
    #[error("Project directory not found: {path}")]
    ProjectNotFound {
        /// ディレクトリパス
        path: String,
    },

    /// Config file not found
    #[error("Config file not found in {dir}: expected exactly one config.yaml or config.yml")]
    NotFound {
        /// 探索したディレクトリ
        dir: String,
    },

    /// More than one config file found
    #[error("Multiple config files found: {}. There must be exactly one config.yaml or config.yml", .paths.join(", "))]
    Multiple {
        /// 見つかった設定ファイル
        paths: Vec<String>,
    },

    /// Config file read error
    #[error("Failed to read config file: {path} (cause: {cause})")]
    Read {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// Config file parse error
    #[error("Failed to parse config file{}: {message}", format_path_opt(.path))]
    Parse {
        /// ファイルパス
        path: Option<String>,
        /// エラーメッセージ
        message: String,
    },

    /// Invalid config value
    #[error("Invalid config: {message}")]
    Invalid {
        /// エラーメッセージ
        message: String,
    },

    /// Unsupported connection URI scheme
    #[error("Unsupported connection URI: {uri}. Use postgresql://, mysql:// or sqlite://")]
    UnsupportedScheme {
        /// 接続URI（パスワードはマスク済み）
        uri: String,
    },
}

impl ConfigError {
    /// 設定ファイルが見つからないエラーかどうか
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConfigError::NotFound { .. } | ConfigError::ProjectNotFound { .. }
        )
    }

    /// 設定ファイルが複数あるエラーかどうか
    pub fn is_multiple(&self) -> bool {
        matches!(self, ConfigError::Multiple { .. })
    }

    /// パースエラーかどうか
    pub fn is_parse(&self) -> bool {
        matches!(self, ConfigError::Parse { .. })
    }

    /// 不正な設定値エラーかどうか
    pub fn is_invalid(&self) -> bool {
        matches!(self, ConfigError::Invalid { .. })
    }

    /// 未対応スキームエラーかどうか
    pub fn is_unsupported_scheme(&self) -> bool {
        matches!(self, ConfigError::UnsupportedScheme { .. })
    }
}

/// 型エラー
///
/// 論理型から具体型への変換時に発生するエラーを表現します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Logical type outside the vocabulary
    #[error("Unknown type '{name}'. Supported types: {}", crate::core::logical_type::LogicalType::vocabulary().join(", "))]
    UnknownType {
        /// 指定された型名
        name: String,
    },

    /// Length (precision) is required but missing
    #[error("Type '{type_name}' requires a length")]
    MissingLength {
        /// 型名
        type_name: String,
    },

    /// Length (precision/scale) out of range
    #[error("Invalid length for type '{type_name}': {message}")]
    InvalidLength {
        /// 型名
        type_name: String,
        /// エラーメッセージ
        message: String,
    },

    /// Auto increment on a non-integer type
    #[error("auto_increment is only supported on integer types, not '{type_name}'")]
    AutoIncrementNotSupported {
        /// 型名
        type_name: String,
    },
}

impl TypeError {
    /// 未知の型エラーかどうか
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, TypeError::UnknownType { .. })
    }

    /// 長さ指定漏れエラーかどうか
    pub fn is_missing_length(&self) -> bool {
        matches!(self, TypeError::MissingLength { .. })
    }

    /// 長さ不正エラーかどうか
    pub fn is_invalid_length(&self) -> bool {
        matches!(self, TypeError::InvalidLength { .. })
    }
}

/// モデルエラー
///
/// モデルファイルの読み込み・解析時に発生するエラーを表現します。
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// Model file read error
    #[error("Failed to read model file: {path} (cause: {cause})")]
    Read {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// Malformed model
    #[error("Malformed model {path}: {message}")]
    Malformed {
        /// ファイルパス
        path: String,
        /// エラーメッセージ
        message: String,
    },

    /// Two columns share a name
    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn {
        /// テーブル名
        table: String,
        /// カラム名
        column: String,
    },

    /// Two models resolve to the same table
    #[error("Table '{table}' is defined by more than one model: {}", .paths.join(", "))]
    DuplicateTable {
        /// テーブル名（スキーマ修飾済み）
        table: String,
        /// 定義しているファイル
        paths: Vec<String>,
    },

    /// Unknown template variable
    #[error("Unknown template variable '{variable}' in {path}")]
    Template {
        /// ファイルパス
        path: String,
        /// 変数名
        variable: String,
    },

    /// Invalid column type
    #[error("Invalid type for column '{column}' in table '{table}': {source}")]
    ColumnType {
        /// テーブル名
        table: String,
        /// カラム名
        column: String,
        /// 型エラー
        #[source]
        source: TypeError,
    },
}

impl ModelError {
    /// 不正モデルエラーかどうか
    pub fn is_malformed(&self) -> bool {
        matches!(self, ModelError::Malformed { .. })
    }

    /// カラム重複エラーかどうか
    pub fn is_duplicate_column(&self) -> bool {
        matches!(self, ModelError::DuplicateColumn { .. })
    }

    /// テーブル重複エラーかどうか
    pub fn is_duplicate_table(&self) -> bool {
        matches!(self, ModelError::DuplicateTable { .. })
    }

    /// テンプレートエラーかどうか
    pub fn is_template(&self) -> bool {
        matches!(self, ModelError::Template { .. })
    }

    /// 型エラーを取得
    pub fn type_error(&self) -> Option<&TypeError> {
        match self {
            ModelError::ColumnType { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// データベースエラー
///
/// データベース操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection error
    #[error("Database connection error: {message} (cause: {cause})")]
    Connection {
        /// エラーメッセージ
        message: String,
        /// エラー原因
        cause: String,
    },

    /// Statement execution error
    #[error("Statement execution error: {message}")]
    Execution {
        /// エラーメッセージ
        message: String,
        /// 失敗したSQL
        sql: Option<String>,
    },

    /// Transaction error
    #[error("Transaction error: {message}")]
    Transaction {
        /// エラーメッセージ
        message: String,
    },

    /// Operation not expressible on this dialect
    #[error("Unsupported operation on {dialect}: {message}")]
    Unsupported {
        /// 対象のデータベース方言
        dialect: String,
        /// エラーメッセージ
        message: String,
    },
}

impl DatabaseError {
    /// 接続エラーかどうか
    pub fn is_connection(&self) -> bool {
        matches!(self, DatabaseError::Connection { .. })
    }

    /// 実行エラーかどうか
    pub fn is_execution(&self) -> bool {
        matches!(self, DatabaseError::Execution { .. })
    }

    /// トランザクションエラーかどうか
    pub fn is_transaction(&self) -> bool {
        matches!(self, DatabaseError::Transaction { .. })
    }

    /// 方言非対応エラーかどうか
    pub fn is_unsupported(&self) -> bool {
        matches!(self, DatabaseError::Unsupported { .. })
    }

    /// レポート用のエラー種別
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatabaseError::Connection { .. } => ErrorKind::Connection,
            DatabaseError::Execution { .. } => ErrorKind::Execution,
            DatabaseError::Transaction { .. } => ErrorKind::Transaction,
            DatabaseError::Unsupported { .. } => ErrorKind::Unsupported,
        }
    }
}

/// 適用レポートに記録するエラー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connection,
    Execution,
    Transaction,
    Unsupported,
    Inspection,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Execution => "execution",
            ErrorKind::Transaction => "transaction",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::Inspection => "inspection",
        };
        write!(f, "{}", label)
    }
}

/// 照合エラー
///
/// 安全に変更できない型の不一致を表現します（未知のDB型など）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("Cannot reconcile column '{column}' of table '{table}': live type '{live_type}' is not comparable with '{desired_type}'")]
pub struct ReconcileError {
    /// テーブル名
    pub table: String,
    /// カラム名
    pub column: String,
    /// DB上の型
    pub live_type: String,
    /// モデル上の型
    pub desired_type: String,
}

/// パス情報をフォーマットするヘルパー関数
fn format_path_opt(path: &Option<String>) -> String {
    path.as_ref()
        .map_or(String::new(), |path| format!(" {}", path))
}
