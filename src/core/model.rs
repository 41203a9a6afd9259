// テーブルモデル
//
// モデルファイルから読み込んだ「あるべき姿」のテーブル定義（TableSpec, ColumnSpec）と、
// データベースから取得した「現在の姿」のカラム情報（LiveColumn）を表現します。

use crate::core::logical_type::{ConcreteType, LogicalType};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// テーブル参照
///
/// アクションやレポートでテーブルを識別します。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TableRef {
    /// スキーマ名（SQLiteやMySQLの既定データベースでは None）
    pub schema: Option<String>,
    /// テーブル名
    pub name: String,
}

impl TableRef {
    /// 新しいテーブル参照を作成
    pub fn new(schema: Option<String>, name: impl Into<String>) -> Self {
        Self {
            schema,
            name: name.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// カラム定義
///
/// モデルファイルの1カラム分。読み込み後は変更しません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// カラム名（テーブル内で一意）
    pub name: String,
    /// 論理型
    pub logical_type: LogicalType,
    /// 長さ（数値型では精度）
    pub length: Option<u32>,
    /// 数値型のスケール
    pub scale: Option<u32>,
    /// プライマリキーフラグ
    pub primary_key: bool,
    /// 自動増分フラグ
    pub auto_increment: bool,
    /// NULL許可フラグ
    pub nullable: bool,
    /// 型マッピング済みの具体型
    pub column_type: ConcreteType,
}

impl ColumnSpec {
    /// 新しいカラム定義を作成
    ///
    /// 既定では NULL 許可、プライマリキーなし、自動増分なしです。
    pub fn new(name: impl Into<String>, logical_type: LogicalType, column_type: ConcreteType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            length: None,
            scale: None,
            primary_key: false,
            auto_increment: false,
            nullable: true,
            column_type,
        }
    }
}

/// テーブル定義
///
/// モデルファイル1つにつき1つ。実行のたびに新しく読み込みます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSpec {
    /// テーブル名
    pub name: String,
    /// スキーマ名（設定ファイルの既定スキーマを上書き）
    pub schema: Option<String>,
    /// カラム定義（記述順）
    pub columns: Vec<ColumnSpec>,
    /// 説明
    pub description: Option<String>,
    /// 読み込み元のモデルファイル
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl TableSpec {
    /// 新しいテーブル定義を作成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns: Vec::new(),
            description: None,
            source: None,
        }
    }

    /// カラムを追加
    pub fn add_column(&mut self, column: ColumnSpec) {
        self.columns.push(column);
    }

    /// 指定されたカラムを取得
    pub fn get_column(&self, column_name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == column_name)
    }

    /// プライマリキーのカラム名を取得
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// 既定スキーマを適用したテーブル参照
    pub fn table_ref(&self, default_schema: Option<&str>) -> TableRef {
        TableRef::new(
            self.schema
                .clone()
                .or_else(|| default_schema.map(str::to_string)),
            self.name.clone(),
        )
    }
}

/// DB上のカラム情報
///
/// データベースから取得したカラム。ツールの管理外で変更されうる状態です。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveColumn {
    /// カラム名
    pub name: String,
    /// 型（長さ・精度を含む宣言そのもの。例: `character varying(100)`）
    pub db_type: String,
    /// NULL許可フラグ
    pub nullable: bool,
    /// プライマリキーフラグ
    pub primary_key: bool,
    /// 自動増分フラグ
    pub auto_increment: bool,
}

impl LiveColumn {
    /// 新しいカラム情報を作成
    pub fn new(name: impl Into<String>, db_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            db_type: db_type.into(),
            nullable,
            primary_key: false,
            auto_increment: false,
        }
    }
}
