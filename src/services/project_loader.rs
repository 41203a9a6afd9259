// プロジェクト読み込みサービス
//
// ワークスペース探索 → 設定ファイル読み込み → モデル読み込み・型変換 を順に行い、
// データベースへ接続する前にすべての設定・モデルエラーを検出します。

use crate::core::config::{Config, Dialect};
use crate::core::model::{TableRef, TableSpec};
use crate::services::config_loader::ConfigLoader;
use crate::services::model_loader::ModelLoader;
use crate::services::workspace::Workspace;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// 読み込み済みのプロジェクト
#[derive(Debug, Clone)]
pub struct Project {
    /// ワークスペース
    pub workspace: Workspace,
    /// 設定
    pub config: Config,
    /// データベース方言
    pub dialect: Dialect,
    /// 設定ファイルから解決した既定スキーマ
    pub default_schema: Option<String>,
    /// テーブル定義（モデルファイルのパス順）
    pub tables: Vec<TableSpec>,
}

impl Project {
    /// テーブル定義とスキーマ解決済みの参照の組
    ///
    /// # Arguments
    ///
    /// * `default_schema` - 接続時に解決した既定スキーマ（MySQLの接続中データベースなど）
    pub fn table_refs<'a>(
        &'a self,
        default_schema: Option<&'a str>,
    ) -> impl Iterator<Item = (TableRef, &'a TableSpec)> + 'a {
        let default_schema = if self.dialect.supports_schemas() {
            default_schema
        } else {
            None
        };
        self.tables
            .iter()
            .map(move |table| (table.table_ref(default_schema), table))
    }
}

/// プロジェクト読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ProjectLoader;

impl ProjectLoader {
    /// 新しいProjectLoaderを作成
    pub fn new() -> Self {
        Self
    }

    /// プロジェクトディレクトリを読み込む
    ///
    /// # Errors
    ///
    /// ConfigError / ModelError / TypeError のいずれか（接続前に中断すべきエラー）
    pub fn load(&self, project_dir: &Path) -> Result<Project> {
        let workspace = Workspace::discover(project_dir)
            .with_context(|| format!("Failed to discover project: {}", project_dir.display()))?;
        debug!(
            config = %workspace.config_path.display(),
            models = workspace.model_paths.len(),
            "Discovered project files"
        );

        let config = ConfigLoader::from_file(&workspace.config_path)?;
        let dialect = config.dialect()?;
        let default_schema = config.default_schema()?;

        let loader = ModelLoader::new(config.context.clone());
        let tables = loader.load_models(&workspace.model_paths, dialect, default_schema.as_deref())?;

        Ok(Project {
            workspace,
            config,
            dialect,
            default_schema,
            tables,
        })
    }
}
