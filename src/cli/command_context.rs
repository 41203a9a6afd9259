// コマンド共通コンテキスト
//
// プロジェクト読み込みとデータベース接続の重複をCLI層で集約する。

use crate::adapters::connection_string::redact_password;
use crate::adapters::database::DatabaseConnection;
use crate::core::config::Dialect;
use crate::services::project_loader::{Project, ProjectLoader};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project: Project,
}

impl CommandContext {
    /// プロジェクトディレクトリを読み込んでコンテキストを作成
    ///
    /// 設定・モデルのエラーはここで検出され、接続は行いません。
    pub fn load(project_dir: &Path) -> Result<Self> {
        let project = ProjectLoader::new().load(project_dir)?;
        info!(
            project = %project_dir.display(),
            dialect = %project.dialect,
            tables = project.tables.len(),
            "Loaded project"
        );
        Ok(Self { project })
    }

    /// データベース方言を取得
    pub fn dialect(&self) -> Dialect {
        self.project.dialect
    }

    /// データベースに接続
    pub async fn connect(&self) -> Result<DatabaseConnection> {
        let settings = &self.project.config.database;
        DatabaseConnection::connect(
            self.project.dialect,
            settings,
            self.project.default_schema.clone(),
        )
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database: {}",
                redact_password(&settings.connection)
            )
        })
    }
}
