// 設定ファイル読み込みサービス
//
// core::config の純粋性を保つため、ファイルI/Oはこのサービスに集約する。

use crate::core::config::Config;
use crate::core::error::ConfigError;
use std::path::Path;

/// 設定ファイル読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// YAMLファイルから設定を読み込み、検証する
    ///
    /// # Arguments
    ///
    /// * `path` - 設定ファイルのパス
    ///
    /// # Errors
    ///
    /// - ファイルの読み込みに失敗した場合
    /// - YAMLの解析に失敗した場合（未知のキーを含む）
    /// - 必須項目が欠けている、または接続URIのスキームが未対応の場合
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        let config: Config = serde_saphyr::from_str(&content).map_err(|e| ConfigError::Parse {
            path: Some(path.display().to_string()),
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }
}
