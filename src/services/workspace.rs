// プロジェクトワークスペース探索
//
// プロジェクトディレクトリ配下から設定ファイル（config.yaml / config.yml）と
// モデルファイル（それ以外の *.yaml / *.yml）を再帰的に収集します。

use crate::core::error::ConfigError;
use crate::core::naming::{is_config_file, is_yaml_path};
use std::fs;
use std::path::{Path, PathBuf};

/// プロジェクトワークスペース
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// プロジェクトディレクトリ
    pub root: PathBuf,
    /// 設定ファイルのパス
    pub config_path: PathBuf,
    /// モデルファイルのパス（パス順）
    pub model_paths: Vec<PathBuf>,
}

impl Workspace {
    /// プロジェクトディレクトリを探索
    ///
    /// 隠しディレクトリ（`.git` など）は探索しません。
    ///
    /// # Errors
    ///
    /// - ディレクトリが存在しない場合
    /// - 設定ファイルが0個、または2個以上の場合
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        if !root.is_dir() {
            return Err(ConfigError::ProjectNotFound {
                path: root.display().to_string(),
            });
        }

        let mut yaml_files = Vec::new();
        Self::scan_yaml_files(root, &mut yaml_files)?;
        yaml_files.sort();

        let (config_files, model_paths): (Vec<_>, Vec<_>) = yaml_files
            .into_iter()
            .partition(|path| is_config_file(path));

        let config_path = match config_files.as_slice() {
            [] => {
                return Err(ConfigError::NotFound {
                    dir: root.display().to_string(),
                })
            }
            [single] => single.clone(),
            _ => {
                return Err(ConfigError::Multiple {
                    paths: config_files
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect(),
                })
            }
        };

        Ok(Self {
            root: root.to_path_buf(),
            config_path,
            model_paths,
        })
    }

    /// ディレクトリを再帰的に走査してYAMLファイルを収集
    fn scan_yaml_files(dir: &Path, yaml_files: &mut Vec<PathBuf>) -> Result<(), ConfigError> {
        let read_error = |e: std::io::Error| ConfigError::Read {
            path: dir.display().to_string(),
            cause: e.to_string(),
        };

        for entry in fs::read_dir(dir).map_err(read_error)? {
            let path = entry.map_err(read_error)?.path();

            if path.is_dir() {
                let hidden = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with('.'));
                if !hidden {
                    Self::scan_yaml_files(&path, yaml_files)?;
                }
            } else if path.is_file() && is_yaml_path(&path) {
                yaml_files.push(path);
            }
        }

        Ok(())
    }
}
