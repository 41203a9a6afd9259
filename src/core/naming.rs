// 命名ポリシー
//
// 設定ファイル名・拡張子・環境変数名の単一ソースを提供します。

/// 設定ファイルのファイル名（拡張子なし）
pub const CONFIG_FILE_STEM: &str = "config";

/// モデル・設定ファイルとして扱う拡張子
pub const YAML_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// ログフィルターを上書きする環境変数
pub const LOG_ENV: &str = "MODELSYNC_LOG";

/// YAML拡張子を持つパスかどうか
pub fn is_yaml_path(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| YAML_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// 設定ファイル名（config.yaml / config.yml）かどうか
pub fn is_config_file(path: &std::path::Path) -> bool {
    is_yaml_path(path)
        && path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| stem == CONFIG_FILE_STEM)
            .unwrap_or(false)
}
