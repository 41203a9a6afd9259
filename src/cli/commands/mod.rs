// コマンドハンドラー層
// 各CLIコマンドの実装

pub mod build;
pub mod drop;
pub mod table_outcome;
pub mod validate;

use crate::cli::OutputFormat;
use anyhow::Result;
use serde::Serialize;
use thiserror::Error;

/// コマンド出力
///
/// `--format text` で表示する文字列を提供します。JSONはSerializeから生成します。
pub trait CommandOutput: Serialize {
    fn to_text(&self) -> String;
}

/// 出力フォーマットに応じてコマンド出力を文字列化
pub fn render_output<T: CommandOutput>(output: &T, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(output.to_text()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(output)?),
    }
}

/// 一部のテーブルで失敗したコマンド
///
/// 出力は表示したうえで、終了コードを非0にするために使います。
#[derive(Debug, Error)]
#[error("{failed} table(s) failed")]
pub struct TableFailures {
    /// レンダリング済みのコマンド出力
    pub output: String,
    /// 失敗したテーブル数
    pub failed: usize,
}
