// ログ初期化
//
// tracing-subscriberをstderrに出力するよう設定します。
// stdoutはコマンドの出力専用です。

use crate::core::naming::LOG_ENV;
use tracing_subscriber::EnvFilter;

/// 既定のログフィルター
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "modelsync=debug"
    } else {
        "modelsync=info"
    }
}

/// ログを初期化
///
/// `MODELSYNC_LOG` が設定されていればそのフィルターを優先します。
/// 二重に初期化された場合は何もしません。
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
