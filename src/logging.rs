//! ログ初期化
//!
//! 標準出力はプロトコル専用のため、ログはすべて標準エラーへ出す。

use tracing_subscriber::EnvFilter;

/// デバッグフラグに応じてログレベルを決める（RUST_LOG があればそちらを優先）
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 二重初期化（テスト等）は無視
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
