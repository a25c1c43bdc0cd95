use clap::Parser;
use std::path::PathBuf;

/// ブラウザ（メールクライアント）拡張から起動されるネイティブメッセージングホスト
///
/// 標準入出力で長さ付きJSONメッセージをやり取りする。
#[derive(Parser, Debug)]
#[command(name = "pap-analysis")]
#[command(about = "PAP PDF解析ネイティブメッセージングホスト", long_about = None)]
pub struct Cli {
    /// 設定ファイル（デフォルト: ~/.config/pap-analysis/config.json）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 詳細ログを標準エラーに出力
    #[arg(short, long)]
    pub debug: bool,

    /// 確定した設定を表示して終了
    #[arg(long)]
    pub show_config: bool,

    /// 起動元が渡す引数（マニフェストのパス、拡張ID）
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub host_args: Vec<String>,
}
