use clap::Parser;
use pap_analysis::{channel, cli, config, dispatcher, error, extractor, logging};
use channel::FramedChannel;
use cli::Cli;
use config::Config;
use dispatcher::Dispatcher;
use error::Result;
use extractor::{OpenAiFieldExtractor, TesseractOcr};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.debug {
        config.debug = true;
    }

    logging::init(config.debug);

    if cli.show_config {
        // 手動起動時のみ（ホストとして起動された場合は使わない）
        println!("設定:");
        println!("  デバッグ: {}", config.debug);
        println!("  モデル: {}", config.model);
        println!("  API: {}", config.api_base);
        println!("  APIキー: {}", config.masked_api_key());
        println!("  移動先: {}", config.new_path.display());
        println!("  日付スタンプ幅: {}", config.name_prefix_width);
        println!("  OCR言語: {}", config.ocr_language.as_deref().unwrap_or("(既定)"));
        println!("  OCR解像度: {}dpi", config.ocr_resolution);
        return Ok(());
    }

    debug!("started with host args {:?}", cli.host_args);

    let text_extractor = TesseractOcr::from_config(&config);
    let field_extractor = OpenAiFieldExtractor::new(&config)?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut channel = FramedChannel::new(stdin.lock(), stdout.lock());

    // 入力が閉じた・フレームが壊れた場合も正常終了（ホストはもういない）
    let mut dispatcher = Dispatcher::new(config, text_extractor, field_extractor);
    dispatcher.run(&mut channel);

    Ok(())
}
