//! 外部連携（OCR・LLM）の境界
//!
//! どちらの実装も失敗を外へ投げない。
//! テキスト抽出は `None`、項目抽出はセンチネルレコードを返す。

mod ocr;
mod openai;

pub use ocr::{page_number, TesseractOcr};
pub use openai::OpenAiFieldExtractor;

use pap_analysis_common::ExtractedRecord;
use std::path::Path;

/// 文書からテキストを取り出す
pub trait TextExtractor {
    /// 読めない・対応外の場合は `None`
    fn extract_text(&self, path: &Path) -> Option<String>;
}

/// テキストから会議情報（日付・時刻・場所）を取り出す
pub trait FieldExtractor {
    /// 失敗時は `ExtractedRecord::unknown(text)`
    fn extract_fields(&self, text: Option<&str>) -> ExtractedRecord;
}
