//! PAP PDF Analysis
//!
//! メールクライアント拡張から起動されるネイティブメッセージングホスト。
//! 添付PDFをOCRし、LLMで会議の日時・場所を抽出して返す。
//! 解析済みPDFは `<new_path>/<year>/<month>/` へ移動する。

pub mod channel;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod relocate;
