//! 要求ディスパッチャ
//!
//! 1メッセージ読む → `action` で振り分ける → 必要なら1メッセージ返す、を
//! 入力が閉じるまで繰り返す。要求は常に1件ずつ、完了してから次を読む。
//!
//! - `extract-text`: OCR → 項目抽出 → 応答を返す
//! - `rename`: 解析済みPDFを `<new_path>/<year>/<month>/` へ移動（応答なし）
//!
//! 個々の要求の失敗はログに残して次へ進む。
//! ストリームの切断・フレーム破損だけがループを止める。

use crate::channel::FramedChannel;
use crate::config::Config;
use crate::error::{PapError, Result};
use crate::extractor::{FieldExtractor, TextExtractor};
use crate::relocate;
use pap_analysis_common::{
    basename, date_token, display_name, has_pdf_extension, ExtractTextResponse, RenameTarget,
    Request,
};
use serde_json::Value;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    WaitingForRequest,
    Handling,
    Stopped,
}

pub struct Dispatcher<T, F> {
    config: Config,
    text_extractor: T,
    field_extractor: F,
    state: HostState,
}

impl<T: TextExtractor, F: FieldExtractor> Dispatcher<T, F> {
    pub fn new(config: Config, text_extractor: T, field_extractor: F) -> Self {
        Self {
            config,
            text_extractor,
            field_extractor,
            state: HostState::WaitingForRequest,
        }
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    /// 入力が閉じるかフレームが壊れるまで要求を処理する
    pub fn run<R: Read, W: Write>(&mut self, channel: &mut FramedChannel<R, W>) {
        while self.step(channel) != HostState::Stopped {}
    }

    /// 1要求ぶん処理して次の状態を返す
    pub fn step<R: Read, W: Write>(&mut self, channel: &mut FramedChannel<R, W>) -> HostState {
        if self.state == HostState::Stopped {
            return self.state;
        }

        let message = match channel.read_message() {
            Ok(Some(message)) => message,
            Ok(None) => {
                info!("input closed, stopping");
                return self.stop();
            }
            Err(e) => {
                error!("{}", e);
                return self.stop();
            }
        };

        self.state = HostState::Handling;
        match self.handle(message) {
            Ok(Some(response)) => {
                if let Err(e) = channel.write_message(&response) {
                    error!("{}", e);
                    return self.stop();
                }
            }
            Ok(None) => {}
            Err(e) if e.is_protocol() => {
                error!("{}", e);
                return self.stop();
            }
            Err(e) => warn!("request skipped: {}", e),
        }

        self.state = HostState::WaitingForRequest;
        self.state
    }

    fn stop(&mut self) -> HostState {
        self.state = HostState::Stopped;
        self.state
    }

    /// 1メッセージを処理し、返すべき応答があれば返す
    pub fn handle(&self, message: Value) -> Result<Option<ExtractTextResponse>> {
        let request =
            Request::from_value(message).map_err(|e| PapError::InvalidRequest(e.to_string()))?;
        debug!("message['action'] = \"{}\"", request.action());

        match request {
            Request::ExtractText { path } => self.extract_text(&path),
            Request::Rename { path, name } => {
                self.rename(&path, &name)?;
                Ok(None)
            }
        }
    }

    fn extract_text(&self, path: &str) -> Result<Option<ExtractTextResponse>> {
        let file_name = basename(path);
        if !has_pdf_extension(file_name) {
            debug!("{} is not a PDF, ignored", file_name);
            return Ok(None);
        }

        let name = display_name(file_name, self.config.name_prefix_width);
        debug!("name = \"{}\"", name);

        let text = self.text_extractor.extract_text(Path::new(path));
        let record = self.field_extractor.extract_fields(text.as_deref());
        let date = date_token(&record)?;

        Ok(Some(ExtractTextResponse {
            name,
            date,
            timestamp: record.timestamp,
            place: record.place,
            text: record.text,
        }))
    }

    fn rename(&self, path: &str, name: &str) -> Result<()> {
        let file_name = basename(path);
        if !has_pdf_extension(file_name) {
            return Err(PapError::InvalidRequest(format!("{} doesn't end by .pdf", file_name)));
        }

        let target = RenameTarget::parse(name, file_name)
            .map_err(|e| PapError::InvalidRequest(e.to_string()))?;
        let destination = target.destination(&self.config.new_path);

        relocate::relocate(Path::new(path), &destination)
    }
}
