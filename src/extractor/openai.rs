//! OpenAI互換チャットAPIによる項目抽出

use super::FieldExtractor;
use crate::config::Config;
use crate::error::{PapError, Result};
use pap_analysis_common::{build_field_messages, parse_field_response, ChatMessage, ExtractedRecord};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AnswerMessage,
}

#[derive(Deserialize)]
struct AnswerMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiFieldExtractor {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiFieldExtractor {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PapError::Config(format!("HTTPクライアントを初期化できません: {}", e)))?;

        Ok(Self::with_client(client, &config.api_base, &config.api_key, &config.model))
    }

    pub fn with_client(client: Client, api_base: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    /// チャットAPIを呼び、回答本文を返す
    pub fn request_answer(&self, text: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: build_field_messages(text),
        };
        debug!("request = {:?}", body.messages);

        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| PapError::ApiCall(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(PapError::ApiCall(format!("status {}: {}", status, detail)));
        }

        let payload: ChatResponse = response
            .json()
            .map_err(|e| PapError::ApiParse(e.to_string()))?;

        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PapError::ApiParse("回答が空です".into()))
    }

    /// 回答を ExtractedRecord に変換（失敗はエラーとして返す）
    pub fn request_fields(&self, text: &str) -> Result<ExtractedRecord> {
        let answer = self.request_answer(text)?;
        debug!("answer = '{}'", answer);

        parse_field_response(&answer, text).map_err(|e| PapError::ApiParse(e.to_string()))
    }
}

impl FieldExtractor for OpenAiFieldExtractor {
    fn extract_fields(&self, text: Option<&str>) -> ExtractedRecord {
        let text = match text {
            Some(text) if !text.trim().is_empty() => text,
            other => {
                debug!("no text to analyse");
                return ExtractedRecord::unknown(other.unwrap_or_default());
            }
        };

        match self.request_fields(text) {
            Ok(record) => {
                debug!("info = {:?}", record);
                record
            }
            Err(e) => {
                warn!("field extraction failed: {}", e);
                ExtractedRecord::unknown(text)
            }
        }
    }
}
