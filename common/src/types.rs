//! メッセージとレコードの型定義
//!
//! - Request: ホストから届く要求（`action` で分岐）
//! - ExtractedRecord: LLMによる項目抽出の結果（失敗時はセンチネル）
//! - ExtractTextResponse: `extract-text` への応答

use serde::{Deserialize, Serialize};

/// センチネルレコードの日付
pub const UNKNOWN_DATE: &str = "2024.xx.xx";
/// センチネルレコードの日時
pub const UNKNOWN_TIMESTAMP: &str = "xx/xx/2024 xx:xx:00";
/// センチネルレコードの場所
pub const UNKNOWN_PLACE: &str = "xxx";

/// ホストからの要求
///
/// `{"action": "extract-text", "path": ...}` または
/// `{"action": "rename", "path": ..., "name": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Request {
    ExtractText {
        path: String,
    },
    Rename {
        path: String,
        name: String,
    },
}

impl Request {
    /// JSON値から要求を組み立てる
    pub fn from_value(value: serde_json::Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// ログ用のアクション名
    pub fn action(&self) -> &'static str {
        match self {
            Request::ExtractText { .. } => "extract-text",
            Request::Rename { .. } => "rename",
        }
    }
}

/// 本文から抽出した会議情報
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// `YYYY.MM.DD`
    pub date: String,
    /// `DD/MM/YYYY HH:MM:SS`
    pub timestamp: String,
    pub place: String,
    /// 抽出元のテキスト
    pub text: String,
}

impl ExtractedRecord {
    /// 抽出失敗時のセンチネルレコード
    pub fn unknown(text: impl Into<String>) -> Self {
        Self {
            date: UNKNOWN_DATE.to_string(),
            timestamp: UNKNOWN_TIMESTAMP.to_string(),
            place: UNKNOWN_PLACE.to_string(),
            text: text.into(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.date == UNKNOWN_DATE && self.timestamp == UNKNOWN_TIMESTAMP && self.place == UNKNOWN_PLACE
    }
}

/// `extract-text` への応答
///
/// `date` はファイル名用のトークン（`YYYY.MM.DD-HH.MM`）で、
/// ExtractedRecord.date とは別物
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractTextResponse {
    pub name: String,
    pub date: String,
    pub timestamp: String,
    pub place: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_extract_text() {
        let request = Request::from_value(json!({
            "action": "extract-text",
            "path": "/tmp/2024 03 05 - PAP Acme Corp.pdf"
        }))
        .unwrap();
        assert_eq!(
            request,
            Request::ExtractText { path: "/tmp/2024 03 05 - PAP Acme Corp.pdf".to_string() }
        );
        assert_eq!(request.action(), "extract-text");
    }

    #[test]
    fn test_request_rename() {
        let request = Request::from_value(json!({
            "action": "rename",
            "path": "/tmp/old.pdf",
            "name": "2024.03.05-14.30 Acme Corp.pdf"
        }))
        .unwrap();
        match request {
            Request::Rename { path, name } => {
                assert_eq!(path, "/tmp/old.pdf");
                assert_eq!(name, "2024.03.05-14.30 Acme Corp.pdf");
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_request_unknown_action() {
        let result = Request::from_value(json!({"action": "delete", "path": "/tmp/a.pdf"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_request_missing_field() {
        // renameにはnameが必須
        let result = Request::from_value(json!({"action": "rename", "path": "/tmp/a.pdf"}));
        assert!(result.is_err());

        let result = Request::from_value(json!({"path": "/tmp/a.pdf"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_request_extra_fields_ignored() {
        let request = Request::from_value(json!({
            "action": "extract-text",
            "path": "/tmp/a.pdf",
            "tab": 3
        }))
        .unwrap();
        assert_eq!(request.action(), "extract-text");
    }

    #[test]
    fn test_unknown_record() {
        let record = ExtractedRecord::unknown("bonjour");
        assert_eq!(record.date, "2024.xx.xx");
        assert_eq!(record.timestamp, "xx/xx/2024 xx:xx:00");
        assert_eq!(record.place, "xxx");
        assert_eq!(record.text, "bonjour");
        assert!(record.is_unknown());
    }

    #[test]
    fn test_response_field_names() {
        let response = ExtractTextResponse {
            name: "Acme Corp".to_string(),
            date: "2024.03.05-14.30".to_string(),
            timestamp: "05/03/2024 14:30:00".to_string(),
            place: "Mérignac".to_string(),
            text: "...".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["name"], "Acme Corp");
        assert_eq!(value["date"], "2024.03.05-14.30");
        assert_eq!(value["timestamp"], "05/03/2024 14:30:00");
        assert_eq!(value["place"], "Mérignac");
        assert_eq!(value["text"], "...");
    }
}
