//! プロンプト生成モジュール
//!
//! 会議招集状（PAP交渉）のテキストから、場所・日付・時刻を
//! JSONで答えさせるチャットメッセージを組み立てる

use serde::{Deserialize, Serialize};

/// システムメッセージ
pub const SYSTEM_PROMPT: &str = "Vous êtes un assistant utile qui répond en JSON. \
Aidez-moi à analyser une invitation à une réunion contenue dans le texte joint.";

/// 抽出指示
pub const EXTRACTION_INSTRUCTIONS: &str = "Extraire du texte suivant, \
le lieu de la réunion de négociation du protocole d'accord préélectoral dans le champ 'place', \
la date de cette réunion dans le champ 'date' au format JJ/MM/AAAA, \
l'heure de cette réunion dans le champ 'timestamp' au format hh:mm:ss.";

/// チャットメッセージ（OpenAI互換）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

/// メッセージ本文: 単一テキスト、または複数パート
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
}

/// 項目抽出用のメッセージ列を生成
///
/// # Arguments
/// * `text` - OCRで得た本文
pub fn build_field_messages(text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: "system".to_string(),
            content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
        },
        ChatMessage {
            role: "user".to_string(),
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: EXTRACTION_INSTRUCTIONS.to_string() },
                ContentPart::Text { text: text.to_string() },
            ]),
        },
    ]
}
