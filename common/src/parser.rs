//! LLMレスポンスパーサー
//!
//! チャットAPIの回答から会議情報のJSONを取り出し、
//! ExtractedRecord に正規化する

use crate::error::{Error, Result};
use crate::types::ExtractedRecord;
use chrono::{NaiveDate, NaiveTime};
use regex::{Captures, Regex};
use serde_json::{Map, Value};

/// 回答中に現れるフィールド名の別名 → 正規名
const FIELD_SYNONYMS: &[(&str, &str)] = &[
    ("heure", "timestamp"),
    ("time", "timestamp"),
    ("lieu", "place"),
    ("lieu_reunion", "place"),
    ("location", "place"),
];

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%Hh%M"];

/// フィールド名の別名を正規名に置き換える
///
/// `"heure"` → `"timestamp"`、`"lieu"` → `"place"` のように
/// 引用符で囲まれ `:` が続くキーだけを置換する（値は置換しない）
pub fn normalize_field_synonyms(answer: &str) -> String {
    lazy_static::lazy_static! {
        static ref SYNONYM_RE: Regex =
            Regex::new(r#""(heure|time|lieu_reunion|lieu|location)"(\s*:)"#).unwrap();
    }

    SYNONYM_RE
        .replace_all(answer, |caps: &Captures| match canonical_field_name(&caps[1]) {
            Some(name) => format!("\"{}\"{}", name, &caps[2]),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn canonical_field_name(alias: &str) -> Option<&'static str> {
    FIELD_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == alias)
        .map(|(_, name)| *name)
}

/// 回答から最初のJSONオブジェクトを切り出す
///
/// コードブロック等の装飾が付いていても、最初の `{` と
/// それに対応するトップレベルの `}` の間を返す。
/// 文字列リテラル中の括弧は数えない。
///
/// # Examples
/// ```
/// use pap_analysis_common::extract_json_object;
///
/// let answer = "```json\n{\"place\": \"Bordeaux\"}\n```";
/// assert_eq!(extract_json_object(answer).unwrap(), "{\"place\": \"Bordeaux\"}");
/// ```
pub fn extract_json_object(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| Error::Parse("no JSON object in answer".into()))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in response[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&response[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    Err(Error::Parse("unterminated JSON object in answer".into()))
}

/// LLMの回答を ExtractedRecord に変換
///
/// # Arguments
/// * `answer` - チャットAPIの回答本文
/// * `text` - 抽出元テキスト（そのまま `text` に入る）
///
/// # Returns
/// * `Ok(ExtractedRecord)` - date は `YYYY.MM.DD`、timestamp は `DD/MM/YYYY HH:MM:SS`
/// * `Err` - JSONが見つからない、または date/timestamp が読めない場合
pub fn parse_field_response(answer: &str, text: &str) -> Result<ExtractedRecord> {
    let normalized = normalize_field_synonyms(answer);
    let json_str = extract_json_object(&normalized)?;
    let fields: Map<String, Value> = serde_json::from_str(json_str)
        .map_err(|e| Error::Parse(format!("answer JSON: {}", e)))?;

    let date = parse_date(required_field(&fields, "date")?.trim())?;
    let time = parse_time(required_field(&fields, "timestamp")?.trim())?;

    let place = match fields.get("place") {
        Some(Value::Null) | None => guess_place(&fields)
            .ok_or_else(|| Error::Parse("answer has no place field".into()))?,
        Some(value) => value_to_string(value),
    };

    Ok(ExtractedRecord {
        date: date.format("%Y.%m.%d").to_string(),
        timestamp: format!("{} {}", date.format("%d/%m/%Y"), time.format("%H:%M:%S")),
        place,
        text: text.to_string(),
    })
}

fn required_field(fields: &Map<String, Value>, key: &str) -> Result<String> {
    match fields.get(key) {
        Some(Value::Null) | None => Err(Error::Parse(format!("answer has no {} field", key))),
        Some(value) => Ok(value_to_string(value)),
    }
}

/// `place` がない場合、残りのキーのうち最初のものを場所とみなす
///
/// NOTE: 推測による補完。抽出側が場所を返さなかったとき、
/// 無関係なフィールドを場所として採用してしまうことがある。
fn guess_place(fields: &Map<String, Value>) -> Option<String> {
    fields
        .iter()
        .find(|(key, value)| {
            !matches!(key.as_str(), "date" | "timestamp" | "text") && !value.is_null()
        })
        .map(|(_, value)| value_to_string(value))
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| Error::Parse(format!("unreadable date: {:?}", raw)))
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| Error::Parse(format!("unreadable time: {:?}", raw)))
}
