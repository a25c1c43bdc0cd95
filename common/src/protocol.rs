//! ネイティブメッセージングのフレーム形式
//!
//! 1フレーム = 4バイトのリトルエンディアン長 `L` + `L` バイトのUTF-8 JSON

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// ヘッダ長
pub const HEADER_LEN: usize = 4;

/// 受け付ける本文の最大サイズ
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024; // 64MB

/// メッセージをフレームにエンコード（ヘッダ + 本文を1つのバッファに）
pub fn encode_message<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(msg)?;
    let len = u32::try_from(payload.len())
        .map_err(|_| Error::Protocol(format!("message too large: {} bytes", payload.len())))?;

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// ヘッダから本文長を取り出す
pub fn read_frame_length(header: [u8; HEADER_LEN]) -> Result<usize> {
    let len = u32::from_le_bytes(header) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(Error::Protocol(format!(
            "message too large: {} bytes (max {})",
            len, MAX_MESSAGE_SIZE
        )));
    }
    Ok(len)
}

/// 本文（ヘッダ除く）をデコード
pub fn decode_message<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    let text = std::str::from_utf8(data)
        .map_err(|e| Error::Protocol(format!("body is not UTF-8: {}", e)))?;
    serde_json::from_str(text).map_err(|e| Error::Protocol(format!("body is not JSON: {}", e)))
}
