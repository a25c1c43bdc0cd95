//! 長さ付きメッセージの送受信
//!
//! 入力ストリームから1フレームずつ読み、出力ストリームへ1フレームずつ書く。
//! 書き込みはヘッダと本文を1つのバッファにまとめてから flush する。

use crate::error::{PapError, Result};
use pap_analysis_common::protocol::HEADER_LEN;
use pap_analysis_common::{decode_message, encode_message, read_frame_length};
use serde::Serialize;
use serde_json::Value;
use std::io::{ErrorKind, Read, Write};
use tracing::debug;

pub struct FramedChannel<R, W> {
    reader: R,
    writer: W,
}

impl<R: Read, W: Write> FramedChannel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// 次のメッセージを読む
    ///
    /// # Returns
    /// * `Ok(Some(value))` - 1メッセージ
    /// * `Ok(None)` - フレーム境界でストリームが閉じた
    /// * `Err(PapError::Protocol)` - ヘッダ・本文の途中で閉じた、または本文がUTF-8 JSONでない
    pub fn read_message(&mut self) -> Result<Option<Value>> {
        let mut header = [0u8; HEADER_LEN];
        let mut filled = 0;

        while filled < HEADER_LEN {
            match self.reader.read(&mut header[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(PapError::Protocol(format!(
                        "stream closed inside header ({} of {} bytes)",
                        filled, HEADER_LEN
                    )))
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(PapError::Protocol(format!("header read failed: {}", e))),
            }
        }

        let len = read_frame_length(header).map_err(|e| PapError::Protocol(e.to_string()))?;
        debug!("message_length = {}", len);

        let mut body = vec![0u8; len];
        self.reader.read_exact(&mut body).map_err(|e| {
            PapError::Protocol(format!("stream closed inside body of {} bytes: {}", len, e))
        })?;

        let message: Value =
            decode_message(&body).map_err(|e| PapError::Protocol(e.to_string()))?;
        debug!("message = {}", message);
        Ok(Some(message))
    }

    /// メッセージを1フレームとして書き、flushする
    pub fn write_message<T: Serialize>(&mut self, message: &T) -> Result<()> {
        let frame = encode_message(message)?;
        self.writer
            .write_all(&frame)
            .and_then(|_| self.writer.flush())
            .map_err(|e| PapError::Protocol(format!("write failed: {}", e)))?;
        debug!("sent {} bytes", frame.len());
        Ok(())
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pap_analysis_common::ExtractTextResponse;
    use serde_json::json;
    use std::io::Cursor;

    fn frame(value: &Value) -> Vec<u8> {
        encode_message(value).unwrap()
    }

    fn reader_of(bytes: Vec<u8>) -> FramedChannel<Cursor<Vec<u8>>, Vec<u8>> {
        FramedChannel::new(Cursor::new(bytes), Vec::new())
    }

    #[test]
    fn test_round_trip() {
        let messages = vec![
            json!({"action": "extract-text", "path": "/tmp/2024 03 05 - PAP Acme.pdf"}),
            json!({"action": "rename", "path": "/tmp/old.pdf", "name": "2024.03.05-14.30 Acme.pdf"}),
            json!({"name": "Société", "text": "ligne 1\nligne 2", "nested": {"n": [1, 2, 3]}}),
        ];

        let mut writer = FramedChannel::new(std::io::empty(), Vec::new());
        for message in &messages {
            writer.write_message(message).unwrap();
        }
        let (_, bytes) = writer.into_inner();

        let mut reader = reader_of(bytes);
        for message in &messages {
            assert_eq!(reader.read_message().unwrap().as_ref(), Some(message));
        }
        assert!(reader.read_message().unwrap().is_none());
    }

    #[test]
    fn test_write_response_frame() {
        let response = ExtractTextResponse {
            name: "Acme".into(),
            date: "2024.03.05-14.30".into(),
            timestamp: "05/03/2024 14:30:00".into(),
            place: "Bordeaux".into(),
            text: "t".into(),
        };
        let mut channel = FramedChannel::new(std::io::empty(), Vec::new());
        channel.write_message(&response).unwrap();
        let (_, bytes) = channel.into_inner();

        let len = u32::from_le_bytes(bytes[..4].try_into().unwrap()) as usize;
        assert_eq!(len, bytes.len() - 4);
        let decoded: ExtractTextResponse = serde_json::from_slice(&bytes[4..]).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn test_empty_stream_is_clean_close() {
        let mut channel = reader_of(Vec::new());
        assert!(channel.read_message().unwrap().is_none());
    }

    #[test]
    fn test_truncated_stream_is_protocol_error() {
        let full = frame(&json!({"action": "extract-text", "path": "/tmp/a.pdf"}));

        // ヘッダ途中〜本文途中のすべての切断位置
        for cut in 1..full.len() {
            let mut channel = reader_of(full[..cut].to_vec());
            let result = channel.read_message();
            assert!(
                matches!(result, Err(PapError::Protocol(_))),
                "cut at {} returned {:?}",
                cut,
                result
            );
        }
    }

    #[test]
    fn test_invalid_body_is_protocol_error() {
        let mut bytes = 3u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{x}");
        let mut channel = reader_of(bytes);
        assert!(matches!(channel.read_message(), Err(PapError::Protocol(_))));

        let mut bytes = 2u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xc3, 0x28]);
        let mut channel = reader_of(bytes);
        assert!(matches!(channel.read_message(), Err(PapError::Protocol(_))));
    }

    #[test]
    fn test_oversized_frame_is_rejected() {
        let bytes = u32::MAX.to_le_bytes().to_vec();
        let mut channel = reader_of(bytes);
        assert!(matches!(channel.read_message(), Err(PapError::Protocol(_))));
    }

    /// 1バイトずつしか返さないリーダでも1メッセージとして読める
    #[test]
    fn test_short_reads() {
        struct OneByte(Cursor<Vec<u8>>);
        impl Read for OneByte {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                let len = buf.len().min(1);
                self.0.read(&mut buf[..len])
            }
        }

        let message = json!({"action": "extract-text", "path": "/tmp/a.pdf"});
        let mut channel = FramedChannel::new(OneByte(Cursor::new(frame(&message))), Vec::new());
        assert_eq!(channel.read_message().unwrap(), Some(message));
        assert!(channel.read_message().unwrap().is_none());
    }

    #[test]
    fn test_write_failure_is_protocol_error() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(ErrorKind::BrokenPipe, "host gone"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut channel = FramedChannel::new(std::io::empty(), Closed);
        let result = channel.write_message(&json!({"name": "x"}));
        assert!(matches!(result, Err(PapError::Protocol(_))));
    }
}
