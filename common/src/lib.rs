//! PAP Analysis Common Library
//!
//! ネイティブメッセージングホストで使う型と純粋ロジック（I/Oなし）

pub mod types;
pub mod error;
pub mod protocol;
pub mod parser;
pub mod naming;
pub mod prompts;

pub use types::{Request, ExtractedRecord, ExtractTextResponse};
pub use error::{Error, Result};
pub use protocol::{encode_message, decode_message, read_frame_length, MAX_MESSAGE_SIZE};
pub use parser::{extract_json_object, normalize_field_synonyms, parse_field_response};
pub use naming::{basename, has_pdf_extension, display_name, date_token, RenameTarget, DEFAULT_PREFIX_WIDTH};
pub use prompts::{build_field_messages, ChatMessage};
