//! ファイル名の正規化
//!
//! - 表示名: 先頭の日付スタンプ・`-`・`PAP` を取り除いた名前
//! - 日時トークン: `YYYY.MM.DD-HH.MM`（ファイル名に使える形）
//! - 移動先: `<root>/<year>/<month>/<name>`

use crate::error::{Error, Result};
use crate::types::ExtractedRecord;
use std::path::{Path, PathBuf};

/// ファイル名先頭の日付スタンプ幅（例: "2024 03 05 "）
pub const DEFAULT_PREFIX_WIDTH: usize = 11;

const PDF_EXTENSION: &str = ".pdf";
const PAP_TOKEN: &str = "PAP";

/// パスの末尾要素（ファイル名）
pub fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("")
}

/// `.pdf` で終わるか（大文字小文字を区別しない）
pub fn has_pdf_extension(name: &str) -> bool {
    name.len() >= PDF_EXTENSION.len()
        && name.is_char_boundary(name.len() - PDF_EXTENSION.len())
        && name[name.len() - PDF_EXTENSION.len()..].eq_ignore_ascii_case(PDF_EXTENSION)
}

/// 表示名を求める
///
/// 拡張子を除いた名前から先頭 `prefix_width` 文字を捨ててトリムし、
/// 続く `-`、`PAP` をそれぞれ取り除く。
///
/// # Examples
/// ```
/// use pap_analysis_common::display_name;
///
/// assert_eq!(display_name("2024 03 05 - PAP Acme Corp.pdf", 11), "Acme Corp");
/// ```
pub fn display_name(basename: &str, prefix_width: usize) -> String {
    let stem = if has_pdf_extension(basename) {
        &basename[..basename.len() - PDF_EXTENSION.len()]
    } else {
        basename
    };

    let rest: String = stem.chars().skip(prefix_width).collect();
    let mut name = rest.trim();

    if let Some(stripped) = name.strip_prefix('-') {
        name = stripped.trim();
    }
    if let Some(stripped) = name.strip_prefix(PAP_TOKEN) {
        name = stripped.trim();
    }

    name.to_string()
}

/// 日時トークン `<record.date>-<HH>.<MM>` を求める
///
/// `record.timestamp` は `DD/MM/YYYY HH:MM:SS`
pub fn date_token(record: &ExtractedRecord) -> Result<String> {
    let time = record
        .timestamp
        .split(' ')
        .nth(1)
        .ok_or_else(|| Error::Parse(format!("timestamp without time: {:?}", record.timestamp)))?;

    let mut parts = time.split(':');
    match (parts.next(), parts.next()) {
        (Some(hour), Some(minute)) => Ok(format!("{}-{}.{}", record.date, hour, minute)),
        _ => Err(Error::Parse(format!("time without minutes: {:?}", time))),
    }
}

/// `rename` 要求の移動先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTarget {
    pub year: String,
    pub month: String,
    pub file_name: String,
}

impl RenameTarget {
    /// `<year>.<month>.<rest>` 形式の名前から移動先を組み立てる
    ///
    /// 名前に `.pdf` がなければ元ファイルの拡張子を付け足す。
    pub fn parse(name: &str, source_basename: &str) -> Result<Self> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(Error::Parse(format!("not a file name: {:?}", name)));
        }

        let mut segments = name.splitn(3, '.');
        let (year, month) = match (segments.next(), segments.next(), segments.next()) {
            (Some(year), Some(month), Some(_)) if !year.is_empty() && !month.is_empty() => {
                (year, month)
            }
            _ => {
                return Err(Error::Parse(format!(
                    "name is not <year>.<month>.<rest>: {:?}",
                    name
                )))
            }
        };

        let file_name = if has_pdf_extension(name) || !has_pdf_extension(source_basename) {
            name.to_string()
        } else {
            let extension = &source_basename[source_basename.len() - PDF_EXTENSION.len()..];
            format!("{}{}", name, extension)
        };

        Ok(Self {
            year: year.to_string(),
            month: month.to_string(),
            file_name,
        })
    }

    /// `<root>/<year>/<month>/<file_name>`
    pub fn destination(&self, root: &Path) -> PathBuf {
        root.join(&self.year).join(&self.month).join(&self.file_name)
    }
}
