use crate::error::{PapError, Result};
use pap_analysis_common::DEFAULT_PREFIX_WIDTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// 設定ファイル（~/.config/pap-analysis/config.json）の内容
///
/// すべて省略可能。環境変数が設定ファイルより優先される。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFile {
    pub debug: Option<bool>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub new_path: Option<PathBuf>,
    pub api_base: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub name_prefix_width: Option<usize>,
    pub ocr_language: Option<String>,
    pub ocr_resolution: Option<u32>,
    pub pdftoppm_command: Option<String>,
    pub tesseract_command: Option<String>,
}

impl ConfigFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PapError::Config(format!("{} を読み込めません: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| PapError::Config(format!("{} が不正です: {}", path.display(), e)))
    }
}

/// 起動時に一度だけ確定する設定（以後は読み取り専用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub debug: bool,
    pub api_key: String,
    pub model: String,
    /// 移動先のルート（`<new_path>/<year>/<month>/`）
    pub new_path: PathBuf,
    pub api_base: String,
    pub timeout_seconds: u64,
    pub name_prefix_width: usize,
    pub ocr_language: Option<String>,
    pub ocr_resolution: u32,
    pub pdftoppm_command: String,
    pub tesseract_command: String,
}

impl Config {
    /// 設定ファイルと環境変数から設定を確定する
    ///
    /// `explicit_path` が指定された場合はそのファイルが必須。
    /// 指定がなければ既定パスのファイルを（存在すれば）読む。
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let file = match explicit_path {
            Some(path) => ConfigFile::from_path(path)?,
            None => {
                let path = Self::config_path()?;
                if path.exists() {
                    ConfigFile::from_path(&path)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PapError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("pap-analysis").join("config.json"))
    }

    /// 設定ファイルの値に環境変数を重ねて検証する
    pub fn resolve<F>(file: ConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 空文字の環境変数は未設定扱い
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let debug = match env("DEBUG") {
            Some(value) => parse_bool(&value)
                .ok_or_else(|| PapError::Config(format!("DEBUG の値が不正です: {:?}", value)))?,
            None => file.debug.unwrap_or(false),
        };

        let api_key = env("OPENAI_API_KEY")
            .or(file.api_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or(PapError::MissingApiKey)?;

        let new_path = env("NEW_PATH")
            .map(PathBuf::from)
            .or(file.new_path)
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(PapError::MissingNewPath)?;

        let timeout_seconds = file.timeout_seconds.unwrap_or(120);
        if timeout_seconds == 0 {
            return Err(PapError::Config("timeout_seconds は1以上にしてください".into()));
        }

        Ok(Self {
            debug,
            api_key,
            model: env("MODEL").or(file.model).unwrap_or_else(|| DEFAULT_MODEL.into()),
            new_path,
            api_base: env("OPENAI_API_BASE")
                .or(file.api_base)
                .unwrap_or_else(|| DEFAULT_API_BASE.into()),
            timeout_seconds,
            name_prefix_width: file.name_prefix_width.unwrap_or(DEFAULT_PREFIX_WIDTH),
            ocr_language: file.ocr_language,
            ocr_resolution: file.ocr_resolution.unwrap_or(300),
            pdftoppm_command: file.pdftoppm_command.unwrap_or_else(|| "pdftoppm".into()),
            tesseract_command: file.tesseract_command.unwrap_or_else(|| "tesseract".into()),
        })
    }

    /// 表示用にAPIキーを伏せる
    pub fn masked_api_key(&self) -> String {
        let visible: String = self.api_key.chars().take(4).collect();
        format!("{}…", visible)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
