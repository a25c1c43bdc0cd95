//! Tesseract OCR連携
//!
//! PDFを `pdftoppm` でページごとのPNGにし、`tesseract` で文字認識する。
//! 中間画像は一時ディレクトリに置き、処理後に削除される。

use super::TextExtractor;
use crate::config::Config;
use crate::error::{PapError, Result};
use pap_analysis_common::{basename, has_pdf_extension};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};
use walkdir::WalkDir;

const PAGE_PREFIX: &str = "page";

pub struct TesseractOcr {
    pdftoppm: String,
    tesseract: String,
    language: Option<String>,
    resolution: u32,
}

impl TesseractOcr {
    pub fn new(pdftoppm: impl Into<String>, tesseract: impl Into<String>) -> Self {
        Self {
            pdftoppm: pdftoppm.into(),
            tesseract: tesseract.into(),
            language: None,
            resolution: 300,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            pdftoppm: config.pdftoppm_command.clone(),
            tesseract: config.tesseract_command.clone(),
            language: config.ocr_language.clone(),
            resolution: config.ocr_resolution,
        }
    }

    /// 全ページをOCRしてページ順に連結する
    pub fn ocr_pdf(&self, pdf_path: &Path) -> Result<String> {
        let work_dir = tempfile::Builder::new().prefix("pap-analysis-").tempdir()?;

        let pages = self.render_pages(pdf_path, work_dir.path())?;
        if pages.is_empty() {
            return Err(PapError::Extraction(format!(
                "ページ画像が生成されませんでした: {}",
                pdf_path.display()
            )));
        }
        debug!("images: {:?}", pages);

        let mut text = String::new();
        for page in &pages {
            text.push_str(&self.ocr_image(page)?);
        }
        Ok(text)
    }

    /// PDFをページごとのPNGに変換し、ページ順のパスを返す
    fn render_pages(&self, pdf_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut command = Command::new(&self.pdftoppm);
        command
            .arg("-png")
            .arg("-r")
            .arg(self.resolution.to_string())
            .arg(pdf_path)
            .arg(out_dir.join(PAGE_PREFIX));
        run_tool(&mut command, &self.pdftoppm)?;

        let mut pages: Vec<(u32, PathBuf)> = WalkDir::new(out_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.extension().map(|ext| ext == "png").unwrap_or(false))
            .filter_map(|p| page_number(&p).map(|n| (n, p)))
            .collect();

        pages.sort_by_key(|(n, _)| *n);
        Ok(pages.into_iter().map(|(_, p)| p).collect())
    }

    fn ocr_image(&self, image_path: &Path) -> Result<String> {
        let mut command = Command::new(&self.tesseract);
        command.arg(image_path).arg("stdout");
        if let Some(language) = &self.language {
            command.arg("-l").arg(language);
        }

        let stdout = run_tool(&mut command, &self.tesseract)?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

impl TextExtractor for TesseractOcr {
    fn extract_text(&self, path: &Path) -> Option<String> {
        let name = path.to_str().map(basename).unwrap_or("");
        if !has_pdf_extension(name) {
            debug!("{} is not a PDF, no text", path.display());
            return None;
        }

        match self.ocr_pdf(path) {
            Ok(text) => {
                debug!("text: {}", text);
                Some(text)
            }
            Err(e) => {
                warn!("OCR failed for {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// `page-07.png` → 7
pub fn page_number(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.strip_prefix(PAGE_PREFIX)?.trim_start_matches('-');
    digits.parse().ok()
}

fn run_tool(command: &mut Command, tool: &str) -> Result<Vec<u8>> {
    let output = command
        .output()
        .map_err(|e| PapError::Extraction(format!("{} を実行できません: {}", tool, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PapError::Extraction(format!(
            "{} failed (code {:?}): {}",
            tool,
            output.status.code(),
            stderr.trim()
        )));
    }

    Ok(output.stdout)
}
