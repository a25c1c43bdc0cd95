//! 解析済みPDFの移動
//!
//! 移動先の親ディレクトリは既存でもエラーにしない。

use crate::error::{PapError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// 移動先の親ディレクトリを（なければ）作る
pub fn ensure_parent_dir(destination: &Path) -> Result<()> {
    let Some(parent) = destination.parent() else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(parent).map_err(|e| {
        PapError::Filesystem(format!("{} を作成できません: {}", parent.display(), e))
    })?;
    debug!("{} created", parent.display());
    Ok(())
}

/// ファイルを移動する（rename できなければ copy + remove）
pub fn move_file(source: &Path, destination: &Path) -> Result<()> {
    let rename_error = match fs::rename(source, destination) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    // 別ファイルシステム間など
    if !source.is_file() {
        return Err(PapError::Filesystem(format!(
            "{} を {} に移動できません: {}",
            source.display(),
            destination.display(),
            rename_error
        )));
    }

    fs::copy(source, destination)
        .and_then(|_| fs::remove_file(source))
        .map_err(|e| {
            PapError::Filesystem(format!(
                "{} を {} に移動できません: {} / {}",
                source.display(),
                destination.display(),
                rename_error,
                e
            ))
        })
}

/// 親ディレクトリを用意してから移動する
///
/// ディレクトリ作成の失敗はログに残して移動を試みる。
pub fn relocate(source: &Path, destination: &Path) -> Result<()> {
    if let Err(e) = ensure_parent_dir(destination) {
        warn!("{}", e);
    }

    move_file(source, destination)?;
    debug!("{} renamed to {}", source.display(), destination.display());
    Ok(())
}
