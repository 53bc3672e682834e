use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// 移動檔案或資料夾
///
/// 檔案在 rename 失敗時（例如跨檔案系統）改用複製後刪除
pub fn move_path(source: &Path, target: &Path) -> Result<()> {
    match fs::rename(source, target) {
        Ok(()) => {
            debug!("移動: {} -> {}", source.display(), target.display());
            Ok(())
        }
        Err(e) if source.is_file() => {
            debug!("rename 失敗，改用複製: {e}");
            copy_and_delete(source, target)
        }
        Err(e) => Err(e).with_context(|| {
            format!("移動失敗: {} -> {}", source.display(), target.display())
        }),
    }
}

/// 複製檔案後刪除原檔案
fn copy_and_delete(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target).with_context(|| {
        format!("複製檔案失敗: {} -> {}", source.display(), target.display())
    })?;

    fs::remove_file(source).with_context(|| format!("刪除原檔案失敗: {}", source.display()))?;

    Ok(())
}
