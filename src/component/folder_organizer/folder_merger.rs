//! 資料夾合併
//!
//! 別名資料夾與固定名稱資料夾同時存在時，把別名資料夾的內容併入固定名稱資料夾。
//! 同名影片以檔案大小決定去留，其餘同名檔案一律保留目標的版本

use crate::config::Config;
use crate::tools::move_path;
use anyhow::{Context, Result};
use log::{error, info};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 合併統計
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    /// 直接移入目標的檔案或子資料夾
    pub moved: usize,
    /// 來源影片較大而取代目標的數量
    pub replaced: usize,
    /// 因目標已有同名檔案而捨棄或略過的來源檔案
    pub discarded: usize,
}

impl MergeStats {
    fn add(&mut self, other: Self) {
        self.moved += other.moved;
        self.replaced += other.replaced;
        self.discarded += other.discarded;
    }
}

pub struct FolderMerger<'a> {
    config: &'a Config,
}

impl<'a> FolderMerger<'a> {
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// 將 `source` 的內容併入 `target`，完成後嘗試刪除 `source`
    ///
    /// 同名子資料夾視為同一部影片，改用 [`Self::merge_movie_folders`]；
    /// 同名檔案保留目標的版本，來源檔案留在原處
    pub fn merge_folders(&self, source: &Path, target: &Path) -> Result<MergeStats> {
        let mut stats = MergeStats::default();

        for entry in sorted_entries(source)? {
            let name = entry.file_name().unwrap_or_default();
            let target_entry = target.join(name);

            if entry.is_dir() {
                if target_entry.is_dir() {
                    info!("比較資料夾: {}", name.to_string_lossy());
                    stats.add(self.merge_movie_folders(&entry, &target_entry)?);
                } else {
                    move_path(&entry, &target_entry)?;
                    info!("已移動子資料夾: {}", name.to_string_lossy());
                    stats.moved += 1;
                }
            } else if target_entry.exists() {
                stats.discarded += 1;
            } else {
                move_path(&entry, &target_entry)?;
                info!("已移動檔案: {}", name.to_string_lossy());
                stats.moved += 1;
            }
        }

        remove_source_dir(source);
        Ok(stats)
    }

    /// 合併兩個影片資料夾
    ///
    /// 影片以小寫檔名配對，來源嚴格較大時取代目標，否則刪除來源；
    /// 非影片檔案在目標已有同名檔案時刪除來源
    pub fn merge_movie_folders(&self, source: &Path, target: &Path) -> Result<MergeStats> {
        let mut stats = MergeStats::default();
        let source_entries = sorted_entries(source)?;
        let target_videos = self.index_videos(&sorted_entries(target)?);

        for source_video in source_entries
            .iter()
            .filter(|path| path.is_file() && self.config.is_video_file(path))
        {
            let name = source_video.file_name().unwrap_or_default();
            let key = name.to_string_lossy().to_lowercase();

            let Some(target_video) = target_videos.get(&key) else {
                move_path(source_video, &target.join(name))?;
                info!("已移動影片: {}", name.to_string_lossy());
                stats.moved += 1;
                continue;
            };

            if file_size(source_video)? > file_size(target_video)? {
                fs::remove_file(target_video)
                    .with_context(|| format!("無法刪除檔案: {}", target_video.display()))?;
                move_path(source_video, &target.join(name))?;
                info!("保留來源影片並刪除目標同名檔案: {}", name.to_string_lossy());
                stats.replaced += 1;
            } else {
                fs::remove_file(source_video)
                    .with_context(|| format!("無法刪除檔案: {}", source_video.display()))?;
                info!("保留目標影片並刪除來源同名檔案: {}", target_video.display());
                stats.discarded += 1;
            }
        }

        for other in source_entries
            .iter()
            .filter(|path| path.is_file() && !self.config.is_video_file(path))
        {
            let target_entry = target.join(other.file_name().unwrap_or_default());

            if target_entry.exists() {
                fs::remove_file(other)
                    .with_context(|| format!("無法刪除檔案: {}", other.display()))?;
                stats.discarded += 1;
            } else {
                move_path(other, &target_entry)?;
                stats.moved += 1;
            }
        }

        remove_source_dir(source);
        Ok(stats)
    }

    fn index_videos(&self, entries: &[PathBuf]) -> HashMap<String, PathBuf> {
        entries
            .iter()
            .filter(|path| path.is_file() && self.config.is_video_file(path))
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy().to_lowercase();
                Some((name, path.clone()))
            })
            .collect()
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("無法讀取資料夾: {}", dir.display()))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("無法讀取資料夾: {}", dir.display()))?;
    entries.sort();
    Ok(entries)
}

fn file_size(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path)
        .with_context(|| format!("無法讀取檔案資訊: {}", path.display()))?
        .len())
}

/// 刪除已清空的來源資料夾，仍有內容時只記錄錯誤
fn remove_source_dir(source: &Path) {
    match fs::remove_dir(source) {
        Ok(()) => info!("已刪除來源資料夾: {}", source.display()),
        Err(e) => error!("無法刪除來源資料夾 {}: {e}", source.display()),
    }
}
