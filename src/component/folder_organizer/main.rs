//! 演員資料夾整理元件
//!
//! 依演員別名表找出以別名命名的資料夾，改名為固定名稱；
//! 固定名稱資料夾已存在時改為合併

use super::folder_merger::FolderMerger;
use crate::config::Config;
use crate::tools::{ReverseAliasIndex, display_relative, validate_directory_exists};
use anyhow::{Context, Result};
use console::style;
use log::{error, info, warn};
use rust_i18n::t;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

/// 待改名的資料夾
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRename {
    pub source: PathBuf,
    pub canonical: String,
}

impl PendingRename {
    #[must_use]
    pub fn target(&self) -> PathBuf {
        self.source.with_file_name(&self.canonical)
    }
}

/// 整理結果
#[derive(Debug, Default)]
pub struct OrganizeResult {
    /// 掃描到的待處理資料夾數
    pub pending: usize,
    /// 直接改名的數量
    pub renamed: usize,
    /// 併入既有資料夾的數量
    pub merged: usize,
    /// 處理失敗的資料夾
    pub failed: Vec<PathBuf>,
    pub interrupted: bool,
}

pub struct FolderOrganizer {
    config: Config,
    aliases: ReverseAliasIndex,
    shutdown_signal: Arc<AtomicBool>,
}

impl FolderOrganizer {
    #[must_use]
    pub const fn new(
        config: Config,
        aliases: ReverseAliasIndex,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            aliases,
            shutdown_signal,
        }
    }

    pub fn organize(&self, root: &Path) -> Result<OrganizeResult> {
        validate_directory_exists(root)?;

        let pending = self.collect_pending(root);
        let mut result = OrganizeResult {
            pending: pending.len(),
            ..OrganizeResult::default()
        };

        if pending.is_empty() {
            info!("{}", t!("organizer.nothing_to_do"));
            return Ok(result);
        }

        info!("{}", t!("organizer.found", count = pending.len()));
        for (index, item) in pending.iter().enumerate() {
            println!("    {}.{}", index + 1, display_relative(&item.source, root));
        }

        let merger = FolderMerger::new(&self.config);

        for (index, item) in pending.iter().enumerate() {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("{}", t!("organizer.interrupted"));
                result.interrupted = true;
                break;
            }

            println!();
            info!(
                "[{}/{}] {}",
                index + 1,
                pending.len(),
                t!("organizer.processing", folder = item.source.display())
            );

            match self.apply(item, &merger) {
                Ok(true) => result.merged += 1,
                Ok(false) => result.renamed += 1,
                Err(e) => {
                    error!(
                        "{}",
                        t!(
                            "organizer.failed",
                            folder = item.source.display(),
                            error = format!("{e:#}")
                        )
                    );
                    result.failed.push(item.source.clone());
                }
            }
        }

        print_result(&result, root);
        Ok(result)
    }

    /// 掃描別名資料夾，已排入的資料夾不再往下掃描
    #[must_use]
    pub fn collect_pending(&self, root: &Path) -> Vec<PendingRename> {
        let mut pending = Vec::new();
        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("{e}");
                    continue;
                }
            };
            // 指向資料夾的符號連結也要改名，但不會往下掃描
            if !entry.path().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if let Some(canonical) = self.aliases.canonical(&name)
                && canonical != name
            {
                pending.push(PendingRename {
                    source: entry.path().to_path_buf(),
                    canonical: canonical.to_string(),
                });
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
            }
        }

        pending
    }

    /// 回傳是否以合併方式處理
    fn apply(&self, item: &PendingRename, merger: &FolderMerger) -> Result<bool> {
        let target = item.target();

        if !target.exists() {
            fs::rename(&item.source, &target).with_context(|| {
                format!("無法重新命名: {} -> {}", item.source.display(), target.display())
            })?;
            info!("{}", t!("organizer.renamed", folder = target.display()));
            return Ok(false);
        }

        info!("{}", t!("organizer.merging", folder = target.display()));
        let stats = merger.merge_folders(&item.source, &target)?;
        info!(
            "{}",
            t!(
                "organizer.merged",
                folder = target.display(),
                moved = stats.moved,
                replaced = stats.replaced,
                discarded = stats.discarded
            )
        );
        Ok(true)
    }
}

fn print_result(result: &OrganizeResult, root: &Path) {
    println!();
    println!("{}", style(t!("organizer.result_title")).cyan().bold());
    println!(
        "  {}",
        style(t!("organizer.result_renamed", count = result.renamed)).green()
    );
    println!(
        "  {}",
        style(t!("organizer.result_merged", count = result.merged)).green()
    );
    if !result.failed.is_empty() {
        println!(
            "  {}",
            style(t!("organizer.result_errors", count = result.failed.len())).red()
        );
        for folder in &result.failed {
            println!("    {} {}", style("✗").red(), display_relative(folder, root));
        }
    }

    info!(
        "Folder organize finished - pending: {}, renamed: {}, merged: {}, errors: {}",
        result.pending,
        result.renamed,
        result.merged,
        result.failed.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::AliasTable;
    use tempfile::TempDir;

    fn organizer(root: &Path, table: &AliasTable) -> FolderOrganizer {
        let config = Config::with_state_dir(root).unwrap();
        let aliases = ReverseAliasIndex::build(table).unwrap();
        FolderOrganizer::new(config, aliases, Arc::new(AtomicBool::new(false)))
    }

    fn table() -> AliasTable {
        AliasTable::from([("Actress A", &["Alias A1", "Alias A2"][..])])
    }

    #[test]
    fn test_collect_does_not_descend_into_alias_folders() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Alias A1/Alias A2")).unwrap();
        fs::create_dir_all(root.join("nested/Alias A2")).unwrap();
        fs::create_dir_all(root.join("Actress A")).unwrap();

        let pending = organizer(root, &table()).collect_pending(root);

        assert_eq!(
            pending,
            vec![
                PendingRename {
                    source: root.join("Alias A1"),
                    canonical: "Actress A".to_string(),
                },
                PendingRename {
                    source: root.join("nested/Alias A2"),
                    canonical: "Actress A".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_rename_when_target_missing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Alias A1/[ABC-123](2023)")).unwrap();

        let result = organizer(root, &table()).organize(root).unwrap();

        assert_eq!(result.pending, 1);
        assert_eq!(result.renamed, 1);
        assert!(root.join("Actress A/[ABC-123](2023)").is_dir());
        assert!(!root.join("Alias A1").exists());
    }

    #[test]
    fn test_organize_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Alias A1/[ABC-123](2023)")).unwrap();
        fs::create_dir_all(root.join("Actress A/[XYZ-001](2020)")).unwrap();

        let organizer = organizer(root, &table());
        let first = organizer.organize(root).unwrap();
        let second = organizer.organize(root).unwrap();

        assert_eq!(first.merged, 1);
        assert_eq!(second.pending, 0);
        assert!(root.join("Actress A/[ABC-123](2023)").is_dir());
        assert!(root.join("Actress A/[XYZ-001](2020)").is_dir());
    }

    #[test]
    fn test_failed_folder_does_not_stop_others() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("library");
        let table = AliasTable::from([
            ("Actress A", &["Alias A1"][..]),
            ("Actress B", &["Alias B1"][..]),
        ]);

        // 固定名稱是一般檔案，合併時無法移入子資料夾
        fs::create_dir_all(root.join("Alias A1/sub")).unwrap();
        fs::write(root.join("Actress A"), "not a folder").unwrap();
        fs::create_dir_all(root.join("Alias B1/x")).unwrap();

        let result = organizer(temp_dir.path(), &table).organize(&root).unwrap();

        assert_eq!(result.pending, 2);
        assert_eq!(result.renamed, 1);
        assert_eq!(result.merged, 0);
        assert_eq!(result.failed, vec![root.join("Alias A1")]);
        assert!(root.join("Actress B/x").is_dir());
        assert!(root.join("Alias A1/sub").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_alias_folder_is_renamed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("library");
        fs::create_dir_all(root.join("real/[ABC-123](2023)")).unwrap();
        fs::create_dir_all(root.join("zz/Alias A2")).unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("Alias A1")).unwrap();

        let organizer = organizer(temp_dir.path(), &table());
        assert_eq!(
            organizer.collect_pending(&root),
            vec![
                PendingRename {
                    source: root.join("Alias A1"),
                    canonical: "Actress A".to_string(),
                },
                PendingRename {
                    source: root.join("zz/Alias A2"),
                    canonical: "Actress A".to_string(),
                },
            ]
        );

        let result = organizer.organize(&root).unwrap();
        assert_eq!(result.renamed, 2);
        assert!(root.join("Actress A/[ABC-123](2023)").is_dir());
        assert!(root.join("zz/Actress A").is_dir());
        assert!(!root.join("Alias A1").exists());
    }

    #[test]
    fn test_interrupted_before_apply() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Alias A1")).unwrap();

        let config = Config::with_state_dir(root).unwrap();
        let aliases = ReverseAliasIndex::build(&table()).unwrap();
        let organizer = FolderOrganizer::new(config, aliases, Arc::new(AtomicBool::new(true)));

        let result = organizer.organize(root).unwrap();
        assert!(result.interrupted);
        assert!(root.join("Alias A1").exists());
    }
}
