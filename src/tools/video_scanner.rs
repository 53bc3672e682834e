use crate::config::Config;
use crate::tools::validate_directory_exists;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// 掃描目錄中的影片檔案
///
/// `max_depth` 為 0 時只搜尋 `root` 本身。整理完成目錄不會被進入，
/// 以忽略前綴開頭的檔案會被跳過
pub fn list_video_files(root: &Path, max_depth: usize, config: &Config) -> Result<Vec<PathBuf>> {
    validate_directory_exists(root)?;

    let video_files = WalkDir::new(root)
        .follow_links(false)
        .max_depth(max_depth + 1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry, config))
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            !entry
                .file_name()
                .to_string_lossy()
                .starts_with(&config.ignored_file_prefix)
        })
        .filter(|entry| config.is_video_file(entry.path()))
        .map(DirEntry::into_path)
        .collect();

    Ok(video_files)
}

fn is_excluded_dir(entry: &DirEntry, config: &Config) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name() == config.completed_dir.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        root: PathBuf,
        config: Config,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        let config = Config::with_state_dir(&root).unwrap();

        fs::write(root.join("movie1.mp4"), "").unwrap();
        fs::write(root.join("movie2.MKV"), "").unwrap();
        fs::write(root.join("document.txt"), "").unwrap();
        fs::write(root.join("##hidden_file.mp4"), "").unwrap();
        fs::create_dir_all(root.join("subdir/deepdir")).unwrap();
        fs::write(root.join("subdir/movie3.avi"), "").unwrap();
        fs::write(root.join("subdir/deepdir/movie4.mov"), "").unwrap();
        fs::create_dir_all(root.join(&config.completed_dir).join("actress")).unwrap();
        fs::write(root.join(&config.completed_dir).join("ABC-123.mp4"), "").unwrap();

        Fixture {
            _temp_dir: temp_dir,
            root,
            config,
        }
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_depth_zero_only_root() {
        let f = fixture();
        let files = list_video_files(&f.root, 0, &f.config).unwrap();
        assert_eq!(names(&files), vec!["movie1.mp4", "movie2.MKV"]);
    }

    #[test]
    fn test_depth_limits_recursion() {
        let f = fixture();

        let files = list_video_files(&f.root, 1, &f.config).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.contains(&f.root.join("subdir/movie3.avi")));

        let files = list_video_files(&f.root, 2, &f.config).unwrap();
        assert_eq!(files.len(), 4);
        assert!(files.contains(&f.root.join("subdir/deepdir/movie4.mov")));
    }

    #[test]
    fn test_skips_completed_dir_and_ignored_prefix() {
        let f = fixture();
        let files = list_video_files(&f.root, 5, &f.config).unwrap();

        assert!(!names(&files).contains(&"##hidden_file.mp4".to_string()));
        assert!(!names(&files).contains(&"ABC-123.mp4".to_string()));
    }

    #[test]
    fn test_missing_root() {
        let f = fixture();
        assert!(list_video_files(&f.root.join("missing"), 0, &f.config).is_err());
    }
}
