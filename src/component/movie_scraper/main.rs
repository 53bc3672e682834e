//! 影片刮削元件
//!
//! 依序處理關鍵字或影片檔案：解析編號、搜尋、取得詳情、下載封面與劇照、
//! 產生 NFO，目錄模式下再把影片移入整理完成的目錄

use super::movie_info::MovieRecord;
use super::movie_parser::{parse_movie_details, parse_search_results};
use super::nfo_generator::NfoGenerator;
use crate::config::Config;
use crate::tools::{
    Fetch, IdentifierResolver, ReverseAliasIndex, display_relative, ensure_directory_exists,
    move_path,
};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use reqwest::Url;
use rust_i18n::t;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const DEFAULT_IMAGE_EXTENSION: &str = ".jpg";
const DEFAULT_VIDEO_EXTENSION: &str = ".mp4";

/// 批次處理結果
#[derive(Debug, Default)]
pub struct BatchReport {
    pub total: usize,
    /// 成功整理的影片目錄
    pub organized: Vec<PathBuf>,
    /// 失敗的關鍵字或檔案（相對路徑）
    pub failed: Vec<String>,
    /// 已有較大版本而被加上忽略前綴的檔案
    pub ignored: Vec<String>,
    pub interrupted: bool,
}

impl BatchReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.organized.len()
    }
}

enum Outcome {
    Organized(PathBuf),
    Ignored(PathBuf),
    Failed,
}

struct BatchItem<'a> {
    label: String,
    keyword: String,
    source: Option<&'a Path>,
}

/// 影片刮削元件
pub struct MovieScraper<F: Fetch> {
    config: Config,
    fetcher: F,
    resolver: IdentifierResolver,
    aliases: ReverseAliasIndex,
    shutdown_signal: Arc<AtomicBool>,
}

impl<F: Fetch> MovieScraper<F> {
    pub fn new(
        config: Config,
        fetcher: F,
        aliases: ReverseAliasIndex,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Result<Self> {
        let resolver = IdentifierResolver::new(&config.identifier)?;
        Ok(Self {
            config,
            fetcher,
            resolver,
            aliases,
            shutdown_signal,
        })
    }

    /// 以關鍵字搜尋並把結果整理到 `output_root` 下的整理完成目錄
    pub fn process_keywords(
        &self,
        keywords: &[String],
        output_root: &Path,
        gallery: bool,
    ) -> BatchReport {
        let items = keywords
            .iter()
            .map(|keyword| BatchItem {
                label: keyword.clone(),
                keyword: keyword.clone(),
                source: None,
            })
            .collect();

        self.run_batch(items, output_root, gallery)
    }

    /// 以檔名搜尋，成功後把影片檔案移入 `root` 下的整理完成目錄
    pub fn process_files(&self, files: &[PathBuf], root: &Path, gallery: bool) -> BatchReport {
        let items = files
            .iter()
            .map(|file| BatchItem {
                label: display_relative(file, root),
                keyword: file
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default(),
                source: Some(file.as_path()),
            })
            .collect();

        self.run_batch(items, root, gallery)
    }

    fn run_batch(&self, items: Vec<BatchItem>, root: &Path, gallery: bool) -> BatchReport {
        let base_dir = root.join(&self.config.completed_dir);
        let mut report = BatchReport {
            total: items.len(),
            ..BatchReport::default()
        };

        for (index, item) in items.iter().enumerate() {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("{}", t!("scraper.interrupted"));
                report.interrupted = true;
                break;
            }

            info!(
                "[{}/{}] {}",
                index + 1,
                report.total,
                t!("scraper.searching", keyword = item.keyword)
            );

            match self.process_item(item, &base_dir, gallery) {
                Ok(Outcome::Organized(movie_path)) => {
                    info!("{}", t!("scraper.saved", path = movie_path.display()));
                    report.organized.push(movie_path);
                }
                Ok(Outcome::Ignored(movie_path)) => {
                    warn!("{}", t!("scraper.ignored", file = item.label));
                    report.organized.push(movie_path);
                    report.ignored.push(item.label.clone());
                }
                Ok(Outcome::Failed) => report.failed.push(item.label.clone()),
                Err(e) => {
                    error!("{}: {e:#}", item.label);
                    report.failed.push(item.label.clone());
                }
            }
        }

        print_summary(&report);
        report
    }

    fn process_item(&self, item: &BatchItem, base_dir: &Path, gallery: bool) -> Result<Outcome> {
        let Some(movie_id) = self.resolver.resolve(&item.keyword) else {
            warn!("{}", t!("scraper.unresolvable", keyword = item.keyword));
            return Ok(Outcome::Failed);
        };

        let steps = if item.source.is_some() { 6 } else { 5 };
        let progress = step_progress(steps, &movie_id);
        let outcome = self.run_steps(item, &movie_id, base_dir, gallery, &progress);
        progress.finish_and_clear();

        outcome
    }

    fn run_steps(
        &self,
        item: &BatchItem,
        movie_id: &str,
        base_dir: &Path,
        gallery: bool,
        progress: &ProgressBar,
    ) -> Result<Outcome> {
        progress.set_message(t!("scraper.step_search").to_string());
        let search_url = format!("{}{}", self.config.search_url, urlencoding::encode(movie_id));
        let Some(hit) = self
            .fetcher
            .fetch_text(&search_url)
            .and_then(|html| parse_search_results(&html, movie_id, &self.config))
        else {
            warn!("{}", t!("scraper.not_found", id = movie_id));
            return Ok(Outcome::Failed);
        };
        progress.inc(1);

        progress.set_message(t!("scraper.step_details").to_string());
        let Some(details) = self
            .fetcher
            .fetch_text(&hit.detail_url)
            .and_then(|html| parse_movie_details(&html, &self.config, &self.aliases))
        else {
            warn!("{}", t!("scraper.details_failed", id = movie_id));
            return Ok(Outcome::Failed);
        };
        progress.inc(1);

        let movie = MovieRecord::from_parts(hit, details, &self.config);

        progress.set_message(t!("scraper.step_folder").to_string());
        let movie_path = base_dir
            .join(movie.cast_bucket(&self.config))
            .join(movie.folder_name());
        ensure_directory_exists(&movie_path)?;
        progress.inc(1);

        progress.set_message(t!("scraper.step_media").to_string());
        if !self.fetcher.fetch_media(
            &movie_path,
            &self.config.fanart_image,
            &movie.fanart_url,
            true,
        ) {
            warn!("{}", t!("scraper.cover_failed", id = movie_id));
            return Ok(Outcome::Failed);
        }
        if gallery {
            self.download_extras(&movie, &movie_path);
        }
        progress.inc(1);

        progress.set_message(t!("scraper.step_nfo").to_string());
        NfoGenerator::new(&movie).save(&movie_path.join(format!("{}.nfo", movie.number)))?;
        progress.inc(1);

        let Some(source) = item.source else {
            return Ok(Outcome::Organized(movie_path));
        };

        progress.set_message(t!("scraper.step_move").to_string());
        let outcome = self.move_source(source, &movie, movie_path)?;
        progress.inc(1);

        Ok(outcome)
    }

    /// 下載劇照與預告片，個別失敗只記錄警告
    fn download_extras(&self, movie: &MovieRecord, movie_path: &Path) {
        for (index, url) in movie.galleries.iter().enumerate() {
            let file_name = format!(
                "gallery_{index:02}{}",
                url_extension(url, DEFAULT_IMAGE_EXTENSION)
            );
            if !self.fetcher.fetch_media(movie_path, &file_name, url, false) {
                warn!("{}", t!("scraper.extra_failed", file = file_name));
            }
        }

        if !movie.trailer_url.is_empty() {
            let file_name = format!(
                "{}_trailer{}",
                movie.number,
                url_extension(&movie.trailer_url, DEFAULT_VIDEO_EXTENSION)
            );
            if !self
                .fetcher
                .fetch_media(movie_path, &file_name, &movie.trailer_url, false)
            {
                warn!("{}", t!("scraper.extra_failed", file = file_name));
            }
        }
    }

    /// 影片移入目錄，目標已存在且不比來源小時，來源改名加上忽略前綴
    fn move_source(
        &self,
        source: &Path,
        movie: &MovieRecord,
        movie_path: PathBuf,
    ) -> Result<Outcome> {
        let extension = source
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let target = movie_path.join(format!("{}{extension}", movie.number.to_uppercase()));

        if target.exists() {
            let source_size = file_size(source)?;
            let target_size = file_size(&target)?;

            if source_size <= target_size {
                let file_name = source
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default();
                let ignored = source
                    .with_file_name(format!("{}{file_name}", self.config.ignored_file_prefix));
                fs::rename(source, &ignored)
                    .with_context(|| format!("無法重新命名: {}", source.display()))?;
                return Ok(Outcome::Ignored(movie_path));
            }
        }

        move_path(source, &target)?;
        Ok(Outcome::Organized(movie_path))
    }
}

fn file_size(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path)
        .with_context(|| format!("無法讀取檔案資訊: {}", path.display()))?
        .len())
}

fn step_progress(steps: u64, movie_id: &str) -> ProgressBar {
    let progress = ProgressBar::new(steps);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:20.cyan/blue}] {pos}/{len} {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("=>-"),
    );
    progress.set_prefix(movie_id.to_string());
    progress
}

/// 從網址取得小寫副檔名（含 `.`），網址沒有副檔名時使用 `default`
fn url_extension(url: &str, default: &str) -> String {
    let path = Url::parse(url).map_or_else(
        |_| url.split(['?', '#']).next().unwrap_or(url).to_string(),
        |parsed| parsed.path().to_string(),
    );
    let name = path.rsplit('/').next().unwrap_or(&path);

    match name.rfind('.') {
        Some(index) if index > 0 => name[index..].to_lowercase(),
        _ => default.to_string(),
    }
}

fn print_summary(report: &BatchReport) {
    println!();
    println!("{}", style(t!("scraper.summary_title")).cyan().bold());
    println!(
        "  {}",
        t!(
            "scraper.summary_counts",
            total = report.total,
            succeeded = report.succeeded(),
            failed = report.failed.len()
        )
    );

    if !report.failed.is_empty() {
        println!("{}", style(t!("scraper.summary_failed")).red());
        for label in &report.failed {
            println!("  {} {label}", style("✗").red());
        }
    }

    if !report.ignored.is_empty() {
        println!("{}", style(t!("scraper.summary_ignored")).yellow());
        for label in &report.ignored {
            println!("  {} {label}", style("→").yellow());
        }
    }

    info!(
        "Batch finished - total: {}, succeeded: {}, failed: {}, ignored: {}",
        report.total,
        report.succeeded(),
        report.failed.len(),
        report.ignored.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_extension() {
        assert_eq!(url_extension("https://example.com/a/b.JPG", ".jpg"), ".jpg");
        assert_eq!(url_extension("https://example.com/a/b.webp?size=2", ".jpg"), ".webp");
        assert_eq!(url_extension("https://example.com/a/trailer", ".mp4"), ".mp4");
        assert_eq!(url_extension("https://example.com/a/.hidden", ".jpg"), ".jpg");
        assert_eq!(url_extension("/img/cover.PNG?v=3#top", ".jpg"), ".png");
        assert_eq!(url_extension("https://example.com/a.b/clip?name=x.mp4", ".mp4"), ".mp4");
        assert_eq!(url_extension("https://example.com/v.1/clip.mp4", ".mp4"), ".mp4");
    }

    #[test]
    fn test_report_counts() {
        let report = BatchReport {
            total: 3,
            organized: vec![PathBuf::from("a"), PathBuf::from("b")],
            failed: vec!["c".to_string()],
            ..BatchReport::default()
        };
        assert_eq!(report.succeeded(), 2);
    }
}
