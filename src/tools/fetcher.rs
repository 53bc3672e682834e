//! 網頁與媒體檔案下載
//!
//! 所有請求都套用 [`RetryPolicy`]：每次重試的逾時時間依退避因子遞增，
//! 重試用盡時回傳 `None` / `false`，不會把錯誤往上拋

use crate::config::{Config, RetryPolicy};
use crate::tools::cookie_store::CookieRecord;
use crate::tools::image_cropper::crop_poster;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use rust_i18n::t;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;

const UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const LANGUAGE: &str = "zh-CN,zh;q=0.9";

/// 下載介面，批次處理流程只依賴這個 trait
pub trait Fetch {
    /// 取得網頁文字內容
    fn fetch_text(&self, url: &str) -> Option<String>;

    /// 下載媒體檔案到 `dest_dir/file_name`，`crop` 為真時同時裁切出海報
    fn fetch_media(&self, dest_dir: &Path, file_name: &str, url: &str, crop: bool) -> bool;
}

pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
    poster_image: String,
    has_session: bool,
    shutdown_signal: Arc<AtomicBool>,
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(UA));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(LANGUAGE));
    headers
}

impl HttpFetcher {
    /// 建立下載器，`cookies` 不為 `None` 時所有請求都帶上登入 Cookie
    pub fn new(
        config: &Config,
        cookies: Option<&[CookieRecord]>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .default_headers(default_headers())
            .timeout(None::<Duration>);

        if let Some(cookies) = cookies {
            let url = Url::parse(&config.base_url)
                .with_context(|| format!("無效的網址: {}", config.base_url))?;
            let jar = Jar::default();
            for cookie in cookies {
                jar.add_cookie_str(&cookie.to_set_cookie(), &url);
            }
            builder = builder.cookie_provider(Arc::new(jar));
        }

        Ok(Self {
            client: builder.build().context("無法建立 HTTP 用戶端")?,
            retry: config.retry_policy(),
            poster_image: config.poster_image.clone(),
            has_session: cookies.is_some(),
            shutdown_signal,
        })
    }

    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.has_session
    }

    fn with_retry<T>(
        &self,
        url: &str,
        mut attempt_once: impl FnMut(Duration) -> Result<T>,
    ) -> Option<T> {
        let max_attempts = self.retry.max_attempts;

        for attempt in 1..=max_attempts {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                return None;
            }

            let timeout = self.retry.timeout_for(attempt);
            if attempt > 1 {
                info!(
                    "{}",
                    t!(
                        "fetch.retry",
                        attempt = attempt,
                        max = max_attempts,
                        timeout = timeout.as_secs()
                    )
                );
            }

            match attempt_once(timeout) {
                Ok(value) => return Some(value),
                Err(e) => debug!("{url} ({attempt}/{max_attempts}): {e:#}"),
            }
        }

        None
    }

    fn get_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()?
            .error_for_status()?;
        let body = response.bytes()?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn download(&self, url: &str, dest: &Path, timeout: Duration) -> Result<()> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()?
            .error_for_status()?;

        let progress = ProgressBar::new(response.content_length().unwrap_or(0));
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")?
                .progress_chars("#>-"),
        );
        progress.set_message(
            dest.file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default(),
        );

        let partial = partial_path(dest);
        let result = write_partial(&mut progress.wrap_read(response), &partial)
            .and_then(|()| fs::rename(&partial, dest).context("無法完成下載"));
        progress.finish_and_clear();

        if result.is_err() {
            let _ = fs::remove_file(&partial);
        }
        result
    }
}

impl Fetch for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Option<String> {
        self.with_retry(url, |timeout| self.get_text(url, timeout))
    }

    fn fetch_media(&self, dest_dir: &Path, file_name: &str, url: &str, crop: bool) -> bool {
        let dest = dest_dir.join(file_name);

        if self
            .with_retry(url, |timeout| self.download(url, &dest, timeout))
            .is_none()
        {
            return false;
        }

        if crop {
            if let Err(e) = crop_poster(&dest, &dest_dir.join(&self.poster_image)) {
                error!("{e:#}");
                return false;
            }
        }

        true
    }
}

/// 下載中的暫存檔，完成後才改名為正式檔名
fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.{}.part", Uuid::new_v4()))
}

fn write_partial(reader: &mut impl io::Read, partial: &Path) -> Result<()> {
    let mut file = File::create(partial)
        .with_context(|| format!("無法建立檔案: {}", partial.display()))?;
    io::copy(reader, &mut file).context("下載中斷")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn fetcher(shutdown: bool) -> (TempDir, HttpFetcher) {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::with_state_dir(temp_dir.path()).unwrap();
        let fetcher =
            HttpFetcher::new(&config, None, Arc::new(AtomicBool::new(shutdown))).unwrap();
        (temp_dir, fetcher)
    }

    #[test]
    fn test_retry_until_success() {
        let (_temp_dir, fetcher) = fetcher(false);
        let timeouts = std::cell::RefCell::new(Vec::new());

        let result = fetcher.with_retry("https://example.com", |timeout| {
            timeouts.borrow_mut().push(timeout.as_secs());
            if timeouts.borrow().len() < 2 {
                Err(anyhow!("timeout"))
            } else {
                Ok("body")
            }
        });

        assert_eq!(result, Some("body"));
        assert_eq!(*timeouts.borrow(), vec![30, 60]);
    }

    #[test]
    fn test_retry_exhausted() {
        let (_temp_dir, fetcher) = fetcher(false);
        let attempts = Cell::new(0);

        let result: Option<()> = fetcher.with_retry("https://example.com", |_| {
            attempts.set(attempts.get() + 1);
            Err(anyhow!("unreachable"))
        });

        assert!(result.is_none());
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn test_shutdown_skips_attempts() {
        let (_temp_dir, fetcher) = fetcher(true);
        let attempts = Cell::new(0);

        let result = fetcher.with_retry("https://example.com", |_| {
            attempts.set(attempts.get() + 1);
            Ok(())
        });

        assert!(result.is_none());
        assert_eq!(attempts.get(), 0);
    }

    #[test]
    fn test_invalid_url_returns_none() {
        let (temp_dir, fetcher) = fetcher(false);
        assert!(fetcher.fetch_text("not a url").is_none());
        assert!(!fetcher.fetch_media(temp_dir.path(), "fanart.jpg", "not a url", true));
        assert!(!temp_dir.path().join("fanart.jpg").exists());
    }

    #[test]
    fn test_session_cookies() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::with_state_dir(temp_dir.path()).unwrap();
        let cookies = vec![CookieRecord {
            name: "remember_token".to_string(),
            value: "secret".to_string(),
            domain: None,
            path: "/".to_string(),
            secure: false,
            expiry: None,
        }];

        let fetcher =
            HttpFetcher::new(&config, Some(&cookies), Arc::new(AtomicBool::new(false))).unwrap();
        assert!(fetcher.has_session());
    }

    #[test]
    fn test_partial_path_is_hidden_sibling() {
        let dest = Path::new("/movies/ABC-123/fanart.jpg");
        let partial = partial_path(dest);

        assert_eq!(partial.parent(), dest.parent());
        let name = partial.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(".fanart.jpg."));
        assert!(name.ends_with(".part"));
    }
}
