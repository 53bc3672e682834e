use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 網路請求的重試策略
///
/// 第 n 次嘗試的逾時時間為 `initial_timeout_secs × backoff_factor^(n−1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_timeout_secs: u64,
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_timeout_secs: 30,
            backoff_factor: 2,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.backoff_factor).saturating_pow(attempt.saturating_sub(1));
        Duration::from_secs(self.initial_timeout_secs.saturating_mul(factor))
    }
}

/// 使用者可覆寫的設定（settings.json）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Option<String>,
    pub retry: RetryPolicy,
}

/// 影片編號解析規則
#[derive(Debug, Clone)]
pub struct IdentifierRules {
    /// 解析前要移除的雜訊（解析度、網站名稱、畫質標記等）
    pub noise_patterns: Vec<String>,
    pub fc2_pattern: String,
    /// 依優先順序排列的系列標籤，例如 `259LUXU`
    pub series_labels: Vec<String>,
    /// 字母與數字之間必須有分隔符號
    pub loose_pattern: String,
    /// 字母與數字之間沒有分隔符號
    pub strict_pattern: String,
}

impl Default for IdentifierRules {
    fn default() -> Self {
        Self {
            noise_patterns: vec![
                r"(144|240|360|480|720|1080)p".to_string(),
                r"[24]k".to_string(),
                r"\w+2048\.com".to_string(),
                r"carib(beancom)?".to_string(),
                r"[^a-z\d](f?hd|lt)[^a-z\d]".to_string(),
            ],
            fc2_pattern: r"FC2[^A-Z\d]{0,5}(PPV[^A-Z\d]{0,5})?(\d{5,7})".to_string(),
            series_labels: vec![
                "259LUXU".to_string(),
                "200GANA".to_string(),
                "300MIUM".to_string(),
            ],
            loose_pattern: r"([A-Z]{2,10})[-_](\d{2,5})".to_string(),
            strict_pattern: r"([A-Z]{2,})(\d{2,5})".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub sign_in_url: String,
    pub search_url: String,

    pub fanart_image: String,
    pub poster_image: String,
    pub cookies_file: PathBuf,
    pub actress_alias_file: PathBuf,

    /// 整理完成的影片存放目錄名稱，不隨介面語言變動
    pub completed_dir: String,
    pub no_actress_dir: String,
    pub multi_actress_dir: String,
    pub ignored_file_prefix: String,

    pub search_target_class: String,
    pub movie_target_class: String,

    pub default_mpaa: String,
    pub default_country: String,

    /// 小寫、含前導點的影片副檔名
    pub video_extensions: HashSet<String>,
    pub identifier: IdentifierRules,
    pub settings: UserSettings,
}

impl Config {
    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.video_extensions
                    .contains(&format!(".{}", ext.to_lowercase()))
            })
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.settings.retry
    }
}
