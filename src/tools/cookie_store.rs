//! 登入 Cookie 的保存與讀取
//!
//! Cookie 以 JSON 陣列保存，每個元素包含 name/value/domain/path/secure/expiry

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use log::{error, warn};
use rust_i18n::t;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 判斷登入狀態的 Cookie 名稱
pub const REMEMBER_TOKEN: &str = "remember_token";

/// 過期判斷的寬限秒數
const EXPIRY_GRACE_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    /// Unix 時間戳（秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<f64>,
}

fn default_path() -> String {
    "/".to_string()
}

impl CookieRecord {
    /// 轉換為 `Set-Cookie` 格式，供 cookie jar 使用
    #[must_use]
    pub fn to_set_cookie(&self) -> String {
        let mut cookie = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(domain) = &self.domain {
            cookie.push_str(&format!("; Domain={domain}"));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let Some(expiry) = self.expiry else {
            return false;
        };

        #[allow(clippy::cast_possible_truncation)]
        let expiry = DateTime::from_timestamp(expiry as i64, 0).unwrap_or_default();
        expiry < now - Duration::seconds(EXPIRY_GRACE_SECONDS)
    }
}

/// 讀取保存的 Cookie 並檢查登入狀態是否仍有效
///
/// 檔案不存在、`remember_token` 已過期或檔案無法解析時回傳 `None`
#[must_use]
pub fn load_session_cookies(path: &Path) -> Option<Vec<CookieRecord>> {
    load_session_cookies_at(path, Utc::now())
}

fn load_session_cookies_at(path: &Path, now: DateTime<Utc>) -> Option<Vec<CookieRecord>> {
    if !path.exists() {
        return None;
    }

    let cookies = match read_cookies(path) {
        Ok(cookies) => cookies,
        Err(e) => {
            error!("{}{e:#}", t!("cookies.load_failed"));
            return None;
        }
    };

    let expired = cookies
        .iter()
        .any(|cookie| cookie.name == REMEMBER_TOKEN && cookie.is_expired_at(now));
    if expired {
        warn!("{}", t!("cookies.expired"));
        return None;
    }

    Some(cookies)
}

fn read_cookies(path: &Path) -> Result<Vec<CookieRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("無法讀取 Cookie 檔案: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("無法解析 Cookie 檔案: {}", path.display()))
}

pub fn save_cookies(path: &Path, cookies: &[CookieRecord]) -> Result<()> {
    let content = serde_json::to_string_pretty(cookies).context("無法序列化 Cookie")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("無法建立目錄: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("無法寫入 Cookie 檔案: {}", path.display()))?;

    Ok(())
}
