//! 互動式登入
//!
//! 以系統瀏覽器開啟登入頁，使用者登入後貼上網站設定的 `remember_token`，
//! 保存為之後請求使用的 Cookie

use crate::config::Config;
use crate::tools::{CookieRecord, REMEMBER_TOKEN, save_cookies};
use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use log::{info, warn};
use reqwest::Url;
use rust_i18n::t;

/// 執行登入流程，回傳是否成功保存登入狀態
pub fn login(config: &Config) -> Result<bool> {
    println!("{}", style(t!("login.title")).cyan().bold());

    if let Err(e) = webbrowser::open(&config.sign_in_url) {
        warn!("{}: {e}", t!("login.browser_failed"));
        println!("{}", t!("login.open_manually", url = config.sign_in_url));
    }

    let token: String = Input::new()
        .with_prompt(t!("login.token_prompt").to_string())
        .allow_empty(true)
        .interact_text()?;
    let token = token.trim();

    if token.is_empty() {
        warn!("{}", t!("login.cancelled"));
        return Ok(false);
    }

    save_cookies(&config.cookies_file, &[session_cookie(config, token)?])?;
    info!("{}", t!("login.saved", path = config.cookies_file.display()));

    Ok(true)
}

/// 以網站主機名稱建立登入 Cookie
pub fn session_cookie(config: &Config, token: &str) -> Result<CookieRecord> {
    let url = Url::parse(&config.base_url)
        .with_context(|| format!("無效的網址: {}", config.base_url))?;

    Ok(CookieRecord {
        name: REMEMBER_TOKEN.to_string(),
        value: token.to_string(),
        domain: url.host_str().map(ToString::to_string),
        path: "/".to_string(),
        secure: true,
        expiry: None,
    })
}
