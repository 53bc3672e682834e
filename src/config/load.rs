use crate::config::types::{Config, IdentifierRules, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// 編譯時嵌入的影片副檔名清單（不需要外部檔案）
const VIDEO_EXTENSIONS_JSON: &str = include_str!("data/video_extensions.json");

const BASE_URL: &str = "https://avfan.com";
const SETTINGS_FILE: &str = "settings.json";
const COOKIES_FILE: &str = "cookies.json";
const ACTRESS_ALIAS_FILE: &str = "actress_alias.json";

impl Config {
    /// 以執行檔所在目錄作為狀態目錄載入設定
    pub fn new() -> Result<Self> {
        let state_dir = Self::state_dir();
        let mut config = Self::with_state_dir(&state_dir)?;

        let settings_path = state_dir.join(SETTINGS_FILE);
        config.settings = Self::load_settings(&settings_path).unwrap_or_else(|e| {
            warn!("{e:#}");
            UserSettings::default()
        });

        Ok(config)
    }

    /// 建立預設設定，Cookie 與別名檔案放在 `state_dir` 下
    pub fn with_state_dir(state_dir: &Path) -> Result<Self> {
        Ok(Self {
            base_url: BASE_URL.to_string(),
            sign_in_url: format!("{BASE_URL}/zh-CN/sign_in"),
            search_url: format!("{BASE_URL}/search?q="),
            fanart_image: "fanart.jpg".to_string(),
            poster_image: "poster.jpg".to_string(),
            cookies_file: state_dir.join(COOKIES_FILE),
            actress_alias_file: state_dir.join(ACTRESS_ALIAS_FILE),
            completed_dir: "#整理完成#".to_string(),
            no_actress_dir: "==无名演员==".to_string(),
            multi_actress_dir: "==多演员==".to_string(),
            ignored_file_prefix: "##".to_string(),
            search_target_class: "flex flex-col relative hover:bg-zinc-100 hover:dark:bg-zinc-800"
                .to_string(),
            movie_target_class: "flex flex-col gap-2".to_string(),
            default_mpaa: "NC-17".to_string(),
            default_country: "日本".to_string(),
            video_extensions: Self::load_embedded_video_extensions()?,
            identifier: IdentifierRules::default(),
            settings: UserSettings::default(),
        })
    }

    fn state_dir() -> PathBuf {
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    fn load_embedded_video_extensions() -> Result<HashSet<String>> {
        let extensions: Vec<String> =
            serde_json::from_str(VIDEO_EXTENSIONS_JSON).context("無法解析嵌入的影片副檔名設定")?;
        Ok(extensions.into_iter().map(|ext| ext.to_lowercase()).collect())
    }
}
