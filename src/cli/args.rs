use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version,
    about = "搜尋影片資訊、下載封面與劇照、產生 NFO 並依演員整理影片",
    arg_required_else_help = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// 以逗號分隔的影片關鍵字，或要掃描的影片資料夾路徑
    #[arg(value_name = "KEYWORDS_OR_PATH")]
    pub keywords_or_path: String,

    /// 掃描子資料夾的深度，0 表示只掃描指定的資料夾
    #[arg(short, long, default_value_t = 0)]
    pub depth: usize,

    /// 一併下載劇照與預告片
    #[arg(short, long)]
    pub gallery: bool,

    /// 開啟瀏覽器重新登入
    #[arg(short, long)]
    pub login: bool,

    /// 依演員別名表整理資料夾
    #[arg(short, long)]
    pub organize: bool,

    /// 介面語系，例如 zh-CN 或 en-US
    #[arg(long, value_name = "LOCALE")]
    pub lang: Option<String>,

    /// 顯示版本資訊
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),
}

impl Cli {
    /// 將關鍵字參數以逗號拆開並去除空白
    #[must_use]
    pub fn keywords(&self) -> Vec<String> {
        self.keywords_or_path
            .split(',')
            .map(|keyword| keyword.trim().to_string())
            .filter(|keyword| !keyword.is_empty())
            .collect()
    }
}
