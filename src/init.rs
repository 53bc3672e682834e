use console::style;
use env_logger::{Builder, Env};
use log::Level;
use std::env;
use std::io::Write;

const ZH_LOCALE: &str = "zh-CN";
const EN_LOCALE: &str = "en-US";

/// 初始化日誌，預設等級為 info，可用 `RUST_LOG` 覆寫
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let message = record.args().to_string();
            match record.level() {
                Level::Error => writeln!(buf, "{}", style(message).red().bold()),
                Level::Warn => writeln!(buf, "{}", style(message).yellow().bold()),
                _ => writeln!(buf, "{message}"),
            }
        })
        .try_init();
}

/// 決定介面語系：命令列參數優先，其次是設定檔，最後依環境變數判斷
#[must_use]
pub fn select_locale(cli_lang: Option<&str>, settings_lang: Option<&str>) -> String {
    let env_lang = env::var("LC_ALL")
        .ok()
        .filter(|value| !value.is_empty())
        .or_else(|| env::var("LANG").ok())
        .unwrap_or_default();

    resolve_locale(cli_lang.or(settings_lang), &env_lang)
}

fn resolve_locale(preferred: Option<&str>, env_lang: &str) -> String {
    if let Some(lang) = preferred.map(str::trim).filter(|lang| !lang.is_empty()) {
        return lang.to_string();
    }

    if env_lang.to_lowercase().starts_with("zh") {
        ZH_LOCALE.to_string()
    } else {
        EN_LOCALE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_locale_wins() {
        assert_eq!(resolve_locale(Some("en-US"), "zh_CN.UTF-8"), "en-US");
        assert_eq!(resolve_locale(Some(" zh-CN "), ""), "zh-CN");
    }

    #[test]
    fn test_locale_from_environment() {
        assert_eq!(resolve_locale(None, "zh_TW.UTF-8"), "zh-CN");
        assert_eq!(resolve_locale(None, "en_GB.UTF-8"), "en-US");
        assert_eq!(resolve_locale(Some(""), ""), "en-US");
    }
}
