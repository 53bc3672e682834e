//! 影片編號解析模組
//!
//! 從檔名或關鍵字中移除雜訊，再依序套用 FC2、系列標籤與一般編號規則，
//! 取得 `<字母>-<數字>` 形式的標準編號

use crate::config::IdentifierRules;
use anyhow::{Context, Result};
use regex::Regex;

const FC2_MARKER: &str = "FC2";

/// 系列標籤規則，例如 `259LUXU-(\d+)`
#[derive(Debug, Clone)]
struct SeriesRule {
    label: String,
    pattern: Regex,
}

/// 影片編號解析器
#[derive(Debug, Clone)]
pub struct IdentifierResolver {
    noise: Regex,
    fc2: Regex,
    series: Vec<SeriesRule>,
    loose: Regex,
    strict: Regex,
}

impl IdentifierResolver {
    pub fn new(rules: &IdentifierRules) -> Result<Self> {
        let noise = compile(&format!("(?:{})", rules.noise_patterns.join("|")))?;
        let fc2 = compile(&rules.fc2_pattern)?;

        let series = rules
            .series_labels
            .iter()
            .map(|label| {
                let label = label.to_uppercase();
                let pattern = compile(&format!(r"{}-(\d+)", regex::escape(&label)))?;
                Ok(SeriesRule { label, pattern })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            noise,
            fc2,
            series,
            loose: compile(&rules.loose_pattern)?,
            strict: compile(&rules.strict_pattern)?,
        })
    }

    /// 解析影片編號
    ///
    /// 無法解析時回傳 `None`，這是正常結果而非錯誤。
    /// 含有 FC2 或系列標籤的字串只會使用對應的規則，不會退回一般規則。
    #[must_use]
    pub fn resolve(&self, keyword: &str) -> Option<String> {
        let cleaned = self.noise.replace_all(keyword, "").to_uppercase();

        if cleaned.contains(FC2_MARKER) {
            return self
                .fc2
                .captures(&cleaned)
                .map(|caps| format!("{FC2_MARKER}-{}", &caps[2]));
        }

        if let Some(rule) = self.series.iter().find(|rule| cleaned.contains(&rule.label)) {
            return rule
                .pattern
                .captures(&cleaned)
                .map(|caps| format!("{}-{}", rule.label, &caps[1]));
        }

        [&self.loose, &self.strict]
            .into_iter()
            .find_map(|pattern| pattern.captures(&cleaned))
            .map(|caps| format!("{}-{}", &caps[1], &caps[2]))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("(?i){pattern}"))
        .with_context(|| format!("Invalid identifier pattern: {pattern}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> IdentifierResolver {
        IdentifierResolver::new(&IdentifierRules::default()).unwrap()
    }

    #[test]
    fn test_resolve_normal_ids() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("ABC-123").as_deref(), Some("ABC-123"));
        assert_eq!(resolver.resolve("ABC123").as_deref(), Some("ABC-123"));
        assert_eq!(resolver.resolve("abc_123").as_deref(), Some("ABC-123"));
        assert_eq!(
            resolver.resolve("Some text ABC-123 more text").as_deref(),
            Some("ABC-123")
        );
        assert_eq!(resolver.resolve("ABC-123 (2023)").as_deref(), Some("ABC-123"));
    }

    #[test]
    fn test_resolve_fc2() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("FC2-123456").as_deref(), Some("FC2-123456"));
        assert_eq!(resolver.resolve("FC2 PPV-123456").as_deref(), Some("FC2-123456"));
        assert_eq!(
            resolver.resolve("fc2-ppv_1234567.mp4").as_deref(),
            Some("FC2-1234567")
        );
        assert_eq!(resolver.resolve("FC2-123ABC456"), None);
    }

    #[test]
    fn test_fc2_branch_is_exclusive() {
        // 一般規則可以匹配 ABC-123，但含有 FC2 時只使用 FC2 規則
        assert_eq!(resolver().resolve("FC2 ABC-123"), None);
    }

    #[test]
    fn test_resolve_series_labels() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("259LUXU-1234").as_deref(), Some("259LUXU-1234"));
        assert_eq!(resolver.resolve("259LUXU-ABC1234"), None);
        assert_eq!(resolver.resolve("200GANA-5678").as_deref(), Some("200GANA-5678"));
        assert_eq!(resolver.resolve("200GANA-ABC5678"), None);
        assert_eq!(resolver.resolve("300mium-9012.mp4").as_deref(), Some("300MIUM-9012"));
        assert_eq!(resolver.resolve("300MIUM-ABC9012"), None);
    }

    #[test]
    fn test_series_label_takes_priority() {
        assert_eq!(resolver().resolve("259LUXU ABC-123"), None);
    }

    #[test]
    fn test_noise_is_removed() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("ABC-123 1080p").as_deref(), Some("ABC-123"));
        assert_eq!(resolver.resolve("4K ABC-123").as_deref(), Some("ABC-123"));
        assert_eq!(resolver.resolve("abc-123-fhd.mp4").as_deref(), Some("ABC-123"));
        assert_eq!(
            resolver.resolve("hjd2048.com-abc123.mkv").as_deref(),
            Some("ABC-123")
        );
        assert_eq!(resolver.resolve("Caribbeancom 1080P"), None);
    }

    #[test]
    fn test_unresolvable() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("Invalid Keyword"), None);
        assert_eq!(resolver.resolve(""), None);
        assert_eq!(resolver.resolve("123-456"), None);
    }

    #[test]
    fn test_invalid_rule_is_rejected() {
        let rules = IdentifierRules {
            loose_pattern: "([A-Z".to_string(),
            ..IdentifierRules::default()
        };
        assert!(IdentifierResolver::new(&rules).is_err());
    }
}
