use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// 演員別名表：Key 是固定名稱，Value 是該演員已知的其他寫法
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl AliasTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("無法讀取演員別名檔案: {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("無法解析演員別名檔案: {}", path.display()))
    }

    pub fn insert(&mut self, canonical: impl Into<String>, aliases: Vec<String>) {
        self.entries.insert(canonical.into(), aliases);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter()
    }
}

impl<const N: usize> From<[(&str, &[&str]); N]> for AliasTable {
    fn from(entries: [(&str, &[&str]); N]) -> Self {
        let mut table = Self::new();
        for (canonical, aliases) in entries {
            table.insert(canonical, aliases.iter().map(ToString::to_string).collect());
        }
        table
    }
}

/// 別名反查索引：別名 → 固定名稱
#[derive(Debug, Clone, Default)]
pub struct ReverseAliasIndex {
    index: HashMap<String, String>,
}

impl ReverseAliasIndex {
    /// 由別名表建立反查索引
    ///
    /// 同一個別名對應到不同固定名稱，或固定名稱本身又是另一個名稱的別名
    /// （會形成連鎖或循環重新命名）時回傳錯誤
    pub fn build(table: &AliasTable) -> Result<Self> {
        let mut index: HashMap<String, String> = HashMap::new();

        for (canonical, aliases) in table.iter() {
            for alias in aliases {
                if let Some(existing) = index.get(alias) {
                    if existing != canonical {
                        bail!(
                            "別名 \"{alias}\" 同時對應到 \"{existing}\" 與 \"{canonical}\""
                        );
                    }
                    continue;
                }
                index.insert(alias.clone(), canonical.clone());
            }
        }

        for (alias, canonical) in &index {
            if let Some(next) = index.get(canonical) {
                if next != canonical {
                    bail!("別名鏈無效: \"{alias}\" → \"{canonical}\" → \"{next}\"");
                }
            }
        }

        Ok(Self { index })
    }

    /// 取得別名對應的固定名稱
    #[must_use]
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(String::as_str)
    }

    /// 將名稱轉換為固定名稱，非別名時原樣回傳
    #[must_use]
    pub fn resolve(&self, name: &str) -> String {
        self.canonical(name).unwrap_or(name).to_string()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_table() -> AliasTable {
        AliasTable::from([
            ("Actress A", &["Alias A1", "Alias A2"][..]),
            ("Actress B", &["Alias B1"][..]),
        ])
    }

    #[test]
    fn test_resolve_alias() {
        let index = ReverseAliasIndex::build(&sample_table()).unwrap();

        assert_eq!(index.canonical("Alias A2"), Some("Actress A"));
        assert_eq!(index.resolve("Alias B1"), "Actress B");
        assert_eq!(index.resolve("Unknown"), "Unknown");
        assert_eq!(index.canonical("Actress A"), None);
    }

    #[test]
    fn test_canonical_listed_as_own_alias() {
        let table = AliasTable::from([("Actress A", &["Actress A", "Alias A1"][..])]);
        let index = ReverseAliasIndex::build(&table).unwrap();
        assert_eq!(index.canonical("Actress A"), Some("Actress A"));
    }

    #[test]
    fn test_conflicting_alias_is_rejected() {
        let table = AliasTable::from([
            ("Actress A", &["Shared"][..]),
            ("Actress B", &["Shared"][..]),
        ]);
        assert!(ReverseAliasIndex::build(&table).is_err());
    }

    #[test]
    fn test_alias_chain_is_rejected() {
        let table = AliasTable::from([
            ("Actress B", &["Actress A"][..]),
            ("Actress C", &["Actress B"][..]),
        ]);
        assert!(ReverseAliasIndex::build(&table).is_err());
    }

    #[test]
    fn test_alias_cycle_is_rejected() {
        let table = AliasTable::from([
            ("Actress A", &["Actress B"][..]),
            ("Actress B", &["Actress A"][..]),
        ]);
        assert!(ReverseAliasIndex::build(&table).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(
            temp_file.path(),
            r#"{"Actress A": ["Alias A1", "Alias A2"], "Actress B": ["Alias B1"]}"#,
        )
        .unwrap();

        let table = AliasTable::load_from_file(temp_file.path()).unwrap();
        assert_eq!(table, sample_table());
    }

    #[test]
    fn test_load_blank_or_missing_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "  \n").unwrap();
        assert!(AliasTable::load_from_file(temp_file.path()).unwrap().is_empty());

        let table = AliasTable::load_from_file(Path::new("/nonexistent/alias.json")).unwrap();
        assert!(table.is_empty());
    }
}
