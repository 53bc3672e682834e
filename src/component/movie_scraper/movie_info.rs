use crate::config::Config;

/// 搜尋結果頁中匹配的影片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub detail_url: String,
    pub title: String,
    pub fanart_url: String,
}

/// 影片詳情頁解析結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieDetails {
    pub number: String,
    pub premiered: String,
    pub year: String,
    pub runtime: String,
    pub director: String,
    pub studio: String,
    pub publisher: String,
    pub tags: Vec<String>,
    pub actresses: Vec<String>,
    pub trailer_url: String,
    pub galleries: Vec<String>,
}

/// 影片資訊，建立後不再修改，供目錄命名與 NFO 產生使用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRecord {
    pub detail_url: String,
    pub fanart_url: String,
    pub trailer_url: String,
    pub galleries: Vec<String>,
    pub number: String,
    pub title: String,
    pub year: String,
    /// 片長（分鐘）
    pub runtime: String,
    pub tags: Vec<String>,
    pub actresses: Vec<String>,
    pub director: String,
    pub studio: String,
    pub publisher: String,
    pub premiered: String,
    pub mpaa: String,
    pub country: String,
}

impl MovieRecord {
    #[must_use]
    pub fn from_parts(hit: SearchHit, details: MovieDetails, config: &Config) -> Self {
        Self {
            detail_url: hit.detail_url,
            fanart_url: hit.fanart_url,
            title: hit.title,
            trailer_url: details.trailer_url,
            galleries: details.galleries,
            number: details.number,
            year: details.year,
            runtime: details.runtime,
            tags: details.tags,
            actresses: details.actresses,
            director: details.director,
            studio: details.studio,
            publisher: details.publisher,
            premiered: details.premiered,
            mpaa: config.default_mpaa.clone(),
            country: config.default_country.clone(),
        }
    }

    /// 依演員數量決定第一層目錄：無演員、單一演員名稱或多演員
    #[must_use]
    pub fn cast_bucket<'a>(&'a self, config: &'a Config) -> &'a str {
        match self.actresses.as_slice() {
            [] => &config.no_actress_dir,
            [actress] => actress,
            _ => &config.multi_actress_dir,
        }
    }

    #[must_use]
    pub fn folder_name(&self) -> String {
        format!("[{}]({})", self.number, self.year)
    }
}
