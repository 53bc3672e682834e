//! 搜尋結果頁與影片詳情頁的 HTML 解析

use super::movie_info::{MovieDetails, SearchHit};
use crate::config::Config;
use crate::tools::ReverseAliasIndex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

static DIV_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div").expect("Invalid selector"));

static UL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul").expect("Invalid selector"));

static GALLERY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[data-fancybox="gallery"]"#).expect("Invalid selector"));

const LABEL_NUMBER: &str = "番号:";
const LABEL_PREMIERED: &str = "发行日期:";
const LABEL_RUNTIME: &str = "片长:";
const LABEL_DIRECTOR: &str = "导演:";
const LABEL_STUDIO: &str = "制作商:";
const LABEL_PUBLISHER: &str = "发行商:";
const LABEL_TAGS: &str = "标签:";
const LABEL_ACTRESSES: &str = "演员:";

const COPY_BUTTON_TEXT: &str = "复制";
const RUNTIME_UNIT: &str = " 分钟";
const TRAILER_CAPTION: &str = "预告片";
const MALE_CLASS: &str = "male";

/// 在搜尋結果中找出標題包含關鍵字（不分大小寫）的第一部影片
#[must_use]
pub fn parse_search_results(html: &str, keyword: &str, config: &Config) -> Option<SearchHit> {
    if html.trim().is_empty() {
        return None;
    }

    let document = Html::parse_document(html);
    let keyword = keyword.to_lowercase();

    document
        .select(&DIV_SELECTOR)
        .filter(|div| has_class(div, &config.search_target_class))
        .filter_map(|div| first_child(div, "a"))
        .find_map(|link| {
            let title = link.value().attr("title").unwrap_or_default().trim();
            if !title.to_lowercase().contains(&keyword) {
                return None;
            }

            let href = link.value().attr("href").unwrap_or_default();
            let fanart_url = first_child(link, "img")
                .and_then(|img| img.value().attr("src"))
                .unwrap_or_default();

            Some(SearchHit {
                detail_url: format!("{}{href}", config.base_url),
                title: title.to_string(),
                fanart_url: fanart_url.to_string(),
            })
        })
}

/// 解析影片詳情頁
///
/// 找不到資訊清單時回傳 `None`；頁面上有多個清單時以最後一個為準。
/// 演員名稱會先經過別名索引轉換為固定名稱。
#[must_use]
pub fn parse_movie_details(
    html: &str,
    config: &Config,
    aliases: &ReverseAliasIndex,
) -> Option<MovieDetails> {
    if html.trim().is_empty() {
        return None;
    }

    let document = Html::parse_document(html);
    let list = document
        .select(&UL_SELECTOR)
        .filter(|ul| has_class(ul, &config.movie_target_class))
        .last()?;

    let items: Vec<String> = list
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .map(text_without_male_links)
        .collect();

    let mut details = extract_details(&items, aliases);

    for link in document.select(&GALLERY_SELECTOR) {
        let href = link.value().attr("href").unwrap_or_default().to_string();
        let caption = link.value().attr("data-caption").unwrap_or_default();

        if caption.trim() == TRAILER_CAPTION {
            details.trailer_url = href;
        } else {
            details.galleries.push(href);
        }
    }

    Some(details)
}

fn extract_details(items: &[String], aliases: &ReverseAliasIndex) -> MovieDetails {
    let mut details = MovieDetails::default();

    for item in items {
        if let Some(value) = item.strip_prefix(LABEL_NUMBER) {
            details.number = value.replace(COPY_BUTTON_TEXT, "").trim().to_string();
        } else if let Some(value) = item.strip_prefix(LABEL_PREMIERED) {
            details.premiered = value.trim().to_string();
            if details.premiered.chars().count() >= 4 {
                details.year = details.premiered.chars().take(4).collect();
            }
        } else if let Some(value) = item.strip_prefix(LABEL_RUNTIME) {
            details.runtime = value.replace(RUNTIME_UNIT, "").trim().to_string();
        } else if let Some(value) = item.strip_prefix(LABEL_DIRECTOR) {
            details.director = value.trim().to_string();
        } else if let Some(value) = item.strip_prefix(LABEL_STUDIO) {
            details.studio = value.trim().to_string();
        } else if let Some(value) = item.strip_prefix(LABEL_PUBLISHER) {
            details.publisher = value.trim().to_string();
        } else if let Some(value) = item.strip_prefix(LABEL_TAGS) {
            details.tags = split_list(value);
        } else if let Some(value) = item.strip_prefix(LABEL_ACTRESSES) {
            details.actresses = split_list(value)
                .iter()
                .map(|name| aliases.resolve(name))
                .collect();
        }
    }

    details
}

/// 逗號分隔的清單，`--` 代表沒有資料
fn split_list(value: &str) -> Vec<String> {
    value
        .replace("--", "")
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn has_class(element: &ElementRef, class: &str) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|value| value.contains(class))
}

fn first_child<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == name)
}

/// 取得清單項目的文字，略過男演員連結
fn text_without_male_links(item: ElementRef) -> String {
    item.descendants()
        .filter(|node| {
            !node
                .ancestors()
                .take_while(|ancestor| ancestor.id() != item.id())
                .filter_map(ElementRef::wrap)
                .any(|ancestor| {
                    ancestor.value().name() == "a"
                        && ancestor.value().attr("class") == Some(MALE_CLASS)
                })
        })
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
