use super::movie_info::MovieRecord;
use anyhow::{Context, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::path::Path;

const INDENT_SIZE: usize = 4;

/// 將影片資訊轉換為媒體庫通用的 NFO（XML）格式
pub struct NfoGenerator<'a> {
    movie: &'a MovieRecord,
}

impl<'a> NfoGenerator<'a> {
    #[must_use]
    pub const fn new(movie: &'a MovieRecord) -> Self {
        Self { movie }
    }

    pub fn render(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE);
        let movie = self.movie;

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        writer.write_event(Event::Start(BytesStart::new("movie")))?;

        write_text(&mut writer, "title", &movie.title)?;
        write_text(&mut writer, "year", &movie.year)?;
        write_text(&mut writer, "runtime", &movie.runtime)?;
        write_text(&mut writer, "mpaa", &movie.mpaa)?;

        if !movie.number.is_empty() {
            let start = BytesStart::new("uniqueid")
                .with_attributes([("type", "num"), ("default", "true")]);
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(&movie.number)))?;
            writer.write_event(Event::End(BytesEnd::new("uniqueid")))?;
        }

        for genre in &movie.tags {
            write_text(&mut writer, "genre", genre)?;
        }
        for tag in &movie.tags {
            write_text(&mut writer, "tag", tag)?;
        }

        write_text(&mut writer, "country", &movie.country)?;

        for (name, value) in [
            ("director", &movie.director),
            ("premiered", &movie.premiered),
            ("studio", &movie.studio),
            ("publisher", &movie.publisher),
        ] {
            if !value.is_empty() {
                write_text(&mut writer, name, value)?;
            }
        }

        for actress in &movie.actresses {
            writer.write_event(Event::Start(BytesStart::new("actress")))?;
            write_text(&mut writer, "name", actress)?;
            writer.write_event(Event::End(BytesEnd::new("actress")))?;
        }

        if !movie.fanart_url.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("fanart")))?;
            write_text(&mut writer, "thumb", &movie.fanart_url)?;
            writer.write_event(Event::End(BytesEnd::new("fanart")))?;
        }

        if !movie.trailer_url.is_empty() {
            write_text(&mut writer, "trailer", &movie.trailer_url)?;
        }

        writer.write_event(Event::End(BytesEnd::new("movie")))?;

        String::from_utf8(writer.into_inner()).context("NFO 內容不是有效的 UTF-8")
    }

    pub fn save(&self, output_path: &Path) -> Result<()> {
        let content = self.render()?;
        fs::write(output_path, content)
            .with_context(|| format!("無法寫入 NFO 檔案: {}", output_path.display()))
    }
}

fn write_text(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    if !text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
