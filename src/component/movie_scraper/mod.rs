//! 影片刮削元件
//!
//! 搜尋影片資訊、下載封面與劇照、產生 NFO 並整理影片檔案

mod main;
mod movie_info;
mod movie_parser;
mod nfo_generator;

pub use main::{BatchReport, MovieScraper};
pub use movie_info::{MovieDetails, MovieRecord, SearchHit};
pub use movie_parser::{parse_movie_details, parse_search_results};
pub use nfo_generator::NfoGenerator;
