mod actress_alias;
mod cookie_store;
mod fetcher;
mod file_mover;
mod identifier_resolver;
mod image_cropper;
mod path_validator;
mod video_scanner;

pub use actress_alias::{AliasTable, ReverseAliasIndex};
pub use cookie_store::{CookieRecord, REMEMBER_TOKEN, load_session_cookies, save_cookies};
pub use fetcher::{Fetch, HttpFetcher};
pub use file_mover::move_path;
pub use identifier_resolver::IdentifierResolver;
pub use image_cropper::{POSTER_WIDTH, crop_poster};
pub use path_validator::{display_relative, ensure_directory_exists, validate_directory_exists};
pub use video_scanner::list_video_files;
