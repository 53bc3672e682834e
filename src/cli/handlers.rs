use super::args::Cli;
use crate::component::{FolderOrganizer, MovieScraper, login};
use crate::config::Config;
use crate::tools::{
    AliasTable, CookieRecord, HttpFetcher, ReverseAliasIndex, display_relative,
    list_video_files, load_session_cookies,
};
use anyhow::{Context, Result};
use log::{error, info, warn};
use rust_i18n::t;
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 依命令列參數執行對應的功能
pub fn run(cli: &Cli, config: &Config, shutdown_signal: &Arc<AtomicBool>) -> Result<()> {
    if cli.login {
        match login(config) {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(e) => {
                error!("{}: {e:#}", t!("login.failed"));
                return Ok(());
            }
        }
    }

    let cookies = load_session_cookies(&config.cookies_file);
    if cookies.is_none() {
        warn!("{}", t!("session.anonymous"));
    }

    let table = AliasTable::load_from_file(&config.actress_alias_file)?;
    let aliases = ReverseAliasIndex::build(&table).with_context(|| {
        format!("演員別名表無效: {}", config.actress_alias_file.display())
    })?;

    let target = Path::new(&cli.keywords_or_path);
    if target.is_dir() {
        if cli.organize {
            return organize(config, &table, aliases, target, shutdown_signal);
        }
        return scrape_directory(cli, config, cookies, aliases, target, shutdown_signal);
    }

    scrape_keywords(cli, config, cookies, aliases, shutdown_signal)
}

fn organize(
    config: &Config,
    table: &AliasTable,
    aliases: ReverseAliasIndex,
    root: &Path,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<()> {
    if table.is_empty() {
        warn!("{}", t!("organizer.alias_missing"));
        return Ok(());
    }

    FolderOrganizer::new(config.clone(), aliases, Arc::clone(shutdown_signal)).organize(root)?;
    Ok(())
}

fn scrape_directory(
    cli: &Cli,
    config: &Config,
    cookies: Option<Vec<CookieRecord>>,
    aliases: ReverseAliasIndex,
    root: &Path,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<()> {
    let files = list_video_files(root, cli.depth, config)?;

    if files.is_empty() {
        if cli.depth > 0 {
            info!("{}", t!("scan.none_recursive", root = root.display()));
        } else {
            info!("{}", t!("scan.none", root = root.display()));
        }
        return Ok(());
    }

    info!("{}", t!("scan.found", count = files.len()));
    for (index, file) in files.iter().enumerate() {
        println!("    {}.{}", index + 1, display_relative(file, root));
    }

    let scraper = build_scraper(config, cookies, aliases, shutdown_signal)?;
    scraper.process_files(&files, root, cli.gallery);
    Ok(())
}

fn scrape_keywords(
    cli: &Cli,
    config: &Config,
    cookies: Option<Vec<CookieRecord>>,
    aliases: ReverseAliasIndex,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<()> {
    let keywords = cli.keywords();

    info!("{}", t!("scan.keywords", count = keywords.len()));
    for (index, keyword) in keywords.iter().enumerate() {
        println!("    {}.{keyword}", index + 1);
    }

    let output_root = env::current_dir().context("無法取得目前的工作目錄")?;
    let scraper = build_scraper(config, cookies, aliases, shutdown_signal)?;
    scraper.process_keywords(&keywords, &output_root, cli.gallery);
    Ok(())
}

fn build_scraper(
    config: &Config,
    cookies: Option<Vec<CookieRecord>>,
    aliases: ReverseAliasIndex,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<MovieScraper<HttpFetcher>> {
    let fetcher = HttpFetcher::new(config, cookies.as_deref(), Arc::clone(shutdown_signal))?;
    MovieScraper::new(config.clone(), fetcher, aliases, Arc::clone(shutdown_signal))
}
