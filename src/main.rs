use anyhow::Result;
use clap::Parser;
use console::style;
use log::debug;
use movie_organize::cli::{Cli, run};
use movie_organize::config::Config;
use movie_organize::init;
use movie_organize::signal::setup_shutdown_signal;
use rust_i18n::t;
use std::process;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

fn main() -> Result<()> {
    let cli = Cli::parse();
    init::init();

    let config = Config::new()?;
    let locale = init::select_locale(cli.lang.as_deref(), config.settings.language.as_deref());
    rust_i18n::set_locale(&locale);

    let shutdown_signal = setup_shutdown_signal()?;

    if let Err(e) = run(&cli, &config, &shutdown_signal) {
        eprintln!("{} {e:#}", style(t!("main.error_prefix")).red().bold());
        process::exit(1);
    }

    debug!("Program exited normally");
    Ok(())
}
